use std::path::Path;

use eframe::egui::{self, Color32, DragValue, RichText, Ui};

use lap_delta::data::filter::MonotonicPolicy;
use lap_delta::data::loader::load_file;
use lap_delta::data::model::SeriesIndex;
use lap_delta::data::resample::{Resolution, MAX_SAMPLES};
use lap_delta::data::export::export_file;

use crate::state::{AppState, LoadedChart};

// ---------------------------------------------------------------------------
// Left side panel – analysis parameters
// ---------------------------------------------------------------------------

/// Render the left parameter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Analysis");
    ui.separator();

    let mut changed = false;

    ui.strong("Circuit length (km)");
    changed |= ui
        .add(
            DragValue::new(&mut state.config.circuit_length_km)
                .speed(0.01)
                .range(0.1..=100.0)
                .max_decimals(3),
        )
        .changed();

    ui.add_space(4.0);
    ui.strong("Resolution");
    let mut by_step = matches!(state.config.resolution, Resolution::Step(_));
    ui.horizontal(|ui: &mut Ui| {
        if ui.radio_value(&mut by_step, true, "Step").changed() {
            state.config.resolution = Resolution::Step(1e-4);
            changed = true;
        }
        if ui.radio_value(&mut by_step, false, "Samples").changed() {
            state.config.resolution = Resolution::Count(5000);
            changed = true;
        }
    });
    match &mut state.config.resolution {
        Resolution::Step(step) => {
            changed |= ui
                .add(
                    DragValue::new(step)
                        .speed(1e-5)
                        .range(1e-6..=0.1)
                        .max_decimals(6),
                )
                .changed();
        }
        Resolution::Count(n) => {
            changed |= ui
                .add(DragValue::new(n).speed(10.0).range(2..=MAX_SAMPLES))
                .changed();
        }
    }

    ui.add_space(4.0);
    ui.strong("Alignment tolerance");
    changed |= ui
        .add(
            DragValue::new(&mut state.config.alignment_epsilon)
                .speed(1e-5)
                .range(0.0..=0.1)
                .max_decimals(6),
        )
        .changed();

    ui.add_space(4.0);
    ui.strong("Backtrack filter");
    let current = state.config.monotonic_policy;
    egui::ComboBox::from_id_salt("monotonic_policy")
        .selected_text(current.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for policy in [MonotonicPolicy::LastRetained, MonotonicPolicy::PreviousRaw] {
                if ui
                    .selectable_value(&mut state.config.monotonic_policy, policy, policy.to_string())
                    .changed()
                {
                    changed = true;
                }
            }
        });

    ui.add_space(8.0);
    ui.horizontal(|ui: &mut Ui| {
        let can_run = state.primary.is_some();
        if ui.add_enabled(can_run, egui::Button::new("Recompute")).clicked() {
            changed = true;
        }
        if ui
            .add_enabled(state.loading, egui::Button::new("Cancel"))
            .clicked()
        {
            state.cancel();
        }
    });

    if changed {
        state.recompute();
    }

    ui.separator();
    ui.heading("Laps");

    for series in SeriesIndex::ALL {
        let i = series.index();
        let mut text = RichText::new(series.to_string()).color(state.palette.series[i]);
        if series == SeriesIndex::Second {
            if let Some(c) = &state.comparison {
                text = RichText::new(format!("{series} ({})", c.label)).color(state.palette.series[i]);
            }
        }
        ui.checkbox(&mut state.show_series[i], text);
        if let Some(result) = &state.result {
            let total = result.lap_time[i].total();
            ui.label(format!("    {:.3} s over {:.3} km", total, lap_span_km(result, series)));
        }
    }

    if let Some(gap) = state.result.as_ref().and_then(|r| r.final_gap()) {
        ui.add_space(4.0);
        ui.label(RichText::new(format!("Gap at finish: {gap:+.3} s")).color(state.palette.diff));
    }
}

fn lap_span_km(result: &lap_delta::LapComparison, series: SeriesIndex) -> f64 {
    let p = result.speed[series.index()].position();
    match (p.first(), p.last()) {
        (Some(a), Some(b)) => (b - a) * result.circuit_length_km,
        _ => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open chart…").clicked() {
                if let Some(chart) = open_chart_dialog(state, "Open lap chart") {
                    state.set_primary(chart);
                }
                ui.close_menu();
            }
            if ui.button("Open comparison chart…").clicked() {
                if let Some(chart) = open_chart_dialog(state, "Open comparison chart") {
                    state.set_comparison(Some(chart));
                }
                ui.close_menu();
            }
            if ui
                .add_enabled(state.comparison.is_some(), egui::Button::new("Close comparison"))
                .clicked()
            {
                state.set_comparison(None);
                ui.close_menu();
            }
            ui.separator();
            if ui
                .add_enabled(state.result.is_some(), egui::Button::new("Export CSV…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(primary) = &state.primary {
            ui.label(&primary.label);
        }
        if let Some(result) = &state.result {
            ui.label(format!("{} samples", result.common_len()));
        }
        if state.loading {
            ui.spinner();
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn open_chart_dialog(state: &mut AppState, title: &str) -> Option<LoadedChart> {
    let path = rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Lap charts", &["html", "htm", "xhtml", "svg"])
        .add_filter("HTML", &["html", "htm", "xhtml"])
        .add_filter("SVG", &["svg"])
        .pick_file()?;
    load_chart(state, &path)
}

fn load_chart(state: &mut AppState, path: &Path) -> Option<LoadedChart> {
    match load_file(path) {
        Ok(capture) => {
            log::info!("Loaded chart {}", path.display());
            Some(LoadedChart {
                label: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
                capture,
            })
        }
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
            None
        }
    }
}

fn export_dialog(state: &mut AppState) {
    let Some(result) = &state.result else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export lap comparison")
        .add_filter("CSV", &["csv"])
        .set_file_name("lap_delta.csv")
        .save_file()
    else {
        return;
    };
    if let Err(e) = export_file(&path, result) {
        log::error!("Failed to export: {e:#}");
        state.status_message = Some(format!("Error: {e:#}"));
    }
}
