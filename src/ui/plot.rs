use eframe::egui::{Id, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use lap_delta::data::model::SeriesIndex;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Lap plots (central panel)
// ---------------------------------------------------------------------------

/// Speed traces on top, time difference below, sharing the x axis.
pub fn lap_plots(ui: &mut Ui, state: &AppState) {
    let comparison = match &state.result {
        Some(c) => c,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                if state.loading {
                    ui.spinner();
                } else {
                    ui.heading("Open a lap chart to compare laps  (File → Open chart…)");
                }
            });
            return;
        }
    };

    let link = Id::new("lap_x_axis");
    let height = (ui.available_height() - ui.spacing().item_spacing.y) * 0.5;

    Plot::new("speed_plot")
        .legend(Legend::default())
        .height(height)
        .x_axis_label("Position (km)")
        .y_axis_label("Speed (km/h)")
        .link_axis(link, [true, false])
        .link_cursor(link, [true, false])
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in SeriesIndex::ALL {
                if !state.show_series[series.index()] {
                    continue;
                }
                let points: PlotPoints = comparison.speed_points(series).into();
                let line = Line::new(points)
                    .name(series.to_string())
                    .color(state.palette.series[series.index()])
                    .width(1.5);
                plot_ui.line(line);
            }
        });

    Plot::new("time_diff_plot")
        .legend(Legend::default())
        .x_axis_label("Position (km)")
        .y_axis_label("Time difference (s)")
        .link_axis(link, [true, false])
        .link_cursor(link, [true, false])
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let points: PlotPoints = comparison.time_diff.clone().into();
            let line = Line::new(points)
                .name("time diff")
                .color(state.palette.diff)
                .width(1.5);
            plot_ui.line(line);
        });
}
