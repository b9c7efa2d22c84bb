use std::time::Duration;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct LapDeltaApp {
    pub state: AppState,
}

impl LapDeltaApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for LapDeltaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.state.poll() {
            // Redraw with the result or error that just arrived.
            ctx.request_repaint();
        }
        if self.state.loading {
            // Keep polling the worker thread while nothing else repaints.
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: analysis parameters ----
        egui::SidePanel::left("analysis_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: speed + time difference ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::lap_plots(ui, &self.state);
        });
    }
}
