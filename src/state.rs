use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Result;

use lap_delta::data::loader::combine;
use lap_delta::data::model::ChartCapture;
use lap_delta::{analyze, AnalysisConfig, CancelToken, LapComparison};

use crate::color::LapPalette;

// ---------------------------------------------------------------------------
// Loaded documents
// ---------------------------------------------------------------------------

/// A walked chart and where it came from (path or URL).
#[derive(Debug, Clone)]
pub struct LoadedChart {
    pub label: String,
    pub capture: ChartCapture,
}

/// Analysis running on a worker thread.
struct AnalysisJob {
    cancel: CancelToken,
    rx: Receiver<Result<LapComparison>>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Chart supplying calibration and both laps.
    pub primary: Option<LoadedChart>,

    /// Optional chart whose lap replaces the second series.
    pub comparison: Option<LoadedChart>,

    /// Parameters edited in the side panel.
    pub config: AnalysisConfig,

    /// Latest successful comparison.
    pub result: Option<LapComparison>,

    /// Per-lap visibility in the speed plot.
    pub show_series: [bool; 2],

    pub palette: LapPalette,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether an analysis is in progress.
    pub loading: bool,

    job: Option<AnalysisJob>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            primary: None,
            comparison: None,
            config: AnalysisConfig::default(),
            result: None,
            show_series: [true, true],
            palette: LapPalette::default(),
            status_message: None,
            loading: false,
            job: None,
        }
    }
}

impl AppState {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Install a chart as the primary document and recompute.
    pub fn set_primary(&mut self, chart: LoadedChart) {
        self.primary = Some(chart);
        self.recompute();
    }

    /// Install (or drop) the comparison document and recompute.
    pub fn set_comparison(&mut self, chart: Option<LoadedChart>) {
        self.comparison = chart;
        self.recompute();
    }

    /// Adopt a comparison computed before the viewer started.
    pub fn set_result(&mut self, result: LapComparison) {
        self.result = Some(result);
        self.status_message = None;
        self.loading = false;
    }

    /// Start analysing the current documents on a worker thread.
    ///
    /// A running analysis is cancelled first.
    pub fn recompute(&mut self) {
        self.cancel();
        let Some(primary) = &self.primary else {
            return;
        };
        if let Err(e) = self.config.validate() {
            self.status_message = Some(format!("Error: {e}"));
            return;
        }

        let primary = primary.capture.clone();
        let comparison = self.comparison.as_ref().map(|c| c.capture.clone());
        let config = self.config.clone();
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let outcome = combine(primary, comparison.as_ref())
                .and_then(|capture| analyze(&capture, &config, &worker_cancel).map_err(Into::into));
            // The receiver is gone when a newer job replaced this one.
            let _ = tx.send(outcome);
        });

        self.job = Some(AnalysisJob { cancel, rx });
        self.loading = true;
        self.status_message = None;
    }

    /// Pick up a finished analysis, if any. Returns true when state changed.
    pub fn poll(&mut self) -> bool {
        let received = match &self.job {
            Some(job) => job.rx.try_recv(),
            None => return false,
        };
        match received {
            Ok(Ok(result)) => {
                log::info!(
                    "comparison ready: {} samples, final gap {:?}",
                    result.common_len(),
                    result.final_gap()
                );
                self.set_result(result);
            }
            Ok(Err(e)) => {
                log::error!("Failed to compare laps: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                self.loading = false;
            }
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                self.status_message = Some("Error: analysis thread stopped".to_string());
                self.loading = false;
            }
        }
        self.job = None;
        true
    }

    /// Cancel the running analysis, keeping the previous result.
    pub fn cancel(&mut self) {
        if let Some(job) = self.job.take() {
            job.cancel.cancel();
            self.loading = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use lap_delta::data::walker::walk;

    const CHART: &str = r#"<g class="plot">
        <g class="axis x">
          <g class="guides"><path d="M0 0 v50"/><text>0.0</text></g>
          <g class="guides"><path d="M100 0 v50"/><text>1.0</text></g>
        </g>
        <g class="axis y">
          <g class="guides"><path d="M0 0 h100"/><text>200</text></g>
          <g class="guides"><path d="M0 50 h100"/><text>0</text></g>
        </g>
        <g class="series serie-0 color-0"><path d="M0 25 L100 25"/></g>
        <g class="series serie-1 color-1"><path d="M0 10 L100 10"/></g>
        </g>"#;

    fn wait_for_job(state: &mut AppState) {
        let deadline = Instant::now() + Duration::from_secs(30);
        while !state.poll() {
            assert!(Instant::now() < deadline, "analysis did not finish");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn poll_reports_a_finished_job_once() {
        let mut state = AppState::new(AnalysisConfig::with_length(2.0));
        assert!(!state.poll());

        state.set_primary(LoadedChart {
            label: "lap".to_string(),
            capture: walk(CHART).unwrap(),
        });
        assert!(state.loading);

        wait_for_job(&mut state);
        assert!(!state.loading);
        assert!(state.status_message.is_none());
        let gap = state.result.as_ref().and_then(|r| r.final_gap()).unwrap();
        assert!((gap - 27.0).abs() < 1e-6, "gap {gap}");
        assert!(!state.poll());
    }

    #[test]
    fn failed_job_sets_the_status_line() {
        let mut state = AppState::new(AnalysisConfig::with_length(2.0));
        let one_lap = CHART.replace("serie-1", "serie-9");
        state.set_primary(LoadedChart {
            label: "lap".to_string(),
            capture: walk(&one_lap).unwrap(),
        });

        wait_for_job(&mut state);
        assert!(state.result.is_none());
        let message = state.status_message.as_deref().unwrap();
        assert!(message.contains("serie-1"), "message {message}");
    }
}
