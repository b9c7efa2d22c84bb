mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use eframe::egui;

use lap_delta::data::export::export_file;
use lap_delta::data::filter::MonotonicPolicy;
use lap_delta::data::loader::{combine, load_file, load_markup};
use lap_delta::data::model::SeriesIndex;
use lap_delta::data::resample::Resolution;
use lap_delta::fetch::{fetch_markup, FetchOptions};
use lap_delta::{analyze, AnalysisConfig, CancelToken};

use app::LapDeltaApp;
use state::{AppState, LoadedChart};

#[derive(Parser)]
#[command(name = "lap-delta")]
#[command(about = "Improved lap chart for stracker: speed traces and time difference of two laps")]
#[command(version)]
struct Cli {
    /// URL of the lap details page
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,

    /// Saved lap details page (.html or .svg)
    #[arg(long)]
    file: Option<PathBuf>,

    /// URL of a second page whose lap replaces serie-1
    #[arg(long, conflicts_with = "compare_file")]
    compare_url: Option<String>,

    /// Saved second page whose lap replaces serie-1
    #[arg(long)]
    compare_file: Option<PathBuf>,

    /// Circuit length (km)
    #[arg(short, long)]
    length: Option<f64>,

    /// Resample step in lap fractions
    #[arg(long, conflicts_with = "samples")]
    step: Option<f64>,

    /// Resample to a fixed number of samples instead of a step
    #[arg(long)]
    samples: Option<usize>,

    /// Start positions closer than this are not aligned
    #[arg(long)]
    epsilon: Option<f64>,

    /// Backtrack filter: last-retained or previous-raw
    #[arg(long)]
    policy: Option<MonotonicPolicy>,

    /// JSON file with analysis parameters (flags override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Page requested first to obtain a session cookie (manual lap selection)
    #[arg(long)]
    prime_url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Write the compared curves to a CSV file
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Do not open the viewer
    #[arg(long)]
    no_gui: bool,
}

impl Cli {
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)?,
            None => {
                let has_source = self.url.is_some() || self.file.is_some();
                match self.length {
                    Some(length) => AnalysisConfig::with_length(length),
                    None if has_source => bail!("--length is required (or give it in --config)"),
                    None => AnalysisConfig::default(),
                }
            }
        };
        if let Some(length) = self.length {
            config.circuit_length_km = length;
        }
        if let Some(step) = self.step {
            config.resolution = Resolution::Step(step);
        }
        if let Some(samples) = self.samples {
            config.resolution = Resolution::Count(samples);
        }
        if let Some(epsilon) = self.epsilon {
            config.alignment_epsilon = epsilon;
        }
        if let Some(policy) = self.policy {
            config.monotonic_policy = policy;
        }
        config.validate()?;
        Ok(config)
    }

    fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            prime_url: self.prime_url.clone(),
        }
    }
}

fn load_source(
    url: Option<&str>,
    file: Option<&PathBuf>,
    options: &FetchOptions,
) -> Result<Option<LoadedChart>> {
    let chart = match (url, file) {
        (Some(url), _) => {
            let text = fetch_markup(url, options)?;
            LoadedChart {
                label: url.to_string(),
                capture: load_markup(&text).with_context(|| format!("in {url}"))?,
            }
        }
        (None, Some(path)) => LoadedChart {
            label: path.display().to_string(),
            capture: load_file(path)?,
        },
        (None, None) => return Ok(None),
    };
    Ok(Some(chart))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = cli.analysis_config()?;
    let options = cli.fetch_options();
    let primary = load_source(cli.url.as_deref(), cli.file.as_ref(), &options)?;
    let comparison = load_source(cli.compare_url.as_deref(), cli.compare_file.as_ref(), &options)?;
    if primary.is_none() && comparison.is_some() {
        bail!("a comparison page needs a primary page (--url or --file)");
    }

    let mut state = AppState::new(config.clone());
    if let Some(primary) = primary {
        let capture = combine(primary.capture.clone(), comparison.as_ref().map(|c| &c.capture))?;
        let result = analyze(&capture, &config, &CancelToken::new())?;

        if let Some(path) = &cli.export {
            export_file(path, &result)?;
        }
        if cli.no_gui {
            for series in SeriesIndex::ALL {
                println!(
                    "{series}: {:.3} s",
                    result.lap_time[series.index()].total()
                );
            }
            if let Some(gap) = result.final_gap() {
                println!("gap after {} samples: {gap:+.3} s", result.common_len());
            }
            return Ok(());
        }

        state.primary = Some(primary);
        state.comparison = comparison;
        state.set_result(result);
    } else if cli.no_gui {
        bail!("nothing to do: give --url or --file");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Lap Delta – Lap Comparison",
        options,
        Box::new(|_cc| Ok(Box::new(LapDeltaApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}
