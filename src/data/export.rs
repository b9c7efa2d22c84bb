use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::SeriesIndex;
use super::pipeline::LapComparison;

/// Write the plotted curves as CSV:
/// `position_km,speed_0_kmh,speed_1_kmh,time_diff_s`.
pub fn write_csv<W: Write>(writer: W, comparison: &LapComparison) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["position_km", "speed_0_kmh", "speed_1_kmh", "time_diff_s"])
        .context("writing CSV header")?;

    let speed0 = comparison.speed[SeriesIndex::First.index()].velocity();
    let speed1 = comparison.speed[SeriesIndex::Second.index()].velocity();
    let rows = comparison.time_diff.iter().zip(speed0.iter().zip(speed1));
    for (i, ([x, dt], (v0, v1))) in rows.enumerate() {
        out.write_record(&[x.to_string(), v0.to_string(), v1.to_string(), dt.to_string()])
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    out.flush().context("flushing CSV")?;
    Ok(())
}

pub fn export_file(path: &Path, comparison: &LapComparison) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(file, comparison)?;
    log::info!("exported {} rows to {}", comparison.common_len(), path.display());
    Ok(())
}
