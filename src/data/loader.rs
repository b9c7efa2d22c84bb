use std::path::Path;

use anyhow::{bail, Context, Result};

use super::model::ChartCapture;
use super::walker::walk;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a saved lap-detail page.  Dispatch by extension.
///
/// Supported formats:
/// * `.html` / `.htm` / `.xhtml` – the report page as saved by a browser
/// * `.svg`                      – the chart element on its own
pub fn load_file(path: &Path) -> Result<ChartCapture> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "html" | "htm" | "xhtml" | "svg" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            load_markup(&text).with_context(|| format!("in {}", path.display()))
        }
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Walk markup text that is already in memory (e.g. fetched over HTTP).
pub fn load_markup(text: &str) -> Result<ChartCapture> {
    let capture = walk(text).context("walking lap chart")?;
    log::info!(
        "chart: {} x guides, {} y guides, series of {} and {} points",
        capture.axis_x.len(),
        capture.axis_y.len(),
        capture.series[0].len(),
        capture.series[1].len()
    );
    Ok(capture)
}

/// Apply an optional comparison document on top of the primary one.
pub fn combine(primary: ChartCapture, comparison: Option<&ChartCapture>) -> Result<ChartCapture> {
    match comparison {
        Some(other) => primary
            .with_substitute(other)
            .context("taking the second lap from the comparison document"),
        None => Ok(primary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SeriesIndex;

    const PAGE: &str = r#"<html><body><svg><g class="plot">
        <g class="series serie-0 color-0"><path d="M0 1 L2 3"/></g>
        </g></svg></body></html>"#;

    #[test]
    fn loads_html_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lap.HTML");
        std::fs::write(&path, PAGE).unwrap();
        let capture = load_file(&path).unwrap();
        assert_eq!(capture.series(SeriesIndex::First).len(), 2);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lap.png");
        std::fs::write(&path, PAGE).unwrap();
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains(".png"));
    }

    #[test]
    fn comparison_replaces_second_lap() {
        let primary = load_markup(PAGE).unwrap();
        let other = load_markup(&PAGE.replace("M0 1 L2 3", "M5 6 L7 8")).unwrap();
        let combined = combine(primary, Some(&other)).unwrap();
        assert_eq!(combined.series(SeriesIndex::First).points, vec![[0.0, 1.0], [2.0, 3.0]]);
        assert_eq!(combined.series(SeriesIndex::Second).points, vec![[5.0, 6.0], [7.0, 8.0]]);
        assert_eq!(combined.series(SeriesIndex::Second).series, SeriesIndex::Second);
    }

    #[test]
    fn empty_comparison_is_missing_series() {
        let primary = load_markup(PAGE).unwrap();
        let other = load_markup("<html></html>").unwrap();
        assert!(combine(primary, Some(&other)).is_err());
    }
}
