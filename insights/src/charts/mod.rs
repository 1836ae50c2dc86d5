//! Chart images for project reports.
//!
//! Charts are drawn as SVG, rasterised to PNG and written into a single
//! request-scoped directory. Each call is independent, so the report
//! pipeline renders all of them in parallel on the blocking pool.

mod raster;
pub mod svg;

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{CanvasSize, ReportConfig};
use crate::error::{InsightsError, Result};

pub use raster::svg_to_png;
pub use svg::LineSeries;

/// A chart written to disk, plus the `file://` URI used to embed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRef {
    pub path: PathBuf,
    pub uri: String,
}

impl ChartRef {
    fn new(path: PathBuf) -> Self {
        let uri = file_uri(&path);
        Self { path, uri }
    }
}

#[derive(Debug, Clone)]
pub struct ChartRenderer {
    dir: PathBuf,
    bar_size: CanvasSize,
    line_size: CanvasSize,
}

impl ChartRenderer {
    /// Renders into `dir`, which must already exist.
    pub fn new(dir: impl Into<PathBuf>, config: &ReportConfig) -> Self {
        Self {
            dir: dir.into(),
            bar_size: config.bar_size,
            line_size: config.line_size,
        }
    }

    /// One bar per experiment with the value printed above it. Writes
    /// `{metric}_chart.png`.
    pub fn bar_chart(
        &self,
        metric_name: &str,
        values: &[f64],
        names: &[String],
    ) -> Result<ChartRef> {
        if values.len() != names.len() {
            return Err(InsightsError::RenderFailure(format!(
                "{metric_name} bar chart has {} values for {} names",
                values.len(),
                names.len()
            )));
        }
        ensure_plottable(metric_name, values.iter().copied())?;

        let markup = svg::bar_chart(
            &format!("{metric_name} of Top 5 Experiments"),
            metric_name,
            names,
            values,
            self.bar_size,
        );
        self.write(&format!("{}_chart.png", file_stem(metric_name)), &markup, self.bar_size)
    }

    /// One line per series over epochs. Writes `{metric}_line_chart.png`.
    pub fn line_chart(&self, metric_name: &str, series: &[LineSeries]) -> Result<ChartRef> {
        ensure_plottable(
            metric_name,
            series.iter().flat_map(|s| s.points.iter().map(|(_, y)| *y)),
        )?;

        let markup = svg::line_chart(
            &format!("{metric_name} over Epochs"),
            "Epoch",
            metric_name,
            series,
            self.line_size,
        );
        self.write(&format!("{}_line_chart.png", file_stem(metric_name)), &markup, self.line_size)
    }

    fn write(&self, file_name: &str, markup: &str, size: CanvasSize) -> Result<ChartRef> {
        let bytes = svg_to_png(markup, size)?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes)?;
        tracing::debug!(path = %path.display(), "chart written");
        Ok(ChartRef::new(fs::canonicalize(&path)?))
    }
}

/// An empty chart is fine; values that are all NaN or infinite are not.
fn ensure_plottable(metric_name: &str, mut values: impl Iterator<Item = f64>) -> Result<()> {
    let mut seen = false;
    let any_finite = values.any(|v| {
        seen = true;
        v.is_finite()
    });
    if seen && !any_finite {
        return Err(InsightsError::RenderFailure(format!(
            "{metric_name} chart has no finite values"
        )));
    }
    Ok(())
}

fn file_stem(metric_name: &str) -> String {
    metric_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

fn file_uri(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let mut uri = String::from("file://");
    if !raw.starts_with('/') {
        uri.push('/');
    }
    for ch in raw.chars() {
        match ch {
            ' ' => uri.push_str("%20"),
            '#' => uri.push_str("%23"),
            '?' => uri.push_str("%3F"),
            '%' => uri.push_str("%25"),
            other => uri.push(other),
        }
    }
    uri
}
