//! Report configuration: defaults, then environment overrides, then whatever the
//! caller sets explicitly.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const ENV_CHART_DIR: &str = "RUNLEDGER_CHART_DIR";
pub const ENV_TOP_K: &str = "RUNLEDGER_TOP_K";
pub const ENV_KEEP_CHARTS: &str = "RUNLEDGER_KEEP_CHARTS";

/// Raster canvas in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Parent of the per-request chart directories.
    pub chart_root: PathBuf,
    pub top_k: usize,
    /// Leave chart files on disk after the report has been rendered.
    pub keep_artifacts: bool,
    pub bar_size: CanvasSize,
    pub line_size: CanvasSize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            chart_root: default_chart_root(),
            top_k: 5,
            keep_artifacts: false,
            bar_size: CanvasSize::new(600, 400),
            line_size: CanvasSize::new(800, 500),
        }
    }
}

impl ReportConfig {
    /// Defaults with `RUNLEDGER_*` overrides applied. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_overrides(|key| env::var(key).ok());
        cfg
    }

    fn apply_overrides<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(dir) = lookup(ENV_CHART_DIR).filter(|v| !v.trim().is_empty()) {
            self.chart_root = PathBuf::from(dir);
        }
        if let Some(k) = lookup(ENV_TOP_K).and_then(|v| v.trim().parse().ok()) {
            self.top_k = k;
        }
        if let Some(keep) = lookup(ENV_KEEP_CHARTS).and_then(|v| parse_flag(&v)) {
            self.keep_artifacts = keep;
        }
    }

    pub fn with_chart_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.chart_root = root.into();
        self
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    pub fn keep_artifacts(mut self, keep: bool) -> Self {
        self.keep_artifacts = keep;
        self
    }
}

fn default_chart_root() -> PathBuf {
    directories::ProjectDirs::from("com", "Runledger", "Runledger")
        .map(|dirs| dirs.cache_dir().join("charts"))
        .unwrap_or_else(|| env::temp_dir().join("runledger"))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
