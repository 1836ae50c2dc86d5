//! Aggregation and reporting core for Runledger.
//!
//! Raw per-epoch metric rows come in through a [`store::MetricsStore`]; out
//! come experiment summaries, rankings, a per-user profile and a rendered
//! project report with embedded charts.

pub mod charts;
pub mod config;
pub mod error;
pub mod format;
pub mod metrics;
pub mod profile;
pub mod report;

mod service;

pub use config::{CanvasSize, ReportConfig};
pub use error::{InsightsError, Result};
pub use metrics::{top_k, ExperimentSummary, MetricField, OverallStats, RankKey};
pub use profile::{profile, ProfileSources, ProfileView};
pub use report::{DocumentRenderer, ExternalCommand, RenderedReport, StandaloneHtml};
pub use service::Insights;
