//! Report composition and rendering.
//!
//! The composer lays out statistics, the top-k table and chart references as
//! HTML. A [`DocumentRenderer`] then turns that document into the bytes the
//! caller downloads.

mod artifacts;
mod document;
mod render;

pub use artifacts::RequestArtifacts;
pub use document::{compose_report, ChartSet, ReportDocument, UserIdentity};
pub use render::{DocumentRenderer, ExternalCommand, RenderedReport, StandaloneHtml};
