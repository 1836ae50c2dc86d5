use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use base64::Engine;

use super::document::{escape_html, ReportDocument};
use crate::error::{InsightsError, Result};

/// Turns a composed document into downloadable bytes.
///
/// Implementations run on the blocking pool and may read the chart files the
/// document references; those files exist until rendering returns.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>>;

    fn media_type(&self) -> &'static str;

    /// File extension for the download name, without the dot.
    fn extension(&self) -> &'static str;
}

/// Final report bytes handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
    pub filename: String,
}

/// Self-contained HTML: every chart is inlined as a `data:image/png` URI.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandaloneHtml;

impl DocumentRenderer for StandaloneHtml {
    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>> {
        let mut html = document.html.clone();
        for chart in &document.images {
            let bytes = fs::read(&chart.path)?;
            let inline = format!(
                "data:image/png;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(bytes)
            );
            html = html.replace(
                &format!("src=\"{}\"", escape_html(&chart.uri)),
                &format!("src=\"{inline}\""),
            );
        }
        Ok(html.into_bytes())
    }

    fn media_type(&self) -> &'static str {
        "text/html"
    }

    fn extension(&self) -> &'static str {
        "html"
    }
}

/// Pipes the HTML through an external converter and returns its stdout,
/// e.g. `wkhtmltopdf --enable-local-file-access - -`.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<OsString>,
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl DocumentRenderer for ExternalCommand {
    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>> {
        let program = self.program.to_string_lossy().into_owned();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                InsightsError::RenderFailure(format!("failed to start {program}: {err}"))
            })?;

        // Separate writer thread; stdout is drained concurrently by wait_with_output.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| InsightsError::RenderFailure(format!("{program} has no stdin")))?;
        let html = document.html.clone().into_bytes();
        let feeder = thread::spawn(move || stdin.write_all(&html));

        let output = child
            .wait_with_output()
            .map_err(|err| InsightsError::RenderFailure(format!("{program} failed: {err}")))?;

        match feeder.join() {
            Ok(Ok(())) => {}
            // A converter may exit before consuming stdin; its exit status decides.
            Ok(Err(err)) if err.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(err)) => return Err(InsightsError::Io(err)),
            Err(_) => {
                return Err(InsightsError::RenderFailure(format!(
                    "{program} stdin writer panicked"
                )))
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InsightsError::RenderFailure(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(output.stdout)
    }

    fn media_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }
}
