//! Runledger command-line front end.
//!
//! Seeds a demo dataset, prints a user's profile, or renders a project report
//! from a JSON snapshot of the store.

mod seed;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use insights::{ExternalCommand, Insights, InsightsError, ReportConfig};
use store::{InMemoryStore, ProjectId, UserId};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::seed::{demo_store, SeedOptions};

const EXIT_NO_DATA: u8 = 2;

/// Experiment metrics: profiles and project reports
#[derive(Parser, Debug)]
#[command(name = "runledger")]
#[command(version)]
#[command(about = "Summaries, rankings and chart reports for ML experiment metrics")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log level when no -v is given (error, warn, info, debug, trace)
    #[arg(long, env = "RUNLEDGER_LOG", default_value = "warn", global = true)]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a demo dataset snapshot
    Seed {
        /// Where to write the JSON snapshot
        #[arg(long, value_name = "FILE")]
        out: PathBuf,

        #[arg(long, default_value_t = 7)]
        seed: u64,

        /// Experiments for the demo user
        #[arg(long, default_value_t = 8)]
        experiments: usize,

        /// Epochs per experiment
        #[arg(long, default_value_t = 10)]
        epochs: i64,
    },

    /// Print a user's profile as JSON
    Profile {
        /// JSON snapshot to load
        #[arg(long, value_name = "FILE")]
        data: PathBuf,

        /// User id
        #[arg(long)]
        owner: u64,
    },

    /// Render a project report
    Report {
        /// JSON snapshot to load
        #[arg(long, value_name = "FILE")]
        data: PathBuf,

        /// User id
        #[arg(long)]
        owner: u64,

        /// Project id
        #[arg(long)]
        project: u64,

        /// Where to write the report
        #[arg(long, value_name = "FILE")]
        out: PathBuf,

        /// Converter that reads HTML on stdin and writes PDF to stdout
        #[arg(long, value_name = "PROG")]
        pdf_command: Option<String>,

        /// Argument for the converter (repeatable)
        #[arg(long = "pdf-arg", value_name = "ARG", allow_hyphen_values = true)]
        pdf_args: Vec<String>,

        /// Parent directory for per-report chart directories
        #[arg(long, value_name = "DIR")]
        chart_dir: Option<PathBuf>,

        /// Experiments in the ranking table and charts
        #[arg(long)]
        top_k: Option<usize>,

        /// Leave the chart files on disk
        #[arg(long)]
        keep_charts: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    FmtSubscriber::builder()
        .with_max_level(log_level(cli.verbose, &cli.log))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(InsightsError::NoData { project }) = err.downcast_ref::<InsightsError>() {
                eprintln!("nothing to report: project {project} has no experiment metrics");
                ExitCode::from(EXIT_NO_DATA)
            } else {
                eprintln!("error: {err:#}");
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Seed {
            out,
            seed,
            experiments,
            epochs,
        } => {
            let store = demo_store(SeedOptions {
                seed,
                experiments,
                epochs,
            })
            .context("failed to build demo dataset")?;
            store
                .save(&out)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(path = %out.display(), experiments, epochs, "demo dataset written");
            println!("{}", out.display());
        }

        Command::Profile { data, owner } => {
            let store = load(&data)?;
            let view =
                Insights::new(store, ReportConfig::from_env()).build_profile(UserId(owner))?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }

        Command::Report {
            data,
            owner,
            project,
            out,
            pdf_command,
            pdf_args,
            chart_dir,
            top_k,
            keep_charts,
        } => {
            let mut config = ReportConfig::from_env();
            if let Some(dir) = chart_dir {
                config = config.with_chart_root(dir);
            }
            if let Some(k) = top_k {
                config = config.with_top_k(k);
            }
            if keep_charts {
                config = config.keep_artifacts(true);
            }

            let mut insights = Insights::new(load(&data)?, config);
            if let Some(program) = pdf_command {
                insights = insights.with_renderer(ExternalCommand::new(program, pdf_args));
            }

            let report = insights
                .build_project_report(UserId(owner), ProjectId(project))
                .await?;
            fs::write(&out, &report.bytes)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(
                path = %out.display(),
                media_type = report.media_type,
                suggested_name = %report.filename,
                "report written"
            );
            println!("{}", out.display());
        }
    }
    Ok(())
}

fn load(path: &Path) -> Result<InMemoryStore> {
    InMemoryStore::load(path).with_context(|| format!("failed to load {}", path.display()))
}

/// `-v` flags win over the configured level; an unknown level falls back to warn.
fn log_level(verbose: u8, configured: &str) -> Level {
    match verbose {
        0 => Level::from_str(configured.trim()).unwrap_or(Level::WARN),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbosity_overrides_configured_level() {
        assert_eq!(log_level(0, "info"), Level::INFO);
        assert_eq!(log_level(0, "nonsense"), Level::WARN);
        assert_eq!(log_level(1, "error"), Level::DEBUG);
        assert_eq!(log_level(3, "error"), Level::TRACE);
    }

    #[test]
    fn report_flags_parse() {
        let cli = Cli::try_parse_from([
            "runledger",
            "report",
            "--data",
            "data.json",
            "--owner",
            "1",
            "--project",
            "2",
            "--out",
            "report.pdf",
            "--pdf-command",
            "wkhtmltopdf",
            "--pdf-arg",
            "--enable-local-file-access",
            "--pdf-arg",
            "-",
            "--pdf-arg",
            "-",
            "--top-k",
            "3",
        ])
        .unwrap();

        match cli.command {
            Command::Report {
                pdf_command,
                pdf_args,
                top_k,
                keep_charts,
                ..
            } => {
                assert_eq!(pdf_command.as_deref(), Some("wkhtmltopdf"));
                assert_eq!(pdf_args, vec!["--enable-local-file-access", "-", "-"]);
                assert_eq!(top_k, Some(3));
                assert!(!keep_charts);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
