//! The bundled demo snapshot must keep loading, and the binary must keep its
//! exit-code contract: 0 on success, 2 when a project has nothing to report,
//! 1 for every other failure.

use std::fs;
use std::process::{Command, Output};

use insights::{Insights, ReportConfig};
use store::{Dataset, InMemoryStore, UserId};

const FIXTURE_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/demo.json");
const FIXTURE: &str = include_str!("../fixtures/demo.json");

fn runledger(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_runledger"))
        .args(args)
        .env_remove("RUNLEDGER_CHART_DIR")
        .env_remove("RUNLEDGER_TOP_K")
        .env_remove("RUNLEDGER_KEEP_CHARTS")
        .output()
        .expect("failed to run runledger")
}

#[test]
fn fixture_parses_into_a_dataset() {
    let dataset = Dataset::from_json(FIXTURE).unwrap();
    assert_eq!(dataset.users.len(), 2);
    assert_eq!(dataset.projects.len(), 3);
    assert_eq!(dataset.experiments.len(), 5);
    assert_eq!(dataset.metrics.len(), 7);
    assert!(dataset.experiments.iter().any(|e| e.project.is_none()));
}

#[test]
fn fixture_profile_rollups() {
    let store = InMemoryStore::from_snapshot(Dataset::from_json(FIXTURE).unwrap());
    let view = Insights::new(store, ReportConfig::default())
        .build_profile(UserId(1))
        .unwrap();

    assert_eq!(view.stats.experiment_count, 4);
    assert_eq!(view.stats.metric_count, 6);
    assert_eq!(view.stats.model_count, 1);
    assert_eq!(view.stats.project_count, 2);

    let accuracies: Vec<(String, f64)> = view
        .experiment_metrics
        .iter()
        .map(|e| (e.experiment.clone(), e.accuracy))
        .collect();
    assert_eq!(
        accuracies,
        vec![
            ("brave-panda".to_string(), 0.6),
            ("calm-otter".to_string(), 0.68),
            ("quiet-falcon".to_string(), 0.4),
        ]
    );
    assert_eq!(view.project_metrics.len(), 1);
    assert_eq!(view.project_metrics[0].accuracy, 0.632);
    assert_eq!(view.usage.len(), 1);
}

#[test]
fn profile_command_prints_json() {
    let output = runledger(&["profile", "--data", FIXTURE_PATH, "--owner", "1"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["username"], "ada");
    assert_eq!(json["stats"]["experimentCount"], 4);
    assert_eq!(json["stats"]["metricCount"], 6);
}

#[test]
fn report_command_writes_html() {
    let work = tempfile::tempdir().unwrap();
    let charts = work.path().join("charts");
    let out = work.path().join("report.html");

    let output = runledger(&[
        "report",
        "--data",
        FIXTURE_PATH,
        "--owner",
        "1",
        "--project",
        "1",
        "--out",
        out.to_str().unwrap(),
        "--chart-dir",
        charts.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("<strong>Total Experiments:</strong> 2</p>"));
    assert!(html.contains("<td>calm-otter</td><td>0.6800</td>"));
    assert_eq!(html.matches("data:image/png;base64,").count(), 7);
    assert_eq!(fs::read_dir(&charts).unwrap().count(), 0);
}

#[test]
fn project_without_metrics_exits_with_two() {
    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("report.html");
    let output = runledger(&[
        "report",
        "--data",
        FIXTURE_PATH,
        "--owner",
        "1",
        "--project",
        "2",
        "--out",
        out.to_str().unwrap(),
        "--chart-dir",
        work.path().to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("nothing to report"));
    assert!(!out.exists());
}

#[test]
fn foreign_project_exits_with_one() {
    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("report.html");
    let output = runledger(&[
        "report",
        "--data",
        FIXTURE_PATH,
        "--owner",
        "2",
        "--project",
        "1",
        "--out",
        out.to_str().unwrap(),
        "--chart-dir",
        work.path().to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("project 1 not found"));
}
