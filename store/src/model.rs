//! Persisted records. Metric and resource-usage rows are append-only and keyed by
//! caller-supplied epochs, which may repeat or skip.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Account identifier; every project and experiment has exactly one owner.
    UserId
);
id_type!(ProjectId);
id_type!(ExperimentId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner: UserId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub id: ExperimentId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectId>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// One epoch's classification metrics for an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub experiment: ExperimentId,
    pub epoch: i64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub loss: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl MetricSample {
    pub fn new(
        experiment: ExperimentId,
        epoch: i64,
        accuracy: f64,
        precision: f64,
        recall: f64,
        loss: f64,
    ) -> Self {
        Self {
            experiment,
            epoch,
            accuracy,
            precision,
            recall,
            loss,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// Hardware usage for one epoch. Clients may omit any measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsageSample {
    pub experiment: ExperimentId,
    pub epoch: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_memory_mb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_time_sec: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl ResourceUsageSample {
    pub fn empty(experiment: ExperimentId, epoch: i64) -> Self {
        Self {
            experiment,
            epoch,
            cpu_percent: None,
            memory_mb: None,
            gpu_percent: None,
            gpu_memory_mb: None,
            training_time_sec: None,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    pub experiment: ExperimentId,
    pub file_path: String,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_serialise_as_plain_integers() {
        let value = serde_json::to_value(ExperimentId(42)).unwrap();
        assert_eq!(value, json!(42));
    }

    #[test]
    fn usage_sample_accepts_missing_measurements() {
        let sample: ResourceUsageSample = serde_json::from_value(json!({
            "experiment": 3,
            "epoch": 1,
            "cpu_percent": 55.0,
            "timestamp": "2025-05-21T17:44:07Z"
        }))
        .unwrap();
        assert_eq!(sample.cpu_percent, Some(55.0));
        assert!(sample.gpu_percent.is_none());
    }
}
