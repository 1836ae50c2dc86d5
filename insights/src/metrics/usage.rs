//! Resource-usage rollups per experiment.

use serde::Serialize;
use store::{Experiment, ExperimentId, ResourceUsageSample};

use super::summary::mean;
use crate::format::round3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub experiment: ExperimentId,
    pub name: String,
    pub samples: usize,
    pub mean_cpu_percent: Option<f64>,
    pub peak_memory_mb: Option<f64>,
    pub mean_gpu_percent: Option<f64>,
    pub peak_gpu_memory_mb: Option<f64>,
    pub total_training_time_sec: Option<f64>,
}

impl UsageSummary {
    pub fn rounded(&self) -> Self {
        let r = |v: Option<f64>| v.map(round3);
        Self {
            mean_cpu_percent: r(self.mean_cpu_percent),
            peak_memory_mb: r(self.peak_memory_mb),
            mean_gpu_percent: r(self.mean_gpu_percent),
            peak_gpu_memory_mb: r(self.peak_gpu_memory_mb),
            total_training_time_sec: r(self.total_training_time_sec),
            ..self.clone()
        }
    }
}

/// Missing measurements are skipped; a column with no values stays `None`.
pub fn summarize_usage(
    experiment: &Experiment,
    samples: &[ResourceUsageSample],
) -> Option<UsageSummary> {
    if samples.is_empty() {
        return None;
    }

    let present = |f: fn(&ResourceUsageSample) -> Option<f64>| samples.iter().filter_map(f);
    let peak = |f: fn(&ResourceUsageSample) -> Option<f64>| present(f).reduce(f64::max);

    let training_times: Vec<f64> = present(|s| s.training_time_sec).collect();

    Some(UsageSummary {
        experiment: experiment.id,
        name: experiment.name.clone(),
        samples: samples.len(),
        mean_cpu_percent: mean(present(|s| s.cpu_percent)),
        peak_memory_mb: peak(|s| s.memory_mb),
        mean_gpu_percent: mean(present(|s| s.gpu_percent)),
        peak_gpu_memory_mb: peak(|s| s.gpu_memory_mb),
        total_training_time_sec: if training_times.is_empty() {
            None
        } else {
            Some(training_times.iter().sum())
        },
    })
}
