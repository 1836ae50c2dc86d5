//! Per-experiment summary statistics.

use serde::Serialize;
use store::{Experiment, ExperimentId, MetricSample};

use crate::format::round4;

/// Guards the F-measure denominator; precision and recall can both be exactly zero.
const F_EPSILON: f64 = 1e-12;

/// Metric columns of a [`MetricSample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricField {
    Accuracy,
    Precision,
    Recall,
    Loss,
}

impl MetricField {
    pub const ALL: [MetricField; 4] = [
        MetricField::Accuracy,
        MetricField::Precision,
        MetricField::Recall,
        MetricField::Loss,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MetricField::Accuracy => "Accuracy",
            MetricField::Precision => "Precision",
            MetricField::Recall => "Recall",
            MetricField::Loss => "Loss",
        }
    }

    pub fn value(self, sample: &MetricSample) -> f64 {
        match self {
            MetricField::Accuracy => sample.accuracy,
            MetricField::Precision => sample.precision,
            MetricField::Recall => sample.recall,
            MetricField::Loss => sample.loss,
        }
    }

    /// `(epoch, value)` points ordered by epoch; equal epochs keep input order.
    pub fn series(self, samples: &[MetricSample]) -> Vec<(i64, f64)> {
        let mut sorted: Vec<&MetricSample> = samples.iter().collect();
        sorted.sort_by_key(|sample| sample.epoch);
        sorted
            .into_iter()
            .map(|sample| (sample.epoch, self.value(sample)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentSummary {
    pub experiment: ExperimentId,
    pub name: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    /// Loss reported at the highest epoch.
    pub final_loss: f64,
    pub final_epoch: i64,
    pub samples: usize,
}

impl ExperimentSummary {
    pub fn f_measure(&self) -> f64 {
        f_measure(self.precision, self.recall)
    }

    /// Copy with every statistic rounded to four decimals, for display.
    pub fn rounded(&self) -> Self {
        Self {
            accuracy: round4(self.accuracy),
            precision: round4(self.precision),
            recall: round4(self.recall),
            final_loss: round4(self.final_loss),
            ..self.clone()
        }
    }
}

/// Summarise one experiment's samples. `None` when there are no samples, in
/// which case the experiment takes no part in ranking or reporting.
pub fn summarize(experiment: &Experiment, samples: &[MetricSample]) -> Option<ExperimentSummary> {
    let accuracy = mean(samples.iter().map(|s| s.accuracy))?;
    let precision = mean(samples.iter().map(|s| s.precision))?;
    let recall = mean(samples.iter().map(|s| s.recall))?;

    // max_by_key yields the last of several equal maxima, so among samples that
    // share the highest epoch the most recently inserted one wins.
    let last = samples.iter().max_by_key(|s| s.epoch)?;

    Some(ExperimentSummary {
        experiment: experiment.id,
        name: experiment.name.clone(),
        accuracy,
        precision,
        recall,
        final_loss: last.loss,
        final_epoch: last.epoch,
        samples: samples.len(),
    })
}

pub fn mean_accuracy(samples: &[MetricSample]) -> Option<f64> {
    mean(samples.iter().map(|s| s.accuracy))
}

pub fn f_measure(precision: f64, recall: f64) -> f64 {
    2.0 * precision * recall / (precision + recall + F_EPSILON)
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
