//! Ranking of experiment summaries and statistics over the full summary set.

use std::cmp::Ordering;

use serde::Serialize;

use super::summary::{mean, ExperimentSummary};

/// Statistic used to order experiments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankKey {
    #[default]
    Accuracy,
    Precision,
    Recall,
    FMeasure,
    /// Lower is better.
    FinalLoss,
}

impl RankKey {
    fn value(self, summary: &ExperimentSummary) -> f64 {
        match self {
            RankKey::Accuracy => summary.accuracy,
            RankKey::Precision => summary.precision,
            RankKey::Recall => summary.recall,
            RankKey::FMeasure => summary.f_measure(),
            RankKey::FinalLoss => summary.final_loss,
        }
    }

    fn higher_is_better(self) -> bool {
        !matches!(self, RankKey::FinalLoss)
    }

    /// Best first; non-finite values after every finite one.
    fn compare(self, a: &ExperimentSummary, b: &ExperimentSummary) -> Ordering {
        let (x, y) = (self.value(a), self.value(b));
        match (x.is_finite(), y.is_finite()) {
            (true, true) => {
                let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
                if self.higher_is_better() {
                    ord.reverse()
                } else {
                    ord
                }
            }
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => Ordering::Equal,
        }
    }
}

/// The `k` best summaries by `key`. The sort is stable, so ties keep their
/// input order.
pub fn top_k(summaries: &[ExperimentSummary], key: RankKey, k: usize) -> Vec<ExperimentSummary> {
    if k == 0 {
        return Vec::new();
    }
    let mut ranked = summaries.to_vec();
    ranked.sort_by(|a, b| key.compare(a, b));
    ranked.truncate(k);
    ranked
}

/// Header statistics over every summarised experiment, not just the top-k.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverallStats {
    pub total: usize,
    pub mean_accuracy: f64,
    pub mean_recall: f64,
    pub best_accuracy: f64,
    pub best_recall: f64,
}

impl OverallStats {
    /// `None` for an empty set; the report pipeline treats that as "no data".
    pub fn from_summaries(summaries: &[ExperimentSummary]) -> Option<Self> {
        let mean_accuracy = mean(summaries.iter().map(|s| s.accuracy))?;
        let mean_recall = mean(summaries.iter().map(|s| s.recall))?;
        Some(Self {
            total: summaries.len(),
            mean_accuracy,
            mean_recall,
            best_accuracy: summaries
                .iter()
                .map(|s| s.accuracy)
                .fold(f64::NEG_INFINITY, f64::max),
            best_recall: summaries
                .iter()
                .map(|s| s.recall)
                .fold(f64::NEG_INFINITY, f64::max),
        })
    }
}
