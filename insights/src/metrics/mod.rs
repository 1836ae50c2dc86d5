//! Aggregation over raw per-epoch rows: experiment summaries, ranking and
//! resource-usage rollups. Everything here is pure and synchronous.

pub mod rank;
pub mod summary;
pub mod usage;

use std::collections::HashMap;

use store::ExperimentId;

pub use rank::{top_k, OverallStats, RankKey};
pub use summary::{f_measure, mean_accuracy, summarize, ExperimentSummary, MetricField};
pub use usage::{summarize_usage, UsageSummary};

/// Group rows by experiment, keeping each experiment's rows in input order.
pub fn group_by_experiment<T, F>(rows: &[T], key: F) -> HashMap<ExperimentId, Vec<T>>
where
    T: Copy,
    F: Fn(&T) -> ExperimentId,
{
    let mut grouped: HashMap<ExperimentId, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(key(row)).or_default().push(*row);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MetricSample;

    #[test]
    fn grouping_preserves_row_order() {
        let a = ExperimentId(1);
        let b = ExperimentId(2);
        let rows = vec![
            MetricSample::new(a, 2, 0.1, 0.1, 0.1, 0.9),
            MetricSample::new(b, 1, 0.2, 0.2, 0.2, 0.8),
            MetricSample::new(a, 1, 0.3, 0.3, 0.3, 0.7),
        ];
        let grouped = group_by_experiment(&rows, |m| m.experiment);
        let epochs: Vec<i64> = grouped[&a].iter().map(|m| m.epoch).collect();
        assert_eq!(epochs, vec![2, 1]);
        assert_eq!(grouped[&b].len(), 1);
    }
}
