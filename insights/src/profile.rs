//! Per-user profile rollup: counts, mean accuracy per experiment and per
//! project, and resource usage per experiment.

use std::collections::HashMap;

use serde::Serialize;
use store::{
    Experiment, ExperimentId, MetricSample, ModelFile, Project, ProjectId, ResourceUsageSample,
    User,
};

use crate::format::round3;
use crate::metrics::{group_by_experiment, mean_accuracy, summarize_usage, UsageSummary};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub username: String,
    pub email: String,
    pub stats: ProfileStats,
    pub experiment_metrics: Vec<ExperimentAccuracy>,
    pub project_metrics: Vec<ProjectAccuracy>,
    pub usage: Vec<UsageSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub experiment_count: usize,
    pub model_count: usize,
    pub metric_count: usize,
    pub project_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentAccuracy {
    pub experiment: String,
    pub experiment_id: ExperimentId,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectAccuracy {
    pub project: String,
    pub project_id: ProjectId,
    pub accuracy: f64,
}

/// Everything the profile is computed from, already restricted to one owner.
#[derive(Debug, Clone, Copy)]
pub struct ProfileSources<'a> {
    pub user: &'a User,
    pub experiments: &'a [Experiment],
    pub metrics: &'a [MetricSample],
    pub models: &'a [ModelFile],
    pub projects: &'a [Project],
    pub usage: &'a [ResourceUsageSample],
}

/// Experiments and projects without samples are counted but get no accuracy
/// entry. Accuracies are rounded to three decimals.
pub fn profile(sources: ProfileSources<'_>) -> ProfileView {
    let by_experiment = group_by_experiment(sources.metrics, |m| m.experiment);
    let usage_by_experiment = group_by_experiment(sources.usage, |u| u.experiment);

    let experiment_metrics = sources
        .experiments
        .iter()
        .filter_map(|exp| {
            let samples = by_experiment.get(&exp.id)?;
            Some(ExperimentAccuracy {
                experiment: exp.name.clone(),
                experiment_id: exp.id,
                accuracy: round3(mean_accuracy(samples)?),
            })
        })
        .collect();

    let mut by_project: HashMap<ProjectId, Vec<MetricSample>> = HashMap::new();
    for exp in sources.experiments {
        if let (Some(project), Some(samples)) = (exp.project, by_experiment.get(&exp.id)) {
            by_project.entry(project).or_default().extend_from_slice(samples);
        }
    }
    let project_metrics = sources
        .projects
        .iter()
        .filter_map(|project| {
            let samples = by_project.get(&project.id)?;
            Some(ProjectAccuracy {
                project: project.name.clone(),
                project_id: project.id,
                accuracy: round3(mean_accuracy(samples)?),
            })
        })
        .collect();

    let usage = sources
        .experiments
        .iter()
        .filter_map(|exp| {
            let samples = usage_by_experiment.get(&exp.id)?;
            summarize_usage(exp, samples).map(|summary| summary.rounded())
        })
        .collect();

    ProfileView {
        username: sources.user.username.clone(),
        email: sources.user.email.clone(),
        stats: ProfileStats {
            experiment_count: sources.experiments.len(),
            model_count: sources.models.len(),
            metric_count: sources.metrics.len(),
            project_count: sources.projects.len(),
        },
        experiment_metrics,
        project_metrics,
        usage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::UserId;
    use time::OffsetDateTime;

    fn user() -> User {
        User {
            id: UserId(1),
            username: "ada".into(),
            email: "ada@example.com".into(),
            api_key: "key".into(),
        }
    }

    fn experiment(id: u64, project: Option<u64>) -> Experiment {
        Experiment {
            id: ExperimentId(id),
            name: format!("exp-{id}"),
            description: String::new(),
            owner: UserId(1),
            project: project.map(ProjectId),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn project(id: u64) -> Project {
        Project {
            id: ProjectId(id),
            name: format!("project-{id}"),
            description: String::new(),
            owner: UserId(1),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn metric(exp: u64, epoch: i64, accuracy: f64) -> MetricSample {
        MetricSample::new(ExperimentId(exp), epoch, accuracy, 0.5, 0.5, 0.1)
    }

    #[test]
    fn two_experiments_one_with_metrics() {
        let user = user();
        let experiments = [experiment(1, None), experiment(2, None)];
        let metrics = [metric(1, 1, 0.8), metric(1, 2, 0.9)];
        let view = profile(ProfileSources {
            user: &user,
            experiments: &experiments,
            metrics: &metrics,
            models: &[],
            projects: &[],
            usage: &[],
        });

        assert_eq!(view.stats.experiment_count, 2);
        assert_eq!(view.stats.metric_count, 2);
        assert_eq!(view.experiment_metrics.len(), 1);
        assert_eq!(view.experiment_metrics[0].experiment, "exp-1");
        assert_eq!(view.experiment_metrics[0].accuracy, 0.85);
        assert!(view.usage.is_empty());
    }

    #[test]
    fn project_accuracy_spans_all_its_experiments() {
        let user = user();
        let projects = [project(10), project(11)];
        let experiments = [experiment(1, Some(10)), experiment(2, Some(10)), experiment(3, None)];
        let metrics = [
            metric(1, 1, 0.2),
            metric(2, 1, 0.4),
            metric(2, 2, 0.6),
            metric(3, 1, 1.0),
        ];
        let view = profile(ProfileSources {
            user: &user,
            experiments: &experiments,
            metrics: &metrics,
            models: &[],
            projects: &projects,
            usage: &[],
        });

        assert_eq!(view.stats.project_count, 2);
        assert_eq!(view.project_metrics.len(), 1);
        assert_eq!(view.project_metrics[0].project_id, ProjectId(10));
        assert_eq!(view.project_metrics[0].accuracy, 0.4);
    }

    #[test]
    fn accuracy_is_rounded_to_three_places() {
        let user = user();
        let experiments = [experiment(1, None)];
        let metrics = [metric(1, 1, 0.12345), metric(1, 2, 0.12345)];
        let view = profile(ProfileSources {
            user: &user,
            experiments: &experiments,
            metrics: &metrics,
            models: &[],
            projects: &[],
            usage: &[],
        });
        assert_eq!(view.experiment_metrics[0].accuracy, 0.123);
    }

    #[test]
    fn json_uses_camel_case_stats() {
        let user = user();
        let experiments = [experiment(1, None)];
        let models = [ModelFile {
            experiment: ExperimentId(1),
            file_path: "models/exp-1.pt".into(),
            uploaded_at: OffsetDateTime::UNIX_EPOCH,
        }];
        let view = profile(ProfileSources {
            user: &user,
            experiments: &experiments,
            metrics: &[],
            models: &models,
            projects: &[],
            usage: &[],
        });

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["stats"]["experimentCount"], 1);
        assert_eq!(json["stats"]["modelCount"], 1);
        assert_eq!(json["stats"]["metricCount"], 0);
        assert_eq!(json["stats"]["projectCount"], 0);
        assert!(json["experiment_metrics"].as_array().unwrap().is_empty());
        assert_eq!(json["username"], "ada");
    }
}
