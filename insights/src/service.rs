use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use store::{ExperimentId, MetricSample, MetricsStore, OwnerScope, ProjectId, UserId};
use time::OffsetDateTime;
use tokio::task::{self, JoinHandle};

use crate::charts::{ChartRef, ChartRenderer, LineSeries};
use crate::config::ReportConfig;
use crate::error::{InsightsError, Result};
use crate::metrics::{
    group_by_experiment, summarize, top_k, ExperimentSummary, MetricField, OverallStats, RankKey,
};
use crate::profile::{profile, ProfileSources, ProfileView};
use crate::report::{
    compose_report, ChartSet, DocumentRenderer, RenderedReport, RequestArtifacts, StandaloneHtml,
    UserIdentity,
};

/// Bar charts in document order.
const BAR_METRICS: [MetricField; 3] = [
    MetricField::Accuracy,
    MetricField::Recall,
    MetricField::Precision,
];

/// Read-side facade over a [`MetricsStore`]: profile rollups and project reports.
pub struct Insights<S> {
    store: S,
    config: ReportConfig,
    renderer: Arc<dyn DocumentRenderer>,
}

struct ReportInputs {
    user: UserIdentity,
    project: ProjectId,
    stats: OverallStats,
    top: Vec<ExperimentSummary>,
    samples: HashMap<ExperimentId, Vec<MetricSample>>,
}

impl<S: MetricsStore> Insights<S> {
    /// Reports render as standalone HTML until another renderer is set.
    pub fn new(store: S, config: ReportConfig) -> Self {
        Self {
            store,
            config,
            renderer: Arc::new(StandaloneHtml),
        }
    }

    pub fn with_renderer<R: DocumentRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn build_profile(&self, owner: UserId) -> Result<ProfileView> {
        let user = OwnerScope::new(&self.store, owner).user()?;
        let experiments = self.store.experiments_for_owner(owner, None)?;
        let ids: Vec<ExperimentId> = experiments.iter().map(|e| e.id).collect();

        let metrics = self.store.metrics_for_experiments(&ids)?;
        let models = self.store.models_for_experiments(&ids)?;
        let usage = self.store.resource_usage_for_experiments(&ids)?;
        let projects = self.store.projects_for_owner(owner)?;
        tracing::debug!(
            owner = %owner,
            experiments = experiments.len(),
            metrics = metrics.len(),
            "building profile"
        );

        Ok(profile(ProfileSources {
            user: &user,
            experiments: &experiments,
            metrics: &metrics,
            models: &models,
            projects: &projects,
            usage: &usage,
        }))
    }

    /// Full report for one of `owner`'s projects.
    ///
    /// Fails with `NotFound` when the project is missing or belongs to someone
    /// else, and with `NoData` when none of its experiments has a metric
    /// sample. Chart files live in a fresh `report-{uuid}` directory that is
    /// removed before this returns unless `keep_artifacts` is set.
    pub async fn build_project_report(
        &self,
        owner: UserId,
        project: ProjectId,
    ) -> Result<RenderedReport> {
        let inputs = self.gather(owner, project)?;

        let artifacts =
            RequestArtifacts::create(&self.config.chart_root, self.config.keep_artifacts)?;
        let charts = self.render_charts(artifacts.dir(), &inputs).await?;
        tracing::debug!(
            project = %project,
            charts = charts.in_document_order().len(),
            dir = %artifacts.dir().display(),
            "charts rendered"
        );

        let document = compose_report(
            &inputs.user,
            &inputs.stats,
            &inputs.top,
            &charts,
            OffsetDateTime::now_utc(),
        );

        let renderer = Arc::clone(&self.renderer);
        let bytes = task::spawn_blocking(move || renderer.render(&document))
            .await
            .map_err(|err| InsightsError::RenderFailure(format!("document task failed: {err}")))??;
        drop(artifacts);

        let report = RenderedReport {
            filename: format!("project_{}_report.{}", inputs.project, self.renderer.extension()),
            media_type: self.renderer.media_type(),
            bytes,
        };
        tracing::info!(
            owner = %owner,
            project = %project,
            bytes = report.bytes.len(),
            media_type = report.media_type,
            "report rendered"
        );
        Ok(report)
    }

    fn gather(&self, owner: UserId, project: ProjectId) -> Result<ReportInputs> {
        let scope = OwnerScope::new(&self.store, owner);
        let user = scope.user()?;
        let (project, experiments) = scope.project_experiments(project)?;
        let ids: Vec<ExperimentId> = experiments.iter().map(|e| e.id).collect();
        let metrics = self.store.metrics_for_experiments(&ids)?;
        let samples = group_by_experiment(&metrics, |m| m.experiment);

        let summaries: Vec<ExperimentSummary> = experiments
            .iter()
            .filter_map(|exp| summarize(exp, samples.get(&exp.id)?))
            .collect();
        tracing::debug!(
            owner = %owner,
            project = %project.id,
            experiments = experiments.len(),
            summarized = summaries.len(),
            "report inputs loaded"
        );

        let stats = OverallStats::from_summaries(&summaries)
            .ok_or(InsightsError::NoData { project: project.id })?;
        let top = top_k(&summaries, RankKey::Accuracy, self.config.top_k);

        Ok(ReportInputs {
            user: UserIdentity::from(&user),
            project: project.id,
            stats,
            top,
            samples,
        })
    }

    /// Three bar charts and four line charts, each on the blocking pool.
    /// Any failure fails the whole set.
    async fn render_charts(&self, dir: &Path, inputs: &ReportInputs) -> Result<ChartSet> {
        let renderer = ChartRenderer::new(dir, &self.config);
        let names: Vec<String> = inputs.top.iter().map(|s| s.name.clone()).collect();
        let mut jobs: Vec<JoinHandle<Result<ChartRef>>> = Vec::with_capacity(7);

        for field in BAR_METRICS {
            let values: Vec<f64> = inputs.top.iter().map(|s| summary_value(field, s)).collect();
            let renderer = renderer.clone();
            let names = names.clone();
            jobs.push(task::spawn_blocking(move || {
                renderer.bar_chart(field.label(), &values, &names)
            }));
        }

        for field in MetricField::ALL {
            let series: Vec<LineSeries> = inputs
                .top
                .iter()
                .map(|s| LineSeries {
                    name: s.name.clone(),
                    points: field.series(
                        inputs
                            .samples
                            .get(&s.experiment)
                            .map(Vec::as_slice)
                            .unwrap_or_default(),
                    ),
                })
                .collect();
            let renderer = renderer.clone();
            jobs.push(task::spawn_blocking(move || renderer.line_chart(field.label(), &series)));
        }

        let mut rendered = join_charts(jobs).await?.into_iter();
        let mut next = || {
            rendered
                .next()
                .ok_or_else(|| InsightsError::RenderFailure("chart missing from batch".into()))
        };
        Ok(ChartSet {
            accuracy_bar: next()?,
            recall_bar: next()?,
            precision_bar: next()?,
            accuracy_line: next()?,
            precision_line: next()?,
            recall_line: next()?,
            loss_line: next()?,
        })
    }
}

/// Waits for every job, even after one has failed, so no chart write can
/// outlive the request directory. The first failure in job order wins.
async fn join_charts(jobs: Vec<JoinHandle<Result<ChartRef>>>) -> Result<Vec<ChartRef>> {
    join_all(jobs)
        .await
        .into_iter()
        .map(|joined| {
            joined.map_err(|err| InsightsError::RenderFailure(format!("chart task failed: {err}")))?
        })
        .collect()
}

fn summary_value(field: MetricField, summary: &ExperimentSummary) -> f64 {
    match field {
        MetricField::Accuracy => summary.accuracy,
        MetricField::Precision => summary.precision,
        MetricField::Recall => summary.recall,
        MetricField::Loss => summary.final_loss,
    }
}
