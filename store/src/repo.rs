use std::sync::Arc;

use crate::error::StoreResult;
use crate::model::{
    Experiment, ExperimentId, MetricSample, ModelFile, Project, ProjectId, ResourceUsageSample,
    User, UserId,
};

/// Read contract the reporting core consumes. Every listing is already filtered
/// by owner or by an id set the caller obtained through an owner-filtered call.
pub trait MetricsStore {
    fn user(&self, owner: UserId) -> StoreResult<Option<User>>;

    fn projects_for_owner(&self, owner: UserId) -> StoreResult<Vec<Project>>;

    /// `project: None` lists every experiment of the owner, with or without a project.
    fn experiments_for_owner(
        &self,
        owner: UserId,
        project: Option<ProjectId>,
    ) -> StoreResult<Vec<Experiment>>;

    /// Samples come back in insertion order.
    fn metrics_for_experiments(&self, ids: &[ExperimentId]) -> StoreResult<Vec<MetricSample>>;

    fn resource_usage_for_experiments(
        &self,
        ids: &[ExperimentId],
    ) -> StoreResult<Vec<ResourceUsageSample>>;

    fn models_for_experiments(&self, ids: &[ExperimentId]) -> StoreResult<Vec<ModelFile>>;
}

impl<S: MetricsStore + ?Sized> MetricsStore for &S {
    fn user(&self, owner: UserId) -> StoreResult<Option<User>> {
        (**self).user(owner)
    }

    fn projects_for_owner(&self, owner: UserId) -> StoreResult<Vec<Project>> {
        (**self).projects_for_owner(owner)
    }

    fn experiments_for_owner(
        &self,
        owner: UserId,
        project: Option<ProjectId>,
    ) -> StoreResult<Vec<Experiment>> {
        (**self).experiments_for_owner(owner, project)
    }

    fn metrics_for_experiments(&self, ids: &[ExperimentId]) -> StoreResult<Vec<MetricSample>> {
        (**self).metrics_for_experiments(ids)
    }

    fn resource_usage_for_experiments(
        &self,
        ids: &[ExperimentId],
    ) -> StoreResult<Vec<ResourceUsageSample>> {
        (**self).resource_usage_for_experiments(ids)
    }

    fn models_for_experiments(&self, ids: &[ExperimentId]) -> StoreResult<Vec<ModelFile>> {
        (**self).models_for_experiments(ids)
    }
}

impl<S: MetricsStore + ?Sized> MetricsStore for Arc<S> {
    fn user(&self, owner: UserId) -> StoreResult<Option<User>> {
        (**self).user(owner)
    }

    fn projects_for_owner(&self, owner: UserId) -> StoreResult<Vec<Project>> {
        (**self).projects_for_owner(owner)
    }

    fn experiments_for_owner(
        &self,
        owner: UserId,
        project: Option<ProjectId>,
    ) -> StoreResult<Vec<Experiment>> {
        (**self).experiments_for_owner(owner, project)
    }

    fn metrics_for_experiments(&self, ids: &[ExperimentId]) -> StoreResult<Vec<MetricSample>> {
        (**self).metrics_for_experiments(ids)
    }

    fn resource_usage_for_experiments(
        &self,
        ids: &[ExperimentId],
    ) -> StoreResult<Vec<ResourceUsageSample>> {
        (**self).resource_usage_for_experiments(ids)
    }

    fn models_for_experiments(&self, ids: &[ExperimentId]) -> StoreResult<Vec<ModelFile>> {
        (**self).models_for_experiments(ids)
    }
}
