//! Owner-scoped fetches. A record owned by someone else is reported exactly like
//! a missing one, so callers cannot probe other accounts.

use crate::error::{StoreError, StoreResult};
use crate::model::{Experiment, ExperimentId, MetricSample, Project, ProjectId, User, UserId};
use crate::repo::MetricsStore;

pub struct OwnerScope<'a, S: MetricsStore + ?Sized> {
    store: &'a S,
    owner: UserId,
}

impl<'a, S: MetricsStore + ?Sized> OwnerScope<'a, S> {
    pub fn new(store: &'a S, owner: UserId) -> Self {
        Self { store, owner }
    }

    pub fn user(&self) -> StoreResult<User> {
        self.store
            .user(self.owner)?
            .ok_or_else(|| StoreError::not_found("user", self.owner.raw()))
    }

    pub fn project(&self, id: ProjectId) -> StoreResult<Project> {
        self.store
            .projects_for_owner(self.owner)?
            .into_iter()
            .find(|project| project.id == id)
            .ok_or_else(|| StoreError::not_found("project", id.raw()))
    }

    pub fn experiment(&self, id: ExperimentId) -> StoreResult<Experiment> {
        self.store
            .experiments_for_owner(self.owner, None)?
            .into_iter()
            .find(|experiment| experiment.id == id)
            .ok_or_else(|| StoreError::not_found("experiment", id.raw()))
    }

    /// Experiments of one owned project; the project itself must be owned.
    pub fn project_experiments(&self, id: ProjectId) -> StoreResult<(Project, Vec<Experiment>)> {
        let project = self.project(id)?;
        let experiments = self.store.experiments_for_owner(self.owner, Some(id))?;
        Ok((project, experiments))
    }

    pub fn experiment_metrics(&self, id: ExperimentId) -> StoreResult<Vec<MetricSample>> {
        let experiment = self.experiment(id)?;
        self.store.metrics_for_experiments(&[experiment.id])
    }
}
