//! In-process store backed by plain vectors behind a lock.
//!
//! Rows keep insertion order, which is what the reporting core relies on when
//! several metric samples share an epoch. The whole table set can be written to
//! and read from a JSON snapshot ([`Dataset`]).

use std::fs;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::model::{
    Experiment, ExperimentId, MetricSample, ModelFile, Project, ProjectId, ResourceUsageSample,
    User, UserId,
};
use crate::names::generate_name;
use crate::repo::MetricsStore;

/// Serializable table set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub experiments: Vec<Experiment>,
    #[serde(default)]
    pub metrics: Vec<MetricSample>,
    #[serde(default)]
    pub resource_usage: Vec<ResourceUsageSample>,
    #[serde(default)]
    pub models: Vec<ModelFile>,
}

impl Dataset {
    pub fn from_json(raw: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn owns_experiment(&self, owner: UserId, id: ExperimentId) -> bool {
        self.experiments
            .iter()
            .any(|experiment| experiment.id == id && experiment.owner == owner)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Dataset>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(dataset: Dataset) -> Self {
        Self {
            tables: RwLock::new(dataset),
        }
    }

    pub fn load(path: &Path) -> StoreResult<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(Self::from_snapshot(Dataset::from_json(&raw)?))
    }

    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let json = self.snapshot()?.to_json()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, json)?;
        Ok(())
    }

    pub fn snapshot(&self) -> StoreResult<Dataset> {
        Ok(self.read()?.clone())
    }

    pub fn register_user(&self, username: &str, email: &str) -> StoreResult<User> {
        let mut tables = self.write()?;
        if tables
            .users
            .iter()
            .any(|user| user.username == username || user.email == email)
        {
            return Err(StoreError::Conflict(format!(
                "username or email already registered: {username}"
            )));
        }

        let id = UserId(next_id(tables.users.iter().map(|u| u.id.raw())));
        let user = User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            api_key: Uuid::new_v4().to_string(),
        };
        tables.users.push(user.clone());
        debug!(user = %id, "registered user");
        Ok(user)
    }

    pub fn user_by_api_key(&self, api_key: &str) -> StoreResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .iter()
            .find(|user| user.api_key == api_key)
            .cloned())
    }

    pub fn create_project(
        &self,
        owner: UserId,
        name: &str,
        description: &str,
    ) -> StoreResult<Project> {
        let mut tables = self.write()?;
        require_user(&tables, owner)?;

        let project = Project {
            id: ProjectId(next_id(tables.projects.iter().map(|p| p.id.raw()))),
            name: name.to_string(),
            description: description.to_string(),
            owner,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.projects.push(project.clone());
        Ok(project)
    }

    /// The experiment gets a generated `adjective-noun` name.
    pub fn create_experiment<R: Rng + ?Sized>(
        &self,
        owner: UserId,
        project: Option<ProjectId>,
        description: &str,
        rng: &mut R,
    ) -> StoreResult<Experiment> {
        let mut tables = self.write()?;
        require_user(&tables, owner)?;
        if let Some(project_id) = project {
            let owned = tables
                .projects
                .iter()
                .any(|p| p.id == project_id && p.owner == owner);
            if !owned {
                return Err(StoreError::not_found("project", project_id.raw()));
            }
        }

        let experiment = Experiment {
            id: ExperimentId(next_id(tables.experiments.iter().map(|e| e.id.raw()))),
            name: generate_name(rng),
            description: description.to_string(),
            owner,
            project,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.experiments.push(experiment.clone());
        debug!(experiment = %experiment.id, name = %experiment.name, "created experiment");
        Ok(experiment)
    }

    pub fn add_metric(&self, owner: UserId, sample: MetricSample) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.owns_experiment(owner, sample.experiment) {
            return Err(StoreError::not_found("experiment", sample.experiment.raw()));
        }
        tables.metrics.push(sample);
        Ok(())
    }

    pub fn add_resource_usage(
        &self,
        owner: UserId,
        sample: ResourceUsageSample,
    ) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.owns_experiment(owner, sample.experiment) {
            return Err(StoreError::not_found("experiment", sample.experiment.raw()));
        }
        tables.resource_usage.push(sample);
        Ok(())
    }

    /// Replaces any model previously attached to the experiment.
    pub fn attach_model(
        &self,
        owner: UserId,
        experiment: ExperimentId,
        file_path: &str,
    ) -> StoreResult<ModelFile> {
        let mut tables = self.write()?;
        if !tables.owns_experiment(owner, experiment) {
            return Err(StoreError::not_found("experiment", experiment.raw()));
        }
        tables.models.retain(|model| model.experiment != experiment);
        let model = ModelFile {
            experiment,
            file_path: file_path.to_string(),
            uploaded_at: OffsetDateTime::now_utc(),
        };
        tables.models.push(model.clone());
        Ok(model)
    }

    /// Removes the experiment with its metrics, resource usage and model record.
    pub fn delete_experiment(&self, owner: UserId, id: ExperimentId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.owns_experiment(owner, id) {
            return Err(StoreError::not_found("experiment", id.raw()));
        }
        tables.experiments.retain(|e| e.id != id);
        tables.metrics.retain(|m| m.experiment != id);
        tables.resource_usage.retain(|r| r.experiment != id);
        tables.models.retain(|m| m.experiment != id);
        debug!(experiment = %id, "deleted experiment");
        Ok(())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Dataset>> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Dataset>> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }
}

impl MetricsStore for InMemoryStore {
    fn user(&self, owner: UserId) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.iter().find(|u| u.id == owner).cloned())
    }

    fn projects_for_owner(&self, owner: UserId) -> StoreResult<Vec<Project>> {
        Ok(self
            .read()?
            .projects
            .iter()
            .filter(|p| p.owner == owner)
            .cloned()
            .collect())
    }

    fn experiments_for_owner(
        &self,
        owner: UserId,
        project: Option<ProjectId>,
    ) -> StoreResult<Vec<Experiment>> {
        Ok(self
            .read()?
            .experiments
            .iter()
            .filter(|e| e.owner == owner)
            .filter(|e| project.map_or(true, |id| e.project == Some(id)))
            .cloned()
            .collect())
    }

    fn metrics_for_experiments(&self, ids: &[ExperimentId]) -> StoreResult<Vec<MetricSample>> {
        Ok(self
            .read()?
            .metrics
            .iter()
            .filter(|m| ids.contains(&m.experiment))
            .copied()
            .collect())
    }

    fn resource_usage_for_experiments(
        &self,
        ids: &[ExperimentId],
    ) -> StoreResult<Vec<ResourceUsageSample>> {
        Ok(self
            .read()?
            .resource_usage
            .iter()
            .filter(|r| ids.contains(&r.experiment))
            .copied()
            .collect())
    }

    fn models_for_experiments(&self, ids: &[ExperimentId]) -> StoreResult<Vec<ModelFile>> {
        Ok(self
            .read()?
            .models
            .iter()
            .filter(|m| ids.contains(&m.experiment))
            .cloned()
            .collect())
    }
}

fn require_user(tables: &Dataset, owner: UserId) -> StoreResult<()> {
    if tables.users.iter().any(|u| u.id == owner) {
        Ok(())
    } else {
        Err(StoreError::not_found("user", owner.raw()))
    }
}

fn next_id(existing: impl Iterator<Item = u64>) -> u64 {
    existing.max().unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded() -> (InMemoryStore, User, Experiment) {
        let store = InMemoryStore::new();
        let mut rng = StdRng::seed_from_u64(3);
        let user = store.register_user("affan", "affan@example.com").unwrap();
        let project = store.create_project(user.id, "cifar", "baselines").unwrap();
        let experiment = store
            .create_experiment(user.id, Some(project.id), "resnet", &mut rng)
            .unwrap();
        (store, user, experiment)
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let store = InMemoryStore::new();
        store.register_user("affan", "a@example.com").unwrap();
        let err = store.register_user("affan", "b@example.com").unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn api_key_lookup_finds_registered_user() {
        let store = InMemoryStore::new();
        let user = store.register_user("affan", "a@example.com").unwrap();
        let found = store.user_by_api_key(&user.api_key).unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(store.user_by_api_key("nope").unwrap().is_none());
    }

    #[test]
    fn experiment_in_foreign_project_is_rejected() {
        let (store, _, experiment) = seeded();
        let other = store.register_user("bob", "bob@example.com").unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let err = store
            .create_experiment(other.id, experiment.project, "", &mut rng)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "project", .. }));
    }

    #[test]
    fn metrics_keep_insertion_order() {
        let (store, user, experiment) = seeded();
        for (epoch, loss) in [(2, 0.4), (1, 0.9), (2, 0.3)] {
            store
                .add_metric(
                    user.id,
                    MetricSample::new(experiment.id, epoch, 0.5, 0.5, 0.5, loss),
                )
                .unwrap();
        }
        let losses: Vec<f64> = store
            .metrics_for_experiments(&[experiment.id])
            .unwrap()
            .iter()
            .map(|m| m.loss)
            .collect();
        assert_eq!(losses, vec![0.4, 0.9, 0.3]);
    }

    #[test]
    fn attaching_a_model_replaces_the_previous_one() {
        let (store, user, experiment) = seeded();
        store.attach_model(user.id, experiment.id, "models/1_a.pt").unwrap();
        store.attach_model(user.id, experiment.id, "models/1_b.pt").unwrap();
        let models = store.models_for_experiments(&[experiment.id]).unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].file_path, "models/1_b.pt");
    }

    #[test]
    fn delete_cascades_to_samples_and_model() {
        let (store, user, experiment) = seeded();
        store
            .add_metric(user.id, MetricSample::new(experiment.id, 1, 0.1, 0.1, 0.1, 2.0))
            .unwrap();
        store
            .add_resource_usage(user.id, ResourceUsageSample::empty(experiment.id, 1))
            .unwrap();
        store.attach_model(user.id, experiment.id, "models/1_a.pt").unwrap();

        store.delete_experiment(user.id, experiment.id).unwrap();

        let snapshot = store.snapshot().unwrap();
        assert!(snapshot.experiments.is_empty());
        assert!(snapshot.metrics.is_empty());
        assert!(snapshot.resource_usage.is_empty());
        assert!(snapshot.models.is_empty());
    }

    #[test]
    fn snapshot_survives_json() {
        let (store, user, experiment) = seeded();
        store
            .add_metric(user.id, MetricSample::new(experiment.id, 1, 0.7, 0.6, 0.5, 0.4))
            .unwrap();
        let json = store.snapshot().unwrap().to_json().unwrap();
        let restored = InMemoryStore::from_snapshot(Dataset::from_json(&json).unwrap());
        assert_eq!(
            restored
                .experiments_for_owner(user.id, experiment.project)
                .unwrap()
                .len(),
            1
        );
        assert_eq!(restored.metrics_for_experiments(&[experiment.id]).unwrap().len(), 1);
    }
}
