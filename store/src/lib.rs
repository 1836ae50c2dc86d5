//! Persistence seam for Runledger. Records, the read contract the reporting core
//! consumes, owner scoping and an in-memory store used by the CLI and tests.

pub mod error;
pub mod memory;
pub mod model;
pub mod names;
pub mod scope;

mod repo;
pub use repo::MetricsStore;

pub use error::{StoreError, StoreResult};
pub use memory::{Dataset, InMemoryStore};
pub use model::{
    Experiment, ExperimentId, MetricSample, ModelFile, Project, ProjectId, ResourceUsageSample,
    User, UserId,
};
pub use scope::OwnerScope;
