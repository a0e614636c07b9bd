use std::time::Duration;

use async_trait::async_trait;

use crate::error::EngineError;
use crate::ports::MergedBindingSet;
use crate::types::{ContainerDetails, ContainerSummary};

pub mod docker;

pub use docker::DockerEngine;

/// Container engine operations used by the re-publication workflow.
///
/// Each call is one round-trip to the engine. Callers attach the workflow
/// step to failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Running containers, in engine listing order
    async fn list_running(&self) -> Result<Vec<ContainerSummary>, EngineError>;

    async fn inspect(&self, id: &str) -> Result<ContainerDetails, EngineError>;

    async fn stop(&self, id: &str, timeout: Duration) -> Result<(), EngineError>;

    /// Commit the container's writable layer; returns the new image reference
    async fn commit(&self, id: &str, image_ref: &str) -> Result<String, EngineError>;

    async fn remove(&self, id: &str, force: bool) -> Result<(), EngineError>;

    /// Create a container; returns its id
    async fn create(
        &self,
        image_ref: &str,
        bindings: &MergedBindingSet,
        name: &str,
    ) -> Result<String, EngineError>;

    async fn start(&self, id: &str) -> Result<(), EngineError>;
}
