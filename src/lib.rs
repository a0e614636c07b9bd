//! Swim - re-publish a running container under new port mappings
//!
//! A running container is snapshotted into a new image and recreated with a
//! merged set of port bindings. The container can be named directly or picked
//! interactively.

pub mod config;
pub mod error;
pub mod migration;
pub mod ports;
pub mod runtime;
pub mod selector;
pub mod types;

use std::time::Duration;

pub use config::SwimConfig;
pub use error::{Result, Step, SwimError};
pub use migration::{MigrationOptions, MigrationOutcome, MigrationPlan, Migrator};
pub use ports::{MergeMode, MergedBindingSet, PortSpec};
pub use runtime::{ContainerEngine, DockerEngine};
pub use selector::Selection;
pub use types::{ContainerDetails, ContainerSummary, HostEndpoint, PortEntry, PortKey, Protocol};

use error::AbortReason;

/// Raw operator input for one `update-port` run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePortRequest {
    pub container: Option<String>,
    pub ports: Vec<String>,
    pub image_name: Option<String>,
    pub container_name: Option<String>,
    pub stop_timeout: Duration,
    pub force_overwrite: bool,
}

impl UpdatePortRequest {
    /// Validate the request; no engine is involved
    pub fn options(&self) -> Result<MigrationOptions> {
        Ok(MigrationOptions::parse(&self.ports)?
            .with_image_name(self.image_name.clone())
            .with_container_name(self.container_name.clone())
            .with_stop_timeout(self.stop_timeout)
            .with_force_overwrite(self.force_overwrite))
    }
}

/// Core Swim API over a container engine
pub struct Swim<E> {
    engine: E,
}

impl<E> Swim<E>
where
    E: ContainerEngine,
{
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// List running containers
    pub async fn list_containers(&self) -> Result<Vec<ContainerSummary>> {
        self.engine
            .list_running()
            .await
            .map_err(|e| SwimError::engine(Step::List, e))
    }

    /// List running containers and let `select` pick one.
    ///
    /// `select` runs on a blocking thread and is not called when nothing is
    /// running.
    pub async fn select_container<S>(&self, select: S) -> Result<String>
    where
        S: FnOnce(Vec<ContainerSummary>) -> Result<Selection> + Send + 'static,
    {
        let containers = self.list_containers().await?;
        if containers.is_empty() {
            return Err(SwimError::SelectionAborted(AbortReason::NoContainers));
        }

        let selection = tokio::task::spawn_blocking(move || select(containers))
            .await
            .map_err(|e| SwimError::Terminal(std::io::Error::other(e)))??;
        selection.into_result()
    }

    /// Re-publish a container with new port mappings.
    ///
    /// Port mappings are validated before the engine is contacted. Without an
    /// explicit container the operator picks one through `select`.
    pub async fn update_port<S>(&self, request: &UpdatePortRequest, select: S) -> Result<MigrationOutcome>
    where
        S: FnOnce(Vec<ContainerSummary>) -> Result<Selection> + Send + 'static,
    {
        let options = request.options()?;

        let container = match &request.container {
            Some(container) => container.clone(),
            None => self.select_container(select).await?,
        };

        Migrator::new(&self.engine).migrate(&container, &options).await
    }
}
