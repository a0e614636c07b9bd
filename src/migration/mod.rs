//! Re-publication of a running container under new port bindings.
//!
//! The sequence is inspect → (stop → commit) → merge → remove → create →
//! start. A failing step aborts the rest and nothing is rolled back: once
//! the source is removed, a failed create or start leaves only the snapshot
//! image behind.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::error::{Result, Step, SwimError};
use crate::ports::{MergeMode, MergedBindingSet, PortSpec, merge_bindings, parse_port_specs};
use crate::runtime::ContainerEngine;

pub mod naming;

pub use naming::{Names, resolve_names};

pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Operator choices for one migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOptions {
    pub ports: Vec<PortSpec>,
    pub image_name: Option<String>,
    pub container_name: Option<String>,
    pub stop_timeout: Duration,
    pub force_overwrite: bool,
}

impl MigrationOptions {
    pub fn new(ports: Vec<PortSpec>) -> Self {
        Self {
            ports,
            image_name: None,
            container_name: None,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            force_overwrite: false,
        }
    }

    /// Parse raw `hostIP:hostPort:containerPort` mappings
    pub fn parse<I, S>(ports: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::new(parse_port_specs(ports)?))
    }

    pub fn with_image_name(mut self, name: Option<String>) -> Self {
        self.image_name = name;
        self
    }

    pub fn with_container_name(mut self, name: Option<String>) -> Self {
        self.container_name = name;
        self
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    pub fn with_force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }
}

/// What a migration did, or was about to do when it stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    pub source_container_id: String,
    pub snapshot_image_ref: String,
    pub target_container_name: String,
    pub merged_bindings: MergedBindingSet,
    pub force_overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub plan: MigrationPlan,
    pub new_container_id: String,
    /// False when the source was auto-remove and its image was reused
    pub committed: bool,
}

pub struct Migrator<'a, E: ?Sized> {
    engine: &'a E,
}

impl<'a, E> Migrator<'a, E>
where
    E: ContainerEngine + ?Sized,
{
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    pub async fn migrate(&self, source_id: &str, options: &MigrationOptions) -> Result<MigrationOutcome> {
        let names = resolve_names(options.image_name.clone(), options.container_name.clone());
        info!(
            container = source_id,
            image = %names.image,
            target = %names.container,
            "Re-publishing container"
        );

        let details = self
            .engine
            .inspect(source_id)
            .await
            .map_err(|e| SwimError::engine(Step::Inspect, e))?;

        let committed = !details.auto_remove;
        let snapshot_image_ref = if details.auto_remove {
            warn!(
                container = source_id,
                image = %details.image,
                "Container is auto-remove; skipping stop and commit, reusing its image"
            );
            details.image.clone()
        } else {
            info!(container = source_id, timeout = ?options.stop_timeout, "Stopping container");
            self.engine
                .stop(source_id, options.stop_timeout)
                .await
                .map_err(|e| SwimError::engine(Step::Stop, e))?;

            info!(container = source_id, image = %names.image, "Committing container");
            self.engine
                .commit(source_id, &names.image)
                .await
                .map_err(|e| SwimError::engine(Step::Commit, e))?
        };

        let mode = MergeMode::from_force(options.force_overwrite);
        let merged_bindings = merge_bindings(&details.port_bindings, &options.ports, mode);
        for (key, endpoints) in merged_bindings.bindings() {
            for endpoint in endpoints {
                info!(port = %key, host = %endpoint, "Binding");
            }
        }

        let plan = MigrationPlan {
            source_container_id: source_id.to_string(),
            snapshot_image_ref,
            target_container_name: names.container,
            merged_bindings,
            force_overwrite: options.force_overwrite,
        };

        info!(container = source_id, "Removing source container");
        self.engine
            .remove(source_id, true)
            .await
            .map_err(|e| SwimError::engine(Step::Remove, e))?;

        info!(
            image = %plan.snapshot_image_ref,
            name = %plan.target_container_name,
            "Creating replacement container"
        );
        let new_container_id = self
            .engine
            .create(
                &plan.snapshot_image_ref,
                &plan.merged_bindings,
                &plan.target_container_name,
            )
            .await
            .map_err(|e| {
                report_orphaned_snapshot(&plan);
                SwimError::orphaned(Step::Create, &plan.snapshot_image_ref, e)
            })?;

        self.engine.start(&new_container_id).await.map_err(|e| {
            error!(
                container = %new_container_id,
                name = %plan.target_container_name,
                "Replacement container was created but did not start"
            );
            report_orphaned_snapshot(&plan);
            SwimError::orphaned(Step::Start, &plan.snapshot_image_ref, e)
        })?;

        info!(
            container = %new_container_id,
            name = %plan.target_container_name,
            "Container started with new port mappings"
        );

        Ok(MigrationOutcome {
            plan,
            new_container_id,
            committed,
        })
    }
}

fn report_orphaned_snapshot(plan: &MigrationPlan) {
    error!(
        source = %plan.source_container_id,
        image = %plan.snapshot_image_ref,
        "Source container is already removed; recreate it from the snapshot image"
    );
}
