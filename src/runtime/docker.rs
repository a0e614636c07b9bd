//! Docker Engine API implementation of [`ContainerEngine`].

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, ListContainersOptions,
    RemoveContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::image::CommitContainerOptions;
use bollard::models::{
    ContainerInspectResponse, ContainerSummary as DockerSummary, HostConfig, PortBinding,
    PortTypeEnum,
};
use bollard::{API_DEFAULT_VERSION, Docker};
use tracing::{debug, info};

use super::ContainerEngine;
use crate::error::EngineError;
use crate::ports::MergedBindingSet;
use crate::types::{
    ContainerDetails, ContainerSummary, HostEndpoint, PortBindings, PortEntry, PortKey, Protocol,
};

/// Client-side request timeout, on top of any stop timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    /// Connect to `host`, or to the local defaults (`DOCKER_HOST` or the
    /// default socket) when `host` is `None`.
    ///
    /// `host` is a socket path, `unix://` URL, or `tcp://`/`http://` address.
    pub fn connect(host: Option<&str>, stop_timeout: Duration) -> Result<Self, EngineError> {
        let timeout = REQUEST_TIMEOUT.saturating_add(stop_timeout);
        let docker = match host {
            None => Docker::connect_with_local_defaults()?,
            Some(host) if host.starts_with("tcp://") || host.starts_with("http://") => {
                Docker::connect_with_http(host, timeout.as_secs(), API_DEFAULT_VERSION)?
            }
            Some(host) => Docker::connect_with_unix(host, timeout.as_secs(), API_DEFAULT_VERSION)?,
        };
        info!(host = host.unwrap_or("local defaults"), "Connected to Docker engine");
        Ok(Self::with_client(docker.with_timeout(timeout)))
    }

    pub fn with_client(docker: Docker) -> Self {
        Self { docker }
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn list_running(&self) -> Result<Vec<ContainerSummary>, EngineError> {
        let options = ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        };
        let containers = self.docker.list_containers(Some(options)).await?;
        debug!(count = containers.len(), "Listed running containers");
        Ok(containers.into_iter().map(summary_from_listing).collect())
    }

    async fn inspect(&self, id: &str) -> Result<ContainerDetails, EngineError> {
        let response = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await?;
        details_from_inspect(response)
    }

    async fn stop(&self, id: &str, timeout: Duration) -> Result<(), EngineError> {
        let options = StopContainerOptions {
            t: i64::try_from(timeout.as_secs()).unwrap_or(i64::MAX),
        };
        self.docker.stop_container(id, Some(options)).await?;
        Ok(())
    }

    async fn commit(&self, id: &str, image_ref: &str) -> Result<String, EngineError> {
        let (repo, tag) = split_image_ref(image_ref);
        let options = CommitContainerOptions {
            container: id.to_string(),
            repo: repo.to_string(),
            tag: tag.unwrap_or_default().to_string(),
            pause: true,
            ..Default::default()
        };
        self.docker
            .commit_container(options, Config::<String>::default())
            .await?;
        Ok(image_ref.to_string())
    }

    async fn remove(&self, id: &str, force: bool) -> Result<(), EngineError> {
        let options = RemoveContainerOptions {
            force,
            ..Default::default()
        };
        self.docker.remove_container(id, Some(options)).await?;
        Ok(())
    }

    async fn create(
        &self,
        image_ref: &str,
        bindings: &MergedBindingSet,
        name: &str,
    ) -> Result<String, EngineError> {
        let (exposed_ports, port_bindings) = engine_port_maps(bindings);
        let config = Config {
            image: Some(image_ref.to_string()),
            exposed_ports: Some(exposed_ports),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                ..Default::default()
            }),
            ..Default::default()
        };
        let options = CreateContainerOptions {
            name: name.to_string(),
            platform: None,
        };
        let response = self.docker.create_container(Some(options), config).await?;
        for warning in &response.warnings {
            debug!(container = name, "Engine warning: {}", warning);
        }
        Ok(response.id)
    }

    async fn start(&self, id: &str) -> Result<(), EngineError> {
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await?;
        Ok(())
    }
}

/// Split `repo[:tag]`; a `:` before the last `/` belongs to a registry host.
pub fn split_image_ref(image_ref: &str) -> (&str, Option<&str>) {
    let name_start = image_ref.rfind('/').map_or(0, |i| i + 1);
    match image_ref[name_start..].rfind(':') {
        Some(i) => {
            let at = name_start + i;
            (&image_ref[..at], Some(&image_ref[at + 1..]))
        }
        None => (image_ref, None),
    }
}

fn summary_from_listing(container: DockerSummary) -> ContainerSummary {
    let name = container
        .names
        .as_ref()
        .and_then(|names| names.first())
        .map(String::as_str)
        .unwrap_or_default();

    let ports = container
        .ports
        .unwrap_or_default()
        .into_iter()
        .filter_map(|port| {
            let protocol = match port.typ {
                Some(PortTypeEnum::TCP) => Protocol::Tcp,
                Some(PortTypeEnum::UDP) => Protocol::Udp,
                _ => return None,
            };
            Some(PortEntry {
                host_ip: port.ip.unwrap_or_default(),
                host_port: port.public_port.map(|p| p.to_string()).unwrap_or_default(),
                container_port: port.private_port.to_string(),
                protocol,
            })
        })
        .collect();

    ContainerSummary::new(container.id.unwrap_or_default(), name, ports)
}

fn details_from_inspect(response: ContainerInspectResponse) -> Result<ContainerDetails, EngineError> {
    let config = response.config.unwrap_or_default();
    let host_config = response.host_config.unwrap_or_default();

    let image = response
        .image
        .filter(|image| !image.is_empty())
        .or(config.image)
        .ok_or_else(|| EngineError::UnexpectedResponse("container has no image".to_string()))?;

    let exposed_ports = config
        .exposed_ports
        .unwrap_or_default()
        .keys()
        .map(|key| parse_engine_key(key))
        .collect::<Result<BTreeSet<_>, EngineError>>()?;

    let mut port_bindings = PortBindings::new();
    for (key, bindings) in host_config.port_bindings.unwrap_or_default() {
        let endpoints = bindings
            .unwrap_or_default()
            .into_iter()
            .map(|binding| {
                HostEndpoint::new(
                    binding.host_ip.unwrap_or_default(),
                    binding.host_port.unwrap_or_default(),
                )
            });
        port_bindings
            .entry(parse_engine_key(&key)?)
            .or_insert_with(Vec::new)
            .extend(endpoints);
    }

    Ok(ContainerDetails {
        id: response.id.unwrap_or_default(),
        name: response
            .name
            .unwrap_or_default()
            .trim_start_matches('/')
            .to_string(),
        image,
        auto_remove: host_config.auto_remove.unwrap_or(false),
        exposed_ports,
        port_bindings,
    })
}

fn parse_engine_key(key: &str) -> Result<PortKey, EngineError> {
    key.parse::<PortKey>()
        .map_err(|reason| EngineError::UnexpectedResponse(format!("port '{key}': {reason}")))
}

type ExposedPorts = HashMap<String, HashMap<(), ()>>;
type EnginePortMap = HashMap<String, Option<Vec<PortBinding>>>;

fn engine_port_maps(bindings: &MergedBindingSet) -> (ExposedPorts, EnginePortMap) {
    let exposed = bindings
        .exposed_ports()
        .iter()
        .map(|key| (key.to_string(), HashMap::new()))
        .collect();

    let port_bindings = bindings
        .bindings()
        .iter()
        .map(|(key, endpoints)| {
            let engine_bindings = endpoints
                .iter()
                .map(|endpoint| PortBinding {
                    host_ip: non_empty(&endpoint.host_ip),
                    host_port: non_empty(&endpoint.host_port),
                })
                .collect();
            (key.to_string(), Some(engine_bindings))
        })
        .collect();

    (exposed, port_bindings)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
