use std::fmt;
use thiserror::Error;

/// Swim error taxonomy
#[derive(Error, Debug)]
pub enum SwimError {
    #[error("Invalid port mapping")]
    Input(#[from] PortSpecError),

    #[error("No container selected: {0}")]
    SelectionAborted(AbortReason),

    #[error("{step} failed")]
    Engine {
        step: Step,
        #[source]
        source: EngineError,
    },

    /// A step failed after the source container was removed
    #[error("{step} failed; source container removed, snapshot image {snapshot} kept")]
    Orphaned {
        step: Step,
        snapshot: String,
        #[source]
        source: EngineError,
    },

    #[error("Configuration error")]
    Config(#[from] ConfigError),

    #[error("Terminal error")]
    Terminal(#[source] std::io::Error),
}

impl SwimError {
    pub fn engine(step: Step, source: impl Into<EngineError>) -> Self {
        SwimError::Engine {
            step,
            source: source.into(),
        }
    }

    pub fn orphaned(step: Step, snapshot: impl Into<String>, source: impl Into<EngineError>) -> Self {
        SwimError::Orphaned {
            step,
            snapshot: snapshot.into(),
            source: source.into(),
        }
    }

    /// The engine step that failed, if any
    pub fn step(&self) -> Option<Step> {
        match self {
            SwimError::Engine { step, .. } | SwimError::Orphaned { step, .. } => Some(*step),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortSpecError {
    #[error("'{spec}' must have the form hostIP:hostPort:containerPort ({fields} field(s) given)")]
    FieldCount { spec: String, fields: usize },

    #[error("'{spec}': invalid host IP '{value}'")]
    HostIp { spec: String, value: String },

    #[error("'{spec}': invalid host port '{value}'")]
    HostPort { spec: String, value: String },

    #[error("'{spec}': invalid container port '{value}'")]
    ContainerPort { spec: String, value: String },

    #[error("'{spec}': unsupported protocol '{value}'")]
    Protocol { spec: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    NoContainers,
    Cancelled,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::NoContainers => f.write_str("no running containers"),
            AbortReason::Cancelled => f.write_str("selection cancelled"),
        }
    }
}

/// Workflow step, used to tell the operator where a migration stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Connect,
    List,
    Inspect,
    Stop,
    Commit,
    Remove,
    Create,
    Start,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Connect => "connect",
            Step::List => "list",
            Step::Inspect => "inspect",
            Step::Stop => "stop",
            Step::Commit => "commit",
            Step::Remove => "remove",
            Step::Create => "create",
            Step::Start => "start",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a container engine call
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Docker(#[from] bollard::errors::Error),

    #[error("unexpected engine response: {0}")]
    UnexpectedResponse(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}")]
    InvalidFormat {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Convenience type alias for Swim results
pub type Result<T, E = SwimError> = std::result::Result<T, E>;
