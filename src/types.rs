use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Transport protocol of a container-side port
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            other => Err(format!("unsupported protocol '{other}'")),
        }
    }
}

/// Container-side half of a binding: the join key between old and new bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortKey {
    pub port: u16,
    pub protocol: Protocol,
}

impl PortKey {
    pub fn new(port: u16, protocol: Protocol) -> Self {
        Self { port, protocol }
    }

    pub fn tcp(port: u16) -> Self {
        Self::new(port, Protocol::Tcp)
    }

    pub fn udp(port: u16) -> Self {
        Self::new(port, Protocol::Udp)
    }
}

/// Engine form: `80/tcp`
impl fmt::Display for PortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port, self.protocol)
    }
}

impl FromStr for PortKey {
    type Err = String;

    /// Accepts `80/tcp`, `53/udp` and a bare `80` (tcp).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (port, protocol) = match s.split_once('/') {
            Some((port, proto)) => (port, proto.parse::<Protocol>()?),
            None => (s, Protocol::Tcp),
        };
        let port = port
            .parse::<u16>()
            .map_err(|_| format!("invalid container port '{port}'"))?;
        Ok(Self::new(port, protocol))
    }
}

/// Host-side half of a binding. Empty strings mean "engine default".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostEndpoint {
    pub host_ip: String,
    pub host_port: String,
}

impl HostEndpoint {
    pub fn new(host_ip: impl Into<String>, host_port: impl Into<String>) -> Self {
        Self {
            host_ip: host_ip.into(),
            host_port: host_port.into(),
        }
    }
}

impl fmt::Display for HostEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ip = if self.host_ip.is_empty() {
            "0.0.0.0"
        } else {
            &self.host_ip
        };
        if ip.contains(':') {
            write!(f, "[{}]:{}", ip, self.host_port)
        } else {
            write!(f, "{}:{}", ip, self.host_port)
        }
    }
}

/// Port bindings keyed by container-side port
pub type PortBindings = BTreeMap<PortKey, Vec<HostEndpoint>>;

/// One published port as reported by the container listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortEntry {
    pub host_ip: String,
    pub host_port: String,
    pub container_port: String,
    pub protocol: Protocol,
}

impl fmt::Display for PortEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host_port.is_empty() {
            return write!(f, "{}/{}", self.container_port, self.protocol);
        }
        let endpoint = HostEndpoint::new(self.host_ip.clone(), self.host_port.clone());
        write!(f, "{}->{}/{}", endpoint, self.container_port, self.protocol)
    }
}

/// A running container as seen by the selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
    pub display_name: String,
    pub published_ports: Vec<PortEntry>,
}

impl ContainerSummary {
    pub fn new(id: impl Into<String>, name: &str, published_ports: Vec<PortEntry>) -> Self {
        Self {
            id: id.into(),
            display_name: name.trim_start_matches('/').to_string(),
            published_ports,
        }
    }

    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(12) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }

    pub fn ports_label(&self) -> String {
        self.published_ports
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Configuration of a container relevant to re-publication
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerDetails {
    pub id: String,
    pub name: String,
    /// Image reference the container was created from
    pub image: String,
    pub auto_remove: bool,
    pub exposed_ports: BTreeSet<PortKey>,
    pub port_bindings: PortBindings,
}
