//! Operator-supplied port mappings.
//!
//! A mapping has the form `hostIP:hostPort:containerPort`. The container port
//! may carry a `/tcp` or `/udp` suffix (tcp when absent). An IPv6 host address
//! is written in brackets: `[::1]:8080:80`.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::PortSpecError;
use crate::types::{HostEndpoint, PortKey, Protocol};

pub mod merge;

pub use merge::{MergeMode, MergedBindingSet, merge_bindings};

const FIELDS: usize = 3;

/// One parsed `hostIP:hostPort:containerPort` mapping
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortSpec {
    pub host_ip: String,
    pub host_port: String,
    pub container_port: u16,
    pub protocol: Protocol,
}

impl PortSpec {
    pub fn parse(spec: &str) -> Result<Self, PortSpecError> {
        let raw = spec.trim();
        let fields = split_fields(raw);
        if fields.len() != FIELDS {
            return Err(PortSpecError::FieldCount {
                spec: raw.to_string(),
                fields: fields.len(),
            });
        }

        let (host_ip, host_port, container) = (fields[0], fields[1], fields[2]);

        if !host_ip.is_empty() && host_ip.parse::<IpAddr>().is_err() {
            return Err(PortSpecError::HostIp {
                spec: raw.to_string(),
                value: host_ip.to_string(),
            });
        }

        if !host_port.is_empty() && !is_decimal_port(host_port) {
            return Err(PortSpecError::HostPort {
                spec: raw.to_string(),
                value: host_port.to_string(),
            });
        }

        let (port, protocol) = match container.split_once('/') {
            Some((port, proto)) => {
                let protocol = proto
                    .parse::<Protocol>()
                    .map_err(|_| PortSpecError::Protocol {
                        spec: raw.to_string(),
                        value: proto.to_string(),
                    })?;
                (port, protocol)
            }
            None => (container, Protocol::Tcp),
        };

        let container_port = match port.parse::<u16>() {
            Ok(p) if p > 0 && is_decimal_port(port) => p,
            _ => {
                return Err(PortSpecError::ContainerPort {
                    spec: raw.to_string(),
                    value: port.to_string(),
                });
            }
        };

        Ok(Self {
            host_ip: host_ip.to_string(),
            host_port: host_port.to_string(),
            container_port,
            protocol,
        })
    }

    pub fn key(&self) -> PortKey {
        PortKey::new(self.container_port, self.protocol)
    }

    pub fn endpoint(&self) -> HostEndpoint {
        HostEndpoint::new(self.host_ip.clone(), self.host_port.clone())
    }
}

impl FromStr for PortSpec {
    type Err = PortSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PortSpec::parse(s)
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host_ip.contains(':') {
            write!(f, "[{}]", self.host_ip)?;
        } else {
            f.write_str(&self.host_ip)?;
        }
        write!(f, ":{}:{}", self.host_port, self.key())
    }
}

/// Parse every mapping, failing on the first malformed one.
pub fn parse_port_specs<I, S>(specs: I) -> Result<Vec<PortSpec>, PortSpecError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    specs
        .into_iter()
        .map(|s| PortSpec::parse(s.as_ref()))
        .collect()
}

fn split_fields(raw: &str) -> Vec<&str> {
    if let Some(rest) = raw.strip_prefix('[') {
        if let Some((ip, tail)) = rest.split_once(']') {
            let mut fields = vec![ip];
            match tail.strip_prefix(':') {
                Some(tail) => fields.extend(tail.split(':')),
                None if tail.is_empty() => {}
                // junk between `]` and the next separator
                None => fields.push(tail),
            }
            return fields;
        }
    }
    raw.split(':').collect()
}

fn is_decimal_port(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) && s.parse::<u16>().is_ok()
}
