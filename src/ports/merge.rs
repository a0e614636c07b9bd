use std::collections::BTreeSet;

use tracing::debug;

use super::PortSpec;
use crate::types::{HostEndpoint, PortBindings, PortKey};

/// How existing bindings are treated when new ones are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Keep old bindings except for keys the new specs also target
    #[default]
    Additive,
    /// Drop every old binding
    Overwrite,
}

impl MergeMode {
    pub fn from_force(force_overwrite: bool) -> Self {
        if force_overwrite {
            MergeMode::Overwrite
        } else {
            MergeMode::Additive
        }
    }
}

/// Exposed ports and host bindings for the replacement container.
///
/// Every key of `bindings` appears in `exposed_ports` and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergedBindingSet {
    exposed_ports: BTreeSet<PortKey>,
    bindings: PortBindings,
}

impl MergedBindingSet {
    pub fn exposed_ports(&self) -> &BTreeSet<PortKey> {
        &self.exposed_ports
    }

    pub fn bindings(&self) -> &PortBindings {
        &self.bindings
    }

    pub fn get(&self, key: &PortKey) -> Option<&[HostEndpoint]> {
        self.bindings.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn from_bindings(bindings: PortBindings) -> Self {
        Self {
            exposed_ports: bindings.keys().copied().collect(),
            bindings,
        }
    }
}

/// Combine the bindings of the running container with the operator's specs.
///
/// New specs sharing a key are appended in order; they replace every old
/// endpoint for that key.
pub fn merge_bindings(old: &PortBindings, new: &[PortSpec], mode: MergeMode) -> MergedBindingSet {
    let mut merged = match mode {
        MergeMode::Additive => old.clone(),
        MergeMode::Overwrite => PortBindings::new(),
    };

    let replaced: BTreeSet<PortKey> = new.iter().map(PortSpec::key).collect();
    for key in &replaced {
        if let Some(previous) = merged.remove(key) {
            debug!(port = %key, dropped = previous.len(), "Replacing existing binding");
        }
    }

    for spec in new {
        merged.entry(spec.key()).or_default().push(spec.endpoint());
    }

    // An old key with no endpoints left would expose without binding
    merged.retain(|_, endpoints| !endpoints.is_empty());

    MergedBindingSet::from_bindings(merged)
}
