use std::collections::BTreeSet;

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use swim::error::PortSpecError;
use swim::ports::merge_bindings;
use swim::types::PortBindings;
use swim::{HostEndpoint, MergeMode, PortKey, PortSpec, Protocol};

fn protocol() -> impl Strategy<Value = Protocol> {
    prop_oneof![Just(Protocol::Tcp), Just(Protocol::Udp)]
}

// A small port range so old and new keys collide often
fn port_key() -> impl Strategy<Value = PortKey> {
    (1u16..=8, protocol()).prop_map(|(port, protocol)| PortKey::new(port, protocol))
}

fn host_ip() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("0.0.0.0".to_string()),
        Just("127.0.0.1".to_string()),
        Just("::1".to_string()),
    ]
}

fn host_port() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), (1u16..=65535).prop_map(|p| p.to_string())]
}

fn endpoint() -> impl Strategy<Value = HostEndpoint> {
    (host_ip(), host_port()).prop_map(|(ip, port)| HostEndpoint::new(ip, port))
}

fn old_bindings() -> impl Strategy<Value = PortBindings> {
    btree_map(port_key(), vec(endpoint(), 1..3), 0..6)
}

fn port_spec() -> impl Strategy<Value = PortSpec> {
    (host_ip(), host_port(), port_key()).prop_map(|(host_ip, host_port, key)| PortSpec {
        host_ip,
        host_port,
        container_port: key.port,
        protocol: key.protocol,
    })
}

fn new_specs() -> impl Strategy<Value = Vec<PortSpec>> {
    vec(port_spec(), 0..6)
}

fn endpoints_for(specs: &[PortSpec], key: &PortKey) -> Vec<HostEndpoint> {
    specs
        .iter()
        .filter(|s| s.key() == *key)
        .map(PortSpec::endpoint)
        .collect()
}

proptest! {
    #[test]
    fn additive_keeps_untouched_old_bindings(old in old_bindings(), new in new_specs()) {
        let merged = merge_bindings(&old, &new, MergeMode::Additive);
        let targeted: BTreeSet<PortKey> = new.iter().map(PortSpec::key).collect();

        for (key, endpoints) in &old {
            if !targeted.contains(key) {
                prop_assert_eq!(merged.get(key), Some(endpoints.as_slice()));
            }
        }
    }

    #[test]
    fn new_specs_replace_their_keys(
        old in old_bindings(),
        new in new_specs(),
        force in any::<bool>(),
    ) {
        let merged = merge_bindings(&old, &new, MergeMode::from_force(force));

        for spec in &new {
            let key = spec.key();
            let expected = endpoints_for(&new, &key);
            prop_assert_eq!(merged.get(&key), Some(expected.as_slice()));
        }
    }

    #[test]
    fn overwrite_contains_only_new_keys(old in old_bindings(), new in new_specs()) {
        let merged = merge_bindings(&old, &new, MergeMode::Overwrite);

        let targeted: BTreeSet<PortKey> = new.iter().map(PortSpec::key).collect();
        let keys: BTreeSet<PortKey> = merged.bindings().keys().copied().collect();
        prop_assert_eq!(keys, targeted);
    }

    #[test]
    fn exposed_ports_match_binding_keys(
        old in old_bindings(),
        new in new_specs(),
        force in any::<bool>(),
    ) {
        let merged = merge_bindings(&old, &new, MergeMode::from_force(force));

        let keys: BTreeSet<PortKey> = merged.bindings().keys().copied().collect();
        prop_assert_eq!(merged.exposed_ports(), &keys);
        prop_assert!(merged.bindings().values().all(|endpoints| !endpoints.is_empty()));
    }

    #[test]
    fn merge_is_deterministic(old in old_bindings(), new in new_specs()) {
        let first = merge_bindings(&old, &new, MergeMode::Additive);
        let second = merge_bindings(&old, &new, MergeMode::Additive);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn rendered_spec_parses_back(spec in port_spec()) {
        let parsed = PortSpec::parse(&spec.to_string());
        prop_assert_eq!(parsed, Ok(spec));
    }

    #[test]
    fn parse_never_panics(input in "\\PC{0,40}") {
        let _ = PortSpec::parse(&input);
    }

    #[test]
    fn colon_free_input_is_rejected(input in "[0-9a-z./]{0,12}") {
        let rejected = matches!(
            PortSpec::parse(&input),
            Err(PortSpecError::FieldCount { fields: 1, .. })
        );
        prop_assert!(rejected);
    }

    #[test]
    fn two_field_input_is_rejected(host in 1u16..=65535, container in 1u16..=65535) {
        let input = format!("{host}:{container}");
        let rejected = matches!(
            PortSpec::parse(&input),
            Err(PortSpecError::FieldCount { fields: 2, .. })
        );
        prop_assert!(rejected);
    }
}
