// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use serde_json::{json, Value};

// ── Proptest strategies ─────────────────────────────────────────────────

pub mod strategies {
    use crate::attrs::{LabelAttr, PortAttr};
    use proptest::prelude::*;

    pub fn arb_port_attr() -> impl Strategy<Value = PortAttr> {
        (
            proptest::option::of(any::<u16>()),
            proptest::option::of(any::<u16>()),
            proptest::option::of(prop_oneof![Just(String::new()), Just("127.0.0.1".to_string())]),
            proptest::option::of(prop_oneof![Just("tcp".to_string()), Just("udp".to_string())]),
        )
            .prop_map(|(internal, external, ip, protocol)| PortAttr { internal, external, ip, protocol })
    }

    pub fn arb_label() -> impl Strategy<Value = LabelAttr> {
        ("[a-z]{1,3}", "[a-z0-9]{0,4}").prop_map(|(l, v)| LabelAttr::new(l, v))
    }
}

// ── Attribute fixtures ──────────────────────────────────────────────────

/// Raw attributes for a minimal `web` container as the plugin host sends them.
pub fn web_attributes() -> Value {
    json!({
        "name": "web",
        "image": "nginx:latest",
        "ports": [{ "internal": 80, "external": 8080, "ip": "0.0.0.0", "protocol": "tcp" }],
    })
}

/// Same as [`web_attributes`] with extra keys merged on top.
pub fn web_attributes_with(extra: Value) -> Value {
    let mut base = web_attributes();
    if let (Some(base), Value::Object(extra)) = (base.as_object_mut(), extra) {
        base.extend(extra);
    }
    base
}
