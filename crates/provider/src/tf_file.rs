// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loading resource and provider blocks from `.tf` files.
//!
//! Only literal attribute values are meaningful; expressions come through
//! as their `${...}` template text.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HclError {
    #[error("cannot read {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("invalid HCL: {0}")]
    Parse(#[from] hcl::Error),
}

/// One `resource "<type>" "<name>" { ... }` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceBlock {
    pub type_name: String,
    pub name: String,
    pub config: Value,
}

impl ResourceBlock {
    /// `type.name`, as the host addresses it.
    pub fn address(&self) -> String {
        format!("{}.{}", self.type_name, self.name)
    }
}

/// The parts of a configuration file this provider cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TfFile {
    /// Body of `provider "podman" { ... }`, if present.
    pub provider: Option<Value>,
    pub resources: Vec<ResourceBlock>,
}

pub fn load_file(path: &Path) -> Result<TfFile, HclError> {
    let source = std::fs::read_to_string(path)
        .map_err(|source| HclError::Io { path: path.to_path_buf(), source })?;
    parse(&source)
}

pub fn parse(source: &str) -> Result<TfFile, HclError> {
    let body: Value = hcl::from_str(source)?;

    let provider = body
        .get("provider")
        .map(labelled)
        .unwrap_or_default()
        .into_iter()
        .find(|(name, _)| name.as_str() == "podman")
        .map(|(_, config)| config.clone());

    let mut resources = Vec::new();
    if let Some(by_type) = body.get("resource") {
        for (type_name, by_name) in labelled(by_type) {
            for (name, config) in labelled(by_name) {
                resources.push(ResourceBlock {
                    type_name: type_name.clone(),
                    name: name.clone(),
                    config: config.clone(),
                });
            }
        }
    }
    Ok(TfFile { provider, resources })
}

/// Entries of a labelled block level. Repeated blocks may decode either as
/// one merged object or as an array of objects.
fn labelled(value: &Value) -> Vec<(&String, &Value)> {
    match value {
        Value::Object(map) => map.iter().collect(),
        Value::Array(items) => items.iter().flat_map(labelled).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "tf_file_tests.rs"]
mod tests;
