// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Offline commands over a `.tf` file: validation and planned specs.
//! Nothing here connects to the engine.

use crate::provider::ProviderConfig;
use crate::registry::ResourceRegistry;
use crate::tf_file::TfFile;
use serde::Serialize;
use std::collections::BTreeMap;
use tfpod_core::{has_errors, ContainerSpec, Diagnostic};

/// A diagnostic tagged with the block it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub address: String,
    #[serde(flatten)]
    pub diagnostic: Diagnostic,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.address, self.diagnostic)
    }
}

/// Validate the provider block and every resource block.
pub fn validate(registry: &ResourceRegistry, file: &TfFile) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Some(provider) = &file.provider {
        if let Err(e) = ProviderConfig::from_config(provider.clone()) {
            findings.extend(e.into_diagnostics().into_iter().map(|diagnostic| Finding {
                address: "provider.podman".to_string(),
                diagnostic,
            }));
        }
    }

    for block in &file.resources {
        let address = block.address();
        let diags = match registry.get(&block.type_name) {
            Some(resource) => resource.validate(&block.config),
            None => vec![Diagnostic::error(format!("unsupported resource type {:?}", block.type_name))],
        };
        findings.extend(diags.into_iter().map(|diagnostic| Finding { address: address.clone(), diagnostic }));
    }
    findings
}

/// Container specification per resource address, or the findings that
/// prevent translation.
pub fn plan(
    registry: &ResourceRegistry,
    file: &TfFile,
) -> Result<BTreeMap<String, ContainerSpec>, Vec<Finding>> {
    let findings = validate(registry, file);
    if findings.iter().any(|f| f.diagnostic.is_error()) {
        return Err(findings);
    }

    let mut specs = BTreeMap::new();
    let mut failures = Vec::new();
    for block in &file.resources {
        let Some(resource) = registry.get(&block.type_name) else { continue };
        let planned = resource.plan(None, Some(block.config.clone()));
        if has_errors(&planned.diagnostics) {
            failures.extend(planned.diagnostics.into_iter().map(|diagnostic| Finding {
                address: block.address(),
                diagnostic,
            }));
            continue;
        }
        let Some(state) = planned.planned_state else { continue };
        match ContainerSpec::from_value(state) {
            Ok(spec) => {
                specs.insert(block.address(), spec);
            }
            Err(e) => failures.push(Finding {
                address: block.address(),
                diagnostic: Diagnostic::error(e.to_string()),
            }),
        }
    }

    if failures.is_empty() {
        Ok(specs)
    } else {
        Err(failures)
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
