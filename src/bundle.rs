// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Immutable collection of desired objects, grouped by kind.
//!
//! A [`Bundle`] is loaded once per process and shared (usually behind an
//! `Arc`) between concurrent reconcile passes. Nothing in this crate mutates
//! a bundle after construction; request-scoped overrides are applied to
//! private copies.

use k8s_openapi::api::core::v1::{ConfigMap, ServiceAccount};
use k8s_openapi::api::rbac::v1::{ClusterRole, RoleBinding};
use serde::Deserialize;
use tracing::debug;

use crate::constants::{TEKTON_API_GROUP, TEKTON_API_VERSION};
use crate::crd::Pipeline;
use crate::errors::{Error, Result};
use crate::resource::{ManagedResource, ResourceKind};

/// Desired state for the Tekton pipelines operand.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bundle {
    pub pipelines: Vec<Pipeline>,
    pub config_maps: Vec<ConfigMap>,
    pub role_bindings: Vec<RoleBinding>,
    pub service_accounts: Vec<ServiceAccount>,
    pub cluster_roles: Vec<ClusterRole>,
}

impl Bundle {
    /// Decode a multi-document YAML manifest stream.
    ///
    /// Empty documents are skipped. Documents are routed by their `kind`;
    /// pipelines must be `tekton.dev/v1beta1`, the version they are submitted as.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Manifest`] for malformed YAML or an object that does not
    /// match its kind's schema, and [`Error::UnsupportedKind`] for kinds this
    /// operand does not manage or pipelines at another API version.
    pub fn from_yaml(manifests: &str) -> Result<Self> {
        let mut bundle = Bundle::default();

        for document in serde_yaml::Deserializer::from_str(manifests) {
            let value = serde_yaml::Value::deserialize(document)?;
            if value.is_null() {
                continue;
            }

            let kind = value
                .get("kind")
                .and_then(serde_yaml::Value::as_str)
                .unwrap_or_default()
                .to_string();

            match ResourceKind::from_kind(&kind) {
                Some(ResourceKind::Pipeline) => {
                    let api_version = value
                        .get("apiVersion")
                        .and_then(serde_yaml::Value::as_str)
                        .unwrap_or_default();
                    if api_version != format!("{TEKTON_API_GROUP}/{TEKTON_API_VERSION}") {
                        return Err(Error::UnsupportedKind {
                            kind: format!("{api_version}/{kind}"),
                        });
                    }
                    bundle.pipelines.push(serde_yaml::from_value(value)?);
                }
                Some(ResourceKind::ConfigMap) => {
                    bundle.config_maps.push(serde_yaml::from_value(value)?);
                }
                Some(ResourceKind::RoleBinding) => {
                    bundle.role_bindings.push(serde_yaml::from_value(value)?);
                }
                Some(ResourceKind::ServiceAccount) => {
                    bundle.service_accounts.push(serde_yaml::from_value(value)?);
                }
                Some(ResourceKind::ClusterRole) => {
                    bundle.cluster_roles.push(serde_yaml::from_value(value)?);
                }
                None => return Err(Error::UnsupportedKind { kind }),
            }
        }

        debug!(
            pipelines = bundle.pipelines.len(),
            config_maps = bundle.config_maps.len(),
            role_bindings = bundle.role_bindings.len(),
            service_accounts = bundle.service_accounts.len(),
            cluster_roles = bundle.cluster_roles.len(),
            "Decoded resource bundle"
        );

        Ok(bundle)
    }

    /// Total number of objects across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pipelines.len()
            + self.config_maps.len()
            + self.role_bindings.len()
            + self.service_accounts.len()
            + self.cluster_roles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deep copies of every object, in reconcile order.
    #[must_use]
    pub fn to_resources(&self) -> Vec<ManagedResource> {
        let mut resources = Vec::with_capacity(self.len());
        resources.extend(self.cluster_roles.iter().cloned().map(ManagedResource::from));
        resources.extend(self.pipelines.iter().cloned().map(ManagedResource::from));
        resources.extend(self.config_maps.iter().cloned().map(ManagedResource::from));
        resources.extend(self.role_bindings.iter().cloned().map(ManagedResource::from));
        resources.extend(
            self.service_accounts
                .iter()
                .cloned()
                .map(ManagedResource::from),
        );
        resources
    }
}

#[cfg(test)]
#[path = "bundle_tests.rs"]
mod bundle_tests;
