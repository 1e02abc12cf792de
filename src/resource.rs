// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tagged variant over every kind this operand manages.
//!
//! The engine and the gateway work on [`ManagedResource`] instead of dynamic
//! objects: each variant carries its typed object, and per-kind behaviour is a
//! `match` rather than a downcast.

use k8s_openapi::api::core::v1::{ConfigMap, ServiceAccount};
use k8s_openapi::api::rbac::v1::{ClusterRole, RoleBinding};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use std::fmt;

use crate::constants::{
    KIND_CLUSTER_ROLE, KIND_CONFIG_MAP, KIND_PIPELINE, KIND_ROLE_BINDING, KIND_SERVICE_ACCOUNT,
};
use crate::crd::Pipeline;
use crate::errors::{Error, Result};

/// Kinds of objects carried by a bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Pipeline,
    ConfigMap,
    RoleBinding,
    ServiceAccount,
    ClusterRole,
}

impl ResourceKind {
    /// Every kind, in reconcile order.
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::ClusterRole,
        ResourceKind::Pipeline,
        ResourceKind::ConfigMap,
        ResourceKind::RoleBinding,
        ResourceKind::ServiceAccount,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Pipeline => KIND_PIPELINE,
            ResourceKind::ConfigMap => KIND_CONFIG_MAP,
            ResourceKind::RoleBinding => KIND_ROLE_BINDING,
            ResourceKind::ServiceAccount => KIND_SERVICE_ACCOUNT,
            ResourceKind::ClusterRole => KIND_CLUSTER_ROLE,
        }
    }

    /// Cluster-scoped kinds ignore namespaces entirely.
    #[must_use]
    pub const fn is_cluster_scoped(self) -> bool {
        matches!(self, ResourceKind::ClusterRole)
    }

    /// Parse the `kind` field of a manifest.
    #[must_use]
    pub fn from_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == kind)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one cluster object: kind, optional namespace, name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    pub kind: ResourceKind,
    pub namespace: Option<String>,
    pub name: String,
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{} {}/{}", self.kind, namespace, self.name),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

/// One desired or live object of any managed kind.
#[derive(Clone, Debug, PartialEq)]
pub enum ManagedResource {
    Pipeline(Pipeline),
    ConfigMap(ConfigMap),
    RoleBinding(RoleBinding),
    ServiceAccount(ServiceAccount),
    ClusterRole(ClusterRole),
}

/// Expand `$body` once per variant with `$obj` bound to the inner object.
macro_rules! each_variant {
    ($value:expr, $obj:ident => $body:expr) => {
        match $value {
            ManagedResource::Pipeline($obj) => $body,
            ManagedResource::ConfigMap($obj) => $body,
            ManagedResource::RoleBinding($obj) => $body,
            ManagedResource::ServiceAccount($obj) => $body,
            ManagedResource::ClusterRole($obj) => $body,
        }
    };
}

impl ManagedResource {
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            ManagedResource::Pipeline(_) => ResourceKind::Pipeline,
            ManagedResource::ConfigMap(_) => ResourceKind::ConfigMap,
            ManagedResource::RoleBinding(_) => ResourceKind::RoleBinding,
            ManagedResource::ServiceAccount(_) => ResourceKind::ServiceAccount,
            ManagedResource::ClusterRole(_) => ResourceKind::ClusterRole,
        }
    }

    #[must_use]
    pub fn meta(&self) -> &ObjectMeta {
        each_variant!(self, obj => obj.meta())
    }

    pub fn meta_mut(&mut self) -> &mut ObjectMeta {
        each_variant!(self, obj => obj.meta_mut())
    }

    /// Name from metadata, or an empty string when unset.
    #[must_use]
    pub fn name(&self) -> &str {
        self.meta().name.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.meta().namespace.as_deref()
    }

    /// Identity used for gateway lookups.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingName`] when `metadata.name` is unset, and
    /// [`Error::MissingNamespace`] for a namespaced kind without a namespace.
    pub fn key(&self) -> Result<ObjectKey> {
        let kind = self.kind();
        let name = self
            .meta()
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .ok_or(Error::MissingName { kind })?;

        let namespace = if kind.is_cluster_scoped() {
            None
        } else {
            let namespace = self
                .namespace()
                .filter(|ns| !ns.is_empty())
                .ok_or_else(|| Error::MissingNamespace {
                    kind,
                    name: name.clone(),
                })?;
            Some(namespace.to_string())
        };

        Ok(ObjectKey {
            kind,
            namespace,
            name,
        })
    }

    /// Resource version assigned by the API server, if any.
    #[must_use]
    pub fn resource_version(&self) -> Option<&str> {
        self.meta().resource_version.as_deref()
    }
}

impl From<Pipeline> for ManagedResource {
    fn from(value: Pipeline) -> Self {
        ManagedResource::Pipeline(value)
    }
}

impl From<ConfigMap> for ManagedResource {
    fn from(value: ConfigMap) -> Self {
        ManagedResource::ConfigMap(value)
    }
}

impl From<RoleBinding> for ManagedResource {
    fn from(value: RoleBinding) -> Self {
        ManagedResource::RoleBinding(value)
    }
}

impl From<ServiceAccount> for ManagedResource {
    fn from(value: ServiceAccount) -> Self {
        ManagedResource::ServiceAccount(value)
    }
}

impl From<ClusterRole> for ManagedResource {
    fn from(value: ClusterRole) -> Self {
        ManagedResource::ClusterRole(value)
    }
}
