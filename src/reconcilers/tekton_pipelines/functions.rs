// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-kind reconcile function factories for the Tekton pipelines bundle.
//!
//! Every factory works on a deep copy of the bundle object and applies the
//! request-scoped namespace rules to that copy only:
//!
//! | Kind | Namespace | Extra |
//! |---|---|---|
//! | `ClusterRole` | n/a | - |
//! | `Pipeline` | override, else own, else primary | virtio defaults |
//! | `ConfigMap` | override, else own, else primary | - |
//! | `RoleBinding` | own, else primary | subjects pinned to primary |
//! | `ServiceAccount` | own, else primary | reserved name skipped outside admin namespaces |

use k8s_openapi::api::core::v1::{ConfigMap, ServiceAccount};
use k8s_openapi::api::rbac::v1::{ClusterRole, RoleBinding};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::bundle::Bundle;
use crate::constants::{ADMIN_NAMESPACE_PATTERN, RESERVED_SERVICE_ACCOUNT};
use crate::context::Request;
use crate::crd::Pipeline;
use crate::reconcilers::resources::{ReconcileFunc, UpdatePolicy};
use crate::resource::ManagedResource;

/// Matches namespaces owned by the platform (`openshift-*`, `kube-*`).
pub static ADMIN_NAMESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(ADMIN_NAMESPACE_PATTERN).expect("administrative namespace pattern is valid")
});

#[must_use]
pub fn is_admin_namespace(namespace: &str) -> bool {
    ADMIN_NAMESPACE_REGEX.is_match(namespace)
}

/// Whether a service account is left out of the pass.
///
/// The reserved `pipeline` account is only deployed when pipelines target an
/// administrative namespace, or when no override is set at all.
#[must_use]
pub fn skip_service_account(request: &Request, service_account: &ServiceAccount) -> bool {
    let Some(namespace) = request.namespace_override() else {
        return false;
    };
    !is_admin_namespace(namespace)
        && service_account.metadata.name.as_deref() == Some(RESERVED_SERVICE_ACCOUNT)
}

fn own_or_primary(own: Option<&str>, request: &Request) -> String {
    own.filter(|ns| !ns.is_empty())
        .unwrap_or(request.namespace.as_str())
        .to_string()
}

/// Copy of `pipeline` placed in its request-scoped namespace.
#[must_use]
pub fn resolve_pipeline(request: &Request, pipeline: &Pipeline) -> Pipeline {
    let mut pipeline = pipeline.clone();
    pipeline.metadata.namespace = Some(match request.namespace_override() {
        Some(namespace) => namespace.to_string(),
        None => own_or_primary(pipeline.metadata.namespace.as_deref(), request),
    });
    pipeline
}

/// Copy of `config_map` placed in its request-scoped namespace.
#[must_use]
pub fn resolve_config_map(request: &Request, config_map: &ConfigMap) -> ConfigMap {
    let mut config_map = config_map.clone();
    config_map.metadata.namespace = Some(match request.namespace_override() {
        Some(namespace) => namespace.to_string(),
        None => own_or_primary(config_map.metadata.namespace.as_deref(), request),
    });
    config_map
}

#[must_use]
pub fn resolve_service_account(
    request: &Request,
    service_account: &ServiceAccount,
) -> ServiceAccount {
    let mut service_account = service_account.clone();
    service_account.metadata.namespace = Some(own_or_primary(
        service_account.metadata.namespace.as_deref(),
        request,
    ));
    service_account
}

/// Copy of `role_binding` with every subject resolved in the primary namespace.
#[must_use]
pub fn resolve_role_binding(request: &Request, role_binding: &RoleBinding) -> RoleBinding {
    let mut role_binding = role_binding.clone();
    role_binding.metadata.namespace = Some(own_or_primary(
        role_binding.metadata.namespace.as_deref(),
        request,
    ));
    for subject in role_binding.subjects.iter_mut().flatten() {
        subject.namespace = Some(request.namespace.clone());
    }
    role_binding
}

#[must_use]
pub fn reconcile_cluster_roles_funcs(cluster_roles: &[ClusterRole]) -> Vec<ReconcileFunc> {
    cluster_roles
        .iter()
        .map(|role| ReconcileFunc::new(role.clone().into(), UpdatePolicy::Replace))
        .collect()
}

#[must_use]
pub fn reconcile_pipelines_funcs(request: &Request, pipelines: &[Pipeline]) -> Vec<ReconcileFunc> {
    let policy = UpdatePolicy::PipelineDefaults {
        virtio_image: request.config.virtio_image.clone(),
    };
    pipelines
        .iter()
        .map(|pipeline| {
            ReconcileFunc::new(
                resolve_pipeline(request, pipeline).into(),
                policy.clone(),
            )
        })
        .collect()
}

#[must_use]
pub fn reconcile_config_maps_funcs(
    request: &Request,
    config_maps: &[ConfigMap],
) -> Vec<ReconcileFunc> {
    config_maps
        .iter()
        .map(|cm| ReconcileFunc::new(resolve_config_map(request, cm).into(), UpdatePolicy::Replace))
        .collect()
}

#[must_use]
pub fn reconcile_role_bindings_funcs(
    request: &Request,
    role_bindings: &[RoleBinding],
) -> Vec<ReconcileFunc> {
    role_bindings
        .iter()
        .map(|rb| {
            ReconcileFunc::new(
                resolve_role_binding(request, rb).into(),
                UpdatePolicy::Replace,
            )
        })
        .collect()
}

#[must_use]
pub fn reconcile_service_accounts_funcs(
    request: &Request,
    service_accounts: &[ServiceAccount],
) -> Vec<ReconcileFunc> {
    service_accounts
        .iter()
        .filter(|sa| {
            let skip = skip_service_account(request, sa);
            if skip {
                debug!(
                    name = sa.metadata.name.as_deref().unwrap_or_default(),
                    "Skipping service account outside administrative namespaces"
                );
            }
            !skip
        })
        .map(|sa| {
            ReconcileFunc::new(
                resolve_service_account(request, sa).into(),
                UpdatePolicy::Replace,
            )
        })
        .collect()
}

/// Functions for the whole bundle, roles first so bindings never dangle.
#[must_use]
pub fn reconcile_funcs(request: &Request, bundle: &Bundle) -> Vec<ReconcileFunc> {
    let mut funcs = Vec::with_capacity(bundle.len());
    funcs.extend(reconcile_cluster_roles_funcs(&bundle.cluster_roles));
    funcs.extend(reconcile_pipelines_funcs(request, &bundle.pipelines));
    funcs.extend(reconcile_config_maps_funcs(request, &bundle.config_maps));
    funcs.extend(reconcile_role_bindings_funcs(request, &bundle.role_bindings));
    funcs.extend(reconcile_service_accounts_funcs(
        request,
        &bundle.service_accounts,
    ));
    funcs
}

/// Every bundle object at the namespace a reconcile pass would use.
///
/// Unlike [`reconcile_funcs`] nothing is skipped, so cleanup also reaches a
/// reserved service account deployed before the override changed.
#[must_use]
pub fn resolve_resources(request: &Request, bundle: &Bundle) -> Vec<ManagedResource> {
    bundle
        .to_resources()
        .into_iter()
        .map(|resource| match resource {
            ManagedResource::Pipeline(p) => resolve_pipeline(request, &p).into(),
            ManagedResource::ConfigMap(cm) => resolve_config_map(request, &cm).into(),
            ManagedResource::RoleBinding(rb) => resolve_role_binding(request, &rb).into(),
            ManagedResource::ServiceAccount(sa) => resolve_service_account(request, &sa).into(),
            cluster_scoped @ ManagedResource::ClusterRole(_) => cluster_scoped,
        })
        .collect()
}

#[cfg(test)]
#[path = "functions_tests.rs"]
mod functions_tests;
