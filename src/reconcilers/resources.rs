// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Generic create-or-update and delete helpers shared by every operand.
//!
//! A reconcile pass is a list of [`ReconcileFunc`]s, each bound to one
//! request-scoped desired object and an [`UpdatePolicy`]. The engine runs them
//! in order through a single apply-and-classify routine,
//! [`create_or_update`], and stops at the first error.
//!
//! Cleanup is the opposite trade-off: [`delete_all`] issues every deletion
//! concurrently and collects per-object outcomes.
//!
//! # Example
//!
//! ```rust,no_run
//! use tekton_operand::context::Request;
//! use tekton_operand::gateway::ClusterGateway;
//! use tekton_operand::reconcilers::resources::{
//!     collect_resource_status, ReconcileFunc, UpdatePolicy,
//! };
//! use tekton_operand::resource::ManagedResource;
//! use k8s_openapi::api::core::v1::ConfigMap;
//!
//! async fn example(
//!     request: &Request,
//!     gateway: &dyn ClusterGateway,
//!     config_map: ConfigMap,
//! ) -> tekton_operand::errors::Result<()> {
//!     let funcs = vec![ReconcileFunc::new(
//!         ManagedResource::from(config_map),
//!         UpdatePolicy::Replace,
//!     )];
//!     let results = collect_resource_status(request, gateway, &funcs).await?;
//!     assert_eq!(results.len(), 1);
//!     Ok(())
//! }
//! ```

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

use crate::constants::VIRTIO_PARAM_PREFIX;
use crate::context::Request;
use crate::errors::{Error, Result};
use crate::gateway::{ClusterGateway, DeleteOutcome};
use crate::labels::AppLabels;
use crate::metrics;
use crate::resource::ManagedResource;

/// Outcome of reconciling one desired object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationResult {
    Created,
    Updated,
    Unchanged,
}

impl OperationResult {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            OperationResult::Created => "created",
            OperationResult::Updated => "updated",
            OperationResult::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The live object after reconciliation, paired with what happened to it.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconcileResult {
    pub resource: ManagedResource,
    pub operation_result: OperationResult,
}

/// How a desired object is folded into the live one on update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Replace the live body with the desired body
    Replace,

    /// Replace the live spec, then default every `virtioContainer*` parameter
    /// to the operator-maintained image
    PipelineDefaults { virtio_image: String },
}

impl UpdatePolicy {
    /// Apply policy-owned fields to an object about to be submitted.
    pub fn apply(&self, resource: &mut ManagedResource) {
        let UpdatePolicy::PipelineDefaults { virtio_image } = self else {
            return;
        };
        if let ManagedResource::Pipeline(pipeline) = resource {
            pipeline
                .spec
                .params
                .iter_mut()
                .filter(|param| param.name.starts_with(VIRTIO_PARAM_PREFIX))
                .for_each(|param| param.set_string_default(virtio_image));
        }
    }
}

/// One step of a reconcile pass: a private copy of a desired object plus its policy.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconcileFunc {
    desired: ManagedResource,
    policy: UpdatePolicy,
}

impl ReconcileFunc {
    #[must_use]
    pub fn new(desired: ManagedResource, policy: UpdatePolicy) -> Self {
        Self { desired, policy }
    }

    /// Desired object with request-scoped overrides already applied.
    #[must_use]
    pub fn desired(&self) -> &ManagedResource {
        &self.desired
    }

    #[must_use]
    pub fn policy(&self) -> &UpdatePolicy {
        &self.policy
    }

    /// Create or update the bound object.
    ///
    /// # Errors
    ///
    /// Propagates any gateway error unmodified.
    pub async fn reconcile(
        &self,
        gateway: &dyn ClusterGateway,
        labels: &AppLabels,
    ) -> Result<ReconcileResult> {
        create_or_update(gateway, &self.desired, &self.policy, labels).await
    }
}

/// Merge desired labels and annotations onto live metadata, keeping foreign keys.
fn merge_metadata(desired: &ObjectMeta, live: &mut ObjectMeta) {
    fn merge_map(
        desired: Option<&BTreeMap<String, String>>,
        live: &mut Option<BTreeMap<String, String>>,
    ) {
        if let Some(desired) = desired.filter(|m| !m.is_empty()) {
            live.get_or_insert_with(BTreeMap::new)
                .extend(desired.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }

    merge_map(desired.labels.as_ref(), &mut live.labels);
    merge_map(desired.annotations.as_ref(), &mut live.annotations);
}

/// Fold `desired` into a copy of `live`.
///
/// Metadata keeps the live identity (`resourceVersion`, `uid`, owner
/// references) with desired labels and annotations merged in. The body is
/// replaced per kind; the live `secrets` of a service account are kept since
/// the token controller owns them.
///
/// # Errors
///
/// Returns [`Error::KindMismatch`] if the two objects are of different kinds.
pub fn merge_desired(desired: &ManagedResource, live: &ManagedResource) -> Result<ManagedResource> {
    let mut merged = live.clone();
    merge_metadata(desired.meta(), merged.meta_mut());

    match (&mut merged, desired) {
        (ManagedResource::Pipeline(found), ManagedResource::Pipeline(new)) => {
            found.spec = new.spec.clone();
        }
        (ManagedResource::ConfigMap(found), ManagedResource::ConfigMap(new)) => {
            found.data = new.data.clone();
            found.binary_data = new.binary_data.clone();
            found.immutable = new.immutable;
        }
        (ManagedResource::RoleBinding(found), ManagedResource::RoleBinding(new)) => {
            found.role_ref = new.role_ref.clone();
            found.subjects = new.subjects.clone();
        }
        (ManagedResource::ServiceAccount(found), ManagedResource::ServiceAccount(new)) => {
            found.automount_service_account_token = new.automount_service_account_token;
            found.image_pull_secrets = new.image_pull_secrets.clone();
        }
        (ManagedResource::ClusterRole(found), ManagedResource::ClusterRole(new)) => {
            found.rules = new.rules.clone();
            found.aggregation_rule = new.aggregation_rule.clone();
        }
        (found, new) => {
            return Err(Error::KindMismatch {
                expected: new.kind(),
                actual: found.kind(),
            })
        }
    }

    Ok(merged)
}

/// Create the object if missing, otherwise update it when it differs.
///
/// The ownership labels are stamped onto a private copy of `desired` before
/// anything is submitted; the caller's object is never modified.
///
/// # Errors
///
/// Returns an error if the object has no name or namespace, or if any
/// gateway call fails. Conflicts on update surface as
/// retryable [`Error::Kube`] errors.
pub async fn create_or_update(
    gateway: &dyn ClusterGateway,
    desired: &ManagedResource,
    policy: &UpdatePolicy,
    labels: &AppLabels,
) -> Result<ReconcileResult> {
    let mut desired = desired.clone();
    labels.apply_to(desired.meta_mut());
    policy.apply(&mut desired);

    let key = desired.key()?;
    debug!(key = %key, "Creating or updating resource");

    let Some(live) = gateway.get(&key).await? else {
        let created = gateway.create(&desired).await?;
        info!("Created {}", key);
        return Ok(ReconcileResult {
            resource: created,
            operation_result: OperationResult::Created,
        });
    };

    let merged = merge_desired(&desired, &live)?;
    if merged == live {
        debug!("{} is up to date", key);
        return Ok(ReconcileResult {
            resource: live,
            operation_result: OperationResult::Unchanged,
        });
    }

    let updated = gateway.update(&merged).await?;
    info!("Updated {}", key);
    Ok(ReconcileResult {
        resource: updated,
        operation_result: OperationResult::Updated,
    })
}

/// Run every function in order, stopping at the first error.
///
/// Functions after a failing one are never started. Cancellation of the
/// request aborts the in-flight call and returns [`Error::Cancelled`].
///
/// # Errors
///
/// Returns the first error produced by a reconcile function, unmodified.
pub async fn collect_resource_status(
    request: &Request,
    gateway: &dyn ClusterGateway,
    funcs: &[ReconcileFunc],
) -> Result<Vec<ReconcileResult>> {
    let labels = request.app_labels();
    let mut results = Vec::with_capacity(funcs.len());

    for func in funcs {
        if request.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let result = tokio::select! {
            biased;
            () = request.cancellation.cancelled() => return Err(Error::Cancelled),
            result = func.reconcile(gateway, &labels) => result,
        };

        let result = result.inspect_err(|e| {
            warn!(
                kind = %func.desired().kind(),
                name = func.desired().name(),
                error = %e,
                "Reconcile pass aborted"
            );
        })?;

        metrics::record_operation(
            result.resource.kind().as_str(),
            result.operation_result.as_str(),
        );
        results.push(result);
    }

    Ok(results)
}

/// What happened when deleting one object.
#[derive(Debug)]
pub enum CleanupOutcome {
    Deleted,
    /// The object was already gone
    AlreadyAbsent,
    Failed(Error),
}

impl CleanupOutcome {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CleanupOutcome::Deleted => "deleted",
            CleanupOutcome::AlreadyAbsent => "absent",
            CleanupOutcome::Failed(_) => "failed",
        }
    }

    /// Deleted or absent.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, CleanupOutcome::Failed(_))
    }
}

/// Deletion outcome for one bundle object.
#[derive(Debug)]
pub struct CleanupResult {
    pub resource: ManagedResource,
    pub outcome: CleanupOutcome,
}

/// Delete every object concurrently and collect the outcomes.
///
/// A failed deletion does not stop the others. The result list has one
/// entry per input object, in input order.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] if the request is cancelled before every
/// deletion has finished.
pub async fn delete_all(
    request: &Request,
    gateway: &dyn ClusterGateway,
    resources: Vec<ManagedResource>,
) -> Result<Vec<CleanupResult>> {
    if request.is_cancelled() {
        return Err(Error::Cancelled);
    }

    let deletions = resources.into_iter().map(|resource| async move {
        let outcome = match resource.key() {
            Ok(key) => match gateway.delete(&key).await {
                Ok(DeleteOutcome::Deleted) => {
                    info!("Deleted {}", key);
                    CleanupOutcome::Deleted
                }
                Ok(DeleteOutcome::AlreadyAbsent) => {
                    debug!("{} already absent", key);
                    CleanupOutcome::AlreadyAbsent
                }
                Err(e) => {
                    warn!(error = %e, "Failed to delete {}", key);
                    CleanupOutcome::Failed(e)
                }
            },
            Err(e) => CleanupOutcome::Failed(e),
        };
        metrics::record_cleanup(resource.kind().as_str(), outcome.as_str());
        CleanupResult { resource, outcome }
    });

    tokio::select! {
        biased;
        () = request.cancellation.cancelled() => Err(Error::Cancelled),
        results = futures::future::join_all(deletions) => Ok(results),
    }
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod resources_tests;
