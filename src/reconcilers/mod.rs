// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation of operand bundles against a live cluster.
//!
//! # Reconciliation Architecture
//!
//! An outer control loop owns watches, scheduling and status persistence. For
//! each watch event it builds a [`Request`] and calls an [`Operand`]:
//!
//! 1. **Gate** - Skip the whole kind-group when its feature gate is off
//! 2. **Precondition** - Verify required CRDs are registered
//! 3. **Reconcile** - Run per-object create-or-update functions fail-fast
//! 4. **Report** - Flag updates seen outside an upgrade window
//!
//! # Available Operands
//!
//! - [`tekton_pipelines::TektonPipelines`] - Tekton pipelines, config maps and RBAC
//!
//! # Example: Running an Operand
//!
//! ```rust,no_run
//! use tekton_operand::bundle::Bundle;
//! use tekton_operand::config::OperatorConfig;
//! use tekton_operand::context::Request;
//! use tekton_operand::gateway::KubeGateway;
//! use tekton_operand::reconcilers::{Operand, TektonPipelines};
//! use std::sync::Arc;
//!
//! async fn run(client: kube::Client, manifests: &str) -> tekton_operand::errors::Result<()> {
//!     let operand = TektonPipelines::new(Arc::new(Bundle::from_yaml(manifests)?));
//!     let config = Arc::new(OperatorConfig::from_env()?);
//!     let request = Request::new("kubevirt", config);
//!
//!     let results = operand.reconcile(&request, &KubeGateway::new(client)).await?;
//!     println!("{} objects reconciled", results.len());
//!     Ok(())
//! }
//! ```

pub mod resources;
pub mod tekton_pipelines;

#[cfg(test)]
pub(crate) mod test_support;

use async_trait::async_trait;

use crate::context::Request;
use crate::errors::Result;
use crate::gateway::ClusterGateway;
use crate::resource::ResourceKind;

pub use resources::{
    collect_resource_status, create_or_update, delete_all, CleanupOutcome, CleanupResult,
    OperationResult, ReconcileFunc, ReconcileResult, UpdatePolicy,
};
pub use tekton_pipelines::TektonPipelines;

/// Whether the operator is mid-upgrade.
///
/// True iff the version recorded by the last completed reconcile differs from
/// the running one. An empty recorded version counts as upgrading.
///
/// # Examples
///
/// ```
/// use tekton_operand::reconcilers::is_upgrading;
///
/// assert!(is_upgrading("1.2.0", "1.3.0"));
/// assert!(!is_upgrading("1.3.0", "1.3.0"));
/// ```
#[must_use]
pub fn is_upgrading(recorded_version: &str, running_version: &str) -> bool {
    recorded_version != running_version
}

/// A kind the outer loop should watch on behalf of an operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchType {
    pub kind: ResourceKind,

    /// CRD that must exist before the watch can be registered
    pub crd: Option<&'static str>,

    /// Trigger on any change, not only on metadata/ownership changes
    pub watch_full_object: bool,
}

impl WatchType {
    #[must_use]
    pub const fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            crd: None,
            watch_full_object: false,
        }
    }
}

/// A group of resources reconciled and cleaned up together.
#[async_trait]
pub trait Operand: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cluster-wide kinds whose changes should trigger a reconcile.
    fn watch_cluster_types(&self) -> Vec<WatchType>;

    /// Kinds watched in the operator namespace only.
    fn watch_types(&self) -> Vec<WatchType>;

    /// Drive the cluster toward the operand's desired state.
    ///
    /// Returns one result per reconciled object, or an empty list when the
    /// operand is disabled.
    async fn reconcile(
        &self,
        request: &Request,
        gateway: &dyn ClusterGateway,
    ) -> Result<Vec<ReconcileResult>>;

    /// Delete every object the operand owns, best-effort.
    async fn cleanup(
        &self,
        request: &Request,
        gateway: &dyn ClusterGateway,
    ) -> Result<Vec<CleanupResult>>;
}
