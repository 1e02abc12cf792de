// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tekton pipelines operand.
//!
//! Deploys the Tekton pipelines bundle (pipelines, their config maps, and the
//! RBAC objects their tasks run under) when
//! `spec.featureGates.deployTektonTaskResources` is enabled.
//!
//! ## Module Structure
//!
//! - [`functions`] - Per-kind reconcile function factories and namespace rules
//! - [`cleanup`] - Best-effort deletion of the bundle

// Submodules
pub mod cleanup;
pub mod functions;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::bundle::Bundle;
use crate::constants::{OPERAND_NAME, TEKTON_CRD};
use crate::context::Request;
use crate::errors::{Error, Result};
use crate::gateway::ClusterGateway;
use crate::metrics;
use crate::reconcilers::resources::{
    collect_resource_status, CleanupResult, OperationResult, ReconcileResult,
};
use crate::reconcilers::{is_upgrading, Operand, WatchType};
use crate::resource::ResourceKind;

/// Operand reconciling a shared, immutable Tekton bundle.
#[derive(Clone, Debug)]
pub struct TektonPipelines {
    bundle: Arc<Bundle>,
}

impl TektonPipelines {
    #[must_use]
    pub fn new(bundle: Arc<Bundle>) -> Self {
        Self { bundle }
    }

    async fn reconcile_enabled(
        &self,
        request: &Request,
        gateway: &dyn ClusterGateway,
    ) -> Result<Vec<ReconcileResult>> {
        let crd_exists = tokio::select! {
            biased;
            () = request.cancellation.cancelled() => return Err(Error::Cancelled),
            exists = gateway.crd_exists(TEKTON_CRD) => exists?,
        };
        if !crd_exists {
            return Err(Error::MissingCrd {
                crd: TEKTON_CRD.to_string(),
            });
        }

        let funcs = functions::reconcile_funcs(request, &self.bundle);
        let results = collect_resource_status(request, gateway, &funcs).await?;

        report_unexpected_reverts(request, &results);
        Ok(results)
    }
}

/// Log every update made while the operator is not upgrading.
///
/// Returns the number of reverts reported. Purely diagnostic: results are
/// passed through untouched.
pub fn report_unexpected_reverts(request: &Request, results: &[ReconcileResult]) -> usize {
    let recorded = request.observed_version.as_deref().unwrap_or_default();
    if is_upgrading(recorded, &request.config.operator_version) {
        return 0;
    }

    results
        .iter()
        .filter(|r| r.operation_result == OperationResult::Updated)
        .inspect(|r| {
            warn!("Changes reverted in tekton pipeline: {}", r.resource.name());
            metrics::record_unexpected_revert(OPERAND_NAME);
        })
        .count()
}

#[async_trait]
impl Operand for TektonPipelines {
    fn name(&self) -> &'static str {
        OPERAND_NAME
    }

    fn watch_cluster_types(&self) -> Vec<WatchType> {
        vec![
            WatchType {
                kind: ResourceKind::Pipeline,
                crd: Some(TEKTON_CRD),
                watch_full_object: true,
            },
            WatchType::new(ResourceKind::ConfigMap),
            WatchType::new(ResourceKind::RoleBinding),
            WatchType::new(ResourceKind::ServiceAccount),
            WatchType::new(ResourceKind::ClusterRole),
        ]
    }

    fn watch_types(&self) -> Vec<WatchType> {
        Vec::new()
    }

    #[instrument(skip_all, fields(operand = OPERAND_NAME, namespace = %request.namespace))]
    async fn reconcile(
        &self,
        request: &Request,
        gateway: &dyn ClusterGateway,
    ) -> Result<Vec<ReconcileResult>> {
        if !request.feature_gates.deploy_tekton_task_resources {
            info!("Tekton Pipelines resources were not deployed, because spec.featureGates.deployTektonTaskResources is set to false");
            metrics::record_reconciliation_skipped(OPERAND_NAME);
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let result = self.reconcile_enabled(request, gateway).await;
        match &result {
            Ok(results) => {
                info!(objects = results.len(), "Reconciled tekton pipelines");
                metrics::record_reconciliation_success(OPERAND_NAME, start.elapsed());
            }
            Err(e) => {
                warn!(error = %e, "Failed to reconcile tekton pipelines");
                metrics::record_reconciliation_error(OPERAND_NAME, start.elapsed());
            }
        }
        result
    }

    #[instrument(skip_all, fields(operand = OPERAND_NAME, namespace = %request.namespace))]
    async fn cleanup(
        &self,
        request: &Request,
        gateway: &dyn ClusterGateway,
    ) -> Result<Vec<CleanupResult>> {
        cleanup::cleanup_tekton_pipelines(request, gateway, &self.bundle).await
    }
}
