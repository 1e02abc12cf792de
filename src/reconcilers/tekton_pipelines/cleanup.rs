// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Deletion of every object in the Tekton pipelines bundle.

use tracing::{info, warn};

use super::functions::resolve_resources;
use crate::bundle::Bundle;
use crate::context::Request;
use crate::errors::Result;
use crate::gateway::ClusterGateway;
use crate::reconcilers::resources::{delete_all, CleanupResult};

/// Delete every bundle object, regardless of feature gates or skip rules.
///
/// Objects are addressed at the namespaces a reconcile pass would have used.
/// Individual failures are reported in the results, not as an error.
///
/// # Errors
///
/// Returns [`crate::errors::Error::Cancelled`] if the request is cancelled.
pub async fn cleanup_tekton_pipelines(
    request: &Request,
    gateway: &dyn ClusterGateway,
    bundle: &Bundle,
) -> Result<Vec<CleanupResult>> {
    let resources = resolve_resources(request, bundle);
    let total = resources.len();

    let results = delete_all(request, gateway, resources).await?;

    let failed = results.iter().filter(|r| !r.outcome.is_success()).count();
    if failed > 0 {
        warn!(failed, total, "Tekton pipelines cleanup incomplete");
    } else {
        info!(total, "Cleaned up tekton pipelines");
    }

    Ok(results)
}

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod cleanup_tests;
