// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Request-scoped context for a single reconcile or cleanup pass.
//!
//! The outer control loop builds one [`Request`] per watch event from the
//! operator's own custom resource. It carries:
//! - the primary (operator instance) namespace
//! - feature gates and the optional pipeline namespace override
//! - the version recorded by the last successful reconcile
//! - process configuration ([`OperatorConfig`])
//! - a cancellation token honoured by every gateway call

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::OperatorConfig;
use crate::labels::AppLabels;

/// Feature gates from the operator's custom resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeatureGates {
    /// `spec.featureGates.deployTektonTaskResources`
    pub deploy_tekton_task_resources: bool,
}

/// `spec.tektonPipelines` of the operator's custom resource.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TektonPipelinesSpec {
    /// Namespace to deploy pipelines and their config maps into
    pub namespace: Option<String>,
}

/// Everything one pass needs to know about the request that triggered it.
#[derive(Clone, Debug)]
pub struct Request {
    /// Namespace of the operator's custom resource
    pub namespace: String,

    pub feature_gates: FeatureGates,

    pub tekton_pipelines: Option<TektonPipelinesSpec>,

    /// `status.observedVersion` recorded by the last completed reconcile
    pub observed_version: Option<String>,

    /// Value for the `app.kubernetes.io/part-of` label
    pub part_of: Option<String>,

    pub config: Arc<OperatorConfig>,

    /// Cancelled by the caller on timeout or shutdown
    pub cancellation: CancellationToken,
}

impl Request {
    /// Request with all feature gates disabled and no override.
    #[must_use]
    pub fn new(namespace: impl Into<String>, config: Arc<OperatorConfig>) -> Self {
        Self {
            namespace: namespace.into(),
            feature_gates: FeatureGates::default(),
            tekton_pipelines: None,
            observed_version: None,
            part_of: None,
            config,
            cancellation: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_feature_gates(mut self, feature_gates: FeatureGates) -> Self {
        self.feature_gates = feature_gates;
        self
    }

    #[must_use]
    pub fn with_namespace_override(mut self, namespace: impl Into<String>) -> Self {
        self.tekton_pipelines = Some(TektonPipelinesSpec {
            namespace: Some(namespace.into()),
        });
        self
    }

    #[must_use]
    pub fn with_observed_version(mut self, version: impl Into<String>) -> Self {
        self.observed_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_part_of(mut self, part_of: impl Into<String>) -> Self {
        self.part_of = Some(part_of.into());
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// The pipeline namespace override, if set and non-empty.
    #[must_use]
    pub fn namespace_override(&self) -> Option<&str> {
        self.tekton_pipelines
            .as_ref()
            .and_then(|spec| spec.namespace.as_deref())
            .filter(|ns| !ns.is_empty())
    }

    /// Ownership labels for objects written during this request.
    #[must_use]
    pub fn app_labels(&self) -> AppLabels {
        AppLabels::for_operand(&self.config.operator_version, self.part_of.as_deref())
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
