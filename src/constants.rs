// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the Tekton pipelines operand.
//!
//! This module contains all string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Operand Identity
// ============================================================================

/// Name of the operand, used for logging and the `app.kubernetes.io/name` label
pub const OPERAND_NAME: &str = "tekton-pipelines";

/// Component value for the `app.kubernetes.io/component` label
pub const OPERAND_COMPONENT: &str = "tektonPipelines";

/// Value for `app.kubernetes.io/managed-by` on every object this crate writes
pub const MANAGED_BY: &str = "tekton-operand";

/// Field manager name sent with create and replace requests
pub const FIELD_MANAGER: &str = "tekton-operand";

// ============================================================================
// Tekton API Constants
// ============================================================================

/// CRD that must exist before any pipeline object is reconciled
pub const TEKTON_CRD: &str = "tasks.tekton.dev";

/// API group of the Tekton pipeline resources
pub const TEKTON_API_GROUP: &str = "tekton.dev";

/// API version of the Tekton pipeline resources
pub const TEKTON_API_VERSION: &str = "v1beta1";

/// Kind name for `Pipeline` resource
pub const KIND_PIPELINE: &str = "Pipeline";

/// Kind name for `ConfigMap` resource
pub const KIND_CONFIG_MAP: &str = "ConfigMap";

/// Kind name for `RoleBinding` resource
pub const KIND_ROLE_BINDING: &str = "RoleBinding";

/// Kind name for `ServiceAccount` resource
pub const KIND_SERVICE_ACCOUNT: &str = "ServiceAccount";

/// Kind name for `ClusterRole` resource
pub const KIND_CLUSTER_ROLE: &str = "ClusterRole";

// ============================================================================
// Reconciliation Policy Constants
// ============================================================================

/// Namespaces matching this pattern are administrative namespaces.
///
/// The reserved pipeline service account is only deployed into them when a
/// namespace override is set.
pub const ADMIN_NAMESPACE_PATTERN: &str = "^(openshift|kube)-";

/// Service account that is only deployed into administrative namespaces
pub const RESERVED_SERVICE_ACCOUNT: &str = "pipeline";

/// Pipeline parameters with this name prefix get the operator's virtio image as default
pub const VIRTIO_PARAM_PREFIX: &str = "virtioContainer";

// ============================================================================
// Environment Configuration
// ============================================================================

/// Environment variable holding the running operator version
pub const ENV_OPERATOR_VERSION: &str = "OPERATOR_VERSION";

/// Environment variable holding the virtio container image reference
pub const ENV_VIRTIO_IMAGE: &str = "VIRTIO_IMG";

/// Environment variable selecting the log output format (`text` or `json`)
pub const ENV_LOG_FORMAT: &str = "RUST_LOG_FORMAT";

// ============================================================================
// Metrics Constants
// ============================================================================

/// Namespace prefix for all metrics (prometheus-safe)
pub const METRICS_NAMESPACE: &str = "tekton_operand";
