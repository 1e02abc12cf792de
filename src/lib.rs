// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Tekton Operand - Declarative Tekton Bundle Reconciliation
//!
//! Tekton Operand drives a Kubernetes cluster toward a pre-loaded bundle of
//! Tekton pipelines, config maps and RBAC objects, tolerating concurrent
//! external edits and reporting what happened to every object.
//!
//! ## Overview
//!
//! This library provides the core of the operand, including:
//!
//! - A typed, immutable resource [`bundle`] grouped by kind
//! - A fail-fast create-or-update engine and a best-effort cleanup engine
//! - Per-kind namespace override and skip rules for the Tekton bundle
//! - Upgrade detection to tell expected churn from external drift
//!
//! ## Modules
//!
//! - [`crd`] - Tekton `Pipeline` resource type
//! - [`resource`] - Tagged variant over every managed kind
//! - [`bundle`] - Desired-state bundle and manifest decoding
//! - [`context`] - Request-scoped context
//! - [`gateway`] - Cluster gateway trait and kube-backed implementation
//! - [`reconcilers`] - Reconciliation engine and the Tekton pipelines operand
//!
//! ## Example
//!
//! ```rust,no_run
//! use tekton_operand::bundle::Bundle;
//! use tekton_operand::config::OperatorConfig;
//! use tekton_operand::context::{FeatureGates, Request};
//! use tekton_operand::gateway::KubeGateway;
//! use tekton_operand::reconcilers::{Operand, TektonPipelines};
//! use std::sync::Arc;
//!
//! # async fn run(client: kube::Client, manifests: &str) -> tekton_operand::errors::Result<()> {
//! tekton_operand::logging::init_logging();
//!
//! let operand = TektonPipelines::new(Arc::new(Bundle::from_yaml(manifests)?));
//! let request = Request::new("kubevirt", Arc::new(OperatorConfig::from_env()?))
//!     .with_feature_gates(FeatureGates {
//!         deploy_tekton_task_resources: true,
//!     })
//!     .with_namespace_override("openshift-cnv");
//!
//! for result in operand.reconcile(&request, &KubeGateway::new(client)).await? {
//!     println!("{}: {}", result.resource.name(), result.operation_result);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod config;
pub mod constants;
pub mod context;
pub mod crd;
pub mod errors;
pub mod gateway;
pub mod labels;
pub mod logging;
pub mod metrics;
pub mod reconcilers;
pub mod resource;
