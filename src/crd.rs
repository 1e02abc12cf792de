// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tekton resource types reconciled by this crate.
//!
//! The Tekton CRDs are owned and installed by Tekton itself, so the schema is
//! disabled here: these types only need to round-trip through the API server.
//!
//! # Example: Declaring a Pipeline
//!
//! ```rust,no_run
//! use tekton_operand::crd::{ParamSpec, ParamType, ParamValue, Pipeline, PipelineSpec};
//!
//! let pipeline = Pipeline::new(
//!     "windows-efi-installer",
//!     PipelineSpec {
//!         params: vec![ParamSpec {
//!             name: "virtioContainerImage".to_string(),
//!             type_: Some(ParamType::String),
//!             description: None,
//!             default: Some(ParamValue::String("quay.io/kubevirt/virtio-container-disk".into())),
//!         }],
//!         ..Default::default()
//!     },
//! );
//! ```

use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Specification of a Tekton `Pipeline`.
///
/// Tasks, workspaces and results are carried as raw JSON so that fields this
/// crate does not model survive a reconcile unchanged.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[kube(
    group = "tekton.dev",
    version = "v1beta1",
    kind = "Pipeline",
    namespaced,
    schema = "disabled",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSpec {
    /// Human readable pipeline name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Free-form description of the pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parameters the pipeline accepts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finally: Vec<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workspaces: Vec<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<serde_json::Value>,
}

/// Declaration of a single pipeline parameter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamSpec {
    pub name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<ParamType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Value used when a run does not supply the parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
}

impl ParamSpec {
    /// Replace the default with a string value, fixing the declared type to match.
    pub fn set_string_default(&mut self, value: &str) {
        self.type_ = Some(ParamType::String);
        self.default = Some(ParamValue::String(value.to_string()));
    }
}

/// Declared type of a pipeline parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Array,
    Object,
}

/// Parameter value; Tekton encodes it as a bare string, array, or string map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Array(Vec<String>),
    Object(BTreeMap<String, String>),
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
