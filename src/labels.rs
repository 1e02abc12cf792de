// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label constants and the ownership label stamp.
//!
//! Every object created or updated by the reconciliation engine carries the
//! standard `app.kubernetes.io/*` labels below. Cleanup relies on the same
//! bundle, so the labels are an explicit attribute of each submitted object
//! rather than something inferred at deletion time.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

use crate::constants::{MANAGED_BY, OPERAND_COMPONENT, OPERAND_NAME};

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the component name within the architecture
pub const K8S_COMPONENT: &str = "app.kubernetes.io/component";

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Standard label for the name of the application
pub const K8S_NAME: &str = "app.kubernetes.io/name";

/// Standard label for the name of a higher-level application this one is part of
pub const K8S_PART_OF: &str = "app.kubernetes.io/part-of";

/// Standard label for the current version of the application
pub const K8S_VERSION: &str = "app.kubernetes.io/version";

/// Application labels stamped onto every managed object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppLabels {
    pub name: String,
    pub component: String,
    pub version: String,
    pub part_of: Option<String>,
}

impl AppLabels {
    /// Labels for the Tekton pipelines operand at the given operator version.
    #[must_use]
    pub fn for_operand(version: &str, part_of: Option<&str>) -> Self {
        Self {
            name: OPERAND_NAME.to_string(),
            component: OPERAND_COMPONENT.to_string(),
            version: version.to_string(),
            part_of: part_of.map(str::to_string),
        }
    }

    /// The label map this stamp writes.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(K8S_NAME.to_string(), self.name.clone());
        labels.insert(K8S_COMPONENT.to_string(), self.component.clone());
        labels.insert(K8S_MANAGED_BY.to_string(), MANAGED_BY.to_string());
        if !self.version.is_empty() {
            labels.insert(K8S_VERSION.to_string(), self.version.clone());
        }
        if let Some(part_of) = self.part_of.as_deref().filter(|p| !p.is_empty()) {
            labels.insert(K8S_PART_OF.to_string(), part_of.to_string());
        }
        labels
    }

    /// Merge the application labels into `meta`, keeping any other labels.
    pub fn apply_to(&self, meta: &mut ObjectMeta) {
        meta.labels
            .get_or_insert_with(BTreeMap::new)
            .extend(self.to_map());
    }
}
