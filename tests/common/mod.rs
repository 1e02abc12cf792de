// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{Api, DeleteParams, PostParams},
    client::Client,
};
use serde_json::json;
use std::sync::Arc;
use tekton_operand::config::OperatorConfig;
use tekton_operand::context::{FeatureGates, Request};

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {e}");
            None
        }
    }
}

/// Create a test namespace
pub async fn create_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let ns = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "labels": {
                "test": "integration",
                "managed-by": "tekton-operand-test"
            }
        }
    }))?;

    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => {
            println!("Created test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            println!("Test namespace already exists: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Cleanup test namespace
pub async fn cleanup_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            println!("Deleted test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            println!("Test namespace already deleted: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Enabled request for `namespace` at a fixed operator version
pub fn enabled_request(namespace: &str) -> Request {
    let config = Arc::new(OperatorConfig::new(
        "0.0.0-integration",
        "quay.io/kubevirt/virtio-container-disk:latest",
    ));
    Request::new(namespace, config)
        .with_feature_gates(FeatureGates {
            deploy_tekton_task_resources: true,
        })
        .with_observed_version("0.0.0-integration")
}

/// A small bundle using names unique to `suffix`
pub fn test_manifests(suffix: &str) -> String {
    format!(
        r#"---
apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRole
metadata:
  name: tekton-operand-it-{suffix}
rules:
  - apiGroups: ["kubevirt.io"]
    resources: ["virtualmachines"]
    verbs: ["get", "list"]
---
apiVersion: tekton.dev/v1beta1
kind: Pipeline
metadata:
  name: windows-efi-installer-{suffix}
spec:
  params:
    - name: virtioContainerImage
      type: string
      default: static-image
  tasks:
    - name: create-vm
      taskRef:
        kind: Task
        name: create-vm-from-manifest
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: windows-efi-installer-{suffix}
data:
  autounattend.xml: "<unattend/>"
---
apiVersion: rbac.authorization.k8s.io/v1
kind: RoleBinding
metadata:
  name: tekton-operand-it-{suffix}
roleRef:
  apiGroup: rbac.authorization.k8s.io
  kind: ClusterRole
  name: tekton-operand-it-{suffix}
subjects:
  - kind: ServiceAccount
    name: tekton-operand-it-{suffix}
---
apiVersion: v1
kind: ServiceAccount
metadata:
  name: tekton-operand-it-{suffix}
"#
    )
}
