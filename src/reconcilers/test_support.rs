// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory cluster gateway and fixtures shared by reconciler tests.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, ServiceAccount};
use k8s_openapi::api::rbac::v1::{ClusterRole, PolicyRule, RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::bundle::Bundle;
use crate::config::OperatorConfig;
use crate::context::{FeatureGates, Request};
use crate::crd::{ParamSpec, ParamType, ParamValue, Pipeline, PipelineSpec};
use crate::errors::{Error, Result};
use crate::gateway::{ClusterGateway, DeleteOutcome};
use crate::resource::{ManagedResource, ObjectKey};

pub const TEST_NAMESPACE: &str = "kubevirt";
pub const TEST_VERSION: &str = "1.3.0";
pub const TEST_VIRTIO_IMAGE: &str = "quay.io/kubevirt/virtio-container-disk:v1.3.0";

/// Gateway operations, as recorded by [`FakeGateway`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    Get,
    Create,
    Update,
    Delete,
    CrdExists,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub op: Op,
    /// Object name, or CRD name for [`Op::CrdExists`]
    pub name: String,
}

#[derive(Default)]
struct State {
    objects: BTreeMap<ObjectKey, ManagedResource>,
    calls: Vec<Call>,
    failures: HashSet<(Op, String)>,
    stalled: HashSet<Op>,
    crds: HashSet<String>,
    next_version: u64,
}

/// Object store keyed by [`ObjectKey`] that records every call.
///
/// Updates carrying a stale `resourceVersion` fail with a 409 conflict, the
/// way the API server does.
#[derive(Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<State>>,
}

pub fn api_error(code: u16, reason: &str) -> Error {
    Error::Kube(kube::Error::Api(
        kube::core::Status::failure(&format!("{reason} ({code})"), reason)
            .with_code(code)
            .boxed(),
    ))
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway with the Tekton CRD registered.
    pub fn with_tekton() -> Self {
        let gateway = Self::new();
        gateway.register_crd(crate::constants::TEKTON_CRD);
        gateway
    }

    pub fn register_crd(&self, name: &str) {
        self.state.lock().unwrap().crds.insert(name.to_string());
    }

    /// Make every `op` on the object named `name` fail with a 500.
    pub fn fail_on(&self, op: Op, name: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((op, name.to_string()));
    }

    /// Make every `op` hang forever once recorded.
    pub fn stall_on(&self, op: Op) {
        self.state.lock().unwrap().stalled.insert(op);
    }

    /// Store an object directly, bypassing the call log.
    pub fn seed(&self, resource: ManagedResource) -> ManagedResource {
        self.state.lock().unwrap().store(resource)
    }

    pub fn object(&self, key: &ObjectKey) -> Option<ManagedResource> {
        self.state.lock().unwrap().objects.get(key).cloned()
    }

    pub fn objects(&self) -> Vec<ManagedResource> {
        self.state
            .lock()
            .unwrap()
            .objects
            .values()
            .cloned()
            .collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|c| c.op == op).count()
    }

    /// Number of create and update calls.
    pub fn write_count(&self) -> usize {
        self.count(Op::Create) + self.count(Op::Update)
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn record(&self, op: Op, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call {
            op,
            name: name.to_string(),
        });
        if state.failures.contains(&(op, name.to_string())) {
            return Err(api_error(500, "InternalError"));
        }
        Ok(())
    }

    async fn stall(&self, op: Op) {
        let stalled = self.state.lock().unwrap().stalled.contains(&op);
        if stalled {
            std::future::pending::<()>().await;
        }
    }
}

impl State {
    fn store(&mut self, mut resource: ManagedResource) -> ManagedResource {
        self.next_version += 1;
        resource.meta_mut().resource_version = Some(self.next_version.to_string());
        let key = resource.key().unwrap();
        self.objects.insert(key, resource.clone());
        resource
    }
}

#[async_trait]
impl ClusterGateway for FakeGateway {
    async fn get(&self, key: &ObjectKey) -> Result<Option<ManagedResource>> {
        self.record(Op::Get, &key.name)?;
        self.stall(Op::Get).await;
        Ok(self.object(key))
    }

    async fn create(&self, resource: &ManagedResource) -> Result<ManagedResource> {
        self.record(Op::Create, resource.name())?;
        self.stall(Op::Create).await;
        let key = resource.key()?;
        let mut state = self.state.lock().unwrap();
        if state.objects.contains_key(&key) {
            return Err(api_error(409, "AlreadyExists"));
        }
        Ok(state.store(resource.clone()))
    }

    async fn update(&self, resource: &ManagedResource) -> Result<ManagedResource> {
        self.record(Op::Update, resource.name())?;
        self.stall(Op::Update).await;
        let key = resource.key()?;
        let mut state = self.state.lock().unwrap();
        let Some(live) = state.objects.get(&key) else {
            return Err(api_error(404, "NotFound"));
        };
        if live.resource_version() != resource.resource_version() {
            return Err(api_error(409, "Conflict"));
        }
        Ok(state.store(resource.clone()))
    }

    async fn delete(&self, key: &ObjectKey) -> Result<DeleteOutcome> {
        self.record(Op::Delete, &key.name)?;
        self.stall(Op::Delete).await;
        let removed = self.state.lock().unwrap().objects.remove(key);
        Ok(match removed {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::AlreadyAbsent,
        })
    }

    async fn crd_exists(&self, name: &str) -> Result<bool> {
        self.record(Op::CrdExists, name)?;
        self.stall(Op::CrdExists).await;
        Ok(self.state.lock().unwrap().crds.contains(name))
    }
}

// ========== Fixtures ==========

pub fn test_config() -> Arc<OperatorConfig> {
    Arc::new(OperatorConfig::new(TEST_VERSION, TEST_VIRTIO_IMAGE))
}

/// Enabled request whose recorded version matches the running one.
pub fn test_request() -> Request {
    Request::new(TEST_NAMESPACE, test_config())
        .with_feature_gates(FeatureGates {
            deploy_tekton_task_resources: true,
        })
        .with_observed_version(TEST_VERSION)
}

fn meta(name: &str, namespace: Option<&str>) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: namespace.map(str::to_string),
        ..Default::default()
    }
}

pub fn pipeline(name: &str, namespace: Option<&str>) -> Pipeline {
    Pipeline {
        metadata: meta(name, namespace),
        spec: PipelineSpec {
            description: Some(format!("{name} pipeline")),
            params: vec![
                ParamSpec {
                    name: "virtioContainerImage".to_string(),
                    type_: Some(ParamType::String),
                    description: Some("Image with virtio drivers".to_string()),
                    default: Some(ParamValue::String("static-bundle-image".to_string())),
                },
                ParamSpec {
                    name: "winImageDownloadURL".to_string(),
                    type_: Some(ParamType::String),
                    description: None,
                    default: None,
                },
            ],
            tasks: vec![serde_json::json!({
                "name": "create-vm",
                "taskRef": {"kind": "Task", "name": "create-vm-from-manifest"}
            })],
            ..Default::default()
        },
    }
}

pub fn config_map(name: &str, namespace: Option<&str>) -> ConfigMap {
    ConfigMap {
        metadata: meta(name, namespace),
        data: Some(BTreeMap::from([(
            "autounattend.xml".to_string(),
            "<unattend/>".to_string(),
        )])),
        ..Default::default()
    }
}

pub fn role_binding(name: &str, namespace: Option<&str>, subjects: &[&str]) -> RoleBinding {
    RoleBinding {
        metadata: meta(name, namespace),
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: "ClusterRole".to_string(),
            name: "windows-efi-installer-task".to_string(),
        },
        subjects: Some(
            subjects
                .iter()
                .map(|sa| Subject {
                    kind: "ServiceAccount".to_string(),
                    name: (*sa).to_string(),
                    namespace: Some("somewhere-else".to_string()),
                    ..Default::default()
                })
                .collect(),
        ),
    }
}

pub fn service_account(name: &str, namespace: Option<&str>) -> ServiceAccount {
    ServiceAccount {
        metadata: meta(name, namespace),
        ..Default::default()
    }
}

pub fn cluster_role(name: &str) -> ClusterRole {
    ClusterRole {
        metadata: meta(name, None),
        rules: Some(vec![PolicyRule {
            api_groups: Some(vec!["kubevirt.io".to_string()]),
            resources: Some(vec!["virtualmachines".to_string()]),
            verbs: vec!["get".to_string(), "list".to_string(), "create".to_string()],
            ..Default::default()
        }]),
        ..Default::default()
    }
}

/// One object of each kind, plus the reserved `pipeline` service account.
pub fn test_bundle() -> Bundle {
    Bundle {
        pipelines: vec![pipeline("windows-efi-installer", None)],
        config_maps: vec![config_map("windows-efi-installer-config", None)],
        role_bindings: vec![role_binding(
            "windows-efi-installer-task",
            None,
            &["windows-efi-installer-task"],
        )],
        service_accounts: vec![
            service_account("windows-efi-installer-task", None),
            service_account(crate::constants::RESERVED_SERVICE_ACCOUNT, None),
        ],
        cluster_roles: vec![cluster_role("windows-efi-installer-task")],
    }
}
