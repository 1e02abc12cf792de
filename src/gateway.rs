// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster gateway: the primitives the engine needs from the API server.
//!
//! The engine only talks to [`ClusterGateway`], so reconcile logic can be
//! exercised against fakes and mocks while [`KubeGateway`] drives a real
//! cluster through `kube::Api`.
//!
//! # Example
//!
//! ```rust,no_run
//! use tekton_operand::gateway::{ClusterGateway, KubeGateway};
//! use kube::Client;
//!
//! async fn has_tekton(client: Client) -> tekton_operand::errors::Result<bool> {
//!     let gateway = KubeGateway::new(client);
//!     gateway.crd_exists("tasks.tekton.dev").await
//! }
//! ```

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, ServiceAccount};
use k8s_openapi::api::rbac::v1::{ClusterRole, RoleBinding};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{DeleteParams, PostParams};
use kube::core::{ClusterResourceScope, NamespaceResourceScope};
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::constants::FIELD_MANAGER;
use crate::crd::Pipeline;
use crate::errors::{Error, Result};
use crate::resource::{ManagedResource, ObjectKey, ResourceKind};

/// Result of a single delete request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The object existed and a delete was issued
    Deleted,
    /// The object was not found; nothing to do
    AlreadyAbsent,
}

/// Trait abstracting cluster operations for the reconciliation engine.
///
/// Implementations must surface optimistic-concurrency conflicts on
/// [`update`](ClusterGateway::update) as errors; retrying is the caller's job.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterGateway: Send + Sync {
    /// Fetch the live object, or `None` if it does not exist.
    async fn get(&self, key: &ObjectKey) -> Result<Option<ManagedResource>>;

    /// Create the object and return it as stored by the server.
    async fn create(&self, resource: &ManagedResource) -> Result<ManagedResource>;

    /// Replace the object. `resource` carries the live `resourceVersion`.
    async fn update(&self, resource: &ManagedResource) -> Result<ManagedResource>;

    /// Delete the object. A missing object is [`DeleteOutcome::AlreadyAbsent`].
    async fn delete(&self, key: &ObjectKey) -> Result<DeleteOutcome>;

    /// Whether the named CRD is registered in the cluster.
    async fn crd_exists(&self, name: &str) -> Result<bool>;
}

/// Real Kubernetes gateway implementation
#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
}

impl KubeGateway {
    /// Create a new `KubeGateway` wrapping the given kube Client
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn namespaced<K>(&self, key: &ObjectKey) -> Result<Api<K>>
    where
        K: Resource<DynamicType = (), Scope = NamespaceResourceScope>,
    {
        let namespace = key
            .namespace
            .as_deref()
            .ok_or_else(|| Error::MissingNamespace {
                kind: key.kind,
                name: key.name.clone(),
            })?;
        Ok(Api::namespaced(self.client.clone(), namespace))
    }

    fn cluster<K>(&self) -> Api<K>
    where
        K: Resource<DynamicType = (), Scope = ClusterResourceScope>,
    {
        Api::all(self.client.clone())
    }

    fn post_params() -> PostParams {
        PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        }
    }
}

async fn get_typed<K>(api: Api<K>, name: &str) -> Result<Option<ManagedResource>>
where
    K: Resource<DynamicType = ()> + Clone + Debug + DeserializeOwned + Into<ManagedResource>,
{
    Ok(api.get_opt(name).await?.map(Into::into))
}

async fn create_typed<K>(api: Api<K>, resource: &K) -> Result<ManagedResource>
where
    K: Resource<DynamicType = ()>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Into<ManagedResource>,
{
    Ok(api
        .create(&KubeGateway::post_params(), resource)
        .await?
        .into())
}

async fn replace_typed<K>(api: Api<K>, name: &str, resource: &K) -> Result<ManagedResource>
where
    K: Resource<DynamicType = ()>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Into<ManagedResource>,
{
    Ok(api
        .replace(name, &KubeGateway::post_params(), resource)
        .await?
        .into())
}

async fn delete_typed<K>(api: Api<K>, name: &str) -> Result<DeleteOutcome>
where
    K: Resource<DynamicType = ()> + Clone + Debug + DeserializeOwned,
{
    match api.delete(name, &DeleteParams::background()).await {
        Ok(_) => Ok(DeleteOutcome::Deleted),
        Err(e) => delete_outcome(e.into()),
    }
}

/// A 404 on delete means the object is already gone.
fn delete_outcome(err: Error) -> Result<DeleteOutcome> {
    if err.is_not_found() {
        Ok(DeleteOutcome::AlreadyAbsent)
    } else {
        Err(err)
    }
}

#[async_trait]
impl ClusterGateway for KubeGateway {
    async fn get(&self, key: &ObjectKey) -> Result<Option<ManagedResource>> {
        debug!(key = %key, "Fetching live object");
        match key.kind {
            ResourceKind::Pipeline => get_typed(self.namespaced::<Pipeline>(key)?, &key.name).await,
            ResourceKind::ConfigMap => {
                get_typed(self.namespaced::<ConfigMap>(key)?, &key.name).await
            }
            ResourceKind::RoleBinding => {
                get_typed(self.namespaced::<RoleBinding>(key)?, &key.name).await
            }
            ResourceKind::ServiceAccount => {
                get_typed(self.namespaced::<ServiceAccount>(key)?, &key.name).await
            }
            ResourceKind::ClusterRole => get_typed(self.cluster::<ClusterRole>(), &key.name).await,
        }
    }

    async fn create(&self, resource: &ManagedResource) -> Result<ManagedResource> {
        let key = resource.key()?;
        debug!(key = %key, "Creating object");
        match resource {
            ManagedResource::Pipeline(obj) => create_typed(self.namespaced(&key)?, obj).await,
            ManagedResource::ConfigMap(obj) => create_typed(self.namespaced(&key)?, obj).await,
            ManagedResource::RoleBinding(obj) => create_typed(self.namespaced(&key)?, obj).await,
            ManagedResource::ServiceAccount(obj) => {
                create_typed(self.namespaced(&key)?, obj).await
            }
            ManagedResource::ClusterRole(obj) => create_typed(self.cluster(), obj).await,
        }
    }

    async fn update(&self, resource: &ManagedResource) -> Result<ManagedResource> {
        let key = resource.key()?;
        debug!(
            key = %key,
            resource_version = resource.resource_version().unwrap_or_default(),
            "Replacing object"
        );
        match resource {
            ManagedResource::Pipeline(obj) => {
                replace_typed(self.namespaced(&key)?, &key.name, obj).await
            }
            ManagedResource::ConfigMap(obj) => {
                replace_typed(self.namespaced(&key)?, &key.name, obj).await
            }
            ManagedResource::RoleBinding(obj) => {
                replace_typed(self.namespaced(&key)?, &key.name, obj).await
            }
            ManagedResource::ServiceAccount(obj) => {
                replace_typed(self.namespaced(&key)?, &key.name, obj).await
            }
            ManagedResource::ClusterRole(obj) => {
                replace_typed(self.cluster(), &key.name, obj).await
            }
        }
    }

    async fn delete(&self, key: &ObjectKey) -> Result<DeleteOutcome> {
        debug!(key = %key, "Deleting object");
        match key.kind {
            ResourceKind::Pipeline => {
                delete_typed(self.namespaced::<Pipeline>(key)?, &key.name).await
            }
            ResourceKind::ConfigMap => {
                delete_typed(self.namespaced::<ConfigMap>(key)?, &key.name).await
            }
            ResourceKind::RoleBinding => {
                delete_typed(self.namespaced::<RoleBinding>(key)?, &key.name).await
            }
            ResourceKind::ServiceAccount => {
                delete_typed(self.namespaced::<ServiceAccount>(key)?, &key.name).await
            }
            ResourceKind::ClusterRole => {
                delete_typed(self.cluster::<ClusterRole>(), &key.name).await
            }
        }
    }

    async fn crd_exists(&self, name: &str) -> Result<bool> {
        let api: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        Ok(api.get_opt(name).await?.is_some())
    }
}
