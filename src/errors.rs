// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for reconciliation and cleanup.
//!
//! Gateway failures are carried unmodified in [`Error::Kube`]; this crate never
//! retries them. [`Error::is_retryable`] exists so the outer control loop can
//! decide on backoff.

use thiserror::Error;

use crate::resource::ResourceKind;

/// Errors produced by the operand, the engine and the cluster gateway.
#[derive(Error, Debug)]
pub enum Error {
    /// A required extension type is not registered in the cluster.
    ///
    /// This is a precondition failure: no mutation is attempted.
    #[error("Tekton CRD {crd} does not exist")]
    MissingCrd {
        /// Fully qualified CRD name (e.g. `tasks.tekton.dev`)
        crd: String,
    },

    /// A desired object has no `metadata.name`
    #[error("{kind} resource has no name in its metadata")]
    MissingName { kind: ResourceKind },

    /// A namespaced object has no namespace after request-scoped defaulting
    #[error("{kind} {name} has no namespace")]
    MissingNamespace { kind: ResourceKind, name: String },

    /// The gateway returned an object of a different kind than requested
    #[error("expected {expected} object from the cluster, got {actual}")]
    KindMismatch {
        expected: ResourceKind,
        actual: ResourceKind,
    },

    /// Kubernetes API failure (permission, conflict, network)
    #[error(transparent)]
    Kube(#[from] kube::Error),

    /// The request context was cancelled before the pass completed
    #[error("reconciliation cancelled")]
    Cancelled,

    /// A bundle manifest could not be decoded
    #[error("invalid bundle manifest: {0}")]
    Manifest(#[from] serde_yaml::Error),

    /// A bundle manifest declares a kind this operand does not manage
    #[error("unsupported kind '{kind}' in bundle")]
    UnsupportedKind { kind: String },

    /// Required configuration is missing from the environment
    #[error("required environment variable {name} is not set")]
    MissingConfig { name: &'static str },
}

impl Error {
    /// Whether the outer loop should retry the pass with backoff.
    ///
    /// Conflicts (409) from optimistic concurrency, throttling (429), server
    /// errors (5xx) and transport errors are transient. Everything else needs
    /// a configuration or bundle change first.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Kube(kube::Error::Api(api_err)) => {
                api_err.code == 409 || api_err.code == 429 || (500..600).contains(&api_err.code)
            }
            Error::Kube(kube::Error::Service(_)) => true,
            _ => false,
        }
    }

    /// Whether this is a `404 Not Found` from the API server.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Kube(kube::Error::Api(api_err)) if api_err.code == 404)
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
