// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Process-wide operator configuration.
//!
//! Values are read once from the environment by the outer control loop and
//! then passed into every [`Request`](crate::context::Request) explicitly.

use crate::constants::{ENV_OPERATOR_VERSION, ENV_VIRTIO_IMAGE};
use crate::errors::{Error, Result};

/// Running operator version and the images it maintains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorConfig {
    /// Version of the running operator, compared against the recorded version
    pub operator_version: String,

    /// Virtio container image injected into `virtioContainer*` pipeline parameters
    pub virtio_image: String,
}

impl OperatorConfig {
    #[must_use]
    pub fn new(operator_version: impl Into<String>, virtio_image: impl Into<String>) -> Self {
        Self {
            operator_version: operator_version.into(),
            virtio_image: virtio_image.into(),
        }
    }

    /// Read configuration from `OPERATOR_VERSION` and `VIRTIO_IMG`.
    ///
    /// `OPERATOR_VERSION` falls back to this crate's version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfig`] if `VIRTIO_IMG` is unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let operator_version = lookup(ENV_OPERATOR_VERSION)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

        let virtio_image = lookup(ENV_VIRTIO_IMAGE)
            .filter(|v| !v.is_empty())
            .ok_or(Error::MissingConfig {
                name: ENV_VIRTIO_IMAGE,
            })?;

        Ok(Self {
            operator_version,
            virtio_image,
        })
    }
}
