/*
 * SPDX-FileCopyrightText: Copyright (c) 2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

// src/errors.rs
// Error types for connecting, publishing and tearing down the MQTT client.

use std::path::PathBuf;
use std::time::Duration;

use rumqttc::{ClientError, ConnectionError};
use tokio::task::JoinError;

#[derive(Debug, thiserror::Error)]
pub enum MqttClientError {
    // ClientError is returned when a request (publish, disconnect)
    // could not be handed to the event loop.
    #[error("MQTT client request failed: {0}")]
    ClientError(#[from] ClientError),

    // ConnectionError is returned when the network event loop fails
    // while waiting for the broker to accept the connection.
    #[error("MQTT connection failed: {0}")]
    ConnectionError(#[from] ConnectionError),

    #[error("Timed out after {0:?} waiting for the broker to accept the connection")]
    ConnectTimeout(Duration),

    // CredentialError covers unreadable TLS material on disk.
    #[error("Failed to read {kind} from {}: {source}", path.display())]
    CredentialError {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("MQTT event loop task failed: {0}")]
    EventLoopTaskError(#[from] JoinError),
}

impl MqttClientError {
    // is_connection_error is true for anything that means the
    // broker could not be reached or refused us.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ClientError(_) | Self::ConnectionError(_) | Self::ConnectTimeout(_)
        )
    }

    pub fn is_credential_error(&self) -> bool {
        matches!(self, Self::CredentialError { .. })
    }
}

// credential_error builds a CredentialError for the given
// kind of TLS material (e.g. "root CA", "client key").
pub fn credential_error(
    kind: &'static str,
    path: impl Into<PathBuf>,
    source: std::io::Error,
) -> MqttClientError {
    MqttClientError::CredentialError {
        kind,
        path: path.into(),
        source,
    }
}
