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

// src/options.rs
// Configuration options for the MqttClient.
use std::path::Path;

use rumqttc::Transport;
use tokio::time::Duration;

use crate::errors::{MqttClientError, credential_error};

// DEFAULT_KEEP_ALIVE is how often we ping the broker when idle.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(6);

// DEFAULT_CLEAN_SESSION is false so the broker keeps our session
// (and any unacknowledged QoS 1 messages) across reconnects.
pub const DEFAULT_CLEAN_SESSION: bool = false;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

// DEFAULT_REQUEST_CHANNEL_CAPACITY is the number of outgoing requests
// the async client buffers before publish() starts waiting.
pub const DEFAULT_REQUEST_CHANNEL_CAPACITY: usize = 10;

// ClientOptions are optional parameters that can be
// passed to the client, all of which have default
// fallbacks.
#[derive(Clone, Debug, Default)]
pub struct ClientOptions {
    // keep_alive sets the keepalive to use for MQTT broker connections.
    // Defaults to DEFAULT_KEEP_ALIVE.
    pub keep_alive: Option<Duration>,
    // clean_session asks the broker to discard any previous session
    // for our client ID. Defaults to DEFAULT_CLEAN_SESSION.
    pub clean_session: Option<bool>,
    // connect_timeout bounds how long connect() waits for CONNACK.
    // Defaults to DEFAULT_CONNECT_TIMEOUT.
    pub connect_timeout: Option<Duration>,
    // request_channel_capacity defaults to DEFAULT_REQUEST_CHANNEL_CAPACITY.
    pub request_channel_capacity: Option<usize>,
    // tls_config is an optional ClientTlsConfig to provide
    // for using TLS, and optionally, mTLS. Plain TCP is used
    // when this is None.
    pub tls_config: Option<ClientTlsConfig>,
}

impl ClientOptions {
    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = Some(keep_alive);
        self
    }

    pub fn with_clean_session(mut self, clean_session: bool) -> Self {
        self.clean_session = Some(clean_session);
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = Some(connect_timeout);
        self
    }

    pub fn with_request_channel_capacity(mut self, capacity: usize) -> Self {
        self.request_channel_capacity = Some(capacity);
        self
    }

    pub fn with_tls_config(mut self, tls_config: ClientTlsConfig) -> Self {
        self.tls_config = Some(tls_config);
        self
    }

    pub fn effective_keep_alive(&self) -> Duration {
        self.keep_alive.unwrap_or(DEFAULT_KEEP_ALIVE)
    }

    pub fn effective_clean_session(&self) -> bool {
        self.clean_session.unwrap_or(DEFAULT_CLEAN_SESSION)
    }

    pub fn effective_connect_timeout(&self) -> Duration {
        self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn effective_request_channel_capacity(&self) -> usize {
        self.request_channel_capacity
            .unwrap_or(DEFAULT_REQUEST_CHANNEL_CAPACITY)
    }
}

// ClientTlsConfig is config for using TLS (and optionally
// mTLS) with the MQTT server.
#[derive(Clone)]
pub struct ClientTlsConfig {
    // ca_certificate is PEM bytes for the trusted root CA
    // (or CA bundle) that signed the broker certificate.
    pub ca_certificate: Vec<u8>,
    // client_identity is the optional client certificate
    // and private key used for mTLS.
    pub client_identity: Option<ClientTlsIdentity>,
}

// ClientTlsIdentity is config to negotiate an mTLS
// handshake with the MQTT server.
#[derive(Clone)]
pub struct ClientTlsIdentity {
    // certificate is PEM bytes for the device certificate.
    pub certificate: Vec<u8>,
    // private_key is PEM bytes for the matching key.
    pub private_key: Vec<u8>,
}

impl ClientTlsConfig {
    // from_pem_files loads the root CA and the device identity
    // from disk. Each unreadable file is reported with its path.
    pub fn from_pem_files(
        root_ca: &Path,
        client_cert: &Path,
        client_key: &Path,
    ) -> Result<Self, MqttClientError> {
        let ca_certificate =
            std::fs::read(root_ca).map_err(|e| credential_error("root CA", root_ca, e))?;
        let certificate = std::fs::read(client_cert)
            .map_err(|e| credential_error("client certificate", client_cert, e))?;
        let private_key =
            std::fs::read(client_key).map_err(|e| credential_error("client key", client_key, e))?;

        Ok(Self {
            ca_certificate,
            client_identity: Some(ClientTlsIdentity {
                certificate,
                private_key,
            }),
        })
    }

    pub fn is_mutual(&self) -> bool {
        self.client_identity.is_some()
    }

    // into_transport converts this config into the rumqttc
    // transport (rustls backed).
    pub fn into_transport(self) -> Transport {
        let client_auth = self
            .client_identity
            .map(|identity| (identity.certificate, identity.private_key));
        Transport::tls(self.ca_certificate, client_auth, None)
    }
}

// Key material stays out of logs.
impl std::fmt::Debug for ClientTlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientTlsConfig")
            .field("ca_certificate_len", &self.ca_certificate.len())
            .field("mutual", &self.is_mutual())
            .finish()
    }
}

impl std::fmt::Debug for ClientTlsIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientTlsIdentity")
            .field("certificate_len", &self.certificate.len())
            .finish_non_exhaustive()
    }
}
