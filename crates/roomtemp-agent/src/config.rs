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

use std::path::{Path, PathBuf};
use std::time::Duration;

use roomtemp_mqtt::options::{DEFAULT_CLEAN_SESSION, DEFAULT_CONNECT_TIMEOUT, DEFAULT_KEEP_ALIVE};
use roomtemp_mqtt::{ClientOptions, ClientTlsConfig, MqttClientError};
use serde::{Deserialize, Serialize};

use crate::sensors::cpu_temp::DEFAULT_THERMAL_ZONE;
use crate::sensors::iio::{DEFAULT_HUMIDITY_DEVICE, DEFAULT_IIO_ROOT, DEFAULT_PRESSURE_DEVICE};

/// AWS IoT Core endpoint for the room sensor.
const DEFAULT_ENDPOINT: &str = "a2csf1frpsnqc7-ats.iot.eu-west-1.amazonaws.com";
/// MQTT over TLS.
const DEFAULT_PORT: u16 = 8883;
const DEFAULT_CLIENT_ID: &str = "cm4702Pi";
const DEFAULT_TOPIC: &str = "device/WHHTS1/data";

const DEFAULT_ROOT_CA: &str = "/home/pi/certs/Amazon-root-CA-1.pem";
const DEFAULT_CLIENT_CERT: &str = "/home/pi/certs/device.pem.crt";
const DEFAULT_CLIENT_KEY: &str = "/home/pi/certs/private.pem.key";

/// Describes the format of the agent configuration file.
///
/// Every field has a default, so an empty file (or no file at all) gives
/// the production setup. Serialize is only used by tests.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub sensors: SensorsConfig,
}

impl AgentConfig {
    /// Loads the agent configuration file in toml format from the given path
    pub fn load_from(path: &Path) -> Result<Self, std::io::Error> {
        let data = std::fs::read_to_string(path)?;

        toml::from_str(&data).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Invalid AgentConfig toml data: {e}"),
            )
        })
    }

    /// Client options for the broker connection, with the TLS material
    /// read from disk.
    pub fn client_options(&self) -> Result<ClientOptions, MqttClientError> {
        let tls_config = ClientTlsConfig::from_pem_files(
            &self.credentials.root_ca,
            &self.credentials.client_cert,
            &self.credentials.client_key,
        )?;
        Ok(ClientOptions::default()
            .with_keep_alive(Duration::from_secs(self.broker.keep_alive_secs))
            .with_clean_session(self.broker.clean_session)
            .with_connect_timeout(Duration::from_secs(self.broker.connect_timeout_secs))
            .with_tls_config(tls_config))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrokerConfig {
    pub endpoint: String,
    pub port: u16,
    pub client_id: String,
    /// Where telemetry messages are published
    pub topic: String,
    pub keep_alive_secs: u64,
    /// Keep false so unacknowledged QoS 1 messages survive a reconnect.
    pub clean_session: bool,
    /// How long to wait for the broker to accept the connection at startup
    pub connect_timeout_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            port: DEFAULT_PORT,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            keep_alive_secs: DEFAULT_KEEP_ALIVE.as_secs(),
            clean_session: DEFAULT_CLEAN_SESSION,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CredentialsConfig {
    pub root_ca: PathBuf,
    pub client_cert: PathBuf,
    pub client_key: PathBuf,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            root_ca: PathBuf::from(DEFAULT_ROOT_CA),
            client_cert: PathBuf::from(DEFAULT_CLIENT_CERT),
            client_key: PathBuf::from(DEFAULT_CLIENT_KEY),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SensorsConfig {
    /// Thermal zone holding the SoC temperature in millidegrees
    pub cpu_thermal_path: PathBuf,
    pub iio_root: PathBuf,
    /// IIO `name` of the barometric pressure sensor
    pub pressure_device: String,
    /// IIO `name` of the humidity sensor
    pub humidity_device: String,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            cpu_thermal_path: PathBuf::from(DEFAULT_THERMAL_ZONE),
            iio_root: PathBuf::from(DEFAULT_IIO_ROOT),
            pressure_device: DEFAULT_PRESSURE_DEVICE.to_string(),
            humidity_device: DEFAULT_HUMIDITY_DEVICE.to_string(),
        }
    }
}
