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

//! roomtemp-agent samples the Sense HAT and CPU temperatures, derives a
//! calibrated room temperature and publishes it to an MQTT broker once
//! a minute.

use eyre::WrapErr;
use roomtemp_mqtt::MqttClient;

pub use crate::command_line::Options;
use crate::config::AgentConfig;
use crate::sensors::IioEnvironment;

pub mod calibration;
mod command_line;
pub mod config;
pub mod logging;
pub mod main_loop;
pub mod message;
pub mod sensors;
pub mod systemd;

pub async fn start(cmdline: Options) -> eyre::Result<()> {
    let (agent, path) = match cmdline.config_path {
        // normal production case
        None => (AgentConfig::default(), "default".to_string()),
        // development overrides
        Some(config_path) => (
            AgentConfig::load_from(&config_path).wrap_err(format!(
                "Error loading agent configuration from {}",
                config_path.display()
            ))?,
            config_path.display().to_string(),
        ),
    };
    tracing::info!("Using configuration from {path}: {agent:?}");

    let environment = IioEnvironment::discover(
        &agent.sensors.iio_root,
        &agent.sensors.pressure_device,
        &agent.sensors.humidity_device,
    )
    .wrap_err("locating Sense HAT sensors")?;

    let client_options = agent
        .client_options()
        .wrap_err("loading broker credentials")?;
    tracing::info!(
        "Connecting to {} with client ID '{}'...",
        agent.broker.endpoint,
        agent.broker.client_id
    );
    let client = MqttClient::connect(
        &agent.broker.endpoint,
        agent.broker.port,
        &agent.broker.client_id,
        Some(client_options),
    )
    .await
    .wrap_err_with(|| format!("connecting to {}", agent.broker.endpoint))?;
    tracing::info!("Connected!");

    let client = main_loop::setup_and_run(&agent, environment, client)
        .await
        .wrap_err("main_loop error exit")?;

    let stats = client.publish_stats();
    tracing::info!(
        published = stats.total_published,
        acknowledged = stats.total_acknowledged,
        failed = stats.total_failed,
        bytes = stats.total_bytes_published,
        "Agent exit"
    );
    Ok(())
}
