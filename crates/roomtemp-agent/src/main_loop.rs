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

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use eyre::WrapErr;
use humantime::format_duration as dt;
use roomtemp_mqtt::{MqttPublisher, QoS};
use tokio::signal::unix::{SignalKind, signal};
use tokio::time::{Instant, sleep_until};
use typed_builder::TypedBuilder;

use crate::calibration::SensorReadings;
use crate::config::AgentConfig;
use crate::message::TelemetryMessage;
use crate::sensors::cpu_temp::celsius_to_fahrenheit;
use crate::sensors::{EnvironmentSensor, SensorError, read_cpu_temperature};
use crate::systemd::Notifier;

/// Time between the end of one publish and the start of the next tick.
pub const PUBLISH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// What one tick read and sent.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub readings: SensorReadings,
    pub message: TelemetryMessage,
}

pub async fn setup_and_run<E, P>(
    agent_config: &AgentConfig,
    environment: E,
    publisher: P,
) -> eyre::Result<P>
where
    E: EnvironmentSensor,
    P: MqttPublisher,
{
    // Install the handlers before the first tick so an early
    // signal is not lost.
    let shutdown = shutdown_signal()?;
    let notifier = Notifier::from_env();
    notifier.notify_start().await?;

    let mut publish_loop = PublishLoop::builder()
        .thermal_path(agent_config.sensors.cpu_thermal_path.clone())
        .environment(environment)
        .publisher(publisher)
        .topic(agent_config.broker.topic.clone())
        .notifier(notifier)
        .build();

    publish_loop.run(shutdown).await?;
    Ok(publish_loop.into_publisher())
}

/// Resolves on the first SIGINT or SIGTERM.
pub fn shutdown_signal() -> eyre::Result<impl Future<Output = ()> + Send + 'static> {
    let mut term_signal = signal(SignalKind::terminate())?;
    let mut int_signal = signal(SignalKind::interrupt())?;

    Ok(async move {
        tokio::select! {
            _ = term_signal.recv() => tracing::info!("TERM signal received, clean exit"),
            _ = int_signal.recv() => tracing::info!("Interrupt received, clean exit"),
        }
    })
}

#[derive(TypedBuilder)]
pub struct PublishLoop<E, P> {
    // required
    #[builder(setter(into))]
    thermal_path: PathBuf,
    environment: E,
    publisher: P,
    #[builder(setter(into))]
    topic: String,

    // optional
    #[builder(default = PUBLISH_INTERVAL)]
    interval: Duration,
    #[builder(default = QoS::AtLeastOnce)]
    qos: QoS,
    #[builder(default)]
    notifier: Notifier,

    // internal state
    #[builder(default = Instant::now(), setter(skip))]
    started_at: Instant,
    #[builder(default = LoopState::Running, setter(skip))]
    state: LoopState,
    #[builder(default, setter(skip))]
    ticks: u64,
}

impl<E, P> PublishLoop<E, P>
where
    E: EnvironmentSensor,
    P: MqttPublisher,
{
    /// Publishes every `interval` until `shutdown` resolves, then
    /// disconnects the publisher once.
    ///
    /// A shutdown that arrives mid-tick abandons that tick. Any tick
    /// failure is returned as is, without disconnecting. When systemd
    /// set a watchdog, it keeps being pinged while the loop sleeps.
    pub async fn run<F>(&mut self, shutdown: F) -> eyre::Result<()>
    where
        F: Future<Output = ()>,
    {
        if self.state == LoopState::Stopped {
            eyre::bail!("Publish loop already stopped");
        }
        tokio::pin!(shutdown);

        tracing::info!(topic = %self.topic, interval = %dt(self.interval), "Begin Publish");
        'publish: loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                report = self.run_single_iteration() => { report?; }
            }

            let wake_at = Instant::now() + self.interval;
            loop {
                let next_wake = self
                    .notifier
                    .watchdog_interval()
                    .map_or(wake_at, |every| wake_at.min(Instant::now() + every));
                tokio::select! {
                    biased;
                    _ = &mut shutdown => break 'publish,
                    _ = sleep_until(next_wake) => {}
                }
                if next_wake >= wake_at {
                    break;
                }
                self.ping_watchdog().await;
            }
        }

        self.stop().await
    }

    /// Runs a single tick: read, calibrate, publish.
    pub async fn run_single_iteration(&mut self) -> eyre::Result<TickReport> {
        let iteration_start = Instant::now();
        self.ping_watchdog().await;

        let readings = self.read_sensors()?;
        tracing::info!(
            cpu_celsius = readings.cpu,
            cpu_fahrenheit = celsius_to_fahrenheit(readings.cpu),
            pressure_celsius = readings.pressure,
            humidity_celsius = readings.humidity,
            "cpu temp {}",
            readings.cpu as i64,
        );

        let message = TelemetryMessage::new(readings.room_temperature()?, Local::now());
        let payload = message
            .to_json_bytes()
            .wrap_err("serialize telemetry message")?;
        let payload_text = String::from_utf8_lossy(&payload).into_owned();

        self.publisher
            .publish(&self.topic, payload, self.qos)
            .await
            .wrap_err_with(|| format!("publish to {}", self.topic))?;
        self.ticks += 1;
        tracing::info!("Published: '{payload_text}' to the topic: {}", self.topic);

        let status = format!("Published {}\u{b0}C at {}", message.temperature, message.date);
        if let Err(err) = self.notifier.notify_status(&status).await {
            tracing::error!(error = format!("{err:#}"), "systemd::notify_status");
        }

        tracing::debug!(
            iteration = %dt(iteration_start.elapsed()),
            uptime = %dt(self.started_at.elapsed()),
            "publish loop",
        );

        Ok(TickReport { readings, message })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Number of completed ticks (messages handed to the publisher)
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn into_publisher(self) -> P {
        self.publisher
    }

    async fn ping_watchdog(&self) {
        if let Err(err) = self.notifier.notify_watchdog().await {
            tracing::error!(error = format!("{err:#}"), "systemd::notify_watchdog");
        }
    }

    // The thermal zone is reopened every tick and closed before the
    // environment sensors are read.
    fn read_sensors(&self) -> Result<SensorReadings, SensorError> {
        let cpu = read_cpu_temperature(&self.thermal_path)?;
        Ok(SensorReadings {
            cpu,
            pressure: self.environment.temperature_from_pressure()?,
            humidity: self.environment.temperature_from_humidity()?,
        })
    }

    async fn stop(&mut self) -> eyre::Result<()> {
        self.state = LoopState::Stopped;
        tracing::info!(
            ticks = self.ticks,
            uptime = %dt(self.started_at.elapsed()),
            "Publish End"
        );

        if let Err(err) = self.notifier.notify_stop().await {
            tracing::error!(error = format!("{err:#}"), "systemd::notify_stop");
        }
        self.publisher
            .disconnect()
            .await
            .wrap_err("disconnect from broker")
    }
}
