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

// src/client.rs
// MqttClient wraps a rumqttc AsyncClient and drives its event loop
// on a background task.
//
// connect() polls the event loop inline until the broker answers the
// CONNECT with a CONNACK, so callers know the session is up before
// the first publish. After that the event loop is handed to a task
// which keeps polling (and, inside rumqttc, reconnecting) until a
// DISCONNECT has been sent.

use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, trace, warn};

use crate::errors::MqttClientError;
use crate::options::ClientOptions;
use crate::stats::{PublishStats, PublishStatsTracker};
use crate::traits::MqttPublisher;

// How long to wait before polling again after the event loop
// reports a connection error.
const EVENT_LOOP_ERROR_BACKOFF: Duration = Duration::from_secs(1);

// How long disconnect() waits for the DISCONNECT packet to be
// written before giving up on the event loop task.
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct MqttClient {
    client: AsyncClient,
    event_loop_task: Option<JoinHandle<()>>,
    stats: PublishStatsTracker,
    broker: String,
}

impl MqttClient {
    // connect performs the one-time handshake against host:port
    // and returns once the broker has accepted the session.
    pub async fn connect(
        host: &str,
        port: u16,
        client_id: &str,
        options: Option<ClientOptions>,
    ) -> Result<Self, MqttClientError> {
        let options = options.unwrap_or_default();
        let connect_timeout = options.effective_connect_timeout();

        let mut mqtt_options = MqttOptions::new(client_id, host, port);
        mqtt_options.set_keep_alive(options.effective_keep_alive());
        mqtt_options.set_clean_session(options.effective_clean_session());
        if let Some(tls_config) = options.tls_config.clone() {
            debug!(?tls_config, "Using TLS transport");
            mqtt_options.set_transport(tls_config.into_transport());
        }

        let (client, mut event_loop) =
            AsyncClient::new(mqtt_options, options.effective_request_channel_capacity());

        match timeout(connect_timeout, wait_for_connack(&mut event_loop)).await {
            Ok(Ok(session_present)) => {
                debug!(broker = %host, port, session_present, "Broker accepted connection");
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(MqttClientError::ConnectTimeout(connect_timeout)),
        }

        let stats = PublishStatsTracker::new();
        let event_loop_task = tokio::spawn(drive_event_loop(event_loop, stats.clone()));

        Ok(Self {
            client,
            event_loop_task: Some(event_loop_task),
            stats,
            broker: format!("{host}:{port}"),
        })
    }

    // publish hands payload to the event loop. It returns once the
    // request is queued; QoS 1 acknowledgement arrives later and is
    // only reflected in publish_stats().
    pub async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        qos: QoS,
    ) -> Result<(), MqttClientError> {
        let size = payload.len();
        match self.client.publish(topic, qos, false, payload).await {
            Ok(()) => {
                self.stats.increment_published(size);
                trace!(topic, size, ?qos, "Queued publish");
                Ok(())
            }
            Err(e) => {
                self.stats.increment_failed();
                Err(e.into())
            }
        }
    }

    // disconnect sends DISCONNECT and waits (bounded) for the
    // event loop task to write it and exit.
    pub async fn disconnect(&mut self) -> Result<(), MqttClientError> {
        self.client.disconnect().await?;

        if let Some(task) = self.event_loop_task.take() {
            let abort_handle = task.abort_handle();
            match timeout(DISCONNECT_TIMEOUT, task).await {
                Ok(joined) => joined?,
                Err(_) => {
                    warn!(
                        broker = %self.broker,
                        "Event loop did not finish within {DISCONNECT_TIMEOUT:?}, aborting"
                    );
                    abort_handle.abort();
                }
            }
        }
        Ok(())
    }

    pub fn publish_stats(&self) -> PublishStats {
        self.stats.to_stats()
    }

    pub fn broker(&self) -> &str {
        &self.broker
    }
}

impl Drop for MqttClient {
    fn drop(&mut self) {
        if let Some(task) = self.event_loop_task.take() {
            task.abort();
        }
    }
}

#[async_trait]
impl MqttPublisher for MqttClient {
    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        qos: QoS,
    ) -> Result<(), MqttClientError> {
        MqttClient::publish(self, topic, payload, qos).await
    }

    async fn disconnect(&mut self) -> Result<(), MqttClientError> {
        MqttClient::disconnect(self).await
    }
}

// wait_for_connack polls until the broker's CONNACK arrives and
// returns its session_present flag. rumqttc surfaces a refused
// CONNACK as a ConnectionError, so anything else is just progress.
async fn wait_for_connack(event_loop: &mut EventLoop) -> Result<bool, ConnectionError> {
    loop {
        if let Event::Incoming(Packet::ConnAck(ack)) = event_loop.poll().await? {
            return Ok(ack.session_present);
        }
    }
}

async fn drive_event_loop(mut event_loop: EventLoop, stats: PublishStatsTracker) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::PubAck(ack))) => {
                trace!(pkid = ack.pkid, "Broker acknowledged publish");
                stats.increment_acknowledged();
            }
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                debug!(session_present = ack.session_present, "Reconnected to broker");
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!("Sent DISCONNECT, stopping event loop");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "MQTT event loop error, retrying");
                sleep(EVENT_LOOP_ERROR_BACKOFF).await;
            }
        }
    }
}
