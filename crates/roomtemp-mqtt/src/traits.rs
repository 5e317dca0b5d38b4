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

// src/traits.rs
// The publishing seam between the telemetry loop and the MQTT client.
use async_trait::async_trait;
use rumqttc::QoS;

use crate::errors::MqttClientError;

// MqttPublisher is what the telemetry loop needs from a transport:
// hand off one payload, and tear the connection down once.
// Implemented by MqttClient, and by mocks in tests.
#[async_trait]
pub trait MqttPublisher: Send + Sync {
    // publish hands a payload to the transport for delivery to
    // topic with the given QoS.
    async fn publish(&self, topic: &str, payload: Vec<u8>, qos: QoS)
    -> Result<(), MqttClientError>;

    // disconnect performs a graceful teardown of the session.
    async fn disconnect(&mut self) -> Result<(), MqttClientError>;
}
