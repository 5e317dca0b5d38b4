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

// src/lib.rs
// Main exports for the roomtemp MQTT publishing client.

pub mod client;
pub mod errors;
pub mod options;
pub mod stats;
pub mod traits;

// Export some things for convenience.
pub use client::MqttClient;
pub use errors::MqttClientError;
pub use options::{ClientOptions, ClientTlsConfig, ClientTlsIdentity};
pub use rumqttc::QoS;
pub use stats::{PublishStats, PublishStatsTracker};
pub use traits::MqttPublisher;
