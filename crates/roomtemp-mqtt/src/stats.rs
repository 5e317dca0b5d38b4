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

// src/stats.rs
// Publish statistics for outgoing telemetry.
//
// Counters are shared between the client (which records what it handed
// to the event loop) and the event loop task (which records broker
// acknowledgements), so they live behind Arc'd atomics.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// PublishStats stores a snapshot of sent message statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishStats {
    // total_published is count of messages accepted by the client
    // for delivery since startup.
    pub total_published: usize,
    // total_failed is count of messages the client refused.
    pub total_failed: usize,
    // total_acknowledged is count of PUBACKs received from the broker.
    pub total_acknowledged: usize,
    // total_bytes_published is total payload size of accepted messages.
    pub total_bytes_published: usize,
}

impl PublishStats {
    // unacknowledged is how many accepted QoS 1 messages the broker
    // has not confirmed yet.
    pub fn unacknowledged(&self) -> usize {
        self.total_published.saturating_sub(self.total_acknowledged)
    }
}

// PublishStatsTracker enables lock-free updates to publish statistics.
// Cloning shares the same counters.
#[derive(Debug, Clone, Default)]
pub struct PublishStatsTracker {
    published_count: Arc<AtomicUsize>,
    failed_count: Arc<AtomicUsize>,
    acknowledged_count: Arc<AtomicUsize>,
    published_bytes: Arc<AtomicUsize>,
}

impl PublishStatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // increment_published records a message handed to the event loop
    // (e.g. increment_published(52) for a 52-byte telemetry payload).
    pub fn increment_published(&self, bytes: usize) {
        self.published_count.fetch_add(1, Ordering::Relaxed);
        self.published_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    // increment_failed records a publish the client could not queue.
    pub fn increment_failed(&self) {
        self.failed_count.fetch_add(1, Ordering::Relaxed);
    }

    // increment_acknowledged records a PUBACK from the broker.
    pub fn increment_acknowledged(&self) {
        self.acknowledged_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn to_stats(&self) -> PublishStats {
        PublishStats {
            total_published: self.published_count.load(Ordering::Relaxed),
            total_failed: self.failed_count.load(Ordering::Relaxed),
            total_acknowledged: self.acknowledged_count.load(Ordering::Relaxed),
            total_bytes_published: self.published_bytes.load(Ordering::Relaxed),
        }
    }
}
