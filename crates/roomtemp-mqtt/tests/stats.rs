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

// tests/stats.rs
// Unit tests for publish statistics tracking.

use std::thread;

use roomtemp_mqtt::stats::{PublishStats, PublishStatsTracker};

#[test]
fn test_publish_stats_tracker_creation() {
    let tracker = PublishStatsTracker::new();
    assert_eq!(tracker.to_stats(), PublishStats::default());
}

#[test]
fn test_publish_stats_counts_published_and_failed() {
    let tracker = PublishStatsTracker::new();

    tracker.increment_published(52);
    tracker.increment_published(53);
    tracker.increment_failed();

    let stats = tracker.to_stats();
    assert_eq!(stats.total_published, 2);
    assert_eq!(stats.total_bytes_published, 105);
    assert_eq!(stats.total_failed, 1);
    assert_eq!(stats.total_acknowledged, 0);
    assert_eq!(stats.unacknowledged(), 2);
}

#[test]
fn test_publish_stats_acknowledgements() {
    let tracker = PublishStatsTracker::new();

    tracker.increment_published(10);
    tracker.increment_published(10);
    tracker.increment_acknowledged();

    assert_eq!(tracker.to_stats().unacknowledged(), 1);

    // A duplicate PUBACK after a reconnect must not underflow.
    tracker.increment_acknowledged();
    tracker.increment_acknowledged();
    assert_eq!(tracker.to_stats().unacknowledged(), 0);
}

#[test]
fn test_publish_stats_clones_share_counters() {
    let tracker = PublishStatsTracker::new();
    let event_loop_side = tracker.clone();

    let handle = thread::spawn(move || {
        for _ in 0..100 {
            event_loop_side.increment_acknowledged();
        }
    });
    for _ in 0..100 {
        tracker.increment_published(1);
    }
    handle.join().unwrap();

    let stats = tracker.to_stats();
    assert_eq!(stats.total_published, 100);
    assert_eq!(stats.total_acknowledged, 100);
    assert_eq!(stats.total_bytes_published, 100);
}
