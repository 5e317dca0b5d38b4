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

//! The telemetry message published every tick.

use std::io;

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};

/// `DD-MM-YYYY HH:MM:SS`, local time.
pub const DATE_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Serializes to `{"temperature": 8, "date": "16-10-2026 09:41:00"}`.
///
/// Consumers of the topic match on this exact layout, including the
/// spaces after `:` and `,`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryMessage {
    pub temperature: i64,
    pub date: String,
}

impl TelemetryMessage {
    pub fn new(temperature: i64, at: DateTime<Local>) -> Self {
        Self {
            temperature,
            date: at.format(DATE_FORMAT).to_string(),
        }
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut payload = Vec::with_capacity(64);
        let mut serializer = Serializer::with_formatter(&mut payload, SpacedFormatter);
        self.serialize(&mut serializer)?;
        Ok(payload)
    }
}

/// Compact JSON with a space after every separator.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}
