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

//! Sensor access: the CPU thermal zone and the ambient environment sensors.

use std::path::PathBuf;

pub mod cpu_temp;
pub mod iio;

pub use cpu_temp::{CpuTemp, read_cpu_temperature};
pub use iio::{IioEnvironment, IioTemperatureChannel};

#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The thermal zone did not contain a millidegree integer.
    #[error("Malformed millidegree reading {raw:?}")]
    MalformedReading { raw: String },

    #[error("Invalid value {raw:?} in {}", path.display())]
    InvalidAttribute { path: PathBuf, raw: String },

    #[error("No IIO device named {name:?} under {}", root.display())]
    DeviceNotFound { root: PathBuf, name: String },
}

impl SensorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// The ambient temperature sources next to the CPU.
///
/// Both estimates come from the same board but from different chips,
/// so they drift independently and are averaged by the calibration.
pub trait EnvironmentSensor: Send {
    /// Temperature in Celsius reported by the barometric pressure sensor.
    fn temperature_from_pressure(&self) -> Result<f64, SensorError>;

    /// Temperature in Celsius reported by the humidity sensor.
    fn temperature_from_humidity(&self) -> Result<f64, SensorError>;
}
