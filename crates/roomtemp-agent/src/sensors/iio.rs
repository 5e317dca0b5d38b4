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

//! Ambient temperature from Industrial I/O (IIO) devices in sysfs.
//!
//! The Sense HAT's LPS25H (pressure) and HTS221 (humidity) chips each
//! carry a temperature channel. The kernel exposes them as
//! `/sys/bus/iio/devices/iio:deviceN/in_temp_{raw,offset,scale}`, where
//! the processed value is `(raw + offset) * scale` millidegrees Celsius.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::sensors::{EnvironmentSensor, SensorError};

pub const DEFAULT_IIO_ROOT: &str = "/sys/bus/iio/devices";
pub const DEFAULT_PRESSURE_DEVICE: &str = "lps25h";
pub const DEFAULT_HUMIDITY_DEVICE: &str = "hts221";

const TEMP_RAW: &str = "in_temp_raw";
const TEMP_OFFSET: &str = "in_temp_offset";
const TEMP_SCALE: &str = "in_temp_scale";

#[derive(Debug, Clone)]
pub struct IioTemperatureChannel {
    device_dir: PathBuf,
    name: String,
}

impl IioTemperatureChannel {
    pub fn new(device_dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            device_dir: device_dir.into(),
            name: name.into(),
        }
    }

    /// Finds the device under `root` whose `name` attribute is `name`.
    pub fn find(root: &Path, name: &str) -> Result<Self, SensorError> {
        let entries = fs::read_dir(root).map_err(|e| SensorError::io(root, e))?;
        for entry in entries {
            let device_dir = entry.map_err(|e| SensorError::io(root, e))?.path();
            // Triggers and buffers live here too and have no name.
            let Ok(device_name) = fs::read_to_string(device_dir.join("name")) else {
                continue;
            };
            if device_name.trim_end() == name {
                tracing::debug!(device = name, path = %device_dir.display(), "Found IIO device");
                return Ok(Self::new(device_dir, name));
            }
        }
        Err(SensorError::DeviceNotFound {
            root: root.to_path_buf(),
            name: name.to_string(),
        })
    }

    pub fn read_celsius(&self) -> Result<f64, SensorError> {
        let raw = self
            .read_attribute(TEMP_RAW)?
            .ok_or_else(|| self.missing(TEMP_RAW))?;
        let offset = self.read_attribute(TEMP_OFFSET)?.unwrap_or(0.0);
        let scale = self.read_attribute(TEMP_SCALE)?.unwrap_or(1.0);
        Ok((raw + offset) * scale / 1000.0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device_dir(&self) -> &Path {
        &self.device_dir
    }

    // Absent attributes are None; offset and scale are optional.
    fn read_attribute(&self, attribute: &str) -> Result<Option<f64>, SensorError> {
        let path = self.device_dir.join(attribute);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SensorError::io(path, e)),
        };
        let value = contents.trim();
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| SensorError::InvalidAttribute {
                path,
                raw: value.to_string(),
            })
    }

    fn missing(&self, attribute: &str) -> SensorError {
        SensorError::io(
            self.device_dir.join(attribute),
            std::io::Error::from(ErrorKind::NotFound),
        )
    }
}

/// The Sense HAT environment sensors as seen through IIO.
#[derive(Debug, Clone)]
pub struct IioEnvironment {
    pressure: IioTemperatureChannel,
    humidity: IioTemperatureChannel,
}

impl IioEnvironment {
    pub fn new(pressure: IioTemperatureChannel, humidity: IioTemperatureChannel) -> Self {
        Self { pressure, humidity }
    }

    pub fn discover(
        root: &Path,
        pressure_device: &str,
        humidity_device: &str,
    ) -> Result<Self, SensorError> {
        Ok(Self::new(
            IioTemperatureChannel::find(root, pressure_device)?,
            IioTemperatureChannel::find(root, humidity_device)?,
        ))
    }
}

impl EnvironmentSensor for IioEnvironment {
    fn temperature_from_pressure(&self) -> Result<f64, SensorError> {
        self.pressure.read_celsius()
    }

    fn temperature_from_humidity(&self) -> Result<f64, SensorError> {
        self.humidity.read_celsius()
    }
}
