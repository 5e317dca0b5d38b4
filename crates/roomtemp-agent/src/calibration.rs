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

//! Room temperature estimate from the Sense HAT and CPU readings.
//!
//! The HAT sits directly above the SoC, so both of its temperature
//! sensors read warm. Averaging them and subtracting a third of the CPU
//! temperature gives a usable room temperature.

/// Divisor applied to the CPU temperature before subtracting it.
pub const CPU_HEAT_FACTOR: f64 = 3.0;

#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    #[error("Calibrated temperature {0} is not a finite whole number of degrees")]
    OutOfRange(f64),
}

/// The three readings taken during one tick, in Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReadings {
    pub cpu: f64,
    pub pressure: f64,
    pub humidity: f64,
}

impl SensorReadings {
    /// `((p + h) / 2) - (c / 3)`, before truncation.
    pub fn calibrated(&self) -> f64 {
        ((self.pressure + self.humidity) / 2.0) - (self.cpu / CPU_HEAT_FACTOR)
    }

    /// The calibrated value truncated toward zero.
    pub fn room_temperature(&self) -> Result<i64, CalibrationError> {
        let calibrated = self.calibrated();
        let truncated = calibrated.trunc();
        // i64::MAX as f64 rounds up to 2^63, hence the strict bound.
        if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
            return Err(CalibrationError::OutOfRange(calibrated));
        }
        Ok(truncated as i64)
    }
}
