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

//! The compute-unit temperature, read from a Linux thermal zone.
//!
//! Thermal zones report an integer number of millidegrees Celsius
//! (e.g. `44123` for 44.123°C).

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::sensors::SensorError;

pub const DEFAULT_THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Number of trailing characters that hold the fractional part.
const FRACTION_DIGITS: usize = 3;

/// An open thermal zone file. The handle is closed when this is dropped.
#[derive(Debug)]
pub struct CpuTemp {
    path: PathBuf,
    file: File,
}

impl CpuTemp {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SensorError> {
        let path = path.into();
        let file = File::open(&path).map_err(|e| SensorError::io(&path, e))?;
        Ok(Self { path, file })
    }

    /// Rewinds and returns the current contents without trailing whitespace.
    pub fn read_raw(&mut self) -> Result<String, SensorError> {
        let mut raw = String::new();
        self.file
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.file.read_to_string(&mut raw))
            .map_err(|e| SensorError::io(&self.path, e))?;
        raw.truncate(raw.trim_end().len());
        Ok(raw)
    }

    pub fn get_temperature(&mut self) -> Result<f64, SensorError> {
        self.get_temperature_in_c()
    }

    pub fn get_temperature_in_c(&mut self) -> Result<f64, SensorError> {
        parse_millidegrees(&self.read_raw()?)
    }

    pub fn get_temperature_in_f(&mut self) -> Result<f64, SensorError> {
        self.get_temperature_in_c().map(celsius_to_fahrenheit)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Opens the thermal zone, reads it once and closes it again.
pub fn read_cpu_temperature(path: &Path) -> Result<f64, SensorError> {
    CpuTemp::open(path)?.get_temperature_in_c()
}

/// Turns `"44123"` into `44.123` by placing a decimal point before the
/// last three characters, so `"-500"` reads as `-0.5`. Text shorter
/// than four characters, or anything but digits after an optional
/// leading minus, is rejected.
pub fn parse_millidegrees(raw: &str) -> Result<f64, SensorError> {
    let malformed = || SensorError::MalformedReading {
        raw: raw.to_string(),
    };

    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if raw.len() <= FRACTION_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let (whole, fraction) = raw.split_at(raw.len() - FRACTION_DIGITS);
    let whole = match whole {
        "-" => "-0",
        whole => whole,
    };
    format!("{whole}.{fraction}")
        .parse::<f64>()
        .map_err(|_| malformed())
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn thermal_zone(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_millidegrees() {
        assert_eq!(parse_millidegrees("44123").unwrap(), 44.123);
        assert_eq!(parse_millidegrees("40000").unwrap(), 40.0);
        assert_eq!(parse_millidegrees("1000").unwrap(), 1.0);
        assert_eq!(parse_millidegrees("0999").unwrap(), 0.999);
        assert_eq!(parse_millidegrees("-5250").unwrap(), -5.25);
    }

    #[test]
    fn test_parse_millidegrees_short_negative() {
        assert_eq!(parse_millidegrees("-500").unwrap(), -0.5);
        assert_eq!(parse_millidegrees("-123").unwrap(), -0.123);
        assert_eq!(parse_millidegrees("-0000").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_millidegrees_rejects_malformed() {
        let malformed = [
            "", "ab", "123", "-12", "-", "--123", "-1a3", "44a23", "44.123", "4 123", "+4123",
            "inf0",
        ];
        for raw in malformed {
            match parse_millidegrees(raw) {
                Err(SensorError::MalformedReading { raw: reported }) => assert_eq!(reported, raw),
                other => panic!("{raw:?} should be malformed, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_celsius_to_fahrenheit() {
        assert!((celsius_to_fahrenheit(44.123) - 111.4214).abs() < 1e-9);
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
    }

    #[test]
    fn test_cpu_temp_reads_and_strips_newline() {
        let zone = thermal_zone("44123\n");
        let mut cpu_temp = CpuTemp::open(zone.path()).unwrap();

        assert_eq!(cpu_temp.read_raw().unwrap(), "44123");
        assert_eq!(cpu_temp.get_temperature().unwrap(), 44.123);
        assert!((cpu_temp.get_temperature_in_f().unwrap() - 111.4214).abs() < 1e-9);
    }

    #[test]
    fn test_cpu_temp_rewinds_between_reads() {
        let zone = thermal_zone("44123\n");
        let mut cpu_temp = CpuTemp::open(zone.path()).unwrap();
        assert_eq!(cpu_temp.get_temperature_in_c().unwrap(), 44.123);

        // sysfs regenerates the contents; every read starts from offset 0.
        std::fs::write(zone.path(), "51000\n").unwrap();
        assert_eq!(cpu_temp.get_temperature_in_c().unwrap(), 51.0);
    }

    #[test]
    fn test_cpu_temp_malformed_contents_fail() {
        let zone = thermal_zone("ab\n");
        let err = read_cpu_temperature(zone.path()).unwrap_err();
        assert!(matches!(err, SensorError::MalformedReading { .. }));
    }

    #[test]
    fn test_open_missing_zone_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("thermal_zone9").join("temp");

        match CpuTemp::open(&missing) {
            Err(SensorError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("Should be Io error, got {other:?}"),
        }
    }
}
