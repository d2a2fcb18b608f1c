// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion settings, with defaults and environment overrides.

use std::str::FromStr;

/// Settings shared by the mappings and the kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionSettings {
    /// Base linear precision. Welding starts at ten times this value.
    pub precision: f64,
    /// Number of welding passes before a shell is given up.
    pub max_weld_attempts: usize,
    /// Scale applied to raw coordinates by the mappings.
    pub length_unit: f64,
    /// Points used to approximate a full ellipse.
    pub ellipse_segments: usize,
    /// Points used to approximate a quarter fillet arc.
    pub fillet_segments: usize,
    /// Convert loose loops (curves) instead of body geometry.
    pub include_curves: bool,
    /// Split self-intersecting wires into simple cycles.
    pub check_wire_intersections: bool,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            precision: 1e-5,
            max_weld_attempts: 3,
            length_unit: 1.0,
            ellipse_segments: 32,
            fillet_segments: 4,
            include_curves: false,
            check_wire_intersections: true,
        }
    }
}

impl ConversionSettings {
    /// Load settings from `SHELLWELD_*` environment variables.
    ///
    /// Missing or unparsable variables keep their default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            precision: env_or("SHELLWELD_PRECISION", defaults.precision),
            max_weld_attempts: env_or("SHELLWELD_MAX_WELD_ATTEMPTS", defaults.max_weld_attempts)
                .max(1),
            length_unit: env_or("SHELLWELD_LENGTH_UNIT", defaults.length_unit),
            ellipse_segments: env_or("SHELLWELD_ELLIPSE_SEGMENTS", defaults.ellipse_segments),
            fillet_segments: env_or("SHELLWELD_FILLET_SEGMENTS", defaults.fillet_segments),
            include_curves: env_or("SHELLWELD_INCLUDE_CURVES", defaults.include_curves),
            check_wire_intersections: env_or(
                "SHELLWELD_CHECK_WIRE_INTERSECTIONS",
                defaults.check_wire_intersections,
            ),
        }
    }

    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_length_unit(mut self, length_unit: f64) -> Self {
        self.length_unit = length_unit;
        self
    }

    pub fn with_include_curves(mut self, include_curves: bool) -> Self {
        self.include_curves = include_curves;
        self
    }
}

pub(crate) fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
