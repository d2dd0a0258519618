//! Real-world units and pixel calibration.
//!
//! Geometry is always stored in world pixels. A single document-wide
//! calibration factor maps one pixel to a length in the base unit
//! (centimetres); the active unit only relabels that length for display
//! and export.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display units, each with a fixed factor relative to the base unit (cm).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Mm,
    #[default]
    Cm,
    M,
    In,
}

impl Unit {
    /// All supported units, in menu order.
    pub const ALL: [Unit; 4] = [Unit::Mm, Unit::Cm, Unit::M, Unit::In];

    /// How many of this unit make up one centimetre.
    pub fn factor(self) -> f64 {
        match self {
            Unit::Mm => 10.0,
            Unit::Cm => 1.0,
            Unit::M => 0.01,
            Unit::In => 0.393701,
        }
    }

    /// Short suffix used in labels ("mm", "cm", ...).
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::M => "m",
            Unit::In => "in",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Error returned when parsing an unknown unit name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown unit: {0}")]
pub struct ParseUnitError(pub String);

impl FromStr for Unit {
    type Err = ParseUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" => Ok(Unit::Mm),
            "cm" => Ok(Unit::Cm),
            "m" => Ok(Unit::M),
            "in" => Ok(Unit::In),
            other => Err(ParseUnitError(other.to_string())),
        }
    }
}

/// Document-wide calibration state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Base units (cm) per world pixel. `None` until calibrated.
    pub base_per_pixel: Option<f64>,
    /// Unit used for display and export.
    pub active_unit: Unit,
}

impl Calibration {
    /// Create an uncalibrated state displaying in centimetres.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calibrated state directly from a factor.
    pub fn with_factor(base_per_pixel: f64, active_unit: Unit) -> Self {
        Self {
            base_per_pixel: Some(base_per_pixel),
            active_unit,
        }
    }

    /// Whether a calibration factor has been set.
    pub fn is_calibrated(&self) -> bool {
        self.base_per_pixel.is_some()
    }

    /// Calibrate against a reference of known length.
    ///
    /// `reference_length` is expressed in `unit`; `pixel_distance` is the
    /// measured length of the same reference in world pixels. Returns
    /// `false` and leaves the state untouched when either value is unusable.
    pub fn calibrate(&mut self, reference_length: f64, pixel_distance: f64, unit: Unit) -> bool {
        if !reference_length.is_finite() || reference_length <= 0.0 {
            log::warn!("Ignoring calibration with invalid reference length {reference_length}");
            return false;
        }
        if !pixel_distance.is_finite() || pixel_distance <= 0.0 {
            log::warn!("Ignoring calibration against degenerate pixel distance {pixel_distance}");
            return false;
        }

        let factor = (reference_length / unit.factor()) / pixel_distance;
        self.base_per_pixel = Some(factor);
        log::info!("Calibrated: 1px = {factor} cm (reference {reference_length}{unit})");
        true
    }

    /// Calibrate from user-entered text. Empty or non-numeric input is a no-op.
    pub fn calibrate_str(&mut self, reference_length: &str, pixel_distance: f64, unit: Unit) -> bool {
        match reference_length.trim().parse::<f64>() {
            Ok(value) => self.calibrate(value, pixel_distance, unit),
            Err(_) => {
                log::warn!("Ignoring non-numeric calibration value {reference_length:?}");
                false
            }
        }
    }

    /// Remove the calibration factor.
    pub fn clear(&mut self) {
        self.base_per_pixel = None;
    }

    /// Change the display unit. Stored geometry is never rescaled.
    pub fn set_active_unit(&mut self, unit: Unit) {
        self.active_unit = unit;
    }

    /// Convert a pixel distance to a length in the active unit.
    ///
    /// Returns `0.0` when uncalibrated; check [`Self::is_calibrated`] before
    /// treating the result as a measurement.
    pub fn to_display_length(&self, pixel_distance: f64) -> f64 {
        match self.base_per_pixel {
            Some(factor) => pixel_distance * factor * self.active_unit.factor(),
            None => 0.0,
        }
    }

    /// Convert a length in the active unit to world pixels.
    ///
    /// Uncalibrated documents fall back to one unit per pixel.
    pub fn to_pixel_length(&self, length: f64) -> f64 {
        match self.base_per_pixel {
            Some(factor) => length / (factor * self.active_unit.factor()),
            None => length,
        }
    }

    /// Format a pixel distance as a label such as `"250.00cm"`.
    pub fn format_length(&self, pixel_distance: f64) -> Option<String> {
        self.is_calibrated().then(|| {
            format!(
                "{:.2}{}",
                self.to_display_length(pixel_distance),
                self.active_unit.suffix()
            )
        })
    }
}
