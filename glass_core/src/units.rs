//! # Unit Types
//!
//! Type-safe wrappers for the handful of units the configurator deals with.
//! Plain `f64` newtypes with transparent serialization, so JSON stays just
//! numbers.
//!
//! ## Conventions
//!
//! - Lengths are stored in millimetres everywhere inside the core.
//! - The user may enter values in millimetres or centimetres; [`DisplayUnit`]
//!   converts at the edge.
//! - Areas are square metres (1 m² = 1,000,000 mm²).
//!
//! ## Example
//!
//! ```rust
//! use glass_core::units::{Centimeters, Millimeters, SquareMeters};
//!
//! let width: Millimeters = Centimeters(100.0).into();
//! assert_eq!(width.0, 1000.0);
//!
//! let area = SquareMeters::from_mm(1000.0, 1900.0);
//! assert!((area.0 - 1.9).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Square millimetres per square metre
pub const MM2_PER_M2: f64 = 1_000_000.0;

// ============================================================================
// Length Units
// ============================================================================

/// Length in millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in centimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Centimeters(pub f64);

impl From<Centimeters> for Millimeters {
    fn from(cm: Centimeters) -> Self {
        Millimeters(cm.0 * 10.0)
    }
}

impl From<Millimeters> for Centimeters {
    fn from(mm: Millimeters) -> Self {
        Centimeters(mm.0 / 10.0)
    }
}

// ============================================================================
// Area Units
// ============================================================================

/// Area in square metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareMeters(pub f64);

impl SquareMeters {
    /// Area of a `width_mm × height_mm` rectangle.
    pub fn from_mm(width_mm: f64, height_mm: f64) -> Self {
        SquareMeters(width_mm * height_mm / MM2_PER_M2)
    }
}

// ============================================================================
// Display Unit
// ============================================================================

/// Unit the user types dimensions in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    #[default]
    Mm,
    Cm,
}

impl DisplayUnit {
    /// Convert a value entered in this unit to millimetres
    pub fn to_mm(self, value: f64) -> f64 {
        match self {
            DisplayUnit::Mm => value,
            DisplayUnit::Cm => Millimeters::from(Centimeters(value)).0,
        }
    }

    /// Convert millimetres to this unit for display
    pub fn from_mm(self, value_mm: f64) -> f64 {
        match self {
            DisplayUnit::Mm => value_mm,
            DisplayUnit::Cm => Centimeters::from(Millimeters(value_mm)).0,
        }
    }

    /// Parse user text in this unit into millimetres.
    ///
    /// Empty or unparseable text yields `None` (field not entered yet).
    pub fn parse_mm(self, text: &str) -> Option<f64> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| self.to_mm(v))
    }

    /// Short label
    pub fn label(self) -> &'static str {
        match self {
            DisplayUnit::Mm => "mm",
            DisplayUnit::Cm => "cm",
        }
    }
}

impl std::fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Arithmetic Implementations
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Millimeters);
impl_arithmetic!(Centimeters);
impl_arithmetic!(SquareMeters);
