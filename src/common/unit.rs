//! Unit conversion utilities.
//!
//! Office Open XML measures drawings in EMUs (English Metric Units) and page
//! geometry in twips. Rule widths are written by people, so [`Length`] parses
//! the usual human units ("4.5in", "6cm", "120pt") into EMUs.

use crate::common::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_CM: i64 = 360_000;
pub const EMUS_PER_MM: i64 = 36_000;
pub const EMUS_PER_PT: i64 = 12_700;
pub const EMUS_PER_TWIP: i64 = 635;

#[inline]
pub fn twip_to_emu_i64(twips: i64) -> i64 {
    twips.saturating_mul(EMUS_PER_TWIP)
}

#[inline]
pub fn emu_to_twip_i64(emu: i64) -> i64 {
    (emu as f64 / EMUS_PER_TWIP as f64).round() as i64
}

/// Supported length units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    /// Inch
    Inch,
    /// Centimeter
    Centimeter,
    /// Millimeter
    Millimeter,
    /// Point (1/72 inch)
    Point,
    /// English Metric Unit
    Emu,
}

impl LengthUnit {
    /// Get the unit abbreviation
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inch => "in",
            Self::Centimeter => "cm",
            Self::Millimeter => "mm",
            Self::Point => "pt",
            Self::Emu => "emu",
        }
    }

    /// Number of EMUs in one unit.
    #[inline]
    pub fn emus_per_unit(&self) -> i64 {
        match self {
            Self::Inch => EMUS_PER_INCH,
            Self::Centimeter => EMUS_PER_CM,
            Self::Millimeter => EMUS_PER_MM,
            Self::Point => EMUS_PER_PT,
            Self::Emu => 1,
        }
    }

    fn from_str_internal(s: &str) -> Option<Self> {
        match s {
            "in" | "inch" | "inches" | "\"" => Some(Self::Inch),
            "cm" => Some(Self::Centimeter),
            "mm" => Some(Self::Millimeter),
            "pt" => Some(Self::Point),
            "emu" | "" => Some(Self::Emu),
            _ => None,
        }
    }
}

impl FromStr for LengthUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_internal(&s.to_ascii_lowercase())
            .ok_or_else(|| Error::Config(format!("Unknown length unit '{}'", s)))
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Length measurement stored in EMUs.
///
/// ```
/// use docfill::common::Length;
///
/// let width = "4.5in".parse::<Length>().unwrap();
/// assert_eq!(width, Length::from_inches(4.5));
/// assert_eq!(width.emus(), 4_114_800);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "LengthRepr")]
pub struct Length {
    emus: i64,
}

impl Length {
    #[inline]
    pub const fn from_emus(emus: i64) -> Self {
        Self { emus }
    }

    #[inline]
    pub fn from_inches(inches: f64) -> Self {
        Self::from_unit(inches, LengthUnit::Inch)
    }

    #[inline]
    pub fn from_cm(cm: f64) -> Self {
        Self::from_unit(cm, LengthUnit::Centimeter)
    }

    #[inline]
    pub fn from_mm(mm: f64) -> Self {
        Self::from_unit(mm, LengthUnit::Millimeter)
    }

    #[inline]
    pub fn from_pt(pt: f64) -> Self {
        Self::from_unit(pt, LengthUnit::Point)
    }

    #[inline]
    pub fn from_unit(value: f64, unit: LengthUnit) -> Self {
        Self {
            emus: (value * unit.emus_per_unit() as f64).round() as i64,
        }
    }

    /// Get the value in EMUs.
    #[inline]
    pub const fn emus(&self) -> i64 {
        self.emus
    }

    /// Convert to inches.
    #[inline]
    pub fn inches(&self) -> f64 {
        self.emus as f64 / EMUS_PER_INCH as f64
    }

    /// Convert to twips (1/20 point), the unit of page and table geometry.
    #[inline]
    pub fn twips(&self) -> i64 {
        emu_to_twip_i64(self.emus)
    }
}

impl FromStr for Length {
    type Err = Error;

    /// Parse a length such as "4.5in", "6 cm", "120pt" or a bare EMU count.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(split);

        if number.is_empty() {
            return Err(Error::Config(format!("No numeric value found in '{}'", s)));
        }

        let value: f64 = number
            .parse()
            .map_err(|_| Error::Config(format!("Failed to parse numeric value from '{}'", s)))?;
        let unit = LengthUnit::from_str(unit.trim())?;

        Ok(Self::from_unit(value, unit))
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}in", self.inches())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LengthRepr {
    Emus(i64),
    Text(String),
}

impl TryFrom<LengthRepr> for Length {
    type Error = Error;

    fn try_from(repr: LengthRepr) -> Result<Self> {
        match repr {
            LengthRepr::Emus(emus) => Ok(Length::from_emus(emus)),
            LengthRepr::Text(text) => text.parse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_length() {
        assert_eq!("4.5in".parse::<Length>().unwrap().emus(), 4_114_800);
        assert_eq!("2.54cm".parse::<Length>().unwrap().emus(), 914_400);
        assert_eq!("10 mm".parse::<Length>().unwrap(), Length::from_cm(1.0));
        assert_eq!("72pt".parse::<Length>().unwrap(), Length::from_inches(1.0));
        assert_eq!("914400".parse::<Length>().unwrap(), Length::from_inches(1.0));
        assert_eq!("1IN".parse::<Length>().unwrap(), Length::from_inches(1.0));
    }

    #[test]
    fn test_parse_errors() {
        assert!("in".parse::<Length>().is_err());
        assert!("3furlongs".parse::<Length>().is_err());
        assert!("1.2.3cm".parse::<Length>().is_err());
    }

    #[test]
    fn test_twips() {
        assert_eq!(Length::from_inches(1.0).twips(), 1440);
        assert_eq!(twip_to_emu_i64(1440), EMUS_PER_INCH);
    }
}
