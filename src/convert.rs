//! Color Conversion - hex <-> OKLCH
//!
//! Inputs are validated here; the color-space math is delegated to an
//! [`OklchTransform`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

use crate::oklab::OklabTransform;

static HEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?([0-9A-Fa-f]{6}|[0-9A-Fa-f]{3})$").unwrap());

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColorError {
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),

    #[error("{name} must be {range}, got: {value}")]
    OutOfRange {
        name: &'static str,
        range: &'static str,
        value: f64,
    },

    #[error("Failed to convert {0}")]
    ConversionFailure(String),
}

impl ColorError {
    /// True for errors caught before the transform runs.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidHex(_) | Self::OutOfRange { .. })
    }
}

/// OKLCH color. `l` in [0, 1], `c` >= 0, `h` in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oklch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

impl Oklch {
    /// Display precision: L and C to 4 decimals, H to 2.
    pub fn rounded(&self) -> Self {
        Self {
            l: round_to(self.l, 4),
            c: round_to(self.c, 4),
            h: round_to(self.h, 2),
        }
    }

    /// Token-file snippet with one numeric leaf per component.
    pub fn to_token_json(&self) -> Value {
        let r = self.rounded();
        json!({
            "l": { "$type": "number", "$value": r.l },
            "c": { "$type": "number", "$value": r.c },
            "h": { "$type": "number", "$value": r.h },
        })
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Color-space transform the converter delegates to.
///
/// `None` means the transform produced no usable result.
pub trait OklchTransform {
    /// sRGB channels in [0, 1] to OKLCH.
    fn srgb_to_oklch(&self, rgb: [f64; 3]) -> Option<Oklch>;
    /// OKLCH to sRGB channels, possibly out of gamut.
    fn oklch_to_srgb(&self, color: Oklch) -> Option<[f64; 3]>;
}

/// Validating hex <-> OKLCH converter
#[derive(Debug, Clone, Default)]
pub struct ColorConverter<T = OklabTransform> {
    transform: T,
}

impl ColorConverter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: OklchTransform> ColorConverter<T> {
    pub fn with_transform(transform: T) -> Self {
        Self { transform }
    }

    /// Convert `#RGB`/`#RRGGBB` (the `#` is optional) to OKLCH.
    pub fn hex_to_oklch(&self, hex: &str) -> Result<Oklch, ColorError> {
        if !HEX_RE.is_match(hex) {
            return Err(ColorError::InvalidHex(hex.to_string()));
        }

        let rgb = parse_rgb(hex)?;
        let oklch = self
            .transform
            .srgb_to_oklch(rgb)
            .ok_or_else(|| ColorError::ConversionFailure(format!("hex {} to OKLCH", normalize_hex(hex))))?;

        let result = Oklch {
            l: oklch.l,
            c: finite_or_zero(oklch.c),
            h: finite_or_zero(oklch.h),
        };
        debug!(hex, l = result.l, c = result.c, h = result.h, "Converted hex to OKLCH");
        Ok(result)
    }

    /// Convert an OKLCH triple to an uppercase `#RRGGBB` string.
    pub fn oklch_to_hex(&self, l: f64, c: f64, h: f64) -> Result<String, ColorError> {
        if !(0.0..=1.0).contains(&l) {
            return Err(ColorError::OutOfRange {
                name: "Lightness (l)",
                range: "between 0 and 1",
                value: l,
            });
        }
        if c.is_nan() || c < 0.0 {
            return Err(ColorError::OutOfRange {
                name: "Chroma (c)",
                range: ">= 0",
                value: c,
            });
        }
        if !(0.0..=360.0).contains(&h) {
            return Err(ColorError::OutOfRange {
                name: "Hue (h)",
                range: "between 0 and 360",
                value: h,
            });
        }

        let [r, g, b] = self
            .transform
            .oklch_to_srgb(Oklch { l, c, h })
            .ok_or_else(|| ColorError::ConversionFailure(format!("OKLCH to RGB: l={l}, c={c}, h={h}")))?;

        let hex = format!("#{:02X}{:02X}{:02X}", to_u8(r), to_u8(g), to_u8(b));
        debug!(l, c, h, %hex, "Converted OKLCH to hex");
        Ok(hex)
    }
}

/// [`ColorConverter::hex_to_oklch`] with the default transform.
pub fn hex_to_oklch(hex: &str) -> Result<Oklch, ColorError> {
    ColorConverter::new().hex_to_oklch(hex)
}

/// [`ColorConverter::oklch_to_hex`] with the default transform.
pub fn oklch_to_hex(l: f64, c: f64, h: f64) -> Result<String, ColorError> {
    ColorConverter::new().oklch_to_hex(l, c, h)
}

/// Prefix `#` when missing. Case is preserved.
pub fn normalize_hex(hex: &str) -> String {
    if hex.starts_with('#') {
        hex.to_string()
    } else {
        format!("#{hex}")
    }
}

fn parse_rgb(hex: &str) -> Result<[f64; 3], ColorError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|ch| [ch, ch]).collect()
    } else {
        digits.to_string()
    };

    let mut rgb = [0.0; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        let byte = expanded
            .get(i * 2..i * 2 + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .ok_or_else(|| ColorError::InvalidHex(hex.to_string()))?;
        *channel = f64::from(byte) / 255.0;
    }
    Ok(rgb)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Gamut-clamp then round to 8 bits.
fn to_u8(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
