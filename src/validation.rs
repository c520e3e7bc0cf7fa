//! Token Validation - Description Hex vs Stored OKLCH
//!
//! Every color token yields exactly one outcome. Token-level problems are
//! recorded, never propagated.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::convert::{ColorConverter, Oklch, OklchTransform};
use crate::oklab::OklabTransform;
use crate::pipeline::PipelineError;
use crate::tokens::{join_path, ColorToken, ColorTokenEntry};

// `#` followed by a run of letters/digits; the whole run is one candidate.
static HEX_REF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#[0-9A-Za-z]+").unwrap());

/// Absolute tolerances for comparing stored and derived components.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Tolerance {
    #[serde(default = "default_lc_tolerance")]
    pub l: f64,
    #[serde(default = "default_lc_tolerance")]
    pub c: f64,
    #[serde(default = "default_h_tolerance")]
    pub h: f64,
    /// Measure hue difference around the circle instead of linearly.
    #[serde(default)]
    pub hue_wraparound: bool,
}

fn default_lc_tolerance() -> f64 { 0.01 }
fn default_h_tolerance() -> f64 { 2.0 }

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            l: default_lc_tolerance(),
            c: default_lc_tolerance(),
            h: default_h_tolerance(),
            hue_wraparound: false,
        }
    }
}

impl Tolerance {
    /// Load from a JSON file; omitted fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let content = fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| PipelineError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    fn hue_difference(&self, expected: f64, actual: f64) -> f64 {
        let diff = (actual - expected).abs();
        if self.hue_wraparound {
            let diff = diff.rem_euclid(360.0);
            diff.min(360.0 - diff)
        } else {
            diff
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Ok,
    /// No hex reference in the description.
    Warning,
    /// Bad hex, failed conversion, or incomplete token.
    Error,
    Mismatch,
}

impl ValidationStatus {
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Error | Self::Mismatch)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Component {
    L,
    C,
    H,
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::L => "L",
            Self::C => "C",
            Self::H => "H",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Difference {
    pub component: Component,
    pub expected: f64,
    pub actual: f64,
    pub diff: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationResult {
    pub path: String,
    pub status: ValidationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Oklch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Oklch>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub differences: Vec<Difference>,
}

impl ValidationResult {
    fn new(path: &str, status: ValidationStatus) -> Self {
        Self {
            path: path.to_string(),
            status,
            message: None,
            hex: None,
            expected: None,
            actual: None,
            differences: vec![],
        }
    }

    pub fn ok(path: &str, hex: &str) -> Self {
        Self {
            hex: Some(hex.to_string()),
            ..Self::new(path, ValidationStatus::Ok)
        }
    }

    pub fn warning(path: &str, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(path, ValidationStatus::Warning)
        }
    }

    pub fn error(path: &str, hex: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            hex: hex.map(str::to_string),
            ..Self::new(path, ValidationStatus::Error)
        }
    }

    pub fn mismatch(
        path: &str,
        hex: &str,
        expected: Oklch,
        actual: Oklch,
        differences: Vec<Difference>,
    ) -> Self {
        Self {
            hex: Some(hex.to_string()),
            expected: Some(expected),
            actual: Some(actual),
            differences,
            ..Self::new(path, ValidationStatus::Mismatch)
        }
    }
}

/// Hex reference found in a token description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexReference<'a> {
    Found(&'a str),
    Malformed(&'a str),
    Missing,
}

/// First usable hex wins. If none is usable, the first malformed one is
/// reported. Plain `#words` are not hex references.
pub fn extract_hex(description: Option<&str>) -> HexReference<'_> {
    let Some(description) = description else {
        return HexReference::Missing;
    };

    let mut malformed = None;
    for candidate in HEX_REF_RE.find_iter(description).map(|m| m.as_str()) {
        match classify_candidate(candidate) {
            HexReference::Found(hex) => return HexReference::Found(hex),
            HexReference::Malformed(hex) => {
                malformed.get_or_insert(hex);
            }
            HexReference::Missing => {}
        }
    }

    match malformed {
        Some(candidate) => HexReference::Malformed(candidate),
        None => HexReference::Missing,
    }
}

/// `#RGB` and `#RRGGBB` are used as is; `#RGBA` and `#RRGGBBAA` drop the
/// alpha digits. Other hex lengths from 3 up, and runs mixing digits with
/// non-hex letters (`#E32B2G`), are malformed. Short runs (`#1`) and plain
/// words (`#primary`) are ignored.
fn classify_candidate(candidate: &str) -> HexReference<'_> {
    let digits = &candidate[1..];

    if digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return match digits.len() {
            3 | 6 => HexReference::Found(candidate),
            4 => HexReference::Found(&candidate[..4]),
            8 => HexReference::Found(&candidate[..7]),
            0..=2 => HexReference::Missing,
            _ => HexReference::Malformed(candidate),
        };
    }

    if digits.len() >= 3 && digits.chars().any(|ch| ch.is_ascii_digit()) {
        HexReference::Malformed(candidate)
    } else {
        HexReference::Missing
    }
}

/// Validator compares each token against the color its description names
pub struct Validator<T = OklabTransform> {
    converter: ColorConverter<T>,
    tolerance: Tolerance,
}

impl Validator {
    pub fn new() -> Self {
        Self::with_converter(ColorConverter::new(), Tolerance::default())
    }
}

impl<T: OklchTransform> Validator<T> {
    pub fn with_converter(converter: ColorConverter<T>, tolerance: Tolerance) -> Self {
        Self { converter, tolerance }
    }

    pub fn with_tolerance(self, tolerance: Tolerance) -> Self {
        Self { tolerance, ..self }
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    pub fn validate_entry(&self, entry: &ColorTokenEntry<'_>) -> Vec<ValidationResult> {
        self.validate(entry.name, entry.token, &entry.parent_path)
    }

    /// Validate one token. `parent_path` is the enclosing group's path.
    pub fn validate(&self, name: &str, token: &ColorToken, parent_path: &str) -> Vec<ValidationResult> {
        let path = join_path(parent_path, name);
        let result = self.check(&path, token);
        debug!(%path, status = ?result.status, "Validated token");
        vec![result]
    }

    fn check(&self, path: &str, token: &ColorToken) -> ValidationResult {
        let hex = match extract_hex(token.description.as_deref()) {
            HexReference::Found(hex) | HexReference::Malformed(hex) => hex,
            HexReference::Missing => {
                return ValidationResult::warning(path, "No hex code found in description");
            }
        };

        let expected = match self.converter.hex_to_oklch(hex) {
            Ok(expected) => expected,
            Err(e) => {
                warn!(%path, hex, error = %e, "Hex reference not convertible");
                return ValidationResult::error(
                    path,
                    Some(hex),
                    format!("Failed to convert hex {hex} to OKLCH: {e}"),
                );
            }
        };

        let Some(actual) = token.components() else {
            warn!(%path, "Token is missing components");
            return ValidationResult::error(path, Some(hex), "Missing l, c, or h values in token");
        };

        let differences = self.compare(expected, actual);
        if differences.is_empty() {
            ValidationResult::ok(path, hex)
        } else {
            ValidationResult::mismatch(path, hex, expected, actual, differences)
        }
    }

    /// Out-of-tolerance components, in L, C, H order.
    pub fn compare(&self, expected: Oklch, actual: Oklch) -> Vec<Difference> {
        let t = &self.tolerance;
        [
            (Component::L, expected.l, actual.l, (actual.l - expected.l).abs(), t.l),
            (Component::C, expected.c, actual.c, (actual.c - expected.c).abs(), t.c),
            (Component::H, expected.h, actual.h, t.hue_difference(expected.h, actual.h), t.h),
        ]
        .into_iter()
        .filter(|&(_, _, _, diff, tolerance)| diff.is_nan() || diff > tolerance)
        .map(|(component, expected, actual, diff, _)| Difference {
            component,
            expected,
            actual,
            diff,
        })
        .collect()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::io::Write;

    fn brand_red() -> ColorToken {
        ColorToken {
            description: Some("Brand red - #E32B2B".to_string()),
            l: Some(0.5933),
            c: Some(0.2179),
            h: Some(27.07),
        }
    }

    fn validate_one(token: &ColorToken) -> ValidationResult {
        let mut results = Validator::new().validate("red", token, "color.brand");
        assert_eq!(results.len(), 1);
        results.remove(0)
    }

    #[test]
    fn test_matching_token_ok() {
        let result = validate_one(&brand_red());
        assert_eq!(result.status, ValidationStatus::Ok);
        assert_eq!(result.hex.as_deref(), Some("#E32B2B"));
        assert_eq!(result.path, "color.brand.red");
    }

    #[test]
    fn test_lightness_off_mismatch() {
        let token = ColorToken {
            l: Some(0.5933 + 0.05),
            ..brand_red()
        };
        let result = validate_one(&token);
        assert_eq!(result.status, ValidationStatus::Mismatch);
        assert_eq!(result.differences.len(), 1);

        let diff = &result.differences[0];
        assert_eq!(diff.component, Component::L);
        assert_abs_diff_eq!(diff.diff, 0.05, epsilon = 1e-3);
        assert_eq!(result.actual.unwrap().l, 0.5933 + 0.05);
    }

    #[test]
    fn test_no_description_warning() {
        let token = ColorToken {
            description: None,
            ..brand_red()
        };
        let result = validate_one(&token);
        assert_eq!(result.status, ValidationStatus::Warning);
        assert_eq!(result.message.as_deref(), Some("No hex code found in description"));
    }

    #[test]
    fn test_description_without_hex_warning() {
        let token = ColorToken {
            description: Some("Brand red".to_string()),
            ..brand_red()
        };
        assert_eq!(validate_one(&token).status, ValidationStatus::Warning);
    }

    #[test]
    fn test_missing_hue_error() {
        let token = ColorToken {
            h: None,
            ..brand_red()
        };
        let result = validate_one(&token);
        assert_eq!(result.status, ValidationStatus::Error);
        assert_eq!(result.message.as_deref(), Some("Missing l, c, or h values in token"));
    }

    #[test]
    fn test_malformed_hex_error() {
        let token = ColorToken {
            description: Some("Brand red - #E32B2".to_string()),
            ..brand_red()
        };
        let result = validate_one(&token);
        assert_eq!(result.status, ValidationStatus::Error);
        assert!(result.message.unwrap().contains("#E32B2"));
    }

    #[test]
    fn test_multiple_differences_in_order() {
        let token = ColorToken {
            l: Some(0.9),
            c: Some(0.0),
            h: Some(200.0),
            ..brand_red()
        };
        let result = validate_one(&token);
        let components: Vec<_> = result.differences.iter().map(|d| d.component).collect();
        assert_eq!(components, vec![Component::L, Component::C, Component::H]);
    }

    #[test]
    fn test_within_tolerance_boundary() {
        let validator = Validator::new();
        let expected = Oklch { l: 0.5, c: 0.1, h: 100.0 };
        let actual = Oklch { l: 0.505, c: 0.095, h: 101.5 };
        assert!(validator.compare(expected, actual).is_empty());
    }

    #[test]
    fn test_hue_wraparound_preserved_by_default() {
        let validator = Validator::new();
        let expected = Oklch { l: 0.5, c: 0.1, h: 1.0 };
        let actual = Oklch { l: 0.5, c: 0.1, h: 359.0 };
        let differences = validator.compare(expected, actual);
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].component, Component::H);
        assert_abs_diff_eq!(differences[0].diff, 358.0);
    }

    #[test]
    fn test_hue_wraparound_opt_in() {
        let validator = Validator::new().with_tolerance(Tolerance {
            hue_wraparound: true,
            ..Tolerance::default()
        });
        let expected = Oklch { l: 0.5, c: 0.1, h: 1.0 };
        let actual = Oklch { l: 0.5, c: 0.1, h: 359.0 };
        assert!(validator.compare(expected, actual).is_empty());

        let far = Oklch { h: 180.0, ..actual };
        assert_abs_diff_eq!(validator.compare(expected, far)[0].diff, 179.0);
    }

    #[test]
    fn test_extract_hex() {
        assert_eq!(extract_hex(Some("Brand red - #E32B2B")), HexReference::Found("#E32B2B"));
        assert_eq!(extract_hex(Some("White #fff")), HexReference::Found("#fff"));
        assert_eq!(extract_hex(Some("#ABC and #DEF")), HexReference::Found("#ABC"));
        assert_eq!(extract_hex(Some("Priority #1 - #E32B2B")), HexReference::Found("#E32B2B"));
        assert_eq!(extract_hex(Some("Bad #GGGGG1")), HexReference::Malformed("#GGGGG1"));
        assert_eq!(extract_hex(Some("Short #E32B2")), HexReference::Malformed("#E32B2"));
        assert_eq!(extract_hex(Some("Long #E32B2B8")), HexReference::Malformed("#E32B2B8"));
        assert_eq!(extract_hex(Some("Nothing here")), HexReference::Missing);
        assert_eq!(extract_hex(None), HexReference::Missing);
    }

    #[test]
    fn test_extract_hex_drops_alpha() {
        assert_eq!(extract_hex(Some("Overlay #E32B2B80")), HexReference::Found("#E32B2B"));
        assert_eq!(extract_hex(Some("Overlay #fffa")), HexReference::Found("#fff"));
    }

    #[test]
    fn test_extract_hex_ignores_words() {
        assert_eq!(extract_hex(Some("Use for #primary buttons")), HexReference::Missing);
        assert_eq!(extract_hex(Some("See #header, item #1")), HexReference::Missing);
        assert_eq!(extract_hex(Some("Bad #GGGGGG")), HexReference::Missing);
        assert_eq!(
            extract_hex(Some("Use for #primary buttons - #E32B2B")),
            HexReference::Found("#E32B2B")
        );
    }

    #[test]
    fn test_hashtag_description_warning() {
        let token = ColorToken {
            description: Some("Use for #primary buttons".to_string()),
            ..brand_red()
        };
        let result = validate_one(&token);
        assert_eq!(result.status, ValidationStatus::Warning);
        assert_eq!(result.message.as_deref(), Some("No hex code found in description"));
    }

    #[test]
    fn test_alpha_hex_validates_color_part() {
        let token = ColorToken {
            description: Some("Brand red overlay - #E32B2B80".to_string()),
            ..brand_red()
        };
        let result = validate_one(&token);
        assert_eq!(result.status, ValidationStatus::Ok);
        assert_eq!(result.hex.as_deref(), Some("#E32B2B"));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ValidationStatus::Mismatch).unwrap();
        assert_eq!(json, r#""mismatch""#);
    }

    #[test]
    fn test_tolerance_partial_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "h": 5.0, "hue_wraparound": true }}"#).unwrap();

        let tolerance = Tolerance::load(file.path()).unwrap();
        assert_eq!(tolerance.l, 0.01);
        assert_eq!(tolerance.c, 0.01);
        assert_eq!(tolerance.h, 5.0);
        assert!(tolerance.hue_wraparound);
    }

    #[test]
    fn test_tolerance_bad_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "h": "wide" }}"#).unwrap();
        assert!(matches!(
            Tolerance::load(file.path()),
            Err(PipelineError::Config { .. })
        ));
    }
}
