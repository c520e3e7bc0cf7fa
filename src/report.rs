//! Validation Report
//!
//! Buckets per-token outcomes, renders them for humans, and decides the
//! process exit status. Warnings never fail a run.

use serde::Serialize;
use std::fmt;

use crate::validation::{ValidationResult, ValidationStatus};

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub file: String,
    pub valid: bool,
    pub summary: Summary,
    pub results: Vec<ValidationResult>,
}

impl Report {
    pub fn from_results(file: impl Into<String>, results: Vec<ValidationResult>) -> Self {
        let count = |status: ValidationStatus| results.iter().filter(|r| r.status == status).count();
        let errors = count(ValidationStatus::Error);
        let mismatches = count(ValidationStatus::Mismatch);

        let summary = Summary {
            total: results.len(),
            passed: count(ValidationStatus::Ok),
            failed: errors + mismatches,
            warnings: count(ValidationStatus::Warning),
        };

        Self {
            file: file.into(),
            valid: summary.failed == 0,
            summary,
            results,
        }
    }

    /// Results with `status`, in document order.
    pub fn with_status(&self, status: ValidationStatus) -> Vec<&ValidationResult> {
        self.results.iter().filter(|r| r.status == status).collect()
    }

    pub fn is_success(&self) -> bool {
        self.valid
    }

    /// 0 when nothing failed, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n🔍 Validating tokens in: {}\n", self.file)?;

        let ok = self.with_status(ValidationStatus::Ok);
        if !ok.is_empty() {
            writeln!(f, "✅ {} token(s) validated successfully:\n", ok.len())?;
            for r in &ok {
                writeln!(f, "   {} - {}", r.path, r.hex.as_deref().unwrap_or("-"))?;
            }
            writeln!(f)?;
        }

        for (status, icon, label) in [
            (ValidationStatus::Warning, "⚠️ ", "warning(s)"),
            (ValidationStatus::Error, "❌", "error(s)"),
        ] {
            let bucket = self.with_status(status);
            if bucket.is_empty() {
                continue;
            }
            writeln!(f, "{icon} {} {label}:\n", bucket.len())?;
            for r in &bucket {
                writeln!(f, "   {}: {}", r.path, r.message.as_deref().unwrap_or(""))?;
            }
            writeln!(f)?;
        }

        let mismatches = self.with_status(ValidationStatus::Mismatch);
        if !mismatches.is_empty() {
            writeln!(f, "🔴 {} mismatch(es) found:\n", mismatches.len())?;
            for r in &mismatches {
                write_mismatch(f, r)?;
            }

            if let Some(hex) = mismatches[0].hex.as_deref() {
                writeln!(f, "💡 To fix, run:")?;
                writeln!(f, "   tokenlint hex-to-oklch \"{hex}\"\n")?;
            }
        }

        let s = &self.summary;
        writeln!(f, "📊 Summary:")?;
        writeln!(f, "   Total: {}", s.total)?;
        writeln!(f, "   ✅ Passed: {}", s.passed)?;
        writeln!(f, "   ❌ Failed: {}", s.failed)?;
        writeln!(f, "   ⚠️  Warnings: {}", s.warnings)
    }
}

fn write_mismatch(f: &mut fmt::Formatter<'_>, r: &ValidationResult) -> fmt::Result {
    writeln!(f, "   {}", r.path)?;
    writeln!(f, "   Hex: {}", r.hex.as_deref().unwrap_or("-"))?;
    if let (Some(e), Some(a)) = (r.expected, r.actual) {
        writeln!(f, "   Expected: l={:.4}, c={:.4}, h={:.2}", e.l, e.c, e.h)?;
        writeln!(f, "   Actual:   l={:.4}, c={:.4}, h={:.2}", a.l, a.c, a.h)?;
    }
    writeln!(f, "   Differences:")?;
    for d in &r.differences {
        writeln!(
            f,
            "     - {}: diff={:.4} (expected {:.4}, got {:.4})",
            d.component, d.diff, d.expected, d.actual
        )?;
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Oklch;
    use crate::validation::{Component, Difference};

    fn mismatch(path: &str) -> ValidationResult {
        ValidationResult::mismatch(
            path,
            "#E32B2B",
            Oklch { l: 0.5933, c: 0.2179, h: 27.07 },
            Oklch { l: 0.6433, c: 0.2179, h: 27.07 },
            vec![Difference {
                component: Component::L,
                expected: 0.5933,
                actual: 0.6433,
                diff: 0.05,
            }],
        )
    }

    fn mixed() -> Vec<ValidationResult> {
        vec![
            ValidationResult::ok("color.red", "#E32B2B"),
            ValidationResult::ok("color.blue", "#3366CC"),
            mismatch("color.accent"),
            ValidationResult::warning("color.muted", "No hex code found in description"),
            ValidationResult::ok("color.white", "#FFF"),
            mismatch("color.brand"),
        ]
    }

    #[test]
    fn test_mixed_summary_fails() {
        let report = Report::from_results("tokens.json", mixed());
        assert_eq!(
            report.summary,
            Summary { total: 6, passed: 3, failed: 2, warnings: 1 }
        );
        assert!(!report.is_success());
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let report = Report::from_results(
            "tokens.json",
            vec![
                ValidationResult::ok("a", "#000"),
                ValidationResult::warning("b", "No hex code found in description"),
            ],
        );
        assert!(report.is_success());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_errors_count_as_failed() {
        let report = Report::from_results(
            "tokens.json",
            vec![ValidationResult::error("a", None, "Missing l, c, or h values in token")],
        );
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_empty_report_succeeds() {
        let report = Report::from_results("empty.json", vec![]);
        assert_eq!(report.summary, Summary::default());
        assert!(report.is_success());
    }

    #[test]
    fn test_buckets_keep_order() {
        let report = Report::from_results("tokens.json", mixed());
        let bucket = report.with_status(ValidationStatus::Ok);
        let ok: Vec<&str> = bucket.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(ok, vec!["color.red", "color.blue", "color.white"]);
    }

    #[test]
    fn test_render_sections() {
        let text = Report::from_results("tokens.json", mixed()).render();

        assert!(text.contains("Validating tokens in: tokens.json"));
        assert!(text.contains("3 token(s) validated successfully"));
        assert!(text.contains("   color.red - #E32B2B"));
        assert!(text.contains("1 warning(s):"));
        assert!(text.contains("   color.muted: No hex code found in description"));
        assert!(!text.contains("error(s):"));
        assert!(text.contains("2 mismatch(es) found:"));
        assert!(text.contains("   Expected: l=0.5933, c=0.2179, h=27.07"));
        assert!(text.contains("   Actual:   l=0.6433, c=0.2179, h=27.07"));
        assert!(text.contains("     - L: diff=0.0500 (expected 0.5933, got 0.6433)"));
        assert!(text.contains("tokenlint hex-to-oklch \"#E32B2B\""));
        assert!(text.contains("   ❌ Failed: 2"));
    }

    #[test]
    fn test_render_deterministic() {
        let a = Report::from_results("tokens.json", mixed()).render();
        let b = Report::from_results("tokens.json", mixed()).render();
        assert_eq!(a, b);
    }

    #[test]
    fn test_json_shape() {
        let report = Report::from_results("tokens.json", mixed());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(value["summary"]["failed"], 2);
        assert_eq!(value["results"][2]["status"], "mismatch");
        assert_eq!(value["results"][2]["differences"][0]["component"], "L");
        assert!(value["results"][0].get("differences").is_none());
    }
}
