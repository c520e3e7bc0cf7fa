//! Validation Pipeline - Single Entry Point
//!
//! file -> document -> results -> report. File-level failures abort the
//! run before any token is looked at; token-level problems are recorded
//! in the report.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::convert::OklchTransform;
use crate::oklab::OklabTransform;
use crate::report::Report;
use crate::tokens::TokenDocument;
use crate::validation::{ValidationResult, Validator};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse token file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The validation pipeline
pub struct ValidationPipeline<T = OklabTransform> {
    validator: Validator<T>,
}

impl ValidationPipeline {
    pub fn new() -> Self {
        Self {
            validator: Validator::new(),
        }
    }
}

impl<T: OklchTransform> ValidationPipeline<T> {
    pub fn with_validator(validator: Validator<T>) -> Self {
        Self { validator }
    }

    /// Validate every color token in document order.
    pub fn validate_document(&self, document: &TokenDocument) -> Vec<ValidationResult> {
        document
            .color_tokens()
            .iter()
            .flat_map(|entry| self.validator.validate_entry(entry))
            .collect()
    }

    /// Load, validate and summarize one token file.
    pub fn validate_file(&self, path: &Path) -> Result<Report, PipelineError> {
        let document = TokenDocument::load(path)?;
        let results = self.validate_document(&document);
        let report = Report::from_results(path.display().to_string(), results);

        let summary = report.summary;
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            warnings = summary.warnings,
            "Validated token file"
        );
        Ok(report)
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// [`ValidationPipeline::validate_file`] with default tolerances.
pub fn validate_token_file(path: &Path) -> Result<Report, PipelineError> {
    ValidationPipeline::new().validate_file(path)
}
