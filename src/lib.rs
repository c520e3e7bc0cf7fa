//! TokenLint Core - OKLCH Color Token Validation
//!
//! Color tokens store an OKLCH triple next to a description that names the
//! hex code they were derived from. This crate re-derives the triple from
//! that hex and reports tokens that drifted.
//!
//! Pipeline: token file -> [`TokenDocument`] -> [`Validator`] (via
//! [`ColorConverter`]) -> [`Report`].

pub mod convert;
pub mod oklab;
pub mod tokens;
pub mod validation;
pub mod report;
pub mod pipeline;

pub use convert::{hex_to_oklch, oklch_to_hex, ColorConverter, ColorError, Oklch, OklchTransform};
pub use oklab::OklabTransform;
pub use tokens::{find_color_tokens, ColorToken, ColorTokenEntry, TokenDocument, TokenNode};
pub use validation::{Tolerance, ValidationResult, ValidationStatus, Validator};
pub use report::{Report, Summary};
pub use pipeline::{validate_token_file, PipelineError, ValidationPipeline};
