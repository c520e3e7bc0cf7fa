//! TokenLint CLI
//!
//! Commands: validate, hex-to-oklch, oklch-to-hex
//! Human-readable output by default, `--json` for machines.
//! Returns non-zero on validation failure or bad input.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use tokenlint_core::{
    hex_to_oklch, oklch_to_hex,
    convert::normalize_hex,
    Tolerance, ValidationPipeline, Validator,
};

#[derive(Parser)]
#[command(name = "tokenlint")]
#[command(version, about = "TokenLint - OKLCH color token validator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate color tokens against the hex codes in their descriptions
    Validate {
        /// Token file (JSON)
        file: PathBuf,

        /// Tolerance config (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a hex color to OKLCH
    HexToOklch {
        /// Hex color, e.g. "#E32B2B" or E32B2B
        hex: String,

        /// Print the conversion as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert an OKLCH color to hex
    OklchToHex {
        /// Lightness, 0 to 1
        #[arg(allow_negative_numbers = true)]
        l: f64,
        /// Chroma, >= 0
        #[arg(allow_negative_numbers = true)]
        c: f64,
        /// Hue in degrees, 0 to 360
        #[arg(allow_negative_numbers = true)]
        h: f64,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
            if let Err(io_err) = e.print() {
                eprintln!("❌ Error: {io_err}");
                return ExitCode::FAILURE;
            }
            return code;
        }
    };

    init_logging(cli.verbose);

    match cli.command {
        Commands::Validate { file, config, json } => validate(&file, config.as_deref(), json),
        Commands::HexToOklch { hex, json } => convert_hex(&hex, json),
        Commands::OklchToHex { l, c, h } => convert_oklch(l, c, h),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn validate(file: &Path, config: Option<&Path>, json: bool) -> ExitCode {
    let tolerance = match config {
        Some(path) => match Tolerance::load(path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("❌ Error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Tolerance::default(),
    };

    let pipeline = ValidationPipeline::with_validator(Validator::new().with_tolerance(tolerance));

    let report = match pipeline.validate_file(file) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("❌ Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("❌ Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{report}");
    }

    ExitCode::from(report.exit_code())
}

fn convert_hex(hex: &str, json: bool) -> ExitCode {
    let oklch = match hex_to_oklch(hex) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("❌ Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let hex = normalize_hex(hex);
    let rounded = oklch.rounded();
    let snippet = oklch.to_token_json();

    if json {
        let output = serde_json::json!({
            "hex": hex,
            "oklch": rounded,
            "json": snippet,
        });
        println!("{output:#}");
        return ExitCode::SUCCESS;
    }

    println!("\n📐 Hex to OKLCH Conversion\n");
    println!("Hex:     {hex}");
    println!("OKLCH:   l: {}, c: {}, h: {}", rounded.l, rounded.c, rounded.h);
    println!("\n📋 JSON Format (for token files):\n");
    println!("{snippet:#}");
    println!();
    ExitCode::SUCCESS
}

fn convert_oklch(l: f64, c: f64, h: f64) -> ExitCode {
    match oklch_to_hex(l, c, h) {
        Ok(hex) => {
            println!("\n📐 OKLCH to Hex Conversion\n");
            println!("OKLCH:   l: {l}, c: {c}, h: {h}");
            println!("Hex:     {hex}");
            println!();
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {e}");
            ExitCode::FAILURE
        }
    }
}
