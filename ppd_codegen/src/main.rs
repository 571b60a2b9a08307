//! # PPD Codegen Binary
//!
//! Validates a firmware configuration and generates the C++ program that
//! registers its components.
//!
//! # Usage
//!
//! ```bash
//! # Generate main.cpp
//! ppd_codegen --config firmware.toml --output main.cpp
//!
//! # Also write a JSON manifest
//! ppd_codegen --config firmware.toml -o main.cpp --manifest build.json
//!
//! # Check the configuration only
//! ppd_codegen --config firmware.toml --validate-only -v
//!
//! # Show available platforms
//! ppd_codegen --list-platforms
//! ```

#![deny(warnings)]

use clap::Parser;
use ppd_codegen::{BuildManifest, CodegenCore, CodegenError, PlatformRegistry};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// PPD Codegen - firmware code generator for particulate sensors
#[derive(Parser, Debug)]
#[command(name = "ppd_codegen")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Validates a firmware configuration and generates its C++ program")]
#[command(long_about = None)]
struct Args {
    /// Path to the firmware configuration (TOML).
    #[arg(short, long, default_value = "firmware.toml")]
    config: PathBuf,

    /// Write the generated program here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write a JSON build manifest.
    #[arg(short, long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Validate the configuration without generating code.
    #[arg(long)]
    validate_only: bool,

    /// List available platforms and exit.
    #[arg(long)]
    list_platforms: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    /// Log level, overrides `-v` and `[build] log_level`.
    #[arg(long, value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("Code generation failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let registry = PlatformRegistry::with_builtin();

    if args.list_platforms {
        setup_tracing(&args, None);
        for name in registry.list_platforms() {
            println!("{name}");
        }
        return Ok(());
    }

    // The document may set the log level, so load it before tracing is up.
    let loaded = CodegenCore::load_config(&args.config);
    let config_level = loaded.as_ref().ok().map(|c| c.build.log_level.as_str());
    setup_tracing(&args, config_level);

    info!("PPD Codegen v{} starting...", env!("CARGO_PKG_VERSION"));
    let config = loaded?;
    let core = CodegenCore::new(config, registry);

    if args.validate_only {
        core.validate()?;
        info!("Configuration {:?} is valid", args.config);
        return Ok(());
    }

    let output = core.build()?;

    match &args.output {
        Some(path) => {
            output.write_files(path, args.manifest.as_deref())?;
            info!("Program written to {:?}", path);
        }
        None => {
            let manifest = args
                .manifest
                .as_ref()
                .map(|_| BuildManifest::from_output(&output).to_json())
                .transpose()?;

            let mut stdout = std::io::stdout().lock();
            stdout.write_all(output.program.as_bytes())?;
            stdout.flush()?;

            if let (Some(path), Some(json)) = (&args.manifest, manifest) {
                std::fs::write(path, json).map_err(|source| CodegenError::Output {
                    path: path.clone(),
                    source,
                })?;
            }
        }
    }
    if let Some(path) = &args.manifest {
        info!("Manifest written to {:?}", path);
    }

    info!("Code generation complete");
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the document's level.
///
/// Logs go to stderr so a program written to stdout stays clean.
fn setup_tracing(args: &Args, config_level: Option<&str>) {
    let level = match (&args.log_level, args.verbose) {
        (Some(level), _) => level.as_str(),
        (None, true) => "debug",
        (None, false) => config_level.unwrap_or("info"),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
