//! Unity export sidecar tool.
//!
//! Writes the `metadata.json` sidecar for a geometry export run from a
//! YAML export description, and validates or summarises existing sidecars.

mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use config::load_export_config;
use sidecar_common::SidecarError;
use sidecar_metadata::{find_sidecars, read_sidecar, validate_document, write_sidecar_as};

/// Exit status when a validated sidecar has errors.
const EXIT_INVALID_DOCUMENT: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "unity-sidecar")]
#[command(about = "Metadata sidecars for Unity isosurface and vector field exports")]
#[command(version)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log output format
    #[arg(long, default_value = "pretty", value_parser = ["pretty", "json"], global = true)]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build and write a sidecar from an export description
    Generate {
        /// Export description (YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Directory to write the sidecar to (overrides output_dir)
        #[arg(short, long, env = "SIDECAR_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Validate sidecar files, or every sidecar under directories
    Validate {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,
    },

    /// Print a summary of a sidecar
    Show {
        file: PathBuf,

        /// Print the document as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Print the grid described by an export description
    GridInfo {
        /// Export description (YAML)
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    if let Err(e) = init_tracing(&args.log_level, &args.log_format) {
        eprintln!("Failed to initialise logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(args.command) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<SidecarError>()
                .map(|s| s.exit_code())
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}

fn init_tracing(log_level: &str, log_format: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr; stdout carries command output
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if log_format == "json" {
        tracing::subscriber::set_global_default(builder.with_thread_ids(true).json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Generate { config, output_dir } => generate(&config, output_dir.as_deref()),
        Command::Validate { paths, strict } => validate(&paths, strict),
        Command::Show { file, json } => show(&file, json),
        Command::GridInfo { config } => grid_info(&config),
    }
}

fn generate(config_path: &Path, output_dir: Option<&Path>) -> Result<ExitCode> {
    let config = load_export_config(config_path)?;
    info!(
        config = %config_path.display(),
        isosurfaces = config.isosurfaces.len(),
        vector_fields = config.vector_fields.len(),
        "Loaded export description"
    );

    let doc = config.to_builder()?.build()?;
    let dir = config.output_dir(output_dir);
    let path = write_sidecar_as(&dir, &config.file_name, &doc)
        .with_context(|| format!("Failed to write sidecar to {}", dir.display()))?;

    println!("{}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn validate(paths: &[PathBuf], strict: bool) -> Result<ExitCode> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = find_sidecars(path)?;
            if found.is_empty() {
                println!("{}: no sidecars found", path.display());
            }
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }

    let mut failed = 0usize;
    for file in &files {
        let doc = match read_sidecar(file) {
            Ok(doc) => doc,
            Err(e) => {
                println!("{}: error: {}", file.display(), e);
                failed += 1;
                continue;
            }
        };

        let report = validate_document(&doc);
        if report.issues.is_empty() {
            println!("{}: ok", file.display());
        }
        for issue in &report.issues {
            println!("{}: {}", file.display(), issue);
        }
        if !report.is_valid() || (strict && report.warning_count() > 0) {
            failed += 1;
        }
    }

    info!(checked = files.len(), failed, "Validation finished");
    println!("{} checked, {} failed", files.len(), failed);

    if failed > 0 {
        Ok(ExitCode::from(EXIT_INVALID_DOCUMENT))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn show(file: &Path, json: bool) -> Result<ExitCode> {
    let doc = read_sidecar(file)?;

    if json {
        println!("{}", doc.to_json_pretty()?);
        return Ok(ExitCode::SUCCESS);
    }

    print!("{}", doc);
    let report = validate_document(&doc);
    println!();
    println!(
        "Validation: {} error(s), {} warning(s)",
        report.error_count(),
        report.warning_count()
    );
    Ok(ExitCode::SUCCESS)
}

fn grid_info(config_path: &Path) -> Result<ExitCode> {
    let config = load_export_config(config_path)?;
    let grid = config.radar_grid();
    grid.validate()?;

    let (nz, ny, nx) = grid.shape();
    println!("{}", grid);
    println!();
    println!("Grid points (z, y, x):  {} x {} x {} = {}", nz, ny, nx, grid.len());
    if config.grid.extent.is_some() {
        println!("Note: an explicit extent overrides this grid in the sidecar");
    }
    Ok(ExitCode::SUCCESS)
}
