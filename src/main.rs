use std::path::Path;
use std::str::FromStr;
use std::{fs, process};

use clap::Parser;
use log::{LevelFilter, error, info};

use dbmlgen::config::{self, Config, ConfigError};
use dbmlgen::{CompileError, WriteError};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input schema file
    input: String,

    /// Output path for the generated data model [default: models.py]
    #[arg(short, long)]
    models: Option<String>,

    /// Output path for the generated ER document [default: schema.md]
    #[arg(short, long)]
    diagram: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", args.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    if let Err(err) = run(&args) {
        error!("{err}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => config::load(Path::new(path))?,
        None => Config::default(),
    };
    let models_path = args
        .models
        .clone()
        .or(config.output.models)
        .unwrap_or_else(|| "models.py".to_string());
    let diagram_path = args
        .diagram
        .clone()
        .or(config.output.diagram)
        .unwrap_or_else(|| "schema.md".to_string());

    info!("compiling {}", args.input);
    let source = fs::read_to_string(&args.input).map_err(|source| CliError::Read {
        path: args.input.clone(),
        source,
    })?;
    let artifacts = dbmlgen::compile(&source)?;
    dbmlgen::write_artifacts(&artifacts, Path::new(&models_path), Path::new(&diagram_path))?;

    info!("wrote {models_path} and {diagram_path}");
    Ok(())
}
