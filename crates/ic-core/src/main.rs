//! ic-core: curate raw record batches and inspect curated artifacts.

use clap::{Args, Parser, Subcommand};
use ic_common::{record_schema, Error, OutputFormat, Result};
use ic_config::{resolve_config, ConfigOverrides, LogFormat};
use ic_core::exit_codes::ExitCode;
use ic_core::{logging, Notification, Pipeline, QualityInspector, Services};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ic-core", version, about = "Ingest Curator pipeline")]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root directory of the local object store
    #[arg(long, global = true)]
    storage_root: Option<PathBuf>,

    /// Bucket receiving curated artifacts
    #[arg(long, global = true)]
    curated_bucket: Option<String>,

    /// Output encoding: json, csv_gzip or parquet
    #[arg(long, global = true)]
    format: Option<OutputFormat>,

    /// Alert topic; quality alerts are only published when set
    #[arg(long, global = true)]
    alert_topic: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output: text or json
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate, enrich, partition and store the notified artifacts
    Ingest(TargetArgs),
    /// Compute quality metrics over curated artifacts
    Inspect(TargetArgs),
    /// Print the record JSON Schema
    Schema,
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Notification event file, or `-` for stdin
    #[arg(long, conflicts_with_all = ["bucket", "key"], required_unless_present = "bucket")]
    event: Option<String>,

    /// Bucket of a single artifact
    #[arg(long, requires = "key")]
    bucket: Option<String>,

    /// Key of a single artifact
    #[arg(long, requires = "bucket")]
    key: Option<String>,
}

impl TargetArgs {
    fn notification(&self) -> Result<Notification> {
        if let (Some(bucket), Some(key)) = (&self.bucket, &self.key) {
            return Ok(Notification::single(bucket.clone(), key.clone()));
        }

        let bytes = match self.event.as_deref() {
            Some("-") => {
                let mut buf = Vec::new();
                std::io::stdin().read_to_end(&mut buf)?;
                buf
            }
            Some(path) => std::fs::read(path)?,
            None => {
                return Err(Error::Config(
                    "either --event or --bucket/--key is required".to_string(),
                ))
            }
        };
        Notification::from_json(&bytes)
    }
}

impl GlobalOpts {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            curated_bucket: self.curated_bucket.clone(),
            output_format: self.format,
            alert_topic: self.alert_topic.clone(),
            storage_root: self.storage_root.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format,
        }
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::Clean.into(),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e).into()
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let target = match &cli.command {
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&record_schema())?);
            return Ok(());
        }
        Command::Ingest(target) | Command::Inspect(target) => target,
    };

    let config = resolve_config(&cli.global.overrides())?;
    logging::init(&config.log_level, config.log_format)?;

    let services = Services::from_config(&config);
    let event = target.notification()?;

    let result = match &cli.command {
        Command::Ingest(_) => Pipeline::from_config(&services, &config).handle(&event)?,
        Command::Inspect(_) => QualityInspector::from_config(&services, &config).handle(&event)?,
        Command::Schema => return Ok(()),
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
