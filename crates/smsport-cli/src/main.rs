#![deny(unsafe_code)]

//! smsport CLI — converts messaging backups between WP and Android formats.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use smsport_config::AppConfig;
use smsport_core::{
    AssemblerOptions, BackupAssembler, ConversionReport, Element, RunStamp,
    convert_mixed_to_android, convert_to_android, convert_to_wp,
};

/// smsport — convert SMS/MMS backups between WP and Android schemas.
#[derive(Debug, Parser)]
#[command(name = "smsport", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "smsport.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert WP backups into an Android `smses` document.
    ToAndroid {
        /// WP document with SMS messages. Without --mms, messages carrying
        /// attachments in this file are converted as MMS.
        #[arg(long)]
        sms: PathBuf,

        /// WP document with MMS messages.
        #[arg(long)]
        mms: Option<PathBuf>,

        /// Output file (default: <output.dir>/<prefix>-<timestamp>.xml).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the conversion summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Convert the SMS of an Android backup into a WP document.
    ToWp {
        /// Android `smses` document.
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (default: <output.dir>/<prefix>-<timestamp>.msg).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the conversion summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config).await?;

    let filter = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if !cli.config.exists() {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    match cli.command {
        Commands::ToAndroid {
            sms,
            mms,
            output,
            json,
        } => {
            let assembler = BackupAssembler::new(AssemblerOptions::from(&config));
            let (path, report) =
                cmd_to_android(&config, &assembler, &sms, mms.as_deref(), output).await?;
            print_report(&report, &path, json)?;
        }
        Commands::ToWp {
            input,
            output,
            json,
        } => {
            let (path, report) = cmd_to_wp(&config, &input, output).await?;
            print_report(&report, &path, json)?;
        }
        Commands::Config { show } => cmd_config(&config, &cli.config, show)?,
    }

    Ok(())
}

async fn cmd_to_android(
    config: &AppConfig,
    assembler: &BackupAssembler,
    sms: &Path,
    mms: Option<&Path>,
    output: Option<PathBuf>,
) -> Result<(PathBuf, ConversionReport)> {
    let sms_doc = read_document(sms).await?;
    let backup = match mms {
        Some(mms) => {
            let mms_doc = read_document(mms).await?;
            convert_to_android(&sms_doc, &mms_doc, assembler)
        }
        None => convert_mixed_to_android(&sms_doc, assembler),
    }
    .context("conversion to Android format failed")?;

    let stamp = assembler.stamp().message_stamp(assembler.options())?;
    let path = output.unwrap_or_else(|| {
        default_output_path(config, &config.output.android_file_prefix, &stamp, "xml")
    });
    let rendered = backup.to_element().to_document_string()?;
    write_document(&path, &rendered).await?;

    info!(
        path = %path.display(),
        count = backup.count(),
        "Wrote Android backup"
    );
    Ok((path, ConversionReport::from(&backup)))
}

async fn cmd_to_wp(
    config: &AppConfig,
    input: &Path,
    output: Option<PathBuf>,
) -> Result<(PathBuf, ConversionReport)> {
    let android_doc = read_document(input).await?;
    let (doc, report) = convert_to_wp(&android_doc).context("conversion to WP format failed")?;

    let options = AssemblerOptions::from(config);
    let stamp = RunStamp::now().message_stamp(&options)?;
    let path = output
        .unwrap_or_else(|| default_output_path(config, &config.output.wp_file_prefix, &stamp, "msg"));
    write_document(&path, &doc.to_document_string()?).await?;

    info!(path = %path.display(), count = report.count, "Wrote WP backup");
    Ok((path, report))
}

fn cmd_config(config: &AppConfig, config_path: &Path, show: bool) -> Result<()> {
    if show {
        let toml_str =
            toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {e}"))?;
        println!("{toml_str}");
    } else {
        println!("Configuration at '{}' is valid.", config_path.display());
    }
    Ok(())
}

fn print_report(report: &ConversionReport, path: &Path, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!(
            "Wrote {} records ({} sms, {} mms) to '{}'",
            report.count,
            report.sms,
            report.mms,
            path.display()
        );
    }
    Ok(())
}

fn default_output_path(config: &AppConfig, prefix: &str, stamp: &str, extension: &str) -> PathBuf {
    Path::new(&config.output.dir).join(format!("{prefix}-{stamp}.{extension}"))
}

async fn read_document(path: &Path) -> Result<Element> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    Element::parse_document(&content).with_context(|| format!("failed to parse '{}'", path.display()))
}

async fn write_document(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create '{}'", parent.display()))?;
    }
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("failed to write '{}'", path.display()))
}

async fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        AppConfig::load(path)
            .await
            .with_context(|| format!("invalid configuration '{}'", path.display()))
    } else {
        Ok(AppConfig::default())
    }
}
