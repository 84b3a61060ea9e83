//! SigPlace command line
//!
//! Applies an annotation plan to a PDF without a browser.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sigplace_cli::{info, parse_date, sign, SignRequest};
use sigplace_core::DOWNLOAD_NAME;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "sigplace")]
#[command(version, about = "Place signatures on PDF documents")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw the annotations of a JSON plan into a copy of a PDF
    Sign {
        #[arg(short, long)]
        input: PathBuf,

        /// JSON array of annotations
        #[arg(short, long)]
        plan: PathBuf,

        #[arg(short, long, default_value = DOWNLOAD_NAME)]
        output: PathBuf,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Date stamped under drawn signatures (MM/DD/YYYY), defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Print page count and page sizes as JSON
    Info {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.command {
        Command::Sign {
            input,
            plan,
            output,
            config,
            date,
        } => {
            let summary = sign(&SignRequest {
                input,
                plan,
                output,
                config,
                date,
            })?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Info { input } => {
            let document = info(&input)?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }

    Ok(())
}
