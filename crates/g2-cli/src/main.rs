// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use g2_cli::commands::{self, SchemaKind};
use g2_cli::format::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "g2error", version, about = "Senzing G2 error classification CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,

    /// Engine settings file (TOML); `SENZING_*` variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every error category.
    Categories {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show how a native error code is classified.
    Explain {
        /// Native error code.
        #[arg(allow_negative_numbers = true)]
        code: i64,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Dump the code-to-category table.
    Table {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Classify a raw exception message, e.g. `0037E|Unknown resolved entity`.
    Classify {
        /// Exception text as returned by the engine.
        raw: String,

        /// Use this code instead of the one parsed from the text.
        #[arg(long, allow_negative_numbers = true)]
        code: Option<i64>,

        /// Print the error as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate an engine settings file.
    CheckConfig {
        /// Path to the TOML file.
        path: PathBuf,
    },

    /// Print a JSON schema.
    Schema {
        #[arg(value_enum)]
        kind: SchemaArg,
    },
}

#[derive(Debug, Clone, ValueEnum)]
enum SchemaArg {
    Config,
    Error,
}

impl From<SchemaArg> for SchemaKind {
    fn from(v: SchemaArg) -> Self {
        match v {
            SchemaArg::Config => SchemaKind::Config,
            SchemaArg::Error => SchemaKind::Error,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = g2_config::load_config(cli.config.as_deref()).context("load settings")?;
    let filter = EnvFilter::new(commands::log_directive(&config, cli.debug));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let out = match cli.command {
        Commands::Categories { json } => commands::categories(OutputFormat::from_json_flag(json))?,
        Commands::Explain { code, json } => {
            commands::explain(code, OutputFormat::from_json_flag(json))?
        }
        Commands::Table { json } => commands::table(OutputFormat::from_json_flag(json))?,
        Commands::Classify { raw, code, json } => {
            commands::classify(&raw, code, OutputFormat::from_json_flag(json))?
        }
        Commands::CheckConfig { path } => commands::check_config(&path)?,
        Commands::Schema { kind } => commands::schema_json(kind.into())?,
    };
    println!("{out}");
    Ok(())
}
