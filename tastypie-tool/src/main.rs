//! Command-line front end for the tastypie adapter.

mod config;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tastypie_core::{RequestKind, SerializeOptions, Snapshot, WireObject};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::load_config;
use crate::error::TpieError;
use crate::output::{OutputFormat, read_input, render};

#[derive(Parser)]
#[command(name = "tpie")]
#[command(about = "Translate between tastypie payloads and flat records", long_about = None)]
struct Cli {
    /// Path to the schema/adapter config (default: ./tastypie.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a response payload into records
    Normalize {
        /// Entity type of the payload
        #[arg(long)]
        entity: String,

        /// Treat the payload as an `objects`/`meta` envelope
        #[arg(long)]
        collection: bool,

        /// Input file (default: stdin)
        input: Option<PathBuf>,
    },

    /// Normalize a response the way a given request would extract it
    Extract {
        /// Entity type of the payload
        #[arg(long)]
        entity: String,

        /// Request kind: find, findAll, findMany, findQuery, createRecord,
        /// updateRecord or deleteRecord
        #[arg(long, default_value = "find")]
        kind: String,

        /// Input file (default: stdin)
        input: Option<PathBuf>,
    },

    /// Serialize a record snapshot into a request body
    Serialize {
        /// Emit the record's own primary key
        #[arg(long)]
        include_id: bool,

        /// Input file (default: stdin)
        input: Option<PathBuf>,
    },

    /// Print the request URL for an entity
    Url {
        /// Entity type
        #[arg(long)]
        entity: String,

        /// Record id; repeat for a multi-fetch URL
        #[arg(long = "id")]
        ids: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("tastypie=info".parse()?))
        .init();

    let cli = Cli::parse();
    let rendered = run(cli)?;
    print!("{}", rendered);
    Ok(())
}

fn run(cli: Cli) -> Result<String, TpieError> {
    let config = load_config(cli.config.as_deref())?;
    let serializer = config.serializer()?;

    match cli.command {
        Command::Normalize {
            entity,
            collection,
            input,
        } => {
            let payload = into_object(read_input(input.as_deref())?)?;
            if collection {
                render(&serializer.normalize_collection(&entity, payload)?, cli.format)
            } else {
                render(&serializer.normalize(&entity, payload)?, cli.format)
            }
        }
        Command::Extract { entity, kind, input } => {
            let kind = parse_kind(&kind)?;
            let payload = read_input(input.as_deref())?;
            render(&serializer.extraction(kind, &entity, payload)?, cli.format)
        }
        Command::Serialize { include_id, input } => {
            let snapshot: Snapshot = serde_json::from_value(read_input(input.as_deref())?)?;
            let options = SerializeOptions { include_id };
            render(&serializer.serialize(&snapshot, options)?, cli.format)
        }
        Command::Url { entity, ids } => {
            let url = match ids.as_slice() {
                [] => serializer.build_url(&entity, None),
                [id] => serializer.build_url(&entity, Some(id.as_str())),
                many => serializer.build_many_url(&entity, many),
            };
            debug!(%url, "built url");
            Ok(format!("{}\n", url))
        }
    }
}

fn into_object(value: Value) -> Result<WireObject, TpieError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(TpieError::NotAnObject),
    }
}

fn parse_kind(kind: &str) -> Result<RequestKind, TpieError> {
    serde_json::from_value(Value::String(kind.to_string()))
        .map_err(|_| TpieError::UnknownRequestKind(kind.to_string()))
}
