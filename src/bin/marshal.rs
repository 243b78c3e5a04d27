//! Schema Marshal CLI
//!
//! Converts between protobuf wire bytes and JSON using a descriptor set loaded
//! at runtime.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use schema_marshal::config::OutputFormat;
use schema_marshal::{BytesText, MarshalConfig, SchemaRegistry, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-marshal")]
#[command(about = "Convert protobuf messages to and from JSON using runtime schemas")]
struct Cli {
    /// Config file (defaults to schema-marshal.toml lookup)
    #[arg(short, long)]
    config: Option<String>,

    /// Serialized FileDescriptorSet; built-in types are used when omitted
    #[arg(short, long)]
    descriptor_set: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the message types known to the registry
    Types,

    /// Decode wire bytes into JSON
    Decode {
        /// Fully-qualified message type name
        #[arg(short = 't', long = "type")]
        type_name: String,
        /// Input file (stdin when omitted)
        input: Option<PathBuf>,
        /// Compact JSON output
        #[arg(long)]
        compact: bool,
    },

    /// Encode JSON into wire bytes
    Encode {
        /// Fully-qualified message type name
        #[arg(short = 't', long = "type")]
        type_name: String,
        /// Input file (stdin when omitted)
        input: Option<PathBuf>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Treat text in bytes fields as base64
        #[arg(long)]
        base64_bytes: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = MarshalConfig::load_from(cli.config.as_deref()).context("loading config")?;
    if let Some(path) = cli.descriptor_set {
        config.registry.descriptor_set = Some(path);
    }
    if let Commands::Encode { base64_bytes: true, .. } = cli.command {
        config.marshal.bytes_text = BytesText::Base64;
    }

    let registry = match &config.registry.descriptor_set {
        Some(path) => SchemaRegistry::from_file(path, config.marshal)
            .with_context(|| format!("loading descriptor set {}", path.display()))?,
        None => SchemaRegistry::open_with(None, config.marshal)?,
    };

    match cli.command {
        Commands::Types => {
            match registry.descriptor_checksum() {
                Some(checksum) => println!("# descriptor set sha256 {}", checksum),
                None => println!("# built-in types"),
            }
            for name in registry.message_names() {
                println!("{}", name);
            }
            Ok(())
        }

        Commands::Decode {
            type_name,
            input,
            compact,
        } => {
            let message_type = registry
                .resolve(&type_name)
                .ok_or_else(|| anyhow!("unknown message type {}", type_name))?;
            let bytes = read_input(input.as_deref())?;
            let record = message_type.parse(&bytes)?;
            let json = Value::Object(record).to_json();

            let rendered = if compact || config.output.format == OutputFormat::Compact {
                serde_json::to_string(&json)?
            } else {
                serde_json::to_string_pretty(&json)?
            };
            println!("{}", rendered);
            Ok(())
        }

        Commands::Encode {
            type_name,
            input,
            output,
            ..
        } => {
            let message_type = registry
                .resolve(&type_name)
                .ok_or_else(|| anyhow!("unknown message type {}", type_name))?;
            let text = read_input(input.as_deref())?;
            let json: serde_json::Value = serde_json::from_slice(&text).context("parsing JSON input")?;
            let bytes = message_type.serialize(&Value::from_json(json))?;

            match output {
                Some(path) => std::fs::write(&path, &bytes)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => std::io::stdout().write_all(&bytes)?,
            }
            Ok(())
        }
    }
}

fn read_input(path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}
