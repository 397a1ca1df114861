//! tierconf demo
//!
//! Resolves a sample service configuration from `--config`, the environment
//! and the command line, then prints the result.

use anyhow::Result;
use clap::{Args, CommandFactory, FromArgMatches, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tierconf::initializer::default_initializer;
use tierconf::{cli, settings};
use tracing::debug;

/// Output format for the resolved configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Print a service configuration resolved from file, environment and flags
#[derive(Parser, Debug)]
#[command(name = "tierconf", author, version, about, long_about = None)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    output: OutputFormat,

    #[command(flatten)]
    #[allow(dead_code)]
    overrides: FlagOverrides,
}

/// Flags registered for the flag layer of `ServiceConfig`.
///
/// `ClapFlags` reads them from the matches by name; the parsed values here
/// are never used.
#[derive(Args, Debug)]
#[allow(dead_code)]
struct FlagOverrides {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080")]
    listen: String,

    /// Database host (overrides config and environment)
    #[arg(long)]
    db_host: Option<String>,

    /// Database port (overrides config and environment)
    #[arg(long)]
    db_port: Option<u16>,
}

settings! {
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct Database {
        host: String => { env: "HOST", env_default: "localhost", flag: "db-host" },
        port: u16 => { env: "PORT", env_default: "5432", flag: "db-port" },
        user: String => { env: "USER", env_default: "postgres" },
        password: String => { env: "PASSWORD" },
    }
}

settings! {
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct ServiceConfig {
        name: String => { env: "SERVICE_NAME,NAME", env_default: "tierconf" },
        listen: String => { env: "LISTEN", flag: "listen" },
        verbosity: String => { env: "VERBOSITY", flag: "verbosity" },
        allowed_origins: Vec<String> => { env: "ALLOWED_ORIGINS" },
        labels: BTreeMap<String, String> => { env: "LABELS", env_separator: ";" },
        database: Database => nested { env_prefix: "DB_" },
        replica: Database => nested { env_prefix: "READONLY_DB_" },
    }
}

fn main() -> Result<()> {
    let command = cli::with_standard_args(Cli::command());
    let matches = command.clone().get_matches();
    let args = Cli::from_arg_matches(&matches)?;

    let mut cfg = ServiceConfig::default();
    default_initializer(&mut cfg, &command, &matches, "tierconf")?;
    debug!(name = %cfg.name, "configuration resolved");

    let rendered = match args.output {
        OutputFormat::Yaml => serde_yaml::to_string(&cfg)?,
        OutputFormat::Json => serde_json::to_string_pretty(&cfg)? + "\n",
    };
    print!("{rendered}");

    Ok(())
}
