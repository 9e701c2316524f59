//! bridged: the metrics bridge daemon.
//!
//! Loads the bridge configuration, wires the exporter to the HTTP
//! exposition server and instruments its own scrapes.
//!
//! # Usage
//!
//! ```text
//! bridged serve --config bridge.toml --namespace kafka.server
//! bridged check-config --config bridge.toml
//! ```

use std::path::PathBuf;

use bridge_core::BridgeConfig;
use clap::{Parser, Subcommand, ValueEnum};

mod serve;

#[derive(Parser)]
#[command(name = "bridged", about = "Metrics bridge daemon", version)]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(clap::Args)]
struct ConfigArgs {
    /// TOML config file with a [reporter] section.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to expose metrics on (overrides the config file).
    #[arg(long, env = "BRIDGE_PORT")]
    port: Option<u16>,

    /// Comma-separated allowlist patterns (overrides the config file).
    #[arg(long, env = "BRIDGE_ALLOWLIST")]
    allowlist: Option<String>,
}

impl ConfigArgs {
    fn load(&self) -> anyhow::Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::from_file(path)?,
            None => BridgeConfig::default(),
        };
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(allowlist) = &self.allowlist {
            config = config.with_allowlist(allowlist);
        }
        config.compile_allowlist()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Serve bridged metrics until interrupted.
    Serve {
        #[command(flatten)]
        config: ConfigArgs,

        /// Namespace prefix for tagged metric names.
        #[arg(long, default_value = "bridged")]
        namespace: String,
    },
    /// Validate configuration and print the effective values.
    CheckConfig {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,bridged=debug,bridge=debug"))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    match cli.command {
        Command::Serve { config, namespace } => serve::run(config.load()?, namespace).await,
        Command::CheckConfig { config } => {
            let config = config.load()?;
            println!("port      = {}", config.port);
            println!("allowlist = {}", config.allowlist.join(","));
            Ok(())
        }
    }
}
