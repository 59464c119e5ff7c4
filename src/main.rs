//! `petstore` binary: loads configuration, installs logging, and runs the HTTP service.

// std
use std::path::PathBuf;
// crates.io
use clap::Parser;
// self
use petstore::{config::AppConfig, obs, server};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
	/// YAML configuration file. Defaults to `config.yaml` in `.` or `./config` when present.
	#[arg(long, short, value_name = "PATH")]
	config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let cli = Cli::parse();
	let config = AppConfig::load(cli.config.as_deref())?;

	obs::init_subscriber(&config.logging)?;

	tracing::info!(?config, "configuration loaded");

	server::run(config).await?;

	Ok(())
}
