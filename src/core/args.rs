use std::path::PathBuf;

use clap::Parser;

/// Commandline arguments
#[derive(Clone, Debug, Default, Parser)]
#[clap(about, version)]
pub struct Args {
	/// Port to listen on. Overrides the configuration file.
	#[arg(value_name = "PORT")]
	pub port: Option<u16>,

	/// Path to the configuration file
	#[arg(long, short, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Name of this server, as it appears in identifier domains
	#[arg(long, value_name = "NAME")]
	pub server_name: Option<String>,

	/// Log level directives, tracing-subscriber syntax
	#[arg(long, value_name = "FILTER")]
	pub log: Option<String>,
}

#[must_use]
pub fn parse() -> Args { Args::parse() }
