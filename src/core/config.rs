use std::net::{IpAddr, Ipv4Addr};

use figment::{
	Figment,
	providers::{Env, Format, Toml},
};
use serde::Deserialize;

use crate::{Args, Err, Result};

/// Server-wide configuration. Loaded from an optional TOML file, overridden
/// by `PALAVER_*` environment variables, overridden by commandline
/// arguments.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	#[serde(default = "default_address")]
	pub address: IpAddr,

	#[serde(default = "default_port")]
	pub port: u16,

	/// The domain of every identifier this server mints.
	#[serde(default = "default_server_name")]
	pub server_name: String,

	#[serde(default = "default_log")]
	pub log: String,

	/// Default and maximum item counts for range queries.
	#[serde(default = "default_event_limit")]
	pub event_limit_default: u64,

	#[serde(default = "max_event_limit")]
	pub event_limit_max: u64,

	/// Long-poll timeout bounds, milliseconds.
	#[serde(default = "default_timeout")]
	pub timeout_default_ms: u64,

	#[serde(default = "min_timeout")]
	pub timeout_min_ms: u64,

	#[serde(default = "max_timeout")]
	pub timeout_max_ms: u64,

	/// How long an alias reservation shields a pending room creation.
	#[serde(default = "default_alias_reserve")]
	pub alias_reserve_ms: u64,
}

impl Config {
	pub fn load(args: &Args) -> Result<Self> {
		let mut figment = Figment::new();
		if let Some(path) = &args.config {
			figment = figment.merge(Toml::file(path));
		}

		let mut config: Self = figment.merge(Env::prefixed("PALAVER_")).extract()?;

		if let Some(port) = args.port {
			config.port = port;
		}

		if let Some(server_name) = &args.server_name {
			config.server_name.clone_from(server_name);
		}

		if let Some(log) = &args.log {
			config.log.clone_from(log);
		}

		config.check()?;

		Ok(config)
	}

	pub fn check(&self) -> Result {
		if self.server_name.is_empty() || self.server_name.contains(':') {
			return Err!(Config(
				"server_name",
				"'{}' is not a valid identifier domain",
				self.server_name
			));
		}

		if self.timeout_min_ms > self.timeout_max_ms {
			return Err!(Config(
				"timeout_min_ms",
				"lower timeout bound {} exceeds the upper bound {}",
				self.timeout_min_ms,
				self.timeout_max_ms
			));
		}

		Ok(())
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			address: default_address(),
			port: default_port(),
			server_name: default_server_name(),
			log: default_log(),
			event_limit_default: default_event_limit(),
			event_limit_max: max_event_limit(),
			timeout_default_ms: default_timeout(),
			timeout_min_ms: min_timeout(),
			timeout_max_ms: max_timeout(),
			alias_reserve_ms: default_alias_reserve(),
		}
	}
}

fn default_address() -> IpAddr { IpAddr::V4(Ipv4Addr::UNSPECIFIED) }

fn default_port() -> u16 { 4080 }

fn default_server_name() -> String { "localhost".to_owned() }

fn default_log() -> String { "info".to_owned() }

fn default_event_limit() -> u64 { 10 }

fn max_event_limit() -> u64 { 100 }

fn default_timeout() -> u64 { 5_000 }

fn min_timeout() -> u64 { 100 }

fn max_timeout() -> u64 { 60_000 }

fn default_alias_reserve() -> u64 { 10_000 }
