use palaver_core::{Config, Result, err};
use tracing_subscriber::EnvFilter;

pub fn init(config: &Config) -> Result {
	let filter = EnvFilter::builder()
		.parse(&config.log)
		.map_err(|e| err!(Config("log", "{e}.")))?;

	let subscriber = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.finish();

	tracing::subscriber::set_global_default(subscriber)
		.map_err(|e| err!("failed to install logging subscriber: {e}"))?;

	Ok(())
}
