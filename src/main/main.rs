use std::sync::Arc;

use palaver_core::{Config, Result, Server, args};
use tracing::debug;

fn main() -> Result {
	let args = args::parse();
	let config = Config::load(&args)?;

	let runtime = tokio::runtime::Builder::new_multi_thread()
		.enable_all()
		.thread_name("palaver:worker")
		.build()?;

	palaver::logging::init(&config)?;

	let server = Arc::new(Server::new(config, Some(runtime.handle().clone())));
	runtime.block_on(palaver::exec(&server))?;

	debug!("Exit");

	Ok(())
}
