pub mod logging;

use std::sync::Arc;

use palaver_core::{Result, Server};
use tracing::{debug, error};

/// Start, run and stop the server within the asynchronous runtime.
pub async fn exec(server: &Arc<Server>) -> Result {
	let services = palaver_router::start(server)?;

	let handle = server.clone();
	tokio::spawn(async move {
		tokio::signal::ctrl_c().await.ok();
		handle.shutdown().ok();
	});

	if let Err(error) = palaver_router::run(&services).await {
		error!("Critical error running server: {error}");
		return Err(error);
	}

	palaver_router::stop(services);
	debug!("Exit runtime");

	Ok(())
}
