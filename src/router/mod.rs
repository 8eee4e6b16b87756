mod layers;
mod router;
mod serve;

use std::sync::Arc;

use palaver_core::{Result, Server};
use palaver_service::Services;

/// Build the service web for this server.
pub fn start(server: &Arc<Server>) -> Result<Arc<Services>> {
	let services = Services::build(server.clone())?;

	Ok(services.start())
}

/// Serve the client API until shutdown.
pub async fn run(services: &Arc<Services>) -> Result { serve::serve(services).await }

/// Tear the service web down.
pub fn stop(services: Arc<Services>) { services.stop() }
