use std::{net::SocketAddr, sync::Arc};

use palaver_core::Result;
use palaver_service::Services;
use tokio::net::TcpListener;
use tracing::info;

use crate::router;

pub(crate) async fn serve(services: &Arc<Services>) -> Result {
	let server = &services.server;
	let addr = SocketAddr::new(server.config.address, server.config.port);
	let app = router::build(services);

	let listener = TcpListener::bind(addr).await?;
	info!("Listening on {addr}");

	let handle = server.clone();
	axum::serve(listener, app)
		.with_graceful_shutdown(async move { handle.until_shutdown().await })
		.await?;

	Ok(())
}
