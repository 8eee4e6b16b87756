use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	time::SystemTime,
};

use tokio::{runtime, sync::broadcast};

use crate::{Config, Err, Result, implement};

/// Server runtime state; public portion
pub struct Server {
	/// Configured name of server. This is the same as the one in the config
	/// but developers can (and should) reference this string instead.
	pub name: String,

	/// Server-wide configuration instance
	pub config: Config,

	/// Timestamp server was started; used for uptime.
	pub started: SystemTime,

	/// Shutdown pending indicator; server is shutting down.
	pub stopping: AtomicBool,

	/// Handle to the runtime
	pub runtime: Option<runtime::Handle>,

	/// Shutdown signal
	pub signal: broadcast::Sender<&'static str>,
}

#[implement(Server)]
#[must_use]
pub fn new(config: Config, runtime: Option<runtime::Handle>) -> Self {
	Self {
		name: config.server_name.clone(),
		config,
		started: SystemTime::now(),
		stopping: AtomicBool::new(false),
		runtime,
		signal: broadcast::channel::<&'static str>(1).0,
	}
}

#[implement(Server)]
pub fn shutdown(&self) -> Result {
	if self.stopping.swap(true, Ordering::AcqRel) {
		return Err!("Shutdown already in progress");
	}

	self.signal("SIGTERM").inspect_err(|_| {
		self.stopping.store(false, Ordering::Release);
	})
}

#[implement(Server)]
pub fn signal(&self, sig: &'static str) -> Result {
	self.signal.send(sig).ok();
	Ok(())
}

#[implement(Server)]
#[inline]
pub async fn until_shutdown(self: &Arc<Self>) {
	while self.running() {
		self.signal.subscribe().recv().await.ok();
	}
}

#[implement(Server)]
#[inline]
#[must_use]
pub fn runtime(&self) -> &runtime::Handle {
	self.runtime
		.as_ref()
		.expect("runtime handle available in Server")
}

#[implement(Server)]
#[inline]
#[must_use]
pub fn running(&self) -> bool { !self.stopping.load(Ordering::Relaxed) }

#[implement(Server)]
#[inline]
#[must_use]
pub fn is_ours(&self, domain: &str) -> bool { domain == self.name }
