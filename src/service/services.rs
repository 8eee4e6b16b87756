use std::sync::Arc;

use palaver_core::{Result, Server, implement};
use tracing::{debug, info, trace};

pub(crate) use crate::OnceServices;
use crate::{
	globals, membership, presence, rooms,
	service::{Args, Service},
	sync, tokens, users,
};

/// The assembled service web. Stores own their data; services reach each
/// other through [`OnceServices`] only. Components acquiring locks across
/// services must respect the declared order: alias maps, then room store,
/// then a room's state, then the membership relation, then the stream mux.
pub struct Services {
	pub globals: Arc<globals::Service>,
	pub users: Arc<users::Service>,
	pub tokens: Arc<tokens::Service>,
	pub presence: Arc<presence::Service>,
	pub membership: Arc<membership::Service>,
	pub alias: Arc<rooms::alias::Service>,
	pub create: Arc<rooms::create::Service>,
	pub state: Arc<rooms::state::Service>,
	pub state_cache: Arc<rooms::state_cache::Service>,
	pub timeline: Arc<rooms::timeline::Service>,
	pub typing: Arc<rooms::typing::Service>,
	pub sync: Arc<sync::Service>,

	pub server: Arc<Server>,
}

#[implement(Services)]
pub fn build(server: Arc<Server>) -> Result<Arc<Self>> {
	let services = Arc::new(OnceServices::default());
	macro_rules! build {
		($tyname:ty) => {
			<$tyname>::build(Args { server: &server, services: &services })?
		};
	}

	let res = Arc::new(Self {
		globals: build!(globals::Service),
		users: build!(users::Service),
		tokens: build!(tokens::Service),
		presence: build!(presence::Service),
		membership: build!(membership::Service),
		alias: build!(rooms::alias::Service),
		create: build!(rooms::create::Service),
		state: build!(rooms::state::Service),
		state_cache: build!(rooms::state_cache::Service),
		timeline: build!(rooms::timeline::Service),
		typing: build!(rooms::typing::Service),
		sync: build!(sync::Service),

		server,
	});

	Ok(services.set(res))
}

#[implement(Services)]
pub fn start(self: &Arc<Self>) -> Arc<Self> {
	debug!("Starting services...");
	for service in self.services() {
		trace!("Starting {}", service.name());
	}

	info!("Services startup complete.");

	Arc::clone(self)
}

#[implement(Services)]
pub fn stop(&self) { info!("Shutting down services..."); }

#[implement(Services)]
pub(crate) fn services(&self) -> impl Iterator<Item = Arc<dyn Service>> + Send {
	macro_rules! cast {
		($s:expr) => {{
			let service: Arc<dyn Service> = $s.clone();
			service
		}};
	}

	[
		cast!(self.globals),
		cast!(self.users),
		cast!(self.tokens),
		cast!(self.presence),
		cast!(self.membership),
		cast!(self.alias),
		cast!(self.create),
		cast!(self.state),
		cast!(self.state_cache),
		cast!(self.timeline),
		cast!(self.typing),
		cast!(self.sync),
	]
	.into_iter()
}
