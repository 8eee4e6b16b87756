use std::sync::Arc;

use palaver_core::{Result, Server, UserId, implement};

pub struct Service {
	server: Arc<Server>,
}

impl crate::Service for Service {
	fn build(args: crate::Args<'_>) -> Result<Arc<Self>> {
		Ok(Arc::new(Self { server: args.server.clone() }))
	}

	fn name(&self) -> &str { crate::service::make_name(std::module_path!()) }
}

#[implement(Service)]
#[inline]
#[must_use]
pub fn server_name(&self) -> &str { &self.server.name }

#[implement(Service)]
#[inline]
#[must_use]
pub fn server_is_ours(&self, domain: &str) -> bool { self.server.is_ours(domain) }

/// checks if `user_id` is local to us via domain comparison
#[implement(Service)]
#[inline]
#[must_use]
pub fn user_is_local(&self, user_id: &UserId) -> bool {
	self.server.is_ours(user_id.domain().as_str())
}
