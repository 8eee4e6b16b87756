use std::{
	ops::Deref,
	sync::{Arc, OnceLock},
};

use crate::Services;

/// Late-bound handle to the full service web. Every service holds one of
/// these; it is set exactly once after all services have been built,
/// breaking the construction cycle between them.
#[derive(Default)]
pub(crate) struct OnceServices {
	lock: OnceLock<Arc<Services>>,
}

impl OnceServices {
	pub(super) fn set(&self, services: Arc<Services>) -> Arc<Services> {
		self.lock.get_or_init(move || services).clone()
	}

	#[inline]
	pub(crate) fn get(&self) -> &Arc<Services> {
		self.lock
			.get()
			.expect("services must be initialized")
	}
}

impl Deref for OnceServices {
	type Target = Arc<Services>;

	#[inline]
	fn deref(&self) -> &Self::Target { self.get() }
}
