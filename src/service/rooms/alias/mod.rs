use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
};

use palaver_core::{
	Err, Result, implement,
	matrix::{RoomAliasId, RoomId},
	utils,
};
use palaver_database::IdMap;
use tracing::debug;

type Clock = Box<dyn Fn() -> u64 + Send + Sync>;

/// Alias→room bindings with a two-phase reserve/claim protocol so a room
/// creation cannot race another binding of the same alias. A reservation
/// shields the alias for a bounded window; claiming converts it into a
/// binding. The clock is pluggable so expiry is testable.
pub struct Service {
	// Lock order: reservations before the binding map.
	reservations: Mutex<HashMap<RoomAliasId, u64>>,
	aliases: IdMap,
	reserve_ms: u64,
	now: Clock,
}

impl crate::Service for Service {
	fn build(args: crate::Args<'_>) -> Result<Arc<Self>> {
		Ok(Arc::new(Self {
			reservations: Mutex::new(HashMap::new()),
			aliases: IdMap::new(),
			reserve_ms: args.server.config.alias_reserve_ms,
			now: Box::new(utils::millis_since_unix_epoch),
		}))
	}

	fn name(&self) -> &str { crate::service::make_name(std::module_path!()) }
}

/// Hold the alias ahead of room creation. Fails if the alias is already
/// reserved or bound.
#[implement(Service)]
pub fn reserve(&self, alias: &RoomAliasId) -> Result {
	let mut reservations = self.reservations.lock().expect("locked");
	let now = (self.now)();
	reservations.retain(|_, expiry| *expiry > now);

	if reservations.contains_key(alias) || self.aliases.lookup(alias.as_ref()).is_some() {
		return Err!(Request(RoomInUse("room alias '{alias}' already exists")));
	}

	debug!(%alias, "reserved alias");
	reservations.insert(alias.clone(), now.saturating_add(self.reserve_ms));

	Ok(())
}

/// Convert a live reservation into a binding. An expired reservation may
/// have been taken by anyone in the meantime, so the claim fails the same
/// way a fresh binding attempt would.
#[implement(Service)]
pub fn claim(&self, alias: &RoomAliasId, room_id: &RoomId) -> Result {
	let mut reservations = self.reservations.lock().expect("locked");
	let now = (self.now)();
	let live = reservations
		.remove(alias)
		.is_some_and(|expiry| expiry > now);

	if !live || !self.aliases.insert(alias.as_ref(), room_id.as_ref()) {
		return Err!(Request(RoomInUse("room alias '{alias}' already exists")));
	}

	Ok(())
}

/// One-shot binding without a reservation window.
#[implement(Service)]
pub fn add_alias(&self, alias: &RoomAliasId, room_id: &RoomId) -> Result {
	let reservations = self.reservations.lock().expect("locked");
	let now = (self.now)();
	let reserved = reservations
		.get(alias)
		.is_some_and(|expiry| *expiry > now);

	if reserved || !self.aliases.insert(alias.as_ref(), room_id.as_ref()) {
		return Err!(Request(RoomInUse("room alias '{alias}' already exists")));
	}

	Ok(())
}

#[implement(Service)]
pub fn remove_alias(&self, alias: &RoomAliasId, room_id: &RoomId) -> Result {
	if !self.aliases.delete(alias.as_ref(), room_id.as_ref()) {
		return Err!(Request(NotFound("room alias '{alias}' doesn't exist")));
	}

	Ok(())
}

#[implement(Service)]
#[must_use]
pub fn room(&self, alias: &RoomAliasId) -> Option<RoomId> {
	self.aliases
		.lookup(alias.as_ref())
		.and_then(|id| RoomId::try_from(id).ok())
}

#[implement(Service)]
#[must_use]
pub fn aliases(&self, room_id: &RoomId) -> Vec<RoomAliasId> {
	self.aliases
		.reverse_lookup(room_id.as_ref())
		.into_iter()
		.filter_map(|id| RoomAliasId::try_from(id).ok())
		.collect()
}

#[cfg(test)]
mod tests {
	use std::{
		collections::HashMap,
		sync::{
			Arc, Mutex,
			atomic::{AtomicU64, Ordering},
		},
	};

	use palaver_core::matrix::{RoomAliasId, RoomId};
	use palaver_database::IdMap;

	use super::Service;

	fn service() -> (Service, Arc<AtomicU64>) {
		let now = Arc::new(AtomicU64::new(1_000));
		let clock = Arc::clone(&now);
		let service = Service {
			reservations: Mutex::new(HashMap::new()),
			aliases: IdMap::new(),
			reserve_ms: 10_000,
			now: Box::new(move || clock.load(Ordering::Relaxed)),
		};

		(service, now)
	}

	#[test]
	fn reserve_then_claim() {
		let (aliases, _now) = service();
		let lobby = RoomAliasId::new("lobby", "test");
		let room = RoomId::new("r1", "test");

		aliases.reserve(&lobby).unwrap();
		assert!(aliases.reserve(&lobby).is_err());
		assert!(aliases.add_alias(&lobby, &room).is_err());

		aliases.claim(&lobby, &room).unwrap();
		assert_eq!(aliases.room(&lobby), Some(room.clone()));
		assert_eq!(aliases.aliases(&room), vec![lobby.clone()]);

		// now bound, not reserved
		assert!(aliases.reserve(&lobby).is_err());
	}

	#[test]
	fn expired_reservation_cannot_be_claimed() {
		let (aliases, now) = service();
		let lobby = RoomAliasId::new("expiring", "test");
		let room = RoomId::new("r2", "test");

		aliases.reserve(&lobby).unwrap();
		now.fetch_add(20_000, Ordering::Relaxed);
		assert!(aliases.claim(&lobby, &room).is_err());

		// the alias is free again for anyone
		aliases.add_alias(&lobby, &room).unwrap();
	}

	#[test]
	fn bindings_are_exclusive_per_alias() {
		let (aliases, _now) = service();
		let name = RoomAliasId::new("unique", "test");
		let r1 = RoomId::new("r3", "test");
		let r2 = RoomId::new("r4", "test");

		aliases.add_alias(&name, &r1).unwrap();
		assert!(aliases.add_alias(&name, &r2).is_err());

		aliases.remove_alias(&name, &r1).unwrap();
		assert!(aliases.remove_alias(&name, &r1).is_err());
		aliases.add_alias(&name, &r2).unwrap();
	}
}
