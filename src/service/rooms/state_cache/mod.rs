use std::{collections::HashSet, sync::Arc};

use palaver_core::{Result, err, implement, matrix::{RoomId, UserId}};
use palaver_database::IdMultiMap;

/// The room↔user membership relation, kept in lockstep with the `join`
/// membership state events written through the authorization engine.
pub struct Service {
	members: IdMultiMap,
}

impl crate::Service for Service {
	fn build(_: crate::Args<'_>) -> Result<Arc<Self>> {
		Ok(Arc::new(Self { members: IdMultiMap::new() }))
	}

	fn name(&self) -> &str { crate::service::make_name(std::module_path!()) }
}

#[implement(Service)]
pub fn add_member(&self, room_id: &RoomId, user_id: &UserId) -> Result {
	if !self.members.put(room_id.as_ref(), user_id.as_ref()) {
		return Err(err!("user {user_id} is already a member of the room {room_id}"));
	}

	Ok(())
}

#[implement(Service)]
pub fn remove_member(&self, room_id: &RoomId, user_id: &UserId) -> Result {
	if !self.members.delete(room_id.as_ref(), user_id.as_ref()) {
		return Err(err!("user {user_id} is not a member of the room {room_id}"));
	}

	Ok(())
}

#[implement(Service)]
#[must_use]
pub fn is_member(&self, room_id: &RoomId, user_id: &UserId) -> bool {
	self.members.contains(room_id.as_ref(), user_id.as_ref())
}

#[implement(Service)]
#[must_use]
pub fn users(&self, room_id: &RoomId) -> Vec<UserId> {
	self.members
		.lookup(room_id.as_ref())
		.into_iter()
		.filter_map(|id| UserId::try_from(id).ok())
		.collect()
}

#[implement(Service)]
#[must_use]
pub fn rooms(&self, user_id: &UserId) -> Vec<RoomId> {
	self.members
		.reverse_lookup(user_id.as_ref())
		.into_iter()
		.filter_map(|id| RoomId::try_from(id).ok())
		.collect()
}

#[implement(Service)]
#[must_use]
pub fn room_set(&self, user_id: &UserId) -> HashSet<RoomId> {
	self.rooms(user_id).into_iter().collect()
}

/// All users sharing at least one room with the user, including the user
/// itself.
#[implement(Service)]
#[must_use]
pub fn peers(&self, user_id: &UserId) -> HashSet<UserId> {
	let mut peers: HashSet<UserId> = self
		.members
		.union_link_reverse_lookup(user_id.as_ref())
		.into_iter()
		.filter_map(|id| UserId::try_from(id).ok())
		.collect();

	peers.insert(user_id.clone());

	peers
}

#[cfg(test)]
mod tests {
	use palaver_core::matrix::{RoomId, UserId};
	use palaver_database::IdMultiMap;

	use super::Service;

	fn service() -> Service { Service { members: IdMultiMap::new() } }

	#[test]
	fn membership_round_trip() {
		let cache = service();
		let room = RoomId::new("r1", "test");
		let alice = UserId::new("alice", "test");

		cache.add_member(&room, &alice).unwrap();
		assert!(cache.is_member(&room, &alice));
		assert!(cache.add_member(&room, &alice).is_err());

		assert_eq!(cache.users(&room), vec![alice.clone()]);
		assert_eq!(cache.rooms(&alice), vec![room.clone()]);

		cache.remove_member(&room, &alice).unwrap();
		assert!(!cache.is_member(&room, &alice));
		assert!(cache.remove_member(&room, &alice).is_err());
	}

	#[test]
	fn peers_include_self_and_roommates_only() {
		let cache = service();
		let r1 = RoomId::new("r1", "test");
		let r2 = RoomId::new("r2", "test");
		let alice = UserId::new("alice", "test");
		let bob = UserId::new("bob", "test");
		let carol = UserId::new("carol", "test");

		cache.add_member(&r1, &alice).unwrap();
		cache.add_member(&r1, &bob).unwrap();
		cache.add_member(&r2, &carol).unwrap();

		let peers = cache.peers(&alice);
		assert!(peers.contains(&alice));
		assert!(peers.contains(&bob));
		assert!(!peers.contains(&carol));

		// a user in no rooms still sees itself
		let hermit = UserId::new("hermit", "test");
		assert_eq!(cache.peers(&hermit).len(), 1);
	}
}
