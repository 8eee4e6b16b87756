use std::{
	collections::{HashMap, HashSet},
	sync::RwLock,
};

use palaver_core::Id;

/// A set of `(key, value)` identifier pairs with lookups in both
/// directions and the linked union queries used for peer derivation.
#[derive(Default)]
pub struct IdMultiMap {
	inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
	mapping: HashMap<Id, Vec<Id>>,
	reverse: HashMap<Id, Vec<Id>>,
	entries: HashSet<(Id, Id)>,
}

fn swap_remove(list: &mut Vec<Id>, id: &Id) {
	if let Some(position) = list.iter().position(|entry| entry == id) {
		list.swap_remove(position);
	}
}

impl IdMultiMap {
	#[must_use]
	pub fn new() -> Self { Self::default() }

	/// Stores a pair; returns false if it already existed.
	pub fn put(&self, key: &Id, value: &Id) -> bool {
		let mut inner = self.inner.write().expect("locked for writing");
		if !inner.entries.insert((key.clone(), value.clone())) {
			return false;
		}

		inner
			.mapping
			.entry(key.clone())
			.or_default()
			.push(value.clone());
		inner
			.reverse
			.entry(value.clone())
			.or_default()
			.push(key.clone());

		true
	}

	/// Removes a pair; returns false if it did not exist.
	pub fn delete(&self, key: &Id, value: &Id) -> bool {
		let mut inner = self.inner.write().expect("locked for writing");
		if !inner.entries.remove(&(key.clone(), value.clone())) {
			return false;
		}

		if let Some(values) = inner.mapping.get_mut(key) {
			swap_remove(values, value);
		}

		if let Some(keys) = inner.reverse.get_mut(value) {
			swap_remove(keys, key);
		}

		true
	}

	#[must_use]
	pub fn contains(&self, key: &Id, value: &Id) -> bool {
		self.inner
			.read()
			.expect("locked")
			.entries
			.contains(&(key.clone(), value.clone()))
	}

	#[must_use]
	pub fn lookup(&self, key: &Id) -> Vec<Id> {
		self.inner
			.read()
			.expect("locked")
			.mapping
			.get(key)
			.cloned()
			.unwrap_or_default()
	}

	#[must_use]
	pub fn reverse_lookup(&self, value: &Id) -> Vec<Id> {
		self.inner
			.read()
			.expect("locked")
			.reverse
			.get(value)
			.cloned()
			.unwrap_or_default()
	}

	/// Looks up the values of `key`, reverse-looks-up the keys of each, and
	/// returns the union of those keys.
	#[must_use]
	pub fn union_link_lookup(&self, key: &Id) -> HashSet<Id> {
		let inner = self.inner.read().expect("locked");
		let mut union = HashSet::new();
		for value in inner.mapping.get(key).into_iter().flatten() {
			if let Some(keys) = inner.reverse.get(value) {
				union.extend(keys.iter().cloned());
			}
		}

		union
	}

	/// The reversed [`Self::union_link_lookup`]: starts from a value and
	/// returns the union of the values linked through its keys.
	#[must_use]
	pub fn union_link_reverse_lookup(&self, value: &Id) -> HashSet<Id> {
		let inner = self.inner.read().expect("locked");
		let mut union = HashSet::new();
		for key in inner.reverse.get(value).into_iter().flatten() {
			if let Some(values) = inner.mapping.get(key) {
				union.extend(values.iter().cloned());
			}
		}

		union
	}
}

#[cfg(test)]
mod tests {
	use palaver_core::matrix::{Id, RoomId, UserId};

	use super::IdMultiMap;

	fn user(localpart: &str) -> Id { UserId::new(localpart, "test").into() }

	fn room(localpart: &str) -> Id { RoomId::new(localpart, "test").into() }

	#[test]
	fn put_and_delete_report_prior_state() {
		let map = IdMultiMap::new();
		assert!(map.put(&room("r1"), &user("alice")));
		assert!(!map.put(&room("r1"), &user("alice")));
		assert!(map.contains(&room("r1"), &user("alice")));
		assert!(map.delete(&room("r1"), &user("alice")));
		assert!(!map.delete(&room("r1"), &user("alice")));
		assert!(!map.contains(&room("r1"), &user("alice")));
	}

	#[test]
	fn lookups_in_both_directions() {
		let map = IdMultiMap::new();
		map.put(&room("r1"), &user("alice"));
		map.put(&room("r1"), &user("bob"));
		map.put(&room("r2"), &user("bob"));

		let mut users = map.lookup(&room("r1"));
		users.sort();
		assert_eq!(users, vec![user("alice"), user("bob")]);

		let mut rooms = map.reverse_lookup(&user("bob"));
		rooms.sort();
		assert_eq!(rooms, vec![room("r1"), room("r2")]);
	}

	#[test]
	fn union_link_reverse_lookup_is_the_peer_set() {
		let map = IdMultiMap::new();
		map.put(&room("r1"), &user("alice"));
		map.put(&room("r1"), &user("bob"));
		map.put(&room("r2"), &user("bob"));
		map.put(&room("r2"), &user("carol"));
		map.put(&room("r3"), &user("dave"));

		// bob shares r1 with alice and r2 with carol, and sees himself
		let peers = map.union_link_reverse_lookup(&user("bob"));
		assert!(peers.contains(&user("alice")));
		assert!(peers.contains(&user("bob")));
		assert!(peers.contains(&user("carol")));
		assert!(!peers.contains(&user("dave")));
	}

	#[test]
	fn union_link_lookup_links_through_values() {
		let map = IdMultiMap::new();
		map.put(&room("r1"), &user("alice"));
		map.put(&room("r2"), &user("alice"));
		map.put(&room("r3"), &user("bob"));

		let rooms = map.union_link_lookup(&room("r1"));
		assert!(rooms.contains(&room("r1")));
		assert!(rooms.contains(&room("r2")));
		assert!(!rooms.contains(&room("r3")));
	}
}
