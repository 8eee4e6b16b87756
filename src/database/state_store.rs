use std::{
	collections::HashMap,
	sync::{Arc, RwLock},
};

use palaver_core::{Id, Result, err};

/// Namespaced key-value store: byte blobs keyed by string under an
/// identifier bucket. Bucket creation is explicit; writes against a missing
/// bucket are a `NotFound` error.
#[derive(Default)]
pub struct StateStore {
	// Lock order: buckets before any bucket's own lock.
	buckets: RwLock<HashMap<Id, Arc<Bucket>>>,
}

#[derive(Default)]
struct Bucket {
	states: RwLock<HashMap<String, Vec<u8>>>,
}

impl StateStore {
	#[must_use]
	pub fn new() -> Self { Self::default() }

	/// Creates the bucket, idempotently; returns whether it already existed.
	pub fn create_bucket(&self, id: &Id) -> bool {
		let mut buckets = self.buckets.write().expect("locked for writing");
		if buckets.contains_key(id) {
			return true;
		}

		buckets.insert(id.clone(), Arc::new(Bucket::default()));

		false
	}

	#[must_use]
	pub fn bucket_exists(&self, id: &Id) -> bool {
		self.buckets.read().expect("locked").contains_key(id)
	}

	fn bucket(&self, id: &Id) -> Result<Arc<Bucket>> {
		self.buckets
			.read()
			.expect("locked")
			.get(id)
			.cloned()
			.ok_or_else(|| err!(Request(NotFound("bucket '{id}' doesn't exist"))))
	}

	/// Installs a value, returning the previous one. An empty value
	/// deletes the key.
	pub fn set_state(&self, id: &Id, key: &str, value: &[u8]) -> Result<Vec<u8>> {
		let bucket = self.bucket(id)?;
		let mut states = bucket.states.write().expect("locked for writing");
		let old = if value.is_empty() {
			states.remove(key)
		} else {
			states.insert(key.to_owned(), value.to_vec())
		};

		Ok(old.unwrap_or_default())
	}

	/// The value under a key; empty if the key is unset.
	pub fn state(&self, id: &Id, key: &str) -> Result<Vec<u8>> {
		let bucket = self.bucket(id)?;
		let states = bucket.states.read().expect("locked");

		Ok(states.get(key).cloned().unwrap_or_default())
	}

	/// All key-value pairs of a bucket.
	pub fn states(&self, id: &Id) -> Result<Vec<(String, Vec<u8>)>> {
		let bucket = self.bucket(id)?;
		let states = bucket.states.read().expect("locked");

		Ok(states
			.iter()
			.map(|(key, value)| (key.clone(), value.clone()))
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use palaver_core::matrix::{Id, UserId};

	use super::StateStore;

	fn user(localpart: &str) -> Id { UserId::new(localpart, "test").into() }

	#[test]
	fn missing_bucket_is_not_found() {
		let store = StateStore::new();
		assert!(store.state(&user("alice"), "pw_hash").is_err());
		assert!(store.set_state(&user("alice"), "pw_hash", b"x").is_err());
		assert!(store.states(&user("alice")).is_err());
	}

	#[test]
	fn create_bucket_reports_prior_existence() {
		let store = StateStore::new();
		assert!(!store.create_bucket(&user("alice")));
		assert!(store.create_bucket(&user("alice")));
		assert!(store.bucket_exists(&user("alice")));
	}

	#[test]
	fn set_state_returns_old_value_and_empty_deletes() {
		let store = StateStore::new();
		store.create_bucket(&user("alice"));

		assert_eq!(store.set_state(&user("alice"), "k", b"one").unwrap(), b"");
		assert_eq!(store.set_state(&user("alice"), "k", b"two").unwrap(), b"one");
		assert_eq!(store.state(&user("alice"), "k").unwrap(), b"two");

		// empty value deletes the key
		assert_eq!(store.set_state(&user("alice"), "k", b"").unwrap(), b"two");
		assert_eq!(store.state(&user("alice"), "k").unwrap(), b"");
		assert!(store.states(&user("alice")).unwrap().is_empty());
	}
}
