use std::{collections::HashMap, sync::RwLock};

use palaver_core::Id;

/// One-to-one forward, one-to-many reverse relation between identifiers.
#[derive(Default)]
pub struct IdMap {
	inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
	mapping: HashMap<Id, Id>,
	reverse: HashMap<Id, Vec<Id>>,
}

impl Inner {
	fn unlink(&mut self, key: &Id, value: &Id) {
		let Some(keys) = self.reverse.get_mut(value) else {
			return;
		};

		if let Some(position) = keys.iter().position(|k| k == key) {
			keys.swap_remove(position);
		}

		if keys.is_empty() {
			self.reverse.remove(value);
		}
	}
}

impl IdMap {
	#[must_use]
	pub fn new() -> Self { Self::default() }

	/// Binds only if the key is unbound; returns whether it inserted.
	pub fn insert(&self, key: &Id, value: &Id) -> bool {
		let mut inner = self.inner.write().expect("locked for writing");
		if inner.mapping.contains_key(key) {
			return false;
		}

		inner.mapping.insert(key.clone(), value.clone());
		inner
			.reverse
			.entry(value.clone())
			.or_default()
			.push(key.clone());

		true
	}

	/// Rebinds only if the key is already bound; returns whether it
	/// replaced.
	pub fn replace(&self, key: &Id, value: &Id) -> bool {
		let mut inner = self.inner.write().expect("locked for writing");
		let Some(old) = inner.mapping.get(key).cloned() else {
			return false;
		};

		inner.unlink(key, &old);
		inner.mapping.insert(key.clone(), value.clone());
		inner
			.reverse
			.entry(value.clone())
			.or_default()
			.push(key.clone());

		true
	}

	/// Binds or rebinds as needed.
	pub fn put(&self, key: &Id, value: &Id) {
		let mut inner = self.inner.write().expect("locked for writing");
		if let Some(old) = inner.mapping.get(key).cloned() {
			inner.unlink(key, &old);
		}

		inner.mapping.insert(key.clone(), value.clone());
		inner
			.reverse
			.entry(value.clone())
			.or_default()
			.push(key.clone());
	}

	/// Removes `key -> value` if that exact pair is bound; returns whether
	/// it deleted.
	pub fn delete(&self, key: &Id, value: &Id) -> bool {
		let mut inner = self.inner.write().expect("locked for writing");
		if inner.mapping.get(key) != Some(value) {
			return false;
		}

		inner.mapping.remove(key);
		inner.unlink(key, value);

		true
	}

	#[must_use]
	pub fn lookup(&self, key: &Id) -> Option<Id> {
		self.inner
			.read()
			.expect("locked")
			.mapping
			.get(key)
			.cloned()
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
}
