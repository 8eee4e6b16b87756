use std::sync::Arc;

use argon2::{
	Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
	password_hash::{SaltString, rand_core::OsRng},
};
use palaver_core::{Err, Result, UserId, err, implement};
use palaver_database::StateStore;

const PASSWORD_HASH_KEY: &str = "pw_hash";

/// User accounts: one state bucket per user, holding the credential hash.
/// Users are created once and never deleted.
pub struct Service {
	db: StateStore,
}

impl crate::Service for Service {
	fn build(_: crate::Args<'_>) -> Result<Arc<Self>> {
		Ok(Arc::new(Self { db: StateStore::new() }))
	}

	fn name(&self) -> &str { crate::service::make_name(std::module_path!()) }
}

#[implement(Service)]
#[must_use]
pub fn exists(&self, user_id: &UserId) -> bool { self.db.bucket_exists(user_id.as_ref()) }

#[implement(Service)]
pub fn create(&self, user_id: &UserId) -> Result {
	if self.db.create_bucket(user_id.as_ref()) {
		return Err!(Request(UserInUse("user '{user_id}' already exists")));
	}

	Ok(())
}

#[implement(Service)]
pub fn set_password(&self, user_id: &UserId, password: &str) -> Result {
	let salt = SaltString::generate(&mut OsRng);
	let hash = Argon2::default()
		.hash_password(password.as_bytes(), &salt)
		.map_err(|e| err!("failed to hash password: {e}"))?
		.to_string();

	self.db
		.set_state(user_id.as_ref(), PASSWORD_HASH_KEY, hash.as_bytes())?;

	Ok(())
}

/// Verifies a plaintext password against the stored hash. Both a missing
/// account and a wrong password surface as the same rejection.
#[implement(Service)]
pub fn verify_password(&self, user_id: &UserId, password: &str) -> Result {
	let stored = self.db.state(user_id.as_ref(), PASSWORD_HASH_KEY)?;
	let stored = std::str::from_utf8(&stored)?;

	let hash = PasswordHash::new(stored)
		.map_err(|_| err!(Request(Forbidden("invalid credentials"))))?;

	Argon2::default()
		.verify_password(password.as_bytes(), &hash)
		.map_err(|_| err!(Request(Forbidden("invalid credentials"))))
}

#[cfg(test)]
mod tests {
	use palaver_core::UserId;
	use palaver_database::StateStore;

	use super::Service;

	fn service() -> Service { Service { db: StateStore::new() } }

	#[test]
	fn create_is_once() {
		let users = service();
		let alice = UserId::new("alice", "test");
		assert!(!users.exists(&alice));
		users.create(&alice).unwrap();
		assert!(users.exists(&alice));
		assert!(users.create(&alice).is_err());
	}

	#[test]
	fn password_round_trip() {
		let users = service();
		let alice = UserId::new("alice", "test");
		users.create(&alice).unwrap();
		users.set_password(&alice, "hunter2").unwrap();

		assert!(users.verify_password(&alice, "hunter2").is_ok());
		assert!(users.verify_password(&alice, "wrong").is_err());

		// owners may re-set their password
		users.set_password(&alice, "correct horse").unwrap();
		assert!(users.verify_password(&alice, "hunter2").is_err());
		assert!(users.verify_password(&alice, "correct horse").is_ok());
	}

	#[test]
	fn unknown_user_fails_verification() {
		let users = service();
		assert!(
			users
				.verify_password(&UserId::new("ghost", "test"), "pw")
				.is_err()
		);
	}
}
