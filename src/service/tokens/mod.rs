use std::sync::Arc;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use palaver_core::{Err, Result, UserId, err, implement, utils};

const TOKEN_RANDOM_LENGTH: usize = 16;

/// Mints and parses opaque bearer tokens of the form
/// `base64url(user_id)..<random>`. Tokens carry no server-side state; the
/// random suffix is reserved for future revocation tracking and is not
/// consulted when parsing. A parsed token is not authority by itself:
/// consumers still verify that the embedded user exists.
pub struct Service {}

impl crate::Service for Service {
	fn build(_: crate::Args<'_>) -> Result<Arc<Self>> { Ok(Arc::new(Self {})) }

	fn name(&self) -> &str { crate::service::make_name(std::module_path!()) }
}

#[implement(Service)]
#[must_use]
pub fn mint(&self, user_id: &UserId) -> String {
	let encoded = URL_SAFE_NO_PAD.encode(user_id.to_string());

	format!("{encoded}..{}", utils::random_string(TOKEN_RANDOM_LENGTH))
}

#[implement(Service)]
pub fn parse(&self, token: &str) -> Result<UserId> {
	let Some((encoded, _random)) = token.split_once("..") else {
		return Err!(Request(UnknownToken("Unrecognised access token.")));
	};

	let decoded = URL_SAFE_NO_PAD
		.decode(encoded)
		.map_err(|_| err!(Request(UnknownToken("Unrecognised access token."))))?;

	std::str::from_utf8(&decoded)
		.map_err(Into::into)
		.and_then(UserId::parse)
		.map_err(|_| err!(Request(UnknownToken("Unrecognised access token."))))
}

#[cfg(test)]
mod tests {
	use palaver_core::UserId;

	use super::Service;

	#[test]
	fn round_trips_for_any_user() {
		let tokens = Service {};
		for localpart in ["alice", "bob-with-dash", "x"] {
			let user = UserId::new(localpart, "example.org");
			let token = tokens.mint(&user);
			assert_eq!(tokens.parse(&token).unwrap(), user);
		}
	}

	#[test]
	fn fresh_tokens_differ() {
		let tokens = Service {};
		let user = UserId::new("alice", "example.org");
		assert_ne!(tokens.mint(&user), tokens.mint(&user));
	}

	#[test]
	fn rejects_garbage() {
		let tokens = Service {};
		assert!(tokens.parse("no-separator").is_err());
		assert!(tokens.parse("!!!..suffix").is_err());

		// valid base64, but not a user id inside
		let bogus = format!("{}..abcdefgh12345678", base64::Engine::encode(
			&base64::engine::general_purpose::URL_SAFE_NO_PAD,
			"!room:example.org",
		));
		assert!(tokens.parse(&bogus).is_err());
	}
}
