use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use super::UserId;
use crate::utils;

/// Presence state of a user.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Presence {
	#[default]
	Offline,
	Online,
	FreeForChat,
	Unavailable,
}

impl Presence {
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			| Self::Offline => "offline",
			| Self::Online => "online",
			| Self::FreeForChat => "free_for_chat",
			| Self::Unavailable => "unavailable",
		}
	}
}

impl Serialize for Presence {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for Presence {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = std::borrow::Cow::<'de, str>::deserialize(deserializer)?;
		match s.as_ref() {
			| "offline" => Ok(Self::Offline),
			| "online" => Ok(Self::Online),
			| "free_for_chat" => Ok(Self::FreeForChat),
			| "unavailable" => Ok(Self::Unavailable),
			| other => Err(de::Error::custom(format!("invalid presence: {other}"))),
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct UserProfile {
	pub displayname: String,
	pub avatar_url: String,
}

/// Moment the user was last active, serialized as the elapsed duration in
/// milliseconds at serialization time.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LastActive(pub u64);

impl LastActive {
	#[must_use]
	pub fn now() -> Self { Self(utils::millis_since_unix_epoch()) }
}

impl Serialize for LastActive {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let ago = utils::millis_since_unix_epoch().saturating_sub(self.0);
		serializer.serialize_u64(ago)
	}
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct UserStatus {
	pub presence: Presence,

	#[serde(rename = "status_msg")]
	pub status_message: String,

	#[serde(rename = "last_active_ago")]
	pub last_active: LastActive,
}

/// The full per-user record carried by presence events.
#[derive(Clone, Debug, Serialize)]
pub struct User {
	#[serde(flatten)]
	pub profile: UserProfile,

	#[serde(flatten)]
	pub status: UserStatus,

	pub user_id: UserId,
}

impl User {
	#[must_use]
	pub fn new(user_id: UserId) -> Self {
		Self {
			profile: UserProfile::default(),
			status: UserStatus::default(),
			user_id,
		}
	}
}
