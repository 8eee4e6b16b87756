use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{UserId, content::event_type};

/// Content of the `m.room.power_levels` state event: the integer authority
/// thresholds arbitrating every privileged action in a room.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PowerLevelsContent {
	pub ban: i64,
	pub kick: i64,
	pub invite: i64,
	pub redact: i64,
	pub users_default: i64,

	#[serde(rename = "state_default")]
	pub create_state: i64,

	#[serde(rename = "events_default")]
	pub events_default: i64,

	pub users: BTreeMap<UserId, i64>,
	pub events: BTreeMap<String, i64>,
}

impl PowerLevelsContent {
	/// The levels installed at room creation.
	#[must_use]
	pub fn with_creator(creator: &UserId) -> Self {
		Self {
			ban: 50,
			kick: 50,
			invite: 0,
			redact: 50,
			users_default: 0,
			create_state: 50,
			events_default: 0,
			users: BTreeMap::from([(creator.clone(), 100)]),
			events: BTreeMap::from([
				(event_type::NAME.to_owned(), 100),
				(event_type::POWER_LEVELS.to_owned(), 100),
			]),
		}
	}

	/// Effective level of a user, falling back to the user default.
	#[must_use]
	pub fn user_level(&self, user: &UserId) -> i64 {
		self.users.get(user).copied().unwrap_or(self.users_default)
	}

	/// Required level to emit an event of the given type, falling back to
	/// the event default.
	#[must_use]
	pub fn event_level(&self, event_type: &str) -> i64 {
		self.events
			.get(event_type)
			.copied()
			.unwrap_or(self.events_default)
	}
}

#[cfg(test)]
mod tests {
	use super::PowerLevelsContent;
	use crate::matrix::UserId;

	#[test]
	fn creation_defaults() {
		let creator = UserId::new("alice", "example.org");
		let pl = PowerLevelsContent::with_creator(&creator);

		assert_eq!(pl.user_level(&creator), 100);
		assert_eq!(pl.user_level(&UserId::new("bob", "example.org")), 0);
		assert_eq!(pl.event_level("m.room.name"), 100);
		assert_eq!(pl.event_level("m.room.power_levels"), 100);
		assert_eq!(pl.event_level("m.room.message"), 0);
		assert_eq!(pl.ban, 50);
		assert_eq!(pl.kick, 50);
		assert_eq!(pl.create_state, 50);
		assert_eq!(pl.invite, 0);
	}
}
