//! Event contents, discriminated on the event-type string. Types outside
//! the known set fall into the generic untyped container.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::{Membership, PowerLevelsContent, RoomAliasId, UserId, room::JoinRule, user::UserProfile};
use crate::{Err, Result, err};

pub mod event_type {
	pub const CREATE: &str = "m.room.create";
	pub const NAME: &str = "m.room.name";
	pub const TOPIC: &str = "m.room.topic";
	pub const ALIASES: &str = "m.room.aliases";
	pub const JOIN_RULES: &str = "m.room.join_rules";
	pub const MEMBER: &str = "m.room.member";
	pub const POWER_LEVELS: &str = "m.room.power_levels";
	pub const TYPING: &str = "m.typing";
	pub const PRESENCE: &str = "m.presence";
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CreateContent {
	pub creator: UserId,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NameContent {
	pub name: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TopicContent {
	pub topic: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AliasesContent {
	pub aliases: Vec<RoomAliasId>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct JoinRulesContent {
	pub join_rule: JoinRule,
}

/// Membership state with the member's profile snapshot taken at transition
/// time.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MemberContent {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub displayname: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub avatar_url: Option<String>,

	pub membership: Membership,
}

impl MemberContent {
	#[must_use]
	pub fn new(membership: Membership) -> Self {
		Self {
			displayname: None,
			avatar_url: None,
			membership,
		}
	}

	/// Attach the member's profile snapshot.
	#[must_use]
	pub fn with_profile(mut self, profile: UserProfile) -> Self {
		self.displayname = Some(profile.displayname);
		self.avatar_url = Some(profile.avatar_url);
		self
	}
}

/// Retains events of types outside the known set as an untyped map.
#[derive(Clone, Debug, PartialEq)]
pub struct GenericContent {
	pub event_type: String,
	pub content: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Content {
	Create(CreateContent),
	Name(NameContent),
	Topic(TopicContent),
	Aliases(AliasesContent),
	JoinRules(JoinRulesContent),
	Member(MemberContent),
	PowerLevels(PowerLevelsContent),
	Generic(GenericContent),
}

impl Content {
	/// Deserialize a content body according to its event-type string.
	/// A known type whose body does not fit its schema is a `BadJson`
	/// rejection; unknown types only need to be JSON objects.
	pub fn from_parts(event_type: &str, value: Value) -> Result<Self> {
		fn typed<T: serde::de::DeserializeOwned>(event_type: &str, value: Value) -> Result<T> {
			serde_json::from_value(value).map_err(|e| {
				err!(Request(BadJson("invalid content for event type {event_type}: {e}")))
			})
		}

		match event_type {
			| event_type::CREATE => typed(event_type, value).map(Self::Create),
			| event_type::NAME => typed(event_type, value).map(Self::Name),
			| event_type::TOPIC => typed(event_type, value).map(Self::Topic),
			| event_type::ALIASES => typed(event_type, value).map(Self::Aliases),
			| event_type::JOIN_RULES => typed(event_type, value).map(Self::JoinRules),
			| event_type::MEMBER => typed(event_type, value).map(Self::Member),
			| event_type::POWER_LEVELS => typed(event_type, value).map(Self::PowerLevels),
			| _ => match value {
				| Value::Object(content) => Ok(Self::Generic(GenericContent {
					event_type: event_type.to_owned(),
					content,
				})),
				| _ => Err!(Request(BadJson("content for {event_type} is not an object"))),
			},
		}
	}

	#[must_use]
	pub fn event_type(&self) -> &str {
		match self {
			| Self::Create(_) => event_type::CREATE,
			| Self::Name(_) => event_type::NAME,
			| Self::Topic(_) => event_type::TOPIC,
			| Self::Aliases(_) => event_type::ALIASES,
			| Self::JoinRules(_) => event_type::JOIN_RULES,
			| Self::Member(_) => event_type::MEMBER,
			| Self::PowerLevels(_) => event_type::POWER_LEVELS,
			| Self::Generic(content) => &content.event_type,
		}
	}

	#[must_use]
	pub fn as_member(&self) -> Option<&MemberContent> {
		match self {
			| Self::Member(content) => Some(content),
			| _ => None,
		}
	}

	#[must_use]
	pub fn as_power_levels(&self) -> Option<&PowerLevelsContent> {
		match self {
			| Self::PowerLevels(content) => Some(content),
			| _ => None,
		}
	}

	#[must_use]
	pub fn as_join_rules(&self) -> Option<&JoinRulesContent> {
		match self {
			| Self::JoinRules(content) => Some(content),
			| _ => None,
		}
	}
}

impl Serialize for Content {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			| Self::Create(content) => content.serialize(serializer),
			| Self::Name(content) => content.serialize(serializer),
			| Self::Topic(content) => content.serialize(serializer),
			| Self::Aliases(content) => content.serialize(serializer),
			| Self::JoinRules(content) => content.serialize(serializer),
			| Self::Member(content) => content.serialize(serializer),
			| Self::PowerLevels(content) => content.serialize(serializer),
			| Self::Generic(content) => content.content.serialize(serializer),
		}
	}
}
