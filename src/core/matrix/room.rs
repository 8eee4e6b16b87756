//! Room-scoped closed enumerations and the creation request body. Unknown
//! strings are a parse error, never a silent fallback.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use super::UserId;

/// A user's relationship with a room. `None` is the absence of a membership
/// state event and serializes as JSON null.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Membership {
	#[default]
	None,
	Invite,
	Join,
	Knock,
	Leave,
	Ban,
}

impl Membership {
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			| Self::None => "",
			| Self::Invite => "invite",
			| Self::Join => "join",
			| Self::Knock => "knock",
			| Self::Leave => "leave",
			| Self::Ban => "ban",
		}
	}
}

impl fmt::Display for Membership {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

impl Serialize for Membership {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			| Self::None => serializer.serialize_none(),
			| _ => serializer.serialize_str(self.as_str()),
		}
	}
}

impl<'de> Deserialize<'de> for Membership {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = Option::<std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
		match s.as_deref() {
			| None => Ok(Self::None),
			| Some("invite") => Ok(Self::Invite),
			| Some("join") => Ok(Self::Join),
			| Some("knock") => Ok(Self::Knock),
			| Some("leave") => Ok(Self::Leave),
			| Some("ban") => Ok(Self::Ban),
			| Some(other) => Err(de::Error::custom(format!("invalid membership: {other}"))),
		}
	}
}

/// Policy governing how users become members.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinRule {
	Public,
	Invite,
	Private,
	Knock,
}

impl JoinRule {
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			| Self::Public => "public",
			| Self::Invite => "invite",
			| Self::Private => "private",
			| Self::Knock => "knock",
		}
	}

	#[must_use]
	pub fn to_visibility(self) -> Visibility {
		match self {
			| Self::Public => Visibility::Public,
			| _ => Visibility::Private,
		}
	}
}

impl fmt::Display for JoinRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

impl Serialize for JoinRule {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for JoinRule {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = std::borrow::Cow::<'de, str>::deserialize(deserializer)?;
		match s.as_ref() {
			| "public" => Ok(Self::Public),
			| "invite" => Ok(Self::Invite),
			| "private" => Ok(Self::Private),
			| "knock" => Ok(Self::Knock),
			| other => Err(de::Error::custom(format!("invalid join rule: {other}"))),
		}
	}
}

/// Listing visibility of a room, interchangeable with the join rule on
/// creation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Visibility {
	#[default]
	Private,
	Public,
}

impl Visibility {
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			| Self::Private => "private",
			| Self::Public => "public",
		}
	}

	#[must_use]
	pub fn to_join_rule(self) -> JoinRule {
		match self {
			| Self::Public => JoinRule::Public,
			| Self::Private => JoinRule::Invite,
		}
	}
}

impl Serialize for Visibility {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for Visibility {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = std::borrow::Cow::<'de, str>::deserialize(deserializer)?;
		match s.as_ref() {
			| "private" => Ok(Self::Private),
			| "public" => Ok(Self::Public),
			| other => Err(de::Error::custom(format!("invalid visibility: {other}"))),
		}
	}
}

/// Body of a `createRoom` request.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RoomDescription {
	#[serde(default)]
	pub visibility: Visibility,

	#[serde(rename = "room_alias_name")]
	pub alias: Option<String>,

	pub name: Option<String>,

	pub topic: Option<String>,

	#[serde(rename = "invite", default)]
	pub invited: Vec<UserId>,
}
