//! The polymorphic event model: a sum over message, state, presence and
//! typing events with one shared accessor surface.

use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};

use super::{Content, EventId, Id, RoomId, UserId, user::User};
use crate::utils;

/// Milliseconds since the unix epoch.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
	#[must_use]
	pub fn now() -> Self { Self(utils::millis_since_unix_epoch()) }
}

/// A non-state room event.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
	pub event_id: EventId,
	pub room_id: RoomId,
	pub user_id: UserId,
	pub origin_server_ts: Timestamp,
	pub content: Content,
}

impl Serialize for Message {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut state = serializer.serialize_struct("Message", 6)?;
		state.serialize_field("event_id", &self.event_id)?;
		state.serialize_field("room_id", &self.room_id)?;
		state.serialize_field("user_id", &self.user_id)?;
		state.serialize_field("type", self.content.event_type())?;
		state.serialize_field("origin_server_ts", &self.origin_server_ts)?;
		state.serialize_field("content", &self.content)?;
		state.end()
	}
}

/// A state event: a message plus its state key and a snapshot of the value
/// previously held under that key.
#[derive(Clone, Debug, PartialEq)]
pub struct State {
	pub event_id: EventId,
	pub room_id: RoomId,
	pub user_id: UserId,
	pub origin_server_ts: Timestamp,
	pub content: Content,
	pub state_key: String,
	pub prev_content: Option<Content>,
}

impl Serialize for State {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut state = serializer.serialize_struct("State", 8)?;
		state.serialize_field("event_id", &self.event_id)?;
		state.serialize_field("room_id", &self.room_id)?;
		state.serialize_field("user_id", &self.user_id)?;
		state.serialize_field("type", self.content.event_type())?;
		state.serialize_field("origin_server_ts", &self.origin_server_ts)?;
		state.serialize_field("content", &self.content)?;
		state.serialize_field("state_key", &self.state_key)?;
		state.serialize_field("prev_content", &self.prev_content)?;
		state.end()
	}
}

/// Presence update fanned out to the subject's peers.
#[derive(Clone, Debug)]
pub struct PresenceEvent {
	pub content: User,
}

impl Serialize for PresenceEvent {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut state = serializer.serialize_struct("PresenceEvent", 2)?;
		state.serialize_field("type", super::event_type::PRESENCE)?;
		state.serialize_field("content", &self.content)?;
		state.end()
	}
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TypingContent {
	pub user_ids: Vec<UserId>,
}

/// The set of users currently typing in a room.
#[derive(Clone, Debug)]
pub struct TypingEvent {
	pub room_id: RoomId,
	pub content: TypingContent,
}

impl Serialize for TypingEvent {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut state = serializer.serialize_struct("TypingEvent", 3)?;
		state.serialize_field("type", super::event_type::TYPING)?;
		state.serialize_field("room_id", &self.room_id)?;
		state.serialize_field("content", &self.content)?;
		state.end()
	}
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Event {
	Message(Message),
	State(State),
	Presence(PresenceEvent),
	Typing(TypingEvent),
}

impl Event {
	#[must_use]
	pub fn event_type(&self) -> &str {
		match self {
			| Self::Message(event) => event.content.event_type(),
			| Self::State(event) => event.content.event_type(),
			| Self::Presence(_) => super::event_type::PRESENCE,
			| Self::Typing(_) => super::event_type::TYPING,
		}
	}

	#[must_use]
	pub fn room_id(&self) -> Option<&RoomId> {
		match self {
			| Self::Message(event) => Some(&event.room_id),
			| Self::State(event) => Some(&event.room_id),
			| Self::Typing(event) => Some(&event.room_id),
			| Self::Presence(_) => None,
		}
	}

	/// The sender for room events, the subject for presence events.
	#[must_use]
	pub fn user_id(&self) -> Option<&UserId> {
		match self {
			| Self::Message(event) => Some(&event.user_id),
			| Self::State(event) => Some(&event.user_id),
			| Self::Presence(event) => Some(&event.content.user_id),
			| Self::Typing(_) => None,
		}
	}

	#[must_use]
	pub fn event_id(&self) -> Option<&EventId> {
		match self {
			| Self::Message(event) => Some(&event.event_id),
			| Self::State(event) => Some(&event.event_id),
			| Self::Presence(_) | Self::Typing(_) => None,
		}
	}

	#[must_use]
	pub fn content(&self) -> Option<&Content> {
		match self {
			| Self::Message(event) => Some(&event.content),
			| Self::State(event) => Some(&event.content),
			| Self::Presence(_) | Self::Typing(_) => None,
		}
	}

	#[must_use]
	pub fn as_state(&self) -> Option<&State> {
		match self {
			| Self::State(event) => Some(event),
			| _ => None,
		}
	}

	/// The key under which a stream deduplicates this event: the event id
	/// for room events, the subject for presence, the room for typing.
	#[must_use]
	pub fn event_key(&self) -> Id {
		match self {
			| Self::Message(event) => (&event.event_id).into(),
			| Self::State(event) => (&event.event_id).into(),
			| Self::Presence(event) => (&event.content.user_id).into(),
			| Self::Typing(event) => (&event.room_id).into(),
		}
	}
}

impl From<Message> for Event {
	#[inline]
	fn from(event: Message) -> Self { Self::Message(event) }
}

impl From<State> for Event {
	#[inline]
	fn from(event: State) -> Self { Self::State(event) }
}

impl From<PresenceEvent> for Event {
	#[inline]
	fn from(event: PresenceEvent) -> Self { Self::Presence(event) }
}

impl From<TypingEvent> for Event {
	#[inline]
	fn from(event: TypingEvent) -> Self { Self::Typing(event) }
}

/// An event together with the stream index it was committed at.
#[derive(Clone, Debug)]
pub struct IndexedEvent {
	pub event: Event,
	pub index: u64,
}
