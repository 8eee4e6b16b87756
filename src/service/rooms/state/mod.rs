use std::{
	collections::HashMap,
	sync::{Arc, RwLock},
};

use palaver_core::{
	Err, Result, err, implement,
	matrix::{
		Content, EventId, JoinRule, Membership, PowerLevelsContent, RoomId, State, Timestamp,
		UserId, event_auth,
		content::event_type,
	},
	utils,
};
use tracing::debug;

const EVENT_ID_LENGTH: usize = 16;

/// Authoritative per-room current state: a `(event type, state key)` map of
/// state events with prior-value carry. Writes mint the event id and
/// timestamp atomically with the value swap.
pub struct Service {
	// Lock order: the rooms table before any room's own state lock.
	rooms: RwLock<HashMap<RoomId, Arc<Room>>>,
	services: Arc<crate::OnceServices>,
}

#[derive(Default)]
struct Room {
	state: RwLock<HashMap<(String, String), State>>,
}

impl crate::Service for Service {
	fn build(args: crate::Args<'_>) -> Result<Arc<Self>> {
		Ok(Arc::new(Self {
			rooms: RwLock::new(HashMap::new()),
			services: args.services.clone(),
		}))
	}

	fn name(&self) -> &str { crate::service::make_name(std::module_path!()) }
}

/// Idempotent create; returns whether the room already existed.
#[implement(Service)]
pub fn create_room(&self, room_id: &RoomId) -> bool {
	let mut rooms = self.rooms.write().expect("locked for writing");
	if rooms.contains_key(room_id) {
		return true;
	}

	rooms.insert(room_id.clone(), Arc::new(Room::default()));

	false
}

#[implement(Service)]
#[must_use]
pub fn room_exists(&self, room_id: &RoomId) -> bool {
	self.rooms.read().expect("locked").contains_key(room_id)
}

#[implement(Service)]
pub fn check_exists(&self, room_id: &RoomId) -> Result {
	if !self.room_exists(room_id) {
		return Err!(Request(NotFound("room '{room_id}' doesn't exist")));
	}

	Ok(())
}

#[implement(Service)]
fn room(&self, room_id: &RoomId) -> Result<Arc<Room>> {
	self.rooms
		.read()
		.expect("locked")
		.get(room_id)
		.cloned()
		.ok_or_else(|| err!(Request(NotFound("room '{room_id}' doesn't exist"))))
}

/// Install a state value: mints a fresh event id from the sender's domain,
/// timestamps it, captures the previous content under the key, and swaps
/// the new event in.
#[implement(Service)]
pub fn set_room_state(
	&self,
	room_id: &RoomId,
	sender: &UserId,
	content: Content,
	state_key: &str,
) -> Result<State> {
	let room = self.room(room_id)?;
	let event_id =
		EventId::new(&utils::random_string(EVENT_ID_LENGTH), sender.domain().as_str());

	let mut state = room.state.write().expect("locked for writing");
	let key = (content.event_type().to_owned(), state_key.to_owned());
	let prev_content = state.get(&key).map(|prev| prev.content.clone());

	let event = State {
		event_id,
		room_id: room_id.clone(),
		user_id: sender.clone(),
		origin_server_ts: Timestamp::now(),
		content,
		state_key: state_key.to_owned(),
		prev_content,
	};

	state.insert(key, event.clone());

	Ok(event)
}

#[implement(Service)]
pub fn room_state(
	&self,
	room_id: &RoomId,
	kind: &str,
	state_key: &str,
) -> Result<Option<State>> {
	let room = self.room(room_id)?;
	let state = room.state.read().expect("locked");

	Ok(state
		.get(&(kind.to_owned(), state_key.to_owned()))
		.cloned())
}

#[implement(Service)]
pub fn entire_room_state(&self, room_id: &RoomId) -> Result<Vec<State>> {
	let room = self.room(room_id)?;
	let state = room.state.read().expect("locked");

	Ok(state.values().cloned().collect())
}

/// Write a state value and emit the event to the message stream. All
/// admitted state mutations funnel through here.
#[implement(Service)]
pub fn send_state(
	&self,
	room_id: &RoomId,
	sender: &UserId,
	content: Content,
	state_key: &str,
) -> Result<State> {
	debug!(%room_id, %sender, kind = content.event_type(), %state_key, "setting state");

	let event = self.set_room_state(room_id, sender, content, state_key)?;
	self.services.timeline.send(event.clone().into());

	Ok(event)
}

/// Client-facing state mutation, policing the state-key shape and the
/// sender's power before writing. Membership changes are delegated to the
/// membership state machine.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip(self, content))]
pub fn set_state(
	&self,
	room_id: &RoomId,
	sender: &UserId,
	content: Content,
	state_key: &str,
) -> Result<State> {
	self.check_exists(room_id)?;

	let kind = content.event_type().to_owned();
	let user_state_key = UserId::parse(state_key).ok();

	match kind.as_str() {
		| event_type::NAME
		| event_type::TOPIC
		| event_type::JOIN_RULES
		| event_type::POWER_LEVELS =>
			if !state_key.is_empty() {
				return Err!(Request(Forbidden("state key must be empty for state {kind}")));
			},

		| event_type::CREATE | event_type::ALIASES =>
			return Err!(Request(Forbidden("cannot set state {kind}"))),

		| event_type::MEMBER => {
			let Some(member) = content.as_member() else {
				return Err!(Request(BadJson("expected membership event content")));
			};

			let Some(target) = user_state_key else {
				return Err!(Request(Forbidden(
					"state key must be a user id for state {kind}"
				)));
			};

			return self
				.services
				.membership
				.membership_change(room_id, sender, &target, member.membership);
		},

		| _ =>
			if let Some(target) = &user_state_key {
				if target != sender {
					return Err!(Request(Forbidden("cannot set the state of another user")));
				}
			},
	}

	let power_levels = self.power_levels(room_id)?;
	if self.room_state(room_id, &kind, state_key)?.is_some() {
		event_auth::check_power(&power_levels, sender, power_levels.create_state)?;
	}

	event_auth::check_event_power(&power_levels, sender, &kind)?;

	self.send_state(room_id, sender, content, state_key)
}

/// A room's power levels. A created room always has them; their absence is
/// an internal invariant violation, not a client error.
#[implement(Service)]
pub fn power_levels(&self, room_id: &RoomId) -> Result<PowerLevelsContent> {
	let state = self
		.room_state(room_id, event_type::POWER_LEVELS, "")?
		.ok_or_else(|| err!("room power levels are invalid or missing: {room_id}"))?;

	state
		.content
		.as_power_levels()
		.cloned()
		.ok_or_else(|| err!("room power levels are invalid or missing: {room_id}"))
}

#[implement(Service)]
pub fn join_rule(&self, room_id: &RoomId) -> Result<JoinRule> {
	let state = self
		.room_state(room_id, event_type::JOIN_RULES, "")?
		.ok_or_else(|| err!("room join rules are invalid or missing: {room_id}"))?;

	state
		.content
		.as_join_rules()
		.map(|content| content.join_rule)
		.ok_or_else(|| err!("room join rules are invalid or missing: {room_id}"))
}

/// Current membership of a user; the absence of a membership state event
/// is `Membership::None`.
#[implement(Service)]
pub fn user_membership(&self, room_id: &RoomId, user_id: &UserId) -> Result<Membership> {
	let Some(state) = self.room_state(room_id, event_type::MEMBER, &user_id.to_string())? else {
		return Ok(Membership::None);
	};

	state
		.content
		.as_member()
		.map(|content| content.membership)
		.ok_or_else(|| err!("invalid membership content in {room_id}"))
}
