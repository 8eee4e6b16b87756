use std::{
	collections::{HashMap, HashSet},
	sync::{Arc, RwLock},
};

use palaver_core::{
	Err, Result, err, implement,
	matrix::{
		Content, Event, EventId, Id, IndexedEvent, Membership, Message, RoomId, Timestamp,
		UserId, event_auth,
	},
	utils,
};
use tracing::debug;

const EVENT_ID_LENGTH: usize = 16;

/// The message stream: a monotonically-indexed log of room events with a
/// per-event-id slot. Re-sending an event id nulls the old slot and commits
/// the event at a fresh index, so indices are dense when written and may be
/// sparse after overwrites.
pub struct Service {
	stream: RwLock<Stream>,
	services: Arc<crate::OnceServices>,
}

#[derive(Default)]
struct Stream {
	index_of: HashMap<Id, u64>,
	slots: Vec<Option<Event>>,
}

impl crate::Service for Service {
	fn build(args: crate::Args<'_>) -> Result<Arc<Self>> {
		Ok(Arc::new(Self {
			stream: RwLock::new(Stream::default()),
			services: args.services.clone(),
		}))
	}

	fn name(&self) -> &str { crate::service::make_name(std::module_path!()) }
}

/// The next index to be assigned.
#[implement(Service)]
#[must_use]
pub fn max(&self) -> u64 { self.stream.read().expect("locked").slots.len() as u64 }

/// Commit an event to the stream; the returned index is the commit point.
/// After installation the recipient set is derived and handed to the mux.
#[implement(Service)]
pub fn send(&self, event: Event) -> u64 {
	let index;
	{
		let mut stream = self.stream.write().expect("locked for writing");
		index = stream.slots.len() as u64;
		if let Some(old) = stream.index_of.insert(event.event_key(), index) {
			stream.slots[usize::try_from(old).expect("index fits usize")] = None;
		}

		stream.slots.push(Some(event.clone()));
	}

	let recipients = self.recipients(&event);
	self.services
		.sync
		.send(recipients.iter(), &IndexedEvent { event, index });

	index
}

/// Current members of the event's room; membership events whose target is
/// being invited, knocked back or banned additionally notify the target,
/// who is not (or no longer) a member.
#[implement(Service)]
fn recipients(&self, event: &Event) -> Vec<UserId> {
	let mut recipients = event
		.room_id()
		.map(|room_id| self.services.state_cache.users(room_id))
		.unwrap_or_default();

	if let Some(state) = event.as_state() {
		let notify_target = state.content.as_member().is_some_and(|member| {
			matches!(
				member.membership,
				Membership::Invite | Membership::Knock | Membership::Ban
			)
		});

		if notify_target {
			if let Ok(target) = UserId::parse(&state.state_key) {
				recipients.push(target);
			}
		}
	}

	recipients
}

/// Visibility-filtered point lookup by event id.
#[implement(Service)]
pub fn event(&self, viewer: &UserId, event_id: &EventId) -> Result<Event> {
	let room_set = self.services.state_cache.room_set(viewer);
	let stream = self.stream.read().expect("locked");

	stream
		.index_of
		.get(event_id.as_ref())
		.and_then(|index| stream.slots[usize::try_from(*index).expect("index fits usize")].clone())
		.filter(|event| visible(event, viewer, &room_set))
		.ok_or_else(|| err!(Request(NotFound("event not found: {event_id}"))))
}

/// Scan `[min(from, to), max(from, to))` in the indicated direction,
/// skipping overwritten slots, returning up to `limit` events that pass
/// the visibility filter, ordered by index in scan direction.
#[implement(Service)]
#[must_use]
pub fn range(
	&self,
	viewer: &UserId,
	room_set: &HashSet<RoomId>,
	from: u64,
	to: u64,
	limit: usize,
) -> Vec<IndexedEvent> {
	let mut result = Vec::new();
	if limit == 0 {
		return result;
	}

	let stream = self.stream.read().expect("locked");
	let max = stream.slots.len() as u64;
	let lo = usize::try_from(from.min(to).min(max)).expect("index fits usize");
	let hi = usize::try_from(from.max(to).min(max)).expect("index fits usize");
	let mut visit = |index: usize| {
		if let Some(event) = &stream.slots[index] {
			if visible(event, viewer, room_set) {
				result.push(IndexedEvent { event: event.clone(), index: index as u64 });
			}
		}

		result.len() < limit
	};

	if to < from {
		for index in (lo..hi).rev() {
			if !visit(index) {
				break;
			}
		}
	} else {
		for index in lo..hi {
			if !visit(index) {
				break;
			}
		}
	}

	result
}

/// Append a non-state event to a room, subject to the event-level power
/// threshold. The state-only event types cannot travel this path.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip(self, content))]
pub fn add_message(&self, room_id: &RoomId, sender: &UserId, content: Content) -> Result<Message> {
	self.services.state.check_exists(room_id)?;

	let kind = content.event_type();
	if event_auth::is_state_only_type(kind) {
		return Err!(Request(Forbidden(
			"sending a message event of the type {kind} is not permitted"
		)));
	}

	let power_levels = self.services.state.power_levels(room_id)?;
	event_auth::check_event_power(&power_levels, sender, kind)?;

	let message = Message {
		event_id: EventId::new(&utils::random_string(EVENT_ID_LENGTH), sender.domain().as_str()),
		room_id: room_id.clone(),
		user_id: sender.clone(),
		origin_server_ts: Timestamp::now(),
		content,
	};

	debug!(event_id = %message.event_id, "sending message");
	self.send(message.clone().into());

	Ok(message)
}

fn visible(event: &Event, viewer: &UserId, room_set: &HashSet<RoomId>) -> bool {
	if let Some(room_id) = event.room_id() {
		if room_set.contains(room_id) {
			return true;
		}
	}

	event.as_state().is_some_and(|state| {
		state.content.as_member().is_some() && UserId::parse(&state.state_key).is_ok_and(|target| target == *viewer)
	})
}
