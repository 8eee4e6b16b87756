mod watch;

use std::{
	collections::{HashMap, HashSet},
	sync::{Arc, Mutex},
};

use palaver_core::{
	Err, Result, implement,
	matrix::{
		Event, EventId, IndexedEvent, Membership, RoomId, State, StreamToken, UserId, Visibility,
	},
};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

/// Composite range queries and initial-sync snapshots across the three
/// streams, and the per-user long-poll waiters fed by them (see `watch`).
pub struct Service {
	watchers: Mutex<Watchers>,
	services: Arc<crate::OnceServices>,
}

type Watchers = HashMap<UserId, Vec<mpsc::Sender<IndexedEvent>>>;

impl crate::Service for Service {
	fn build(args: crate::Args<'_>) -> Result<Arc<Self>> {
		Ok(Arc::new(Self {
			watchers: Mutex::new(HashMap::new()),
			services: args.services.clone(),
		}))
	}

	fn name(&self) -> &str { crate::service::make_name(std::module_path!()) }
}

/// A chunk of events between two composite cursors.
#[derive(Clone, Debug, Serialize)]
pub struct EventRange {
	pub start: StreamToken,
	pub end: StreamToken,
	pub chunk: Vec<Event>,
}

#[derive(Clone, Debug, Serialize)]
pub struct InitialSync {
	pub end: StreamToken,
	pub presence: Vec<Event>,
	pub rooms: Vec<RoomSummary>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RoomSummary {
	pub membership: Membership,
	pub room_id: RoomId,
	pub messages: Vec<Event>,
	pub state: Vec<State>,
	pub visibility: Visibility,
}

#[derive(Clone, Debug, Serialize)]
pub struct RoomInitialSync {
	#[serde(flatten)]
	pub summary: RoomSummary,
	pub presence: Vec<Event>,
}

/// Composite range over all three streams, in forward order. When the
/// request has no upper bound or the client has caught up, a waiter is
/// parked on the mux before scanning, so an event landing during the scan
/// is observable; if the scan comes back empty the call blocks on the
/// waiter until delivery or cancellation.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip(self, cancel), fields(%viewer))]
pub async fn range(
	&self,
	viewer: &UserId,
	from: Option<StreamToken>,
	to: Option<StreamToken>,
	limit: usize,
	cancel: oneshot::Receiver<()>,
) -> Result<EventRange> {
	let caught_up = match (&from, &to) {
		| (Some(from), Some(to)) => from.messages > to.messages,
		| _ => true,
	};

	let mut receiver = caught_up.then(|| self.listen(viewer, cancel));

	let max = StreamToken::new(
		self.services.timeline.max(),
		self.services.presence.max(),
		self.services.typing.max(),
	);

	let from = from.unwrap_or(max);
	let bound = to.unwrap_or(max);

	let user_set = self.services.state_cache.peers(viewer);
	let room_set = self.services.state_cache.room_set(viewer);

	let mut messages = forward(from.messages, bound.messages, || {
		self.services
			.timeline
			.range(viewer, &room_set, from.messages, bound.messages, limit)
	});
	let mut presences = forward(from.presence, bound.presence, || {
		self.services
			.presence
			.range(&user_set, from.presence, bound.presence, limit)
	});
	let mut typings = forward(from.typing, bound.typing, || {
		self.services
			.typing
			.range(&room_set, from.typing, bound.typing, limit)
	});

	if let Some(receiver) = &mut receiver {
		let blocking = to.is_none_or(|to| {
			to.messages > max.messages || to.presence > max.presence || to.typing > max.typing
		});

		let empty = messages.is_empty() && presences.is_empty() && typings.is_empty();
		let event = if blocking && empty {
			receiver.recv().await
		} else {
			receiver.try_recv().ok()
		};

		if let Some(event) = event {
			if messages.len() < limit {
				let list = match &event.event {
					| Event::Presence(_) => &mut presences,
					| Event::Typing(_) => &mut typings,
					| _ => &mut messages,
				};

				let ceiling = to.map(|to| match &event.event {
					| Event::Presence(_) => to.presence,
					| Event::Typing(_) => to.typing,
					| _ => to.messages,
				});

				let newer = list.last().is_none_or(|last| last.index < event.index);
				if newer && ceiling.is_none_or(|ceiling| event.index < ceiling) {
					list.push(event);
				}
			}
		}
	}

	let end = StreamToken::new(
		messages.last().map_or(from.messages, |last| last.index + 1),
		presences.last().map_or(from.presence, |last| last.index + 1),
		typings.last().map_or(from.typing, |last| last.index + 1),
	);

	let chunk = messages
		.into_iter()
		.chain(presences)
		.chain(typings)
		.map(|indexed| indexed.event)
		.collect();

	Ok(EventRange { start: from, end, chunk })
}

/// Non-blocking range over one room's messages; backward when `to` lies
/// before `from`. Defaults paginate backward from the stream head.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip(self), fields(%viewer, %room_id))]
pub fn messages(
	&self,
	viewer: &UserId,
	room_id: &RoomId,
	from: Option<StreamToken>,
	to: Option<StreamToken>,
	limit: usize,
) -> Result<EventRange> {
	self.services.state.check_exists(room_id)?;
	if self.services.state.user_membership(room_id, viewer)? != Membership::Join {
		return Err!(Request(Forbidden("cannot read room messages, not a member")));
	}

	let max = self.services.timeline.max();
	let from = from.map_or(max, |token| token.messages);
	let to = to.map_or(0, |token| token.messages);

	let room_set = HashSet::from([room_id.clone()]);
	let events = self
		.services
		.timeline
		.range(viewer, &room_set, from, to, limit);

	let backward = to < from;
	let end = events.last().map_or(from, |last| {
		if backward { last.index } else { last.index + 1 }
	});

	Ok(EventRange {
		start: StreamToken::new(from, 0, 0),
		end: StreamToken::new(end, 0, 0),
		chunk: events.into_iter().map(|indexed| indexed.event).collect(),
	})
}

/// Snapshot of everything the user can see: the presences of their peers
/// and a summary of every room they are joined to.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip(self))]
pub fn full_sync(&self, user_id: &UserId, limit: usize) -> Result<InitialSync> {
	let end = StreamToken::new(
		self.services.timeline.max(),
		self.services.presence.max(),
		self.services.typing.max(),
	);

	let user_set = self.services.state_cache.peers(user_id);
	let presence = self
		.services
		.presence
		.range(&user_set, 0, end.presence, limit)
		.into_iter()
		.map(|indexed| indexed.event)
		.collect();

	let rooms = self
		.services
		.state_cache
		.rooms(user_id)
		.iter()
		.map(|room_id| self.room_summary(user_id, room_id, end.messages, limit))
		.collect::<Result<Vec<_>>>()?;

	Ok(InitialSync { end, presence, rooms })
}

/// One room's summary plus the presence snapshot of its members.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip(self), fields(%user_id, %room_id))]
pub fn room_sync(&self, user_id: &UserId, room_id: &RoomId, limit: usize) -> Result<RoomInitialSync> {
	self.services.state.check_exists(room_id)?;
	if self.services.state.user_membership(room_id, user_id)? != Membership::Join {
		return Err!(Request(Forbidden("cannot sync room, not a member")));
	}

	let user_set: HashSet<UserId> = self
		.services
		.state_cache
		.users(room_id)
		.into_iter()
		.collect();

	let presence = self
		.services
		.presence
		.range(&user_set, 0, self.services.presence.max(), limit)
		.into_iter()
		.map(|indexed| indexed.event)
		.collect();

	let summary = self.room_summary(user_id, room_id, self.services.timeline.max(), limit)?;

	Ok(RoomInitialSync { summary, presence })
}

#[implement(Service)]
fn room_summary(
	&self,
	user_id: &UserId,
	room_id: &RoomId,
	max_messages: u64,
	limit: usize,
) -> Result<RoomSummary> {
	let room_set = HashSet::from([room_id.clone()]);
	let messages = self
		.services
		.timeline
		.range(user_id, &room_set, max_messages, 0, limit)
		.into_iter()
		.map(|indexed| indexed.event)
		.collect();

	Ok(RoomSummary {
		membership: self.services.state.user_membership(room_id, user_id)?,
		room_id: room_id.clone(),
		messages,
		state: self.services.state.entire_room_state(room_id)?,
		visibility: self.services.state.join_rule(room_id)?.to_visibility(),
	})
}

/// Visibility-filtered single-event lookup.
#[implement(Service)]
pub fn event(&self, viewer: &UserId, event_id: &EventId) -> Result<Event> {
	self.services.timeline.event(viewer, event_id)
}

/// The composite assembly is forward-only: an exhausted or inverted window
/// yields nothing rather than a backward scan.
fn forward(from: u64, to: u64, range: impl FnOnce() -> Vec<IndexedEvent>) -> Vec<IndexedEvent> {
	if from >= to {
		return Vec::new();
	}

	range()
}
