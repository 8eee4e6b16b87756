use std::{
	collections::{HashMap, HashSet},
	sync::{
		Arc, RwLock,
		atomic::{AtomicU64, Ordering},
	},
};

use palaver_core::{
	Result, implement,
	matrix::{Event, IndexedEvent, RoomId, TypingEvent, UserId, event::TypingContent},
};
use tracing::debug;

/// The typing stream: one slot per room holding the set of currently
/// typing users, re-indexed on every change and fanned out to the room's
/// members.
pub struct Service {
	states: RwLock<HashMap<RoomId, IndexedEvent>>,
	max: AtomicU64,
	services: Arc<crate::OnceServices>,
}

impl crate::Service for Service {
	fn build(args: crate::Args<'_>) -> Result<Arc<Self>> {
		Ok(Arc::new(Self {
			states: RwLock::new(HashMap::new()),
			max: AtomicU64::new(0),
			services: args.services.clone(),
		}))
	}

	fn name(&self) -> &str { crate::service::make_name(std::module_path!()) }
}

#[implement(Service)]
#[must_use]
pub fn max(&self) -> u64 { self.max.load(Ordering::Acquire) }

/// Sets or clears a user's typing notification in a room.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip(self))]
pub fn set_typing(&self, room_id: &RoomId, user_id: &UserId, typing: bool) -> Result {
	self.services.state.check_exists(room_id)?;

	let indexed;
	{
		let mut states = self.states.write().expect("locked for writing");
		let entry = states.entry(room_id.clone()).or_insert_with(|| IndexedEvent {
			event: TypingEvent {
				room_id: room_id.clone(),
				content: TypingContent::default(),
			}
			.into(),
			index: 0,
		});

		let Event::Typing(event) = &mut entry.event else {
			unreachable!("typing stream only stores typing events");
		};

		let user_ids = &mut event.content.user_ids;
		if typing {
			if user_ids.contains(user_id) {
				return Ok(());
			}

			user_ids.push(user_id.clone());
		} else if let Some(position) = user_ids.iter().position(|member| member == user_id) {
			user_ids.swap_remove(position);
		}

		entry.index = self.max.fetch_add(1, Ordering::AcqRel);
		indexed = entry.clone();
	}

	let recipients = self.services.state_cache.users(room_id);
	debug!(index = indexed.index, "typing changed");
	self.services.sync.send(recipients.iter(), &indexed);

	Ok(())
}

/// The set of users currently typing in a room.
#[implement(Service)]
#[must_use]
pub fn typing(&self, room_id: &RoomId) -> Vec<UserId> {
	let states = self.states.read().expect("locked");
	let Some(indexed) = states.get(room_id) else {
		return Vec::new();
	};

	match &indexed.event {
		| Event::Typing(event) => event.content.user_ids.clone(),
		| _ => Vec::new(),
	}
}

/// Typing events are visible when their room is in the viewer's room set.
#[implement(Service)]
#[must_use]
pub fn range(
	&self,
	room_set: &HashSet<RoomId>,
	from: u64,
	to: u64,
	limit: usize,
) -> Vec<IndexedEvent> {
	let (lo, hi) = (from.min(to), from.max(to));
	let mut result: Vec<IndexedEvent> = {
		let states = self.states.read().expect("locked");
		room_set
			.iter()
			.filter_map(|room_id| states.get(room_id))
			.filter(|indexed| indexed.index >= lo && indexed.index < hi)
			.cloned()
			.collect()
	};

	result.sort_by_key(|indexed| indexed.index);
	if to < from {
		result.reverse();
	}

	result.truncate(limit);

	result
}
