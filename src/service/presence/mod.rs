use std::{
	collections::{HashMap, HashSet},
	sync::{
		Arc, RwLock,
		atomic::{AtomicU64, Ordering},
	},
};

use palaver_core::{
	Err, Result, implement,
	matrix::{
		IndexedEvent, Presence, PresenceEvent, User, UserId, UserProfile, UserStatus,
		user::LastActive,
	},
};
use tracing::debug;

/// The presence stream holds the authoritative per-user record (profile
/// and status). Every update commits a fresh index and fans the event out
/// to the subject's peers.
pub struct Service {
	users: RwLock<HashMap<UserId, IndexedUser>>,
	max: AtomicU64,
	services: Arc<crate::OnceServices>,
}

#[derive(Clone)]
struct IndexedUser {
	user: User,
	index: u64,
}

impl crate::Service for Service {
	fn build(args: crate::Args<'_>) -> Result<Arc<Self>> {
		Ok(Arc::new(Self {
			users: RwLock::new(HashMap::new()),
			max: AtomicU64::new(0),
			services: args.services.clone(),
		}))
	}

	fn name(&self) -> &str { crate::service::make_name(std::module_path!()) }
}

#[implement(Service)]
#[must_use]
pub fn max(&self) -> u64 { self.max.load(Ordering::Acquire) }

/// The current record of a user; a default record if none was written.
#[implement(Service)]
#[must_use]
pub fn user(&self, user_id: &UserId) -> User {
	self.users
		.read()
		.expect("locked")
		.get(user_id)
		.map(|indexed| indexed.user.clone())
		.unwrap_or_else(|| User::new(user_id.clone()))
}

#[implement(Service)]
#[must_use]
pub fn profile(&self, user_id: &UserId) -> UserProfile { self.user(user_id).profile }

#[implement(Service)]
#[must_use]
pub fn status(&self, user_id: &UserId) -> UserStatus { self.user(user_id).status }

/// Apply an update to a user's record, commit it at a fresh index and
/// fan it out to the user's peers.
#[implement(Service)]
fn update(&self, user_id: &UserId, update: impl FnOnce(&mut User)) -> IndexedEvent {
	let indexed;
	{
		let mut users = self.users.write().expect("locked for writing");
		let entry = users.entry(user_id.clone()).or_insert_with(|| IndexedUser {
			user: User::new(user_id.clone()),
			index: 0,
		});

		update(&mut entry.user);
		entry.index = self.max.fetch_add(1, Ordering::AcqRel);
		indexed = IndexedEvent {
			event: PresenceEvent { content: entry.user.clone() }.into(),
			index: entry.index,
		};
	}

	let peers = self.services.state_cache.peers(user_id);
	debug!(%user_id, index = indexed.index, "presence changed");
	self.services.sync.send(peers.iter(), &indexed);

	indexed
}

#[implement(Service)]
pub fn set_profile(&self, user_id: &UserId, profile: UserProfile) -> IndexedEvent {
	self.update(user_id, |user| user.profile = profile)
}

#[implement(Service)]
pub fn set_status(&self, user_id: &UserId, status: UserStatus) -> IndexedEvent {
	self.update(user_id, |user| user.status = status)
}

/// Owner-only presence update; merges the provided fields.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip(self))]
pub fn update_status(
	&self,
	user_id: &UserId,
	caller: &UserId,
	presence: Option<Presence>,
	status_message: Option<String>,
) -> Result<UserStatus> {
	if user_id != caller {
		return Err!(Request(Forbidden("can't change the presence of other users")));
	}

	let mut status = self.status(user_id);
	if let Some(presence) = presence {
		status.presence = presence;
	}

	if let Some(status_message) = status_message {
		status.status_message = status_message;
	}

	status.last_active = LastActive::now();
	self.set_status(user_id, status.clone());

	Ok(status)
}

/// Owner-only profile update; `None` fields are left unchanged.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip(self))]
pub fn update_profile(
	&self,
	user_id: &UserId,
	caller: &UserId,
	displayname: Option<String>,
	avatar_url: Option<String>,
) -> Result<UserProfile> {
	if user_id != caller {
		return Err!(Request(Forbidden("can't change the profile of other users")));
	}

	let mut profile = self.profile(user_id);
	if let Some(displayname) = displayname {
		profile.displayname = displayname;
	}

	if let Some(avatar_url) = avatar_url {
		profile.avatar_url = avatar_url;
	}

	self.set_profile(user_id, profile.clone());

	Ok(profile)
}

/// Presence events are visible when their subject is in the viewer's peer
/// set.
#[implement(Service)]
#[must_use]
pub fn range(
	&self,
	user_set: &HashSet<UserId>,
	from: u64,
	to: u64,
	limit: usize,
) -> Vec<IndexedEvent> {
	let (lo, hi) = (from.min(to), from.max(to));
	let mut result: Vec<IndexedEvent> = {
		let users = self.users.read().expect("locked");
		user_set
			.iter()
			.filter_map(|user_id| users.get(user_id))
			.filter(|indexed| indexed.index >= lo && indexed.index < hi)
			.map(|indexed| IndexedEvent {
				event: PresenceEvent { content: indexed.user.clone() }.into(),
				index: indexed.index,
			})
			.collect()
	};

	result.sort_by_key(|indexed| indexed.index);
	if to < from {
		result.reverse();
	}

	result.truncate(limit);

	result
}
