use palaver_core::{
	Result, implement,
	matrix::{Membership, RoomId, State, UserId},
};

use super::Service;

/// Join a room: directly for public rooms, by accepting a pending invite
/// otherwise. The sender's profile snapshot is attached to the membership
/// event.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip_all, fields(%sender, %room_id))]
pub fn join(&self, sender: &UserId, room_id: &RoomId) -> Result<State> {
	self.membership_change(room_id, sender, sender, Membership::Join)
}

/// Let a knocking user in. Only a member holding the invite threshold may
/// do this; the knocker cannot admit themselves.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip_all, fields(%sender, %room_id, %user_id))]
pub fn admit(&self, sender: &UserId, room_id: &RoomId, user_id: &UserId) -> Result<State> {
	self.membership_change(room_id, sender, user_id, Membership::Join)
}
