use palaver_core::{
	Result, implement,
	matrix::{Membership, RoomId, State, UserId},
};

use super::Service;

/// Invite a user into a room. The room must be invite-only and the sender
/// needs the invite power threshold.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip_all, fields(%sender, %room_id, %user_id))]
pub fn invite(&self, sender: &UserId, room_id: &RoomId, user_id: &UserId) -> Result<State> {
	self.membership_change(room_id, sender, user_id, Membership::Invite)
}
