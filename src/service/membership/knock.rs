use palaver_core::{
	Result, implement,
	matrix::{Membership, RoomId, State, UserId},
};

use super::Service;

/// Knock on a room whose join rule is `knock`, asking a member to let the
/// sender in.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip_all, fields(%sender, %room_id))]
pub fn knock(&self, sender: &UserId, room_id: &RoomId) -> Result<State> {
	self.membership_change(room_id, sender, sender, Membership::Knock)
}
