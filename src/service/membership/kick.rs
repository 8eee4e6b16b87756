use palaver_core::{
	Result, implement,
	matrix::{Membership, RoomId, State, UserId},
};

use super::Service;

/// Force another user out of the room; requires the kick power threshold.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip_all, fields(%sender, %room_id, %user_id))]
pub fn kick(&self, sender: &UserId, room_id: &RoomId, user_id: &UserId) -> Result<State> {
	self.membership_change(room_id, sender, user_id, Membership::Leave)
}
