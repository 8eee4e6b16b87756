use palaver_core::{
	Result, implement,
	matrix::{Membership, RoomId, State, UserId},
};

use super::Service;

/// Leave a room, or retract an invite or knock.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip_all, fields(%sender, %room_id))]
pub fn leave(&self, sender: &UserId, room_id: &RoomId) -> Result<State> {
	self.membership_change(room_id, sender, sender, Membership::Leave)
}
