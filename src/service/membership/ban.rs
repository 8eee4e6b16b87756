use palaver_core::{
	Result, implement,
	matrix::{Membership, RoomId, State, UserId},
};

use super::Service;

/// Ban a user from the room; requires the ban power threshold. A banned
/// user cannot rejoin until unbanned.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip_all, fields(%sender, %room_id, %user_id))]
pub fn ban(&self, sender: &UserId, room_id: &RoomId, user_id: &UserId) -> Result<State> {
	self.membership_change(room_id, sender, user_id, Membership::Ban)
}
