use palaver_core::{
	Result, implement,
	matrix::{Membership, RoomId, State, UserId},
};

use super::Service;

/// Lift a ban, returning the target to no membership at all. Requires the
/// ban power threshold; a ban cannot be lifted from oneself.
#[implement(Service)]
#[tracing::instrument(level = "debug", skip_all, fields(%sender, %room_id, %user_id))]
pub fn unban(&self, sender: &UserId, room_id: &RoomId, user_id: &UserId) -> Result<State> {
	self.membership_change(room_id, sender, user_id, Membership::None)
}
