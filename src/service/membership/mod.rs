mod ban;
mod invite;
mod join;
mod kick;
mod knock;
mod leave;
mod unban;

use std::sync::Arc;

use palaver_core::{
	Result, implement,
	matrix::{
		Content, Membership, RoomId, State, UserId,
		content::MemberContent,
		event_auth,
	},
};
use tracing::debug;

/// The membership state machine: every membership mutation funnels through
/// [`Self::membership_change`], which authorizes the transition, keeps the
/// membership relation in lockstep with room state, writes the state event
/// and emits it to the message stream.
pub struct Service {
	services: Arc<crate::OnceServices>,
}

impl crate::Service for Service {
	fn build(args: crate::Args<'_>) -> Result<Arc<Self>> {
		Ok(Arc::new(Self { services: args.services.clone() }))
	}

	fn name(&self) -> &str { crate::service::make_name(std::module_path!()) }
}

#[implement(Service)]
#[tracing::instrument(
	level = "debug",
	skip(self),
	fields(%room_id, %sender, %target, %new)
)]
pub fn membership_change(
	&self,
	room_id: &RoomId,
	sender: &UserId,
	target: &UserId,
	new: Membership,
) -> Result<State> {
	self.services.state.check_exists(room_id)?;

	let current = self.services.state.user_membership(room_id, target)?;
	let power_levels = self.services.state.power_levels(room_id)?;
	let join_rule = self.services.state.join_rule(room_id)?;

	event_auth::check_membership_change(
		&power_levels,
		join_rule,
		sender,
		target,
		current,
		new,
	)?;

	let mut content = MemberContent::new(new);
	if new == Membership::Join {
		content = content.with_profile(self.services.presence.profile(sender));
	}

	// The membership relation is updated before the state write so the
	// emitted event's recipient set reflects the new membership.
	if new == Membership::Join {
		self.services.state_cache.add_member(room_id, target)?;
	} else if current == Membership::Join {
		self.services.state_cache.remove_member(room_id, target)?;
	}

	debug!(%current, "membership transition admitted");

	self.services
		.state
		.send_state(room_id, sender, Content::Member(content), &target.to_string())
}
