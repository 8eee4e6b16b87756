//! Authorization rules for room mutations: power-level arbitration and the
//! membership state machine. These are pure decisions over state the caller
//! has already fetched; the service layer owns the stores.

use super::{JoinRule, Membership, PowerLevelsContent, UserId, content::event_type};
use crate::{Err, Result};

/// Event types which may only be sent as state events.
#[must_use]
pub fn is_state_only_type(kind: &str) -> bool {
	matches!(
		kind,
		event_type::CREATE
			| event_type::NAME
			| event_type::TOPIC
			| event_type::JOIN_RULES
			| event_type::POWER_LEVELS
			| event_type::ALIASES
			| event_type::MEMBER
	)
}

/// Reject unless the sender's effective level reaches the required level.
pub fn check_power(power_levels: &PowerLevelsContent, sender: &UserId, required: i64) -> Result {
	let level = power_levels.user_level(sender);
	if level < required {
		return Err!(Request(Forbidden(
			"not enough power level to perform action ({level} < {required})"
		)));
	}

	Ok(())
}

/// Reject unless the sender may emit an event of this type.
pub fn check_event_power(
	power_levels: &PowerLevelsContent,
	sender: &UserId,
	kind: &str,
) -> Result {
	check_power(power_levels, sender, power_levels.event_level(kind))
}

/// Decide a membership transition of `target` from `current` to `new`,
/// requested by `sender`. Returns the admitted transition; every rejection
/// is a policy error for the client.
pub fn check_membership_change(
	power_levels: &PowerLevelsContent,
	join_rule: JoinRule,
	sender: &UserId,
	target: &UserId,
	current: Membership,
	new: Membership,
) -> Result {
	use Membership::*;

	if current == new {
		return Err!(Request(Forbidden("membership change was a no-op")));
	}

	match new {
		| None => {
			if current != Ban {
				return Err!(Request(BadJson(
					"invalid or missing membership in membership change"
				)));
			}
			check_power(power_levels, sender, power_levels.ban)?;
			if target == sender {
				return Err!(Request(Forbidden("cannot remove a ban from self")));
			}
		},

		| Invite => {
			if current != None {
				return Err!(Request(Forbidden(
					"could not invite user to room, already have membership '{current}'"
				)));
			}
			check_join_rule(join_rule, JoinRule::Invite)?;
			check_power(power_levels, sender, power_levels.invite)?;
		},

		| Join => match current {
			| None => check_join_rule(join_rule, JoinRule::Public)?,
			| Invite =>
				if target != sender {
					return Err!(Request(Forbidden("cannot force other users to join the room")));
				},
			| Knock => {
				if target == sender {
					return Err!(Request(Forbidden("cannot let yourself in after knocking")));
				}
				check_power(power_levels, sender, power_levels.invite)?;
			},
			| Ban =>
				if target == sender {
					return Err!(Request(Forbidden("you are banned from that room")));
				} else {
					return Err!(Request(Forbidden("that user is banned from this room")));
				},
			| Join | Leave => {},
		},

		| Knock => {
			if target != sender {
				return Err!(Request(Forbidden("cannot force other users to knock")));
			}
			if current != None {
				return Err!(Request(Forbidden(
					"could not knock on room, already have membership '{current}'"
				)));
			}
			check_join_rule(join_rule, JoinRule::Knock)?;
		},

		| Leave => {
			if current == None {
				return Err!(Request(Forbidden("tried to leave a room without current membership")));
			}
			if current == Ban {
				return Err!(Request(Forbidden("tried to leave room with current membership 'ban'")));
			}
			if target != sender {
				check_power(power_levels, sender, power_levels.kick)?;
			}
		},

		| Ban => {
			if target == sender {
				return Err!(Request(Forbidden("cannot ban self")));
			}
			check_power(power_levels, sender, power_levels.ban)?;
		},
	}

	Ok(())
}

fn check_join_rule(join_rule: JoinRule, requested: JoinRule) -> Result {
	if join_rule != requested {
		return Err!(Request(Forbidden("room does not allow join method: {requested}")));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::{check_membership_change, check_power};
	use crate::matrix::{JoinRule, Membership, PowerLevelsContent, UserId};

	fn setup() -> (PowerLevelsContent, UserId, UserId) {
		let alice = UserId::new("alice", "example.org");
		let bob = UserId::new("bob", "example.org");
		let power_levels = PowerLevelsContent::with_creator(&alice);
		(power_levels, alice, bob)
	}

	#[test]
	fn noop_transition_is_forbidden() {
		let (pl, alice, bob) = setup();
		let res = check_membership_change(
			&pl,
			JoinRule::Public,
			&alice,
			&bob,
			Membership::Join,
			Membership::Join,
		);
		assert!(res.is_err());
	}

	#[test]
	fn join_requires_public_room_from_none() {
		let (pl, _, bob) = setup();
		assert!(
			check_membership_change(
				&pl,
				JoinRule::Invite,
				&bob,
				&bob,
				Membership::None,
				Membership::Join,
			)
			.is_err()
		);
		assert!(
			check_membership_change(
				&pl,
				JoinRule::Public,
				&bob,
				&bob,
				Membership::None,
				Membership::Join,
			)
			.is_ok()
		);
	}

	#[test]
	fn invited_user_joins_only_themselves() {
		let (pl, alice, bob) = setup();
		assert!(
			check_membership_change(
				&pl,
				JoinRule::Invite,
				&alice,
				&bob,
				Membership::Invite,
				Membership::Join,
			)
			.is_err()
		);
		assert!(
			check_membership_change(
				&pl,
				JoinRule::Invite,
				&bob,
				&bob,
				Membership::Invite,
				Membership::Join,
			)
			.is_ok()
		);
	}

	#[test]
	fn banned_user_cannot_join_or_leave() {
		let (pl, _, bob) = setup();
		assert!(
			check_membership_change(
				&pl,
				JoinRule::Public,
				&bob,
				&bob,
				Membership::Ban,
				Membership::Join,
			)
			.is_err()
		);
		assert!(
			check_membership_change(
				&pl,
				JoinRule::Public,
				&bob,
				&bob,
				Membership::Ban,
				Membership::Leave,
			)
			.is_err()
		);
	}

	#[test]
	fn kick_and_ban_respect_power_levels() {
		let (pl, alice, bob) = setup();

		// bob lacks the kick threshold
		assert!(
			check_membership_change(
				&pl,
				JoinRule::Public,
				&bob,
				&alice,
				Membership::Join,
				Membership::Leave,
			)
			.is_err()
		);

		// the creator holds level 100
		assert!(
			check_membership_change(
				&pl,
				JoinRule::Public,
				&alice,
				&bob,
				Membership::Join,
				Membership::Ban,
			)
			.is_ok()
		);
		assert!(check_power(&pl, &bob, pl.ban).is_err());
	}

	#[test]
	fn unban_needs_ban_state_and_other_target() {
		let (pl, alice, bob) = setup();
		assert!(
			check_membership_change(
				&pl,
				JoinRule::Public,
				&alice,
				&bob,
				Membership::Ban,
				Membership::None,
			)
			.is_ok()
		);
		assert!(
			check_membership_change(
				&pl,
				JoinRule::Public,
				&alice,
				&alice,
				Membership::Ban,
				Membership::None,
			)
			.is_err()
		);
		assert!(
			check_membership_change(
				&pl,
				JoinRule::Public,
				&alice,
				&bob,
				Membership::Leave,
				Membership::None,
			)
			.is_err()
		);
	}

	#[test]
	fn knock_flow() {
		let (pl, alice, bob) = setup();

		// knocking at a knock room, only for yourself
		assert!(
			check_membership_change(
				&pl,
				JoinRule::Knock,
				&bob,
				&bob,
				Membership::None,
				Membership::Knock,
			)
			.is_ok()
		);
		assert!(
			check_membership_change(
				&pl,
				JoinRule::Knock,
				&alice,
				&bob,
				Membership::None,
				Membership::Knock,
			)
			.is_err()
		);

		// a privileged member lets the knocker in; the knocker cannot
		assert!(
			check_membership_change(
				&pl,
				JoinRule::Knock,
				&alice,
				&bob,
				Membership::Knock,
				Membership::Join,
			)
			.is_ok()
		);
		assert!(
			check_membership_change(
				&pl,
				JoinRule::Knock,
				&bob,
				&bob,
				Membership::Knock,
				Membership::Join,
			)
			.is_err()
		);
	}
}
