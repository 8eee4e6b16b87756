use std::sync::Arc;

use palaver_core::{
	Err, Result, implement,
	matrix::{
		Membership, RoomAliasId, RoomDescription, RoomId, UserId,
		content::{
			AliasesContent, Content, CreateContent, JoinRulesContent, MemberContent, NameContent,
			TopicContent,
		},
		power_levels::PowerLevelsContent,
	},
	utils,
};
use tracing::{debug, info};

const ROOM_ID_LENGTH: usize = 16;

/// Materializes new rooms: reserves the alias, allocates the room, then
/// installs the required initial state in order.
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
#[tracing::instrument(level = "debug", skip(self, desc), fields(%creator))]
pub fn create_room(
	&self,
	creator: &UserId,
	desc: &RoomDescription,
) -> Result<(RoomId, Option<RoomAliasId>)> {
	let domain = self.services.globals.server_name();

	// The alias is reserved before the room exists and claimed after, so a
	// concurrent creation of the same alias loses cleanly.
	let alias = match &desc.alias {
		| Some(localpart) if localpart.is_empty() =>
			return Err!(Request(BadJson("room_alias_name must not be empty"))),
		| Some(localpart) => {
			let alias = RoomAliasId::new(localpart, domain);
			self.services.alias.reserve(&alias)?;
			Some(alias)
		},
		| None => None,
	};

	let room_id = RoomId::new(&utils::random_string(ROOM_ID_LENGTH), domain);
	if self.services.state.create_room(&room_id) {
		return Err!(Request(RoomInUse("room '{room_id}' already exists")));
	}

	if let Some(alias) = &alias {
		self.services.alias.claim(alias, &room_id)?;
	}

	// The creator is a member from the first event on, so every initial
	// state event reaches them through the stream.
	self.services.state_cache.add_member(&room_id, creator)?;

	let send_state = |content: Content, state_key: &str| {
		self.services
			.state
			.send_state(&room_id, creator, content, state_key)
	};

	// 1. The create event.
	send_state(Content::Create(CreateContent { creator: creator.clone() }), "")?;

	// 2. The creator joins, with their profile snapshot.
	let membership = MemberContent::new(Membership::Join)
		.with_profile(self.services.presence.profile(creator));
	send_state(Content::Member(membership), &creator.to_string())?;

	// 3. Power level defaults.
	send_state(
		Content::PowerLevels(PowerLevelsContent::with_creator(creator)),
		"",
	)?;

	// 4. Join rules, from the requested visibility.
	send_state(
		Content::JoinRules(JoinRulesContent { join_rule: desc.visibility.to_join_rule() }),
		"",
	)?;

	// 5. The alias list.
	if let Some(alias) = &alias {
		send_state(
			Content::Aliases(AliasesContent { aliases: vec![alias.clone()] }),
			"",
		)?;
	}

	// 6. Name.
	if let Some(name) = &desc.name {
		send_state(Content::Name(NameContent { name: name.clone() }), "")?;
	}

	// 7. Topic.
	if let Some(topic) = &desc.topic {
		send_state(Content::Topic(TopicContent { topic: topic.clone() }), "")?;
	}

	// 8. Invites.
	for invited in &desc.invited {
		debug!(%invited, "inviting user at room creation");
		send_state(
			Content::Member(MemberContent::new(Membership::Invite)),
			&invited.to_string(),
		)?;
	}

	info!(%room_id, "created room");

	Ok((room_id, alias))
}
