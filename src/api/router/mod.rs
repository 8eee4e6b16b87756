mod auth;

use std::sync::Arc;

use axum::{
	Router,
	routing::{get, post, put},
};
use palaver_service::Services;

pub(crate) use self::auth::Sender;
use crate::client;

/// Shared state of every handler: the service web.
pub(crate) type State = Arc<Services>;

/// Mount the client API under its version prefix.
#[must_use]
pub fn build(services: Arc<Services>) -> Router {
	Router::new()
		.nest("/_matrix/client/api/v1", routes())
		.with_state(services)
}

fn routes() -> Router<State> {
	Router::new()
		.route("/login", get(client::session::get_login_flows))
		.route("/login", post(client::session::login))
		.route("/register", get(client::session::get_register_flows))
		.route("/register", post(client::session::register))
		.route("/createRoom", post(client::create_room::create_room))
		.route("/rooms/{room_id}/invite", post(client::membership::invite))
		.route("/rooms/{room_id}/join", post(client::membership::join))
		.route("/rooms/{room_id}/knock", post(client::membership::knock))
		.route("/rooms/{room_id}/leave", post(client::membership::leave))
		.route("/rooms/{room_id}/kick", post(client::membership::kick))
		.route("/rooms/{room_id}/ban", post(client::membership::ban))
		.route(
			"/rooms/{room_id}/send/{event_type}",
			post(client::message::send_message).put(client::message::send_message),
		)
		.route(
			"/rooms/{room_id}/send/{event_type}/{txn_id}",
			post(client::message::send_message_txn).put(client::message::send_message_txn),
		)
		.route("/rooms/{room_id}/state/{event_type}", put(client::state::set_state))
		.route(
			"/rooms/{room_id}/state/{event_type}/{state_key}",
			put(client::state::set_state_for_key),
		)
		.route("/rooms/{room_id}/state", get(client::state::get_state))
		.route("/rooms/{room_id}/members", get(client::state::get_members))
		.route("/rooms/{room_id}/messages", get(client::messages::get_messages))
		.route("/rooms/{room_id}/initialSync", get(client::sync::room_initial_sync))
		.route("/rooms/{room_id}/typing/{user_id}", put(client::typing::set_typing))
		.route("/initialSync", get(client::sync::initial_sync))
		.route("/events", get(client::events::get_events))
		.route("/events/{event_id}", put(client::events::get_event))
		.route(
			"/profile/{user_id}/displayname",
			get(client::profile::get_displayname).put(client::profile::set_displayname),
		)
		.route(
			"/profile/{user_id}/avatar_url",
			get(client::profile::get_avatar_url).put(client::profile::set_avatar_url),
		)
		.route("/profile/{user_id}", get(client::profile::get_profile))
		.route(
			"/presence/{user_id}/status",
			get(client::presence::get_status).put(client::presence::set_status),
		)
}
