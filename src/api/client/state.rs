use axum::{
	Json,
	extract::{Path, State, rejection::JsonRejection},
};
use palaver_core::{
	Err, Result, UserId,
	matrix::{Content, Membership, RoomId, content::event_type},
};
use serde_json::{Value, json};

use super::utils;
use crate::Sender;

/// # `PUT /_matrix/client/api/v1/rooms/{roomId}/state/{eventType}`
///
/// State event with an empty state key.
pub(crate) async fn set_state(
	state: State<crate::State>,
	Path((room_id, event_type)): Path<(String, String)>,
	sender: Sender,
	body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
	put_state(state, sender, &room_id, &event_type, "", body)
}

/// # `PUT /_matrix/client/api/v1/rooms/{roomId}/state/{eventType}/{stateKey}`
pub(crate) async fn set_state_for_key(
	state: State<crate::State>,
	Path((room_id, event_type, state_key)): Path<(String, String, String)>,
	sender: Sender,
	body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
	put_state(state, sender, &room_id, &event_type, &state_key, body)
}

fn put_state(
	State(services): State<crate::State>,
	Sender(sender): Sender,
	room_id: &str,
	event_type: &str,
	state_key: &str,
	body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
	let room_id = RoomId::parse(room_id)?;
	let content = Content::from_parts(event_type, utils::body(body)?)?;
	let event = services
		.state
		.set_state(&room_id, &sender, content, state_key)?;

	Ok(Json(json!({ "event_id": event.event_id })))
}

/// # `GET /_matrix/client/api/v1/rooms/{roomId}/state`
///
/// The entire current state of the room; members only.
pub(crate) async fn get_state(
	State(services): State<crate::State>,
	Path(room_id): Path<String>,
	Sender(sender): Sender,
) -> Result<Json<Value>> {
	let room_id = RoomId::parse(&room_id)?;
	check_member(&services, &room_id, &sender)?;

	Ok(Json(serde_json::to_value(
		services.state.entire_room_state(&room_id)?,
	)?))
}

/// # `GET /_matrix/client/api/v1/rooms/{roomId}/members`
///
/// The membership state events of the room; members only.
pub(crate) async fn get_members(
	State(services): State<crate::State>,
	Path(room_id): Path<String>,
	Sender(sender): Sender,
) -> Result<Json<Value>> {
	let room_id = RoomId::parse(&room_id)?;
	check_member(&services, &room_id, &sender)?;

	let chunk: Vec<_> = services
		.state
		.entire_room_state(&room_id)?
		.into_iter()
		.filter(|state| state.content.event_type() == event_type::MEMBER)
		.collect();

	Ok(Json(json!({ "chunk": chunk })))
}

fn check_member(services: &crate::State, room_id: &RoomId, sender: &UserId) -> Result {
	if services.state.user_membership(room_id, sender)? != Membership::Join {
		return Err!(Request(Forbidden("cannot read room state, not a member")));
	}

	Ok(())
}
