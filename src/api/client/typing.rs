use axum::{
	Json,
	extract::{Path, State, rejection::JsonRejection},
};
use palaver_core::{Err, Result, UserId, matrix::RoomId};
use serde::Deserialize;
use serde_json::Value;

use super::utils;
use crate::Sender;

#[derive(Deserialize)]
pub(crate) struct TypingRequest {
	typing: bool,

	// Accepted for wire compatibility; expiry is not tracked server-side.
	#[serde(rename = "timeout")]
	_timeout: Option<u64>,
}

/// # `PUT /_matrix/client/api/v1/rooms/{roomId}/typing/{userId}`
///
/// Sets or clears the caller's typing notification in the room.
pub(crate) async fn set_typing(
	State(services): State<crate::State>,
	Path((room_id, user_id)): Path<(String, String)>,
	Sender(sender): Sender,
	body: Result<Json<TypingRequest>, JsonRejection>,
) -> Result<Json<Value>> {
	let room_id = RoomId::parse(&room_id)?;
	let user_id = UserId::parse(&user_id)?;
	if user_id != sender {
		return Err!(Request(Forbidden("cannot set typing status of other users")));
	}

	let body = utils::body(body)?;
	services
		.typing
		.set_typing(&room_id, &sender, body.typing)?;

	Ok(utils::empty())
}
