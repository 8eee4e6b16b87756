use axum::{
	Json,
	extract::{Path, State, rejection::JsonRejection},
};
use palaver_core::{
	Result,
	matrix::{Content, RoomId},
};
use serde_json::{Value, json};

use super::utils;
use crate::Sender;

/// # `POST|PUT /_matrix/client/api/v1/rooms/{roomId}/send/{eventType}`
///
/// Appends a non-state event to the room.
pub(crate) async fn send_message(
	State(services): State<crate::State>,
	Path((room_id, event_type)): Path<(String, String)>,
	Sender(sender): Sender,
	body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
	let room_id = RoomId::parse(&room_id)?;
	let content = Content::from_parts(&event_type, utils::body(body)?)?;
	let message = services.timeline.add_message(&room_id, &sender, content)?;

	Ok(Json(json!({ "event_id": message.event_id })))
}

/// # `POST|PUT /_matrix/client/api/v1/rooms/{roomId}/send/{eventType}/{txnId}`
///
/// As [`send_message`]; the transaction id only disambiguates the route.
pub(crate) async fn send_message_txn(
	state: State<crate::State>,
	Path((room_id, event_type, _txn_id)): Path<(String, String, String)>,
	sender: Sender,
	body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
	send_message(state, Path((room_id, event_type)), sender, body).await
}
