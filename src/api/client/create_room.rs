use axum::{Json, extract::{State, rejection::JsonRejection}};
use palaver_core::{
	Result,
	matrix::{RoomAliasId, RoomDescription, RoomId},
};
use serde::Serialize;

use super::utils;
use crate::Sender;

#[derive(Serialize)]
pub(crate) struct CreateRoomResponse {
	room_id: RoomId,

	#[serde(skip_serializing_if = "Option::is_none")]
	room_alias: Option<RoomAliasId>,
}

/// # `POST /_matrix/client/api/v1/createRoom`
///
/// Allocates a room and installs its required initial state.
pub(crate) async fn create_room(
	State(services): State<crate::State>,
	Sender(sender): Sender,
	body: Result<Json<RoomDescription>, JsonRejection>,
) -> Result<Json<CreateRoomResponse>> {
	let desc = utils::body(body)?;
	let (room_id, room_alias) = services.create.create_room(&sender, &desc)?;

	Ok(Json(CreateRoomResponse { room_id, room_alias }))
}
