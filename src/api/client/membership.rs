//! The membership transition endpoints. Each is a thin shim over the
//! membership state machine; the heavy policy lives there.

use axum::{
	Json,
	extract::{Path, State, rejection::JsonRejection},
};
use palaver_core::{Result, UserId, matrix::RoomId};
use serde::Deserialize;
use serde_json::{Value, json};

use super::utils;
use crate::Sender;

#[derive(Deserialize)]
pub(crate) struct TargetRequest {
	user_id: UserId,
}

/// # `POST /_matrix/client/api/v1/rooms/{roomId}/invite`
pub(crate) async fn invite(
	State(services): State<crate::State>,
	Path(room_id): Path<String>,
	Sender(sender): Sender,
	body: Result<Json<TargetRequest>, JsonRejection>,
) -> Result<Json<Value>> {
	let room_id = RoomId::parse(&room_id)?;
	let body = utils::body(body)?;
	services
		.membership
		.invite(&sender, &room_id, &body.user_id)?;

	Ok(utils::empty())
}

/// # `POST /_matrix/client/api/v1/rooms/{roomId}/join`
pub(crate) async fn join(
	State(services): State<crate::State>,
	Path(room_id): Path<String>,
	Sender(sender): Sender,
) -> Result<Json<Value>> {
	let room_id = RoomId::parse(&room_id)?;
	services.membership.join(&sender, &room_id)?;

	Ok(Json(json!({ "room_id": room_id })))
}

/// # `POST /_matrix/client/api/v1/rooms/{roomId}/knock`
pub(crate) async fn knock(
	State(services): State<crate::State>,
	Path(room_id): Path<String>,
	Sender(sender): Sender,
) -> Result<Json<Value>> {
	let room_id = RoomId::parse(&room_id)?;
	services.membership.knock(&sender, &room_id)?;

	Ok(utils::empty())
}

/// # `POST /_matrix/client/api/v1/rooms/{roomId}/leave`
pub(crate) async fn leave(
	State(services): State<crate::State>,
	Path(room_id): Path<String>,
	Sender(sender): Sender,
) -> Result<Json<Value>> {
	let room_id = RoomId::parse(&room_id)?;
	services.membership.leave(&sender, &room_id)?;

	Ok(utils::empty())
}

/// # `POST /_matrix/client/api/v1/rooms/{roomId}/kick`
pub(crate) async fn kick(
	State(services): State<crate::State>,
	Path(room_id): Path<String>,
	Sender(sender): Sender,
	body: Result<Json<TargetRequest>, JsonRejection>,
) -> Result<Json<Value>> {
	let room_id = RoomId::parse(&room_id)?;
	let body = utils::body(body)?;
	services
		.membership
		.kick(&sender, &room_id, &body.user_id)?;

	Ok(utils::empty())
}

/// # `POST /_matrix/client/api/v1/rooms/{roomId}/ban`
pub(crate) async fn ban(
	State(services): State<crate::State>,
	Path(room_id): Path<String>,
	Sender(sender): Sender,
	body: Result<Json<TargetRequest>, JsonRejection>,
) -> Result<Json<Value>> {
	let room_id = RoomId::parse(&room_id)?;
	let body = utils::body(body)?;
	services
		.membership
		.ban(&sender, &room_id, &body.user_id)?;

	Ok(utils::empty())
}
