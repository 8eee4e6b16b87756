use axum::{
	Json,
	extract::{Path, State, rejection::JsonRejection},
};
use palaver_core::{
	Err, Result, UserId,
	matrix::{Presence, UserStatus},
};
use serde::Deserialize;
use serde_json::Value;

use super::utils;
use crate::Sender;

#[derive(Deserialize)]
pub(crate) struct StatusRequest {
	presence: Option<Presence>,

	#[serde(rename = "status_msg")]
	status_message: Option<String>,
}

fn known_user(services: &crate::State, user_id: &str) -> Result<UserId> {
	let user_id = UserId::parse(user_id)?;
	if !services.users.exists(&user_id) {
		return Err!(Request(NotFound("user '{user_id}' doesn't exist")));
	}

	Ok(user_id)
}

/// # `GET /_matrix/client/api/v1/presence/{userId}/status`
pub(crate) async fn get_status(
	State(services): State<crate::State>,
	Path(user_id): Path<String>,
	Sender(_): Sender,
) -> Result<Json<UserStatus>> {
	let user_id = known_user(&services, &user_id)?;

	Ok(Json(services.presence.status(&user_id)))
}

/// # `PUT /_matrix/client/api/v1/presence/{userId}/status`
///
/// Owner-only; peers observe the change on their presence stream.
pub(crate) async fn set_status(
	State(services): State<crate::State>,
	Path(user_id): Path<String>,
	Sender(sender): Sender,
	body: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<Json<Value>> {
	let user_id = known_user(&services, &user_id)?;
	let body = utils::body(body)?;
	if body.presence.is_none() && body.status_message.is_none() {
		return Err!(Request(BadJson("empty request")));
	}

	services
		.presence
		.update_status(&user_id, &sender, body.presence, body.status_message)?;

	Ok(utils::empty())
}
