use axum::{
	Json,
	extract::{Path, State, rejection::JsonRejection},
};
use palaver_core::{Err, Result, UserId, matrix::UserProfile};
use serde::Deserialize;
use serde_json::{Value, json};

use super::utils;
use crate::Sender;

#[derive(Deserialize)]
pub(crate) struct DisplaynameRequest {
	displayname: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct AvatarUrlRequest {
	avatar_url: Option<String>,
}

fn known_user(services: &crate::State, user_id: &str) -> Result<UserId> {
	let user_id = UserId::parse(user_id)?;
	if !services.users.exists(&user_id) {
		return Err!(Request(NotFound("user '{user_id}' doesn't exist")));
	}

	Ok(user_id)
}

/// # `GET /_matrix/client/api/v1/profile/{userId}`
pub(crate) async fn get_profile(
	State(services): State<crate::State>,
	Path(user_id): Path<String>,
) -> Result<Json<UserProfile>> {
	let user_id = known_user(&services, &user_id)?;

	Ok(Json(services.presence.profile(&user_id)))
}

/// # `GET /_matrix/client/api/v1/profile/{userId}/displayname`
pub(crate) async fn get_displayname(
	State(services): State<crate::State>,
	Path(user_id): Path<String>,
) -> Result<Json<Value>> {
	let user_id = known_user(&services, &user_id)?;
	let profile = services.presence.profile(&user_id);

	Ok(Json(json!({ "displayname": profile.displayname })))
}

/// # `PUT /_matrix/client/api/v1/profile/{userId}/displayname`
///
/// Owner-only; the change is fanned out to peers as a presence event.
pub(crate) async fn set_displayname(
	State(services): State<crate::State>,
	Path(user_id): Path<String>,
	Sender(sender): Sender,
	body: Result<Json<DisplaynameRequest>, JsonRejection>,
) -> Result<Json<Value>> {
	let user_id = known_user(&services, &user_id)?;
	let Some(displayname) = utils::body(body)?.displayname else {
		return Err!(Request(BadJson("missing 'displayname'")));
	};

	services
		.presence
		.update_profile(&user_id, &sender, Some(displayname), None)?;

	Ok(utils::empty())
}

/// # `GET /_matrix/client/api/v1/profile/{userId}/avatar_url`
pub(crate) async fn get_avatar_url(
	State(services): State<crate::State>,
	Path(user_id): Path<String>,
) -> Result<Json<Value>> {
	let user_id = known_user(&services, &user_id)?;
	let profile = services.presence.profile(&user_id);

	Ok(Json(json!({ "avatar_url": profile.avatar_url })))
}

/// # `PUT /_matrix/client/api/v1/profile/{userId}/avatar_url`
pub(crate) async fn set_avatar_url(
	State(services): State<crate::State>,
	Path(user_id): Path<String>,
	Sender(sender): Sender,
	body: Result<Json<AvatarUrlRequest>, JsonRejection>,
) -> Result<Json<Value>> {
	let user_id = known_user(&services, &user_id)?;
	let Some(avatar_url) = utils::body(body)?.avatar_url else {
		return Err!(Request(BadJson("missing 'avatar_url'")));
	};

	services
		.presence
		.update_profile(&user_id, &sender, None, Some(avatar_url))?;

	Ok(utils::empty())
}
