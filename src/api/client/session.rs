use axum::{Json, extract::{State, rejection::JsonRejection}};
use palaver_core::{Err, Result, UserId, err};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::utils;

const LOGIN_TYPE_PASSWORD: &str = "m.login.password";

#[derive(Serialize)]
pub(crate) struct AuthFlow {
	#[serde(rename = "type")]
	kind: &'static str,
}

#[derive(Serialize)]
pub(crate) struct AuthFlows {
	flows: Vec<AuthFlow>,
}

fn password_flows() -> AuthFlows {
	AuthFlows { flows: vec![AuthFlow { kind: LOGIN_TYPE_PASSWORD }] }
}

#[derive(Deserialize)]
pub(crate) struct AuthRequest {
	#[serde(rename = "type")]
	kind: Option<String>,
	user: Option<String>,
	password: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct AuthResponse {
	user_id: UserId,
	access_token: String,
}

/// # `GET /_matrix/client/api/v1/login`
///
/// Enumerates the supported login flows.
pub(crate) async fn get_login_flows() -> Json<AuthFlows> { Json(password_flows()) }

/// # `GET /_matrix/client/api/v1/register`
///
/// Enumerates the supported registration flows.
pub(crate) async fn get_register_flows() -> Json<AuthFlows> { Json(password_flows()) }

/// # `POST /_matrix/client/api/v1/register`
///
/// Creates the user on this server's domain, stores the credential hash
/// and mints an access token.
pub(crate) async fn register(
	State(services): State<crate::State>,
	body: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
	let body = utils::body(body)?;
	let (user_id, password) = credentials(&services, &body)?;

	services.users.create(&user_id)?;
	services.users.set_password(&user_id, &password)?;

	info!(%user_id, "registered user");

	let access_token = services.tokens.mint(&user_id);
	Ok(Json(AuthResponse { user_id, access_token }))
}

/// # `POST /_matrix/client/api/v1/login`
///
/// Verifies the password against the stored hash and mints a fresh token.
pub(crate) async fn login(
	State(services): State<crate::State>,
	body: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
	let body = utils::body(body)?;
	let (user_id, password) = credentials(&services, &body)?;

	services.users.verify_password(&user_id, &password)?;

	let access_token = services.tokens.mint(&user_id);
	Ok(Json(AuthResponse { user_id, access_token }))
}

fn credentials(services: &crate::State, body: &AuthRequest) -> Result<(UserId, String)> {
	match body.kind.as_deref() {
		| Some(LOGIN_TYPE_PASSWORD) => {},
		| kind =>
			return Err!(Request(BadJson(
				"Missing or invalid login type: '{}'",
				kind.unwrap_or_default()
			))),
	}

	let Some(user) = body.user.as_deref().filter(|user| !user.is_empty()) else {
		return Err!(Request(BadJson("Missing or invalid user")));
	};

	let Some(password) = body
		.password
		.as_deref()
		.filter(|password| !password.is_empty())
	else {
		return Err!(Request(BadJson("Missing or invalid password")));
	};

	let user_id = UserId::parse(&format!("@{user}:{}", services.globals.server_name()))
		.map_err(|_| err!(Request(BadJson("Missing or invalid user"))))?;

	Ok((user_id, password.to_owned()))
}
