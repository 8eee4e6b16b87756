use axum::extract::{FromRequestParts, Query};
use http::request::Parts;
use palaver_core::{Err, Error, Result, UserId, err};
use serde::Deserialize;

use super::State;

/// The authenticated caller, resolved from the `access_token` query
/// parameter carried by every authenticated endpoint. The token embeds the
/// user id; it confers nothing unless that user actually exists.
pub(crate) struct Sender(pub(crate) UserId);

#[derive(Deserialize)]
struct AccessTokenQuery {
	access_token: Option<String>,
}

impl FromRequestParts<State> for Sender {
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, state: &State) -> Result<Self> {
		let Query(query): Query<AccessTokenQuery> = Query::try_from_uri(&parts.uri)
			.map_err(|e| err!(Request(BadQuery("{e}"))))?;

		let Some(token) = query.access_token else {
			return Err!(Request(MissingToken("Missing access token")));
		};

		let user_id = state.tokens.parse(&token)?;
		if !state.users.exists(&user_id) {
			return Err!(Request(UnknownToken("Unrecognised access token.")));
		}

		Ok(Self(user_id))
	}
}
