use axum::{
	Json,
	extract::{
		Query,
		rejection::{JsonRejection, QueryRejection},
	},
};
use palaver_core::{Config, Err, Result, StreamToken};
use serde_json::{Value, json};

/// Unwrap a JSON body: malformed JSON is `NotJson`, JSON that does not fit
/// the request schema is `BadJson`.
pub(crate) fn body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T> {
	match body {
		| Ok(Json(body)) => Ok(body),
		| Err(JsonRejection::JsonSyntaxError(e)) => Err!(Request(NotJson("{e}"))),
		| Err(e) => Err!(Request(BadJson("{e}"))),
	}
}

/// Unwrap a query string; any rejected value is `BadQuery`.
pub(crate) fn query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T> {
	match query {
		| Ok(Query(query)) => Ok(query),
		| Err(e) => Err!(Request(BadQuery("{e}"))),
	}
}

/// Default and clamp an item limit.
pub(crate) fn limit(config: &Config, limit: Option<u64>) -> usize {
	let limit = limit
		.unwrap_or(config.event_limit_default)
		.min(config.event_limit_max);

	usize::try_from(limit).unwrap_or(usize::MAX)
}

/// Default and clamp a long-poll timeout, milliseconds.
pub(crate) fn timeout(config: &Config, timeout: Option<u64>) -> u64 {
	timeout
		.unwrap_or(config.timeout_default_ms)
		.clamp(config.timeout_min_ms, config.timeout_max_ms)
}

/// Apply the direction parameter: `b` paginates backward by forcing the
/// upper bound to the stream origin.
pub(crate) fn window(
	dir: Option<&str>,
	from: Option<StreamToken>,
	to: Option<StreamToken>,
) -> Result<(Option<StreamToken>, Option<StreamToken>)> {
	match dir {
		| None | Some("f") => Ok((from, to)),
		| Some("b") => Ok((from, Some(StreamToken::default()))),
		| Some(other) => Err!(Request(BadQuery("invalid dir '{other}'"))),
	}
}

pub(crate) fn empty() -> Json<Value> { Json(json!({})) }
