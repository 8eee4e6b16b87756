use std::time::Duration;

use axum::{
	Json,
	extract::{Path, Query, State, rejection::QueryRejection},
};
use palaver_core::{Result, StreamToken, matrix::EventId};
use palaver_service::sync::EventRange;
use serde::Deserialize;
use serde_json::Value;
use tokio::{sync::oneshot, time::sleep};

use super::utils;
use crate::Sender;

#[derive(Deserialize)]
pub(crate) struct EventsQuery {
	from: Option<StreamToken>,
	to: Option<StreamToken>,
	dir: Option<String>,
	limit: Option<u64>,
	timeout: Option<u64>,
}

/// # `GET /_matrix/client/api/v1/events`
///
/// Long-poll range over all three streams. The timer closes the
/// cancellation channel; a timed-out poll is an empty chunk, never an
/// error.
pub(crate) async fn get_events(
	State(services): State<crate::State>,
	Sender(sender): Sender,
	query: Result<Query<EventsQuery>, QueryRejection>,
) -> Result<Json<EventRange>> {
	let query = utils::query(query)?;
	let (from, to) = utils::window(query.dir.as_deref(), query.from, query.to)?;
	let limit = utils::limit(&services.server.config, query.limit);
	let timeout = utils::timeout(&services.server.config, query.timeout);

	let (cancel, cancelled) = oneshot::channel();
	tokio::spawn(async move {
		sleep(Duration::from_millis(timeout)).await;
		cancel.send(()).ok();
	});

	let range = services
		.sync
		.range(&sender, from, to, limit, cancelled)
		.await?;

	Ok(Json(range))
}

/// # `PUT /_matrix/client/api/v1/events/{eventId}`
///
/// Fetch one event, visibility-filtered for the caller.
pub(crate) async fn get_event(
	State(services): State<crate::State>,
	Path(event_id): Path<String>,
	Sender(sender): Sender,
) -> Result<Json<Value>> {
	let event_id = EventId::parse(&event_id)?;
	let event = services.sync.event(&sender, &event_id)?;

	Ok(Json(serde_json::to_value(event)?))
}
