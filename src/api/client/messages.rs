use axum::extract::{Path, Query, State, rejection::QueryRejection};
use axum::Json;
use palaver_core::{Result, StreamToken, matrix::RoomId};
use palaver_service::sync::EventRange;
use serde::Deserialize;

use super::utils;
use crate::Sender;

#[derive(Deserialize)]
pub(crate) struct MessagesQuery {
	from: Option<StreamToken>,
	to: Option<StreamToken>,
	dir: Option<String>,
	limit: Option<u64>,
}

/// # `GET /_matrix/client/api/v1/rooms/{roomId}/messages`
///
/// Paginates one room's messages; `dir=b` walks backward from `from`.
pub(crate) async fn get_messages(
	State(services): State<crate::State>,
	Path(room_id): Path<String>,
	Sender(sender): Sender,
	query: Result<Query<MessagesQuery>, QueryRejection>,
) -> Result<Json<EventRange>> {
	let room_id = RoomId::parse(&room_id)?;
	let query = utils::query(query)?;
	let (from, to) = utils::window(query.dir.as_deref(), query.from, query.to)?;
	let limit = utils::limit(&services.server.config, query.limit);

	let range = services
		.sync
		.messages(&sender, &room_id, from, to, limit)?;

	Ok(Json(range))
}
