use axum::{
	Json,
	extract::{Path, Query, State, rejection::QueryRejection},
};
use palaver_core::{Result, matrix::RoomId};
use palaver_service::sync::{InitialSync, RoomInitialSync};
use serde::Deserialize;

use super::utils;
use crate::Sender;

#[derive(Deserialize)]
pub(crate) struct SyncQuery {
	limit: Option<u64>,
}

/// # `GET /_matrix/client/api/v1/initialSync`
///
/// Composite snapshot of every room the caller can see plus the presences
/// of their peers.
pub(crate) async fn initial_sync(
	State(services): State<crate::State>,
	Sender(sender): Sender,
	query: Result<Query<SyncQuery>, QueryRejection>,
) -> Result<Json<InitialSync>> {
	let query = utils::query(query)?;
	let limit = utils::limit(&services.server.config, query.limit);

	Ok(Json(services.sync.full_sync(&sender, limit)?))
}

/// # `GET /_matrix/client/api/v1/rooms/{roomId}/initialSync`
pub(crate) async fn room_initial_sync(
	State(services): State<crate::State>,
	Path(room_id): Path<String>,
	Sender(sender): Sender,
	query: Result<Query<SyncQuery>, QueryRejection>,
) -> Result<Json<RoomInitialSync>> {
	let room_id = RoomId::parse(&room_id)?;
	let query = utils::query(query)?;
	let limit = utils::limit(&services.server.config, query.limit);

	Ok(Json(services.sync.room_sync(&sender, &room_id, limit)?))
}
