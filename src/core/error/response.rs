use axum::{
	Json,
	response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use super::Error;

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status_code();
		if status.is_server_error() {
			error!("{self:?}");
		}

		let body = json!({
			"errcode": self.kind().errcode(),
			"error": self.message(),
		});

		(status, Json(body)).into_response()
	}
}
