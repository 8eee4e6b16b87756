use std::sync::Arc;

use axum::{Router, response::IntoResponse, routing::get};
use http::Uri;
use palaver_core::err;
use palaver_service::Services;

pub(crate) fn build(services: &Arc<Services>) -> Router {
	palaver_api::build(services.clone())
		.route("/", get(it_works))
		.fallback(not_found)
		.layer(crate::layers::trace())
}

async fn not_found(_uri: Uri) -> impl IntoResponse {
	err!(Request(Unrecognized("unrecognized request")))
}

async fn it_works() -> &'static str { "hewwo from palaver" }
