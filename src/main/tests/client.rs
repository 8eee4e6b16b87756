#![cfg(test)]

use std::sync::Arc;

use axum::{Router, body::Body};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use palaver_core::{Config, Server};
use palaver_service::Services;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
	let config = Config {
		server_name: "example.org".to_owned(),
		..Config::default()
	};

	let services = Services::build(Arc::new(Server::new(config, None))).expect("services built");

	palaver_api::build(services)
}

async fn request(
	app: &Router,
	method: Method,
	uri: &str,
	body: Option<Value>,
) -> (StatusCode, Value) {
	let request = Request::builder()
		.method(method)
		.uri(uri)
		.header("content-type", "application/json")
		.body(body.map_or_else(Body::empty, |value| Body::from(value.to_string())))
		.expect("request built");

	let response = app.clone().oneshot(request).await.expect("response");
	let status = response.status();
	let bytes = response
		.into_body()
		.collect()
		.await
		.expect("body read")
		.to_bytes();

	let value = if bytes.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&bytes).expect("json body")
	};

	(status, value)
}

async fn register(app: &Router, user: &str) -> (String, String) {
	let (status, body) = request(
		app,
		Method::POST,
		"/_matrix/client/api/v1/register",
		Some(json!({"type": "m.login.password", "user": user, "password": "hunter2"})),
	)
	.await;

	assert_eq!(status, StatusCode::OK);

	(
		body["user_id"].as_str().expect("user id").to_owned(),
		body["access_token"].as_str().expect("token").to_owned(),
	)
}

async fn create_public_room(app: &Router, token: &str, alias: Option<&str>) -> String {
	let mut body = json!({"visibility": "public"});
	if let Some(alias) = alias {
		body["room_alias_name"] = json!(alias);
	}

	let (status, body) = request(
		app,
		Method::POST,
		&format!("/_matrix/client/api/v1/createRoom?access_token={token}"),
		Some(body),
	)
	.await;

	assert_eq!(status, StatusCode::OK);

	body["room_id"].as_str().expect("room id").to_owned()
}

async fn send_message(app: &Router, token: &str, room_id: &str, text: &str) -> Value {
	let (status, body) = request(
		app,
		Method::POST,
		&format!("/_matrix/client/api/v1/rooms/{room_id}/send/m.room.message?access_token={token}"),
		Some(json!({"msgtype": "m.text", "body": text})),
	)
	.await;

	assert_eq!(status, StatusCode::OK);

	body
}

#[tokio::test]
async fn register_then_login_round_trip() {
	let app = app();
	let (user_id, token) = register(&app, "alice").await;
	assert_eq!(user_id, "@alice:example.org");
	assert!(!token.is_empty());

	let (status, body) = request(
		&app,
		Method::POST,
		"/_matrix/client/api/v1/login",
		Some(json!({"type": "m.login.password", "user": "alice", "password": "hunter2"})),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["user_id"], "@alice:example.org");
	assert_ne!(body["access_token"].as_str().unwrap(), token);

	// re-registering the same name is refused
	let (status, body) = request(
		&app,
		Method::POST,
		"/_matrix/client/api/v1/register",
		Some(json!({"type": "m.login.password", "user": "alice", "password": "other"})),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["errcode"], "M_USER_IN_USE");

	// wrong password is a policy rejection
	let (status, body) = request(
		&app,
		Method::POST,
		"/_matrix/client/api/v1/login",
		Some(json!({"type": "m.login.password", "user": "alice", "password": "wrong"})),
	)
	.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["errcode"], "M_FORBIDDEN");
}

#[tokio::test]
async fn login_flows_are_enumerated() {
	let app = app();
	for uri in ["/_matrix/client/api/v1/login", "/_matrix/client/api/v1/register"] {
		let (status, body) = request(&app, Method::GET, uri, None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, json!({"flows": [{"type": "m.login.password"}]}));
	}
}

#[tokio::test]
async fn token_errors() {
	let app = app();

	let (status, body) =
		request(&app, Method::GET, "/_matrix/client/api/v1/initialSync", None).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["errcode"], "M_MISSING_TOKEN");

	let (status, body) = request(
		&app,
		Method::GET,
		"/_matrix/client/api/v1/initialSync?access_token=bogus",
		None,
	)
	.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["errcode"], "M_UNKNOWN_TOKEN");
}

#[tokio::test]
async fn create_room_wiring() {
	let app = app();
	let (user_id, token) = register(&app, "alice").await;

	let (status, body) = request(
		&app,
		Method::POST,
		&format!("/_matrix/client/api/v1/createRoom?access_token={token}"),
		Some(json!({"visibility": "public", "room_alias_name": "lobby"})),
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let room_id = body["room_id"].as_str().expect("room id");
	assert!(room_id.starts_with('!'));
	assert!(room_id.ends_with(":example.org"));
	assert_eq!(body["room_alias"], "#lobby:example.org");

	let (status, sync) = request(
		&app,
		Method::GET,
		&format!("/_matrix/client/api/v1/rooms/{room_id}/initialSync?access_token={token}"),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(sync["membership"], "join");

	let state = sync["state"].as_array().expect("state array");
	let entry = |kind: &str, state_key: &str| {
		state
			.iter()
			.find(|event| event["type"] == kind && event["state_key"] == state_key)
			.cloned()
			.unwrap_or(Value::Null)
	};

	assert_eq!(entry("m.room.create", "")["content"]["creator"], user_id);
	assert_eq!(
		entry("m.room.member", user_id.as_str())["content"]["membership"],
		"join"
	);
	assert_eq!(
		entry("m.room.power_levels", "")["content"]["users"][user_id.as_str()],
		100
	);
	assert_eq!(
		entry("m.room.join_rules", "")["content"]["join_rule"],
		"public"
	);
	assert_eq!(
		entry("m.room.aliases", "")["content"]["aliases"][0],
		"#lobby:example.org"
	);
}

#[tokio::test]
async fn power_level_enforcement() {
	let app = app();
	let (_, alice) = register(&app, "alice").await;
	let (_, mallory) = register(&app, "mallory").await;
	let room_id = create_public_room(&app, &alice, None).await;

	let (status, _) = request(
		&app,
		Method::POST,
		&format!("/_matrix/client/api/v1/rooms/{room_id}/join?access_token={mallory}"),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let (status, body) = request(
		&app,
		Method::PUT,
		&format!("/_matrix/client/api/v1/rooms/{room_id}/state/m.room.name?access_token={mallory}"),
		Some(json!({"name": "x"})),
	)
	.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["errcode"], "M_FORBIDDEN");

	let (status, body) = request(
		&app,
		Method::PUT,
		&format!("/_matrix/client/api/v1/rooms/{room_id}/state/m.room.name?access_token={alice}"),
		Some(json!({"name": "x"})),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert!(body["event_id"].as_str().is_some());
}

#[tokio::test]
async fn membership_transitions() {
	let app = app();
	let (_, alice) = register(&app, "alice").await;
	let (bob_id, bob) = register(&app, "bob").await;

	// invite-only room
	let (status, body) = request(
		&app,
		Method::POST,
		&format!("/_matrix/client/api/v1/createRoom?access_token={alice}"),
		Some(json!({})),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	let room_id = body["room_id"].as_str().expect("room id").to_owned();

	let (status, body) = request(
		&app,
		Method::POST,
		&format!("/_matrix/client/api/v1/rooms/{room_id}/join?access_token={bob}"),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["errcode"], "M_FORBIDDEN");

	let (status, _) = request(
		&app,
		Method::POST,
		&format!("/_matrix/client/api/v1/rooms/{room_id}/invite?access_token={alice}"),
		Some(json!({"user_id": bob_id})),
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let (status, body) = request(
		&app,
		Method::POST,
		&format!("/_matrix/client/api/v1/rooms/{room_id}/join?access_token={bob}"),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["room_id"], room_id);
}

#[tokio::test]
async fn long_poll_wakes_on_new_event() {
	let app = app();
	let (_, alice) = register(&app, "alice").await;
	let (_, bob) = register(&app, "bob").await;
	let room_id = create_public_room(&app, &alice, None).await;

	let (status, _) = request(
		&app,
		Method::POST,
		&format!("/_matrix/client/api/v1/rooms/{room_id}/join?access_token={bob}"),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let poller = {
		let app = app.clone();
		let alice = alice.clone();
		tokio::spawn(async move {
			request(
				&app,
				Method::GET,
				&format!("/_matrix/client/api/v1/events?access_token={alice}&timeout=5000"),
				None,
			)
			.await
		})
	};

	// give the poller a moment to park, then wake it
	tokio::time::sleep(std::time::Duration::from_millis(100)).await;
	send_message(&app, &bob, &room_id, "wake up").await;

	let (status, body) = poller.await.expect("poller finished");
	assert_eq!(status, StatusCode::OK);

	let chunk = body["chunk"].as_array().expect("chunk");
	assert_eq!(chunk.len(), 1);
	assert_eq!(chunk[0]["content"]["body"], "wake up");

	// the end token advanced exactly one message index past the start
	let parse = |token: &Value| -> u64 {
		let token = token.as_str().expect("token string");
		token
			.strip_prefix('s')
			.and_then(|rest| rest.split('_').next())
			.and_then(|messages| messages.parse().ok())
			.expect("message index")
	};
	assert_eq!(parse(&body["end"]), parse(&body["start"]) + 1);
}

#[tokio::test]
async fn long_poll_timeout_yields_a_valid_empty_chunk() {
	let app = app();
	let (_, alice) = register(&app, "alice").await;

	let (status, body) = request(
		&app,
		Method::GET,
		&format!("/_matrix/client/api/v1/events?access_token={alice}&timeout=100"),
		None,
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["chunk"].as_array().expect("chunk").len(), 0);
	assert_eq!(body["start"], body["end"]);
}

#[tokio::test]
async fn backward_pagination() {
	let app = app();
	let (_, alice) = register(&app, "alice").await;
	let room_id = create_public_room(&app, &alice, None).await;

	for text in ["m1", "m2", "m3"] {
		send_message(&app, &alice, &room_id, text).await;
	}

	let (status, body) = request(
		&app,
		Method::GET,
		&format!(
			"/_matrix/client/api/v1/rooms/{room_id}/messages?access_token={alice}&dir=b&limit=2"
		),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let chunk = body["chunk"].as_array().expect("chunk");
	assert_eq!(chunk.len(), 2);
	assert_eq!(chunk[0]["content"]["body"], "m3");
	assert_eq!(chunk[1]["content"]["body"], "m2");

	// the end token is the next backward page's exclusive bound
	let end = body["end"].as_str().expect("end token");
	let (status, body) = request(
		&app,
		Method::GET,
		&format!(
			"/_matrix/client/api/v1/rooms/{room_id}/messages?access_token={alice}&from={end}&dir=b&limit=2"
		),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	// the page continues past m1 into the room's creation state events
	let chunk = body["chunk"].as_array().expect("chunk");
	assert_eq!(chunk.len(), 2);
	assert_eq!(chunk[0]["content"]["body"], "m1");
	assert_eq!(chunk[1]["type"], "m.room.join_rules");
}

#[tokio::test]
async fn unknown_routes_are_unrecognized() {
	let app = app();
	let (status, body) = request(
		&app,
		Method::GET,
		"/_matrix/client/api/v1/no/such/route",
		None,
	)
	.await;

	// the api router has no fallback of its own; the full router installs
	// the unrecognized handler
	assert_eq!(status, StatusCode::NOT_FOUND);
	let _ = body;
}

#[tokio::test]
async fn presence_and_profile_round_trip() {
	let app = app();
	let (alice_id, alice) = register(&app, "alice").await;

	let (status, _) = request(
		&app,
		Method::PUT,
		&format!("/_matrix/client/api/v1/profile/{alice_id}/displayname?access_token={alice}"),
		Some(json!({"displayname": "Alice"})),
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let (status, body) = request(
		&app,
		Method::GET,
		&format!("/_matrix/client/api/v1/profile/{alice_id}/displayname?access_token={alice}"),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["displayname"], "Alice");

	let (status, _) = request(
		&app,
		Method::PUT,
		&format!("/_matrix/client/api/v1/presence/{alice_id}/status?access_token={alice}"),
		Some(json!({"presence": "online", "status_msg": "here"})),
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let (status, body) = request(
		&app,
		Method::GET,
		&format!("/_matrix/client/api/v1/presence/{alice_id}/status?access_token={alice}"),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["presence"], "online");
	assert_eq!(body["status_msg"], "here");

	// only the owner may update either
	let (_, mallory) = register(&app, "mallory").await;
	let (status, body) = request(
		&app,
		Method::PUT,
		&format!("/_matrix/client/api/v1/presence/{alice_id}/status?access_token={mallory}"),
		Some(json!({"presence": "offline"})),
	)
	.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["errcode"], "M_FORBIDDEN");
}
