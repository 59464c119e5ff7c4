// crates.io
use axum::{
	Router,
	body::Body,
	http::{Request, Response, StatusCode, header::SET_COOKIE},
};
use httpmock::prelude::*;
use serde_json::json;
use tower::ServiceExt;
// self
use petstore::{_preludet::*, store::MemoryStore};

const USERINFO: &str =
	r#"{"sub":"1234567890","email":"ada@example.com","email_verified":true,"name":"Ada"}"#;

fn build_app(server: &MockServer) -> Router {
	build_test_app_with_store(
		Arc::new(MemoryStore::default()),
		Some(build_test_exchange(&server.base_url())),
	)
}

fn callback_request(query: &str, cookie: Option<&str>) -> Request<Body> {
	let mut builder = Request::builder().method("GET").uri(format!("/auth/google/callback?{query}"));

	if let Some(cookie) = cookie {
		builder = builder.header("cookie", format!("theme=dark; oauth_state={cookie}"));
	}

	builder.body(Body::empty()).expect("Callback request fixture should build successfully.")
}

fn set_cookies(response: &Response<Body>) -> Vec<String> {
	response
		.headers()
		.get_all(SET_COOKIE)
		.iter()
		.map(|value| value.to_str().expect("Set-Cookie should be ASCII.").to_owned())
		.collect()
}

fn assert_cleared(response: &Response<Body>) {
	let cookies = set_cookies(response);

	assert_eq!(cookies.len(), 1, "Exactly one clearing cookie should be sent.");
	assert!(cookies[0].starts_with("oauth_state=;"));
	assert!(cookies[0].contains("Max-Age=0"));
	assert!(cookies[0].contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
}

async fn login(app: &Router) -> (Url, String) {
	let response = app
		.clone()
		.oneshot(get_request("/auth/google/login"))
		.await
		.expect("Login request should be served.");

	assert_eq!(response.status(), StatusCode::FOUND);

	let location = response
		.headers()
		.get("location")
		.and_then(|value| value.to_str().ok())
		.and_then(|value| Url::parse(value).ok())
		.expect("Login should redirect to a valid URL.");
	let cookie = set_cookies(&response).pop().expect("Login should set the state cookie.");

	(location, cookie)
}

async fn mock_token_success(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(
				r#"{"access_token":"access-123","token_type":"bearer","expires_in":3600}"#,
			);
		})
		.await
}

#[tokio::test]
async fn login_sets_a_state_cookie_matching_the_redirect() {
	let server = MockServer::start_async().await;
	let app = build_app(&server);
	let (location, cookie) = login(&app).await;
	let pairs: HashMap<_, _> = location.query_pairs().into_owned().collect();
	let state = pairs.get("state").expect("Redirect should carry a state parameter.");

	assert!(location.as_str().starts_with(&server.url("/authorize")));
	assert_eq!(pairs.get("response_type"), Some(&"code".into()));
	assert_eq!(pairs.get("client_id"), Some(&TEST_CLIENT_ID.into()));
	assert_eq!(pairs.get("redirect_uri"), Some(&TEST_REDIRECT_URL.into()));
	assert_eq!(pairs.get("scope"), Some(&"openid email".into()));
	assert_eq!(pairs.get("access_type"), Some(&"offline".into()));
	assert_eq!(state.len(), 43);
	assert!(cookie.starts_with(&format!("oauth_state={state}; Path=/;")));
	assert!(cookie.contains("Max-Age=600"));
	assert!(cookie.contains("HttpOnly"));
	assert!(cookie.contains("SameSite=Lax"));
	assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn matching_state_exchanges_code_and_returns_user_info() {
	let server = MockServer::start_async().await;
	let app = build_app(&server);
	let (location, _) = login(&app).await;
	let state = location
		.query_pairs()
		.find(|(key, _)| key == "state")
		.map(|(_, value)| value.into_owned())
		.expect("Redirect should carry a state parameter.");
	let token = mock_token_success(&server).await;
	let userinfo = server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo").header("authorization", "Bearer access-123");
			then.status(200).header("content-type", "application/json").body(USERINFO);
		})
		.await;
	let response = app
		.clone()
		.oneshot(callback_request(&format!("code=auth-code-1&state={state}"), Some(&state)))
		.await
		.expect("Callback request should be served.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_cleared(&response);
	assert_eq!(
		body_json(response).await,
		serde_json::from_str::<serde_json::Value>(USERINFO).expect("Fixture should be JSON.")
	);

	userinfo.assert_async().await;

	// The browser dropped the cookie; replaying the same callback must fail before the exchange.
	let replay = app
		.oneshot(callback_request(&format!("code=auth-code-1&state={state}"), None))
		.await
		.expect("Replayed callback should be served.");

	assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
	assert!(set_cookies(&replay).is_empty());
	assert_eq!(
		body_json(replay).await,
		json!({ "code": 400, "message": "oauth state cookie not found" })
	);
	token.assert_calls_async(1).await;
}

#[tokio::test]
async fn forged_state_is_rejected_without_contacting_the_provider() {
	let server = MockServer::start_async().await;
	let app = build_app(&server);
	let (_, _) = login(&app).await;
	let token = mock_token_success(&server).await;
	let response = app
		.oneshot(callback_request("code=auth-code-1&state=forged-state", Some("genuine-state")))
		.await
		.expect("Callback request should be served.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_cleared(&response);
	assert_eq!(body_json(response).await, json!({ "code": 400, "message": "invalid oauth state" }));
	token.assert_calls_async(0).await;
}

#[tokio::test]
async fn missing_state_parameter_is_rejected() {
	let server = MockServer::start_async().await;
	let app = build_app(&server);
	let response = app
		.oneshot(callback_request("code=auth-code-1", Some("genuine-state")))
		.await
		.expect("Callback request should be served.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_cleared(&response);
	assert_eq!(
		body_json(response).await,
		json!({ "code": 400, "message": "missing state parameter" })
	);
}

#[tokio::test]
async fn provider_reported_error_is_a_bad_request() {
	let server = MockServer::start_async().await;
	let app = build_app(&server);
	let response = app
		.oneshot(callback_request(
			"error=access_denied&error_description=user%20declined%20consent",
			None,
		))
		.await
		.expect("Callback request should be served.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(
		body_json(response).await,
		json!({ "code": 400, "message": "google oauth error: user declined consent" })
	);
}

#[tokio::test]
async fn failing_token_endpoint_is_a_bad_gateway() {
	let server = MockServer::start_async().await;
	let app = build_app(&server);
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(500)
				.header("content-type", "application/json")
				.body(r#"{"error":"server_error"}"#);
		})
		.await;
	let response = app
		.oneshot(callback_request("code=auth-code-1&state=tok", Some("tok")))
		.await
		.expect("Callback request should be served.");

	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
	assert_cleared(&response);
	assert_eq!(
		body_json(response).await,
		json!({ "code": 502, "message": "failed to exchange authorization code" })
	);

	token.assert_async().await;
}

#[tokio::test]
async fn rejected_user_info_request_is_a_bad_gateway() {
	let server = MockServer::start_async().await;
	let app = build_app(&server);
	let _token = mock_token_success(&server).await;
	let _userinfo = server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(401).body("unauthorized");
		})
		.await;
	let response = app
		.oneshot(callback_request("code=auth-code-1&state=tok", Some("tok")))
		.await
		.expect("Callback request should be served.");

	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
	assert_eq!(
		body_json(response).await,
		json!({ "code": 502, "message": "unexpected response from google userinfo endpoint" })
	);
}

#[tokio::test]
async fn missing_code_after_valid_state_is_a_bad_request() {
	let server = MockServer::start_async().await;
	let app = build_app(&server);
	let response = app
		.oneshot(callback_request("state=tok", Some("tok")))
		.await
		.expect("Callback request should be served.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_cleared(&response);
	assert_eq!(
		body_json(response).await,
		json!({ "code": 400, "message": "missing authorization code" })
	);
}

#[tokio::test]
async fn repeated_state_parameters_still_clear_the_cookie_with_a_json_error() {
	let server = MockServer::start_async().await;
	let app = build_app(&server);
	let token = mock_token_success(&server).await;
	let response = app
		.oneshot(callback_request("code=auth-code-1&state=forged&state=tok", Some("tok")))
		.await
		.expect("Callback request should be served.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(
		response.headers().get("content-type").and_then(|value| value.to_str().ok()),
		Some("application/json")
	);
	assert_cleared(&response);
	assert_eq!(body_json(response).await, json!({ "code": 400, "message": "invalid oauth state" }));

	token.assert_calls_async(0).await;
}
