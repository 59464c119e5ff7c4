// std
use std::time::Duration as StdDuration;
// crates.io
use axum::{
	Router,
	body::Body,
	http::{Request, Response, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
// self
use petstore::{
	_preludet::*,
	api::{self, AppState},
	pet::{Pet, PetId},
	service::PetService,
	store::{MemoryStore, PetStore, StoreFuture},
};

/// Store whose reads either hang past any deadline or panic.
struct MisbehavingStore {
	panic_on_list: bool,
}
impl PetStore for MisbehavingStore {
	fn list(&self, _: Option<PetId>, _: u32) -> StoreFuture<'_, Vec<Pet>> {
		let panic_on_list = self.panic_on_list;

		Box::pin(async move {
			if panic_on_list {
				panic!("list exploded");
			}

			tokio::time::sleep(StdDuration::from_secs(30)).await;

			Ok(Vec::new())
		})
	}

	fn create(&self, _: Pet) -> StoreFuture<'_, ()> {
		Box::pin(async { Ok(()) })
	}

	fn get(&self, id: PetId) -> StoreFuture<'_, Pet> {
		Box::pin(async move { Ok(Pet::new(id, "stub")) })
	}

	fn update(&self, _: Pet) -> StoreFuture<'_, ()> {
		Box::pin(async { Ok(()) })
	}

	fn delete(&self, _: PetId) -> StoreFuture<'_, ()> {
		Box::pin(async { Ok(()) })
	}
}

fn misbehaving_app(panic_on_list: bool, timeout: StdDuration) -> Router {
	let store = Arc::new(MisbehavingStore { panic_on_list });

	api::router(AppState::new(PetService::new(store), None).with_request_timeout(timeout))
}

fn content_type(response: &Response<Body>) -> Option<&str> {
	response.headers().get("content-type").and_then(|value| value.to_str().ok())
}

fn request_id(response: &Response<Body>) -> Option<String> {
	response
		.headers()
		.get(api::REQUEST_ID_HEADER)
		.and_then(|value| value.to_str().ok())
		.map(str::to_owned)
}

#[tokio::test]
async fn responses_carry_a_generated_or_echoed_request_id() {
	let (app, _) = build_test_app();
	let generated =
		app.clone().oneshot(get_request("/pets")).await.expect("List request should be served.");
	let generated_id = request_id(&generated).expect("A request id should be generated.");

	assert_eq!(generated_id.len(), 36, "Generated ids should be hyphenated UUIDs.");

	let supplied = Request::builder()
		.uri("/pets/1")
		.header(api::REQUEST_ID_HEADER, "trace-abc-123")
		.body(Body::empty())
		.expect("Request fixture should build successfully.");
	let echoed = app.oneshot(supplied).await.expect("Fetch request should be served.");

	assert_eq!(echoed.status(), StatusCode::NOT_FOUND);
	assert_eq!(request_id(&echoed).as_deref(), Some("trace-abc-123"));
}

#[tokio::test]
async fn undecodable_path_is_a_json_bad_request() {
	let (app, _) = build_test_app();
	let response =
		app.oneshot(get_request("/pets/%FF")).await.expect("Fetch request should be served.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(content_type(&response), Some("application/json"));
	assert_eq!(body_json(response).await["code"], 400);
}

#[tokio::test]
async fn unknown_routes_and_methods_answer_with_json() {
	let (app, _) = build_test_app();
	let missing =
		app.clone().oneshot(get_request("/owners")).await.expect("Request should be served.");

	assert_eq!(missing.status(), StatusCode::NOT_FOUND);
	assert_eq!(body_json(missing).await, json!({ "code": 404, "message": "route not found" }));

	let delete = Request::builder()
		.method("DELETE")
		.uri("/pets/1")
		.body(Body::empty())
		.expect("Request fixture should build successfully.");
	let rejected = app.oneshot(delete).await.expect("Request should be served.");

	assert_eq!(rejected.status(), StatusCode::METHOD_NOT_ALLOWED);
	assert_eq!(body_json(rejected).await, json!({ "code": 405, "message": "method not allowed" }));
}

#[tokio::test]
async fn deadline_overrun_is_a_json_timeout() {
	let app = misbehaving_app(false, StdDuration::from_millis(50));
	let response = app.oneshot(get_request("/pets")).await.expect("List request should be served.");

	assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
	assert!(request_id(&response).is_some());
	assert_eq!(body_json(response).await, json!({ "code": 408, "message": "request timed out" }));
}

#[tokio::test]
async fn handler_panic_is_a_generic_json_500() {
	let app = misbehaving_app(true, StdDuration::from_secs(5));
	let response = app.oneshot(get_request("/pets")).await.expect("List request should be served.");

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	assert!(request_id(&response).is_some());
	assert_eq!(
		body_json(response).await,
		json!({ "code": 500, "message": "internal server error" })
	);
}

#[tokio::test]
async fn requests_within_the_deadline_are_untouched() {
	let store = Arc::new(MemoryStore::default());

	store.create(Pet::new(1, "Rex")).await.expect("Seeding should succeed.");

	let app = api::router(
		AppState::new(PetService::new(store), None).with_request_timeout(StdDuration::from_secs(5)),
	);
	let response =
		app.oneshot(get_request("/pets/1")).await.expect("Fetch request should be served.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await, json!({ "id": 1, "name": "Rex" }));
}
