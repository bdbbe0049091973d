//! End-to-end dispatch tests: route lookup, body merging, outcome
//! bridging, and finalization, all without a network socket.

use bytes::Bytes;
use futures::stream;
use hyper::{Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;

use maru_http::{
	Endpoint, Error, FunctionEndpoint, Handler, Outcome, Renderer, Request, RequestBody, Response,
};
use maru_routers::{Dispatcher, Route, Router};

fn endpoint<F, Fut>(func: F) -> Arc<dyn Endpoint>
where
	F: Fn(Request, maru_http::ResponseContext, maru_http::Params) -> Fut + Send + Sync + 'static,
	Fut: std::future::Future<Output = maru_http::Result<Outcome>> + Send + 'static,
{
	Arc::new(FunctionEndpoint::new(func))
}

fn get(path: &str) -> Request {
	Request::builder().method(Method::GET).uri(path).build().unwrap()
}

fn post_with_streaming_body(path: &str, body: &'static str) -> Request {
	let chunks = stream::iter(vec![Ok::<_, Box<dyn std::error::Error + Send + Sync>>(
		Bytes::from_static(body.as_bytes()),
	)]);
	Request::builder()
		.method(Method::POST)
		.uri(path)
		.streaming_body(Box::pin(chunks))
		.build()
		.unwrap()
}

fn body_text(response: &Response) -> &str {
	std::str::from_utf8(&response.body).unwrap()
}

#[tokio::test]
async fn literal_route_returns_handler_output() {
	let mut router = Router::new();
	router.add_route(
		Route::new("/", endpoint(|_req, _ctx, _params| async { Ok(Outcome::body("home")) }))
			.unwrap(),
	);

	let dispatcher = Dispatcher::new(router);
	let response = dispatcher.handle(get("/")).await.unwrap();

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(body_text(&response), "home");
	assert_eq!(response.headers.get("content-type").unwrap(), "text/html");
}

#[tokio::test]
async fn unmatched_path_is_404() {
	let mut router = Router::new();
	router.add_route(
		Route::new("/known", endpoint(|_req, _ctx, _params| async { Ok(Outcome::body("x")) }))
			.unwrap(),
	);

	let dispatcher = Dispatcher::new(router);
	let response = dispatcher.handle(get("/unknown")).await.unwrap();

	assert_eq!(response.status, StatusCode::NOT_FOUND);
	assert_eq!(body_text(&response), "Sorry, route not found");
	assert_eq!(response.headers.get("content-type").unwrap(), "text/plain");
}

#[tokio::test]
async fn unregistered_method_is_404() {
	let mut router = Router::new();
	router.add_route(
		Route::new("/thing", endpoint(|_req, _ctx, _params| async { Ok(Outcome::body("x")) }))
			.unwrap(),
	);

	let dispatcher = Dispatcher::new(router);
	let request = Request::builder()
		.method(Method::PATCH)
		.uri("/thing")
		.build()
		.unwrap();
	let response = dispatcher.handle(request).await.unwrap();

	assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn placeholder_params_reach_the_handler() {
	let mut router = Router::new();
	router.add_route(
		Route::new(
			"/hello/:and/:junk",
			endpoint(|_req, _ctx, params| async move {
				Ok(Outcome::body(format!(
					"{}/{}",
					params.get("and").unwrap_or("-"),
					params.get("junk").unwrap_or("-")
				)))
			}),
		)
		.unwrap(),
	);

	let dispatcher = Dispatcher::new(router);
	let response = dispatcher.handle(get("/hello/foo/bar")).await.unwrap();
	assert_eq!(body_text(&response), "foo/bar");
}

#[tokio::test]
async fn body_fields_override_placeholder_captures() {
	let mut router = Router::new();
	router.add_route(
		Route::new(
			"/hello/:and/:junk",
			endpoint(|_req, _ctx, params| async move {
				Ok(Outcome::body(format!(
					"{},{}",
					params.get("and").unwrap_or("-"),
					params.get("junk").unwrap_or("-")
				)))
			}),
		)
		.unwrap()
		.with_method(Method::POST),
	);

	let dispatcher = Dispatcher::new(router);
	let request = post_with_streaming_body("/hello/foo/bar", "and=1&junk=2");
	let response = dispatcher.handle(request).await.unwrap();

	assert_eq!(body_text(&response), "1,2");
}

#[tokio::test]
async fn prebuffered_body_is_not_parsed() {
	let mut router = Router::new();
	router.add_route(
		Route::new(
			"/hello/:and",
			endpoint(|_req, _ctx, params| async move {
				Ok(Outcome::body(params.get("and").unwrap_or("-").to_string()))
			}),
		)
		.unwrap()
		.with_method(Method::POST),
	);

	let dispatcher = Dispatcher::new(router);
	let request = Request::builder()
		.method(Method::POST)
		.uri("/hello/captured")
		.body("and=body")
		.build()
		.unwrap();
	let response = dispatcher.handle(request).await.unwrap();

	// The body was already buffered before dispatch, so the placeholder
	// capture stands.
	assert_eq!(body_text(&response), "captured");
}

#[tokio::test]
async fn raw_pattern_captures_are_positional() {
	let mut router = Router::new();
	router.add_route(
		Route::new(
			regex::Regex::new("/kaka/(.*?)/junk").unwrap(),
			endpoint(|_req, _ctx, params| async move {
				Ok(Outcome::body(params.captures().join(",")))
			}),
		)
		.unwrap(),
	);

	let dispatcher = Dispatcher::new(router);
	let response = dispatcher.handle(get("/kaka/hi/junk")).await.unwrap();
	assert_eq!(body_text(&response), "hi");
}

#[tokio::test]
async fn handler_error_is_500_and_serving_continues() {
	let mut router = Router::new();
	router.add_route(
		Route::new(
			"/boom",
			endpoint(|_req, _ctx, _params| async {
				Err(Error::Handler("kaboom".into()))
			}),
		)
		.unwrap(),
	);
	router.add_route(
		Route::new("/fine", endpoint(|_req, _ctx, _params| async { Ok(Outcome::body("ok")) }))
			.unwrap(),
	);

	let dispatcher = Dispatcher::new(router);

	let response = dispatcher.handle(get("/boom")).await.unwrap();
	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body_text(&response), "Internal Server Error");
	assert_eq!(response.headers.get("content-type").unwrap(), "text/plain");

	// The next request on the same dispatcher is unaffected.
	let response = dispatcher.handle(get("/fine")).await.unwrap();
	assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn deferred_outcome_resolves_the_body() {
	let mut router = Router::new();
	router.add_route(
		Route::new(
			"/later",
			endpoint(|_req, _ctx, _params| async {
				Ok(Outcome::deferred(|completion| {
					tokio::spawn(async move {
						tokio::time::sleep(Duration::from_millis(10)).await;
						completion.resolve("eventually");
					});
				}))
			}),
		)
		.unwrap(),
	);

	let dispatcher = Dispatcher::new(router);
	let response = dispatcher.handle(get("/later")).await.unwrap();

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(body_text(&response), "eventually");
}

#[tokio::test]
async fn dropped_completion_is_500() {
	let mut router = Router::new();
	router.add_route(
		Route::new(
			"/dropped",
			endpoint(|_req, _ctx, _params| async {
				Ok(Outcome::deferred(|completion| {
					// Dropping without resolving must not hang the request.
					drop(completion);
				}))
			}),
		)
		.unwrap(),
	);

	let dispatcher = Dispatcher::new(router);
	let response = dispatcher.handle(get("/dropped")).await.unwrap();
	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn completion_timeout_finalizes_as_504() {
	let mut router = Router::new();
	router.add_route(
		Route::new(
			"/stuck",
			endpoint(|_req, _ctx, _params| async {
				Ok(Outcome::deferred(|completion| {
					// Keep the completion alive without resolving it.
					tokio::spawn(async move {
						tokio::time::sleep(Duration::from_secs(3600)).await;
						completion.resolve("too late");
					});
				}))
			}),
		)
		.unwrap(),
	);

	let dispatcher =
		Dispatcher::new(router).with_completion_timeout(Duration::from_millis(20));
	let response = dispatcher.handle(get("/stuck")).await.unwrap();

	assert_eq!(response.status, StatusCode::GATEWAY_TIMEOUT);
}

struct StubRenderer;

impl Renderer for StubRenderer {
	fn render(&self, template: &str, context: &serde_json::Value) -> maru_http::Result<String> {
		match template {
			"greet.html" => Ok(format!(
				"hello {}",
				context.get("name").and_then(|v| v.as_str()).unwrap_or("?")
			)),
			_ => Err(Error::Render(format!("unknown template {template}"))),
		}
	}
}

#[tokio::test]
async fn pending_outcome_renders_a_template() {
	let mut router = Router::new();
	router.add_route(
		Route::new(
			"/tpl/:name",
			endpoint(|_req, ctx, params| async move {
				let name = params.get("name").unwrap_or("?").to_string();
				ctx.render("greet.html", &serde_json::json!({ "name": name }))?;
				Ok(Outcome::Pending)
			}),
		)
		.unwrap(),
	);

	let dispatcher = Dispatcher::new(router).with_renderer(Arc::new(StubRenderer));
	let response = dispatcher.handle(get("/tpl/ferris")).await.unwrap();

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(body_text(&response), "hello ferris");
}

#[tokio::test]
async fn render_failure_is_500() {
	let mut router = Router::new();
	router.add_route(
		Route::new(
			"/missing",
			endpoint(|_req, ctx, _params| async move {
				ctx.render("nope.html", &serde_json::json!({}))?;
				Ok(Outcome::Pending)
			}),
		)
		.unwrap(),
	);

	let dispatcher = Dispatcher::new(router).with_renderer(Arc::new(StubRenderer));
	let response = dispatcher.handle(get("/missing")).await.unwrap();
	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn handler_status_and_content_type_are_preserved() {
	let mut router = Router::new();
	router.add_route(
		Route::new(
			"/created",
			endpoint(|_req, ctx, _params| async move {
				ctx.set_status(StatusCode::CREATED);
				ctx.set_header("content-type", "application/json");
				Ok(Outcome::body("{}"))
			}),
		)
		.unwrap(),
	);

	let dispatcher = Dispatcher::new(router);
	let response = dispatcher.handle(get("/created")).await.unwrap();

	assert_eq!(response.status, StatusCode::CREATED);
	assert_eq!(
		response.headers.get("content-type").unwrap(),
		"application/json"
	);
}

#[tokio::test]
async fn route_content_type_applies_when_handler_sets_none() {
	let mut router = Router::new();
	router.add_route(
		Route::new(
			"/data",
			endpoint(|_req, _ctx, _params| async { Ok(Outcome::body("[]")) }),
		)
		.unwrap()
		.with_content_type("application/json"),
	);

	let dispatcher = Dispatcher::new(router);
	let response = dispatcher.handle(get("/data")).await.unwrap();
	assert_eq!(
		response.headers.get("content-type").unwrap(),
		"application/json"
	);
}

#[tokio::test]
async fn redirect_helper_sets_status_and_location() {
	let mut router = Router::new();
	router.add_route(
		Route::new(
			"/old",
			endpoint(|_req, ctx, _params| async move {
				ctx.redirect("/new", None);
				Ok(Outcome::body(""))
			}),
		)
		.unwrap(),
	);

	let dispatcher = Dispatcher::new(router);
	let response = dispatcher.handle(get("/old")).await.unwrap();

	assert_eq!(response.status, StatusCode::MOVED_PERMANENTLY);
	assert_eq!(response.headers.get("location").unwrap(), "/new");
}

#[tokio::test]
async fn undecodable_body_field_passes_through_verbatim() {
	let mut router = Router::new();
	router.add_route(
		Route::new(
			"/form",
			endpoint(|_req, _ctx, params| async move {
				Ok(Outcome::body(params.get("a").unwrap_or("-").to_string()))
			}),
		)
		.unwrap()
		.with_method(Method::POST),
	);

	let dispatcher = Dispatcher::new(router);
	// An invalid percent-escape is not an error; the raw text survives.
	let request = post_with_streaming_body("/form", "a=%ZZ");
	let response = dispatcher.handle(request).await.unwrap();
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(body_text(&response), "%ZZ");
}

#[tokio::test]
async fn body_read_failure_is_500() {
	let mut router = Router::new();
	router.add_route(
		Route::new(
			"/form",
			endpoint(|_req, _ctx, _params| async { Ok(Outcome::body("unreachable")) }),
		)
		.unwrap()
		.with_method(Method::POST),
	);

	let dispatcher = Dispatcher::new(router);
	let broken = stream::iter(vec![Err::<Bytes, Box<dyn std::error::Error + Send + Sync>>(
		"connection reset".into(),
	)]);
	let request = Request::builder()
		.method(Method::POST)
		.uri("/form")
		.streaming_body(Box::pin(broken))
		.build()
		.unwrap();

	let response = dispatcher.handle(request).await.unwrap();
	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn empty_body_variant_skips_parsing() {
	let mut router = Router::new();
	router.add_route(
		Route::new(
			"/q",
			endpoint(|req, _ctx, params| async move {
				assert!(matches!(req.body, RequestBody::Empty));
				Ok(Outcome::body(params.get("a").unwrap_or("-").to_string()))
			}),
		)
		.unwrap(),
	);

	let dispatcher = Dispatcher::new(router);
	let response = dispatcher.handle(get("/q?a=1")).await.unwrap();
	assert_eq!(body_text(&response), "1");
}
