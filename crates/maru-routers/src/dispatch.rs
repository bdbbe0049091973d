//! The dispatch pipeline.
//!
//! One request moves through ROUTING, then BODY_PENDING or READY, then
//! HANDLING, and ends FINISHED or ERRORED:
//!
//! - ROUTING: look up method and path in the route table. No match means an
//!   immediate 404.
//! - BODY_PENDING: POST and PUT bodies still streaming from the transport
//!   are buffered chunk by chunk in arrival order, then parsed as
//!   URL-encoded form data and merged into the parameter map, where body
//!   fields win over query and placeholder values. A body that was already
//!   buffered before dispatch is left untouched.
//! - HANDLING: the endpoint runs with the request, a fresh per-request
//!   [`ResponseContext`], and the merged parameters. Its [`Outcome`] either
//!   carries the body, hands a continuation the request's [`Completion`],
//!   or signals that an out-of-band render will resolve it.
//! - FINISHED: the finalizer applies status and content-type defaults,
//!   emits one access-log line, and builds the response exactly once.
//!
//! Endpoint errors are caught here, logged through the process sink, and
//! surfaced as 500 without leaking details to the client. There are no
//! retries; every failure is local to its request.

use async_trait::async_trait;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Method, StatusCode, Version};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

use maru_http::{Error, Handler, Outcome, Renderer, Request, Response, ResponseContext, Result};

use crate::extract::extract;
use crate::route::Route;
use crate::router::Router;

/// Drives requests from route lookup to a finalized response.
///
/// The router is frozen at construction and shared read-only; building a
/// dispatcher is the point after which no route may be added.
pub struct Dispatcher {
	router: Router,
	renderer: Option<Arc<dyn Renderer>>,
	completion_timeout: Option<Duration>,
}

impl Dispatcher {
	pub fn new(router: Router) -> Self {
		Self {
			router,
			renderer: None,
			completion_timeout: None,
		}
	}

	/// Attach a template engine made available to endpoints through
	/// [`ResponseContext::render`].
	pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
		self.renderer = Some(renderer);
		self
	}

	/// Bound the wait on deferred and out-of-band completions. Without a
	/// limit a request whose completion never resolves waits forever, as
	/// the original semantics demand; with one it finalizes as 504.
	pub fn with_completion_timeout(mut self, limit: Duration) -> Self {
		self.completion_timeout = Some(limit);
		self
	}

	async fn dispatch(&self, mut request: Request) -> Response {
		let log = AccessLine::begin(&request);

		// ROUTING
		let route = match self.router.find(&request.method, request.path()) {
			Some(route) => route,
			None => return log.emit(not_found()),
		};

		// BODY_PENDING: only bodies the dispatcher drains itself are
		// parsed; a pre-buffered body was someone else's responsibility.
		let body_fields = if body_bearing(&request.method) && request.body_is_pending() {
			if let Err(e) = request.buffer_body().await {
				tracing::error!(target: "maru", error = %e, "failed to read request body");
				return log.emit(server_error());
			}
			match parse_form(&request) {
				Ok(fields) => Some(fields),
				Err(e) => {
					tracing::error!(target: "maru", error = %e, "failed to parse request body");
					return log.emit(server_error());
				}
			}
		} else {
			None
		};

		// READY
		let mut params = match extract(&route, &request.uri) {
			Ok(params) => params,
			Err(e) => {
				tracing::error!(target: "maru", error = %e, "parameter extraction failed");
				return log.emit(server_error());
			}
		};
		if let Some(fields) = body_fields {
			params.apply_body_fields(fields);
		}

		// HANDLING
		let ctx = ResponseContext::new(self.renderer.clone());
		let completion_rx = ctx.arm();

		let body = match route.endpoint().call(request, ctx.clone(), params).await {
			Ok(Outcome::Body(body)) => body,
			Ok(Outcome::Deferred(continuation)) => {
				let Some(completion) = ctx.take_completion() else {
					tracing::error!(target: "maru", "deferred endpoint already consumed its completion");
					return log.emit(server_error());
				};
				continuation(completion);
				match self.await_completion(completion_rx).await {
					Ok(body) => body,
					Err(e) => return log.emit(completion_failure(e)),
				}
			}
			Ok(Outcome::Pending) => match self.await_completion(completion_rx).await {
				Ok(body) => body,
				Err(e) => return log.emit(completion_failure(e)),
			},
			Err(e) => {
				tracing::error!(target: "maru", error = %e, "handler failed");
				return log.emit(server_error());
			}
		};

		// FINISHED
		match finish(&ctx, &route, body) {
			Ok(response) => log.emit(response),
			Err(e) => {
				tracing::error!(target: "maru", error = %e, "finalization failed");
				log.emit(server_error())
			}
		}
	}

	async fn await_completion(&self, rx: oneshot::Receiver<Result<String>>) -> Result<String> {
		let resolved = async {
			match rx.await {
				Ok(result) => result,
				Err(_) => Err(Error::Internal(
					"completion dropped without resolving".into(),
				)),
			}
		};

		match self.completion_timeout {
			Some(limit) => match tokio::time::timeout(limit, resolved).await {
				Ok(result) => result,
				Err(_) => Err(Error::Timeout(format!(
					"deferred response did not resolve within {limit:?}"
				))),
			},
			None => resolved.await,
		}
	}
}

#[async_trait]
impl Handler for Dispatcher {
	async fn handle(&self, request: Request) -> Result<Response> {
		Ok(self.dispatch(request).await)
	}
}

/// Apply defaults and build the response. Runs exactly once per request;
/// the context's guard turns a second attempt into an error instead of a
/// double write.
fn finish(ctx: &ResponseContext, route: &Route, body: String) -> Result<Response> {
	ctx.mark_finished()?;

	let (status, headers) = ctx.response_overrides();
	let mut response = Response::new(status.unwrap_or(StatusCode::OK)).with_body(body);
	response.headers = headers;

	if !response.headers.contains_key(CONTENT_TYPE) {
		let value = HeaderValue::from_str(route.content_type())
			.unwrap_or_else(|_| HeaderValue::from_static(crate::route::DEFAULT_CONTENT_TYPE));
		response.headers.insert(CONTENT_TYPE, value);
	}

	Ok(response)
}

fn body_bearing(method: &Method) -> bool {
	matches!(*method, Method::POST | Method::PUT)
}

fn parse_form(request: &Request) -> Result<Vec<(String, String)>> {
	let bytes: &[u8] = request.body_bytes().map(|b| b.as_ref()).unwrap_or_default();
	serde_urlencoded::from_bytes::<Vec<(String, String)>>(bytes)
		.map_err(|e| Error::MalformedBody(e.to_string()))
}

fn not_found() -> Response {
	Response::not_found()
		.with_header("content-type", "text/plain")
		.with_body("Sorry, route not found")
}

fn server_error() -> Response {
	Response::internal_server_error()
		.with_header("content-type", "text/plain")
		.with_body("Internal Server Error")
}

fn gateway_timeout() -> Response {
	Response::new(StatusCode::GATEWAY_TIMEOUT)
		.with_header("content-type", "text/plain")
		.with_body("Gateway Timeout")
}

fn completion_failure(error: Error) -> Response {
	match error {
		Error::Timeout(_) => {
			tracing::error!(target: "maru", error = %error, "deferred response timed out");
			gateway_timeout()
		}
		_ => {
			tracing::error!(target: "maru", error = %error, "deferred response failed");
			server_error()
		}
	}
}

/// Access-log fields captured before the request is handed to the
/// endpoint, emitted once the response is known.
struct AccessLine {
	remote: String,
	method: Method,
	target: String,
	version: &'static str,
}

impl AccessLine {
	fn begin(request: &Request) -> Self {
		Self {
			remote: request
				.remote_addr
				.map(|addr| addr.ip().to_string())
				.unwrap_or_else(|| "-".to_string()),
			method: request.method.clone(),
			target: request
				.uri
				.path_and_query()
				.map(|pq| pq.as_str().to_string())
				.unwrap_or_else(|| request.uri.path().to_string()),
			version: version_label(request.version),
		}
	}

	fn emit(self, response: Response) -> Response {
		let timestamp = chrono::Local::now().format("%d/%b/%Y:%H:%M:%S %z");
		tracing::info!(
			target: "maru::access",
			"{}",
			self.format(&timestamp.to_string(), &response)
		);
		response
	}

	fn format(&self, timestamp: &str, response: &Response) -> String {
		format!(
			"{} - [{}] \"{} {} HTTP/{}\" {} {}",
			self.remote,
			timestamp,
			self.method,
			self.target,
			self.version,
			response.status.as_u16(),
			response.body_len()
		)
	}
}

fn version_label(version: Version) -> &'static str {
	match version {
		Version::HTTP_09 => "0.9",
		Version::HTTP_10 => "1.0",
		Version::HTTP_11 => "1.1",
		Version::HTTP_2 => "2.0",
		Version::HTTP_3 => "3.0",
		_ => "1.1",
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn access_line_format_is_fixed() {
		let request = Request::builder()
			.method(Method::GET)
			.uri("/hello?x=1")
			.remote_addr("192.168.0.7:5000".parse().unwrap())
			.build()
			.unwrap();

		let line = AccessLine::begin(&request);
		let response = Response::ok().with_body("12345");
		assert_eq!(
			line.format("06/Aug/2026:10:30:00 +0000", &response),
			"192.168.0.7 - [06/Aug/2026:10:30:00 +0000] \"GET /hello?x=1 HTTP/1.1\" 200 5"
		);
	}

	#[test]
	fn access_line_without_remote_renders_dash() {
		let request = Request::builder().uri("/x").build().unwrap();
		let line = AccessLine::begin(&request);
		let response = Response::not_found();
		assert!(
			line.format("06/Aug/2026:10:30:00 +0000", &response)
				.starts_with("- - [")
		);
	}

	#[test]
	fn version_labels() {
		assert_eq!(version_label(Version::HTTP_10), "1.0");
		assert_eq!(version_label(Version::HTTP_11), "1.1");
		assert_eq!(version_label(Version::HTTP_2), "2.0");
	}
}
