//! Per-request response state and handler outcome bridging.
//!
//! A [`ResponseContext`] is created for each dispatch and shared with the
//! endpoint. It records status and header overrides, holds the request's
//! single [`Completion`] slot, and exposes [`render`](ResponseContext::render)
//! for template-backed responses. The completion lives here, per request;
//! concurrent deferred renders never interfere with each other.

use hyper::header::HeaderValue;
use hyper::{HeaderMap, StatusCode};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::render::Renderer;

/// One-shot resolution handle for a deferred response body.
///
/// Resolving or failing consumes the handle, so a body can be produced at
/// most once per request.
pub struct Completion {
	tx: oneshot::Sender<Result<String>>,
}

impl Completion {
	/// Complete the request with the given body.
	pub fn resolve(self, body: impl Into<String>) {
		let _ = self.tx.send(Ok(body.into()));
	}

	/// Complete the request with an error; the dispatcher turns it into a
	/// 500 response.
	pub fn fail(self, error: Error) {
		let _ = self.tx.send(Err(error));
	}
}

/// Result of invoking an endpoint.
///
/// The three cases correspond to the ways a handler can produce output:
/// right away, through a continuation it schedules itself, or out of band
/// via the response context (usually a template render).
pub enum Outcome {
	/// The returned string is the complete response body.
	Body(String),
	/// The callable receives the request's [`Completion`] and arranges to
	/// resolve it later.
	Deferred(Box<dyn FnOnce(Completion) + Send>),
	/// The handler already armed an out-of-band completion, typically by
	/// calling [`ResponseContext::render`].
	Pending,
}

impl Outcome {
	/// Immediate body outcome.
	pub fn body(body: impl Into<String>) -> Self {
		Outcome::Body(body.into())
	}

	/// Deferred outcome from a continuation-accepting closure.
	pub fn deferred(f: impl FnOnce(Completion) + Send + 'static) -> Self {
		Outcome::Deferred(Box::new(f))
	}
}

impl std::fmt::Debug for Outcome {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Outcome::Body(body) => f.debug_tuple("Body").field(&body.len()).finish(),
			Outcome::Deferred(_) => f.write_str("Deferred"),
			Outcome::Pending => f.write_str("Pending"),
		}
	}
}

struct ContextState {
	status: Option<StatusCode>,
	headers: HeaderMap,
	completion: Option<Completion>,
	renderer: Option<Arc<dyn Renderer>>,
	finished: bool,
}

/// Shared per-request response state.
///
/// Cheap to clone; all clones refer to the same request's state.
#[derive(Clone)]
pub struct ResponseContext {
	inner: Arc<Mutex<ContextState>>,
}

impl ResponseContext {
	pub fn new(renderer: Option<Arc<dyn Renderer>>) -> Self {
		Self {
			inner: Arc::new(Mutex::new(ContextState {
				status: None,
				headers: HeaderMap::new(),
				completion: None,
				renderer,
				finished: false,
			})),
		}
	}

	fn state(&self) -> MutexGuard<'_, ContextState> {
		// A poisoned lock only means another clone panicked mid-update;
		// the state itself is still usable.
		self.inner.lock().unwrap_or_else(|e| e.into_inner())
	}

	/// Override the response status. Unset requests finalize as 200.
	pub fn set_status(&self, status: StatusCode) {
		self.state().status = Some(status);
	}

	/// The status override, if any.
	pub fn status(&self) -> Option<StatusCode> {
		self.state().status
	}

	/// Set a response header. Invalid names or values are ignored.
	pub fn set_header(&self, name: &str, value: &str) {
		if let (Ok(name), Ok(value)) = (
			hyper::header::HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			self.state().headers.insert(name, value);
		}
	}

	/// Set redirect status (301 when none is given) and the `location`
	/// header. The response is not finalized here; the handler still
	/// returns an outcome.
	///
	/// # Examples
	///
	/// ```
	/// use maru_http::ResponseContext;
	/// use hyper::StatusCode;
	///
	/// let ctx = ResponseContext::new(None);
	/// ctx.redirect("/login", None);
	/// assert_eq!(ctx.status(), Some(StatusCode::MOVED_PERMANENTLY));
	/// ```
	pub fn redirect(&self, location: &str, status: Option<StatusCode>) {
		self.set_status(status.unwrap_or(StatusCode::MOVED_PERMANENTLY));
		self.set_header("location", location);
	}

	/// Render a template on the blocking pool and resolve this request's
	/// completion with the output. The handler should return
	/// [`Outcome::Pending`] after calling this.
	///
	/// Fails when no template engine is configured or when the completion
	/// has already been consumed.
	pub fn render<T: Serialize>(&self, template: &str, context: &T) -> Result<()> {
		let value = serde_json::to_value(context)
			.map_err(|e| Error::Render(format!("context serialization failed: {e}")))?;

		let (renderer, completion) = {
			let mut state = self.state();
			let renderer = state
				.renderer
				.clone()
				.ok_or_else(|| Error::ImproperlyConfigured("no template engine configured".into()))?;
			let completion = state
				.completion
				.take()
				.ok_or_else(|| Error::Internal("response completion already consumed".into()))?;
			(renderer, completion)
		};

		let template = template.to_string();
		tokio::task::spawn_blocking(move || match renderer.render(&template, &value) {
			Ok(body) => completion.resolve(body),
			Err(e) => {
				tracing::error!(target: "maru", template = %template, error = %e, "template render failed");
				completion.fail(e);
			}
		});

		Ok(())
	}

	/// Arm the per-request completion and return the receiving end. Called
	/// by the dispatcher before the endpoint is invoked; any previously
	/// armed completion is discarded.
	pub fn arm(&self) -> oneshot::Receiver<Result<String>> {
		let (tx, rx) = oneshot::channel();
		self.state().completion = Some(Completion { tx });
		rx
	}

	/// Take the armed completion, if still present. Used by the dispatcher
	/// to hand it to a deferred continuation.
	pub fn take_completion(&self) -> Option<Completion> {
		self.state().completion.take()
	}

	/// Mark the response finalized. A second call is an internal error; the
	/// finalizer must run exactly once per request.
	pub fn mark_finished(&self) -> Result<()> {
		let mut state = self.state();
		if state.finished {
			return Err(Error::Internal("response finalized twice".into()));
		}
		state.finished = true;
		Ok(())
	}

	/// Snapshot of the status and header overrides for the finalizer.
	pub fn response_overrides(&self) -> (Option<StatusCode>, HeaderMap) {
		let state = self.state();
		(state.status, state.headers.clone())
	}
}
