//! Route definition.

use hyper::Method;
use std::sync::Arc;

use maru_http::{Endpoint, Result};

use crate::pattern::{PathPattern, PathSpec};

/// Default content type applied when neither the handler nor the route set
/// one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// A single registered route: method, compiled path pattern, endpoint, and
/// the content type its responses default to.
///
/// Immutable once registered; routes live for the process lifetime.
#[derive(Clone)]
pub struct Route {
	method: Method,
	pattern: PathPattern,
	endpoint: Arc<dyn Endpoint>,
	content_type: String,
}

impl Route {
	/// Create a route for the given path declaration. The method defaults
	/// to GET and the content type to `text/html`.
	///
	/// Fails when a placeholder path does not compile to a valid pattern.
	pub fn new(spec: impl Into<PathSpec>, endpoint: Arc<dyn Endpoint>) -> Result<Self> {
		Ok(Self {
			method: Method::GET,
			pattern: PathPattern::compile(spec.into())?,
			endpoint,
			content_type: DEFAULT_CONTENT_TYPE.to_string(),
		})
	}

	/// Set the HTTP method this route answers.
	pub fn with_method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	/// Set the default content type for this route's responses.
	pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type = content_type.into();
		self
	}

	pub fn method(&self) -> &Method {
		&self.method
	}

	pub fn pattern(&self) -> &PathPattern {
		&self.pattern
	}

	pub fn endpoint(&self) -> &Arc<dyn Endpoint> {
		&self.endpoint
	}

	pub fn content_type(&self) -> &str {
		&self.content_type
	}
}

impl std::fmt::Debug for Route {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Route")
			.field("method", &self.method)
			.field("pattern", &self.pattern)
			.field("content_type", &self.content_type)
			.finish_non_exhaustive()
	}
}
