//! HTTP response representation.

use bytes::Bytes;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{HeaderMap, StatusCode};

/// HTTP response produced by dispatch.
#[derive(Debug)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	/// Create a new response with the given status code and an empty body.
	///
	/// # Examples
	///
	/// ```
	/// use maru_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::new(StatusCode::CREATED);
	/// assert_eq!(response.status, StatusCode::CREATED);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	/// HTTP 200 OK.
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// HTTP 404 Not Found.
	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	/// HTTP 500 Internal Server Error.
	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// HTTP 301 Moved Permanently with a `location` header.
	///
	/// # Examples
	///
	/// ```
	/// use maru_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::permanent_redirect("/new-home");
	/// assert_eq!(response.status, StatusCode::MOVED_PERMANENTLY);
	/// assert_eq!(response.headers.get("location").unwrap(), "/new-home");
	/// ```
	pub fn permanent_redirect(location: impl AsRef<str>) -> Self {
		Self::new(StatusCode::MOVED_PERMANENTLY).with_location(location.as_ref())
	}

	/// HTTP 302 Found with a `location` header.
	pub fn found(location: impl AsRef<str>) -> Self {
		Self::new(StatusCode::FOUND).with_location(location.as_ref())
	}

	/// Replace the body.
	///
	/// # Examples
	///
	/// ```
	/// use maru_http::Response;
	///
	/// let response = Response::ok().with_body("Hello, World!");
	/// assert_eq!(&response.body[..], b"Hello, World!");
	/// ```
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Set a header. Invalid header names or values are ignored.
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}

	/// Set the `location` header, typically for redirects.
	pub fn with_location(self, location: &str) -> Self {
		self.with_header("location", location)
	}

	/// Length of the body in bytes.
	pub fn body_len(&self) -> usize {
		self.body.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_constructors() {
		assert_eq!(Response::ok().status, StatusCode::OK);
		assert_eq!(Response::not_found().status, StatusCode::NOT_FOUND);
		assert_eq!(
			Response::internal_server_error().status,
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}

	#[test]
	fn found_sets_location() {
		let response = Response::found("/elsewhere");
		assert_eq!(response.status, StatusCode::FOUND);
		assert_eq!(response.headers.get("location").unwrap(), "/elsewhere");
	}

	#[test]
	fn invalid_header_is_ignored() {
		let response = Response::ok().with_header("bad header", "x");
		assert!(response.headers.is_empty());
	}
}
