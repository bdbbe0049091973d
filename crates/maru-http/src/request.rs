//! HTTP request representation.
//!
//! A [`Request`] carries the parsed head of an HTTP message plus a body in
//! one of three states: absent, fully buffered, or still streaming from the
//! transport. The dispatch layer decides when a streaming body is drained,
//! which keeps the buffering suspension point in one place.

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::Stream;
use hyper::{HeaderMap, Method, Uri, Version};
use std::net::SocketAddr;
use std::pin::Pin;

use crate::error::{Error, Result};

/// Boxed stream of body chunks as delivered by the transport.
pub type BodyStream = Pin<
	Box<dyn Stream<Item = std::result::Result<Bytes, Box<dyn std::error::Error + Send + Sync>>> + Send>,
>;

/// Body state of an in-flight request.
pub enum RequestBody {
	/// No body was supplied.
	Empty,
	/// The body has been fully read into memory.
	Buffered(Bytes),
	/// The body is still arriving from the transport.
	Pending(BodyStream),
}

impl std::fmt::Debug for RequestBody {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			RequestBody::Empty => f.write_str("Empty"),
			RequestBody::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
			RequestBody::Pending(_) => f.write_str("Pending"),
		}
	}
}

/// HTTP request as seen by endpoints.
#[derive(Debug)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: RequestBody,
	pub remote_addr: Option<SocketAddr>,
}

impl Request {
	/// Create a request from already-parsed parts.
	pub fn new(
		method: Method,
		uri: Uri,
		version: Version,
		headers: HeaderMap,
		body: RequestBody,
	) -> Self {
		Self {
			method,
			uri,
			version,
			headers,
			body,
			remote_addr: None,
		}
	}

	/// Start building a request by hand. Mostly useful in tests and custom
	/// transports.
	///
	/// # Examples
	///
	/// ```
	/// use maru_http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder()
	///     .method(Method::GET)
	///     .uri("/api/users?page=2")
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(request.path(), "/api/users");
	/// assert_eq!(request.query(), Some("page=2"));
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::new()
	}

	/// The request path, excluding the query string.
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// The raw query string, if any.
	pub fn query(&self) -> Option<&str> {
		self.uri.query()
	}

	/// True while the body is still a transport stream.
	pub fn body_is_pending(&self) -> bool {
		matches!(self.body, RequestBody::Pending(_))
	}

	/// The buffered body bytes, once available.
	pub fn body_bytes(&self) -> Option<&Bytes> {
		match &self.body {
			RequestBody::Buffered(bytes) => Some(bytes),
			_ => None,
		}
	}

	/// Drain a pending body stream into memory, appending chunks in arrival
	/// order. A no-op for empty and already-buffered bodies.
	pub async fn buffer_body(&mut self) -> Result<()> {
		if let RequestBody::Pending(stream) = &mut self.body {
			let mut buf = BytesMut::new();
			while let Some(chunk) = stream.next().await {
				let chunk =
					chunk.map_err(|e| Error::Internal(format!("request body read failed: {e}")))?;
				buf.extend_from_slice(&chunk);
			}
			self.body = RequestBody::Buffered(buf.freeze());
		}
		Ok(())
	}
}

/// Builder for [`Request`].
#[derive(Debug, Default)]
pub struct RequestBuilder {
	method: Option<Method>,
	uri: Option<String>,
	version: Option<Version>,
	headers: HeaderMap,
	body: Option<RequestBody>,
	remote_addr: Option<SocketAddr>,
}

impl RequestBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn method(mut self, method: Method) -> Self {
		self.method = Some(method);
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	pub fn version(mut self, version: Version) -> Self {
		self.version = Some(version);
		self
	}

	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Supply a fully buffered body. A request built this way counts as
	/// "body already present" during dispatch.
	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = Some(RequestBody::Buffered(body.into()));
		self
	}

	/// Supply a streaming body, as a transport would.
	pub fn streaming_body(mut self, stream: BodyStream) -> Self {
		self.body = Some(RequestBody::Pending(stream));
		self
	}

	pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
		self.remote_addr = Some(addr);
		self
	}

	pub fn build(self) -> Result<Request> {
		let uri: Uri = self
			.uri
			.unwrap_or_else(|| "/".to_string())
			.parse()
			.map_err(|e| Error::ImproperlyConfigured(format!("invalid uri: {e}")))?;

		Ok(Request {
			method: self.method.unwrap_or(Method::GET),
			uri,
			version: self.version.unwrap_or(Version::HTTP_11),
			headers: self.headers,
			body: self.body.unwrap_or(RequestBody::Empty),
			remote_addr: self.remote_addr,
		})
	}
}
