//! HTTP/1.1 transport based on Hyper.
//!
//! The server accepts connections, spawns one task per connection, and
//! feeds requests to a [`Handler`]. Bodies of body-bearing methods are not
//! read here; they are handed to the dispatch layer as chunk streams so
//! buffering happens at the pipeline's own suspension point.
//!
//! ## Basic Usage
//!
//! ```rust,ignore
//! use maru_server::serve;
//! use std::net::SocketAddr;
//! use std::sync::Arc;
//!
//! let addr: SocketAddr = "127.0.0.1:8124".parse()?;
//! serve(addr, Arc::new(my_handler)).await?;
//! ```

use bytes::Bytes;
use futures::TryStreamExt;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper::Method;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

use maru_http::{Error, Handler, Request, RequestBody, Response, Result};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// HTTP server driving a [`Handler`].
pub struct HttpServer {
	handler: Arc<dyn Handler>,
}

impl HttpServer {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self { handler }
	}

	/// Bind the address and serve until the process exits. Connection-level
	/// failures are logged and do not stop the accept loop.
	pub async fn listen(self, addr: SocketAddr) -> Result<()> {
		let listener = TcpListener::bind(addr)
			.await
			.map_err(|e| Error::ImproperlyConfigured(format!("failed to bind {addr}: {e}")))?;
		tracing::info!(target: "maru::server", "listening on http://{addr}");

		loop {
			let (stream, peer) = match listener.accept().await {
				Ok(accepted) => accepted,
				Err(e) => {
					tracing::error!(target: "maru::server", error = %e, "accept failed");
					continue;
				}
			};
			let handler = self.handler.clone();

			tokio::task::spawn(async move {
				if let Err(err) = handle_connection(stream, peer, handler).await {
					tracing::error!(target: "maru::server", error = %err, "connection error");
				}
			});
		}
	}
}

/// Serve a single accepted connection.
pub async fn handle_connection(
	stream: TcpStream,
	peer: SocketAddr,
	handler: Arc<dyn Handler>,
) -> std::result::Result<(), BoxError> {
	let io = TokioIo::new(stream);
	let service = RequestService {
		handler,
		remote_addr: peer,
	};

	http1::Builder::new().serve_connection(io, service).await?;

	Ok(())
}

/// Service adapter between hyper and the framework's [`Handler`].
struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = BoxError;
	type Future = Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = self.handler.clone();
		let remote_addr = self.remote_addr;

		Box::pin(async move {
			let request = into_request(req, remote_addr);

			let response = handler
				.handle(request)
				.await
				.unwrap_or_else(|_| Response::internal_server_error());

			into_hyper_response(response)
		})
	}
}

/// Convert a hyper request into the framework's request type. POST and PUT
/// bodies stay streaming; other methods drop theirs.
fn into_request(req: hyper::Request<Incoming>, remote_addr: SocketAddr) -> Request {
	let (parts, body) = req.into_parts();

	let body = if matches!(parts.method, Method::POST | Method::PUT) {
		let chunks = http_body_util::BodyStream::new(body)
			.try_filter_map(|frame| std::future::ready(Ok(frame.into_data().ok())))
			.map_err(|e: hyper::Error| Box::new(e) as BoxError);
		RequestBody::Pending(Box::pin(chunks))
	} else {
		RequestBody::Empty
	};

	let mut request = Request::new(parts.method, parts.uri, parts.version, parts.headers, body);
	request.remote_addr = Some(remote_addr);
	request
}

fn into_hyper_response(
	response: Response,
) -> std::result::Result<hyper::Response<Full<Bytes>>, BoxError> {
	let mut builder = hyper::Response::builder().status(response.status);
	for (key, value) in response.headers.iter() {
		builder = builder.header(key, value);
	}
	Ok(builder.body(Full::new(response.body))?)
}

/// Create a server for `handler` and start listening on `addr`.
pub async fn serve(addr: SocketAddr, handler: Arc<dyn Handler>) -> Result<()> {
	let server = HttpServer::new(handler);
	server.listen(addr).await
}
