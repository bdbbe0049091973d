//! Handler traits.
//!
//! [`Endpoint`] is what applications implement (or provide as plain async
//! functions through [`FunctionEndpoint`]): it receives the request, the
//! per-request response context, and the merged parameters, and returns an
//! [`Outcome`]. [`Handler`] is the transport-facing seam: one request in,
//! one response out. The dispatcher implements `Handler` on top of the
//! registered `Endpoint`s.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use crate::context::{Outcome, ResponseContext};
use crate::error::Result;
use crate::params::Params;
use crate::request::Request;
use crate::response::Response;

/// A registered request handler.
#[async_trait]
pub trait Endpoint: Send + Sync {
	async fn call(&self, request: Request, ctx: ResponseContext, params: Params)
	-> Result<Outcome>;
}

/// Adapter turning a plain async function into an [`Endpoint`].
///
/// # Examples
///
/// ```no_run
/// use maru_http::{FunctionEndpoint, Outcome, Params, Request, ResponseContext, Result};
///
/// async fn hello(_req: Request, _ctx: ResponseContext, params: Params) -> Result<Outcome> {
///     let name = params.get("name").unwrap_or("world").to_string();
///     Ok(Outcome::body(format!("hello {name}")))
/// }
///
/// let endpoint = FunctionEndpoint::new(hello);
/// ```
pub struct FunctionEndpoint<F> {
	func: F,
}

impl<F> FunctionEndpoint<F> {
	pub fn new(func: F) -> Self {
		Self { func }
	}
}

#[async_trait]
impl<F, Fut> Endpoint for FunctionEndpoint<F>
where
	F: Fn(Request, ResponseContext, Params) -> Fut + Send + Sync,
	Fut: Future<Output = Result<Outcome>> + Send + 'static,
{
	async fn call(
		&self,
		request: Request,
		ctx: ResponseContext,
		params: Params,
	) -> Result<Outcome> {
		(self.func)(request, ctx, params).await
	}
}

/// Transport-facing request handler: all dispatch pipelines implement this.
#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> Result<Response>;
}

/// Allows `Arc<dyn Handler>` to be used wherever a `Handler` is expected.
#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}
