//! Application builder.
//!
//! An [`App`] collects routes and configuration, then freezes into a
//! [`Dispatcher`] when the server starts. Registration therefore completes
//! strictly before the first connection is accepted; the running route
//! table is immutable and shared without locking.

use hyper::Method;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use maru_http::{
	Endpoint, FunctionEndpoint, Handler, Outcome, Params, Renderer, Request, ResponseContext,
	Result,
};
use maru_routers::{Dispatcher, PathSpec, Route, Router};
use maru_template::TeraEngine;

use crate::config::ServerConfig;

/// Builder for a maru application.
///
/// # Examples
///
/// ```
/// use maru::{App, Outcome};
///
/// let app = App::new()
///     .get("/", |_req, _ctx, _params| async { Ok(Outcome::body("home")) })
///     .post("/submit", |_req, _ctx, params| async move {
///         Ok(Outcome::body(params.get("value").unwrap_or("none").to_string()))
///     });
///
/// assert_eq!(app.route_count(), 2);
/// ```
pub struct App {
	router: Router,
	renderer: Option<Arc<dyn Renderer>>,
	config: ServerConfig,
}

impl App {
	pub fn new() -> Self {
		Self {
			router: Router::new(),
			renderer: None,
			config: ServerConfig::default(),
		}
	}

	/// Add a fully built route.
	pub fn route(mut self, route: Route) -> Self {
		self.router.add_route(route);
		self
	}

	/// Add a batch of routes, preserving their order.
	pub fn routes(mut self, routes: Vec<Route>) -> Self {
		for route in routes {
			self.router.add_route(route);
		}
		self
	}

	/// Register a GET handler.
	pub fn get<F, Fut>(self, spec: impl Into<PathSpec>, func: F) -> Self
	where
		F: Fn(Request, ResponseContext, Params) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<Outcome>> + Send + 'static,
	{
		self.register(Method::GET, spec, func)
	}

	/// Register a POST handler.
	pub fn post<F, Fut>(self, spec: impl Into<PathSpec>, func: F) -> Self
	where
		F: Fn(Request, ResponseContext, Params) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<Outcome>> + Send + 'static,
	{
		self.register(Method::POST, spec, func)
	}

	/// Register a PUT handler.
	pub fn put<F, Fut>(self, spec: impl Into<PathSpec>, func: F) -> Self
	where
		F: Fn(Request, ResponseContext, Params) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<Outcome>> + Send + 'static,
	{
		self.register(Method::PUT, spec, func)
	}

	/// Register a DELETE handler.
	pub fn delete<F, Fut>(self, spec: impl Into<PathSpec>, func: F) -> Self
	where
		F: Fn(Request, ResponseContext, Params) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<Outcome>> + Send + 'static,
	{
		self.register(Method::DELETE, spec, func)
	}

	fn register<F, Fut>(self, method: Method, spec: impl Into<PathSpec>, func: F) -> Self
	where
		F: Fn(Request, ResponseContext, Params) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<Outcome>> + Send + 'static,
	{
		let endpoint: Arc<dyn Endpoint> = Arc::new(FunctionEndpoint::new(func));
		// Route specs are application configuration; a bad pattern is a
		// startup defect, same as a bad listen address.
		let route = Route::new(spec, endpoint)
			.expect("invalid route pattern")
			.with_method(method);
		self.route(route)
	}

	/// Attach a template engine.
	pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
		self.renderer = Some(renderer);
		self
	}

	/// Load templates from a directory and attach the resulting engine.
	pub fn with_template_root(self, root: impl AsRef<Path>) -> Result<Self> {
		let engine = TeraEngine::from_dir(root)?;
		Ok(self.with_renderer(Arc::new(engine)))
	}

	/// Replace the server configuration.
	pub fn with_config(mut self, config: ServerConfig) -> Self {
		self.config = config;
		self
	}

	/// Number of registered routes.
	pub fn route_count(&self) -> usize {
		self.router.len()
	}

	/// Freeze the route table into a dispatcher.
	pub fn into_dispatcher(self) -> Dispatcher {
		let mut dispatcher = Dispatcher::new(self.router);
		if let Some(renderer) = self.renderer {
			dispatcher = dispatcher.with_renderer(renderer);
		}
		if let Some(limit) = self.config.completion_timeout() {
			dispatcher = dispatcher.with_completion_timeout(limit);
		}
		dispatcher
	}

	/// Freeze into a transport-facing handler.
	pub fn into_handler(self) -> Arc<dyn Handler> {
		Arc::new(self.into_dispatcher())
	}

	/// Start serving with the app's configuration. Consumes the builder;
	/// no route can be added past this point.
	pub async fn run(self) -> Result<()> {
		let addr = self.config.addr()?;
		let handler = self.into_handler();
		maru_server::serve(addr, handler).await
	}
}

impl Default for App {
	fn default() -> Self {
		Self::new()
	}
}
