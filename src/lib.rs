//! # Maru
//!
//! A minimal HTTP routing micro framework. Maru keeps route definition
//! readable: declare paths as literals, `:name` placeholder strings, or raw
//! regular expressions, attach async handlers, and let the dispatch
//! pipeline merge query, path, and form parameters into one map.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use maru::{App, Outcome};
//!
//! #[tokio::main]
//! async fn main() -> maru::Result<()> {
//!     App::new()
//!         .get("/", |_req, _ctx, _params| async {
//!             Ok(Outcome::body("hello world"))
//!         })
//!         .get("/hello/:name", |_req, _ctx, params| async move {
//!             let name = params.get("name").unwrap_or("stranger").to_string();
//!             Ok(Outcome::body(format!("hello {name}")))
//!         })
//!         .run()
//!         .await
//! }
//! ```
//!
//! ## Handler outcomes
//!
//! A handler produces its body in one of three ways:
//!
//! - [`Outcome::Body`] carries the complete response body.
//! - [`Outcome::Deferred`] wraps a closure that receives the request's
//!   [`Completion`] and resolves it whenever it is ready.
//! - [`Outcome::Pending`] signals that something else resolves the request,
//!   usually a template render started with
//!   [`ResponseContext::render`].
//!
//! ## Process-wide registry
//!
//! For throwaway programs there is a module-level registration API holding
//! one process-scoped [`App`]:
//!
//! ```rust,no_run
//! use maru::Outcome;
//!
//! #[tokio::main]
//! async fn main() -> maru::Result<()> {
//!     maru::get("/", |_req, _ctx, _params| async {
//!         Ok(Outcome::body("hi"))
//!     });
//!     maru::run(None).await
//! }
//! ```
//!
//! The registry is a thin wrapper over an ordinary [`App`]; the core never
//! reads global state. `maru::registry::reset()` tears the instance down.

pub mod app;
pub mod config;
pub mod registry;

pub use app::App;
pub use config::ServerConfig;
pub use registry::{delete, get, post, put, run};

pub use maru_http::{
	BodyStream, Completion, Endpoint, Error, FunctionEndpoint, Handler, Outcome, Params, Renderer,
	Request, RequestBody, RequestBuilder, Response, ResponseContext, Result,
};
pub use maru_routers::{Dispatcher, PathPattern, PathSpec, Route, Router};
pub use maru_server::{HttpServer, serve};
pub use maru_template::TeraEngine;

/// Prelude module for convenient imports.
pub mod prelude {
	pub use crate::app::App;
	pub use crate::config::ServerConfig;

	pub use maru_http::{
		Completion, Endpoint, Error, Outcome, Params, Request, Response, ResponseContext, Result,
	};
	pub use maru_routers::{Route, Router};
	pub use maru_template::TeraEngine;

	pub use async_trait::async_trait;
}
