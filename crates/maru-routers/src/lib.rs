//! # maru routers
//!
//! URL routing and dispatch for the maru framework:
//!
//! - **Path patterns**: literal paths, `:name` placeholder paths, and raw
//!   regular expressions, classified once at registration time
//! - **Route table**: per-method registration-ordered lists with
//!   first-match-wins lookup
//! - **Parameter extraction**: query string, named captures, and positional
//!   captures merged into one [`Params`](maru_http::Params) map
//! - **Dispatch pipeline**: body buffering for POST/PUT, endpoint
//!   invocation, deferred and template-backed completions, and an
//!   exactly-once response finalizer with access logging
//!
//! # Examples
//!
//! ```
//! use maru_routers::{Route, Router};
//! use maru_http::{FunctionEndpoint, Outcome, Params, Request, ResponseContext};
//! use std::sync::Arc;
//!
//! let endpoint = Arc::new(FunctionEndpoint::new(
//!     |_req: Request, _ctx: ResponseContext, _params: Params| async {
//!         Ok(Outcome::body("hi"))
//!     },
//! ));
//!
//! let mut router = Router::new();
//! router.add_route(Route::new("/hello/:name", endpoint).unwrap());
//!
//! assert!(router.find(&hyper::Method::GET, "/hello/ferris").is_some());
//! assert!(router.find(&hyper::Method::GET, "/goodbye").is_none());
//! ```

pub mod dispatch;
pub mod extract;
pub mod pattern;
pub mod route;
pub mod router;

pub use dispatch::Dispatcher;
pub use extract::extract;
pub use pattern::{PathPattern, PathSpec};
pub use route::Route;
pub use router::Router;
