//! Route table with first-match-wins lookup.

use hyper::Method;
use std::collections::HashMap;
use std::sync::Arc;

use crate::route::Route;

/// Routes grouped by HTTP method, kept in registration order.
///
/// Lookup scans a method's list front to back and returns the first route
/// whose pattern matches; registration order decides ties. The scan is
/// O(n) on purpose: route counts are small and an index would buy latency
/// nobody needs at the cost of readability.
#[derive(Debug, Default)]
pub struct Router {
	routes: HashMap<Method, Vec<Arc<Route>>>,
}

impl Router {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a route to its method's list. Registering an equivalent route
	/// twice produces two independent entries; the earlier one keeps
	/// winning lookups.
	pub fn add_route(&mut self, route: Route) {
		self.routes
			.entry(route.method().clone())
			.or_default()
			.push(Arc::new(route));
	}

	/// Find the first route for `method` whose pattern matches `path`.
	/// The path must not include a query string.
	pub fn find(&self, method: &Method, path: &str) -> Option<Arc<Route>> {
		self.routes
			.get(method)?
			.iter()
			.find(|route| route.pattern().is_match(path))
			.cloned()
	}

	/// Total number of registered routes.
	pub fn len(&self) -> usize {
		self.routes.values().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use maru_http::{Endpoint, FunctionEndpoint, Outcome, Params, Request, ResponseContext};

	fn marked(mark: &'static str) -> Arc<dyn Endpoint> {
		Arc::new(FunctionEndpoint::new(
			move |_req: Request, _ctx: ResponseContext, _params: Params| async move {
				Ok(Outcome::body(mark))
			},
		))
	}

	fn route(path: &str, mark: &'static str) -> Route {
		Route::new(path, marked(mark)).unwrap()
	}

	async fn mark_of(route: &Route) -> String {
		use maru_http::{Params, Request, ResponseContext};
		let request = Request::builder().build().unwrap();
		match route
			.endpoint()
			.call(request, ResponseContext::new(None), Params::new())
			.await
			.unwrap()
		{
			Outcome::Body(body) => body,
			other => panic!("unexpected outcome: {other:?}"),
		}
	}

	#[test]
	fn find_respects_method() {
		let mut router = Router::new();
		router.add_route(route("/a", "get-a"));
		router.add_route(route("/a", "post-a").with_method(Method::POST));

		assert!(router.find(&Method::GET, "/a").is_some());
		assert!(router.find(&Method::POST, "/a").is_some());
		assert!(router.find(&Method::DELETE, "/a").is_none());
	}

	#[test]
	fn find_returns_none_for_unknown_path() {
		let mut router = Router::new();
		router.add_route(route("/a", "a"));
		assert!(router.find(&Method::GET, "/b").is_none());
	}

	#[tokio::test]
	async fn first_match_wins_in_registration_order() {
		let mut router = Router::new();
		router.add_route(route("/hello/:name", "first"));
		router.add_route(route("/hello/world", "second"));

		let found = router.find(&Method::GET, "/hello/world").unwrap();
		assert_eq!(mark_of(&found).await, "first");
	}

	#[tokio::test]
	async fn duplicate_registration_keeps_both_entries() {
		let mut router = Router::new();
		router.add_route(route("/dup", "first"));
		router.add_route(route("/dup", "second"));

		assert_eq!(router.len(), 2);
		let found = router.find(&Method::GET, "/dup").unwrap();
		assert_eq!(mark_of(&found).await, "first");
	}
}
