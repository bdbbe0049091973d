//! Parameter extraction for a matched route.

use hyper::Uri;

use maru_http::{Error, Params, Result};

use crate::route::Route;

/// Build the parameter map for a route the router already matched.
///
/// The map starts from the decoded query string, then named captures are
/// applied on top (overwriting query values on collision), and captures
/// without a name are appended to the positional list. Body fields, when
/// present, are merged later by the dispatcher and win over everything
/// here.
///
/// The route's pattern is matched against the path again; a mismatch at
/// this point means the router and the pattern disagree, which is an
/// internal-consistency error and fails fast rather than producing an
/// empty map.
pub fn extract(route: &Route, uri: &Uri) -> Result<Params> {
	let mut params = Params::from_query(uri);

	let path = uri.path();
	let values = route.pattern().captures(path).ok_or_else(|| {
		Error::Internal(format!(
			"route {} matched but produced no captures for {path}",
			route.pattern()
		))
	})?;

	let keys = route.pattern().keys();
	for (i, value) in values.into_iter().enumerate() {
		match keys.get(i) {
			Some(key) => params.insert(key.clone(), value),
			None => params.push_capture(value),
		}
	}

	Ok(params)
}

#[cfg(test)]
mod tests {
	use super::*;
	use maru_http::{Endpoint, FunctionEndpoint, Outcome, Request, ResponseContext};
	use regex::Regex;
	use std::sync::Arc;

	fn dummy() -> Arc<dyn Endpoint> {
		Arc::new(FunctionEndpoint::new(
			|_req: Request, _ctx: ResponseContext, _params: Params| async {
				Ok(Outcome::body(""))
			},
		))
	}

	fn uri(s: &str) -> Uri {
		s.parse().unwrap()
	}

	#[test]
	fn named_captures_plus_query() {
		let route = Route::new("/hello/:and/:junk", dummy()).unwrap();
		let params = extract(&route, &uri("/hello/foo/bar?extra=1")).unwrap();

		assert_eq!(params.get("and"), Some("foo"));
		assert_eq!(params.get("junk"), Some("bar"));
		assert_eq!(params.get("extra"), Some("1"));
		assert!(params.captures().is_empty());
	}

	#[test]
	fn placeholder_capture_overwrites_query_value() {
		let route = Route::new("/item/:id", dummy()).unwrap();
		let params = extract(&route, &uri("/item/path?id=query")).unwrap();
		assert_eq!(params.get("id"), Some("path"));
	}

	#[test]
	fn unnamed_captures_are_positional() {
		let regex = Regex::new("/kaka/(.*?)/junk").unwrap();
		let route = Route::new(regex, dummy()).unwrap();
		let params = extract(&route, &uri("/kaka/hi/junk")).unwrap();

		assert_eq!(params.captures(), &["hi".to_string()]);
		assert_eq!(params.len(), 0);
	}

	#[test]
	fn literal_route_yields_query_only() {
		let route = Route::new("/plain", dummy()).unwrap();
		let params = extract(&route, &uri("/plain?a=1&b=2")).unwrap();
		assert_eq!(params.get("a"), Some("1"));
		assert_eq!(params.get("b"), Some("2"));
		assert!(params.captures().is_empty());
	}

	#[test]
	fn mismatched_path_fails_fast() {
		let route = Route::new("/hello/:name", dummy()).unwrap();
		let result = extract(&route, &uri("/other"));
		assert!(matches!(result, Err(Error::Internal(_))));
	}
}
