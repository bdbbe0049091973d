//! The merged parameter map handed to endpoints.
//!
//! Parameters accumulate from three sources in a fixed precedence order:
//! query-string pairs first, then named path captures, then URL-encoded body
//! fields. Later sources overwrite earlier ones on key collision. Positional
//! captures from patterns without names are kept in a separate ordered list
//! so they can never collide with a user-supplied key.

use hyper::Uri;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;

/// Parameters extracted for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
	named: HashMap<String, String>,
	captures: Vec<String>,
}

impl Params {
	pub fn new() -> Self {
		Self::default()
	}

	/// Seed a parameter map from a request URI's query string.
	///
	/// Keys and values are split on the first `=`, `+` decodes to a space,
	/// and percent-escapes are resolved. Decoding never fails; invalid
	/// UTF-8 sequences are replaced.
	///
	/// # Examples
	///
	/// ```
	/// use maru_http::Params;
	///
	/// let uri: hyper::Uri = "/search?q=hello+world&lang=en".parse().unwrap();
	/// let params = Params::from_query(&uri);
	/// assert_eq!(params.get("q"), Some("hello world"));
	/// assert_eq!(params.get("lang"), Some("en"));
	/// ```
	pub fn from_query(uri: &Uri) -> Self {
		let mut params = Self::new();
		if let Some(query) = uri.query() {
			for (key, value) in parse_pairs(query) {
				params.named.insert(key, value);
			}
		}
		params
	}

	/// Look up a named parameter.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.named.get(name).map(String::as_str)
	}

	/// Insert a named parameter, overwriting any earlier source.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.named.insert(name.into(), value.into());
	}

	/// Append a positional capture from a pattern without named keys.
	pub fn push_capture(&mut self, value: impl Into<String>) {
		self.captures.push(value.into());
	}

	/// Positional captures, in pattern order.
	pub fn captures(&self) -> &[String] {
		&self.captures
	}

	/// Merge parsed body fields. Body values win over query and placeholder
	/// values, in the pair order given.
	pub fn apply_body_fields(&mut self, fields: Vec<(String, String)>) {
		for (key, value) in fields {
			self.named.insert(key, value);
		}
	}

	/// Number of named parameters.
	pub fn len(&self) -> usize {
		self.named.len()
	}

	pub fn is_empty(&self) -> bool {
		self.named.is_empty() && self.captures.is_empty()
	}

	/// Iterate over named parameters in arbitrary order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.named.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

fn parse_pairs(query: &str) -> Vec<(String, String)> {
	query
		.split('&')
		.filter(|pair| !pair.is_empty())
		.map(|pair| {
			// Split on the first '=' only so values may contain '='.
			let mut parts = pair.splitn(2, '=');
			let key = decode_component(parts.next().unwrap_or(""));
			let value = decode_component(parts.next().unwrap_or(""));
			(key, value)
		})
		.collect()
}

fn decode_component(raw: &str) -> String {
	let plus_decoded = raw.replace('+', " ");
	percent_decode_str(&plus_decoded)
		.decode_utf8_lossy()
		.into_owned()
}
