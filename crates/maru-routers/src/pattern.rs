//! Path pattern compilation.
//!
//! A route's path is declared as a [`PathSpec`] and compiled once, at
//! registration time, into a [`PathPattern`]:
//!
//! - Literal paths match by full-string equality.
//! - Placeholder paths contain `:name` tokens (a colon followed by ASCII
//!   letters). Each token matches one or more characters excluding `?`,
//!   `/`, `#`, and `&`, so a placeholder never crosses a path segment or
//!   leaks into a query string. The surrounding text is matched literally
//!   and the whole pattern is anchored at both ends.
//! - Raw regular expressions are used as given; the caller supplies the
//!   matching semantics, including any anchoring.
//!
//! Placeholder names are ASCII letters only by design. A `:` not followed
//! by a letter stays a literal character, so a spec like `/v:1` compiles
//! but never matches as a placeholder. That is a documented limitation,
//! not an error.

use regex::Regex;

use maru_http::{Error, Result};

/// A route path declaration, classified at registration time.
#[derive(Debug, Clone)]
pub enum PathSpec {
	/// Exact path with no placeholders.
	Literal(String),
	/// Path containing one or more `:name` tokens.
	Placeholders(String),
	/// Prebuilt regular expression, used as-is.
	Raw(Regex),
}

impl From<&str> for PathSpec {
	fn from(path: &str) -> Self {
		if contains_placeholder(path) {
			PathSpec::Placeholders(path.to_string())
		} else {
			PathSpec::Literal(path.to_string())
		}
	}
}

impl From<String> for PathSpec {
	fn from(path: String) -> Self {
		PathSpec::from(path.as_str())
	}
}

impl From<Regex> for PathSpec {
	fn from(regex: Regex) -> Self {
		PathSpec::Raw(regex)
	}
}

fn contains_placeholder(path: &str) -> bool {
	path.as_bytes()
		.windows(2)
		.any(|w| w[0] == b':' && w[1].is_ascii_alphabetic())
}

#[derive(Debug, Clone)]
enum PatternKind {
	Exact(String),
	Pattern(Regex),
}

/// A compiled, matchable path pattern with its ordered placeholder names.
///
/// Invariant: for placeholder patterns, a successful match produces exactly
/// `keys().len()` captures, in declaration order. Raw patterns may capture
/// without names; those captures are positional.
#[derive(Debug, Clone)]
pub struct PathPattern {
	kind: PatternKind,
	keys: Vec<String>,
	source: String,
}

impl PathPattern {
	/// Compile a path declaration.
	///
	/// # Examples
	///
	/// ```
	/// use maru_routers::{PathPattern, PathSpec};
	///
	/// let pattern = PathPattern::compile(PathSpec::from("/hello/:name")).unwrap();
	/// assert_eq!(pattern.keys(), &["name".to_string()]);
	/// assert!(pattern.is_match("/hello/ferris"));
	/// assert!(!pattern.is_match("/hello/a/b"));
	/// ```
	pub fn compile(spec: PathSpec) -> Result<Self> {
		match spec {
			PathSpec::Literal(path) => Ok(Self {
				source: path.clone(),
				kind: PatternKind::Exact(path),
				keys: Vec::new(),
			}),
			PathSpec::Placeholders(path) => {
				let (regex, keys) = compile_placeholders(&path)?;
				Ok(Self {
					source: path,
					kind: PatternKind::Pattern(regex),
					keys,
				})
			}
			PathSpec::Raw(regex) => Ok(Self {
				source: regex.as_str().to_string(),
				kind: PatternKind::Pattern(regex),
				keys: Vec::new(),
			}),
		}
	}

	/// Ordered placeholder names; empty for literal and raw patterns.
	pub fn keys(&self) -> &[String] {
		&self.keys
	}

	/// Whether the pattern matches the given path.
	pub fn is_match(&self, path: &str) -> bool {
		match &self.kind {
			PatternKind::Exact(expected) => expected == path,
			PatternKind::Pattern(regex) => regex.is_match(path),
		}
	}

	/// Captured substrings for a matching path, with the whole-match
	/// capture dropped. `None` when the path does not match.
	pub fn captures(&self, path: &str) -> Option<Vec<String>> {
		match &self.kind {
			PatternKind::Exact(expected) => (expected == path).then(Vec::new),
			PatternKind::Pattern(regex) => regex.captures(path).map(|caps| {
				caps.iter()
					.skip(1)
					.map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
					.collect()
			}),
		}
	}
}

impl std::fmt::Display for PathPattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.source)
	}
}

/// Compile a placeholder path into an anchored regex plus the token names
/// found, left to right.
fn compile_placeholders(path: &str) -> Result<(Regex, Vec<String>)> {
	let mut regex_str = String::from("^");
	let mut keys = Vec::new();
	let mut chars = path.chars().peekable();

	while let Some(c) = chars.next() {
		if c == ':' && chars.peek().is_some_and(|next| next.is_ascii_alphabetic()) {
			let mut name = String::new();
			while let Some(&next) = chars.peek() {
				if next.is_ascii_alphabetic() {
					name.push(next);
					chars.next();
				} else {
					break;
				}
			}
			keys.push(name);
			regex_str.push_str("([^?/#&]+)");
		} else {
			regex_str.push_str(&regex::escape(&c.to_string()));
		}
	}
	regex_str.push('$');

	let regex = Regex::new(&regex_str)
		.map_err(|e| Error::ImproperlyConfigured(format!("invalid path pattern {path:?}: {e}")))?;
	Ok((regex, keys))
}
