//! Tera-backed template rendering.
//!
//! [`TeraEngine`] implements the framework's
//! [`Renderer`](maru_http::Renderer) seam with the Tera template engine.
//! Templates come either from a root directory loaded at startup or from
//! raw strings registered by hand, which keeps tests free of filesystem
//! fixtures.
//!
//! # Examples
//!
//! ```
//! use maru_http::Renderer;
//! use maru_template::TeraEngine;
//! use serde_json::json;
//!
//! let mut engine = TeraEngine::empty();
//! engine
//!     .add_raw_template("hello.html", "hello {{ name }}")
//!     .unwrap();
//!
//! let out = engine.render("hello.html", &json!({ "name": "maru" })).unwrap();
//! assert_eq!(out, "hello maru");
//! ```

use std::path::Path;
use tera::{Context, Tera};

use maru_http::{Error, Renderer, Result};

/// Directory templates are loaded from when no explicit root is given.
pub const DEFAULT_TEMPLATE_ROOT: &str = "./templates";

/// Runtime template engine wrapping [`Tera`].
pub struct TeraEngine {
	tera: Tera,
}

impl TeraEngine {
	/// An engine with no templates registered. Combine with
	/// [`add_raw_template`](Self::add_raw_template).
	pub fn empty() -> Self {
		Self {
			tera: Tera::default(),
		}
	}

	/// Load every template under `root`, recursively. Template names are
	/// paths relative to the root.
	pub fn from_dir(root: impl AsRef<Path>) -> Result<Self> {
		let root = root.as_ref();
		let glob = format!("{}/**/*", root.display());
		let tera = Tera::new(&glob).map_err(|e| {
			Error::ImproperlyConfigured(format!(
				"template root {} failed to load: {e}",
				root.display()
			))
		})?;
		Ok(Self { tera })
	}

	/// Load templates from [`DEFAULT_TEMPLATE_ROOT`].
	pub fn from_default_root() -> Result<Self> {
		Self::from_dir(DEFAULT_TEMPLATE_ROOT)
	}

	/// Register a template from a string.
	pub fn add_raw_template(&mut self, name: &str, content: &str) -> Result<()> {
		self.tera
			.add_raw_template(name, content)
			.map_err(|e| Error::ImproperlyConfigured(format!("template {name}: {e}")))
	}

	/// Names of all registered templates, mostly for diagnostics.
	pub fn template_names(&self) -> Vec<&str> {
		self.tera.get_template_names().collect()
	}
}

impl Renderer for TeraEngine {
	fn render(&self, template: &str, context: &serde_json::Value) -> Result<String> {
		let ctx = Context::from_serialize(context)
			.map_err(|e| Error::Render(format!("context for {template}: {e}")))?;
		self.tera
			.render(template, &ctx)
			.map_err(|e| Error::Render(format!("{template}: {e}")))
	}
}
