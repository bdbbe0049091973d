//! Template engine seam.
//!
//! Routing and dispatch only know this trait; the tera-backed
//! implementation lives in `maru-template`.

use crate::error::Result;

/// A template engine capable of rendering a named template against a
/// serialized context.
pub trait Renderer: Send + Sync {
	/// Render `template` with `context`, returning the full output buffer.
	fn render(&self, template: &str, context: &serde_json::Value) -> Result<String>;
}
