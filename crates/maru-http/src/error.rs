//! Error taxonomy shared across the framework.
//!
//! Every per-request failure is local to that request; the dispatch layer
//! maps variants to HTTP statuses at its boundary and nothing here retries.

/// Framework-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// No registered route matched the request. Surfaces as 404.
	#[error("not found: {0}")]
	NotFound(String),

	/// An endpoint returned a failure. Surfaces as 500; the message is
	/// logged, never sent to the client.
	#[error("handler error: {0}")]
	Handler(String),

	/// The template engine failed to produce output.
	#[error("render error: {0}")]
	Render(String),

	/// A URL-encoded request body could not be parsed.
	#[error("malformed body: {0}")]
	MalformedBody(String),

	/// Internal-consistency violation. These indicate a framework bug, not
	/// a user-facing condition.
	#[error("internal error: {0}")]
	Internal(String),

	/// Invalid configuration detected at startup or registration time.
	#[error("improperly configured: {0}")]
	ImproperlyConfigured(String),

	/// A deferred completion did not resolve within the configured limit.
	#[error("timed out: {0}")]
	Timeout(String),
}

/// Convenience alias used throughout the framework.
pub type Result<T> = std::result::Result<T, Error>;
