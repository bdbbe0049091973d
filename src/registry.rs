//! Process-scoped convenience registry.
//!
//! Small programs can declare routes with the module-level functions below
//! instead of threading an [`App`] around. The functions feed exactly one
//! lazily created instance; [`run`] consumes it and [`reset`] discards it.
//! Nothing in the core reads this state, it is a wrapper and nothing more.

use hyper::Method;
use once_cell::sync::Lazy;
use std::future::Future;
use std::sync::Mutex;

use maru_http::{Error, Outcome, Params, Request, ResponseContext, Result};
use maru_routers::PathSpec;

use crate::app::App;
use crate::config::ServerConfig;

static INSTANCE: Lazy<Mutex<Option<App>>> = Lazy::new(|| Mutex::new(None));

fn with_instance(f: impl FnOnce(App) -> App) {
	let mut guard = INSTANCE.lock().unwrap_or_else(|e| e.into_inner());
	let app = guard.take().unwrap_or_else(App::new);
	*guard = Some(f(app));
}

/// Register a GET handler on the process-wide instance.
pub fn get<F, Fut>(spec: impl Into<PathSpec>, func: F)
where
	F: Fn(Request, ResponseContext, Params) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Outcome>> + Send + 'static,
{
	register(Method::GET, spec, func)
}

/// Register a POST handler on the process-wide instance.
pub fn post<F, Fut>(spec: impl Into<PathSpec>, func: F)
where
	F: Fn(Request, ResponseContext, Params) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Outcome>> + Send + 'static,
{
	register(Method::POST, spec, func)
}

/// Register a PUT handler on the process-wide instance.
pub fn put<F, Fut>(spec: impl Into<PathSpec>, func: F)
where
	F: Fn(Request, ResponseContext, Params) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Outcome>> + Send + 'static,
{
	register(Method::PUT, spec, func)
}

/// Register a DELETE handler on the process-wide instance.
pub fn delete<F, Fut>(spec: impl Into<PathSpec>, func: F)
where
	F: Fn(Request, ResponseContext, Params) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Outcome>> + Send + 'static,
{
	register(Method::DELETE, spec, func)
}

fn register<F, Fut>(method: Method, spec: impl Into<PathSpec>, func: F)
where
	F: Fn(Request, ResponseContext, Params) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Outcome>> + Send + 'static,
{
	let spec = spec.into();
	with_instance(move |app| match method {
		Method::POST => app.post(spec, func),
		Method::PUT => app.put(spec, func),
		Method::DELETE => app.delete(spec, func),
		_ => app.get(spec, func),
	});
}

/// Whether any route has been registered on the process-wide instance.
pub fn is_registered() -> bool {
	INSTANCE
		.lock()
		.unwrap_or_else(|e| e.into_inner())
		.is_some()
}

/// Discard the process-wide instance and everything registered on it.
pub fn reset() {
	*INSTANCE.lock().unwrap_or_else(|e| e.into_inner()) = None;
}

/// Serve the process-wide instance, optionally overriding its
/// configuration. Fails when no endpoint was registered.
pub async fn run(config: Option<ServerConfig>) -> Result<()> {
	let app = INSTANCE
		.lock()
		.unwrap_or_else(|e| e.into_inner())
		.take()
		.ok_or_else(|| {
			Error::ImproperlyConfigured(
				"no endpoints defined; register at least one route before run()".into(),
			)
		})?;

	let app = match config {
		Some(config) => app.with_config(config),
		None => app,
	};
	app.run().await
}
