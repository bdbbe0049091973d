//! HTTP-level types shared by every maru crate.
//!
//! This crate defines the request/response model, the parameter map built up
//! during dispatch, the per-request response context with its completion
//! machinery, the [`Endpoint`] and [`Handler`] traits, and the [`Renderer`]
//! seam behind which a template engine plugs in.
//!
//! Nothing in here performs routing or I/O; those concerns live in
//! `maru-routers` and `maru-server`.

pub mod context;
pub mod endpoint;
pub mod error;
pub mod params;
pub mod render;
pub mod request;
pub mod response;

pub use context::{Completion, Outcome, ResponseContext};
pub use endpoint::{Endpoint, FunctionEndpoint, Handler};
pub use error::{Error, Result};
pub use params::Params;
pub use render::Renderer;
pub use request::{BodyStream, Request, RequestBody, RequestBuilder};
pub use response::Response;
