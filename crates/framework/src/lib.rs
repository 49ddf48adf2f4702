//! A small web framework layering ordered route registration and declarative
//! per-section schema validation on top of axum.
//!
//! Routers accumulate `(method, path, handler, schema)` descriptors; a server
//! merges any number of routers and, on `register()`, consumes the route list
//! into an immutable axum dispatch table. Each request gets a fresh [`Context`]
//! carrying the parsed body, path params, query and headers, plus a `response`
//! escape hatch and a `set` bag for status, headers and cookies.

pub mod context;
pub mod router;
pub mod schema;
pub mod server;
pub mod validator;

pub use context::{Context, Cookie, ResponseSet};
pub use router::{AppRouter, Method, Route};
pub use schema::{CtxSchema, FieldType, Shape};
pub use server::{AppServer, ServerError};
pub use validator::{validate, Description, FieldError, Section, ValidationReport};
