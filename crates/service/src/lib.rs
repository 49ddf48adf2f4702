//! Service layer providing business-oriented CRUD operations on top of models.
//! - Separates business rules (href decoration, peer fallback) from data access.
//! - Repositories delegate to a JSON-file document store.
//! - Provides clear error types consumed by the route handlers.

pub mod errors;
pub mod peer;
pub mod product;
pub mod storage;
pub mod user;
