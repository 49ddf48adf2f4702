//! Domain documents shared by the services.

pub mod errors;
pub mod product;
pub mod user;
