pub mod repository;
pub mod service;

pub use repository::{DocProductRepository, ProductRepository};
pub use service::ProductService;
