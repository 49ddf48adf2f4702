pub mod repository;
pub mod service;

pub use repository::{DocUserRepository, UserRepository};
pub use service::UserService;
