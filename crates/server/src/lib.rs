pub mod routes;
pub mod startup;

pub use startup::{run_customer_service, run_product_service};
