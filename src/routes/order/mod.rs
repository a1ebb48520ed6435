pub(crate) mod errors;
pub mod handlers;
pub mod models;
pub mod receipt;
mod routes;
pub mod schemas;
mod tests;
pub mod utils;
pub use routes::order_route;
