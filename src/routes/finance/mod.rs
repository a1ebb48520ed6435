pub mod handlers;
mod routes;
pub(crate) mod schemas;
pub use routes::finance_route;
