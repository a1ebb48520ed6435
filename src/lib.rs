pub mod configuration;
pub mod constants;
pub mod errors;
pub mod finance_client;
pub mod openapi;
pub mod order_client;
pub mod routes;
pub mod schemas;
pub mod session_client;
pub mod startup;
pub mod telemetry;
mod tests;
pub mod utils;
pub mod websocket;
