//! HTTP adapter - the inbound webhook endpoint.

mod handlers;
mod routes;

pub use handlers::AppState;
pub use routes::router;
