pub mod api;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod validation;

pub use routes::build_router;
pub use state::AppState;
