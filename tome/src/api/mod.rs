mod dto;
mod handlers;
mod middleware;
mod response;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
