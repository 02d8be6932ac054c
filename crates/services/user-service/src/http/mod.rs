//! HTTP transport adapter.
//!
//! Maps REST requests onto [`UserService`](crate::service::UserService)
//! calls and service outcomes onto status codes.

pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
