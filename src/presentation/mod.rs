// Presentation layer - Local status API for display collaborators
pub mod app_state;
pub mod handlers;
pub mod routes;
