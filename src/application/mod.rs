// Application layer - Polling use cases and the seams they depend on
pub mod cycle;
pub mod display_sink;
pub mod fetcher;
pub mod formatter;
pub mod http_client;
pub mod poll_scheduler;
pub mod response_validator;
