// Domain layer - Telemetry and display models
pub mod display;
pub mod telemetry;
