// Domain layer - Telemetry samples, history window and render state
pub mod color;
pub mod history;
pub mod status;
pub mod telemetry;
