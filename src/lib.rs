//! Serial magnetometer telemetry ingestion.
//!
//! A reader task turns `Key: Value` telemetry lines into an unbounded queue; a
//! consumer drains that queue once per render tick, gates readings on the
//! hall-switch voltage and keeps a bounded, color-annotated history for the
//! visualiser.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
