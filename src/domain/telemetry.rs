// Telemetry reading domain models
use std::collections::HashMap;

/// Key/value fields extracted from one telemetry line.
///
/// A missing key means the field was not on the wire; it is never an implicit zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFields {
    fields: HashMap<String, String>,
}

impl ParsedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing any earlier value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// Whether the vector of an active reading came off the wire or was defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorOrigin {
    Measured,
    /// Gate triggered but XMag/YMag/ZMag were missing or not numeric.
    Defaulted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveReading {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub origin: VectorOrigin,
}

impl ActiveReading {
    pub fn measured(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            origin: VectorOrigin::Measured,
        }
    }

    pub fn defaulted() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            origin: VectorOrigin::Defaulted,
        }
    }

    /// Euclidean norm of the field vector, always derived from the components.
    pub fn strength(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassifiedSample {
    Active(ActiveReading),
    Idle,
    Unparseable,
}
