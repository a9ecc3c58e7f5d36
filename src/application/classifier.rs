// Reading classifier - Applies the hall-switch voltage gate
use crate::domain::telemetry::{ActiveReading, ClassifiedSample, ParsedFields};

pub const DEFAULT_GATE_THRESHOLD_VOLTS: f64 = 1.0;

const VOLTAGE_KEY: &str = "Voltage";
const VECTOR_KEYS: [&str; 3] = ["XMag", "YMag", "ZMag"];

/// The switch output drops as the field rises, so a voltage strictly below the
/// threshold means a magnet is present.
#[derive(Debug, Clone, Copy)]
pub struct ReadingClassifier {
    gate_threshold: f64,
}

impl ReadingClassifier {
    pub fn new(gate_threshold: f64) -> Self {
        Self { gate_threshold }
    }

    pub fn classify(&self, fields: &ParsedFields) -> ClassifiedSample {
        let Some(voltage) = fields.get(VOLTAGE_KEY).and_then(parse_number) else {
            return ClassifiedSample::Unparseable;
        };

        if voltage.is_nan() || voltage >= self.gate_threshold {
            return ClassifiedSample::Idle;
        }

        let reading = match read_vector(fields) {
            Some([x, y, z]) => ActiveReading::measured(x, y, z),
            None => ActiveReading::defaulted(),
        };
        ClassifiedSample::Active(reading)
    }
}

impl Default for ReadingClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_GATE_THRESHOLD_VOLTS)
    }
}

fn read_vector(fields: &ParsedFields) -> Option<[f64; 3]> {
    let [x, y, z] = VECTOR_KEYS.map(|key| fields.get(key).and_then(parse_number));
    Some([x?, y?, z?])
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}
