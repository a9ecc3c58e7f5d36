// Telemetry line parser - "Key: Value, Key: Value" into fields
use crate::domain::telemetry::ParsedFields;

const PAIR_SEPARATOR: &str = ", ";
const KEY_VALUE_SEPARATOR: &str = ": ";

/// Split a raw telemetry line into key/value fields.
///
/// Tokens without a `": "` separator (such as the "No magnetic field detected"
/// marker) are skipped. Never fails; the worst case is an empty mapping.
pub fn parse_fields(line: &str) -> ParsedFields {
    let mut fields = ParsedFields::new();
    for token in line.split(PAIR_SEPARATOR) {
        if let Some((key, value)) = token.split_once(KEY_VALUE_SEPARATOR) {
            fields.insert(key, value);
        }
    }
    fields
}
