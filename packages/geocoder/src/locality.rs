//! Locality selection from a Nominatim `address` object.
//!
//! Nominatim names the locality field after the kind of place it is
//! (`city`, `town`, `village`, `county`, ...). The first key present in
//! [`LOCALITY_KEYS`] wins.

use serde_json::Value;

/// Candidate locality keys, most specific first.
pub const LOCALITY_KEYS: &[&str] = &[
    "city",
    "town",
    "village",
    "municipality",
    "suburb",
    "hamlet",
    "city_district",
    "county",
    "state_district",
];

/// Returned when no candidate key holds a value.
pub const UNKNOWN_LOCALITY: &str = "Unknown";

/// Picks the locality from a Nominatim `address` object.
///
/// Empty strings are skipped. Returns [`UNKNOWN_LOCALITY`] when nothing
/// matches or `address` is not an object.
#[must_use]
pub fn resolve_locality(address: &Value) -> String {
    LOCALITY_KEYS
        .iter()
        .find_map(|key| {
            address
                .get(*key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .unwrap_or(UNKNOWN_LOCALITY)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_city_over_county() {
        let address = serde_json::json!({
            "road": "MG Road",
            "county": "Bangalore North",
            "city": "Bengaluru",
            "state": "Karnataka",
        });
        assert_eq!(resolve_locality(&address), "Bengaluru");
    }

    #[test]
    fn falls_back_through_priority_order() {
        let address = serde_json::json!({
            "village": "Hosur",
            "county": "Krishnagiri",
        });
        assert_eq!(resolve_locality(&address), "Hosur");

        let address = serde_json::json!({
            "state_district": "Pune District",
            "county": "Haveli",
        });
        assert_eq!(resolve_locality(&address), "Haveli");
    }

    #[test]
    fn ignores_key_order() {
        let a = serde_json::json!({ "town": "Udupi", "suburb": "Manipal" });
        let b = serde_json::json!({ "suburb": "Manipal", "town": "Udupi" });
        assert_eq!(resolve_locality(&a), resolve_locality(&b));
    }

    #[test]
    fn unknown_when_nothing_matches() {
        let address = serde_json::json!({ "road": "NH 44", "city": "  " });
        assert_eq!(resolve_locality(&address), UNKNOWN_LOCALITY);
        assert_eq!(resolve_locality(&Value::Null), UNKNOWN_LOCALITY);
    }
}
