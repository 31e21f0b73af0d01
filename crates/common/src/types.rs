//! Presence data types.
//!
//! The upstream staff schema is vendor-controlled and not strictly
//! documented, so an employee stays a loosely-typed JSON object. Only two
//! fields are ever inspected: `name` (ordering) and `onsite_status`
//! (onsite counts).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status value marking an employee as currently onsite.
pub const ONSITE_STATUS: &str = "onsite";

/// A single staff record as returned by the upstream API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Employee(pub Map<String, Value>);

impl Employee {
    /// Display name, or empty string when the field is missing or not a string.
    pub fn name(&self) -> &str {
        self.0.get("name").and_then(Value::as_str).unwrap_or("")
    }

    /// Case-insensitive sort key; records with no usable name sort first.
    pub fn sort_key(&self) -> String {
        self.name().to_uppercase()
    }

    /// Whether the record's status field carries the onsite sentinel.
    pub fn is_onsite(&self) -> bool {
        self.0.get("onsite_status").and_then(Value::as_str) == Some(ONSITE_STATUS)
    }
}

/// Consistent point-in-time view of the presence cache handed to readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceSnapshot {
    /// Employees from the most recent successful poll (or forced-empty write),
    /// sorted by name ascending, case-insensitive.
    pub employees: Vec<Employee>,

    /// True once the first poll attempt has completed; never reverts.
    pub ready: bool,

    /// True when the last successful poll is older than the stale threshold.
    pub is_stale: bool,

    /// Whether the board is inside business hours right now.
    pub is_open: bool,
}

impl PresenceSnapshot {
    /// Count of employees currently marked onsite.
    pub fn onsite_count(&self) -> usize {
        self.employees.iter().filter(|e| e.is_onsite()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn emp(fields: Value) -> Employee {
        serde_json::from_value(fields).unwrap()
    }

    #[test]
    fn test_name_defaults_to_empty() {
        assert_eq!(emp(json!({})).name(), "");
        assert_eq!(emp(json!({"name": 42})).name(), "");
        assert_eq!(emp(json!({"name": "Ada"})).name(), "Ada");
    }

    #[test]
    fn test_onsite_requires_exact_sentinel() {
        assert!(emp(json!({"name": "Ada", "onsite_status": "onsite"})).is_onsite());
        assert!(!emp(json!({"name": "Ada", "onsite_status": "offsite"})).is_onsite());
        assert!(!emp(json!({"name": "Ada"})).is_onsite());
    }

    #[test]
    fn test_employee_roundtrips_unknown_fields() {
        let raw = json!({"name": "Ada", "onsite_status": "onsite", "department": "R&D"});
        let e = emp(raw.clone());
        assert_eq!(serde_json::to_value(&e).unwrap(), raw);
    }
}
