use crate::common::{INVALID_INITIAL_DATA, INVALID_VALUE, check_initial_data};
use quire_types::{FieldSettings, Violations};
use serde_json::Value;

pub(crate) const TAG: &str = "checkbox";
pub(crate) const ALLOWED: &[&str] = &["required", "initial_data", "description"];

pub(crate) fn validate_settings(settings: &FieldSettings) -> Violations {
    check_initial_data(settings, |v| validate_default_value(settings, v))
}

/// A checkbox default must be a boolean.
pub(crate) fn validate_default_value(_settings: &FieldSettings, value: &Value) -> Violations {
    let mut violations = Violations::new();
    if !value.is_boolean() {
        violations.add(INVALID_INITIAL_DATA, "");
    }
    violations
}

pub(crate) fn validate_data(_settings: &FieldSettings, value: &Value) -> Violations {
    let mut violations = Violations::new();
    if !value.is_boolean() {
        violations.add(INVALID_VALUE, "");
    }
    violations
}
