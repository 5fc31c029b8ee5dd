use crate::common::{INVALID_INITIAL_DATA, INVALID_VALUE, check_initial_data};
use quire_types::{FieldSettings, Violations};
use serde_json::Value;

pub(crate) const TAG: &str = "range";
pub(crate) const ALLOWED: &[&str] = &["min", "max", "step", "required", "initial_data", "description"];

pub const OUT_OF_RANGE: &str = "out_of_range";

const DEFAULT_MIN: i64 = 0;
const DEFAULT_MAX: i64 = 100;

pub(crate) fn validate_settings(settings: &FieldSettings) -> Violations {
    check_initial_data(settings, |v| validate_default_value(settings, v))
}

/// Range defaults must be integers.
pub(crate) fn validate_default_value(_settings: &FieldSettings, value: &Value) -> Violations {
    let mut violations = Violations::new();
    if value.as_i64().is_none() {
        violations.add(INVALID_INITIAL_DATA, "");
    }
    violations
}

/// Stored values must be integers inside `[min, max]`.
pub(crate) fn validate_data(settings: &FieldSettings, value: &Value) -> Violations {
    let mut violations = Violations::new();
    let min = settings.get_i64("min").unwrap_or(DEFAULT_MIN);
    let max = settings.get_i64("max").unwrap_or(DEFAULT_MAX);
    match value.as_i64() {
        Some(n) if (min..=max).contains(&n) => {}
        Some(_) => violations.add(OUT_OF_RANGE, ""),
        None => violations.add(INVALID_VALUE, ""),
    }
    violations
}
