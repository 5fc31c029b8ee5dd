use quire_types::{FieldSettings, Violations};

pub const REQUIRED: &str = "required";
pub const UNKNOWN_SETTING: &str = "unknown_setting";
pub const INVALID_INITIAL_DATA: &str = "invalid_initial_data";
pub const INVALID_VALUE: &str = "invalid_value";

/// Every missing required key, then every key not in `allowed`.
pub(crate) fn check_keys(settings: &FieldSettings, allowed: &[&str], required: &[&str]) -> Violations {
    let mut violations = Violations::new();
    for key in required {
        if !settings.contains_key(key) {
            violations.add(REQUIRED, *key);
        }
    }
    for key in settings.keys() {
        if !allowed.contains(&key) {
            violations.add(UNKNOWN_SETTING, key);
        }
    }
    violations
}

/// Runs `check` on `initial_data` when present, reporting under that path.
pub(crate) fn check_initial_data(
    settings: &FieldSettings,
    check: impl FnOnce(&serde_json::Value) -> Violations,
) -> Violations {
    let mut violations = Violations::new();
    if let Some(value) = settings.get("initial_data") {
        violations.extend_at("initial_data", check(value));
    }
    violations
}
