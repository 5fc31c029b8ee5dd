//! Settings validation for the `state` field type.
//!
//! The settings embed a workflow: `places`, `transitions` and the
//! `initial_place`. Every problem is reported; checks are only skipped
//! when they cannot mean anything (membership tests against a places
//! container that is not a map).

use crate::common::{INVALID_INITIAL_DATA, INVALID_VALUE};
use quire_types::{FieldSettings, Violations};
use serde_json::{Map, Value};

pub(crate) const TAG: &str = "state";
pub(crate) const ALLOWED: &[&str] = &["initial_place", "places", "transitions", "required", "description"];
pub(crate) const REQUIRED: &[&str] = &["initial_place", "places", "transitions"];

pub const INVALID_INITIAL_PLACE: &str = "invalid_initial_place";
pub const INVALID_PLACES: &str = "invalid_places";
pub const INVALID_PLACE: &str = "invalid_place";
pub const INVALID_CATEGORY: &str = "invalid_category";
pub const INVALID_TRANSITIONS: &str = "invalid_transitions";
pub const INVALID_TRANSITION: &str = "invalid_transition";
pub const INVALID_TRANSITION_FROM: &str = "invalid_transition_from";
pub const INVALID_TRANSITION_TO: &str = "invalid_transition_to";

const TRANSITION_KEYS: &[&str] = &["label", "from", "to"];

type Places = Map<String, Value>;

pub(crate) fn validate_settings(settings: &FieldSettings) -> Violations {
    let mut violations = Violations::new();

    let initial_place = settings
        .get("initial_place")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());
    if initial_place.is_none() {
        violations.add(INVALID_INITIAL_PLACE, "initial_place");
    }

    let places = validate_places(settings.get("places"), &mut violations);

    if let (Some(initial), Some(places)) = (initial_place, places) {
        if !places.contains_key(initial) {
            violations.add(INVALID_INITIAL_PLACE, "initial_place");
        }
    }

    validate_transitions(settings.get("transitions"), places, &mut violations);
    violations
}

/// Returns the places map when the container itself is usable.
fn validate_places<'a>(value: Option<&'a Value>, violations: &mut Violations) -> Option<&'a Places> {
    let Some(places) = value.and_then(Value::as_object).filter(|m| !m.is_empty()) else {
        violations.add(INVALID_PLACES, "places");
        return None;
    };

    for (name, place) in places {
        let path = format!("places.{name}");
        let Some(place) = place.as_object() else {
            violations.add(INVALID_PLACES, path.clone());
            violations.add(INVALID_PLACE, path);
            continue;
        };
        if !place.get("label").is_some_and(Value::is_string) {
            violations.add(INVALID_PLACE, format!("{path}.label"));
        }
        if place.get("category").is_some_and(|c| !c.is_string()) {
            violations.add(INVALID_CATEGORY, format!("{path}.category"));
        }
    }
    Some(places)
}

fn is_known(places: Option<&Places>, name: &str) -> bool {
    places.is_none_or(|p| p.contains_key(name))
}

fn validate_transitions(value: Option<&Value>, places: Option<&Places>, violations: &mut Violations) {
    let Some(transitions) = value.and_then(Value::as_object).filter(|m| !m.is_empty()) else {
        violations.add(INVALID_TRANSITIONS, "transitions");
        return;
    };

    for (name, transition) in transitions {
        let path = format!("transitions.{name}");
        let Some(transition) = transition.as_object() else {
            violations.add(INVALID_TRANSITION, path);
            continue;
        };

        let label_ok = transition.get("label").is_some_and(Value::is_string);
        let keys_ok = transition.keys().all(|k| TRANSITION_KEYS.contains(&k.as_str()));
        if !label_ok || !keys_ok {
            violations.add(INVALID_TRANSITION, path.clone());
        }

        match transition.get("from").and_then(Value::as_array) {
            Some(from) if !from.is_empty() => {
                for (i, member) in from.iter().enumerate() {
                    if !member.as_str().is_some_and(|p| is_known(places, p)) {
                        violations.add(INVALID_TRANSITION_FROM, format!("{path}.from.{i}"));
                    }
                }
            }
            _ => violations.add(INVALID_TRANSITION_FROM, format!("{path}.from")),
        }

        if !transition
            .get("to")
            .and_then(Value::as_str)
            .is_some_and(|p| is_known(places, p))
        {
            violations.add(INVALID_TRANSITION_TO, format!("{path}.to"));
        }
    }
}

fn place_names(settings: &FieldSettings) -> Option<&Places> {
    settings.get("places").and_then(Value::as_object)
}

/// A default must name a declared place.
pub(crate) fn validate_default_value(settings: &FieldSettings, value: &Value) -> Violations {
    let mut violations = Violations::new();
    let known = value
        .as_str()
        .is_some_and(|p| place_names(settings).is_some_and(|places| places.contains_key(p)));
    if !known {
        violations.add(INVALID_INITIAL_DATA, "");
    }
    violations
}

/// A stored state must name a declared place.
pub(crate) fn validate_data(settings: &FieldSettings, value: &Value) -> Violations {
    let mut violations = Violations::new();
    let known = value
        .as_str()
        .is_some_and(|p| place_names(settings).is_some_and(|places| places.contains_key(p)));
    if !known {
        violations.add(INVALID_VALUE, "");
    }
    violations
}
