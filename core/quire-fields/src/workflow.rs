//! Typed workflow built from validated `state` field settings.

use crate::error::{FieldError, FieldResult};
use crate::registry::FieldKind;
use indexmap::IndexMap;
use quire_model::ContentInstance;
use quire_types::FieldSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A node of the workflow graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A named edge from any of `from` to `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub label: String,
    pub from: Vec<String>,
    pub to: String,
}

impl Transition {
    pub fn allows_from(&self, place: &str) -> bool {
        self.from.iter().any(|p| p == place)
    }
}

/// The state machine declared by a `state` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub initial_place: String,
    pub places: IndexMap<String, Place>,
    pub transitions: IndexMap<String, Transition>,
}

impl Workflow {
    /// Builds the workflow of a field, refusing settings that do not validate.
    pub fn from_settings(field: &str, settings: &FieldSettings) -> FieldResult<Self> {
        let violations = FieldKind::State.validate_settings(settings);
        if !violations.is_empty() {
            return Err(FieldError::InvalidSettings {
                field: field.to_string(),
                violations,
            });
        }
        Ok(serde_json::from_value(settings.clone().into_value())?)
    }

    pub fn place(&self, name: &str) -> FieldResult<&Place> {
        self.places.get(name).ok_or_else(|| FieldError::UnknownPlace {
            place: name.to_string(),
        })
    }

    pub fn transition(&self, name: &str) -> FieldResult<&Transition> {
        self.transitions
            .get(name)
            .ok_or_else(|| FieldError::UnknownTransition {
                transition: name.to_string(),
            })
    }

    pub fn can_apply(&self, current: &str, transition: &str) -> bool {
        self.transitions
            .get(transition)
            .is_some_and(|t| t.allows_from(current))
    }

    /// Returns the place reached by `transition` from `current`.
    pub fn apply(&self, current: &str, transition: &str) -> FieldResult<&str> {
        let t = self.transition(transition)?;
        if !t.allows_from(current) {
            return Err(FieldError::TransitionNotAllowed {
                transition: transition.to_string(),
                place: current.to_string(),
            });
        }
        Ok(&t.to)
    }

    /// Names of the transitions legal from `place`, in definition order.
    pub fn enabled_transitions<'a>(&'a self, place: &'a str) -> impl Iterator<Item = &'a str> {
        self.transitions
            .iter()
            .filter(move |(_, t)| t.allows_from(place))
            .map(|(name, _)| name.as_str())
    }

    /// The stored place of `field`, or the initial place when unset.
    pub fn current_place<'a>(&'a self, content: &'a ContentInstance, field: &str) -> &'a str {
        content
            .field_data(field)
            .and_then(|v| v.as_str())
            .unwrap_or(&self.initial_place)
    }

    /// Applies `transition` to the state stored in `content`. On failure
    /// the content is left untouched.
    pub fn apply_to(
        &self,
        content: &mut ContentInstance,
        field: &str,
        transition: &str,
    ) -> FieldResult<String> {
        let from = self.current_place(content, field).to_string();
        let to = self.apply(&from, transition)?.to_string();
        content.set_field(field, to.clone());
        debug!(
            content_id = %content.id,
            field,
            transition,
            from = %from,
            to = %to,
            "Applied workflow transition"
        );
        Ok(to)
    }

    /// Checks a direct write of the state value.
    ///
    /// A new instance must start at the initial place. An existing one may
    /// keep its place or move along exactly one legal transition.
    pub fn check_write(&self, old: Option<&str>, new: &str) -> FieldResult<()> {
        self.place(new)?;
        let allowed = match old {
            None => new == self.initial_place,
            Some(old) => {
                old == new
                    || self
                        .transitions
                        .values()
                        .any(|t| t.to == new && t.allows_from(old))
            }
        };
        if allowed {
            return Ok(());
        }
        Err(FieldError::StateChangeNotAllowed {
            from: old.unwrap_or(&self.initial_place).to_string(),
            to: new.to_string(),
        })
    }
}
