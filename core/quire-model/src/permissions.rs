//! Role-based permission matrix of a content type.
//!
//! Each action maps to the set of domain roles allowed to perform it.
//! A fresh matrix grants read access to everybody and write access to
//! editors and administrators.

use quire_types::Violations;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const ROLE_PUBLIC: &str = "ROLE_PUBLIC";
pub const ROLE_EDITOR: &str = "ROLE_EDITOR";
pub const ROLE_ADMINISTRATOR: &str = "ROLE_ADMINISTRATOR";

/// Roles every domain knows about unless it declares its own.
pub fn default_roles() -> Vec<String> {
    vec![
        ROLE_PUBLIC.to_string(),
        ROLE_EDITOR.to_string(),
        ROLE_ADMINISTRATOR.to_string(),
    ]
}

/// An action on content that can be granted to roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentAction {
    View,
    List,
    Create,
    Update,
    Delete,
}

impl ContentAction {
    pub const ALL: [ContentAction; 5] = [
        Self::View,
        Self::List,
        Self::Create,
        Self::Update,
        Self::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ContentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action → roles matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(BTreeMap<ContentAction, BTreeSet<String>>);

impl Default for Permissions {
    fn default() -> Self {
        let everyone = [ROLE_PUBLIC, ROLE_EDITOR, ROLE_ADMINISTRATOR];
        let writers = [ROLE_EDITOR, ROLE_ADMINISTRATOR];

        let mut matrix = BTreeMap::new();
        for action in ContentAction::ALL {
            let roles: &[&str] = match action {
                ContentAction::View | ContentAction::List => &everyone,
                _ => &writers,
            };
            matrix.insert(action, roles.iter().map(|r| r.to_string()).collect());
        }
        Self(matrix)
    }
}

impl Permissions {
    /// Roles granted `action`. Empty when the action is not in the matrix.
    pub fn roles(&self, action: ContentAction) -> impl Iterator<Item = &str> {
        self.0.get(&action).into_iter().flatten().map(String::as_str)
    }

    pub fn allows(&self, action: ContentAction, role: &str) -> bool {
        self.0.get(&action).is_some_and(|roles| roles.contains(role))
    }

    /// Replaces the roles of one action.
    pub fn set<I, S>(&mut self, action: ContentAction, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.insert(action, roles.into_iter().map(Into::into).collect());
    }

    /// Resets to the default matrix, then overlays every entry of `overrides`.
    pub fn reset_with(&mut self, overrides: &Permissions) {
        *self = Self::default();
        for (action, roles) in &overrides.0 {
            self.0.insert(*action, roles.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContentAction, &BTreeSet<String>)> {
        self.0.iter().map(|(a, r)| (*a, r))
    }

    /// Reports every role that is not one of `allowed_roles`.
    pub fn validate(&self, allowed_roles: &[String]) -> Violations {
        let mut violations = Violations::new();
        for (action, roles) in &self.0 {
            for role in roles {
                if !allowed_roles.iter().any(|r| r == role) {
                    violations.add("invalid_selection", format!("permissions.{action}"));
                }
            }
        }
        violations
    }
}
