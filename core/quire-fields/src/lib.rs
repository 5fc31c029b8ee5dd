//! Field types for Quire.
//!
//! A schema stores each field as a type tag plus a [`FieldSettings`] bag.
//! This crate gives the tags meaning:
//! - [`FieldKind`]: the closed set of types and their contracts
//! - [`FieldTypeRegistry`]: tag lookup, schema and content validation
//! - [`Workflow`]: the state machine behind `state` fields
//! - [`ContentLookup`] / [`ResolveContext`]: following `reference` and
//!   `reference_of` fields into stored content
//!
//! [`FieldSettings`]: quire_types::FieldSettings

mod checkbox;
mod common;
mod error;
mod range;
mod reference;
mod registry;
mod resolve;
mod state;
mod text;
mod validate;
mod workflow;

pub use common::{INVALID_INITIAL_DATA, INVALID_VALUE, REQUIRED, UNKNOWN_SETTING};
pub use error::{FieldError, FieldResult};
pub use reference::{
    INVALID_CONTENT_TYPE, INVALID_DOMAIN, INVALID_ON_DELETE, INVALID_REFERENCE,
    INVALID_REFERENCE_FIELD, OnDelete, READ_ONLY,
};
pub use range::OUT_OF_RANGE;
pub use registry::{FieldKind, FieldTypeRegistry};
pub use resolve::{ContentLookup, ResolveContext, ResolvedContent};
pub use state::{
    INVALID_CATEGORY, INVALID_INITIAL_PLACE, INVALID_PLACE, INVALID_PLACES, INVALID_TRANSITION,
    INVALID_TRANSITION_FROM, INVALID_TRANSITION_TO, INVALID_TRANSITIONS,
};
pub use validate::{INVALID_FIELD_TYPE, UNKNOWN_FIELD};
pub use workflow::{Place, Transition, Workflow};
