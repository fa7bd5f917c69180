//! Guardian-student relationship entities.

pub mod kind;
pub mod model;
pub mod status;

pub use kind::RelationshipKind;
pub use model::{CreateRelationship, Relationship};
pub use status::RelationshipStatus;
