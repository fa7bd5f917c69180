//! Guardian-student relationship management.

pub mod service;

pub use service::RelationshipService;
