//! # eduhub-core
//!
//! Core crate for EduHub. Contains configuration schemas, typed
//! identifiers, academic domain events, pagination types, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other EduHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
