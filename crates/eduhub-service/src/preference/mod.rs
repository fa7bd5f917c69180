//! Guardian notification preferences.

pub mod service;

pub use service::PreferenceService;
