//! # eduhub-service
//!
//! Business logic service layer for the EduHub notification engine. The
//! fan-out orchestrator turns academic events into student and guardian
//! notifications; the remaining services expose read state, guardian
//! preferences, and guardian-student relationship management.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod notification;
pub mod preference;
pub mod relationship;

pub use notification::{
    FanoutOrchestrator, FanoutOutcome, NotificationComposer, NotificationService,
    RelatedEntityLoader, RelatedEntityRegistry, SkipReason,
};
pub use preference::PreferenceService;
pub use relationship::RelationshipService;
