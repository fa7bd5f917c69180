//! PostgreSQL repository implementations of the store traits.

pub mod notification;
pub mod preference;
pub mod relationship;

pub use notification::NotificationRepository;
pub use preference::PreferenceRepository;
pub use relationship::RelationshipRepository;
