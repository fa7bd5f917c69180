//! Notification domain entities.

pub mod category;
pub mod draft;
pub mod filter;
pub mod kind;
pub mod model;
pub mod preference;
pub mod related;

pub use category::{NotificationCategory, NotificationPriority};
pub use draft::NotificationDraft;
pub use filter::NotificationFilter;
pub use kind::NotificationType;
pub use model::Notification;
pub use preference::{NotificationPreference, PreferenceUpdate};
pub use related::{RelatedEntity, RelatedEntityKind};
