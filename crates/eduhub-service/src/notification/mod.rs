//! Notification eligibility, composition, fan-out, and read state.

pub mod composer;
pub mod eligibility;
pub mod fanout;
pub mod related;
pub mod service;
pub mod trigger;

pub use composer::NotificationComposer;
pub use eligibility::{EligibilityInput, should_notify_guardian};
pub use fanout::{FanoutOrchestrator, FanoutOutcome, SkipReason};
pub use related::{RelatedEntityLoader, RelatedEntityRegistry};
pub use service::NotificationService;
pub use trigger::{Trigger, TriggerSource};
