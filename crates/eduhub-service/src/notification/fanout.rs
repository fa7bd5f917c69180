//! Fan-out of academic events into student and guardian notifications.
//!
//! Each event runs through one unit of work: every notification it produces
//! commits together or not at all. Failures are logged and reported in the
//! returned [`FanoutOutcome`]; they never propagate to the publisher of the
//! event.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use eduhub_core::config::NotificationConfig;
use eduhub_core::error::AppError;
use eduhub_core::events::{AcademicEvent, AttendanceStatus, DomainEvent};
use eduhub_core::result::AppResult;
use eduhub_database::store::{FanoutStore, FanoutUnit};

use super::composer::NotificationComposer;
use super::eligibility::{EligibilityInput, should_notify_guardian};
use super::trigger::Trigger;

/// Why an event produced no notifications without opening a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The attendance status does not notify anyone.
    AttendanceStatus(AttendanceStatus),
    /// The homework was assigned to a class with no students.
    NoStudents,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttendanceStatus(status) => {
                write!(f, "attendance status '{}' does not notify", status.as_str())
            }
            Self::NoStudents => write!(f, "homework has no students"),
        }
    }
}

/// Terminal state of one event's fan-out.
#[derive(Debug, Clone)]
pub enum FanoutOutcome {
    /// Gated out before any side effect.
    Skipped {
        /// Why the event was skipped.
        reason: SkipReason,
    },
    /// All notifications were committed.
    Committed {
        /// Notifications addressed to students.
        student_notifications: usize,
        /// Notifications addressed to guardians.
        guardian_notifications: usize,
    },
    /// Nothing was persisted.
    RolledBack {
        /// The error that aborted the fan-out.
        error: AppError,
    },
}

impl FanoutOutcome {
    /// Whether the event's notifications were committed.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    /// Number of notifications persisted by the event.
    pub fn notification_count(&self) -> usize {
        match self {
            Self::Committed {
                student_notifications,
                guardian_notifications,
            } => student_notifications + guardian_notifications,
            Self::Skipped { .. } | Self::RolledBack { .. } => 0,
        }
    }
}

/// Counters accumulated while a unit is open.
#[derive(Debug, Default)]
struct Tally {
    students: usize,
    guardians: usize,
}

/// Turns academic events into persisted notifications.
#[derive(Clone)]
pub struct FanoutOrchestrator {
    /// Opens one unit of work per event.
    store: Arc<dyn FanoutStore>,
    /// Draft builder.
    composer: NotificationComposer,
    /// Highest grade value still classified as bad.
    bad_grade_max: i16,
}

impl fmt::Debug for FanoutOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanoutOrchestrator")
            .field("bad_grade_max", &self.bad_grade_max)
            .finish()
    }
}

impl FanoutOrchestrator {
    /// Create a new orchestrator.
    pub fn new(store: Arc<dyn FanoutStore>, config: &NotificationConfig) -> Self {
        Self {
            store,
            composer: NotificationComposer::new(),
            bad_grade_max: config.bad_grade_max,
        }
    }

    /// Process one event. Never fails: errors roll the event back and are
    /// reported through [`FanoutOutcome::RolledBack`].
    pub async fn handle(&self, event: &DomainEvent) -> FanoutOutcome {
        let payload = &event.payload;
        let triggers = match self.plan(payload) {
            Ok(triggers) => triggers,
            Err(reason) => {
                debug!(
                    event_id = %event.id,
                    entity = payload.entity_kind(),
                    entity_id = %payload.entity_id(),
                    %reason,
                    "Event skipped"
                );
                return FanoutOutcome::Skipped { reason };
            }
        };

        let mut unit = match self.store.begin().await {
            Ok(unit) => unit,
            Err(e) => return Self::rolled_back(event, e),
        };

        let tally = match self.fan_out(&mut unit, &triggers).await {
            Ok(tally) => tally,
            Err(e) => {
                if let Err(rollback_err) = unit.rollback().await {
                    warn!(
                        event_id = %event.id,
                        error = %rollback_err,
                        "Failed to roll back notification transaction"
                    );
                }
                return Self::rolled_back(event, e);
            }
        };

        if let Err(e) = unit.commit().await {
            return Self::rolled_back(event, e);
        }

        info!(
            event_id = %event.id,
            entity = payload.entity_kind(),
            entity_id = %payload.entity_id(),
            students = tally.students,
            guardians = tally.guardians,
            "Notifications committed"
        );
        FanoutOutcome::Committed {
            student_notifications: tally.students,
            guardian_notifications: tally.guardians,
        }
    }

    /// Apply the trigger gate.
    fn plan<'a>(&self, payload: &'a AcademicEvent) -> Result<Vec<Trigger<'a>>, SkipReason> {
        match payload {
            AcademicEvent::GradeRecorded(e) => Ok(vec![Trigger::grade(e, self.bad_grade_max)]),
            AcademicEvent::AttendanceMarked(e) => Trigger::attendance(e)
                .map(|t| vec![t])
                .ok_or(SkipReason::AttendanceStatus(e.status)),
            AcademicEvent::HomeworkAssigned(e) => {
                if e.students.is_empty() {
                    warn!(
                        homework_id = %e.homework_id,
                        "Homework assigned to a class without students"
                    );
                    return Err(SkipReason::NoStudents);
                }
                Ok(Trigger::homework(e))
            }
        }
    }

    async fn fan_out(
        &self,
        unit: &mut Box<dyn FanoutUnit>,
        triggers: &[Trigger<'_>],
    ) -> AppResult<Tally> {
        let mut tally = Tally::default();

        for trigger in triggers {
            unit.persist(self.composer.compose_for_student(trigger)).await?;
            tally.students += 1;

            if !trigger.reaches_guardians() {
                continue;
            }

            let student_id = trigger.student_id();
            let input = EligibilityInput::from(trigger);
            for guardian_id in unit.active_guardians_of(student_id).await? {
                let preference = unit.preference(guardian_id, student_id).await?;
                if !should_notify_guardian(trigger.kind, &input, &preference) {
                    debug!(
                        %guardian_id,
                        %student_id,
                        kind = %trigger.kind,
                        "Guardian not eligible"
                    );
                    continue;
                }
                unit.persist(self.composer.compose_for_guardian(trigger, guardian_id))
                    .await?;
                tally.guardians += 1;
            }
        }

        Ok(tally)
    }

    fn rolled_back(event: &DomainEvent, error: AppError) -> FanoutOutcome {
        error!(
            event_id = %event.id,
            entity = event.payload.entity_kind(),
            entity_id = %event.payload.entity_id(),
            error = %error,
            "Notification fan-out rolled back"
        );
        FanoutOutcome::RolledBack { error }
    }
}
