//! Notification composition from fixed Russian templates.
//!
//! Every draft carries a denormalized data snapshot so that clients can
//! render it without re-reading the grade, attendance, or homework record.
//! Missing display names degrade to fallback strings.

use chrono::NaiveDate;
use serde_json::{Map, Value, json};

use eduhub_core::events::{AttendanceMarked, GradeRecorded, HomeworkAssigned};
use eduhub_core::types::id::{SubjectId, UserId};
use eduhub_entity::notification::{NotificationDraft, NotificationType};

use super::trigger::{Trigger, TriggerSource};

/// Shown when the subject name is unknown.
pub const FALLBACK_SUBJECT: &str = "Неизвестный предмет";
/// Shown when the teacher name is unknown.
pub const FALLBACK_TEACHER: &str = "Неизвестный учитель";
/// Shown when the student name is unknown.
pub const FALLBACK_STUDENT: &str = "Ученик";

const DATE_FORMAT: &str = "%d.%m.%Y";

/// Who a draft is addressed to.
#[derive(Debug, Clone, Copy)]
enum Audience<'a> {
    Student,
    Guardian { student: &'a str },
}

/// Builds student and guardian notification drafts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationComposer;

impl NotificationComposer {
    /// Create a new composer.
    pub fn new() -> Self {
        Self
    }

    /// Draft addressed to the student the trigger concerns.
    pub fn compose_for_student(&self, trigger: &Trigger<'_>) -> NotificationDraft {
        let (title, message) = texts(trigger, Audience::Student);
        draft(trigger, trigger.student_id(), title, message, snapshot(trigger))
    }

    /// Draft addressed to one of the student's guardians. Adds the student's
    /// id and name to the data snapshot.
    pub fn compose_for_guardian(
        &self,
        trigger: &Trigger<'_>,
        guardian_id: UserId,
    ) -> NotificationDraft {
        let student = trigger.student_name().unwrap_or(FALLBACK_STUDENT);
        let (title, message) = texts(trigger, Audience::Guardian { student });

        let mut data = snapshot(trigger);
        data.insert("student_id".into(), json!(trigger.student_id()));
        data.insert("student_name".into(), json!(student));
        draft(trigger, guardian_id, title, message, data)
    }
}

fn draft(
    trigger: &Trigger<'_>,
    recipient_id: UserId,
    title: String,
    message: String,
    data: Map<String, Value>,
) -> NotificationDraft {
    NotificationDraft {
        recipient_id,
        title,
        message,
        notification_type: trigger.kind,
        priority: trigger.kind.default_priority(),
        category: trigger.kind.category(),
        data: Value::Object(data),
        related: Some(trigger.related_entity()),
        expires_at: None,
    }
}

fn subject_of(name: &Option<String>) -> &str {
    name.as_deref().unwrap_or(FALLBACK_SUBJECT)
}

fn teacher_of(name: &Option<String>) -> &str {
    name.as_deref().unwrap_or(FALLBACK_TEACHER)
}

fn fmt_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn texts(trigger: &Trigger<'_>, audience: Audience<'_>) -> (String, String) {
    match trigger.source {
        TriggerSource::Grade(e) => grade_texts(trigger.kind, e, audience),
        TriggerSource::Attendance(e) => attendance_texts(trigger.kind, e, audience),
        TriggerSource::Homework { event, .. } => homework_texts(event, audience),
    }
}

fn grade_texts(
    kind: NotificationType,
    e: &GradeRecorded,
    audience: Audience<'_>,
) -> (String, String) {
    let bad = kind == NotificationType::BadGrade;
    let subject = subject_of(&e.subject_name);
    let tail = format!(
        "оценку {} по предмету «{}» ({}). Учитель: {}.",
        e.value,
        subject,
        fmt_date(e.date),
        teacher_of(&e.teacher_name)
    );

    let (title, mut message) = match audience {
        Audience::Student => (
            if bad {
                "Получена неудовлетворительная оценка"
            } else {
                "Получена новая оценка"
            },
            format!("Вы получили {tail}"),
        ),
        Audience::Guardian { student } => (
            if bad {
                "Неудовлетворительная оценка у ребенка"
            } else {
                "Новая оценка у ребенка"
            },
            format!("Ваш ребенок {student} получил {tail}"),
        ),
    };
    if let Some(comment) = e.comment.as_deref().filter(|c| !c.is_empty()) {
        message.push_str(&format!(" Комментарий: {comment}."));
    }
    (title.to_string(), message)
}

fn attendance_texts(
    kind: NotificationType,
    e: &AttendanceMarked,
    audience: Audience<'_>,
) -> (String, String) {
    let late = kind == NotificationType::Late;
    let lesson = format!(
        "№{} по предмету «{}» ({})",
        e.lesson_number,
        subject_of(&e.subject_name),
        fmt_date(e.date)
    );

    let (title, mut message) = match (audience, late) {
        (Audience::Student, false) => (
            "Отмечено отсутствие на уроке",
            format!("Вы отсутствовали на уроке {lesson}"),
        ),
        (Audience::Student, true) => (
            "Отмечено опоздание на урок",
            format!("Вы опоздали на урок {lesson}"),
        ),
        (Audience::Guardian { student }, false) => (
            "Ребенок отсутствовал на уроке",
            format!("Ваш ребенок {student} отсутствовал на уроке {lesson}"),
        ),
        (Audience::Guardian { student }, true) => (
            "Ребенок опоздал на урок",
            format!("Ваш ребенок {student} опоздал на урок {lesson}"),
        ),
    };
    message.push('.');

    if late {
        if let Some(arrival) = e.arrival_time {
            message.push_str(&format!(" Время прихода: {}.", arrival.format("%H:%M")));
        }
    }
    if let Some(reason) = e.reason.as_deref().filter(|r| !r.is_empty()) {
        message.push_str(&format!(" Причина: {reason}."));
    }
    message.push_str(&format!(" Учитель: {}.", teacher_of(&e.teacher_name)));
    (title.to_string(), message)
}

fn homework_texts(e: &HomeworkAssigned, audience: Audience<'_>) -> (String, String) {
    let subject = subject_of(&e.subject_name);
    let (title, mut message) = match audience {
        Audience::Student => (
            "Новое домашнее задание",
            format!("По предмету «{subject}» задано: {}.", e.title),
        ),
        Audience::Guardian { student } => (
            "Новое домашнее задание у ребенка",
            format!(
                "Вашему ребенку {student} задано домашнее задание по предмету «{subject}»: {}.",
                e.title
            ),
        ),
    };
    message.push_str(&format!(" Срок сдачи: {}.", fmt_date(e.due_date)));
    if let Some(points) = e.max_points {
        message.push_str(&format!(" Максимальный балл: {points}."));
    }
    message.push_str(&format!(" Учитель: {}.", teacher_of(&e.teacher_name)));
    (title.to_string(), message)
}

fn base_snapshot(
    subject_id: Option<SubjectId>,
    subject_name: &Option<String>,
    date: NaiveDate,
    teacher_name: &Option<String>,
) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("subject_id".into(), json!(subject_id));
    data.insert("subject_name".into(), json!(subject_of(subject_name)));
    data.insert("date".into(), json!(date));
    data.insert("teacher_name".into(), json!(teacher_of(teacher_name)));
    data
}

fn snapshot(trigger: &Trigger<'_>) -> Map<String, Value> {
    match trigger.source {
        TriggerSource::Grade(e) => {
            let mut data = base_snapshot(e.subject_id, &e.subject_name, e.date, &e.teacher_name);
            data.insert("grade_value".into(), json!(e.value));
            data.insert("grade_type".into(), json!(e.grade_type));
            data.insert("comment".into(), json!(e.comment));
            data
        }
        TriggerSource::Attendance(e) => {
            let mut data = base_snapshot(e.subject_id, &e.subject_name, e.date, &e.teacher_name);
            data.insert("status".into(), json!(e.status.as_str()));
            data.insert("arrival_time".into(), json!(e.arrival_time));
            data.insert("lesson_number".into(), json!(e.lesson_number));
            data.insert("reason".into(), json!(e.reason));
            data
        }
        TriggerSource::Homework { event, .. } => homework_snapshot(event),
    }
}

fn homework_snapshot(e: &HomeworkAssigned) -> Map<String, Value> {
    let mut data = base_snapshot(e.subject_id, &e.subject_name, e.assigned_date, &e.teacher_name);
    data.insert("title".into(), json!(e.title));
    data.insert("due_date".into(), json!(e.due_date));
    data.insert("max_points".into(), json!(e.max_points));
    data.insert("description".into(), json!(e.description));
    data
}
