use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One duty slot: at most one assignment exists per `(chat_id, date)`.
///
/// Assignments are never mutated in place; a change is a delete followed
/// by an insert, so `id` is stable for the record's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    /// The calendar date the duty applies to, day granularity.
    pub date: NaiveDate,
    /// Chat the assignment is scoped to.
    pub chat_id: i64,
    /// Assignee handle; empty means "no operator assigned".
    pub operator: String,
    /// Creation timestamp, informational only.
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    pub fn new(chat_id: i64, date: NaiveDate, operator: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            chat_id,
            operator: operator.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.operator.is_empty()
    }
}
