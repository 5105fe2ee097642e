use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Assignment;

/// One calendar date in a rendered schedule: either a stored assignment
/// or a synthetic empty placeholder for a date with no row in storage.
/// Output-only; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub date: NaiveDate,
    pub chat_id: i64,
    /// Empty string marks a free slot.
    pub operator: String,
}

impl ScheduleRow {
    /// Placeholder row for a date with no stored assignment.
    pub fn empty(chat_id: i64, date: NaiveDate) -> Self {
        Self {
            date,
            chat_id,
            operator: String::new(),
        }
    }

    pub fn is_free(&self) -> bool {
        self.operator.is_empty()
    }
}

impl From<&Assignment> for ScheduleRow {
    fn from(assignment: &Assignment) -> Self {
        Self {
            date: assignment.date,
            chat_id: assignment.chat_id,
            operator: assignment.operator.clone(),
        }
    }
}
