use chrono::NaiveDate;
use thiserror::Error;

use crate::dates::USER_DATE_FORMAT;

/// Every failure the duty core can produce.
///
/// The first four variants are expected, user-presentable validation
/// outcomes; the command layer renders them as plain text and never
/// retries. The infrastructure variants are logged with context and
/// surfaced as a generic "try again" message.
#[derive(Error, Debug)]
pub enum DutyError {
    #[error("'{0}' does not look like DD-MM-YYYY")]
    InvalidDate(String),

    #[error("{} is a holiday, no duty on holidays", .0.format(USER_DATE_FORMAT))]
    HolidayRejected(NaiveDate),

    #[error("{} is not a future date, assignment is possible only for future dates", .0.format(USER_DATE_FORMAT))]
    PastDateRejected(NaiveDate),

    #[error("{} is already taken", .date.format(USER_DATE_FORMAT))]
    AlreadyTaken {
        date: NaiveDate,
        /// Operator currently holding the slot, empty when the conflict
        /// was detected by the storage constraint rather than a read.
        operator: String,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid cron schedule: {0}")]
    InvalidSchedule(String),

    #[error("calendar authority unavailable: {0}")]
    CalendarUnavailable(String),

    #[error("assignment store unavailable: {0}")]
    StoreUnavailable(#[from] eyre::Report),
}

impl DutyError {
    /// Whether this error is an expected validation outcome that can be
    /// shown to the user verbatim, as opposed to an infrastructure
    /// failure that only warrants a generic reply.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            DutyError::InvalidDate(_)
                | DutyError::HolidayRejected(_)
                | DutyError::PastDateRejected(_)
                | DutyError::AlreadyTaken { .. }
        )
    }
}

pub type DutyResult<T> = Result<T, DutyError>;
