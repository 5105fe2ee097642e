use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use dutybot_calendar::HolidayCalendar;
use dutybot_core::dates::{is_weekend, parse_user_date, today};
use dutybot_core::errors::{DutyError, DutyResult};
use dutybot_core::models::{Assignment, ScheduleRow};
use dutybot_db::AssignmentStore;

/// The one place that reconciles stored assignments with the calendar.
///
/// Every operation re-reads both sources; nothing is cached between
/// calls. The store read and the calendar read are two independent
/// queries with no transactional guarantee between them — the store's
/// uniqueness constraint is the only hard consistency point.
pub struct ScheduleBuilder<S, C> {
    store: S,
    calendar: C,
}

impl<S, C> ScheduleBuilder<S, C>
where
    S: AssignmentStore,
    C: HolidayCalendar,
{
    pub fn new(store: S, calendar: C) -> Self {
        Self { store, calendar }
    }

    /// Dense week view: one row per calendar date in `[from, until)`,
    /// ascending, a synthetic empty row where nothing is stored.
    /// Weekends are skipped entirely when `filter_weekends` is set.
    pub async fn get_schedule(
        &self,
        chat_id: i64,
        from: NaiveDate,
        until: NaiveDate,
        filter_weekends: bool,
    ) -> DutyResult<Vec<ScheduleRow>> {
        let assignments = self.store.assignment_schedule(chat_id, from, until).await?;
        // The store orders descending; index by date and walk ascending.
        let by_date: HashMap<NaiveDate, Assignment> = assignments
            .into_iter()
            .map(|a| (a.date, a))
            .collect();

        let mut rows = Vec::new();
        let mut date = from;
        while date < until {
            if !(filter_weekends && is_weekend(date)) {
                rows.push(match by_date.get(&date) {
                    Some(assignment) => ScheduleRow::from(assignment),
                    None => ScheduleRow::empty(chat_id, date),
                });
            }
            let Some(next) = date.succ_opt() else { break };
            date = next;
        }
        Ok(rows)
    }

    /// Future working days with no stored assignment, ascending.
    pub async fn get_free_slots(&self, chat_id: i64, until: NaiveDate) -> DutyResult<Vec<NaiveDate>> {
        self.get_free_slots_at(today(), chat_id, until).await
    }

    pub async fn get_free_slots_at(
        &self,
        today: NaiveDate,
        chat_id: i64,
        until: NaiveDate,
    ) -> DutyResult<Vec<NaiveDate>> {
        let working = self.calendar.working_days(today, until).await?;
        let taken: BTreeSet<NaiveDate> = self
            .store
            .assigned_dates(chat_id, today, until)
            .await?
            .into_iter()
            .collect();

        Ok(working.difference(&taken).copied().collect())
    }

    /// Take a duty slot. Validation order: date text parses, date is not
    /// a holiday (weekends count as holidays), date is strictly after
    /// today, slot is not already taken. Nothing is written unless every
    /// check passes.
    pub async fn assign(
        &self,
        chat_id: i64,
        date_text: &str,
        operator: &str,
    ) -> DutyResult<Assignment> {
        self.assign_at(today(), chat_id, date_text, operator).await
    }

    pub async fn assign_at(
        &self,
        today: NaiveDate,
        chat_id: i64,
        date_text: &str,
        operator: &str,
    ) -> DutyResult<Assignment> {
        let date = parse_user_date(date_text)?;

        if self.calendar.is_holiday(date).await {
            return Err(DutyError::HolidayRejected(date));
        }
        if date <= today {
            return Err(DutyError::PastDateRejected(date));
        }
        if let Some(existing) = self.store.assignment_by_date(chat_id, date).await? {
            return Err(DutyError::AlreadyTaken {
                date,
                operator: existing.operator,
            });
        }

        let assignment = Assignment::new(chat_id, date, operator);
        tracing::debug!(chat_id, %date, operator, "New assignment");
        // A concurrent assign can still land between the read above and
        // this insert; the uniqueness constraint resolves it.
        self.store.add_assignment(&assignment).await?;
        Ok(assignment)
    }

    /// Free a duty slot; `None` date means today. Resetting an already
    /// empty slot is a no-op success, not an error.
    pub async fn reset(
        &self,
        chat_id: i64,
        date_text: Option<&str>,
    ) -> DutyResult<Option<Assignment>> {
        self.reset_at(today(), chat_id, date_text).await
    }

    pub async fn reset_at(
        &self,
        today: NaiveDate,
        chat_id: i64,
        date_text: Option<&str>,
    ) -> DutyResult<Option<Assignment>> {
        let date = match date_text {
            Some(text) => parse_user_date(text)?,
            None => today,
        };

        match self.store.assignment_by_date(chat_id, date).await? {
            Some(assignment) => {
                tracing::debug!(chat_id, %date, "Resetting assignment");
                self.store.delete_assignment(assignment.id).await?;
                Ok(Some(assignment))
            }
            None => Ok(None),
        }
    }

    /// Today's assignment for one chat, if any.
    pub async fn todays_assignment(&self, chat_id: i64) -> DutyResult<Option<Assignment>> {
        self.store.assignment_by_date(chat_id, today()).await
    }

    /// Today's assignments across every chat, for the daily announcement.
    pub async fn todays_assignments_all_chats(&self) -> DutyResult<Vec<Assignment>> {
        let now = today();
        self.store.assignment_schedule_all_chats(now, now).await
    }

    /// Every chat that ever recorded an assignment.
    pub async fn all_chats(&self) -> DutyResult<Vec<i64>> {
        self.store.all_chats().await
    }
}
