use async_trait::async_trait;
use chrono::NaiveDate;
use dutybot_core::errors::{DutyError, DutyResult};
use dutybot_core::models::Assignment;
use mockall::automock;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::DbAssignment;

/// Postgres error code for a unique-constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Durable CRUD for assignment records, scoped by chat.
///
/// Range queries treat `from` and `until` as an inclusive date window and
/// return rows ordered by date descending; callers that need ascending
/// output must reorder for themselves.
#[automock]
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Insert a new assignment. Fails with `AlreadyTaken` when the slot
    /// is held, enforced by the storage uniqueness constraint rather
    /// than a read-before-write.
    async fn add_assignment(&self, assignment: &Assignment) -> DutyResult<()>;

    /// Delete by id. Fails with `NotFound` when no such row exists.
    async fn delete_assignment(&self, id: Uuid) -> DutyResult<()>;

    /// Point lookup; `None` means the slot is unassigned, errors are
    /// reserved for infrastructure failures.
    async fn assignment_by_date(
        &self,
        chat_id: i64,
        date: NaiveDate,
    ) -> DutyResult<Option<Assignment>>;

    async fn assignment_schedule(
        &self,
        chat_id: i64,
        from: NaiveDate,
        until: NaiveDate,
    ) -> DutyResult<Vec<Assignment>>;

    /// Unscoped variant of `assignment_schedule`, used by the daily
    /// announcement job.
    async fn assignment_schedule_all_chats(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> DutyResult<Vec<Assignment>>;

    /// Assigned dates only, for free-slot computation.
    async fn assigned_dates(
        &self,
        chat_id: i64,
        from: NaiveDate,
        until: NaiveDate,
    ) -> DutyResult<Vec<NaiveDate>>;

    /// Distinct chats with at least one assignment ever recorded.
    async fn all_chats(&self) -> DutyResult<Vec<i64>>;
}

// Stores are commonly shared between the request path and the periodic
// jobs; forwarding through Arc keeps that ergonomic.
#[async_trait]
impl<T: AssignmentStore + ?Sized> AssignmentStore for std::sync::Arc<T> {
    async fn add_assignment(&self, assignment: &Assignment) -> DutyResult<()> {
        (**self).add_assignment(assignment).await
    }

    async fn delete_assignment(&self, id: Uuid) -> DutyResult<()> {
        (**self).delete_assignment(id).await
    }

    async fn assignment_by_date(
        &self,
        chat_id: i64,
        date: NaiveDate,
    ) -> DutyResult<Option<Assignment>> {
        (**self).assignment_by_date(chat_id, date).await
    }

    async fn assignment_schedule(
        &self,
        chat_id: i64,
        from: NaiveDate,
        until: NaiveDate,
    ) -> DutyResult<Vec<Assignment>> {
        (**self).assignment_schedule(chat_id, from, until).await
    }

    async fn assignment_schedule_all_chats(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> DutyResult<Vec<Assignment>> {
        (**self).assignment_schedule_all_chats(from, until).await
    }

    async fn assigned_dates(
        &self,
        chat_id: i64,
        from: NaiveDate,
        until: NaiveDate,
    ) -> DutyResult<Vec<NaiveDate>> {
        (**self).assigned_dates(chat_id, from, until).await
    }

    async fn all_chats(&self) -> DutyResult<Vec<i64>> {
        (**self).all_chats().await
    }
}

#[derive(Clone)]
pub struct PgAssignmentStore {
    pool: Pool<Postgres>,
}

impl PgAssignmentStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn store_err(err: sqlx::Error) -> DutyError {
    DutyError::StoreUnavailable(err.into())
}

#[async_trait]
impl AssignmentStore for PgAssignmentStore {
    async fn add_assignment(&self, assignment: &Assignment) -> DutyResult<()> {
        tracing::debug!(
            chat_id = assignment.chat_id,
            date = %assignment.date,
            operator = %assignment.operator,
            "Inserting assignment"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO assignments (id, duty_date, chat_id, operator, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(assignment.id)
        .bind(assignment.date)
        .bind(assignment.chat_id)
        .bind(&assignment.operator)
        .bind(assignment.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(DutyError::AlreadyTaken {
                    date: assignment.date,
                    operator: String::new(),
                })
            }
            Err(err) => Err(store_err(err)),
        }
    }

    async fn delete_assignment(&self, id: Uuid) -> DutyResult<()> {
        tracing::debug!(%id, "Deleting assignment");

        let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(DutyError::NotFound(format!("assignment {id}")));
        }
        Ok(())
    }

    async fn assignment_by_date(
        &self,
        chat_id: i64,
        date: NaiveDate,
    ) -> DutyResult<Option<Assignment>> {
        let row = sqlx::query_as::<_, DbAssignment>(
            r#"
            SELECT id, duty_date, chat_id, operator, created_at
            FROM assignments
            WHERE chat_id = $1 AND duty_date = $2
            "#,
        )
        .bind(chat_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.map(Assignment::from))
    }

    async fn assignment_schedule(
        &self,
        chat_id: i64,
        from: NaiveDate,
        until: NaiveDate,
    ) -> DutyResult<Vec<Assignment>> {
        tracing::debug!(chat_id, %from, %until, "Fetching assignment schedule");

        let rows = sqlx::query_as::<_, DbAssignment>(
            r#"
            SELECT id, duty_date, chat_id, operator, created_at
            FROM assignments
            WHERE chat_id = $1 AND duty_date BETWEEN $2 AND $3
            ORDER BY duty_date DESC
            "#,
        )
        .bind(chat_id)
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows.into_iter().map(Assignment::from).collect())
    }

    async fn assignment_schedule_all_chats(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> DutyResult<Vec<Assignment>> {
        tracing::debug!(%from, %until, "Fetching assignment schedule for all chats");

        let rows = sqlx::query_as::<_, DbAssignment>(
            r#"
            SELECT id, duty_date, chat_id, operator, created_at
            FROM assignments
            WHERE duty_date BETWEEN $1 AND $2
            ORDER BY duty_date DESC
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows.into_iter().map(Assignment::from).collect())
    }

    async fn assigned_dates(
        &self,
        chat_id: i64,
        from: NaiveDate,
        until: NaiveDate,
    ) -> DutyResult<Vec<NaiveDate>> {
        let dates = sqlx::query_scalar::<_, NaiveDate>(
            r#"
            SELECT duty_date
            FROM assignments
            WHERE chat_id = $1 AND duty_date BETWEEN $2 AND $3
            "#,
        )
        .bind(chat_id)
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(dates)
    }

    async fn all_chats(&self) -> DutyResult<Vec<i64>> {
        let chats = sqlx::query_scalar::<_, i64>("SELECT DISTINCT chat_id FROM assignments")
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(chats)
    }
}
