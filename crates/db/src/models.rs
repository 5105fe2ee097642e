use chrono::{DateTime, NaiveDate, Utc};
use dutybot_core::models::Assignment;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAssignment {
    pub id: Uuid,
    pub duty_date: NaiveDate,
    pub chat_id: i64,
    pub operator: String,
    pub created_at: DateTime<Utc>,
}

impl From<DbAssignment> for Assignment {
    fn from(row: DbAssignment) -> Self {
        Self {
            id: row.id,
            date: row.duty_date,
            chat_id: row.chat_id,
            operator: row.operator,
            created_at: row.created_at,
        }
    }
}
