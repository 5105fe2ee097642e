use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // One row per duty slot. The uniqueness constraint over
    // (chat_id, duty_date) is what resolves concurrent assigns: the
    // insert, not a prior read, is the authority.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assignments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            duty_date DATE NOT NULL,
            chat_id BIGINT NOT NULL,
            operator TEXT NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT one_assignment_per_slot UNIQUE (chat_id, duty_date)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_assignments_chat_id ON assignments(chat_id);")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_assignments_duty_date ON assignments(duty_date);")
        .execute(pool)
        .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
