use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use dutybot_bot::config::BotConfig;
use dutybot_bot::notifier::{LogNotifier, Notifier};
use dutybot_bot::schedule::ScheduleBuilder;
use dutybot_bot::tasks::register_jobs;
use dutybot_calendar::CalendarClient;
use dutybot_db::{PgAssignmentStore, create_pool, schema::initialize_database};
use dutybot_scheduler::TaskScheduler;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = BotConfig::from_env()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting dutybot");

    // Create database connection pool
    let db_pool = create_pool(&config.database_url).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    // Wire the explicit dependencies: store, calendar and builder are
    // constructed once and shared with the periodic jobs.
    let store = PgAssignmentStore::new(db_pool);
    let calendar = CalendarClient::new(&config.calendar_url, config.calendar_timeout())?;
    let builder = Arc::new(ScheduleBuilder::new(store, calendar));
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

    // Schedule the unattended jobs and start firing
    let scheduler = TaskScheduler::new();
    register_jobs(&scheduler, builder, notifier, &config)?;
    scheduler.start();

    info!("dutybot running, press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    scheduler.stop();
    info!("dutybot shut down gracefully");
    Ok(())
}
