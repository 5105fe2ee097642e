use std::env;
use std::time::Duration;

use dutybot_calendar::DEFAULT_CALENDAR_URL;
use eyre::{Result, WrapErr};
use tracing::Level;

/// Configuration for the duty bot.
///
/// Loaded from environment variables:
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `CALENDAR_URL`: base URL of the working-day authority
///   (default: "https://isdayoff.ru")
/// - `CALENDAR_TIMEOUT_SECONDS`: per-request deadline for calendar
///   queries (default: 5)
/// - `DUTY_ANNOUNCE_SCHEDULE`: cron expression for the daily operator
///   announcement (default: "0 9 * * 1-5")
/// - `FREE_SLOTS_WARN_SCHEDULE`: cron expression for the weekly
///   free-slot warning (default: "0 17 * * 4")
/// - `LOG_LEVEL`: logging level (default: "info")
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// PostgreSQL database connection string
    pub database_url: String,

    /// Base URL of the calendar authority
    pub calendar_url: String,

    /// Per-request deadline for calendar queries, in seconds
    pub calendar_timeout_seconds: u64,

    /// Cron schedule for the daily duty announcement
    pub duty_announce_schedule: String,

    /// Cron schedule for the free-slot warning
    pub free_slots_warn_schedule: String,

    /// Log level for the application
    pub log_level: Level,
}

impl BotConfig {
    /// Load configuration from environment variables, with defaults for
    /// everything except `DATABASE_URL`.
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        let calendar_url =
            env::var("CALENDAR_URL").unwrap_or_else(|_| DEFAULT_CALENDAR_URL.to_string());

        let calendar_timeout_seconds = env::var("CALENDAR_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .wrap_err("Invalid CALENDAR_TIMEOUT_SECONDS value")?;

        let duty_announce_schedule =
            env::var("DUTY_ANNOUNCE_SCHEDULE").unwrap_or_else(|_| "0 9 * * 1-5".to_string());

        let free_slots_warn_schedule =
            env::var("FREE_SLOTS_WARN_SCHEDULE").unwrap_or_else(|_| "0 17 * * 4".to_string());

        let log_level = match env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string())
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        Ok(Self {
            database_url,
            calendar_url,
            calendar_timeout_seconds,
            duty_announce_schedule,
            free_slots_warn_schedule,
            log_level,
        })
    }

    pub fn calendar_timeout(&self) -> Duration {
        Duration::from_secs(self.calendar_timeout_seconds)
    }
}
