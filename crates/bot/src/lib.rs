//! Duty schedule engine and the surfaces around it: the schedule
//! builder that reconciles stored assignments with the working-day
//! calendar, the structured command handlers, the notification boundary,
//! and the two unattended periodic jobs.

/// Bot configuration from environment variables
pub mod config;
/// Structured command dispatch returning reply text
pub mod commands;
/// Notification sink boundary for the chat transport
pub mod notifier;
/// Schedule builder: assign/reset flows, schedule and free-slot views
pub mod schedule;
/// Periodic announcement jobs and their scheduler wiring
pub mod tasks;
