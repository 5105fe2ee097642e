use std::sync::Arc;

use chrono::Days;
use dutybot_calendar::HolidayCalendar;
use dutybot_core::dates::{DAYS_IN_WEEK, format_human_date, today};
use dutybot_core::errors::DutyResult;
use dutybot_core::table::PrettyTable;
use dutybot_db::AssignmentStore;
use dutybot_scheduler::{Job, TaskScheduler};

use crate::commands::DEFAULT_WEEKS;
use crate::config::BotConfig;
use crate::notifier::Notifier;
use crate::schedule::ScheduleBuilder;

/// Tag today's operator in every chat that has one. A slot with an empty
/// operator produces no message.
pub async fn announce_duty<S, C>(
    builder: &ScheduleBuilder<S, C>,
    notifier: &dyn Notifier,
) -> DutyResult<()>
where
    S: AssignmentStore,
    C: HolidayCalendar,
{
    tracing::debug!("Start duty announcing");
    let assignments = builder.todays_assignments_all_chats().await?;

    for assignment in assignments {
        if assignment.is_unassigned() {
            continue;
        }
        let text = format!("@{} is on duty today", assignment.operator);
        if let Err(err) = notifier.send(assignment.chat_id, &text).await {
            tracing::error!(
                chat_id = assignment.chat_id,
                error = %err,
                "Failed to deliver duty announcement"
            );
        }
    }
    Ok(())
}

/// Warn every known chat that still has unassigned working days within
/// the default horizon. Chats with a full schedule stay quiet.
pub async fn warn_free_slots<S, C>(
    builder: &ScheduleBuilder<S, C>,
    notifier: &dyn Notifier,
) -> DutyResult<()>
where
    S: AssignmentStore,
    C: HolidayCalendar,
{
    tracing::debug!("Start free slots announcing");
    let until = today() + Days::new(DEFAULT_WEEKS * DAYS_IN_WEEK as u64);

    for chat_id in builder.all_chats().await? {
        let slots = match builder.get_free_slots(chat_id, until).await {
            Ok(slots) => slots,
            Err(err) => {
                // One chat failing must not silence the others.
                tracing::error!(chat_id, error = %err, "Failed to compute free slots");
                continue;
            }
        };
        if slots.is_empty() {
            continue;
        }

        let mut table = PrettyTable::new();
        for date in slots {
            table.add_row(vec![format_human_date(date)]);
        }
        let text = format!("Free slots still available!\n{}", table.render());

        if let Err(err) = notifier.send(chat_id, &text).await {
            tracing::error!(chat_id, error = %err, "Failed to deliver free slot warning");
        }
    }
    Ok(())
}

/// Register both periodic jobs on the scheduler with the configured cron
/// expressions. Job bodies only read the store and notify, so overlapping
/// firings are harmless.
pub fn register_jobs<S, C>(
    scheduler: &TaskScheduler,
    builder: Arc<ScheduleBuilder<S, C>>,
    notifier: Arc<dyn Notifier>,
    config: &BotConfig,
) -> DutyResult<()>
where
    S: AssignmentStore + 'static,
    C: HolidayCalendar + 'static,
{
    let announce_builder = Arc::clone(&builder);
    let announce_notifier = Arc::clone(&notifier);
    let announce: Job = Arc::new(move || {
        let builder = Arc::clone(&announce_builder);
        let notifier = Arc::clone(&announce_notifier);
        Box::pin(async move {
            announce_duty(builder.as_ref(), notifier.as_ref()).await?;
            Ok(())
        })
    });
    scheduler.add_task(&config.duty_announce_schedule, "announce-duty", announce)?;

    let warn: Job = Arc::new(move || {
        let builder = Arc::clone(&builder);
        let notifier = Arc::clone(&notifier);
        Box::pin(async move {
            warn_free_slots(builder.as_ref(), notifier.as_ref()).await?;
            Ok(())
        })
    });
    scheduler.add_task(&config.free_slots_warn_schedule, "warn-free-slots", warn)?;

    Ok(())
}
