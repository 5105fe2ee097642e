use chrono::Days;
use dutybot_calendar::HolidayCalendar;
use dutybot_core::dates::{DAYS_IN_WEEK, format_human_date, format_user_date, today};
use dutybot_core::errors::DutyError;
use dutybot_core::table::PrettyTable;
use dutybot_db::AssignmentStore;

use crate::schedule::ScheduleBuilder;

/// Default horizon for `show` and `freeslots`, in weeks.
pub const DEFAULT_WEEKS: u64 = 2;

const HELP_TEXT: &str = "Usage:
/help - look at this message again
/operator - tag current duty
/show [weeks (default=2)] - show duty schedule for some weeks ahead
/assign [date] - assign yourself for duty, date should be DD-MM-YYYY
/reset [date] - free a duty slot (defaults to today)
/freeslots [weeks (default=2)] - list slots nobody has taken yet";

const UNKNOWN_REPLY: &str = "Unknown command. Try /help";
const GENERIC_FAILURE_REPLY: &str = "Something went wrong, please try again later.";

/// A parsed chat command, handed over by the (excluded) transport layer.
#[derive(Debug, Clone)]
pub struct Command {
    pub action: String,
    pub arguments: String,
    /// Username of whoever issued the command.
    pub operator: String,
    pub chat_id: i64,
}

/// Dispatch a command and produce the reply text for its chat.
pub async fn process_command<S, C>(builder: &ScheduleBuilder<S, C>, command: &Command) -> String
where
    S: AssignmentStore,
    C: HolidayCalendar,
{
    match command.action.as_str() {
        "help" => HELP_TEXT.to_string(),
        "operator" => operator(builder, command).await,
        "show" => show(builder, command).await,
        "assign" => assign(builder, command).await,
        "reset" => reset(builder, command).await,
        "freeslots" => free_slots(builder, command).await,
        _ => UNKNOWN_REPLY.to_string(),
    }
}

async fn operator<S, C>(builder: &ScheduleBuilder<S, C>, command: &Command) -> String
where
    S: AssignmentStore,
    C: HolidayCalendar,
{
    match builder.todays_assignment(command.chat_id).await {
        Ok(Some(assignment)) if !assignment.is_unassigned() => {
            format!("@{}", assignment.operator)
        }
        Ok(_) => "Nobody is on duty today. Use /assign to take the slot.".to_string(),
        Err(err) => render_error(&err),
    }
}

async fn show<S, C>(builder: &ScheduleBuilder<S, C>, command: &Command) -> String
where
    S: AssignmentStore,
    C: HolidayCalendar,
{
    let from = today();
    let until = from + Days::new(parse_weeks(&command.arguments) * DAYS_IN_WEEK as u64);

    match builder.get_schedule(command.chat_id, from, until, true).await {
        Ok(rows) => {
            let mut table = PrettyTable::new();
            for row in rows {
                let operator = if row.is_free() {
                    "(free)".to_string()
                } else {
                    row.operator
                };
                table.add_row(vec![operator, format_human_date(row.date)]);
            }
            table.render()
        }
        Err(err) => render_error(&err),
    }
}

async fn assign<S, C>(builder: &ScheduleBuilder<S, C>, command: &Command) -> String
where
    S: AssignmentStore,
    C: HolidayCalendar,
{
    match builder
        .assign(command.chat_id, &command.arguments, &command.operator)
        .await
    {
        // Reply with the updated schedule so the chat sees the new state.
        Ok(_) => {
            let mut confirmation = show(builder, command).await;
            confirmation.insert_str(0, "Got it!\n");
            confirmation
        }
        Err(err) => render_error(&err),
    }
}

async fn reset<S, C>(builder: &ScheduleBuilder<S, C>, command: &Command) -> String
where
    S: AssignmentStore,
    C: HolidayCalendar,
{
    let date_text = match command.arguments.trim() {
        "" => None,
        text => Some(text),
    };

    match builder.reset(command.chat_id, date_text).await {
        Ok(Some(assignment)) => format!(
            "{} is free again (was @{})",
            format_user_date(assignment.date),
            assignment.operator
        ),
        Ok(None) => "That slot is already free.".to_string(),
        Err(err) => render_error(&err),
    }
}

async fn free_slots<S, C>(builder: &ScheduleBuilder<S, C>, command: &Command) -> String
where
    S: AssignmentStore,
    C: HolidayCalendar,
{
    let until = today() + Days::new(parse_weeks(&command.arguments) * DAYS_IN_WEEK as u64);

    match builder.get_free_slots(command.chat_id, until).await {
        Ok(slots) if slots.is_empty() => {
            format!("No free slots until {}", format_user_date(until))
        }
        Ok(slots) => {
            let mut table = PrettyTable::new();
            for date in slots {
                table.add_row(vec![format_human_date(date)]);
            }
            table.render()
        }
        Err(err) => render_error(&err),
    }
}

fn parse_weeks(arguments: &str) -> u64 {
    arguments
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|weeks| (1..=52).contains(weeks))
        .unwrap_or(DEFAULT_WEEKS)
}

/// Validation errors are shown verbatim; infrastructure errors are
/// logged with context and replaced by a generic reply. No retries in
/// either case.
fn render_error(err: &DutyError) -> String {
    match err {
        DutyError::AlreadyTaken { date, operator } if !operator.is_empty() => {
            format!(
                "{} is already taken by @{}",
                format_user_date(*date),
                operator
            )
        }
        _ if err.is_user_error() => err.to_string(),
        _ => {
            tracing::error!(error = %err, "Command failed");
            GENERIC_FAILURE_REPLY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_weeks;

    #[test]
    fn test_parse_weeks() {
        assert_eq!(parse_weeks(""), 2);
        assert_eq!(parse_weeks("  "), 2);
        assert_eq!(parse_weeks("3"), 3);
        assert_eq!(parse_weeks("0"), 2);
        assert_eq!(parse_weeks("-1"), 2);
        assert_eq!(parse_weeks("1000"), 2);
        assert_eq!(parse_weeks("soon"), 2);
    }
}
