mod support;

use std::collections::BTreeSet;

use chrono::Days;
use dutybot_bot::commands::{Command, process_command};
use dutybot_bot::schedule::ScheduleBuilder;
use dutybot_calendar::MockHolidayCalendar;
use dutybot_core::dates::{format_human_date, format_user_date, today};
use dutybot_core::models::Assignment;
use support::MemoryStore;

fn command(action: &str, arguments: &str) -> Command {
    Command {
        action: action.to_string(),
        arguments: arguments.to_string(),
        operator: "alice".to_string(),
        chat_id: 42,
    }
}

fn open_calendar() -> MockHolidayCalendar {
    let mut calendar = MockHolidayCalendar::new();
    calendar
        .expect_is_holiday()
        .returning(|d| dutybot_core::dates::is_weekend(d));
    calendar
}

#[tokio::test]
async fn test_help_lists_every_command() {
    let builder = ScheduleBuilder::new(MemoryStore::new(), MockHolidayCalendar::new());

    let reply = process_command(&builder, &command("help", "")).await;
    for name in ["/help", "/operator", "/show", "/assign", "/reset", "/freeslots"] {
        assert!(reply.contains(name), "help should mention {name}");
    }
}

#[tokio::test]
async fn test_unknown_command_points_to_help() {
    let builder = ScheduleBuilder::new(MemoryStore::new(), MockHolidayCalendar::new());

    let reply = process_command(&builder, &command("dance", "")).await;
    assert_eq!(reply, "Unknown command. Try /help");
}

#[tokio::test]
async fn test_operator_tags_todays_duty() {
    let store = MemoryStore::new();
    store.insert(Assignment::new(42, today(), "alice"));
    let builder = ScheduleBuilder::new(store, MockHolidayCalendar::new());

    let reply = process_command(&builder, &command("operator", "")).await;
    assert_eq!(reply, "@alice");
}

#[tokio::test]
async fn test_operator_with_empty_schedule() {
    let builder = ScheduleBuilder::new(MemoryStore::new(), MockHolidayCalendar::new());

    let reply = process_command(&builder, &command("operator", "")).await;
    assert!(reply.contains("Nobody is on duty today"));
}

#[tokio::test]
async fn test_assign_replies_with_schedule() {
    let builder = ScheduleBuilder::new(MemoryStore::new(), open_calendar());

    // Ten days out, skewed to the next Tuesday so it is never a weekend.
    let mut target = today() + Days::new(10);
    while dutybot_core::dates::is_weekend(target) {
        target = target.succ_opt().unwrap();
    }

    let reply = process_command(&builder, &command("assign", &format_user_date(target))).await;
    assert!(reply.starts_with("Got it!"), "got reply: {reply}");
    assert!(reply.contains("alice"));
}

#[tokio::test]
async fn test_assign_rejects_bad_date_text() {
    let builder = ScheduleBuilder::new(MemoryStore::new(), MockHolidayCalendar::new());

    let reply = process_command(&builder, &command("assign", "next tuesday")).await;
    assert_eq!(reply, "'next tuesday' does not look like DD-MM-YYYY");
}

#[tokio::test]
async fn test_assign_taken_slot_names_the_holder() {
    let store = MemoryStore::new();
    let mut target = today() + Days::new(10);
    while dutybot_core::dates::is_weekend(target) {
        target = target.succ_opt().unwrap();
    }
    store.insert(Assignment::new(42, target, "bob"));
    let builder = ScheduleBuilder::new(store, open_calendar());

    let reply = process_command(
        &builder,
        &command("assign", &format_user_date(target)),
    )
    .await;
    assert_eq!(
        reply,
        format!("{} is already taken by @bob", format_user_date(target))
    );
}

#[tokio::test]
async fn test_reset_without_assignment() {
    let builder = ScheduleBuilder::new(MemoryStore::new(), MockHolidayCalendar::new());

    let reply = process_command(&builder, &command("reset", "")).await;
    assert_eq!(reply, "That slot is already free.");
}

#[tokio::test]
async fn test_reset_frees_the_slot() {
    let store = MemoryStore::new();
    store.insert(Assignment::new(42, today(), "alice"));
    let builder = ScheduleBuilder::new(store, MockHolidayCalendar::new());

    let reply = process_command(&builder, &command("reset", "")).await;
    assert_eq!(
        reply,
        format!("{} is free again (was @alice)", format_user_date(today()))
    );
}

#[tokio::test]
async fn test_freeslots_renders_table() {
    let slot = today() + Days::new(1);
    let mut calendar = MockHolidayCalendar::new();
    calendar
        .expect_working_days()
        .returning(move |_, _| Ok([slot].into_iter().collect::<BTreeSet<_>>()));

    let builder = ScheduleBuilder::new(MemoryStore::new(), calendar);
    let reply = process_command(&builder, &command("freeslots", "")).await;
    assert!(reply.contains(&format_human_date(slot)));
}

#[tokio::test]
async fn test_freeslots_when_everything_is_taken() {
    let mut calendar = MockHolidayCalendar::new();
    calendar
        .expect_working_days()
        .returning(|_, _| Ok(BTreeSet::new()));

    let builder = ScheduleBuilder::new(MemoryStore::new(), calendar);
    let reply = process_command(&builder, &command("freeslots", "")).await;
    assert!(reply.starts_with("No free slots until"));
}

#[tokio::test]
async fn test_infrastructure_failure_gets_generic_reply() {
    let mut calendar = MockHolidayCalendar::new();
    calendar.expect_working_days().returning(|_, _| {
        Err(dutybot_core::errors::DutyError::CalendarUnavailable(
            "connection refused".to_string(),
        ))
    });

    let builder = ScheduleBuilder::new(MemoryStore::new(), calendar);
    let reply = process_command(&builder, &command("freeslots", "")).await;
    assert_eq!(reply, "Something went wrong, please try again later.");
}

#[tokio::test]
async fn test_show_marks_free_days() {
    let builder = ScheduleBuilder::new(MemoryStore::new(), MockHolidayCalendar::new());

    let reply = process_command(&builder, &command("show", "1")).await;
    assert!(reply.contains("(free)"));
}
