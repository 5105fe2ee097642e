use chrono::NaiveDate;
use dutybot_core::errors::{DutyError, DutyResult};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_error_display() {
    let invalid = DutyError::InvalidDate("tomorrow".to_string());
    let holiday = DutyError::HolidayRejected(date(2024, 3, 9));
    let past = DutyError::PastDateRejected(date(2024, 3, 1));
    let taken = DutyError::AlreadyTaken {
        date: date(2024, 3, 12),
        operator: "alice".to_string(),
    };
    let not_found = DutyError::NotFound("assignment".to_string());
    let calendar = DutyError::CalendarUnavailable("connection refused".to_string());
    let store = DutyError::StoreUnavailable(eyre::eyre!("pool timed out"));

    assert_eq!(invalid.to_string(), "'tomorrow' does not look like DD-MM-YYYY");
    assert_eq!(
        holiday.to_string(),
        "09-03-2024 is a holiday, no duty on holidays"
    );
    assert!(past.to_string().starts_with("01-03-2024 is not a future date"));
    assert_eq!(taken.to_string(), "12-03-2024 is already taken");
    assert_eq!(not_found.to_string(), "not found: assignment");
    assert!(calendar.to_string().contains("calendar authority unavailable"));
    assert!(store.to_string().contains("assignment store unavailable"));
}

#[test]
fn test_user_error_split() {
    let user_facing = [
        DutyError::InvalidDate("x".to_string()),
        DutyError::HolidayRejected(date(2024, 3, 9)),
        DutyError::PastDateRejected(date(2024, 3, 1)),
        DutyError::AlreadyTaken {
            date: date(2024, 3, 12),
            operator: String::new(),
        },
    ];
    for err in user_facing {
        assert!(err.is_user_error(), "{err} should be user-facing");
    }

    let infrastructure = [
        DutyError::NotFound("assignment".to_string()),
        DutyError::InvalidSchedule("* *".to_string()),
        DutyError::CalendarUnavailable("timeout".to_string()),
        DutyError::StoreUnavailable(eyre::eyre!("down")),
    ];
    for err in infrastructure {
        assert!(!err.is_user_error(), "{err} should not be user-facing");
    }
}

#[test]
fn test_report_conversion() {
    fn fails() -> DutyResult<()> {
        Err(eyre::eyre!("connection reset"))?;
        Ok(())
    }

    let err = fails().unwrap_err();
    assert!(matches!(err, DutyError::StoreUnavailable(_)));
}
