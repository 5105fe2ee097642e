//! Working-day classification against an isdayoff-style HTTP authority.
//!
//! Saturday and Sunday are decided locally; only Monday-Friday dates are
//! ever sent to the external service. The authority answers `"0"` for a
//! working day and `"1"` for a holiday, both for single dates
//! (`GET {base}/{YYYYMMDD}`) and for ranges
//! (`GET {base}/api/getdata?date1=...&date2=...`, one character per day).

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use dutybot_core::dates::{COMPACT_DATE_FORMAT, is_weekend};
use dutybot_core::errors::{DutyError, DutyResult};
use eyre::Result;
use mockall::automock;

pub const DEFAULT_CALENDAR_URL: &str = "https://isdayoff.ru";

const HOLIDAY: char = '1';
const WORKING_DAY: char = '0';

#[automock]
#[async_trait]
pub trait HolidayCalendar: Send + Sync {
    /// Whether `date` is a holiday. Weekends are always holidays and are
    /// answered without a network call.
    ///
    /// Policy: on any failure (network, timeout, unparsable body) this
    /// returns `false`. Callers use the answer to reject assignments on
    /// holidays, and failing closed would silently block every future
    /// assignment during a calendar outage.
    async fn is_holiday(&self, date: NaiveDate) -> bool;

    /// The working days within the inclusive `[start, until]` range.
    ///
    /// Unlike `is_holiday` this fails loudly: callers consume the set as
    /// a whitelist, so on error an empty (safe) answer would be wrong.
    async fn working_days(
        &self,
        start: NaiveDate,
        until: NaiveDate,
    ) -> DutyResult<BTreeSet<NaiveDate>>;
}

/// HTTP client for the calendar authority. No state is kept between
/// calls; every query hits the service.
#[derive(Clone)]
pub struct CalendarClient {
    http: reqwest::Client,
    base_url: String,
}

impl CalendarClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_day_flag(&self, date: NaiveDate) -> Result<bool> {
        let url = day_url(&self.base_url, date);
        let body = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_day_flag(&body).ok_or_else(|| eyre::eyre!("unexpected calendar answer: {body:?}"))
    }
}

#[async_trait]
impl HolidayCalendar for CalendarClient {
    async fn is_holiday(&self, date: NaiveDate) -> bool {
        if is_weekend(date) {
            return true;
        }

        match self.fetch_day_flag(date).await {
            Ok(flag) => flag,
            Err(err) => {
                tracing::warn!(
                    %date,
                    error = %err,
                    "Calendar authority unreachable, treating date as a working day"
                );
                false
            }
        }
    }

    async fn working_days(
        &self,
        start: NaiveDate,
        until: NaiveDate,
    ) -> DutyResult<BTreeSet<NaiveDate>> {
        let url = range_url(&self.base_url, start, until);
        tracing::debug!(%start, %until, "Requesting working days");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| DutyError::CalendarUnavailable(err.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|err| DutyError::CalendarUnavailable(err.to_string()))?;

        working_days_from_bitmap(start, until, &body)
    }
}

fn day_url(base: &str, date: NaiveDate) -> String {
    format!("{base}/{}", date.format(COMPACT_DATE_FORMAT))
}

fn range_url(base: &str, start: NaiveDate, until: NaiveDate) -> String {
    format!(
        "{base}/api/getdata?date1={}&date2={}",
        start.format(COMPACT_DATE_FORMAT),
        until.format(COMPACT_DATE_FORMAT)
    )
}

fn parse_day_flag(body: &str) -> Option<bool> {
    match body.trim() {
        b if b.len() == 1 && b.starts_with(HOLIDAY) => Some(true),
        b if b.len() == 1 && b.starts_with(WORKING_DAY) => Some(false),
        _ => None,
    }
}

/// Decode the fixed-width range answer: character `i` classifies
/// `start + i` days. The weekday rule is applied before the authority's
/// bitmap, so a weekend can never be reported as working.
fn working_days_from_bitmap(
    start: NaiveDate,
    until: NaiveDate,
    body: &str,
) -> DutyResult<BTreeSet<NaiveDate>> {
    let bitmap = body.trim();
    let mut days = BTreeSet::new();

    let mut date = start;
    let mut flags = bitmap.chars();
    while date <= until {
        let flag = flags.next().ok_or_else(|| {
            DutyError::CalendarUnavailable(format!(
                "range answer too short: {} chars for {start}..{until}",
                bitmap.len()
            ))
        })?;
        if flag != HOLIDAY && flag != WORKING_DAY {
            return Err(DutyError::CalendarUnavailable(format!(
                "unexpected character {flag:?} in range answer"
            )));
        }

        if flag == WORKING_DAY && !is_weekend(date) {
            days.insert(date);
        }

        let Some(next) = date.succ_opt() else { break };
        date = next;
    }

    Ok(days)
}
