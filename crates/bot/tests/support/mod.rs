#![allow(dead_code)] // not every test binary uses every helper

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use dutybot_core::errors::{DutyError, DutyResult};
use dutybot_core::models::Assignment;
use dutybot_db::AssignmentStore;
use uuid::Uuid;

/// In-memory `AssignmentStore` with the same contract as the Postgres
/// implementation: one row per `(chat_id, date)`, range queries ordered
/// descending, deletes by id.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<(i64, NaiveDate), Assignment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(i64, NaiveDate), Assignment>> {
        self.rows.lock().expect("memory store lock poisoned")
    }

    pub fn insert(&self, assignment: Assignment) {
        self.lock()
            .insert((assignment.chat_id, assignment.date), assignment);
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn add_assignment(&self, assignment: &Assignment) -> DutyResult<()> {
        let mut rows = self.lock();
        let key = (assignment.chat_id, assignment.date);
        if rows.contains_key(&key) {
            return Err(DutyError::AlreadyTaken {
                date: assignment.date,
                operator: String::new(),
            });
        }
        rows.insert(key, assignment.clone());
        Ok(())
    }

    async fn delete_assignment(&self, id: Uuid) -> DutyResult<()> {
        let mut rows = self.lock();
        let key = rows
            .iter()
            .find(|(_, a)| a.id == id)
            .map(|(key, _)| *key);
        match key {
            Some(key) => {
                rows.remove(&key);
                Ok(())
            }
            None => Err(DutyError::NotFound(format!("assignment {id}"))),
        }
    }

    async fn assignment_by_date(
        &self,
        chat_id: i64,
        date: NaiveDate,
    ) -> DutyResult<Option<Assignment>> {
        Ok(self.lock().get(&(chat_id, date)).cloned())
    }

    async fn assignment_schedule(
        &self,
        chat_id: i64,
        from: NaiveDate,
        until: NaiveDate,
    ) -> DutyResult<Vec<Assignment>> {
        let mut found: Vec<Assignment> = self
            .lock()
            .values()
            .filter(|a| a.chat_id == chat_id && a.date >= from && a.date <= until)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(found)
    }

    async fn assignment_schedule_all_chats(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> DutyResult<Vec<Assignment>> {
        let mut found: Vec<Assignment> = self
            .lock()
            .values()
            .filter(|a| a.date >= from && a.date <= until)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(found)
    }

    async fn assigned_dates(
        &self,
        chat_id: i64,
        from: NaiveDate,
        until: NaiveDate,
    ) -> DutyResult<Vec<NaiveDate>> {
        Ok(self
            .lock()
            .values()
            .filter(|a| a.chat_id == chat_id && a.date >= from && a.date <= until)
            .map(|a| a.date)
            .collect())
    }

    async fn all_chats(&self) -> DutyResult<Vec<i64>> {
        let mut chats: Vec<i64> = self.lock().values().map(|a| a.chat_id).collect();
        chats.sort_unstable();
        chats.dedup();
        Ok(chats)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
