use crate::errors::AppError;
use crate::models::{AppData, Reminder};
use crate::storage::persist_data;
use crate::tap::TapClassifier;
use std::collections::{HashMap, VecDeque};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

pub const REMINDER_FEED_LEN: usize = 50;

/// Everything behind the lock. Only `data` is persisted.
#[derive(Debug, Clone, Default)]
pub struct Store {
    pub data: AppData,
    pub taps: HashMap<String, TapClassifier>,
    pub reminders: VecDeque<Reminder>,
}

impl Store {
    pub fn new(data: AppData) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn end_session(&mut self, id: &str) {
        self.taps.remove(id);
    }

    /// Appends to the feed unless the same dhikr already fired this minute.
    pub fn push_reminder(&mut self, reminder: Reminder) -> bool {
        let minute = reminder.fired_at.timestamp().div_euclid(60);
        let duplicate = self.reminders.iter().any(|seen| {
            seen.dhikr_id == reminder.dhikr_id && seen.fired_at.timestamp().div_euclid(60) == minute
        });
        if duplicate {
            return false;
        }
        self.reminders.push_back(reminder);
        while self.reminders.len() > REMINDER_FEED_LEN {
            self.reminders.pop_front();
        }
        true
    }
}

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub public_origin: String,
    pub store: Arc<Mutex<Store>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, public_origin: impl Into<String>, data: AppData) -> Self {
        Self {
            data_path,
            public_origin: public_origin.into(),
            store: Arc::new(Mutex::new(Store::new(data))),
        }
    }

    pub async fn read<T>(&self, f: impl FnOnce(&Store) -> T) -> T {
        let store = self.store.lock().await;
        f(&store)
    }

    /// Runs `f` on a copy of the store, writes the copy to disk when the
    /// persisted part changed, then swaps it in. An error from `f` or from
    /// the write leaves the store as it was.
    pub async fn update<T>(
        &self,
        f: impl FnOnce(&mut Store) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut store = self.store.lock().await;
        let mut draft = store.clone();
        let output = f(&mut draft)?;
        if draft.data != store.data {
            persist_data(&self.data_path, &draft.data).await?;
        }
        *store = draft;
        Ok(output)
    }
}
