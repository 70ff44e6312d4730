use crate::models::{DhikrRecord, Recurrence, Reminder, Status, Weekday};
use crate::state::AppState;
use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Exact `HH:MM` match on a listed weekday or date. A tick that lands in
/// another minute does not fire.
pub fn is_due<Tz: TimeZone>(record: &DhikrRecord, now: &DateTime<Tz>) -> bool {
    if record.status != Status::Planned {
        return false;
    }
    let Some(schedule) = &record.schedule else {
        return false;
    };

    let clock = format!("{:02}:{:02}", now.hour(), now.minute());
    if schedule.time.as_str() != clock {
        return false;
    }

    match &schedule.recurrence {
        Recurrence::Weekdays(days) => days.contains(&Weekday::from(now.weekday())),
        Recurrence::Dates(dates) => {
            let today = now.date_naive();
            let tz = now.timezone();
            dates.iter().any(|date| date.with_timezone(&tz).date_naive() == today)
        }
    }
}

pub fn due_reminders<Tz: TimeZone>(records: &[DhikrRecord], now: &DateTime<Tz>) -> Vec<Reminder> {
    let fired_at = now.with_timezone(&Utc);
    records
        .iter()
        .filter(|record| is_due(record, now))
        .filter_map(|record| {
            let schedule = record.schedule.as_ref()?;
            Some(Reminder {
                dhikr_id: record.id.clone(),
                name: record.name.clone(),
                time: schedule.time.as_str().to_string(),
                fired_at,
            })
        })
        .collect()
}

/// One scheduler tick. Returns the reminders that were new to the feed.
pub async fn poll_once<Tz: TimeZone>(state: &AppState, now: DateTime<Tz>) -> Vec<Reminder> {
    let mut store = state.store.lock().await;
    let due = due_reminders(&store.data.dhikrs, &now);
    let mut fired = Vec::with_capacity(due.len());
    for reminder in due {
        if store.push_reminder(reminder.clone()) {
            info!("reminder: {} at {}", reminder.name, reminder.time);
            fired.push(reminder);
        }
    }
    fired
}

pub fn spawn_poller(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let fired = poll_once(&state, Local::now()).await;
            debug!("scheduler tick, {} reminder(s) fired", fired.len());
        }
    })
}
