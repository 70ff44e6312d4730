use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Planned,
    InProgress,
    Completed,
}

impl Status {
    /// Planned and in-progress records both belong to the "to do" list.
    pub fn is_active(self) -> bool {
        matches!(self, Status::Planned | Status::InProgress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl FromStr for Weekday {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monday" => Ok(Weekday::Monday),
            "tuesday" => Ok(Weekday::Tuesday),
            "wednesday" => Ok(Weekday::Wednesday),
            "thursday" => Ok(Weekday::Thursday),
            "friday" => Ok(Weekday::Friday),
            "saturday" => Ok(Weekday::Saturday),
            "sunday" => Ok(Weekday::Sunday),
            other => Err(RecordError::UnknownWeekday(other.to_string())),
        }
    }
}

/// Time of day in 24-hour `HH:MM` form, compared as text by the poller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReminderTime(String);

impl ReminderTime {
    pub fn parse(value: &str) -> Result<Self, RecordError> {
        let value = value.trim();
        let well_formed = value.len() == 5
            && value.as_bytes()[2] == b':'
            && NaiveTime::parse_from_str(value, "%H:%M").is_ok();
        if well_formed {
            Ok(Self(value.to_string()))
        } else {
            Err(RecordError::InvalidTime(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleKind {
    Daily,
    Weekly,
    Monthly,
    Custom,
    OneTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatInterval {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

fn default_repeat_every() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatSettings {
    #[serde(default = "default_repeat_every")]
    pub repeat_every: u32,
    #[serde(default)]
    pub repeat_interval: RepeatInterval,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recurrence {
    Weekdays(Vec<Weekday>),
    Dates(Vec<DateTime<Utc>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub time: ReminderTime,
    pub recurrence: Recurrence,
    pub kind: Option<ScheduleKind>,
    pub repeat: Option<RepeatSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("dhikr name must not be empty")]
    EmptyName,
    #[error("target count must be greater than zero")]
    ZeroTarget,
    #[error("time '{0}' is not in HH:MM format")]
    InvalidTime(String),
    #[error("unknown weekday '{0}'")]
    UnknownWeekday(String),
    #[error("a schedule needs at least one day or date")]
    EmptySchedule,
    #[error("dhikr '{0}' not found")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordWire", into = "RecordWire")]
pub struct DhikrRecord {
    pub id: String,
    pub name: String,
    pub target_count: u32,
    pub current_count: u32,
    pub date_created: DateTime<Utc>,
    pub date_completed: Option<DateTime<Utc>>,
    pub status: Status,
    pub category: Option<String>,
    pub schedule: Option<Schedule>,
    pub arabic_text: Option<String>,
    pub transliteration: Option<String>,
    pub translation: Option<String>,
}

impl DhikrRecord {
    /// Keeps the count inside `[0, target]` and status/completion date in
    /// step with it. A completed record without a completion time gets its
    /// creation time.
    pub(crate) fn reconcile(&mut self) {
        if self.current_count >= self.target_count {
            self.current_count = self.target_count;
            self.status = Status::Completed;
            self.date_completed.get_or_insert(self.date_created);
        } else {
            if self.status == Status::Completed {
                self.status = Status::InProgress;
            }
            self.date_completed = None;
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }
}

/// Flat storage shape shared with exported files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordWire {
    id: String,
    name: String,
    target_count: u32,
    #[serde(default)]
    current_count: u32,
    date_created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_completed: Option<DateTime<Utc>>,
    #[serde(default)]
    status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scheduled_days: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scheduled_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scheduled_dates: Option<Vec<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schedule_type: Option<ScheduleKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schedule_settings: Option<RepeatSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arabic_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transliteration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    translation: Option<String>,
}

impl RecordWire {
    fn schedule(&self) -> Option<Schedule> {
        let time = match self.scheduled_time.as_deref().map(ReminderTime::parse) {
            Some(Ok(time)) => time,
            Some(Err(err)) => {
                tracing::warn!("dropping schedule of dhikr {}: {err}", self.id);
                return None;
            }
            None => return None,
        };

        let recurrence = match (&self.scheduled_dates, &self.scheduled_days) {
            (Some(dates), _) if !dates.is_empty() => Recurrence::Dates(dates.clone()),
            (_, Some(days)) => {
                let known: Vec<Weekday> =
                    days.iter().filter_map(|d| d.parse::<Weekday>().ok()).collect();
                if known.is_empty() {
                    tracing::warn!("dropping schedule of dhikr {}: no known weekday", self.id);
                    return None;
                }
                Recurrence::Weekdays(known)
            }
            _ => return None,
        };

        Some(Schedule {
            time,
            recurrence,
            kind: self.schedule_type,
            repeat: self.schedule_settings.clone(),
        })
    }
}

impl TryFrom<RecordWire> for DhikrRecord {
    type Error = RecordError;

    fn try_from(wire: RecordWire) -> Result<Self, Self::Error> {
        if wire.name.trim().is_empty() {
            return Err(RecordError::EmptyName);
        }
        if wire.target_count == 0 {
            return Err(RecordError::ZeroTarget);
        }
        let schedule = wire.schedule();
        let mut record = DhikrRecord {
            id: wire.id,
            name: wire.name,
            target_count: wire.target_count,
            current_count: wire.current_count,
            date_created: wire.date_created,
            date_completed: wire.date_completed,
            status: wire.status,
            category: wire.category,
            schedule,
            arabic_text: wire.arabic_text,
            transliteration: wire.transliteration,
            translation: wire.translation,
        };
        record.reconcile();
        Ok(record)
    }
}

impl From<DhikrRecord> for RecordWire {
    fn from(record: DhikrRecord) -> Self {
        let (scheduled_days, scheduled_time, scheduled_dates, schedule_type, schedule_settings) =
            match record.schedule {
                None => (None, None, None, None, None),
                Some(schedule) => {
                    let (days, dates) = match schedule.recurrence {
                        Recurrence::Weekdays(days) => (
                            Some(days.iter().map(|d| d.as_str().to_string()).collect()),
                            None,
                        ),
                        Recurrence::Dates(dates) => (None, Some(dates)),
                    };
                    (
                        days,
                        Some(schedule.time.as_str().to_string()),
                        dates,
                        schedule.kind,
                        schedule.repeat,
                    )
                }
            };

        RecordWire {
            id: record.id,
            name: record.name,
            target_count: record.target_count,
            current_count: record.current_count,
            date_created: record.date_created,
            date_completed: record.date_completed,
            status: record.status,
            category: record.category,
            scheduled_days,
            scheduled_time,
            scheduled_dates,
            schedule_type,
            schedule_settings,
            arabic_text: record.arabic_text,
            transliteration: record.transliteration,
            translation: record.translation,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    fn into_bool(self) -> bool {
        match self {
            Flag::Bool(value) => value,
            Flag::Text(text) => text.trim() == "true",
        }
    }
}

/// Accepts `true` as well as the string `"true"`.
pub(crate) fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Flag::deserialize(deserializer).map(Flag::into_bool)
}

pub(crate) fn lenient_opt_bool<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<bool>, D::Error> {
    Ok(Option::<Flag>::deserialize(deserializer)?.map(Flag::into_bool))
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_true", deserialize_with = "lenient_bool")]
    pub sound: bool,
    #[serde(default = "default_true", deserialize_with = "lenient_bool")]
    pub vibration: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub has_seen_intro: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound: true,
            vibration: true,
            theme: None,
            has_seen_intro: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub dhikrs: Vec<DhikrRecord>,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDhikrRequest {
    /// Name of a library preset supplying any fields left empty.
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub target_count: u32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub arabic_text: Option<String>,
    #[serde(default)]
    pub transliteration: Option<String>,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub schedule: Option<ScheduleRequest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub time: String,
    #[serde(default)]
    pub days: Vec<Weekday>,
    #[serde(default)]
    pub dates: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub kind: Option<ScheduleKind>,
    #[serde(default)]
    pub repeat: Option<RepeatSettings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TapRequest {
    /// Client-side tap timestamp in milliseconds.
    #[serde(default)]
    pub at_ms: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CountRequest {
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareKind {
    #[default]
    Single,
    List,
}

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub ids: Vec<String>,
    #[serde(default, rename = "type")]
    pub kind: ShareKind,
}

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TapResponse {
    pub added: u32,
    pub completed: bool,
    pub dhikr: DhikrRecord,
}

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ImportLinkResponse {
    pub imported: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedGroup {
    pub date: NaiveDate,
    /// "today" or "yesterday" when applicable.
    pub relative: Option<&'static str>,
    pub dhikrs: Vec<DhikrRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub active: Vec<DhikrRecord>,
    pub completed: Vec<CompletedGroup>,
    pub categories: Vec<String>,
    pub completion_dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub dhikr_id: String,
    pub name: String,
    pub time: String,
    pub fired_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayCompletion {
    pub id: String,
    pub name: String,
    pub target_count: u32,
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct FrequentDhikr {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Serialize)]
pub struct WeekdayPoint {
    pub day: Weekday,
    pub date: String,
    pub count: u32,
}

#[derive(Debug, Serialize)]
pub struct CategoryPoint {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_completed: u32,
    pub total_count: u64,
    pub streak: u32,
    pub today: Vec<TodayCompletion>,
    pub most_frequent: Option<FrequentDhikr>,
    pub this_week: Vec<WeekdayPoint>,
    pub categories: Vec<CategoryPoint>,
}
