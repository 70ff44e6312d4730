use crate::models::{
    CompletedGroup, CreateDhikrRequest, DhikrRecord, ListQuery, ListResponse, RecordError,
    Recurrence, ReminderTime, Schedule, ScheduleRequest, Status,
};
use crate::library::find_preset;
use crate::streak::completion_days;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::collections::BTreeMap;

/// Millisecond timestamp, bumped past the newest existing id when needed.
pub fn next_id(records: &[DhikrRecord], now: DateTime<Utc>) -> String {
    let now_ms = now.timestamp_millis();
    let newest = records.iter().filter_map(|r| r.id.parse::<i64>().ok()).max();
    match newest {
        Some(newest) if newest >= now_ms => (newest + 1).to_string(),
        _ => now_ms.to_string(),
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn build_schedule(request: ScheduleRequest) -> Result<Schedule, RecordError> {
    let time = ReminderTime::parse(&request.time)?;
    let recurrence = if !request.dates.is_empty() {
        Recurrence::Dates(request.dates)
    } else if !request.days.is_empty() {
        let mut days = Vec::with_capacity(request.days.len());
        for day in request.days {
            if !days.contains(&day) {
                days.push(day);
            }
        }
        Recurrence::Weekdays(days)
    } else {
        return Err(RecordError::EmptySchedule);
    };

    Ok(Schedule {
        time,
        recurrence,
        kind: request.kind,
        repeat: request.repeat,
    })
}

fn fill_from_preset(input: &mut CreateDhikrRequest) {
    let Some(preset) = input.preset.as_deref().and_then(find_preset) else {
        return;
    };
    if input.name.trim().is_empty() {
        input.name = preset.name.to_string();
    }
    if input.target_count == 0 {
        input.target_count = preset.target_count;
    }
    input.category.get_or_insert_with(|| preset.category.to_string());
    input.arabic_text.get_or_insert_with(|| preset.arabic_text.to_string());
    input.transliteration.get_or_insert_with(|| preset.name.to_string());
    if let Some(translation) = preset.translation {
        input.translation.get_or_insert_with(|| translation.to_string());
    }
}

pub fn create(
    records: &mut Vec<DhikrRecord>,
    mut input: CreateDhikrRequest,
    now: DateTime<Utc>,
) -> Result<DhikrRecord, RecordError> {
    fill_from_preset(&mut input);
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(RecordError::EmptyName);
    }
    if input.target_count == 0 {
        return Err(RecordError::ZeroTarget);
    }
    let schedule = input.schedule.map(build_schedule).transpose()?;

    let record = DhikrRecord {
        id: next_id(records, now),
        name,
        target_count: input.target_count,
        current_count: 0,
        date_created: now,
        date_completed: None,
        status: Status::Planned,
        category: clean(input.category),
        schedule,
        arabic_text: clean(input.arabic_text),
        transliteration: clean(input.transliteration),
        translation: clean(input.translation),
    };
    records.push(record.clone());
    Ok(record)
}

pub fn find<'a>(records: &'a [DhikrRecord], id: &str) -> Result<&'a DhikrRecord, RecordError> {
    records
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| RecordError::NotFound(id.to_string()))
}

pub fn find_mut<'a>(
    records: &'a mut [DhikrRecord],
    id: &str,
) -> Result<&'a mut DhikrRecord, RecordError> {
    records
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| RecordError::NotFound(id.to_string()))
}

/// Fresh planned copy: same task, new id, nothing counted yet.
fn planned_copy(source: &DhikrRecord, id: String, now: DateTime<Utc>) -> DhikrRecord {
    DhikrRecord {
        id,
        name: source.name.clone(),
        target_count: source.target_count,
        current_count: 0,
        date_created: now,
        date_completed: None,
        status: Status::Planned,
        category: source.category.clone(),
        schedule: source.schedule.clone(),
        arabic_text: source.arabic_text.clone(),
        transliteration: source.transliteration.clone(),
        translation: source.translation.clone(),
    }
}

pub fn repeat(
    records: &mut Vec<DhikrRecord>,
    id: &str,
    now: DateTime<Utc>,
) -> Result<DhikrRecord, RecordError> {
    let source = find(records, id)?.clone();
    let copy = planned_copy(&source, next_id(records, now), now);
    records.push(copy.clone());
    Ok(copy)
}

/// Appends planned copies of records received through a share link.
pub fn add_shared(
    records: &mut Vec<DhikrRecord>,
    shared: &[DhikrRecord],
    now: DateTime<Utc>,
) -> Vec<DhikrRecord> {
    let mut added = Vec::with_capacity(shared.len());
    for source in shared {
        let copy = planned_copy(source, next_id(records, now), now);
        records.push(copy.clone());
        added.push(copy);
    }
    added
}

pub fn start(records: &mut [DhikrRecord], id: &str) -> Result<DhikrRecord, RecordError> {
    let record = find_mut(records, id)?;
    if record.status == Status::Planned {
        record.status = Status::InProgress;
    }
    Ok(record.clone())
}

/// The one place where count, status and completion date change together.
/// Returns true when this call completed the record.
pub fn set_count(record: &mut DhikrRecord, count: u32, now: DateTime<Utc>) -> bool {
    let was_completed = record.is_completed();
    record.current_count = count.min(record.target_count);
    if record.current_count == record.target_count {
        record.status = Status::Completed;
        if !was_completed || record.date_completed.is_none() {
            record.date_completed = Some(now);
        }
        !was_completed
    } else {
        record.status = Status::InProgress;
        record.date_completed = None;
        false
    }
}

pub fn reset(record: &mut DhikrRecord, now: DateTime<Utc>) {
    set_count(record, 0, now);
}

pub fn delete(records: &mut Vec<DhikrRecord>, id: &str) -> Result<DhikrRecord, RecordError> {
    let index = records
        .iter()
        .position(|r| r.id == id)
        .ok_or_else(|| RecordError::NotFound(id.to_string()))?;
    Ok(records.remove(index))
}

pub fn set_schedule(
    records: &mut [DhikrRecord],
    id: &str,
    request: ScheduleRequest,
) -> Result<DhikrRecord, RecordError> {
    let schedule = build_schedule(request)?;
    let record = find_mut(records, id)?;
    record.schedule = Some(schedule);
    Ok(record.clone())
}

pub fn clear_schedule(records: &mut [DhikrRecord], id: &str) -> Result<DhikrRecord, RecordError> {
    let record = find_mut(records, id)?;
    record.schedule = None;
    Ok(record.clone())
}

/// Distinct non-empty categories in first-seen order.
pub fn categories(records: &[DhikrRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for category in records.iter().filter_map(|r| r.category.as_deref()) {
        if !category.is_empty() && !seen.iter().any(|c| c == category) {
            seen.push(category.to_string());
        }
    }
    seen
}

fn matches(record: &DhikrRecord, search: Option<&str>, category: Option<&str>) -> bool {
    let name_ok = match search {
        Some(term) if !term.is_empty() => record.name.to_lowercase().contains(&term.to_lowercase()),
        _ => true,
    };
    let category_ok = match category {
        Some(wanted) if !wanted.is_empty() => record.category.as_deref() == Some(wanted),
        _ => true,
    };
    name_ok && category_ok
}

pub fn list<Tz: TimeZone>(
    records: &[DhikrRecord],
    query: &ListQuery,
    today: NaiveDate,
    tz: &Tz,
) -> ListResponse {
    let search = query.search.as_deref().map(str::trim);
    let category = query.category.as_deref().map(str::trim);

    let active = records
        .iter()
        .filter(|r| r.status.is_active() && matches(r, search, category))
        .cloned()
        .collect();

    let mut groups: BTreeMap<NaiveDate, Vec<DhikrRecord>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.is_completed()) {
        let Some(completed) = record.date_completed else {
            continue;
        };
        let day = completed.with_timezone(tz).date_naive();
        if query.date.is_some_and(|wanted| wanted != day) {
            continue;
        }
        if !matches(record, search, category) {
            continue;
        }
        groups.entry(day).or_default().push(record.clone());
    }

    let yesterday = today - Duration::days(1);
    let completed = groups
        .into_iter()
        .rev()
        .map(|(date, dhikrs)| CompletedGroup {
            date,
            relative: if date == today {
                Some("today")
            } else if date == yesterday {
                Some("yesterday")
            } else {
                None
            },
            dhikrs,
        })
        .collect();

    ListResponse {
        active,
        completed,
        categories: categories(records),
        completion_dates: completion_days(records, tz).into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Weekday;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 18, 9, 30, 0).unwrap()
    }

    fn input(name: &str, target: u32, category: Option<&str>) -> CreateDhikrRequest {
        CreateDhikrRequest {
            name: name.to_string(),
            target_count: target,
            category: category.map(str::to_string),
            ..Default::default()
        }
    }

    fn seeded() -> Vec<DhikrRecord> {
        let mut records = Vec::new();
        create(&mut records, input("Subhanallah", 33, Some("Tesbih")), now()).unwrap();
        create(&mut records, input("Estagfirullah", 100, Some("Istigfar")), now()).unwrap();
        create(&mut records, input("Elhamdulillah", 33, Some("Tesbih")), now()).unwrap();
        records
    }

    #[test]
    fn create_validates_and_starts_planned() {
        let mut records = Vec::new();
        assert_eq!(
            create(&mut records, input("   ", 33, None), now()),
            Err(RecordError::EmptyName)
        );
        assert_eq!(
            create(&mut records, input("Subhanallah", 0, None), now()),
            Err(RecordError::ZeroTarget)
        );
        assert!(records.is_empty());

        let record = create(&mut records, input("  Subhanallah ", 33, Some(" ")), now()).unwrap();
        assert_eq!(record.name, "Subhanallah");
        assert_eq!(record.status, Status::Planned);
        assert_eq!(record.current_count, 0);
        assert!(record.category.is_none());
        assert_eq!(record.id, now().timestamp_millis().to_string());
    }

    #[test]
    fn preset_fills_missing_fields() {
        let mut records = Vec::new();
        let request = CreateDhikrRequest {
            preset: Some("Estağfirullah".to_string()),
            target_count: 500,
            ..Default::default()
        };
        let record = create(&mut records, request, now()).unwrap();
        assert_eq!(record.name, "Estağfirullah");
        assert_eq!(record.target_count, 500);
        assert_eq!(record.category.as_deref(), Some("İstiğfar"));
        assert_eq!(record.arabic_text.as_deref(), Some("أَسْتَغْفِرُ اللّهَ"));
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let records = seeded();
        let mut ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn reaching_target_completes_and_reset_reverts() {
        let mut records = seeded();
        let record = &mut records[0];

        assert!(!set_count(record, 10, now()));
        assert_eq!(record.status, Status::InProgress);

        assert!(set_count(record, 40, now()));
        assert_eq!(record.current_count, 33);
        assert_eq!(record.status, Status::Completed);
        assert_eq!(record.date_completed, Some(now()));

        let later = now() + Duration::hours(1);
        assert!(!set_count(record, 33, later));
        assert_eq!(record.date_completed, Some(now()));

        reset(record, later);
        assert_eq!(record.current_count, 0);
        assert_eq!(record.status, Status::InProgress);
        assert!(record.date_completed.is_none());
    }

    #[test]
    fn start_moves_planned_to_in_progress_only() {
        let mut records = seeded();
        let id = records[0].id.clone();
        assert_eq!(start(&mut records, &id).unwrap().status, Status::InProgress);

        set_count(&mut records[1], 100, now());
        let done = records[1].id.clone();
        assert_eq!(start(&mut records, &done).unwrap().status, Status::Completed);

        assert_eq!(
            start(&mut records, "missing"),
            Err(RecordError::NotFound("missing".to_string()))
        );
    }

    #[test]
    fn repeat_clones_task_but_not_progress() {
        let mut records = seeded();
        let id = records[0].id.clone();
        set_schedule(
            &mut records,
            &id,
            ScheduleRequest {
                time: "08:00".to_string(),
                days: vec![Weekday::Monday, Weekday::Monday, Weekday::Friday],
                ..Default::default()
            },
        )
        .unwrap();
        set_count(&mut records[0], 33, now());

        let copy = repeat(&mut records, &id, now()).unwrap();
        assert_ne!(copy.id, id);
        assert_eq!(copy.name, "Subhanallah");
        assert_eq!(copy.status, Status::Planned);
        assert_eq!(copy.current_count, 0);
        assert!(copy.date_completed.is_none());
        let schedule = copy.schedule.expect("schedule copied");
        assert_eq!(
            schedule.recurrence,
            Recurrence::Weekdays(vec![Weekday::Monday, Weekday::Friday])
        );
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn schedule_needs_days_or_dates_and_valid_time() {
        let mut records = seeded();
        let id = records[0].id.clone();
        let no_days = ScheduleRequest {
            time: "08:00".to_string(),
            ..Default::default()
        };
        assert_eq!(
            set_schedule(&mut records, &id, no_days),
            Err(RecordError::EmptySchedule)
        );

        let bad_time = ScheduleRequest {
            time: "8am".to_string(),
            days: vec![Weekday::Monday],
            ..Default::default()
        };
        assert!(matches!(
            set_schedule(&mut records, &id, bad_time),
            Err(RecordError::InvalidTime(_))
        ));

        assert!(records[0].schedule.is_none());
        assert!(clear_schedule(&mut records, &id).unwrap().schedule.is_none());
    }

    #[test]
    fn delete_removes_by_id() {
        let mut records = seeded();
        let id = records[1].id.clone();
        assert_eq!(delete(&mut records, &id).unwrap().name, "Estagfirullah");
        assert_eq!(records.len(), 2);
        assert!(delete(&mut records, &id).is_err());
    }

    #[test]
    fn shared_records_arrive_as_planned_copies() {
        let mut records = seeded();
        let mut incoming = seeded();
        set_count(&mut incoming[0], 33, now());

        let added = add_shared(&mut records, &incoming, now());
        assert_eq!(added.len(), 3);
        assert_eq!(records.len(), 6);
        assert!(added.iter().all(|r| r.status == Status::Planned && r.current_count == 0));
        let mut ids: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn list_splits_active_and_groups_completed() {
        let mut records = seeded();
        let today = now().date_naive();
        set_count(&mut records[0], 33, now());
        set_count(&mut records[2], 33, now() - Duration::days(1));

        let all = list(&records, &ListQuery::default(), today, &Utc);
        assert_eq!(all.active.len(), 1);
        assert_eq!(all.completed.len(), 2);
        assert_eq!(all.completed[0].date, today);
        assert_eq!(all.completed[0].relative, Some("today"));
        assert_eq!(all.completed[1].relative, Some("yesterday"));
        assert_eq!(all.categories, vec!["Tesbih", "Istigfar"]);
        assert_eq!(all.completion_dates.len(), 2);

        let query = ListQuery {
            search: Some("ELHAM".to_string()),
            ..Default::default()
        };
        let searched = list(&records, &query, today, &Utc);
        assert!(searched.active.is_empty());
        assert_eq!(searched.completed.len(), 1);
        assert_eq!(searched.completed[0].dhikrs[0].name, "Elhamdulillah");

        let query = ListQuery {
            date: Some(today),
            category: Some("Tesbih".to_string()),
            ..Default::default()
        };
        let by_day = list(&records, &query, today, &Utc);
        assert_eq!(by_day.completed.len(), 1);
        assert_eq!(by_day.completed[0].dhikrs[0].name, "Subhanallah");
    }
}
