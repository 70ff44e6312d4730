use crate::models::{
    CategoryPoint, DhikrRecord, FrequentDhikr, StatsResponse, TodayCompletion, WeekdayPoint,
};
use crate::streak::current_streak_at;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Timelike};

pub const UNCATEGORIZED: &str = "Other";

pub fn build_stats(records: &[DhikrRecord]) -> StatsResponse {
    build_stats_at(records, Local::now().date_naive(), &Local)
}

pub fn build_stats_at<Tz: TimeZone>(
    records: &[DhikrRecord],
    today: NaiveDate,
    tz: &Tz,
) -> StatsResponse {
    let completed: Vec<(&DhikrRecord, DateTime<Tz>)> = records
        .iter()
        .filter(|record| record.is_completed())
        .filter_map(|record| Some((record, record.date_completed?.with_timezone(tz))))
        .collect();

    let total_count = completed
        .iter()
        .map(|(record, _)| u64::from(record.target_count))
        .sum();

    let today_list = completed
        .iter()
        .filter(|(_, at)| at.date_naive() == today)
        .map(|(record, at)| TodayCompletion {
            id: record.id.clone(),
            name: record.name.clone(),
            target_count: record.target_count,
            time: format!("{:02}:{:02}", at.hour(), at.minute()),
        })
        .collect();

    let names = tally(completed.iter().map(|(record, _)| record.name.as_str()));
    let most_frequent = names
        .iter()
        .fold(None::<&(String, u32)>, |best, entry| match best {
            Some(best) if best.1 >= entry.1 => Some(best),
            _ => Some(entry),
        })
        .map(|(name, count)| FrequentDhikr {
            name: name.clone(),
            count: *count,
        });

    let start = week_start(today);
    let this_week = (0..7)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let count = completed
                .iter()
                .filter(|(_, at)| at.date_naive() == date)
                .count() as u32;
            WeekdayPoint {
                day: date.weekday().into(),
                date: date.format("%Y-%m-%d").to_string(),
                count,
            }
        })
        .collect();

    let mut categories: Vec<CategoryPoint> = tally(completed.iter().map(|(record, _)| {
        record
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED)
    }))
    .into_iter()
    .map(|(name, count)| CategoryPoint { name, count })
    .collect();
    // Stable: ties keep first-seen order.
    categories.sort_by(|a, b| b.count.cmp(&a.count));

    StatsResponse {
        total_completed: completed.len() as u32,
        total_count,
        streak: current_streak_at(records, today, tz),
        today: today_list,
        most_frequent,
        this_week,
        categories,
    }
}

/// Occurrence counts in first-seen order.
fn tally<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, u32)> {
    let mut counts: Vec<(String, u32)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(seen, _)| seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value.to_string(), 1)),
        }
    }
    counts
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Status, Weekday};
    use chrono::Utc;

    fn at(date: NaiveDate, hour: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
    }

    // Wednesday.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 18).unwrap()
    }

    fn record(id: &str, name: &str, category: Option<&str>, done: Option<DateTime<Utc>>) -> DhikrRecord {
        DhikrRecord {
            id: id.to_string(),
            name: name.to_string(),
            target_count: 33,
            current_count: if done.is_some() { 33 } else { 5 },
            date_created: at(today() - Duration::days(10), 8),
            date_completed: done,
            status: if done.is_some() { Status::Completed } else { Status::InProgress },
            category: category.map(str::to_string),
            schedule: None,
            arabic_text: None,
            transliteration: None,
            translation: None,
        }
    }

    fn sample() -> Vec<DhikrRecord> {
        vec![
            record("1", "Subhanallah", Some("Tesbih"), Some(at(today(), 7))),
            record("2", "Subhanallah", Some("Tesbih"), Some(at(today() - Duration::days(1), 9))),
            record("3", "Estagfirullah", None, Some(at(today() - Duration::days(2), 9))),
            record("4", "Elhamdulillah", Some("Tesbih"), None),
            record("5", "Estagfirullah", Some("Istigfar"), Some(at(today() - Duration::days(9), 9))),
        ]
    }

    #[test]
    fn totals_only_count_completed_records() {
        let stats = build_stats_at(&sample(), today(), &Utc);
        assert_eq!(stats.total_completed, 4);
        assert_eq!(stats.total_count, 4 * 33);
        assert_eq!(stats.streak, 3);
        assert_eq!(stats.today.len(), 1);
        assert_eq!(stats.today[0].time, "07:00");
    }

    #[test]
    fn most_frequent_prefers_first_seen_on_ties() {
        let stats = build_stats_at(&sample(), today(), &Utc);
        let top = stats.most_frequent.expect("most frequent");
        assert_eq!(top.name, "Subhanallah");
        assert_eq!(top.count, 2);

        let empty = build_stats_at(&[], today(), &Utc);
        assert!(empty.most_frequent.is_none());
        assert_eq!(empty.this_week.len(), 7);
    }

    #[test]
    fn week_runs_monday_to_sunday() {
        let stats = build_stats_at(&sample(), today(), &Utc);
        let days: Vec<Weekday> = stats.this_week.iter().map(|p| p.day).collect();
        assert_eq!(days.first(), Some(&Weekday::Monday));
        assert_eq!(days.last(), Some(&Weekday::Sunday));
        assert_eq!(stats.this_week[0].date, "2026-03-16");
        let counts: Vec<u32> = stats.this_week.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn categories_sorted_with_other_for_unlabelled() {
        let stats = build_stats_at(&sample(), today(), &Utc);
        let names: Vec<(&str, u32)> = stats
            .categories
            .iter()
            .map(|c| (c.name.as_str(), c.count))
            .collect();
        assert_eq!(names, vec![("Tesbih", 2), ("Other", 1), ("Istigfar", 1)]);
    }
}
