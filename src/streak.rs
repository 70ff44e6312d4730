use crate::models::DhikrRecord;
use chrono::{Duration, Local, NaiveDate, TimeZone};
use std::collections::BTreeSet;

/// Local calendar days on which at least one dhikr was completed.
pub fn completion_days<Tz: TimeZone>(records: &[DhikrRecord], tz: &Tz) -> BTreeSet<NaiveDate> {
    records
        .iter()
        .filter(|record| record.is_completed())
        .filter_map(|record| record.date_completed)
        .map(|completed| completed.with_timezone(tz).date_naive())
        .collect()
}

pub fn current_streak(records: &[DhikrRecord]) -> u32 {
    current_streak_at(records, Local::now().date_naive(), &Local)
}

pub fn current_streak_at<Tz: TimeZone>(records: &[DhikrRecord], today: NaiveDate, tz: &Tz) -> u32 {
    streak_from_days(&completion_days(records, tz), today)
}

/// Consecutive days ending today, or yesterday when nothing is done yet today.
pub fn streak_from_days(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let yesterday = today - Duration::days(1);
    let mut cursor = if days.contains(&today) {
        today
    } else if days.contains(&yesterday) {
        yesterday
    } else {
        return 0;
    };

    let mut streak = 1;
    for day in days.range(..cursor).rev() {
        if *day == cursor - Duration::days(1) {
            streak += 1;
            cursor = *day;
        } else {
            break;
        }
    }
    streak
}
