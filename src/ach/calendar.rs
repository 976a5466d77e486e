//! Banking calendar
//!
//! Business days for the Federal Reserve: weekdays that are not a Fed holiday.
//! A holiday falling on Sunday is observed the following Monday; one falling on
//! Saturday is not observed at all.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    nth_weekday(year, month, weekday, 5).or_else(|| nth_weekday(year, month, weekday, 4))
}

/// Nominal Fed holiday dates for a year, before weekend observation
fn holidays(year: i32) -> Vec<NaiveDate> {
    [
        NaiveDate::from_ymd_opt(year, 1, 1),
        nth_weekday(year, 1, Weekday::Mon, 3),
        nth_weekday(year, 2, Weekday::Mon, 3),
        last_weekday(year, 5, Weekday::Mon),
        NaiveDate::from_ymd_opt(year, 6, 19),
        NaiveDate::from_ymd_opt(year, 7, 4),
        nth_weekday(year, 9, Weekday::Mon, 1),
        nth_weekday(year, 10, Weekday::Mon, 2),
        NaiveDate::from_ymd_opt(year, 11, 11),
        nth_weekday(year, 11, Weekday::Thu, 4),
        NaiveDate::from_ymd_opt(year, 12, 25),
    ]
    .into_iter()
    .flatten()
    .collect()
}

pub fn is_holiday(date: NaiveDate) -> bool {
    holidays(date.year()).into_iter().any(|holiday| {
        holiday == date || (holiday.weekday() == Weekday::Sun && holiday + Duration::days(1) == date)
    })
}

pub fn is_banking_day(date: NaiveDate) -> bool {
    !is_weekend(date) && !is_holiday(date)
}

/// First banking day strictly after `date`
pub fn next_banking_day(date: NaiveDate) -> NaiveDate {
    add_banking_days(date, 1)
}

/// Advance `days` banking days from `date`. Zero returns `date` unchanged.
pub fn add_banking_days(date: NaiveDate, days: u32) -> NaiveDate {
    let mut current = date;
    let mut remaining = days;
    while remaining > 0 {
        current += Duration::days(1);
        if is_banking_day(current) {
            remaining -= 1;
        }
    }
    current
}
