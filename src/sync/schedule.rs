//! Kick-off date and time parsing.
//!
//! Soccer documents carry the schedule in up to three shapes and are tried in
//! order: `DD.MM.YYYY HH:MM`, a month name without a year (`Jan 2` + `15:04`),
//! and finally the date and time fields parsed separately.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use super::RecordError;

const NUMERIC_DATETIME: &str = "%d.%m.%Y %H:%M";
const NUMERIC_DATE: &str = "%d.%m.%Y";
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];
const MONTH_NAME_WITH_YEAR: [&str; 2] = ["%b %d %Y %H:%M", "%B %d %Y %H:%M"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl From<NaiveDateTime> for Schedule {
    fn from(value: NaiveDateTime) -> Self {
        Self {
            date: value.date(),
            time: value.time(),
        }
    }
}

/// Resolve a soccer kick-off. `formatted_date` wins over `date` when present;
/// `today` anchors year inference for month-name dates.
pub fn parse_soccer_schedule(
    formatted_date: &str,
    date: &str,
    time: &str,
    today: NaiveDate,
) -> Result<Schedule, RecordError> {
    let formatted_date = formatted_date.trim();
    let date = date.trim();
    let time = time.trim();
    let primary = if formatted_date.is_empty() {
        date
    } else {
        formatted_date
    };

    if let Ok(parsed) = NaiveDateTime::parse_from_str(&format!("{primary} {time}"), NUMERIC_DATETIME)
    {
        return Ok(parsed.into());
    }

    if let Some(parsed) = parse_month_name(primary, time, today) {
        return Ok(parsed.into());
    }

    for candidate in [formatted_date, date] {
        if let Some(schedule) = parse_separately(candidate, time) {
            return Ok(schedule);
        }
    }

    Err(RecordError::InvalidSchedule {
        date: primary.to_string(),
        time: time.to_string(),
    })
}

/// Basketball always sends `DD.MM.YYYY` and `HH:MM` in separate fields.
pub fn parse_basketball_schedule(date: &str, time: &str) -> Result<Schedule, RecordError> {
    parse_separately(date.trim(), time.trim()).ok_or_else(|| RecordError::InvalidSchedule {
        date: date.trim().to_string(),
        time: time.trim().to_string(),
    })
}

fn parse_separately(date: &str, time: &str) -> Option<Schedule> {
    if date.is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(date, NUMERIC_DATE).ok()?;
    let time = parse_time(time)?;
    Some(Schedule { date, time })
}

fn parse_time(time: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(time, format).ok())
}

/// `Jan 2` style dates. An explicit year is honored; otherwise the previous,
/// current and next year are tried and the one closest to `today` wins.
fn parse_month_name(date: &str, time: &str, today: NaiveDate) -> Option<NaiveDateTime> {
    if date.is_empty() || time.is_empty() {
        return None;
    }

    let with_year = |text: String| {
        MONTH_NAME_WITH_YEAR
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&text, format).ok())
    };

    if let Some(explicit) = with_year(format!("{date} {time}")) {
        return Some(explicit);
    }

    let year = today.year();
    [year - 1, year, year + 1]
        .into_iter()
        .filter_map(|candidate| with_year(format!("{date} {candidate} {time}")))
        .min_by_key(|parsed| (parsed.date() - today).num_days().abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn numeric_combined_format_is_preferred() {
        let schedule =
            parse_soccer_schedule("29.01.2026", "Jan 29", "20:00", ymd(2026, 1, 29)).unwrap();
        assert_eq!(schedule, Schedule { date: ymd(2026, 1, 29), time: hm(20, 0) });
    }

    #[test]
    fn separate_fields_without_formatted_date() {
        let schedule = parse_soccer_schedule("", "29.01.2026", "23:30", ymd(2026, 1, 20)).unwrap();
        assert_eq!(schedule.date, ymd(2026, 1, 29));
        assert_eq!(schedule.time, hm(23, 30));
    }

    #[test]
    fn month_name_uses_the_current_year_mid_season() {
        let schedule = parse_soccer_schedule("", "Mar 14", "15:04", ymd(2026, 3, 10)).unwrap();
        assert_eq!(schedule.date, ymd(2026, 3, 14));
        assert_eq!(schedule.time, hm(15, 4));
    }

    #[test]
    fn month_name_rolls_into_next_year_around_new_year() {
        let schedule = parse_soccer_schedule("", "Jan 2", "18:00", ymd(2026, 12, 30)).unwrap();
        assert_eq!(schedule.date, ymd(2027, 1, 2));

        let schedule = parse_soccer_schedule("", "Dec 31", "18:00", ymd(2027, 1, 1)).unwrap();
        assert_eq!(schedule.date, ymd(2026, 12, 31));
    }

    #[test]
    fn falls_back_to_raw_date_when_formatted_date_is_garbage() {
        let schedule =
            parse_soccer_schedule("??", "05.02.2026", "12:15", ymd(2026, 2, 1)).unwrap();
        assert_eq!(schedule.date, ymd(2026, 2, 5));
    }

    #[test]
    fn unparsable_date_is_rejected() {
        let err = parse_soccer_schedule("", "not-a-date", "23:30", ymd(2026, 1, 1)).unwrap_err();
        assert!(matches!(err, RecordError::InvalidSchedule { .. }));

        let err = parse_soccer_schedule("29.01.2026", "", "", ymd(2026, 1, 1)).unwrap_err();
        assert!(matches!(err, RecordError::InvalidSchedule { .. }));
    }

    #[test]
    fn basketball_requires_both_fields() {
        let schedule = parse_basketball_schedule("12.03.2026", "19:30").unwrap();
        assert_eq!(schedule, Schedule { date: ymd(2026, 3, 12), time: hm(19, 30) });

        assert!(parse_basketball_schedule("12.03.2026", "").is_err());
        assert!(parse_basketball_schedule("2026-03-12", "19:30").is_err());
    }
}
