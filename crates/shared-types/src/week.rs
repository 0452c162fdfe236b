//! Calendar week helpers for recurring todos.
//!
//! Every week snapshot is keyed by the Monday of its ISO week. These helpers
//! normalize arbitrary dates and timestamps to that Monday and model the
//! seven per-day completion flags.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Weekday};
use serde::{Deserialize, Serialize};

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday();
    date - Days::new(u64::from(offset))
}

/// Monday of the week containing `ts`, using the local calendar date of the
/// timestamp's own zone. Time-of-day never affects the result.
pub fn week_start_of<Tz: TimeZone>(ts: &DateTime<Tz>) -> NaiveDate {
    week_start(ts.date_naive())
}

/// One day of the week, as accepted by the toggle endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayKey {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayKey {
    pub const ALL: [DayKey; 7] = [
        DayKey::Mon,
        DayKey::Tue,
        DayKey::Wed,
        DayKey::Thu,
        DayKey::Fri,
        DayKey::Sat,
        DayKey::Sun,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            DayKey::Mon => "mon",
            DayKey::Tue => "tue",
            DayKey::Wed => "wed",
            DayKey::Thu => "thu",
            DayKey::Fri => "fri",
            DayKey::Sat => "sat",
            DayKey::Sun => "sun",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "mon" => Some(DayKey::Mon),
            "tue" => Some(DayKey::Tue),
            "wed" => Some(DayKey::Wed),
            "thu" => Some(DayKey::Thu),
            "fri" => Some(DayKey::Fri),
            "sat" => Some(DayKey::Sat),
            "sun" => Some(DayKey::Sun),
            _ => None,
        }
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayKey::Mon,
            Weekday::Tue => DayKey::Tue,
            Weekday::Wed => DayKey::Wed,
            Weekday::Thu => DayKey::Thu,
            Weekday::Fri => DayKey::Fri,
            Weekday::Sat => DayKey::Sat,
            Weekday::Sun => DayKey::Sun,
        }
    }
}

/// Completion flags for the seven days of one week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekMap {
    pub mon: bool,
    pub tue: bool,
    pub wed: bool,
    pub thu: bool,
    pub fri: bool,
    pub sat: bool,
    pub sun: bool,
}

impl WeekMap {
    pub fn get(&self, day: DayKey) -> bool {
        match day {
            DayKey::Mon => self.mon,
            DayKey::Tue => self.tue,
            DayKey::Wed => self.wed,
            DayKey::Thu => self.thu,
            DayKey::Fri => self.fri,
            DayKey::Sat => self.sat,
            DayKey::Sun => self.sun,
        }
    }

    pub fn set(&mut self, day: DayKey, value: bool) {
        let flag = match day {
            DayKey::Mon => &mut self.mon,
            DayKey::Tue => &mut self.tue,
            DayKey::Wed => &mut self.wed,
            DayKey::Thu => &mut self.thu,
            DayKey::Fri => &mut self.fri,
            DayKey::Sat => &mut self.sat,
            DayKey::Sun => &mut self.sun,
        };
        *flag = value;
    }

    /// Copy of this map with exactly one flag flipped.
    pub fn toggled(mut self, day: DayKey) -> Self {
        self.set(day, !self.get(day));
        self
    }

    pub fn completed_days(&self) -> usize {
        DayKey::ALL.iter().filter(|day| self.get(**day)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveTime, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_start_is_always_monday() {
        let mut day = date(2026, 1, 1);
        for _ in 0..400 {
            let monday = week_start(day);
            assert_eq!(monday.weekday(), Weekday::Mon);
            assert!(monday <= day);
            assert!((day - monday).num_days() < 7);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_same_week_timestamps_normalize_together() {
        let wednesday = date(2026, 2, 4)
            .and_time(NaiveTime::from_hms_opt(10, 0, 0).unwrap())
            .and_utc();
        let sunday_night = date(2026, 2, 8)
            .and_time(NaiveTime::from_hms_opt(23, 59, 0).unwrap())
            .and_utc();
        let next_monday = date(2026, 2, 9)
            .and_time(NaiveTime::from_hms_opt(0, 1, 0).unwrap())
            .and_utc();

        assert_eq!(week_start_of(&wednesday), date(2026, 2, 2));
        assert_eq!(week_start_of(&sunday_night), date(2026, 2, 2));
        assert_eq!(week_start_of(&next_monday), date(2026, 2, 9));
    }

    #[test]
    fn test_week_start_uses_timestamp_zone() {
        // Sunday 23:30 in UTC-05:00 is already Monday in UTC.
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let local = tz.with_ymd_and_hms(2026, 2, 8, 23, 30, 0).unwrap();
        assert_eq!(week_start_of(&local), date(2026, 2, 2));
        assert_eq!(week_start_of(&local.with_timezone(&Utc)), date(2026, 2, 9));
    }

    #[test]
    fn test_week_start_across_year_boundary() {
        assert_eq!(week_start(date(2027, 1, 1)), date(2026, 12, 28));
    }

    #[test]
    fn test_day_key_parsing() {
        for day in DayKey::ALL {
            assert_eq!(DayKey::from_str(day.as_str()), Some(day));
        }
        assert_eq!(DayKey::from_str("monday"), None);
        assert_eq!(DayKey::from_str("MON"), None);

        let parsed: DayKey = serde_json::from_str("\"sat\"").unwrap();
        assert_eq!(parsed, DayKey::Sat);
        assert!(serde_json::from_str::<DayKey>("\"funday\"").is_err());
    }

    #[test]
    fn test_day_key_from_weekday() {
        assert_eq!(DayKey::from_weekday(date(2026, 2, 4).weekday()), DayKey::Wed);
        assert_eq!(DayKey::from_weekday(date(2026, 2, 8).weekday()), DayKey::Sun);
    }

    #[test]
    fn test_toggle_changes_one_flag() {
        let week = WeekMap::default().toggled(DayKey::Wed);
        assert!(week.wed);
        assert_eq!(week.completed_days(), 1);

        let back = week.toggled(DayKey::Wed);
        assert_eq!(back, WeekMap::default());
    }
}
