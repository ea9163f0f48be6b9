//! Fixed time zone table used by `convertFromUTC` and `convertToUTC`.
//!
//! Each zone is known by its Windows name and one or more IANA names. Daylight
//! saving follows the current US, EU or Australian rules; historical changes
//! are not modelled.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};
use lazy_static::lazy_static;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DstRule {
    None,
    /// Second Sunday in March to first Sunday in November, 02:00 local.
    UnitedStates,
    /// Last Sunday in March to last Sunday in October, 01:00 UTC.
    Europe,
    /// First Sunday in October to first Sunday in April, southern hemisphere.
    Australia,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeZoneInfo {
    pub windows_name: &'static str,
    pub iana_names: &'static [&'static str],
    pub standard_offset_minutes: i64,
    pub dst: DstRule,
}

lazy_static! {
    static ref ZONES: Vec<TimeZoneInfo> = vec![
        zone("UTC", &["Etc/UTC", "UTC", "Etc/GMT"], 0, DstRule::None),
        zone("GMT Standard Time", &["Europe/London", "Europe/Dublin", "Europe/Lisbon"], 0, DstRule::Europe),
        zone("Greenwich Standard Time", &["Atlantic/Reykjavik", "Africa/Abidjan"], 0, DstRule::None),
        zone("W. Europe Standard Time", &["Europe/Berlin", "Europe/Amsterdam", "Europe/Rome", "Europe/Vienna", "Europe/Zurich", "Europe/Stockholm"], 60, DstRule::Europe),
        zone("Romance Standard Time", &["Europe/Paris", "Europe/Madrid", "Europe/Brussels", "Europe/Copenhagen"], 60, DstRule::Europe),
        zone("Central Europe Standard Time", &["Europe/Budapest", "Europe/Prague", "Europe/Belgrade"], 60, DstRule::Europe),
        zone("Central European Standard Time", &["Europe/Warsaw", "Europe/Zagreb"], 60, DstRule::Europe),
        zone("GTB Standard Time", &["Europe/Athens", "Europe/Bucharest"], 120, DstRule::Europe),
        zone("FLE Standard Time", &["Europe/Helsinki", "Europe/Kiev", "Europe/Kyiv", "Europe/Riga"], 120, DstRule::Europe),
        zone("South Africa Standard Time", &["Africa/Johannesburg"], 120, DstRule::None),
        zone("Russian Standard Time", &["Europe/Moscow"], 180, DstRule::None),
        zone("Arabian Standard Time", &["Asia/Dubai"], 240, DstRule::None),
        zone("Pakistan Standard Time", &["Asia/Karachi"], 300, DstRule::None),
        zone("India Standard Time", &["Asia/Kolkata", "Asia/Calcutta"], 330, DstRule::None),
        zone("SE Asia Standard Time", &["Asia/Bangkok", "Asia/Jakarta"], 420, DstRule::None),
        zone("China Standard Time", &["Asia/Shanghai", "Asia/Hong_Kong"], 480, DstRule::None),
        zone("Singapore Standard Time", &["Asia/Singapore", "Asia/Kuala_Lumpur"], 480, DstRule::None),
        zone("Tokyo Standard Time", &["Asia/Tokyo"], 540, DstRule::None),
        zone("Korea Standard Time", &["Asia/Seoul"], 540, DstRule::None),
        zone("AUS Eastern Standard Time", &["Australia/Sydney", "Australia/Melbourne"], 600, DstRule::Australia),
        zone("E. Australia Standard Time", &["Australia/Brisbane"], 600, DstRule::None),
        zone("E. South America Standard Time", &["America/Sao_Paulo"], -180, DstRule::None),
        zone("Atlantic Standard Time", &["America/Halifax"], -240, DstRule::UnitedStates),
        zone("Eastern Standard Time", &["America/New_York", "America/Toronto", "America/Detroit"], -300, DstRule::UnitedStates),
        zone("Central Standard Time", &["America/Chicago", "America/Winnipeg"], -360, DstRule::UnitedStates),
        zone("Central America Standard Time", &["America/Guatemala", "America/Costa_Rica"], -360, DstRule::None),
        zone("Mountain Standard Time", &["America/Denver", "America/Edmonton"], -420, DstRule::UnitedStates),
        zone("US Mountain Standard Time", &["America/Phoenix"], -420, DstRule::None),
        zone("Pacific Standard Time", &["America/Los_Angeles", "America/Vancouver"], -480, DstRule::UnitedStates),
        zone("Alaskan Standard Time", &["America/Anchorage"], -540, DstRule::UnitedStates),
        zone("Hawaiian Standard Time", &["Pacific/Honolulu"], -600, DstRule::None),
    ];
}

fn zone(
    windows_name: &'static str,
    iana_names: &'static [&'static str],
    standard_offset_minutes: i64,
    dst: DstRule,
) -> TimeZoneInfo {
    TimeZoneInfo {
        windows_name,
        iana_names,
        standard_offset_minutes,
        dst,
    }
}

/// Finds a zone by Windows or IANA name, ignoring case.
pub fn find(name: &str) -> Option<&'static TimeZoneInfo> {
    ZONES.iter().find(|zone| {
        zone.windows_name.eq_ignore_ascii_case(name)
            || zone.iana_names.iter().any(|n| n.eq_ignore_ascii_case(name))
    })
}

/// `n`-th `weekday` of a month; `n = 5` means the last one.
fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    if n >= 5 {
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        let mut day = next_month.pred_opt()?;
        while day.weekday() != weekday {
            day = day.pred_opt()?;
        }
        return Some(day);
    }
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

fn at_hour(date: NaiveDate, hour: u32) -> Option<NaiveDateTime> {
    date.and_hms_opt(hour, 0, 0)
}

impl TimeZoneInfo {
    fn standard_offset(&self) -> Duration {
        Duration::minutes(self.standard_offset_minutes)
    }

    /// UTC instants at which daylight time starts and ends in `year`.
    fn transitions(&self, year: i32) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let standard = self.standard_offset();
        let daylight = standard + Duration::hours(1);
        match self.dst {
            DstRule::None => None,
            DstRule::UnitedStates => {
                let start = at_hour(nth_weekday(year, 3, Weekday::Sun, 2)?, 2)? - standard;
                let end = at_hour(nth_weekday(year, 11, Weekday::Sun, 1)?, 2)? - daylight;
                Some((start, end))
            }
            DstRule::Europe => {
                let start = at_hour(nth_weekday(year, 3, Weekday::Sun, 5)?, 1)?;
                let end = at_hour(nth_weekday(year, 10, Weekday::Sun, 5)?, 1)?;
                Some((start, end))
            }
            DstRule::Australia => {
                let start = at_hour(nth_weekday(year, 10, Weekday::Sun, 1)?, 2)? - standard;
                let end = at_hour(nth_weekday(year, 4, Weekday::Sun, 1)?, 3)? - daylight;
                Some((start, end))
            }
        }
    }

    pub fn is_daylight(&self, utc: &DateTime<Utc>) -> bool {
        let instant = utc.naive_utc();
        match self.transitions(instant.year()) {
            None => false,
            Some((start, end)) if start < end => instant >= start && instant < end,
            Some((start, end)) => instant >= start || instant < end,
        }
    }

    /// Offset from UTC in effect at a UTC instant.
    pub fn offset_at(&self, utc: &DateTime<Utc>) -> Duration {
        if self.is_daylight(utc) {
            self.standard_offset() + Duration::hours(1)
        } else {
            self.standard_offset()
        }
    }

    pub fn from_utc(&self, utc: &DateTime<Utc>) -> NaiveDateTime {
        utc.naive_utc() + self.offset_at(utc)
    }

    /// Interprets a wall-clock time in this zone. Ambiguous times resolve to
    /// standard time.
    pub fn to_utc(&self, local: &NaiveDateTime) -> DateTime<Utc> {
        let standard = Utc.from_utc_datetime(&(*local - self.standard_offset()));
        if !self.is_daylight(&standard) {
            return standard;
        }
        let daylight = standard - Duration::hours(1);
        if self.is_daylight(&daylight) {
            daylight
        } else {
            standard
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_find_by_either_name() {
        assert_eq!(
            find("america/los_angeles").map(|z| z.windows_name),
            Some("Pacific Standard Time")
        );
        assert!(find("Pacific Standard Time").is_some());
        assert!(find("Mars/Olympus").is_none());
    }

    #[test]
    fn test_us_daylight_rules() {
        let pacific = find("Pacific Standard Time").unwrap();
        assert_eq!(pacific.offset_at(&utc("2018-01-02T02:00:00Z")), Duration::hours(-8));
        assert_eq!(pacific.offset_at(&utc("2018-07-01T00:00:00Z")), Duration::hours(-7));
        // 2018-03-11 02:00 PST is 10:00 UTC
        assert!(!pacific.is_daylight(&utc("2018-03-11T09:59:00Z")));
        assert!(pacific.is_daylight(&utc("2018-03-11T10:00:00Z")));
    }

    #[test]
    fn test_europe_and_southern_rules() {
        let paris = find("Europe/Paris").unwrap();
        assert!(paris.is_daylight(&utc("2018-03-25T01:00:00Z")));
        assert!(!paris.is_daylight(&utc("2018-10-28T01:00:00Z")));
        let sydney = find("Australia/Sydney").unwrap();
        assert!(sydney.is_daylight(&utc("2018-01-15T00:00:00Z")));
        assert!(!sydney.is_daylight(&utc("2018-07-15T00:00:00Z")));
    }

    #[test]
    fn test_round_trip_local_time() {
        let eastern = find("Eastern Standard Time").unwrap();
        let instant = utc("2018-07-04T16:00:00Z");
        let local = eastern.from_utc(&instant);
        assert_eq!(local.to_string(), "2018-07-04 12:00:00");
        assert_eq!(eastern.to_utc(&local), instant);
    }
}
