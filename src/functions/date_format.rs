//! Rendering of timestamps with pattern strings such as `yyyy-MM-dd HH:mm`.
//!
//! A one-character format such as `D` or `t` names a standard pattern of the
//! culture. Anything longer is a custom pattern made of the usual specifiers
//! (`yyyy`, `MMMM`, `dd`, `HH`, `hh`, `mm`, `ss`, `fff`, `tt`, `zzz`, `K`),
//! quoted literals and `\` escapes.

use chrono::{Datelike, NaiveDateTime, Timelike};
use lazy_static::lazy_static;
use regex::Regex;

use super::locale::Locale;

lazy_static! {
    static ref SPECIFIER: Regex = Regex::new(
        r#"(?s)'[^']*'?|"[^"]*"?|\\.|%.|y+|M+|d+|H+|h+|m+|s+|f+|F+|t+|z+|K|g+|."#
    )
    .expect("valid regex");
}

/// A point in time as seen in some zone, with its offset from UTC.
#[derive(Debug, Clone, Copy)]
pub struct LocalTime {
    pub time: NaiveDateTime,
    /// `None` when the value carries no zone, as for converted wall-clock times.
    pub offset_minutes: Option<i64>,
}

impl LocalTime {
    pub fn utc(time: NaiveDateTime) -> Self {
        Self {
            time,
            offset_minutes: Some(0),
        }
    }

    pub fn unspecified(time: NaiveDateTime) -> Self {
        Self {
            time,
            offset_minutes: None,
        }
    }
}

fn standard_pattern(format: char, locale: &Locale) -> Option<String> {
    let pattern = match format {
        'd' => locale.short_date.to_string(),
        'D' => locale.long_date.to_string(),
        't' => locale.short_time.to_string(),
        'T' => locale.long_time.to_string(),
        'f' => format!("{} {}", locale.long_date, locale.short_time),
        'F' => format!("{} {}", locale.long_date, locale.long_time),
        'g' => format!("{} {}", locale.short_date, locale.short_time),
        'G' => format!("{} {}", locale.short_date, locale.long_time),
        'm' | 'M' => locale.month_day.to_string(),
        'y' | 'Y' => locale.year_month.to_string(),
        'o' | 'O' => "yyyy'-'MM'-'dd'T'HH':'mm':'ss'.'fffffffK".to_string(),
        's' => "yyyy'-'MM'-'dd'T'HH':'mm':'ss".to_string(),
        'u' => "yyyy'-'MM'-'dd HH':'mm':'ss'Z'".to_string(),
        _ => return None,
    };
    Some(pattern)
}

fn offset_text(offset_minutes: Option<i64>, width: usize) -> String {
    let minutes = offset_minutes.unwrap_or_default();
    let sign = if minutes < 0 { '-' } else { '+' };
    let (hours, rest) = (minutes.abs() / 60, minutes.abs() % 60);
    match width {
        1 => format!("{}{}", sign, hours),
        2 => format!("{}{:02}", sign, hours),
        _ => format!("{}{:02}:{:02}", sign, hours, rest),
    }
}

fn fraction(time: &NaiveDateTime, digits: usize, trim: bool) -> String {
    let nanos = format!("{:09}", time.nanosecond() % 1_000_000_000);
    let text = &nanos[..digits.min(9)];
    if trim {
        text.trim_end_matches('0').to_string()
    } else {
        text.to_string()
    }
}

fn twelve_hour(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

fn render_specifier(token: &str, value: &LocalTime, locale: &Locale, out: &mut String) {
    let time = &value.time;
    let width = token.chars().count();
    let first = token.chars().next().unwrap_or_default();
    match first {
        '\'' | '"' => out.push_str(token.trim_matches(first)),
        '\\' | '%' => {
            let rest: String = token.chars().skip(1).collect();
            if first == '%' {
                render_specifier(&rest, value, locale, out);
            } else {
                out.push_str(&rest);
            }
        }
        'y' => match width {
            1 => out.push_str(&(time.year() % 100).to_string()),
            2 => out.push_str(&format!("{:02}", time.year() % 100)),
            n => out.push_str(&format!("{:0width$}", time.year(), width = n)),
        },
        'M' => {
            let month = time.month() as usize;
            match width {
                1 => out.push_str(&month.to_string()),
                2 => out.push_str(&format!("{:02}", month)),
                3 => out.push_str(locale.months_abbr[month - 1]),
                _ => out.push_str(locale.months[month - 1]),
            }
        }
        'd' => {
            let weekday = time.weekday().num_days_from_sunday() as usize;
            match width {
                1 => out.push_str(&time.day().to_string()),
                2 => out.push_str(&format!("{:02}", time.day())),
                3 => out.push_str(locale.days_abbr[weekday]),
                _ => out.push_str(locale.days[weekday]),
            }
        }
        'H' => out.push_str(&pad(time.hour(), width)),
        'h' => out.push_str(&pad(twelve_hour(time.hour()), width)),
        'm' => out.push_str(&pad(time.minute(), width)),
        's' => out.push_str(&pad(time.second(), width)),
        'f' => out.push_str(&fraction(time, width, false)),
        'F' => out.push_str(&fraction(time, width, true)),
        't' => {
            let designator = if time.hour() < 12 { locale.am } else { locale.pm };
            if width == 1 {
                out.extend(designator.chars().next());
            } else {
                out.push_str(designator);
            }
        }
        'z' => out.push_str(&offset_text(value.offset_minutes, width)),
        'K' => match value.offset_minutes {
            None => {}
            Some(0) => out.push('Z'),
            Some(minutes) => out.push_str(&offset_text(Some(minutes), 3)),
        },
        'g' => out.push_str("A.D."),
        _ => out.push_str(token),
    }
}

fn pad(number: u32, width: usize) -> String {
    if width >= 2 {
        format!("{:02}", number)
    } else {
        number.to_string()
    }
}

/// Formats `value` with a standard or custom format string.
pub fn format_datetime(value: &LocalTime, format: &str, locale: &Locale) -> String {
    let mut chars = format.chars();
    let pattern = match (chars.next(), chars.next()) {
        (Some(c), None) => standard_pattern(c, locale).unwrap_or_else(|| format!("%{}", c)),
        _ => format.to_string(),
    };

    let mut out = String::with_capacity(pattern.len() + 8);
    for token in SPECIFIER.find_iter(&pattern) {
        render_specifier(token.as_str(), value, locale, &mut out);
    }
    out
}

/// Checks that a format string can be rendered, for early error reporting.
pub fn verify_format(format: &str) -> Result<(), String> {
    let mut chars = format.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        let known = "dDtTfFgGmMyYoOsu".contains(c);
        if !known {
            return Err(format!("{} is not a valid datetime format.", format));
        }
    }
    Ok(())
}
