//! Date and time builtins.
//!
//! Timestamps travel as ISO 8601 strings and most functions return a string
//! rendered with an optional format and locale, defaulting to
//! `yyyy-MM-ddTHH:mm:ss.fffZ`.

use chrono::{
    DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
    Utc,
};
use lazy_static::lazy_static;
use regex::Regex;
use strum_macros::{Display, EnumString};

use super::{
    date_format::{format_datetime, verify_format, LocalTime},
    locale::{self, Locale},
    timezone,
    utils::*,
};
use crate::{
    config::Options,
    error::{Error, ExpressionResult},
    expression::{Expression, ExpressionEvaluator, ExpressionType, ReturnType},
    value::Value,
};

pub const DEFAULT_FORMAT: &str = "yyyy-MM-ddTHH:mm:ss.fffZ";

/// Ticks between 0001-01-01 and the unix epoch.
const EPOCH_TICKS: i64 = 621_355_968_000_000_000;
const TICKS_PER_SECOND: i64 = 10_000_000;
const TICKS_PER_MINUTE: f64 = 600_000_000.0;
const TICKS_PER_HOUR: f64 = 36_000_000_000.0;
const TICKS_PER_DAY: f64 = 864_000_000_000.0;

lazy_static! {
    static ref ISO_TIMESTAMP: Regex = Regex::new(
        r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{1,9})?(Z|[+-]\d{2}:\d{2})?$"
    )
    .expect("valid regex");
}

/// Layouts accepted where any reasonable timestamp is allowed.
const LENIENT_DATETIME_LAYOUTS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%dT%H:%M",
];
const LENIENT_DATE_LAYOUTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %B %Y"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    fn parse(value: &Value) -> ExpressionResult<TimeUnit> {
        let text = parse_string_or_null(value);
        text.parse::<TimeUnit>()
            .map_err(|_| Error::evaluation(format!("{} is not a valid time unit.", text)))
    }

    /// Shifts `timestamp` by `amount` units. Months and years follow the
    /// calendar and clamp to the end of shorter months.
    fn add(self, timestamp: DateTime<Utc>, amount: i64) -> ExpressionResult<DateTime<Utc>> {
        let overflow = || Error::evaluation(format!("adding {} {} overflows", amount, self));
        let fixed = |duration: Option<Duration>| {
            duration
                .and_then(|d| timestamp.checked_add_signed(d))
                .ok_or_else(overflow)
        };
        match self {
            TimeUnit::Second => fixed(Duration::try_seconds(amount)),
            TimeUnit::Minute => fixed(Duration::try_minutes(amount)),
            TimeUnit::Hour => fixed(Duration::try_hours(amount)),
            TimeUnit::Day => fixed(Duration::try_days(amount)),
            TimeUnit::Week => fixed(Duration::try_weeks(amount)),
            TimeUnit::Month | TimeUnit::Year => {
                let months = if self == TimeUnit::Year {
                    amount.checked_mul(12).ok_or_else(overflow)?
                } else {
                    amount
                };
                let magnitude = u32::try_from(months.unsigned_abs()).map_err(|_| overflow())?;
                let shifted = if months >= 0 {
                    timestamp.checked_add_months(Months::new(magnitude))
                } else {
                    timestamp.checked_sub_months(Months::new(magnitude))
                };
                shifted.ok_or_else(overflow)
            }
        }
    }
}

/// Parses a strict ISO 8601 timestamp. A missing zone means UTC.
pub fn parse_iso(text: &str) -> Result<DateTime<Utc>, String> {
    if !ISO_TIMESTAMP.is_match(text) {
        return Err(format!("{} is not standard ISO format.", text));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| format!("Could not parse {}", text))
}

fn parse_timestamp(value: &Value) -> ExpressionResult<DateTime<Utc>> {
    match value {
        Value::DateTime(dt) => Ok(*dt),
        Value::String(s) => parse_iso(s).map_err(Error::evaluation),
        other => Err(Error::evaluation(format!(
            "{} is not standard ISO format.",
            other
        ))),
    }
}

/// Parses a wall-clock time in any of the accepted layouts, dropping a zone
/// if present.
fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_local());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(text) {
        return Some(parsed.naive_local());
    }
    LENIENT_DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
        .or_else(|| {
            LENIENT_DATE_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDate::parse_from_str(text, layout).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Accepts ISO strings, other common layouts, datetimes and unix seconds.
fn parse_lenient(value: &Value) -> ExpressionResult<DateTime<Utc>> {
    match value {
        Value::DateTime(dt) => Ok(*dt),
        Value::Integer(_) | Value::Float(_) => from_epoch(value),
        Value::String(s) => {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
                return Ok(parsed.with_timezone(&Utc));
            }
            parse_naive(s)
                .map(|naive| Utc.from_utc_datetime(&naive))
                .ok_or_else(|| Error::evaluation(format!("Could not parse {}", s)))
        }
        other => Err(Error::evaluation(format!(
            "{} is not a valid timestamp.",
            other
        ))),
    }
}

fn from_epoch(value: &Value) -> ExpressionResult<DateTime<Utc>> {
    let seconds = value
        .as_f64()
        .ok_or_else(|| Error::evaluation(format!("{} is not a number.", value)))?;
    let millis = (seconds * 1000.0).round() as i64;
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| Error::evaluation(format!("{} is out of range for a timestamp", value)))
}

pub fn to_ticks(timestamp: &DateTime<Utc>) -> i64 {
    EPOCH_TICKS
        + timestamp.timestamp() * TICKS_PER_SECOND
        + i64::from(timestamp.timestamp_subsec_nanos()) / 100
}

fn from_ticks(ticks: i64) -> ExpressionResult<DateTime<Utc>> {
    let relative = ticks
        .checked_sub(EPOCH_TICKS)
        .ok_or_else(|| Error::evaluation(format!("{} is out of range for ticks", ticks)))?;
    let seconds = relative.div_euclid(TICKS_PER_SECOND);
    let nanos = (relative.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
    DateTime::from_timestamp(seconds, nanos)
        .ok_or_else(|| Error::evaluation(format!("{} is out of range for ticks", ticks)))
}

fn parse_ticks(value: &Value) -> ExpressionResult<i64> {
    match value {
        Value::Integer(i) => Ok(*i),
        Value::Float(f) if f.fract() == 0.0 => Ok(*f as i64),
        other => Err(Error::evaluation(format!("{} is not an integer.", other))),
    }
}

fn parse_amount(value: &Value) -> ExpressionResult<i64> {
    match value {
        Value::Integer(i) if *i != i64::MIN => Ok(*i),
        Value::Float(f) if f.fract() == 0.0 => Ok(*f as i64),
        other => Err(Error::evaluation(format!("{} should be an integer.", other))),
    }
}

/// Reads the optional `(format, locale)` pair starting at `position`.
fn format_and_locale<'a>(
    args: &'a [Value],
    position: usize,
    options: &Options,
    default_format: &'a str,
) -> ExpressionResult<(&'a str, &'static Locale)> {
    let format = match args.get(position) {
        None | Some(Value::Null) => default_format,
        Some(Value::String(format)) => {
            verify_format(format).map_err(Error::evaluation)?;
            format.as_str()
        }
        Some(other) => {
            return Err(Error::evaluation(format!(
                "{} should be a format string.",
                other
            )))
        }
    };
    let locale_name = match args.get(position + 1) {
        None => options.locale.as_deref(),
        Some(Value::String(name)) => Some(name.as_str()),
        Some(other) => {
            return Err(Error::evaluation(format!(
                "{} should be a locale string.",
                other
            )))
        }
    };
    Ok((format, locale::lookup(locale_name)))
}

fn render_utc(timestamp: &DateTime<Utc>, format: &str, locale: &Locale) -> Value {
    Value::String(format_datetime(
        &LocalTime::utc(timestamp.naive_utc()),
        format,
        locale,
    ))
}

fn render_with_options(
    timestamp: &DateTime<Utc>,
    args: &[Value],
    position: usize,
    options: &Options,
) -> ExpressionResult<Value> {
    let (format, locale) = format_and_locale(args, position, options, DEFAULT_FORMAT)?;
    Ok(render_utc(timestamp, format, locale))
}

fn add_fixed(unit: TimeUnit) -> impl Fn(&[Value], &Options) -> ExpressionResult<Value> + Send + Sync + 'static {
    move |args: &[Value], options: &Options| {
        let timestamp = parse_timestamp(&args[0])?;
        let amount = parse_amount(&args[1])?;
        let result = unit.add(timestamp, amount)?;
        render_with_options(&result, args, 2, options)
    }
}

fn shift_time(args: &[Value], options: &Options, sign: i64) -> ExpressionResult<Value> {
    let timestamp = parse_timestamp(&args[0])?;
    let amount = parse_amount(&args[1])?;
    let unit = TimeUnit::parse(&args[2])?;
    let result = unit.add(timestamp, amount * sign)?;
    render_with_options(&result, args, 3, options)
}

fn relative_to_now(args: &[Value], options: &Options, sign: i64) -> ExpressionResult<Value> {
    let amount = parse_amount(&args[0])?;
    let unit = TimeUnit::parse(&args[1])?;
    let result = unit.add(Utc::now(), amount * sign)?;
    render_with_options(&result, args, 2, options)
}

fn timestamp_part(part: fn(&DateTime<Utc>) -> i64) -> impl Fn(&[Value]) -> ExpressionResult<Value> + Send + Sync + 'static {
    move |args: &[Value]| parse_timestamp(&args[0]).map(|ts| Value::Integer(part(&ts)))
}

fn format_date_time(args: &[Value], options: &Options) -> ExpressionResult<Value> {
    let timestamp = parse_lenient(&args[0])?;
    render_with_options(&timestamp, args, 1, options)
}

fn format_epoch(args: &[Value], options: &Options) -> ExpressionResult<Value> {
    let timestamp = from_epoch(&args[0])?;
    render_with_options(&timestamp, args, 1, options)
}

fn format_ticks(args: &[Value], options: &Options) -> ExpressionResult<Value> {
    let timestamp = from_ticks(parse_ticks(&args[0])?)?;
    render_with_options(&timestamp, args, 1, options)
}

fn find_zone(value: &Value) -> ExpressionResult<&'static timezone::TimeZoneInfo> {
    let name = parse_string_or_null(value);
    timezone::find(&name)
        .ok_or_else(|| Error::evaluation(format!("{} is not a valid timezone", name)))
}

fn convert_from_utc(args: &[Value], options: &Options) -> ExpressionResult<Value> {
    let timestamp = parse_timestamp(&args[0])?;
    let zone = find_zone(&args[1])?;
    let (format, locale) = format_and_locale(args, 2, options, "o")?;
    let local = LocalTime::unspecified(zone.from_utc(&timestamp));
    Ok(Value::String(format_datetime(&local, format, locale)))
}

fn convert_to_utc(args: &[Value], options: &Options) -> ExpressionResult<Value> {
    let text = parse_string_or_null(&args[0]);
    let local = parse_naive(&text)
        .ok_or_else(|| Error::evaluation(format!("Could not parse {}", text)))?;
    let zone = find_zone(&args[1])?;
    render_with_options(&zone.to_utc(&local), args, 2, options)
}

fn start_of(truncate: fn(&DateTime<Utc>) -> Option<DateTime<Utc>>) -> impl Fn(&[Value], &Options) -> ExpressionResult<Value> + Send + Sync + 'static {
    move |args: &[Value], options: &Options| {
        let timestamp = parse_timestamp(&args[0])?;
        let start = truncate(&timestamp)
            .ok_or_else(|| Error::evaluation(format!("{} cannot be truncated", args[0])))?;
        render_with_options(&start, args, 1, options)
    }
}

fn start_of_day(ts: &DateTime<Utc>) -> Option<DateTime<Utc>> {
    Some(Utc.from_utc_datetime(&ts.date_naive().and_time(NaiveTime::MIN)))
}

fn start_of_hour(ts: &DateTime<Utc>) -> Option<DateTime<Utc>> {
    ts.with_minute(0)?.with_second(0)?.with_nanosecond(0)
}

fn start_of_month(ts: &DateTime<Utc>) -> Option<DateTime<Utc>> {
    start_of_day(&ts.with_day(1)?)
}

/// Describes `target` relative to `current` in words.
fn date_read_back(args: &[Value]) -> ExpressionResult<Value> {
    let current = parse_timestamp(&args[0])?.date_naive();
    let target = parse_timestamp(&args[1])?.date_naive();
    let days = (target - current).num_days();
    let invariant = locale::invariant();
    let weekday = invariant.days[target.weekday().num_days_from_sunday() as usize];
    let week_of = |date: NaiveDate| date.iso_week();

    let text = match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        2 => "the day after tomorrow".to_string(),
        -2 => "the day before yesterday".to_string(),
        _ if week_of(target) == week_of(current) => format!("this {}", weekday),
        1..=13 if week_of(target) == week_of(current + Duration::days(7)) => {
            format!("next {}", weekday)
        }
        -13..=-1 if week_of(target) == week_of(current - Duration::days(7)) => {
            format!("last {}", weekday)
        }
        _ => {
            let day = target.day() as i64;
            let suffix = match (day % 100, day % 10) {
                (11..=13, _) => "th",
                (_, 1) => "st",
                (_, 2) => "nd",
                (_, 3) => "rd",
                _ => "th",
            };
            format!(
                "{}{} {} {}",
                day,
                suffix,
                invariant.months[target.month0() as usize],
                target.year()
            )
        }
    };
    Ok(Value::String(text))
}

fn time_of_day(args: &[Value]) -> ExpressionResult<Value> {
    let timestamp = parse_timestamp(&args[0])?;
    let (hour, minute) = (timestamp.hour(), timestamp.minute());
    let text = match (hour, minute) {
        (0, 0) => "midnight",
        (0..=11, _) => "morning",
        (12, 0) => "noon",
        (12..=17, _) => "afternoon",
        (18..=21, _) | (22, 0) => "evening",
        _ => "night",
    };
    Ok(Value::from(text))
}

fn ticks_to(unit: f64) -> impl Fn(&[Value]) -> ExpressionResult<Value> + Send + Sync + 'static {
    move |args: &[Value]| parse_ticks(&args[0]).map(|ticks| Value::Float(ticks as f64 / unit))
}

/// `(timestamp, format?, locale?)`
fn validate_timestamp_with_format(expression: &Expression) -> ExpressionResult<()> {
    validate_order(
        expression,
        &[ReturnType::STRING, ReturnType::STRING],
        &[ReturnType::STRING],
    )
}

/// `(timestamp, amount, format?, locale?)`
fn validate_add_fixed(expression: &Expression) -> ExpressionResult<()> {
    validate_order(
        expression,
        &[ReturnType::STRING, ReturnType::STRING],
        &[ReturnType::STRING, ReturnType::NUMBER],
    )
}

/// `(timestamp, amount, unit, format?, locale?)`
fn validate_shift(expression: &Expression) -> ExpressionResult<()> {
    validate_order(
        expression,
        &[ReturnType::STRING, ReturnType::STRING],
        &[ReturnType::STRING, ReturnType::NUMBER, ReturnType::STRING],
    )
}

fn unit_evaluator(expr_type: ExpressionType, unit: TimeUnit) -> ExpressionEvaluator {
    ExpressionEvaluator::new(
        expr_type.as_ref(),
        apply_with_options_and_error(add_fixed(unit), None),
        ReturnType::STRING,
        validate_add_fixed,
    )
}

fn part_evaluator(expr_type: ExpressionType, part: fn(&DateTime<Utc>) -> i64) -> ExpressionEvaluator {
    ExpressionEvaluator::new(
        expr_type.as_ref(),
        apply_with_error(timestamp_part(part), None),
        ReturnType::NUMBER,
        validate_unary_string,
    )
}

pub(super) fn evaluators() -> Vec<ExpressionEvaluator> {
    vec![
        unit_evaluator(ExpressionType::AddDays, TimeUnit::Day),
        unit_evaluator(ExpressionType::AddHours, TimeUnit::Hour),
        unit_evaluator(ExpressionType::AddMinutes, TimeUnit::Minute),
        unit_evaluator(ExpressionType::AddSeconds, TimeUnit::Second),
        part_evaluator(ExpressionType::DayOfMonth, |ts| ts.day() as i64),
        part_evaluator(ExpressionType::DayOfWeek, |ts| {
            ts.weekday().num_days_from_sunday() as i64
        }),
        part_evaluator(ExpressionType::DayOfYear, |ts| ts.ordinal() as i64),
        part_evaluator(ExpressionType::Month, |ts| ts.month() as i64),
        part_evaluator(ExpressionType::Year, |ts| ts.year() as i64),
        part_evaluator(ExpressionType::Ticks, to_ticks),
        ExpressionEvaluator::new(
            ExpressionType::Date.as_ref(),
            apply_with_error(
                |args| {
                    let ts = parse_timestamp(&args[0])?;
                    Ok(render_utc(&ts, "M/d/yyyy", locale::invariant()))
                },
                None,
            ),
            ReturnType::STRING,
            validate_unary_string,
        ),
        ExpressionEvaluator::new(
            ExpressionType::UtcNow.as_ref(),
            apply_with_options_and_error(
                |args, options| render_with_options(&Utc::now(), args, 0, options),
                None,
            ),
            ReturnType::STRING,
            |e| validate_order(e, &[ReturnType::STRING, ReturnType::STRING], &[]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::FormatDateTime.as_ref(),
            apply_with_options_and_error(format_date_time, None),
            ReturnType::STRING,
            |e| {
                validate_order(
                    e,
                    &[ReturnType::STRING, ReturnType::STRING],
                    &[ReturnType::OBJECT],
                )
            },
        ),
        ExpressionEvaluator::new(
            ExpressionType::FormatEpoch.as_ref(),
            apply_with_options_and_error(format_epoch, None),
            ReturnType::STRING,
            |e| {
                validate_order(
                    e,
                    &[ReturnType::STRING, ReturnType::STRING],
                    &[ReturnType::NUMBER],
                )
            },
        ),
        ExpressionEvaluator::new(
            ExpressionType::FormatTicks.as_ref(),
            apply_with_options_and_error(format_ticks, None),
            ReturnType::STRING,
            |e| {
                validate_order(
                    e,
                    &[ReturnType::STRING, ReturnType::STRING],
                    &[ReturnType::NUMBER],
                )
            },
        ),
        ExpressionEvaluator::new(
            ExpressionType::SubtractFromTime.as_ref(),
            apply_with_options_and_error(|args, options| shift_time(args, options, -1), None),
            ReturnType::STRING,
            validate_shift,
        ),
        ExpressionEvaluator::new(
            ExpressionType::AddToTime.as_ref(),
            apply_with_options_and_error(|args, options| shift_time(args, options, 1), None),
            ReturnType::STRING,
            validate_shift,
        ),
        ExpressionEvaluator::new(
            ExpressionType::GetFutureTime.as_ref(),
            apply_with_options_and_error(|args, options| relative_to_now(args, options, 1), None),
            ReturnType::STRING,
            |e| {
                validate_order(
                    e,
                    &[ReturnType::STRING, ReturnType::STRING],
                    &[ReturnType::NUMBER, ReturnType::STRING],
                )
            },
        ),
        ExpressionEvaluator::new(
            ExpressionType::GetPastTime.as_ref(),
            apply_with_options_and_error(|args, options| relative_to_now(args, options, -1), None),
            ReturnType::STRING,
            |e| {
                validate_order(
                    e,
                    &[ReturnType::STRING, ReturnType::STRING],
                    &[ReturnType::NUMBER, ReturnType::STRING],
                )
            },
        ),
        ExpressionEvaluator::new(
            ExpressionType::DateReadBack.as_ref(),
            apply_with_error(date_read_back, None),
            ReturnType::STRING,
            |e| validate_order(e, &[], &[ReturnType::STRING, ReturnType::STRING]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::GetTimeOfDay.as_ref(),
            apply_with_error(time_of_day, None),
            ReturnType::STRING,
            validate_unary_string,
        ),
        ExpressionEvaluator::new(
            ExpressionType::ConvertFromUtc.as_ref(),
            apply_with_options_and_error(convert_from_utc, None),
            ReturnType::STRING,
            |e| {
                validate_order(
                    e,
                    &[ReturnType::STRING, ReturnType::STRING],
                    &[ReturnType::STRING, ReturnType::STRING],
                )
            },
        ),
        ExpressionEvaluator::new(
            ExpressionType::ConvertToUtc.as_ref(),
            apply_with_options_and_error(convert_to_utc, None),
            ReturnType::STRING,
            |e| {
                validate_order(
                    e,
                    &[ReturnType::STRING, ReturnType::STRING],
                    &[ReturnType::STRING, ReturnType::STRING],
                )
            },
        ),
        ExpressionEvaluator::new(
            ExpressionType::StartOfDay.as_ref(),
            apply_with_options_and_error(start_of(start_of_day), None),
            ReturnType::STRING,
            validate_timestamp_with_format,
        ),
        ExpressionEvaluator::new(
            ExpressionType::StartOfHour.as_ref(),
            apply_with_options_and_error(start_of(start_of_hour), None),
            ReturnType::STRING,
            validate_timestamp_with_format,
        ),
        ExpressionEvaluator::new(
            ExpressionType::StartOfMonth.as_ref(),
            apply_with_options_and_error(start_of(start_of_month), None),
            ReturnType::STRING,
            validate_timestamp_with_format,
        ),
        ExpressionEvaluator::new(
            ExpressionType::TicksToDays.as_ref(),
            apply_with_error(ticks_to(TICKS_PER_DAY), None),
            ReturnType::NUMBER,
            validate_unary_number,
        ),
        ExpressionEvaluator::new(
            ExpressionType::TicksToHours.as_ref(),
            apply_with_error(ticks_to(TICKS_PER_HOUR), None),
            ReturnType::NUMBER,
            validate_unary_number,
        ),
        ExpressionEvaluator::new(
            ExpressionType::TicksToMinutes.as_ref(),
            apply_with_error(ticks_to(TICKS_PER_MINUTE), None),
            ReturnType::NUMBER,
            validate_unary_number,
        ),
        ExpressionEvaluator::new(
            ExpressionType::DateTimeDiff.as_ref(),
            apply_with_error(
                |args| {
                    let first = parse_timestamp(&args[0])?;
                    let second = parse_timestamp(&args[1])?;
                    Ok(Value::Integer(to_ticks(&first) - to_ticks(&second)))
                },
                None,
            ),
            ReturnType::NUMBER,
            |e| validate_order(e, &[], &[ReturnType::STRING, ReturnType::STRING]),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(text: &str) -> DateTime<Utc> {
        parse_iso(text).unwrap()
    }

    #[test]
    fn test_parse_iso_is_strict() {
        assert!(parse_iso("2018-03-15T13:00:00.000Z").is_ok());
        assert!(parse_iso("2018-03-15T13:00:00+02:00").is_ok());
        assert_eq!(
            parse_iso("2018-03-15").unwrap_err(),
            "2018-03-15 is not standard ISO format."
        );
        assert_eq!(
            parse_iso("2018-13-45T13:00:00Z").unwrap_err(),
            "Could not parse 2018-13-45T13:00:00Z"
        );
    }

    #[test]
    fn test_lenient_layouts() {
        for text in ["2018/03/15 13:00:00", "01/01/2018 00:00:00", "2018-03-15"] {
            assert!(parse_lenient(&Value::from(text)).is_ok(), "{}", text);
        }
        assert_eq!(
            parse_lenient(&Value::Integer(1521118800)).unwrap(),
            ts("2018-03-15T13:00:00.000Z")
        );
    }

    #[test]
    fn test_ticks() {
        assert_eq!(to_ticks(&ts("2018-01-01T08:00:00.000Z")), 636503904000000000);
        assert_eq!(from_ticks(636503904000000000).unwrap(), ts("2018-01-01T08:00:00.000Z"));
    }

    #[test]
    fn test_time_units() {
        let start = ts("2018-01-31T00:00:00.000Z");
        assert_eq!("WEEK".parse::<TimeUnit>().unwrap(), TimeUnit::Week);
        assert_eq!(
            TimeUnit::Month.add(start, 1).unwrap(),
            ts("2018-02-28T00:00:00.000Z")
        );
        assert_eq!(
            TimeUnit::Year.add(start, -1).unwrap(),
            ts("2017-01-31T00:00:00.000Z")
        );
        assert_eq!(
            TimeUnit::parse(&Value::from("fortnight")).unwrap_err().to_string(),
            "fortnight is not a valid time unit."
        );
    }

    #[test]
    fn test_time_of_day_buckets() {
        let bucket = |text: &str| time_of_day(&[Value::from(text)]).unwrap();
        assert_eq!(bucket("2018-03-15T00:00:00.000Z"), Value::from("midnight"));
        assert_eq!(bucket("2018-03-15T08:00:00.000Z"), Value::from("morning"));
        assert_eq!(bucket("2018-03-15T12:00:00.000Z"), Value::from("noon"));
        assert_eq!(bucket("2018-03-15T13:00:00.000Z"), Value::from("afternoon"));
        assert_eq!(bucket("2018-03-15T18:00:00.000Z"), Value::from("evening"));
        assert_eq!(bucket("2018-03-15T23:00:00.000Z"), Value::from("night"));
    }

    #[test]
    fn test_date_read_back() {
        let read = |a: &str, b: &str| date_read_back(&[Value::from(a), Value::from(b)]).unwrap();
        assert_eq!(
            read("2018-03-15T13:00:00.000Z", "2018-03-16T13:00:00.000Z"),
            Value::from("tomorrow")
        );
        assert_eq!(
            read("2018-03-15T13:00:00.000Z", "2018-03-14T13:00:00.000Z"),
            Value::from("yesterday")
        );
        assert_eq!(
            read("2018-03-15T13:00:00.000Z", "2018-05-01T00:00:00.000Z"),
            Value::from("1st May 2018")
        );
    }

    #[test]
    fn test_convert_between_zones() {
        let options = Options::new();
        let from = convert_from_utc(
            &[
                Value::from("2018-01-02T02:00:00.000Z"),
                Value::from("Pacific Standard Time"),
            ],
            &options,
        )
        .unwrap();
        assert_eq!(from, Value::from("2018-01-01T18:00:00.0000000"));

        let to = convert_to_utc(
            &[
                Value::from("01/01/2018 00:00:00"),
                Value::from("Pacific Standard Time"),
            ],
            &options,
        )
        .unwrap();
        assert_eq!(to, Value::from("2018-01-01T08:00:00.000Z"));
    }
}
