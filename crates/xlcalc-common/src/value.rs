use chrono::{Datelike, Duration as ChronoDur, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

use crate::{ExcelError, ExcelErrorKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/* ───────────────────── Excel date-serial utilities ───────────────────
Excel's serial date system:
  Serial 0  = 1900-01-00 (displayed as such; the day before 1900-01-01)
  Serial 1  = 1900-01-01
  Serial 59 = 1900-02-28
  Serial 60 = 1900-02-29  (phantom – doesn't exist, but Excel thinks it does)
  Serial 61 = 1900-03-01
From serial 61 onwards the count equals days since 1899-12-30.
Time is stored as fractional days (no timezone).
------------------------------------------------------------------- */

/// Base date for the 1900 date system. Serial 1 = base + 1 day = 1900-01-01.
const EXCEL_EPOCH: NaiveDate = NaiveDate::from_ymd_opt(1899, 12, 31).unwrap();

const FIRST_REAL_MARCH: NaiveDate = NaiveDate::from_ymd_opt(1900, 3, 1).unwrap();

/// Serial of the fictitious 1900-02-29.
pub const PHANTOM_LEAP_DAY: i64 = 60;

/// Serial date of 9999-12-31. Dates above that (or below 0) are invalid.
pub const MAX_SERIAL_DATE: i64 = 2_958_465;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SerialDateError {
    #[error("serial date {0} is outside [0, {MAX_SERIAL_DATE}]")]
    OutOfRange(i64),
    #[error("date is before 1900-01-01 or after 9999-12-31")]
    UnrepresentableDate,
}

impl From<SerialDateError> for ExcelError {
    fn from(e: SerialDateError) -> Self {
        ExcelError::new(ExcelErrorKind::Num).with_message(e.to_string())
    }
}

/// Serial number of a calendar date (1900 date system, phantom leap day included).
pub fn date_to_serial(date: &NaiveDate) -> i64 {
    let days = (*date - EXCEL_EPOCH).num_days();
    // Dates on or after 1900-03-01 get +1 to account for phantom Feb 29
    if *date >= FIRST_REAL_MARCH {
        days + 1
    } else {
        days
    }
}

/// Calendar date of a serial. Serial 60 maps to 1900-02-28 and serial 0 to
/// 1899-12-31 so that day arithmetic on the result stays on real dates.
pub fn serial_to_date(serial: i64) -> Result<NaiveDate, SerialDateError> {
    if !(0..=MAX_SERIAL_DATE).contains(&serial) {
        return Err(SerialDateError::OutOfRange(serial));
    }
    let offset = if serial < PHANTOM_LEAP_DAY {
        serial
    } else {
        serial - 1
    };
    Ok(EXCEL_EPOCH + ChronoDur::days(offset))
}

/// `(year, month, day)` exactly as Excel displays a serial, including
/// 1900-01-00 for serial 0 and 1900-02-29 for serial 60.
pub fn serial_to_ymd(serial: i64) -> Result<(i32, u32, u32), SerialDateError> {
    match serial {
        0 => Ok((1900, 1, 0)),
        PHANTOM_LEAP_DAY => Ok((1900, 2, 29)),
        _ => {
            let d = serial_to_date(serial)?;
            Ok((d.year(), d.month(), d.day()))
        }
    }
}

pub fn datetime_to_serial(dt: &NaiveDateTime) -> f64 {
    let serial_days = date_to_serial(&dt.date());
    let secs_in_day = dt.time().num_seconds_from_midnight() as f64;
    serial_days as f64 + secs_in_day / 86_400.0
}

/// Fraction of a day for a time of day.
pub fn time_to_fraction(t: &NaiveTime) -> f64 {
    t.num_seconds_from_midnight() as f64 / 86_400.0
}

/// Time of day of the fractional part of a serial, rounded to the second.
pub fn fraction_to_time(serial: f64) -> NaiveTime {
    let secs = (serial.fract().abs() * 86_400.0).round() as i64;
    NaiveTime::from_num_seconds_from_midnight_opt(secs.rem_euclid(86_400) as u32, 0)
        .unwrap_or(NaiveTime::MIN)
}

/// Excel "General" rendering of a number: integers without a fraction,
/// everything else with at most 15 significant digits.
pub fn format_general(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    let magnitude = n.abs().log10().floor() as i32;
    if !(-9..15).contains(&magnitude) {
        let s = format!("{n:.14E}");
        return trim_exponent(&s);
    }
    let decimals = (14 - magnitude).clamp(0, 15) as usize;
    let s = format!("{n:.decimals$}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

fn trim_exponent(s: &str) -> String {
    match s.split_once('E') {
        Some((mantissa, exp)) => {
            let mantissa = if mantissa.contains('.') {
                mantissa.trim_end_matches('0').trim_end_matches('.')
            } else {
                mantissa
            };
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}E{sign}{digits:0>2}")
        }
        None => s.to_string(),
    }
}

/// A single interpreter value. Exactly one variant is active and `Empty`
/// (a blank cell or an omitted argument) is distinct from `Number(0.0)` and
/// `Text("")`. Dates are plain serial numbers.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LiteralValue {
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(ExcelError),
    #[default]
    Empty,
}

impl Hash for LiteralValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            LiteralValue::Number(n) => n.to_bits().hash(state),
            LiteralValue::Text(s) => s.hash(state),
            LiteralValue::Boolean(b) => b.hash(state),
            LiteralValue::Error(e) => e.kind.hash(state),
            LiteralValue::Empty => {}
        }
    }
}

impl Eq for LiteralValue {}

impl Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Number(n) => f.write_str(&format_general(*n)),
            LiteralValue::Text(s) => write!(f, "{s}"),
            LiteralValue::Boolean(true) => f.write_str("TRUE"),
            LiteralValue::Boolean(false) => f.write_str("FALSE"),
            LiteralValue::Error(e) => write!(f, "{}", e.kind),
            LiteralValue::Empty => Ok(()),
        }
    }
}

impl LiteralValue {
    pub fn is_blank(&self) -> bool {
        matches!(self, LiteralValue::Empty)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, LiteralValue::Boolean(_))
    }

    pub fn as_error(&self) -> Option<&ExcelError> {
        match self {
            LiteralValue::Error(e) => Some(e),
            _ => None,
        }
    }

    /// `Ok(self)` unless this is an error value.
    pub fn into_result(self) -> Result<LiteralValue, ExcelError> {
        match self {
            LiteralValue::Error(e) => Err(e),
            other => Ok(other),
        }
    }
}

impl From<f64> for LiteralValue {
    fn from(n: f64) -> Self {
        LiteralValue::Number(n)
    }
}

impl From<i64> for LiteralValue {
    fn from(n: i64) -> Self {
        LiteralValue::Number(n as f64)
    }
}

impl From<i32> for LiteralValue {
    fn from(n: i32) -> Self {
        LiteralValue::Number(f64::from(n))
    }
}

impl From<u32> for LiteralValue {
    fn from(n: u32) -> Self {
        LiteralValue::Number(f64::from(n))
    }
}

impl From<bool> for LiteralValue {
    fn from(b: bool) -> Self {
        LiteralValue::Boolean(b)
    }
}

impl From<String> for LiteralValue {
    fn from(s: String) -> Self {
        LiteralValue::Text(s)
    }
}

impl From<&str> for LiteralValue {
    fn from(s: &str) -> Self {
        LiteralValue::Text(s.to_string())
    }
}

impl From<ExcelErrorKind> for LiteralValue {
    fn from(kind: ExcelErrorKind) -> Self {
        LiteralValue::Error(ExcelError::new(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn serial_anchors() {
        assert_eq!(date_to_serial(&ymd(1900, 1, 1)), 1);
        assert_eq!(date_to_serial(&ymd(1900, 2, 28)), 59);
        assert_eq!(date_to_serial(&ymd(1900, 3, 1)), 61);
        assert_eq!(date_to_serial(&ymd(2021, 1, 1)), 44197);
        assert_eq!(date_to_serial(&ymd(9999, 12, 31)), MAX_SERIAL_DATE);
    }

    #[test]
    fn serial_to_date_skips_phantom_day() {
        assert_eq!(serial_to_date(59).unwrap(), ymd(1900, 2, 28));
        assert_eq!(serial_to_date(60).unwrap(), ymd(1900, 2, 28));
        assert_eq!(serial_to_date(61).unwrap(), ymd(1900, 3, 1));
        assert_eq!(serial_to_date(44197).unwrap(), ymd(2021, 1, 1));
        assert_eq!(
            serial_to_date(-1),
            Err(SerialDateError::OutOfRange(-1))
        );
        assert!(serial_to_date(MAX_SERIAL_DATE + 1).is_err());
    }

    #[test]
    fn ymd_shows_excel_fictions() {
        assert_eq!(serial_to_ymd(0).unwrap(), (1900, 1, 0));
        assert_eq!(serial_to_ymd(60).unwrap(), (1900, 2, 29));
        assert_eq!(serial_to_ymd(61).unwrap(), (1900, 3, 1));
    }

    #[test]
    fn general_number_format() {
        assert_eq!(format_general(3.0), "3");
        assert_eq!(format_general(-0.5), "-0.5");
        assert_eq!(format_general(0.1 + 0.2), "0.3");
        assert_eq!(format_general(1.0 / 3.0), "0.333333333333333");
        assert_eq!(format_general(1e20), "1E+20");
    }

    #[test]
    fn blank_is_distinct() {
        assert_ne!(LiteralValue::Empty, LiteralValue::Number(0.0));
        assert_ne!(LiteralValue::Empty, LiteralValue::Text(String::new()));
        assert_eq!(LiteralValue::Empty.to_string(), "");
        assert_eq!(LiteralValue::Boolean(true).to_string(), "TRUE");
    }
}
