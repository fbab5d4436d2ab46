//! Component extraction (YEAR, MONTH, DAY, HOUR, MINUTE, SECOND) and
//! day-count functions (DAYS, DAYS360, YEARFRAC).

use chrono::Timelike;
use xlcalc_common::{ExcelError, fraction_to_time, serial_to_ymd};

use super::serial::is_leap_year;
use crate::args::{DateTimeSerial, SerialDate, adapt1, adapt2, adapt3};
use crate::function::{AllowRange, FnCaps};
use crate::function_registry::{FunctionRegistry, RegistryError};
use crate::traits::FunctionContext;

/// Returns the year of a date serial.
///
/// # Remarks
/// - The fractional time part is ignored.
/// - Serial `0` (Excel's 1900-01-00) reports 1900.
/// - Serials outside `0..=2958465` return `#NUM!`; booleans return `#VALUE!`.
///
/// # Examples
/// ```yaml,sandbox
/// title: "Year of a serial"
/// formula: '=YEAR(44197)'
/// expected: 2021
/// ```
///
/// ```yaml,sandbox
/// title: "Year of date text"
/// formula: '=YEAR("2021-03-04")'
/// expected: 2021
/// ```
fn year_fn(_: &dyn FunctionContext, date: SerialDate) -> Result<i64, ExcelError> {
    // Serial 0 is Excel's 1900-01-00, so its year is 1900 as well.
    Ok(i64::from(serial_to_ymd(date.0)?.0))
}

/// Returns the month (1-12) of a date serial.
///
/// # Examples
/// ```yaml,sandbox
/// title: "Phantom leap day"
/// formula: '=MONTH(60)'
/// expected: 2
/// ```
fn month_fn(_: &dyn FunctionContext, date: SerialDate) -> Result<i64, ExcelError> {
    Ok(i64::from(serial_to_ymd(date.0)?.1))
}

/// Returns the day of the month of a date serial.
///
/// # Remarks
/// - Serial `60` is the fictitious 1900-02-29 and reports 29.
/// - Serial `0` reports 0.
///
/// # Examples
/// ```yaml,sandbox
/// title: "Phantom leap day"
/// formula: '=DAY(60)'
/// expected: 29
/// ```
fn day_fn(_: &dyn FunctionContext, date: SerialDate) -> Result<i64, ExcelError> {
    Ok(i64::from(serial_to_ymd(date.0)?.2))
}

/// Hour of the time fraction.
///
/// # Examples
/// ```yaml,sandbox
/// title: "Evening"
/// formula: '=HOUR(44200.75)'
/// expected: 18
/// ```
fn hour_fn(_: &dyn FunctionContext, t: DateTimeSerial) -> Result<i64, ExcelError> {
    Ok(i64::from(fraction_to_time(t.0).hour()))
}

fn minute_fn(_: &dyn FunctionContext, t: DateTimeSerial) -> Result<i64, ExcelError> {
    Ok(i64::from(fraction_to_time(t.0).minute()))
}

fn second_fn(_: &dyn FunctionContext, t: DateTimeSerial) -> Result<i64, ExcelError> {
    Ok(i64::from(fraction_to_time(t.0).second()))
}

/// Returns the number of days from `start` to `end`.
///
/// # Remarks
/// - Arguments are in `end, start` order, so an earlier `end` gives a negative count.
///
/// # Examples
/// ```yaml,sandbox
/// title: "Two months"
/// formula: '=DAYS(DATE(2021,3,1),DATE(2021,1,1))'
/// expected: 59
/// ```
fn days_fn(_: &dyn FunctionContext, end: SerialDate, start: SerialDate) -> Result<i64, ExcelError> {
    Ok(end.0 - start.0)
}

/// 30/360 day count between two serials.
///
/// US (NASD): a start on the 31st becomes the 30th, and an end on the 31st
/// becomes the 30th only when the start is (now) the 30th. European: both
/// 31sts become 30ths.
pub fn days360(start: i64, end: i64, european: bool) -> Result<i64, ExcelError> {
    let (y1, m1, mut d1) = serial_to_ymd(start)?;
    let (y2, m2, mut d2) = serial_to_ymd(end)?;
    if d1 == 31 {
        d1 = 30;
    }
    if d2 == 31 && (european || d1 == 30) {
        d2 = 30;
    }
    Ok(360 * i64::from(y2 - y1) + 30 * (i64::from(m2) - i64::from(m1)) + i64::from(d2) - i64::from(d1))
}

/// Day count on a 360-day year.
///
/// # Remarks
/// - `method` FALSE (default) is the US/NASD rule; TRUE is the European rule.
///
/// # Examples
/// ```yaml,sandbox
/// title: "US method"
/// formula: '=DAYS360(DATE(2021,1,15),DATE(2021,3,31))'
/// expected: 76
/// ```
///
/// ```yaml,sandbox
/// title: "European method"
/// formula: '=DAYS360(DATE(2021,1,15),DATE(2021,3,31),TRUE)'
/// expected: 75
/// ```
fn days360_fn(
    _: &dyn FunctionContext,
    start: SerialDate,
    end: SerialDate,
    european: Option<bool>,
) -> Result<i64, ExcelError> {
    days360(start.0, end.0, european.unwrap_or(false))
}

fn average_year_length(y1: i32, y2: i32) -> f64 {
    let years = y1..=y2;
    let total: i64 = years
        .clone()
        .map(|y| if is_leap_year(y) { 366 } else { 365 })
        .sum();
    total as f64 / years.count() as f64
}

/// Fraction of a year between two serials under the given day-count basis.
pub fn yearfrac(start: i64, end: i64, basis: i64) -> Result<f64, ExcelError> {
    let (start, end) = if start > end { (end, start) } else { (start, end) };
    let days = (end - start) as f64;
    match basis {
        0 => Ok(days360(start, end, false)? as f64 / 360.0),
        1 => {
            let y1 = serial_to_ymd(start)?.0;
            let y2 = serial_to_ymd(end)?.0;
            Ok(days / average_year_length(y1, y2))
        }
        2 => Ok(days / 360.0),
        3 => Ok(days / 365.0),
        4 => Ok(days360(start, end, true)? as f64 / 360.0),
        _ => Err(ExcelError::new_num().with_message(format!("YEARFRAC basis {basis} is not 0..=4"))),
    }
}

/// Returns the fraction of a year between two dates.
///
/// # Remarks
/// - `basis` defaults to 0 (30/360); 1 is actual/actual, 2 actual/360, 3 actual/365, 4 European 30/360.
/// - The bounds may be given in either order.
/// - Any other basis returns `#NUM!`.
///
/// # Examples
/// ```yaml,sandbox
/// title: "Half a year"
/// formula: '=YEARFRAC(DATE(2021,1,1),DATE(2021,7,1))'
/// expected: 0.5
/// ```
fn yearfrac_fn(
    _: &dyn FunctionContext,
    start: SerialDate,
    end: SerialDate,
    basis: Option<i64>,
) -> Result<f64, ExcelError> {
    yearfrac(start.0, end.0, basis.unwrap_or(0))
}

pub fn register_builtins(reg: &mut FunctionRegistry) -> Result<(), RegistryError> {
    let caps = FnCaps::PURE | FnCaps::SCALAR;
    let none = AllowRange::None;
    reg.register("YEAR", 1, Some(1), adapt1(year_fn), caps, none)?;
    reg.register("MONTH", 1, Some(1), adapt1(month_fn), caps, none)?;
    reg.register("DAY", 1, Some(1), adapt1(day_fn), caps, none)?;
    reg.register("HOUR", 1, Some(1), adapt1(hour_fn), caps, none)?;
    reg.register("MINUTE", 1, Some(1), adapt1(minute_fn), caps, none)?;
    reg.register("SECOND", 1, Some(1), adapt1(second_fn), caps, none)?;
    reg.register("DAYS", 2, Some(2), adapt2(days_fn), caps, none)?;
    reg.register("DAYS360", 2, Some(3), adapt3(days360_fn), caps, none)?;
    reg.register("YEARFRAC", 2, Some(3), adapt3(yearfrac_fn), caps, none)?;
    Ok(())
}
