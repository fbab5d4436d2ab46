//! WEEKDAY, WEEKNUM, ISOWEEKNUM, DATEDIF, NETWORKDAYS, WORKDAY functions

use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};
use xlcalc_common::{ExcelError, LiteralValue, MAX_SERIAL_DATE, serial_to_date, serial_to_ymd};

use super::serial::{check_serial, days_in_month, is_weekend, week_start, weekday_calc, year_start};
use crate::args::{SerialDate, adapt1, adapt2, adapt3, adapt_last_optional};
use crate::coercion::to_serial_date;
use crate::function::{AllowRange, FnCaps};
use crate::function_registry::{FunctionRegistry, RegistryError};
use crate::traits::{CalcValue, FunctionContext};

/* ─────────────────────────── WEEKDAY ─────────────────────────── */

/// Day number of `serial` under a WEEKDAY return type (1, 2, 3, 11..=17).
pub fn weekday(serial: i64, flag: i64) -> Result<i64, ExcelError> {
    let (start, number) = week_start(flag).ok_or_else(|| {
        ExcelError::new_num().with_message(format!("WEEKDAY return type {flag} is not supported"))
    })?;
    Ok(weekday_calc(serial, start, number))
}

/// Returns the day of the week for a date.
///
/// # Remarks
/// - Unlike the other date functions, TRUE and FALSE are accepted as serials 1 and 0.
/// - `return_type` 1 (default) numbers Sunday as 1; 2 numbers Monday as 1; 3 numbers Monday as 0.
/// - Types 11-17 start the week on Monday through Sunday.
/// - Unsupported types return `#NUM!`.
///
/// # Examples
/// ```yaml,sandbox
/// title: "Friday, Sunday-based"
/// formula: '=WEEKDAY(44197)'
/// expected: 6
/// ```
///
/// ```yaml,sandbox
/// title: "Friday, Monday-based"
/// formula: '=WEEKDAY(44197,2)'
/// expected: 5
/// ```
fn weekday_fn(
    ctx: &dyn FunctionContext,
    date: LiteralValue,
    flag: Option<f64>,
) -> Result<i64, ExcelError> {
    let serial = to_serial_date(&date, &ctx.locale(), true)?;
    weekday(serial, flag.map_or(1, |f| f.trunc() as i64))
}

/* ─────────────────────────── week numbers ─────────────────────────── */

/// ISO 8601 week number.
pub fn iso_week_number(serial: i64) -> Result<i64, ExcelError> {
    Ok(i64::from(serial_to_date(serial)?.iso_week().week()))
}

/// ISO 8601 week number of a date.
///
/// # Examples
/// ```yaml,sandbox
/// title: "First ISO week of 2021"
/// formula: '=ISOWEEKNUM(DATE(2021,1,4))'
/// expected: 1
/// ```
///
/// ```yaml,sandbox
/// title: "New Year's Day in the previous ISO year"
/// formula: '=ISOWEEKNUM(44197)'
/// expected: 53
/// ```
fn isoweeknum_fn(_: &dyn FunctionContext, date: SerialDate) -> Result<i64, ExcelError> {
    iso_week_number(date.0)
}

/// WEEKNUM: week 1 is the week containing January 1st; `return_type` picks
/// the first day of the week, 21 means ISO weeks.
pub fn week_number(serial: i64, return_type: i64) -> Result<i64, ExcelError> {
    if return_type == 21 {
        return iso_week_number(serial);
    }
    let unsupported = || {
        ExcelError::new_num().with_message(format!("WEEKNUM return type {return_type} is not supported"))
    };
    if !matches!(return_type, 1 | 2 | 11..=17) {
        return Err(unsupported());
    }
    let (start, _) = week_start(return_type).ok_or_else(unsupported)?;
    if serial == 0 {
        return Ok(0);
    }
    let jan1 = year_start(serial_to_ymd(serial)?.0)?;
    let lead = weekday_calc(jan1, start, 0);
    Ok((serial - jan1 + lead) / 7 + 1)
}

/// Week of the year containing a date.
///
/// # Remarks
/// - Week 1 is the week holding January 1; `return_type` picks the first weekday.
/// - Type 21 uses ISO 8601 numbering.
///
/// # Examples
/// ```yaml,sandbox
/// title: "Sunday start"
/// formula: '=WEEKNUM(DATE(2021,1,3))'
/// expected: 2
/// ```
fn weeknum_fn(
    _: &dyn FunctionContext,
    date: SerialDate,
    return_type: Option<i64>,
) -> Result<i64, ExcelError> {
    week_number(date.0, return_type.unwrap_or(1))
}

/* ─────────────────────────── DATEDIF ─────────────────────────── */

pub fn datedif(start: i64, end: i64, unit: &str) -> Result<i64, ExcelError> {
    if start > end {
        return Err(ExcelError::new_num().with_message("DATEDIF start date is after end date"));
    }
    let s = serial_to_date(start)?;
    let e = serial_to_date(end)?;
    let (sy, sm, sd) = (i64::from(s.year()), i64::from(s.month()), i64::from(s.day()));
    let (ey, em, ed) = (i64::from(e.year()), i64::from(e.month()), i64::from(e.day()));
    // The end's month/day falls before the start's within a year.
    let before_anniversary = (em, ed) < (sm, sd);

    let out = match unit.to_ascii_uppercase().as_str() {
        "Y" => ey - sy - i64::from(before_anniversary),
        "M" => (ey - sy) * 12 + em - sm - i64::from(ed < sd),
        "D" => end - start,
        "MD" => {
            let dim = i64::from(days_in_month(s.year(), s.month())?);
            (ed - sd + dim).rem_euclid(dim)
        }
        "YM" => {
            let months = (em - sm + 12) % 12 - i64::from(ed < sd);
            if months < 0 { months + 12 } else { months }
        }
        "YD" => {
            let year = s.year() + i32::from(before_anniversary);
            let day = e.day().min(days_in_month(year, e.month())?);
            let anniversary = NaiveDate::from_ymd_opt(year, e.month(), day)
                .ok_or_else(ExcelError::new_num)?;
            (anniversary - s).num_days()
        }
        _ => {
            return Err(ExcelError::new_num().with_message(format!("DATEDIF unit {unit:?} is not recognised")));
        }
    };
    Ok(out)
}

/// Difference between two dates in the given unit.
///
/// # Remarks
/// - Units are `Y`, `M`, `D`, `YM`, `YD` and `MD`, case-insensitive.
/// - A start after the end, or an unknown unit, returns `#NUM!`.
///
/// # Examples
/// ```yaml,sandbox
/// title: "Whole months"
/// formula: '=DATEDIF(DATE(2020,3,15),DATE(2021,3,10),"m")'
/// expected: 11
/// ```
fn datedif_fn(
    _: &dyn FunctionContext,
    start: SerialDate,
    end: SerialDate,
    unit: String,
) -> Result<i64, ExcelError> {
    datedif(start.0, end.0, &unit)
}

/* ─────────────────────────── business days ─────────────────────────── */

/// Business days in `first..=last`, counting both ends, minus `holidays`
/// that fall on a weekday inside the interval. Reversing the bounds negates
/// the result.
pub fn business_days_until(first: i64, last: i64, holidays: &[i64]) -> i64 {
    if first > last {
        return -business_days_until(last, first, holidays);
    }
    let mut work_days = last - first + 1;
    let full_weeks = work_days / 7;
    let remaining = work_days % 7;
    for day in (last - remaining + 1)..=last {
        if is_weekend(day) {
            work_days -= 1;
        }
    }
    work_days -= full_weeks * 2;
    for &h in holidays {
        if first <= h && h <= last && !is_weekend(h) {
            work_days -= 1;
        }
    }
    work_days
}

/// Serial dates of every non-blank holiday value, in reading order.
fn collect_holidays(ctx: &dyn FunctionContext, holidays: &CalcValue) -> Result<Vec<i64>, ExcelError> {
    let locale = ctx.locale();
    ctx.non_blank_values(holidays)
        .map(|v| v.and_then(|v| to_serial_date(&v, &locale, false)))
        .collect()
}

/// Counts Monday-Friday days between two dates, both ends included.
///
/// # Remarks
/// - Holidays may be a range or array; blanks are skipped and repeats count once.
/// - Reversed bounds give a negative count.
///
/// # Examples
/// ```yaml,sandbox
/// title: "One working week"
/// formula: '=NETWORKDAYS(44200,44204)'
/// expected: 5
/// ```
fn networkdays_fn(
    ctx: &dyn FunctionContext,
    start: SerialDate,
    end: SerialDate,
    holidays: CalcValue,
) -> Result<i64, ExcelError> {
    let mut holidays = collect_holidays(ctx, &holidays)?;
    holidays.sort_unstable();
    holidays.dedup();
    Ok(business_days_until(start.0, end.0, &holidays))
}

/// The serial `offset` business days away from `start`.
///
/// Holidays are visited in the direction of travel. Each holiday closes a
/// segment whose workdays are counted in bulk; once the segment holding the
/// target is found, whole weeks are jumped and the rest walked day by day.
pub fn workday(start: i64, offset: i64, holidays: &[i64]) -> Result<i64, ExcelError> {
    if offset == 0 {
        return Ok(start);
    }
    if offset.unsigned_abs() > MAX_SERIAL_DATE.unsigned_abs() {
        return Err(ExcelError::new_num().with_message("WORKDAY offset leaves the date range"));
    }
    let one_day: i64 = if offset > 0 { 1 } else { -1 };
    let towards = |a: i64, b: i64| if one_day > 0 { a.cmp(&b) } else { b.cmp(&a) };

    let mut ordered: Vec<i64> = holidays
        .iter()
        .copied()
        .filter(|&h| towards(h, start) != Ordering::Less && !is_weekend(h))
        .collect();
    ordered.sort_unstable_by(|a, b| towards(*a, *b));
    ordered.dedup();

    let mut last_so_far = start;
    let mut workdays_so_far = 0;
    let skip_start = usize::from(ordered.first() == Some(&start));
    for &holiday in &ordered[skip_start..] {
        // Adjacent holiday: the general count would see a zero-length segment.
        let segment = if last_so_far + one_day != holiday {
            business_days_until(last_so_far + one_day, holiday, &[])
        } else {
            one_day
        };
        if towards(workdays_so_far + segment, offset) == Ordering::Greater {
            break;
        }
        workdays_so_far += segment - one_day;
        last_so_far = holiday;
    }

    let remaining_workdays = offset - workdays_so_far;
    let mut week_count = remaining_workdays / 5;
    let mut remaining = remaining_workdays % 5;
    if remaining == 0 {
        week_count -= one_day;
        remaining += one_day * 5;
    }

    let mut day = last_so_far + week_count * 7;
    while remaining != 0 {
        day += one_day;
        while is_weekend(day) {
            day += one_day;
        }
        remaining -= one_day;
    }
    check_serial(day)
}

/// Returns the business day `days` working days away from `start`.
///
/// # Remarks
/// - A zero offset returns `start` unchanged, even on a weekend.
/// - Results outside the serial range, including huge offsets, return `#NUM!`.
///
/// # Examples
/// ```yaml,sandbox
/// title: "Friday to Monday"
/// formula: '=WORKDAY(44204,1)'
/// expected: 44207
/// ```
fn workday_fn(
    ctx: &dyn FunctionContext,
    start: SerialDate,
    offset: i64,
    holidays: CalcValue,
) -> Result<i64, ExcelError> {
    let holidays = collect_holidays(ctx, &holidays)?;
    workday(start.0, offset, &holidays)
}

pub fn register_builtins(reg: &mut FunctionRegistry) -> Result<(), RegistryError> {
    let caps = FnCaps::PURE | FnCaps::SCALAR;
    let none = AllowRange::None;
    reg.register("WEEKDAY", 1, Some(2), adapt2(weekday_fn), caps, none)?;
    reg.register("WEEKNUM", 1, Some(2), adapt2(weeknum_fn), caps, none)?;
    reg.register("ISOWEEKNUM", 1, Some(1), adapt1(isoweeknum_fn), caps, none)?;
    reg.register("DATEDIF", 3, Some(3), adapt3(datedif_fn), caps, none)?;

    let no_holidays = CalcValue::Array(Vec::new());
    let holidays_arg = AllowRange::Only(&[2]);
    reg.register(
        "NETWORKDAYS",
        2,
        Some(3),
        adapt_last_optional(3, no_holidays.clone(), adapt3(networkdays_fn)),
        FnCaps::PURE | FnCaps::RANGE,
        holidays_arg,
    )?;
    reg.register(
        "WORKDAY",
        2,
        Some(3),
        adapt_last_optional(3, no_holidays, adapt3(workday_fn)),
        FnCaps::PURE | FnCaps::RANGE,
        holidays_arg,
    )?;
    Ok(())
}
