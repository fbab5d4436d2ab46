//! DATE and TIME functions

use chrono::NaiveDate;
use xlcalc_common::{ExcelError, SerialDateError, date_to_serial};

use super::serial::{check_serial, days_in_month};
use crate::args::adapt3;
use crate::function::{AllowRange, FnCaps};
use crate::function_registry::{FunctionRegistry, RegistryError};
use crate::traits::FunctionContext;

const SECONDS_PER_DAY: i64 = 86_400;

/// Serial for `DATE(year, month, day)`.
///
/// Years 0..=1899 are read as 1900..=3799. Months outside 1..=12 roll into
/// neighbouring years and days outside the month spill into neighbouring
/// months; the spill is applied as serial arithmetic so that it crosses
/// Excel's phantom 1900-02-29 the way Excel does.
pub fn date_serial(year: i64, month: i64, day: i64) -> Result<i64, ExcelError> {
    if !(0..=9999).contains(&year) {
        return Err(ExcelError::new_num().with_message(format!("year {year} is out of range")));
    }
    let year = if year < 1900 { year + 1900 } else { year };
    let shift = month.saturating_sub(1).div_euclid(12);
    let month = (month.saturating_sub(1).rem_euclid(12) + 1) as u32;
    let year = i32::try_from(year.saturating_add(shift))
        .map_err(|_| ExcelError::from(SerialDateError::UnrepresentableDate))?;

    let dim = i64::from(days_in_month(year, month)?);
    let (day, adjustment) = if day > dim {
        (dim, day - dim)
    } else if day < 1 {
        (1, day.saturating_sub(1))
    } else {
        (day, 0)
    };
    let base = NaiveDate::from_ymd_opt(year, month, day as u32)
        .ok_or(SerialDateError::UnrepresentableDate)?;
    check_serial(date_to_serial(&base).saturating_add(adjustment))
}

/// Builds a date serial from year, month and day.
///
/// # Remarks
/// - Years `0..=1899` are offset from 1900; years outside `0..=9999` return `#NUM!`.
/// - Months and days outside their ranges roll into neighbouring months and years.
/// - `DATE(1900,2,29)` returns the phantom serial 60.
///
/// # Examples
/// ```yaml,sandbox
/// title: "Month rollover"
/// formula: '=DATE(2021,13,1)'
/// expected: 44562
/// ```
///
/// ```yaml,sandbox
/// title: "Two-digit year"
/// formula: '=DATE(99,1,1)'
/// expected: 36161
/// ```
fn date_fn(_: &dyn FunctionContext, year: i64, month: i64, day: i64) -> Result<i64, ExcelError> {
    date_serial(year, month, day)
}

/// `TIME(hour, minute, second)` as a fraction of a day. The total wraps at
/// 24 hours; a negative total is `#NUM!`.
pub fn time_fraction(hour: i64, minute: i64, second: i64) -> Result<f64, ExcelError> {
    if hour > 32_767 || minute > 32_767 || second > 32_767 {
        return Err(ExcelError::new_num().with_message("TIME component exceeds 32767"));
    }
    let total = hour
        .saturating_mul(3600)
        .saturating_add(minute.saturating_mul(60))
        .saturating_add(second);
    if total < 0 {
        return Err(ExcelError::new_num().with_message("TIME total is negative"));
    }
    Ok((total % SECONDS_PER_DAY) as f64 / SECONDS_PER_DAY as f64)
}

/// Builds a time fraction from hour, minute and second.
///
/// # Remarks
/// - Totals past 24 hours wrap; a negative total returns `#NUM!`.
///
/// # Examples
/// ```yaml,sandbox
/// title: "Six in the evening"
/// formula: '=TIME(18,0,0)'
/// expected: 0.75
/// ```
fn time_fn(_: &dyn FunctionContext, hour: i64, minute: i64, second: i64) -> Result<f64, ExcelError> {
    time_fraction(hour, minute, second)
}

pub fn register_builtins(reg: &mut FunctionRegistry) -> Result<(), RegistryError> {
    let caps = FnCaps::PURE | FnCaps::SCALAR;
    reg.register("DATE", 3, Some(3), adapt3(date_fn), caps, AllowRange::None)?;
    reg.register("TIME", 3, Some(3), adapt3(time_fn), caps, AllowRange::None)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use xlcalc_common::{ExcelErrorKind, MAX_SERIAL_DATE};

    #[test]
    fn plain_dates() {
        assert_eq!(date_serial(2021, 1, 1).unwrap(), 44197);
        assert_eq!(date_serial(1900, 1, 1).unwrap(), 1);
        assert_eq!(date_serial(9999, 12, 31).unwrap(), MAX_SERIAL_DATE);
    }

    #[test]
    fn two_digit_years_offset_by_1900() {
        assert_eq!(date_serial(121, 1, 1).unwrap(), date_serial(2021, 1, 1).unwrap());
        assert_eq!(date_serial(0, 1, 1).unwrap(), 1);
    }

    #[test]
    fn months_and_days_roll_over() {
        assert_eq!(date_serial(2021, 13, 1).unwrap(), date_serial(2022, 1, 1).unwrap());
        assert_eq!(date_serial(2021, 0, 1).unwrap(), date_serial(2020, 12, 1).unwrap());
        assert_eq!(date_serial(2021, -11, 1).unwrap(), date_serial(2020, 1, 1).unwrap());
        assert_eq!(date_serial(2021, 2, 30).unwrap(), date_serial(2021, 3, 2).unwrap());
        assert_eq!(date_serial(2021, 3, 0).unwrap(), date_serial(2021, 2, 28).unwrap());
        assert_eq!(date_serial(2021, 1, -30).unwrap(), date_serial(2020, 12, 1).unwrap());
    }

    #[test]
    fn phantom_leap_day() {
        assert_eq!(date_serial(1900, 2, 29).unwrap(), 60);
        assert_eq!(date_serial(1900, 3, 0).unwrap(), 60);
        assert_eq!(date_serial(1900, 1, 0).unwrap(), 0);
    }

    #[test]
    fn out_of_range_is_num() {
        assert_eq!(date_serial(-1, 1, 1).unwrap_err().kind, ExcelErrorKind::Num);
        assert_eq!(date_serial(10000, 1, 1).unwrap_err().kind, ExcelErrorKind::Num);
        assert_eq!(date_serial(9999, 12, 32).unwrap_err().kind, ExcelErrorKind::Num);
        assert_eq!(date_serial(1900, 1, -1).unwrap_err().kind, ExcelErrorKind::Num);
    }

    #[test]
    fn time_wraps_and_rejects_negative() {
        assert_eq!(time_fraction(12, 0, 0).unwrap(), 0.5);
        assert_eq!(time_fraction(0, 90, 0).unwrap(), 1.5 / 24.0);
        assert_eq!(time_fraction(27, 0, 0).unwrap(), 3.0 / 24.0);
        assert_eq!(time_fraction(1, -30, 0).unwrap(), 0.5 / 24.0);
        assert_eq!(time_fraction(0, 0, -1).unwrap_err().kind, ExcelErrorKind::Num);
    }
}
