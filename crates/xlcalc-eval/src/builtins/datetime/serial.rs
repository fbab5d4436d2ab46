//! Calendar helpers shared by the date functions. Everything works on whole
//! serial dates so Excel's view of 1900 (including the phantom leap day) is
//! kept intact.

use chrono::{Datelike, NaiveDate};
use xlcalc_common::{ExcelError, MAX_SERIAL_DATE, SerialDateError, date_to_serial};

/// Day of week for a serial. With the defaults (`0`, `1`) Sunday is 1 and
/// Saturday 7. Excel's 1900 bug makes every day before 1900-03-01 one off,
/// which this reproduces.
pub(crate) fn weekday_calc(serial: i64, week_start_offset: i64, number_offset: i64) -> i64 {
    (serial + 6 + week_start_offset).rem_euclid(7) + number_offset
}

pub(crate) fn is_weekend(serial: i64) -> bool {
    matches!(weekday_calc(serial, 0, 1), 1 | 7)
}

/// `(week_start_offset, number_offset)` for a WEEKDAY/WEEKNUM return type.
pub(crate) fn week_start(flag: i64) -> Option<(i64, i64)> {
    let start = match flag {
        1 | 17 => 0,
        2 | 3 | 11 => 6,
        12 => 5,
        13 => 4,
        14 => 3,
        15 => 2,
        16 => 1,
        _ => return None,
    };
    Some((start, if flag == 3 { 0 } else { 1 }))
}

pub(crate) fn check_serial(serial: i64) -> Result<i64, ExcelError> {
    if (0..=MAX_SERIAL_DATE).contains(&serial) {
        Ok(serial)
    } else {
        Err(SerialDateError::OutOfRange(serial).into())
    }
}

pub(crate) fn days_in_month(year: i32, month: u32) -> Result<u32, ExcelError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(SerialDateError::UnrepresentableDate)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(SerialDateError::UnrepresentableDate)?;
    Ok((next - first).num_days() as u32)
}

pub(crate) fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Serial of `year-month-day` with the day clamped to the month's length.
pub(crate) fn clamped_serial(year: i32, month: u32, day: u32) -> Result<i64, ExcelError> {
    let day = day.min(days_in_month(year, month)?);
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(SerialDateError::UnrepresentableDate)?;
    Ok(date_to_serial(&date))
}

/// Serial of January 1st of `year`.
pub(crate) fn year_start(year: i32) -> Result<i64, ExcelError> {
    clamped_serial(year, 1, 1)
}

/// Move a calendar date by whole months, keeping the day when it exists in
/// the target month and clamping it otherwise.
pub(crate) fn add_months(date: NaiveDate, months: i64) -> Result<NaiveDate, ExcelError> {
    let total = (i64::from(date.year()) * 12 + i64::from(date.month0())).saturating_add(months);
    let year = i32::try_from(total.div_euclid(12)).map_err(|_| SerialDateError::UnrepresentableDate)?;
    let month = total.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| SerialDateError::UnrepresentableDate.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_of_known_dates() {
        // 2021-01-01 was a Friday.
        assert_eq!(weekday_calc(44197, 0, 1), 6);
        assert!(!is_weekend(44197));
        assert!(is_weekend(44198));
        assert!(is_weekend(44199));
        // Excel thinks 1900-01-01 was a Sunday.
        assert_eq!(weekday_calc(1, 0, 1), 1);
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2021, 2).unwrap(), 28);
        assert_eq!(days_in_month(2024, 2).unwrap(), 29);
        assert_eq!(days_in_month(2021, 12).unwrap(), 31);
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
    }

    #[test]
    fn month_arithmetic_clamps() {
        let jan31 = NaiveDate::from_ymd_opt(2021, 1, 31).unwrap();
        assert_eq!(add_months(jan31, 1).unwrap(), NaiveDate::from_ymd_opt(2021, 2, 28).unwrap());
        assert_eq!(add_months(jan31, -2).unwrap(), NaiveDate::from_ymd_opt(2020, 11, 30).unwrap());
        assert_eq!(add_months(jan31, 13).unwrap(), NaiveDate::from_ymd_opt(2022, 2, 28).unwrap());
    }
}
