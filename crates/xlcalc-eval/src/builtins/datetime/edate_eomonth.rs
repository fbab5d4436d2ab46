//! EDATE and EOMONTH functions

use chrono::{Datelike, NaiveDate};
use xlcalc_common::{ExcelError, date_to_serial, serial_to_date};

use super::serial::{add_months, check_serial, days_in_month};
use crate::args::{SerialDate, adapt2};
use crate::function::{AllowRange, FnCaps};
use crate::function_registry::{FunctionRegistry, RegistryError};
use crate::traits::FunctionContext;

/// Same day `months` later, clamped to the target month's length.
pub fn edate(start: i64, months: i64) -> Result<i64, ExcelError> {
    let date = add_months(serial_to_date(start)?, months)?;
    check_serial(date_to_serial(&date))
}

/// Last day of the month `months` after `start`.
pub fn eomonth(start: i64, months: i64) -> Result<i64, ExcelError> {
    let date = add_months(serial_to_date(start)?, months)?;
    let last = days_in_month(date.year(), date.month())?;
    let end = NaiveDate::from_ymd_opt(date.year(), date.month(), last).ok_or_else(ExcelError::new_num)?;
    check_serial(date_to_serial(&end))
}

/// Shifts a date by whole months, keeping the day where it exists.
///
/// # Remarks
/// - `months` is truncated toward zero.
/// - A day past the end of the target month is clamped to its last day.
///
/// # Examples
/// ```yaml,sandbox
/// title: "Clamped to February"
/// formula: '=EDATE(DATE(2021,1,31),1)'
/// expected: 44255
/// ```
fn edate_fn(_: &dyn FunctionContext, start: SerialDate, months: i64) -> Result<i64, ExcelError> {
    edate(start.0, months)
}

/// Last day of the month `months` away from `start`.
///
/// # Examples
/// ```yaml,sandbox
/// title: "Fractional months truncate"
/// formula: '=EOMONTH(DATE(2021,1,15),1.5)'
/// expected: 44255
/// ```
fn eomonth_fn(_: &dyn FunctionContext, start: SerialDate, months: i64) -> Result<i64, ExcelError> {
    eomonth(start.0, months)
}

pub fn register_builtins(reg: &mut FunctionRegistry) -> Result<(), RegistryError> {
    let caps = FnCaps::PURE | FnCaps::SCALAR;
    reg.register("EDATE", 2, Some(2), adapt2(edate_fn), caps, AllowRange::None)?;
    reg.register("EOMONTH", 2, Some(2), adapt2(eomonth_fn), caps, AllowRange::None)?;
    Ok(())
}
