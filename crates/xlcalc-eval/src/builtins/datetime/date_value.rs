//! DATEVALUE and TIMEVALUE: date/time text read through the context locale.

use xlcalc_common::ExcelError;

use super::serial::check_serial;
use crate::args::adapt1;
use crate::function::{AllowRange, FnCaps};
use crate::function_registry::{FunctionRegistry, RegistryError};
use crate::traits::FunctionContext;

fn parse(ctx: &dyn FunctionContext, text: &str) -> Result<f64, ExcelError> {
    ctx.locale().parse_date_time(text).ok_or_else(|| {
        ExcelError::new_value().with_message(format!("{text:?} is not a recognised date or time"))
    })
}

/// Parses date text into a date serial.
///
/// # Remarks
/// - Numeric layouts follow the workbook locale's day/month/year order.
/// - Any time part in the text is parsed and then dropped.
/// - Unrecognised text returns `#VALUE!`.
///
/// # Examples
/// ```yaml,sandbox
/// title: "ISO date"
/// formula: '=DATEVALUE("2021-01-04")'
/// expected: 44200
/// ```
///
/// ```yaml,sandbox
/// title: "Month-name date with time"
/// formula: '=DATEVALUE("4 Jan 2021 18:00")'
/// expected: 44200
/// ```
fn datevalue_fn(ctx: &dyn FunctionContext, text: String) -> Result<i64, ExcelError> {
    check_serial(parse(ctx, &text)?.floor() as i64)
}

/// Parses time text into a day fraction.
///
/// # Remarks
/// - A leading date part is accepted and discarded.
///
/// # Examples
/// ```yaml,sandbox
/// title: "24-hour time"
/// formula: '=TIMEVALUE("18:00")'
/// expected: 0.75
/// ```
fn timevalue_fn(ctx: &dyn FunctionContext, text: String) -> Result<f64, ExcelError> {
    Ok(parse(ctx, &text)?.rem_euclid(1.0))
}

pub fn register_builtins(reg: &mut FunctionRegistry) -> Result<(), RegistryError> {
    let caps = FnCaps::PURE | FnCaps::SCALAR;
    reg.register("DATEVALUE", 1, Some(1), adapt1(datevalue_fn), caps, AllowRange::None)?;
    reg.register("TIMEVALUE", 1, Some(1), adapt1(timevalue_fn), caps, AllowRange::None)?;
    Ok(())
}
