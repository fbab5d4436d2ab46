//! Centralised coercion and comparison rules for scalar values.
//!
//! Every function funnels its scalar arguments through here so that text,
//! logical and blank inputs convert the same way everywhere. An error value
//! is never converted: it comes back as `Err` unchanged.

use std::cmp::Ordering;

use xlcalc_common::{CellRef, ExcelError, LiteralValue, MAX_SERIAL_DATE, RangeRef, format_general};

use crate::locale::Locale;

/// Numeric view of a scalar. Text goes through the locale as a number first
/// and then as a date/time.
pub fn to_number(v: &LiteralValue, locale: &Locale) -> Result<f64, ExcelError> {
    match v {
        LiteralValue::Number(n) => Ok(*n),
        LiteralValue::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        LiteralValue::Empty => Ok(0.0),
        LiteralValue::Text(s) => locale
            .parse_number(s)
            .or_else(|| locale.parse_date_time(s))
            .ok_or_else(|| {
                ExcelError::new_value().with_message(format!("cannot convert {s:?} to a number"))
            }),
        LiteralValue::Error(e) => Err(e.clone()),
    }
}

pub fn to_text(v: &LiteralValue) -> Result<String, ExcelError> {
    match v {
        LiteralValue::Text(s) => Ok(s.clone()),
        LiteralValue::Number(n) => Ok(format_general(*n)),
        LiteralValue::Boolean(true) => Ok("TRUE".to_string()),
        LiteralValue::Boolean(false) => Ok("FALSE".to_string()),
        LiteralValue::Empty => Ok(String::new()),
        LiteralValue::Error(e) => Err(e.clone()),
    }
}

pub fn to_logical(v: &LiteralValue) -> Result<bool, ExcelError> {
    match v {
        LiteralValue::Boolean(b) => Ok(*b),
        LiteralValue::Number(n) => Ok(*n != 0.0),
        LiteralValue::Empty => Ok(false),
        LiteralValue::Text(s) if s.eq_ignore_ascii_case("TRUE") => Ok(true),
        LiteralValue::Text(s) if s.eq_ignore_ascii_case("FALSE") => Ok(false),
        LiteralValue::Text(s) => {
            Err(ExcelError::new_value().with_message(format!("{s:?} is not a logical value")))
        }
        LiteralValue::Error(e) => Err(e.clone()),
    }
}

/// NaN and infinities become `#NUM!`.
pub fn sanitize_numeric(n: f64) -> Result<f64, ExcelError> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(ExcelError::new_num())
    }
}

fn check_serial_range(n: f64) -> Result<f64, ExcelError> {
    if n.is_nan() || !(0.0..=MAX_SERIAL_DATE as f64).contains(&n) {
        return Err(ExcelError::new_num().with_message(format!(
            "{} is outside the date range 0..={MAX_SERIAL_DATE}",
            format_general(n)
        )));
    }
    Ok(n)
}

/// Whole serial date of a date argument. Logical values are `#VALUE!` unless
/// `accept_logical`; values outside `[0, 2958465]` are `#NUM!`.
pub fn to_serial_date(
    v: &LiteralValue,
    locale: &Locale,
    accept_logical: bool,
) -> Result<i64, ExcelError> {
    if v.is_logical() && !accept_logical {
        return Err(ExcelError::new_value().with_message("a logical value is not a date"));
    }
    let n = check_serial_range(to_number(v, locale)?)?;
    Ok(n.trunc() as i64)
}

/// Like [`to_serial_date`] but keeps the time-of-day fraction.
pub fn to_datetime_serial(v: &LiteralValue, locale: &Locale) -> Result<f64, ExcelError> {
    if v.is_logical() {
        return Err(ExcelError::new_value().with_message("a logical value is not a date"));
    }
    check_serial_range(to_number(v, locale)?)
}

/// Implicit intersection: the single cell of `range` that a scalar parameter
/// reads when the formula lives in `current`. A column vector picks the
/// current row, a row vector the current column.
pub fn implicit_intersection(
    range: &RangeRef,
    current: Option<&CellRef>,
) -> Result<CellRef, ExcelError> {
    if range.is_single_cell() {
        return Ok(range.top_left());
    }
    let miss = || ExcelError::new_value().with_message(format!("no implicit intersection with {range}"));
    let cur = current.ok_or_else(miss)?;
    if let (Some(a), Some(b)) = (&range.sheet, &cur.sheet) {
        if a != b {
            return Err(miss());
        }
    }
    let (row, col) = if range.width() == 1 && (range.start_row..=range.end_row).contains(&cur.row) {
        (cur.row, range.start_col)
    } else if range.height() == 1 && (range.start_col..=range.end_col).contains(&cur.col) {
        (range.start_row, cur.col)
    } else {
        return Err(miss());
    };
    Ok(CellRef {
        sheet: range.sheet.clone(),
        row,
        col,
    })
}

fn type_rank(v: &LiteralValue) -> u8 {
    match v {
        LiteralValue::Number(_) | LiteralValue::Empty => 0,
        LiteralValue::Text(_) => 1,
        LiteralValue::Boolean(_) => 2,
        LiteralValue::Error(_) => 3,
    }
}

/// Spreadsheet ordering used by the comparison operators: numbers sort before
/// text, text before logicals. A blank compares as `0`, `""` or `FALSE`
/// depending on the other side. Text compares case-insensitively.
pub fn compare_values(a: &LiteralValue, b: &LiteralValue) -> Result<Ordering, ExcelError> {
    use LiteralValue::*;
    if let Error(e) = a {
        return Err(e.clone());
    }
    if let Error(e) = b {
        return Err(e.clone());
    }
    let ord = match (a, b) {
        (Empty, Empty) => Ordering::Equal,
        (Number(x), Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Number(x), Empty) => x.partial_cmp(&0.0).unwrap_or(Ordering::Equal),
        (Empty, Number(y)) => 0.0_f64.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Text(x), Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        (Text(x), Empty) => x.len().cmp(&0),
        (Empty, Text(y)) => 0.cmp(&y.len()),
        (Boolean(x), Boolean(y)) => x.cmp(y),
        (Boolean(x), Empty) => x.cmp(&false),
        (Empty, Boolean(y)) => false.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    };
    Ok(ord)
}
