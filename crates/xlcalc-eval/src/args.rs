//! Typed argument adapters.
//!
//! A built-in is written as an ordinary Rust function with typed parameters,
//! e.g. `fn year(ctx, date: SerialDate) -> Result<i64, ExcelError>`. The
//! `adaptN` helpers wrap it into the registry's uniform [`CalcFn`], converting
//! each raw [`CalcValue`] through [`FromArg`] left to right and stopping at
//! the first error.

use std::sync::Arc;

use smallvec::SmallVec;
use xlcalc_common::{ExcelError, LiteralValue};

use crate::coercion::{
    implicit_intersection, sanitize_numeric, to_datetime_serial, to_logical, to_number,
    to_serial_date, to_text,
};
use crate::function::CalcFn;
use crate::traits::{CalcValue, FunctionContext};

/// Conversion of one raw argument into a native parameter type.
pub trait FromArg: Sized {
    fn from_arg(arg: &CalcValue, ctx: &dyn FunctionContext) -> Result<Self, ExcelError>;

    /// Value used when the caller supplied fewer arguments than the function
    /// declares. Only optional parameter types have one.
    fn missing() -> Result<Self, ExcelError> {
        Err(ExcelError::new_value().with_message("required argument is missing"))
    }
}

/// Reduce an argument to the one scalar a non-range parameter reads.
pub fn scalar_arg(arg: &CalcValue, ctx: &dyn FunctionContext) -> Result<LiteralValue, ExcelError> {
    match arg {
        CalcValue::Scalar(v) => Ok(v.clone()),
        CalcValue::Reference(r) => {
            let cell = implicit_intersection(r, ctx.current_cell())?;
            ctx.resolve_cell(&cell)
        }
        CalcValue::Array(rows) => match rows.as_slice() {
            [row] if row.len() == 1 => Ok(row[0].clone()),
            _ => Err(ExcelError::new_value().with_message("expected a single value, got an array")),
        },
    }
}

/// Whole serial date; logical input is `#VALUE!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SerialDate(pub i64);

/// Serial date-time keeping the fraction of a day.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DateTimeSerial(pub f64);

impl FromArg for LiteralValue {
    fn from_arg(arg: &CalcValue, ctx: &dyn FunctionContext) -> Result<Self, ExcelError> {
        scalar_arg(arg, ctx)?.into_result()
    }
}

impl FromArg for f64 {
    fn from_arg(arg: &CalcValue, ctx: &dyn FunctionContext) -> Result<Self, ExcelError> {
        let v = scalar_arg(arg, ctx)?;
        sanitize_numeric(to_number(&v, &ctx.locale())?)
    }
}

/// Truncates toward zero.
impl FromArg for i64 {
    fn from_arg(arg: &CalcValue, ctx: &dyn FunctionContext) -> Result<Self, ExcelError> {
        Ok(f64::from_arg(arg, ctx)?.trunc() as i64)
    }
}

impl FromArg for String {
    fn from_arg(arg: &CalcValue, ctx: &dyn FunctionContext) -> Result<Self, ExcelError> {
        to_text(&scalar_arg(arg, ctx)?)
    }
}

impl FromArg for bool {
    fn from_arg(arg: &CalcValue, ctx: &dyn FunctionContext) -> Result<Self, ExcelError> {
        to_logical(&scalar_arg(arg, ctx)?)
    }
}

/// Range pass-through. Only a scalar error value is rejected here; the body
/// walks the rest with [`FunctionContext::non_blank_values`].
impl FromArg for CalcValue {
    fn from_arg(arg: &CalcValue, _ctx: &dyn FunctionContext) -> Result<Self, ExcelError> {
        match arg.as_error() {
            Some(e) => Err(e.clone()),
            None => Ok(arg.clone()),
        }
    }
}

impl FromArg for SerialDate {
    fn from_arg(arg: &CalcValue, ctx: &dyn FunctionContext) -> Result<Self, ExcelError> {
        let v = scalar_arg(arg, ctx)?;
        to_serial_date(&v, &ctx.locale(), false).map(SerialDate)
    }
}

impl FromArg for DateTimeSerial {
    fn from_arg(arg: &CalcValue, ctx: &dyn FunctionContext) -> Result<Self, ExcelError> {
        let v = scalar_arg(arg, ctx)?;
        to_datetime_serial(&v, &ctx.locale()).map(DateTimeSerial)
    }
}

/// Omitted or blank is `None`.
impl<T: FromArg> FromArg for Option<T> {
    fn from_arg(arg: &CalcValue, ctx: &dyn FunctionContext) -> Result<Self, ExcelError> {
        if arg.is_missing() {
            return Ok(None);
        }
        T::from_arg(arg, ctx).map(Some)
    }

    fn missing() -> Result<Self, ExcelError> {
        Ok(None)
    }
}

#[inline]
fn arg_at<T: FromArg>(
    args: &[CalcValue],
    idx: usize,
    ctx: &dyn FunctionContext,
) -> Result<T, ExcelError> {
    match args.get(idx) {
        Some(a) => T::from_arg(a, ctx),
        None => T::missing(),
    }
}

macro_rules! define_adapter {
    ($(#[$doc:meta])* $name:ident; $($v:ident : $T:ident @ $idx:tt),*) => {
        $(#[$doc])*
        pub fn $name<$($T,)* R, F>(f: F) -> CalcFn
        where
            $($T: FromArg + 'static,)*
            R: Into<CalcValue> + 'static,
            F: Fn(&dyn FunctionContext $(, $T)*) -> Result<R, ExcelError> + Send + Sync + 'static,
        {
            Arc::new(move |ctx: &dyn FunctionContext, args: &[CalcValue]| -> Result<CalcValue, ExcelError> {
                $( let $v = arg_at::<$T>(args, $idx, ctx)?; )*
                f(ctx $(, $v)*).map(Into::into)
            })
        }
    };
}

define_adapter!(
    /// No parameters (`TODAY()`).
    adapt0;
);
define_adapter!(adapt1; a: A @ 0);
define_adapter!(adapt2; a: A @ 0, b: B @ 1);
define_adapter!(adapt3; a: A @ 0, b: B @ 1, c: C @ 2);

/// Fill the final parameter with `default` when the caller stopped one
/// argument short of `arity`.
pub fn adapt_last_optional(arity: usize, default: CalcValue, inner: CalcFn) -> CalcFn {
    Arc::new(move |ctx: &dyn FunctionContext, args: &[CalcValue]| -> Result<CalcValue, ExcelError> {
        if args.len() + 1 == arity {
            let mut full: SmallVec<[CalcValue; 4]> = args.iter().cloned().collect();
            full.push(default.clone());
            inner(ctx, &full)
        } else {
            inner(ctx, args)
        }
    })
}
