//! TODAY and NOW. Both read the context's clock and are volatile.

use xlcalc_common::{ExcelError, date_to_serial, datetime_to_serial};

use crate::args::adapt0;
use crate::function::{AllowRange, FnCaps};
use crate::function_registry::{FunctionRegistry, RegistryError};
use crate::traits::FunctionContext;

/// Current date from the evaluation clock.
///
/// # Remarks
/// - Volatile: recomputed on every evaluation.
fn today_fn(ctx: &dyn FunctionContext) -> Result<i64, ExcelError> {
    Ok(date_to_serial(&ctx.clock().today()))
}

fn now_fn(ctx: &dyn FunctionContext) -> Result<f64, ExcelError> {
    Ok(datetime_to_serial(&ctx.clock().now()))
}

pub fn register_builtins(reg: &mut FunctionRegistry) -> Result<(), RegistryError> {
    reg.register("TODAY", 0, Some(0), adapt0(today_fn), FnCaps::VOLATILE, AllowRange::None)?;
    reg.register("NOW", 0, Some(0), adapt0(now_fn), FnCaps::VOLATILE, AllowRange::None)?;
    Ok(())
}
