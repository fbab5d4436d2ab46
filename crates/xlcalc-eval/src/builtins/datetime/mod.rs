//! Date and time functions over Excel serial dates (1900 system).
//! Functions implemented: DATE, TIME, TODAY, NOW, YEAR, MONTH, DAY, HOUR,
//! MINUTE, SECOND, DAYS, DAYS360, YEARFRAC, DATEVALUE, TIMEVALUE, EDATE,
//! EOMONTH, WEEKDAY, WEEKNUM, ISOWEEKNUM, DATEDIF, NETWORKDAYS, WORKDAY

mod date_parts;
mod date_time;
mod date_value;
mod edate_eomonth;
mod serial;
mod today_now;
mod weekday_workday;

pub use date_parts::{days360, yearfrac};
pub use date_time::{date_serial, time_fraction};
pub use edate_eomonth::{edate, eomonth};
pub use weekday_workday::{business_days_until, datedif, iso_week_number, week_number, weekday, workday};

use crate::function_registry::{FunctionRegistry, RegistryError};

pub fn register_builtins(reg: &mut FunctionRegistry) -> Result<(), RegistryError> {
    date_time::register_builtins(reg)?;
    today_now::register_builtins(reg)?;
    date_parts::register_builtins(reg)?;
    date_value::register_builtins(reg)?;
    edate_eomonth::register_builtins(reg)?;
    weekday_workday::register_builtins(reg)?;
    Ok(())
}
