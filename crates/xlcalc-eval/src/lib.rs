pub mod args;
pub mod ast;
pub mod broadcast;
pub mod coercion;
pub mod function;
pub mod function_registry;
pub mod interpreter;
pub mod locale;
pub mod timezone;
pub mod traits;

pub mod builtins;

pub use xlcalc_common::{CellRef, ExcelError, ExcelErrorKind, LiteralValue, RangeRef};

pub use function::{AllowRange, FnCaps, FunctionDescriptor};
pub use function_registry::{FunctionRegistry, RegistryError, builtin_registry};
pub use interpreter::Interpreter;
pub use traits::{CalcValue, EvaluationContext, FunctionContext};

pub mod test_workbook;

#[cfg(test)]
mod tests;
