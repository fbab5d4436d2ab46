pub mod datetime;

use crate::function_registry::{FunctionRegistry, RegistryError};

pub fn load_builtins(reg: &mut FunctionRegistry) -> Result<(), RegistryError> {
    datetime::register_builtins(reg)?;
    Ok(())
}
