use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use xlcalc_common::ExcelError;

use crate::function::{AllowRange, CalcFn, FnCaps, FunctionDescriptor};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("function {0} is already registered")]
    Duplicate(String),
    #[error("{name}: max_args {max} is below min_args {min}")]
    InvalidArity { name: String, min: usize, max: usize },
}

/// Name -> descriptor table. Names are case-insensitive.
#[derive(Default)]
pub struct FunctionRegistry {
    fns: FxHashMap<String, FunctionDescriptor>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &str,
        min_args: usize,
        max_args: Option<usize>,
        callable: CalcFn,
        caps: FnCaps,
        allow_range: AllowRange,
    ) -> Result<(), RegistryError> {
        let key = name.to_ascii_uppercase();
        if let Some(max) = max_args {
            if max < min_args {
                return Err(RegistryError::InvalidArity {
                    name: key,
                    min: min_args,
                    max,
                });
            }
        }
        if self.fns.contains_key(&key) {
            return Err(RegistryError::Duplicate(key));
        }
        let desc = FunctionDescriptor::new(&key, min_args, max_args, callable, caps, allow_range);
        self.fns.insert(key, desc);
        Ok(())
    }

    /// Unknown names are `#NAME?`. A leading `_xlfn.` prefix is ignored.
    pub fn resolve(&self, name: &str) -> Result<&FunctionDescriptor, ExcelError> {
        let upper = name.to_ascii_uppercase();
        let key = upper.strip_prefix("_XLFN.").unwrap_or(&upper);
        self.fns.get(key).ok_or_else(|| {
            ExcelError::new_name().with_message(format!("unknown function {name}"))
        })
    }

    pub fn len(&self) -> usize {
        self.fns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fns.is_empty()
    }
}

static BUILTINS: OnceCell<FunctionRegistry> = OnceCell::new();

/// The process-wide registry holding every built-in. Built on first use and
/// read-only afterwards.
pub fn builtin_registry() -> Result<&'static FunctionRegistry, RegistryError> {
    BUILTINS.get_or_try_init(|| {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("builtin_registry").entered();
        let mut reg = FunctionRegistry::new();
        crate::builtins::load_builtins(&mut reg)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(functions = reg.len(), "built-in registry ready");
        Ok(reg)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::adapt0;
    use xlcalc_common::ExcelErrorKind;

    fn constant() -> CalcFn {
        adapt0(|_| Ok(1.0))
    }

    #[test]
    fn rejects_duplicates_case_insensitively() {
        let mut reg = FunctionRegistry::new();
        reg.register("one", 0, Some(0), constant(), FnCaps::PURE, AllowRange::None)
            .unwrap();
        let dup = reg.register("ONE", 0, Some(0), constant(), FnCaps::PURE, AllowRange::None);
        assert_eq!(dup, Err(RegistryError::Duplicate("ONE".into())));
    }

    #[test]
    fn rejects_inverted_arity() {
        let mut reg = FunctionRegistry::new();
        let bad = reg.register("X", 3, Some(1), constant(), FnCaps::PURE, AllowRange::None);
        assert!(matches!(bad, Err(RegistryError::InvalidArity { .. })));
        assert!(reg.is_empty());
    }

    #[test]
    fn resolve_unknown_is_name_error() {
        let reg = FunctionRegistry::new();
        assert_eq!(reg.resolve("NOPE").unwrap_err().kind, ExcelErrorKind::Name);
    }

    #[test]
    fn builtins_are_registered_once() {
        let a = builtin_registry().unwrap();
        let b = builtin_registry().unwrap();
        assert!(std::ptr::eq(a, b));
        for name in ["DATE", "DATEDIF", "DAYS360", "YEARFRAC", "NETWORKDAYS", "WORKDAY", "WEEKDAY", "YEAR", "ISOWEEKNUM"] {
            assert!(a.resolve(name).is_ok(), "{name} missing");
        }
        assert_eq!(a.resolve("_xlfn.isoweeknum").unwrap().name, "ISOWEEKNUM");
        assert!(a.resolve("today").unwrap().is_volatile());
    }
}
