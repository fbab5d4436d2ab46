//! Function descriptors and their capability flags.

use std::fmt;
use std::sync::Arc;

use xlcalc_common::ExcelError;

use crate::traits::{CalcValue, FunctionContext};

bitflags::bitflags! {
    /// Describes the capabilities and properties of a function.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct FnCaps: u8 {
        /// Same output for the same input, no side effects.
        const PURE     = 0b0000_0001;
        /// Output can change with identical inputs (`TODAY()`, `NOW()`).
        const VOLATILE = 0b0000_0010;
        /// Applied element-wise when an array reaches a scalar parameter.
        const SCALAR   = 0b0000_0100;
        /// At least one parameter takes a whole range.
        const RANGE    = 0b0000_1000;
    }
}

/// Which argument positions receive unreduced references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllowRange {
    #[default]
    None,
    All,
    Only(&'static [usize]),
    Except(&'static [usize]),
}

impl AllowRange {
    pub fn allows(&self, idx: usize) -> bool {
        match self {
            AllowRange::None => false,
            AllowRange::All => true,
            AllowRange::Only(ix) => ix.contains(&idx),
            AllowRange::Except(ix) => !ix.contains(&idx),
        }
    }
}

/// The uniform calling convention every registered function is adapted to.
pub type CalcFn =
    Arc<dyn Fn(&dyn FunctionContext, &[CalcValue]) -> Result<CalcValue, ExcelError> + Send + Sync>;

#[derive(Clone)]
pub struct FunctionDescriptor {
    /// Upper-case.
    pub name: String,
    pub min_args: usize,
    /// `None` = unbounded.
    pub max_args: Option<usize>,
    pub caps: FnCaps,
    pub allow_range: AllowRange,
    callable: CalcFn,
}

impl FunctionDescriptor {
    pub fn new(
        name: &str,
        min_args: usize,
        max_args: Option<usize>,
        callable: CalcFn,
        caps: FnCaps,
        allow_range: AllowRange,
    ) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            min_args,
            max_args,
            caps,
            allow_range,
            callable,
        }
    }

    pub fn is_volatile(&self) -> bool {
        self.caps.contains(FnCaps::VOLATILE)
    }

    pub fn check_arity(&self, argc: usize) -> Result<(), ExcelError> {
        let too_many = self.max_args.is_some_and(|max| argc > max);
        if argc < self.min_args || too_many {
            let expected = match self.max_args {
                Some(max) if max == self.min_args => format!("{max}"),
                Some(max) => format!("{}..={max}", self.min_args),
                None => format!("at least {}", self.min_args),
            };
            return Err(ExcelError::new_value().with_message(format!(
                "{} expects {expected} arguments, got {argc}",
                self.name
            )));
        }
        Ok(())
    }

    /// Arity check, then the adapted body.
    pub fn call(
        &self,
        ctx: &dyn FunctionContext,
        args: &[CalcValue],
    ) -> Result<CalcValue, ExcelError> {
        self.check_arity(args.len())?;
        (self.callable)(ctx, args)
    }
}

impl fmt::Debug for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDescriptor")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .field("caps", &self.caps)
            .field("allow_range", &self.allow_range)
            .finish_non_exhaustive()
    }
}
