//! Excel-style error values.
//!
//! - **`ExcelErrorKind`** : the canonical set of Excel error codes
//! - **`ExcelError`**     : a kind plus an optional human explanation
//!
//! Errors are ordinary values. A function that fails returns
//! `Err(ExcelError)` (or a `LiteralValue::Error`) and every caller forwards
//! it unchanged; nothing here unwinds.

use std::{error::Error, fmt};

use crate::LiteralValue;

/// All recognised Excel error codes.
///
/// **Note:** names are CamelCase (idiomatic Rust) while `Display`
/// renders them exactly as Excel shows them (`#DIV/0!`, …).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ExcelErrorKind {
    /// `#NULL!` – empty intersection of two ranges.
    Null,
    /// `#REF!` – reference to a cell that does not exist.
    Ref,
    /// `#NAME?` – unknown function or name.
    Name,
    /// `#VALUE!` – argument of an incompatible type.
    Value,
    /// `#DIV/0!`
    Div,
    /// `#N/A`
    Na,
    /// `#NUM!` – number outside the domain of the function.
    Num,
    /// `#SPILL!`
    Spill,
    /// `#CALC!`
    Calc,
}

impl fmt::Display for ExcelErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExcelErrorKind {
    pub const ALL: [ExcelErrorKind; 9] = [
        Self::Null,
        Self::Ref,
        Self::Name,
        Self::Value,
        Self::Div,
        Self::Na,
        Self::Num,
        Self::Spill,
        Self::Calc,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "#NULL!",
            Self::Ref => "#REF!",
            Self::Name => "#NAME?",
            Self::Value => "#VALUE!",
            Self::Div => "#DIV/0!",
            Self::Na => "#N/A",
            Self::Num => "#NUM!",
            Self::Spill => "#SPILL!",
            Self::Calc => "#CALC!",
        }
    }

    /// Parse the display form (`#N/A`, `#value!`, …). Case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
    }
}

/// The single error struct the engine passes around.
///
/// The `message` is diagnostic only; two errors of the same kind render the
/// same way to the host regardless of their messages.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExcelError {
    pub kind: ExcelErrorKind,
    pub message: Option<String>,
}

/* ───────────────────── Constructors & helpers ─────────────────────── */

impl From<ExcelErrorKind> for ExcelError {
    fn from(kind: ExcelErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }
}

impl ExcelError {
    /// Basic constructor (no message).
    pub fn new(kind: ExcelErrorKind) -> Self {
        kind.into()
    }

    pub fn new_value() -> Self {
        Self::new(ExcelErrorKind::Value)
    }

    pub fn new_num() -> Self {
        Self::new(ExcelErrorKind::Num)
    }

    pub fn new_name() -> Self {
        Self::new(ExcelErrorKind::Name)
    }

    pub fn new_ref() -> Self {
        Self::new(ExcelErrorKind::Ref)
    }

    pub fn new_div() -> Self {
        Self::new(ExcelErrorKind::Div)
    }

    /// Attach a human-readable explanation.
    pub fn with_message<S: Into<String>>(mut self, msg: S) -> Self {
        self.message = Some(msg.into());
        self
    }

    pub fn from_error_string(s: &str) -> Option<Self> {
        ExcelErrorKind::parse(s).map(Self::new)
    }
}

/* ───────────────────────── Display / Error ────────────────────────── */

impl fmt::Display for ExcelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ref msg) = self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl Error for ExcelError {}

impl From<ExcelError> for LiteralValue {
    fn from(error: ExcelError) -> Self {
        LiteralValue::Error(error)
    }
}

impl PartialEq<str> for ExcelErrorKind {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ExcelError {
    fn eq(&self, other: &&str) -> bool {
        self.kind.as_str() == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_excel() {
        assert_eq!(ExcelErrorKind::Div.to_string(), "#DIV/0!");
        assert_eq!(ExcelErrorKind::Name.to_string(), "#NAME?");
        assert_eq!(
            ExcelError::new_num().with_message("out of range").to_string(),
            "#NUM!: out of range"
        );
    }

    #[test]
    fn parse_roundtrips_every_kind() {
        for kind in ExcelErrorKind::ALL {
            assert_eq!(ExcelErrorKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ExcelErrorKind::parse(" #n/a "), Some(ExcelErrorKind::Na));
        assert_eq!(ExcelErrorKind::parse("#BOGUS!"), None);
    }

    #[test]
    fn compares_against_display_string() {
        assert!(ExcelError::new_value().with_message("x") == "#VALUE!");
    }
}
