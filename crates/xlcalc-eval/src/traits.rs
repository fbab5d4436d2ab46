//! Core traits: ranges, the host-facing evaluation context and the context a
//! function body sees.

use std::borrow::Cow;
use std::fmt::Debug;

use xlcalc_common::{CellRef, ExcelError, LiteralValue, RangeRef};

use crate::locale::Locale;
use crate::timezone::ClockProvider;

/* ───────────────────────────── Range ───────────────────────────── */

pub trait Range: Debug + Send + Sync {
    /// 0-based offsets from the range's top-left cell.
    fn get(&self, row: usize, col: usize) -> Result<LiteralValue, ExcelError>;
    fn dimensions(&self) -> (usize, usize);

    fn materialise(&self) -> Result<Cow<'_, [Vec<LiteralValue>]>, ExcelError> {
        let (rows, cols) = self.dimensions();
        let mut out = Vec::with_capacity(rows);
        for r in 0..rows {
            let row = (0..cols)
                .map(|c| self.get(r, c))
                .collect::<Result<Vec<_>, _>>()?;
            out.push(row);
        }
        Ok(Cow::Owned(out))
    }

    /// Cells in row-major order.
    fn iter_cells<'a>(&'a self) -> Box<dyn Iterator<Item = Result<LiteralValue, ExcelError>> + 'a> {
        let (rows, cols) = self.dimensions();
        Box::new((0..rows).flat_map(move |r| (0..cols).map(move |c| self.get(r, c))))
    }
}

/* simple Vec-backed range */
#[derive(Debug, Clone, Default)]
pub struct InMemoryRange {
    data: Vec<Vec<LiteralValue>>,
}

impl InMemoryRange {
    pub fn new(d: Vec<Vec<LiteralValue>>) -> Self {
        Self { data: d }
    }
}

impl Range for InMemoryRange {
    fn get(&self, r: usize, c: usize) -> Result<LiteralValue, ExcelError> {
        Ok(self
            .data
            .get(r)
            .and_then(|row| row.get(c))
            .cloned()
            .unwrap_or(LiteralValue::Empty))
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.data.len(), self.data.first().map_or(0, |r| r.len()))
    }

    fn materialise(&self) -> Result<Cow<'_, [Vec<LiteralValue>]>, ExcelError> {
        Ok(Cow::Borrowed(&self.data))
    }
}

/* ───────────────────────────── Values ───────────────────────────── */

/// What an argument or a function result can be.
#[derive(Debug, Clone, PartialEq)]
pub enum CalcValue {
    Scalar(LiteralValue),
    /// Row-major, rectangular.
    Array(Vec<Vec<LiteralValue>>),
    /// An unreduced reference; range-accepting parameters receive these.
    Reference(RangeRef),
}

impl CalcValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CalcValue::Scalar(LiteralValue::Empty))
    }

    pub fn as_error(&self) -> Option<&ExcelError> {
        match self {
            CalcValue::Scalar(v) => v.as_error(),
            _ => None,
        }
    }

    /// Collapse to a single literal: arrays give their top-left element and
    /// references are `#VALUE!` (they must be resolved through a context).
    pub fn into_literal(self) -> LiteralValue {
        match self {
            CalcValue::Scalar(v) => v,
            CalcValue::Array(rows) => rows
                .into_iter()
                .next()
                .and_then(|r| r.into_iter().next())
                .unwrap_or(LiteralValue::Empty),
            CalcValue::Reference(_) => {
                LiteralValue::Error(ExcelError::new_value().with_message("unresolved reference"))
            }
        }
    }
}

impl From<LiteralValue> for CalcValue {
    fn from(v: LiteralValue) -> Self {
        CalcValue::Scalar(v)
    }
}

impl From<f64> for CalcValue {
    fn from(n: f64) -> Self {
        CalcValue::Scalar(LiteralValue::Number(n))
    }
}

impl From<i64> for CalcValue {
    fn from(n: i64) -> Self {
        CalcValue::Scalar(LiteralValue::from(n))
    }
}

impl From<bool> for CalcValue {
    fn from(b: bool) -> Self {
        CalcValue::Scalar(LiteralValue::Boolean(b))
    }
}

impl From<String> for CalcValue {
    fn from(s: String) -> Self {
        CalcValue::Scalar(LiteralValue::Text(s))
    }
}

impl From<RangeRef> for CalcValue {
    fn from(r: RangeRef) -> Self {
        CalcValue::Reference(r)
    }
}

impl From<Vec<Vec<LiteralValue>>> for CalcValue {
    fn from(rows: Vec<Vec<LiteralValue>>) -> Self {
        CalcValue::Array(rows)
    }
}

/* ─────────────────────── Evaluation context ─────────────────────── */

/// Everything the engine needs from its host workbook.
pub trait EvaluationContext: Send + Sync {
    /// Blank cells resolve to `LiteralValue::Empty`; a missing sheet is `#REF!`.
    fn resolve_cell(&self, cell: &CellRef) -> Result<LiteralValue, ExcelError>;

    fn resolve_range(&self, range: &RangeRef) -> Result<Box<dyn Range>, ExcelError> {
        let mut rows = Vec::with_capacity(range.height() as usize);
        let mut row = Vec::with_capacity(range.width() as usize);
        for cell in range.cells() {
            row.push(self.resolve_cell(&cell)?);
            if row.len() == range.width() as usize {
                rows.push(std::mem::take(&mut row));
            }
        }
        Ok(Box::new(InMemoryRange::new(rows)))
    }

    fn locale(&self) -> Locale {
        Locale::invariant()
    }

    #[cfg(feature = "system-clock")]
    fn clock(&self) -> &dyn ClockProvider {
        static SYSTEM: crate::timezone::SystemClock = crate::timezone::SystemClock {
            tz: crate::timezone::TimeZoneSpec::Local,
        };
        &SYSTEM
    }

    #[cfg(not(feature = "system-clock"))]
    fn clock(&self) -> &dyn ClockProvider;
}

/// The view a function body gets of its caller.
pub trait FunctionContext {
    fn locale(&self) -> Locale;
    fn clock(&self) -> &dyn ClockProvider;
    fn resolve_cell(&self, cell: &CellRef) -> Result<LiteralValue, ExcelError>;
    fn resolve_range(&self, range: &RangeRef) -> Result<Box<dyn Range>, ExcelError>;

    /// Cell holding the formula being evaluated, if any.
    fn current_cell(&self) -> Option<&CellRef>;

    /// Every non-blank value of a scalar, array or reference, row-major.
    /// Error values are yielded as `Ok(LiteralValue::Error(..))`; `Err` means
    /// the reference itself could not be read.
    fn non_blank_values<'a>(
        &'a self,
        value: &'a CalcValue,
    ) -> Box<dyn Iterator<Item = Result<LiteralValue, ExcelError>> + 'a> {
        match value {
            CalcValue::Scalar(v) => Box::new(
                std::iter::once(v)
                    .filter(|v| !v.is_blank())
                    .cloned()
                    .map(Ok),
            ),
            CalcValue::Array(rows) => Box::new(
                rows.iter()
                    .flatten()
                    .filter(|v| !v.is_blank())
                    .cloned()
                    .map(Ok),
            ),
            CalcValue::Reference(r) => match self.resolve_range(r) {
                Ok(range) => {
                    let cells: Vec<_> = range
                        .iter_cells()
                        .filter(|v| !matches!(v, Ok(LiteralValue::Empty)))
                        .collect();
                    Box::new(cells.into_iter())
                }
                Err(e) => Box::new(std::iter::once(Err(e))),
            },
        }
    }
}

pub struct DefaultFunctionContext<'a> {
    ctx: &'a dyn EvaluationContext,
    current: Option<&'a CellRef>,
}

impl<'a> DefaultFunctionContext<'a> {
    pub fn new(ctx: &'a dyn EvaluationContext, current: Option<&'a CellRef>) -> Self {
        Self { ctx, current }
    }
}

impl FunctionContext for DefaultFunctionContext<'_> {
    fn locale(&self) -> Locale {
        self.ctx.locale()
    }

    fn clock(&self) -> &dyn ClockProvider {
        self.ctx.clock()
    }

    fn resolve_cell(&self, cell: &CellRef) -> Result<LiteralValue, ExcelError> {
        self.ctx.resolve_cell(cell)
    }

    fn resolve_range(&self, range: &RangeRef) -> Result<Box<dyn Range>, ExcelError> {
        self.ctx.resolve_range(range)
    }

    fn current_cell(&self) -> Option<&CellRef> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_workbook::TestWorkbook;

    #[test]
    fn non_blank_values_skips_blanks_in_reading_order() {
        let wb = TestWorkbook::new()
            .with_cell("Sheet1", 1, 1, LiteralValue::Number(1.0))
            .with_cell("Sheet1", 2, 2, LiteralValue::Text("x".into()));
        let ctx = DefaultFunctionContext::new(&wb, None);
        let range = CalcValue::Reference(RangeRef::new(1, 1, 2, 2).unwrap());
        let got: Vec<_> = ctx.non_blank_values(&range).collect();
        assert_eq!(
            got,
            vec![Ok(LiteralValue::Number(1.0)), Ok(LiteralValue::Text("x".into()))]
        );

        let scalar = CalcValue::Scalar(LiteralValue::Empty);
        assert_eq!(ctx.non_blank_values(&scalar).count(), 0);
    }

    #[test]
    fn unknown_sheet_surfaces_as_err() {
        let wb = TestWorkbook::new();
        let ctx = DefaultFunctionContext::new(&wb, None);
        let range = CalcValue::Reference(RangeRef::new(1, 1, 1, 1).unwrap().on_sheet("Nope"));
        let got: Vec<_> = ctx.non_blank_values(&range).collect();
        assert_eq!(got.len(), 1);
        assert!(got[0].is_err());
    }

    #[test]
    fn in_memory_range_pads_with_blanks() {
        let r = InMemoryRange::new(vec![vec![LiteralValue::Number(1.0)]]);
        assert_eq!(r.dimensions(), (1, 1));
        assert_eq!(r.get(5, 5).unwrap(), LiteralValue::Empty);
    }
}
