//! Lightweight in-memory workbook for unit/prop tests and embedding demos.
use std::collections::HashMap;

use chrono::NaiveDateTime;
use xlcalc_common::{CellRef, ExcelError, LiteralValue};

use crate::function_registry::{FunctionRegistry, RegistryError, builtin_registry};
use crate::interpreter::Interpreter;
use crate::locale::Locale;
use crate::timezone::{ClockProvider, FixedClock};
use crate::traits::EvaluationContext;

type V = LiteralValue;
type CellKey = (u32, u32); // 1-based (row, col)

pub const DEFAULT_SHEET: &str = "Sheet1";

#[derive(Default, Clone)]
struct Sheet {
    cells: HashMap<CellKey, V>,
}

pub struct TestWorkbook {
    sheets: HashMap<String, Sheet>,
    locale: Locale,
    clock: Box<dyn ClockProvider>,
}

impl Default for TestWorkbook {
    fn default() -> Self {
        let mut sheets = HashMap::new();
        sheets.insert(DEFAULT_SHEET.to_string(), Sheet::default());
        Self {
            sheets,
            locale: Locale::invariant(),
            clock: default_clock(),
        }
    }
}

#[cfg(feature = "system-clock")]
fn default_clock() -> Box<dyn ClockProvider> {
    Box::new(crate::timezone::SystemClock::default())
}

#[cfg(not(feature = "system-clock"))]
fn default_clock() -> Box<dyn ClockProvider> {
    Box::new(FixedClock(NaiveDateTime::default()))
}

impl TestWorkbook {
    /* ─────────────── constructors ─────────────── */
    pub fn new() -> Self {
        Self::default()
    }

    /* ─────────────── cell helpers ─────────────── */
    pub fn with_cell<S: Into<String>>(mut self, sheet: S, row: u32, col: u32, v: V) -> Self {
        let sh = self.sheets.entry(sheet.into()).or_default();
        sh.cells.insert((row, col), v);
        self
    }

    pub fn with_range<S: Into<String>>(
        mut self,
        sheet: S,
        row: u32,
        col: u32,
        data: Vec<Vec<V>>,
    ) -> Self {
        let sh = self.sheets.entry(sheet.into()).or_default();
        for (r_off, r) in data.into_iter().enumerate() {
            for (c_off, v) in r.into_iter().enumerate() {
                sh.cells.insert((row + r_off as u32, col + c_off as u32), v);
            }
        }
        self
    }

    /* ─────────────── configuration ─────────────── */
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_clock<C: ClockProvider + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_fixed_now(self, now: NaiveDateTime) -> Self {
        self.with_clock(FixedClock(now))
    }

    /* ─────────────── interpreter shortcut ─────── */
    pub fn interpreter(&self) -> Result<Interpreter<'_>, RegistryError> {
        Ok(Interpreter::new(self, builtin_registry()?))
    }

    pub fn interpreter_with<'a>(&'a self, registry: &'a FunctionRegistry) -> Interpreter<'a> {
        Interpreter::new(self, registry)
    }
}

impl EvaluationContext for TestWorkbook {
    fn resolve_cell(&self, cell: &CellRef) -> Result<V, ExcelError> {
        let sheet_name = cell.sheet.as_deref().unwrap_or(DEFAULT_SHEET);
        let sheet = self.sheets.get(sheet_name).ok_or_else(|| {
            ExcelError::new_ref().with_message(format!("no sheet named {sheet_name}"))
        })?;
        Ok(sheet
            .cells
            .get(&(cell.row, cell.col))
            .cloned()
            .unwrap_or(V::Empty))
    }

    fn locale(&self) -> Locale {
        self.locale
    }

    fn clock(&self) -> &dyn ClockProvider {
        self.clock.as_ref()
    }
}
