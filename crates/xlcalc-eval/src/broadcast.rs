//! Element-wise application of scalar operations over arrays.
//!
//! Shapes combine the way dynamic arrays do: a dimension of length 1
//! stretches to match the other operand, and any cell that falls outside a
//! shorter operand becomes `#N/A`.

use xlcalc_common::{ExcelError, ExcelErrorKind, LiteralValue};

use crate::traits::CalcValue;

pub type Shape2D = (usize, usize);

fn shape_of(v: &CalcValue) -> Shape2D {
    match v {
        CalcValue::Array(rows) => (rows.len(), rows.first().map_or(0, Vec::len)),
        _ => (1, 1),
    }
}

/// Combined shape of the inputs: the largest extent along each axis.
pub fn broadcast_shape(shapes: &[Shape2D]) -> Shape2D {
    shapes
        .iter()
        .fold((1, 1), |(r, c), &(sr, sc)| (r.max(sr), c.max(sc)))
}

/// Cell of an operand of shape `dims` that output position `(r, c)` reads,
/// or `None` when the operand is too short along a non-stretching axis.
pub fn project_index((r, c): Shape2D, dims: Shape2D) -> Option<Shape2D> {
    let rr = if dims.0 == 1 { 0 } else { r };
    let cc = if dims.1 == 1 { 0 } else { c };
    (rr < dims.0 && cc < dims.1).then_some((rr, cc))
}

fn element_at(v: &CalcValue, pos: Shape2D) -> CalcValue {
    match v {
        CalcValue::Array(rows) => match project_index(pos, shape_of(v)) {
            Some((r, c)) => CalcValue::Scalar(rows[r][c].clone()),
            None => CalcValue::Scalar(LiteralValue::Error(ExcelError::new(ExcelErrorKind::Na))),
        },
        other => other.clone(),
    }
}

/// True when any argument is an array.
pub fn has_array(args: &[CalcValue]) -> bool {
    args.iter().any(|a| matches!(a, CalcValue::Array(_)))
}

/// Call `f` once per output cell with every array argument replaced by the
/// matching element. Non-array arguments are passed as they are. A failing
/// cell becomes an error value; the call as a whole still succeeds.
pub fn broadcast<F>(args: &[CalcValue], mut f: F) -> CalcValue
where
    F: FnMut(&[CalcValue]) -> Result<CalcValue, ExcelError>,
{
    let shapes: Vec<Shape2D> = args.iter().map(shape_of).collect();
    let (rows, cols) = broadcast_shape(&shapes);
    let mut out = Vec::with_capacity(rows);
    let mut cell_args: Vec<CalcValue> = Vec::with_capacity(args.len());
    for r in 0..rows {
        let mut row = Vec::with_capacity(cols);
        for c in 0..cols {
            cell_args.clear();
            cell_args.extend(args.iter().map(|a| element_at(a, (r, c))));
            let v = match f(&cell_args) {
                Ok(v) => v.into_literal(),
                Err(e) => LiteralValue::Error(e),
            };
            row.push(v);
        }
        out.push(row);
    }
    CalcValue::Array(out)
}
