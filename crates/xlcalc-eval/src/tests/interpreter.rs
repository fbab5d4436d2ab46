use crate::ast::{ASTNode, BinaryOp, UnaryOp};
use crate::test_workbook::TestWorkbook;
use crate::traits::CalcValue;
use xlcalc_common::{CellRef, ExcelError, ExcelErrorKind, LiteralValue, RangeRef};

fn n(x: f64) -> ASTNode {
    ASTNode::number(x)
}

fn cell(row: u32, col: u32) -> CellRef {
    CellRef::new(row, col).unwrap()
}

fn range(sr: u32, sc: u32, er: u32, ec: u32) -> RangeRef {
    RangeRef::new(sr, sc, er, ec).unwrap()
}

fn num(x: f64) -> LiteralValue {
    LiteralValue::Number(x)
}

fn kind_of(wb: &TestWorkbook, node: &ASTNode) -> ExcelErrorKind {
    wb.interpreter().unwrap().evaluate(node).unwrap_err().kind
}

/* ─────────────── operators ─────────────── */

#[test]
fn arithmetic_precedence_is_the_tree() {
    let wb = TestWorkbook::new();
    let interp = wb.interpreter().unwrap();
    // 1 + 2 * 3
    let node = ASTNode::binary(
        BinaryOp::Add,
        n(1.0),
        ASTNode::binary(BinaryOp::Mul, n(2.0), n(3.0)),
    );
    assert_eq!(interp.evaluate(&node).unwrap(), CalcValue::from(7.0));

    let pct = ASTNode::unary(UnaryOp::Percent, n(50.0));
    assert_eq!(interp.evaluate(&pct).unwrap(), CalcValue::from(0.5));

    let neg_text = ASTNode::unary(UnaryOp::Neg, ASTNode::text("3"));
    assert_eq!(interp.evaluate(&neg_text).unwrap(), CalcValue::from(-3.0));
}

#[test]
fn arithmetic_domain_errors() {
    let wb = TestWorkbook::new();
    assert_eq!(
        kind_of(&wb, &ASTNode::binary(BinaryOp::Div, n(1.0), n(0.0))),
        ExcelErrorKind::Div
    );
    assert_eq!(
        kind_of(&wb, &ASTNode::binary(BinaryOp::Pow, n(-8.0), n(0.5))),
        ExcelErrorKind::Num
    );
    assert_eq!(
        kind_of(&wb, &ASTNode::binary(BinaryOp::Pow, n(0.0), n(-1.0))),
        ExcelErrorKind::Div
    );
    assert_eq!(
        kind_of(&wb, &ASTNode::binary(BinaryOp::Add, n(1.0), ASTNode::text("abc"))),
        ExcelErrorKind::Value
    );
}

#[test]
fn comparisons_and_concat() {
    let wb = TestWorkbook::new();
    let interp = wb.interpreter().unwrap();
    let eq = ASTNode::binary(BinaryOp::Eq, ASTNode::text("abc"), ASTNode::text("ABC"));
    assert_eq!(interp.evaluate(&eq).unwrap(), CalcValue::from(true));

    // Numbers sort before text.
    let lt = ASTNode::binary(BinaryOp::Lt, n(1000.0), ASTNode::text("a"));
    assert_eq!(interp.evaluate(&lt).unwrap(), CalcValue::from(true));

    // A blank cell equals zero.
    let blank = ASTNode::binary(BinaryOp::Eq, ASTNode::cell(cell(9, 9)), n(0.0));
    assert_eq!(interp.evaluate(&blank).unwrap(), CalcValue::from(true));

    let cat = ASTNode::binary(BinaryOp::Concat, n(1.5), ASTNode::boolean(true));
    assert_eq!(
        interp.evaluate(&cat).unwrap(),
        CalcValue::Scalar(LiteralValue::Text("1.5TRUE".into()))
    );
}

#[test]
fn left_operand_error_wins() {
    let wb = TestWorkbook::new();
    let node = ASTNode::binary(
        BinaryOp::Add,
        ASTNode::binary(BinaryOp::Div, n(1.0), n(0.0)),
        ASTNode::literal(LiteralValue::from(ExcelErrorKind::Na)),
    );
    assert_eq!(kind_of(&wb, &node), ExcelErrorKind::Div);
}

/* ─────────────── dispatch ─────────────── */

#[test]
fn unknown_function_is_name_error() {
    let wb = TestWorkbook::new();
    assert_eq!(
        kind_of(&wb, &ASTNode::call("NOSUCHFN", vec![n(1.0)])),
        ExcelErrorKind::Name
    );
}

#[test]
fn wrong_arity_is_value_error_with_message() {
    let wb = TestWorkbook::new();
    let err = wb
        .interpreter()
        .unwrap()
        .evaluate(&ASTNode::call("WEEKDAY", vec![n(1.0), n(1.0), n(1.0)]))
        .unwrap_err();
    assert_eq!(err.kind, ExcelErrorKind::Value);
    assert_eq!(
        err.message.as_deref(),
        Some("WEEKDAY expects 1..=2 arguments, got 3")
    );
    assert_eq!(
        kind_of(&wb, &ASTNode::call("TODAY", vec![n(1.0)])),
        ExcelErrorKind::Value
    );
}

#[test]
fn names_resolve_case_insensitively_and_with_prefix() {
    let wb = TestWorkbook::new();
    let interp = wb.interpreter().unwrap();
    let date = ASTNode::call("date", vec![n(2021.0), n(1.0), n(1.0)]);
    assert_eq!(interp.evaluate(&date).unwrap(), CalcValue::from(44197.0));
    let iso = ASTNode::call("_xlfn.ISOWEEKNUM", vec![n(44197.0)]);
    assert_eq!(interp.evaluate(&iso).unwrap(), CalcValue::from(53.0));
}

#[test]
fn argument_errors_are_returned_unchanged() {
    let wb = TestWorkbook::new();
    let interp = wb.interpreter().unwrap();
    let upstream = ExcelError::new(ExcelErrorKind::Na).with_message("lookup failed upstream");
    let node = ASTNode::call("YEAR", vec![ASTNode::literal(upstream.clone())]);
    assert_eq!(interp.evaluate(&node).unwrap_err(), upstream);
    assert_eq!(interp.evaluate_to_literal(&node), LiteralValue::Error(upstream));
}

#[test]
fn first_failing_argument_wins() {
    let wb = TestWorkbook::new();
    let div = ASTNode::binary(BinaryOp::Div, n(1.0), n(0.0));
    let bad_text = ASTNode::text("not a number");
    let a = ASTNode::call("DATE", vec![div.clone(), bad_text.clone(), n(1.0)]);
    let b = ASTNode::call("DATE", vec![bad_text, div, n(1.0)]);
    assert_eq!(kind_of(&wb, &a), ExcelErrorKind::Div);
    assert_eq!(kind_of(&wb, &b), ExcelErrorKind::Value);
}

#[test]
fn error_cells_propagate_through_functions() {
    let wb = TestWorkbook::new().with_cell("Sheet1", 1, 1, LiteralValue::from(ExcelErrorKind::Ref));
    let node = ASTNode::call("MONTH", vec![ASTNode::cell(cell(1, 1))]);
    assert_eq!(kind_of(&wb, &node), ExcelErrorKind::Ref);
}

#[test]
fn missing_sheet_is_ref_error() {
    let wb = TestWorkbook::new();
    let node = ASTNode::call("YEAR", vec![ASTNode::cell(cell(1, 1).on_sheet("Nowhere"))]);
    assert_eq!(kind_of(&wb, &node), ExcelErrorKind::Ref);
}

/* ─────────────── arrays and references ─────────────── */

#[test]
fn scalar_functions_broadcast_over_arrays() {
    let wb = TestWorkbook::new();
    let interp = wb.interpreter().unwrap();
    let years = ASTNode::array(vec![vec![n(44197.0), n(44562.0)]]);
    assert_eq!(
        interp.evaluate(&ASTNode::call("YEAR", vec![years])).unwrap(),
        CalcValue::Array(vec![vec![num(2021.0), num(2022.0)]])
    );
}

#[test]
fn row_and_column_vectors_broadcast_to_a_grid() {
    let wb = TestWorkbook::new();
    let interp = wb.interpreter().unwrap();
    let years = ASTNode::array(vec![vec![n(2020.0)], vec![n(2021.0)]]);
    let months = ASTNode::array(vec![vec![n(1.0), n(2.0)]]);
    let node = ASTNode::call("DATE", vec![years, months, n(1.0)]);
    assert_eq!(
        interp.evaluate(&node).unwrap(),
        CalcValue::Array(vec![
            vec![num(43831.0), num(43862.0)],
            vec![num(44197.0), num(44228.0)],
        ])
    );
}

#[test]
fn failing_cells_stay_in_place() {
    let wb = TestWorkbook::new();
    let interp = wb.interpreter().unwrap();
    let node = ASTNode::call("YEAR", vec![ASTNode::array(vec![vec![n(1.0), n(-1.0)]])]);
    match interp.evaluate(&node).unwrap() {
        CalcValue::Array(rows) => {
            assert_eq!(rows[0][0], num(1900.0));
            assert_eq!(rows[0][1].as_error().map(|e| e.kind), Some(ExcelErrorKind::Num));
        }
        other => panic!("expected an array, got {other:?}"),
    }
}

#[test]
fn mismatched_shapes_pad_with_na() {
    let wb = TestWorkbook::new();
    let interp = wb.interpreter().unwrap();
    let a = ASTNode::array(vec![vec![n(1.0), n(2.0)]]);
    let b = ASTNode::array(vec![vec![n(10.0), n(20.0), n(30.0)]]);
    match interp.evaluate(&ASTNode::binary(BinaryOp::Add, a, b)).unwrap() {
        CalcValue::Array(rows) => {
            assert_eq!(rows[0][0], num(11.0));
            assert_eq!(rows[0][1], num(22.0));
            assert_eq!(rows[0][2].as_error().map(|e| e.kind), Some(ExcelErrorKind::Na));
        }
        other => panic!("expected an array, got {other:?}"),
    }
}

#[test]
fn implicit_intersection_picks_the_formula_row() {
    let wb = TestWorkbook::new().with_range(
        "Sheet1",
        1,
        1,
        vec![vec![num(44197.0)], vec![num(44562.0)], vec![num(44927.0)]],
    );
    let node = ASTNode::call("YEAR", vec![ASTNode::reference(range(1, 1, 3, 1))]);

    let at_b2 = wb.interpreter().unwrap().with_cell(cell(2, 2));
    assert_eq!(at_b2.evaluate(&node).unwrap(), CalcValue::from(2022.0));

    // Without a formula cell the whole column is broadcast.
    let floating = wb.interpreter().unwrap();
    assert_eq!(
        floating.evaluate(&node).unwrap(),
        CalcValue::Array(vec![vec![num(2021.0)], vec![num(2022.0)], vec![num(2023.0)]])
    );
}

#[test]
fn ranges_pass_through_to_range_parameters() {
    let wb = TestWorkbook::new().with_range(
        "Sheet1",
        1,
        1,
        vec![vec![num(44202.0)], vec![LiteralValue::Empty], vec![num(44203.0)]],
    );
    let interp = wb.interpreter().unwrap().with_cell(cell(2, 5));
    // Even with a formula cell the holiday list is not intersected.
    let node = ASTNode::call(
        "NETWORKDAYS",
        vec![n(44200.0), n(44204.0), ASTNode::reference(range(1, 1, 3, 1))],
    );
    assert_eq!(interp.evaluate(&node).unwrap(), CalcValue::from(3.0));
}

#[test]
fn ragged_array_literal_is_rejected() {
    let wb = TestWorkbook::new();
    let node = ASTNode::array(vec![vec![n(1.0), n(2.0)], vec![n(3.0)]]);
    assert_eq!(kind_of(&wb, &node), ExcelErrorKind::Value);
}

#[test]
fn volatility_follows_the_registry() {
    let reg = crate::function_registry::builtin_registry().unwrap();
    let is_volatile = |name: &str| reg.resolve(name).is_ok_and(|d| d.is_volatile());
    let now_plus = ASTNode::binary(BinaryOp::Add, ASTNode::call("NOW", vec![]), n(1.0));
    let year = ASTNode::call("YEAR", vec![n(1.0)]);
    assert!(now_plus.contains_volatile(&is_volatile));
    assert!(!year.contains_volatile(&is_volatile));
}
