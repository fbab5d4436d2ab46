use smallvec::SmallVec;
use xlcalc_common::{CellRef, ExcelError, LiteralValue, RangeRef};

use crate::{
    ast::{ASTNode, ASTNodeType, BinaryOp, UnaryOp},
    broadcast::{broadcast, has_array},
    coercion::{compare_values, implicit_intersection, sanitize_numeric, to_number, to_text},
    function::FnCaps,
    function_registry::FunctionRegistry,
    traits::{CalcValue, DefaultFunctionContext, EvaluationContext},
};

/// Tree-walking evaluator. Holds no state besides its collaborators, so one
/// instance may evaluate any number of expressions.
pub struct Interpreter<'a> {
    pub context: &'a dyn EvaluationContext,
    registry: &'a FunctionRegistry,
    current_cell: Option<CellRef>,
}

impl<'a> Interpreter<'a> {
    pub fn new(context: &'a dyn EvaluationContext, registry: &'a FunctionRegistry) -> Self {
        Self {
            context,
            registry,
            current_cell: None,
        }
    }

    /// The cell holding the formula; enables implicit intersection.
    pub fn with_cell(mut self, cell: CellRef) -> Self {
        self.current_cell = Some(cell);
        self
    }

    pub fn current_cell(&self) -> Option<&CellRef> {
        self.current_cell.as_ref()
    }

    /// Evaluate a tree. A scalar error result comes back as `Err`; arrays
    /// keep per-cell errors in place.
    pub fn evaluate(&self, node: &ASTNode) -> Result<CalcValue, ExcelError> {
        match self.eval_node(node)? {
            CalcValue::Scalar(LiteralValue::Error(e)) => Err(e),
            other => Ok(other),
        }
    }

    /// Evaluate and collapse to one literal (top-left of an array), keeping
    /// errors as values.
    pub fn evaluate_to_literal(&self, node: &ASTNode) -> LiteralValue {
        match self.evaluate(node) {
            Ok(v) => v.into_literal(),
            Err(e) => LiteralValue::Error(e),
        }
    }

    fn eval_node(&self, node: &ASTNode) -> Result<CalcValue, ExcelError> {
        match &node.node_type {
            ASTNodeType::Literal(v) => Ok(CalcValue::Scalar(v.clone())),
            ASTNodeType::Reference(r) => self.eval_reference(r),
            ASTNodeType::UnaryOp { op, expr } => self.eval_unary(*op, expr),
            ASTNodeType::BinaryOp { op, left, right } => self.eval_binary(*op, left, right),
            ASTNodeType::Function { name, args } => self.eval_function(name, args),
            ASTNodeType::Array(rows) => self.eval_array_literal(rows),
        }
    }

    /// Errors raised while evaluating an operand become error values so the
    /// consumer decides which one wins.
    fn eval_operand(&self, node: &ASTNode) -> CalcValue {
        self.eval_node(node)
            .unwrap_or_else(|e| CalcValue::Scalar(LiteralValue::Error(e)))
    }

    /* ===================  references  =================== */

    fn eval_reference(&self, r: &RangeRef) -> Result<CalcValue, ExcelError> {
        if r.is_single_cell() {
            return self.context.resolve_cell(&r.top_left()).map(CalcValue::Scalar);
        }
        let range = self.context.resolve_range(r)?;
        Ok(CalcValue::Array(range.materialise()?.into_owned()))
    }

    /// A reference in a scalar position: implicit intersection with the
    /// formula cell when possible, otherwise the whole block as an array.
    fn eval_scalar_operand(&self, node: &ASTNode) -> CalcValue {
        if let ASTNodeType::Reference(r) = &node.node_type {
            if !r.is_single_cell() {
                if let Ok(cell) = implicit_intersection(r, self.current_cell.as_ref()) {
                    return match self.context.resolve_cell(&cell) {
                        Ok(v) => CalcValue::Scalar(v),
                        Err(e) => CalcValue::Scalar(LiteralValue::Error(e)),
                    };
                }
            }
        }
        self.eval_operand(node)
    }

    fn eval_range_operand(&self, node: &ASTNode) -> CalcValue {
        match &node.node_type {
            ASTNodeType::Reference(r) => CalcValue::Reference(r.clone()),
            _ => self.eval_operand(node),
        }
    }

    /* ===================  function calls  =================== */

    fn eval_function(&self, name: &str, args: &[ASTNode]) -> Result<CalcValue, ExcelError> {
        let desc = self.registry.resolve(name)?;
        desc.check_arity(args.len())?;

        let mut values: SmallVec<[CalcValue; 4]> = SmallVec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            let v = if desc.allow_range.allows(i) {
                self.eval_range_operand(arg)
            } else {
                self.eval_scalar_operand(arg)
            };
            values.push(v);
        }

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("call", function = %desc.name, argc = values.len()).entered();

        let fctx = DefaultFunctionContext::new(self.context, self.current_cell.as_ref());
        if desc.caps.contains(FnCaps::SCALAR) && has_array(&values) {
            return Ok(broadcast(&values, |cell_args| desc.call(&fctx, cell_args)));
        }
        desc.call(&fctx, &values)
    }

    /* ===================  array literal  =================== */

    fn eval_array_literal(&self, rows: &[Vec<ASTNode>]) -> Result<CalcValue, ExcelError> {
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != width) {
            return Err(ExcelError::new_value().with_message("array rows must have equal length"));
        }
        let out = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| self.eval_operand(cell).into_literal())
                    .collect()
            })
            .collect();
        Ok(CalcValue::Array(out))
    }

    /* ===================  operators  =================== */

    fn eval_unary(&self, op: UnaryOp, expr: &ASTNode) -> Result<CalcValue, ExcelError> {
        let v = self.eval_scalar_operand(expr);
        let locale = self.context.locale();
        let apply = |cell: &[CalcValue]| -> Result<CalcValue, ExcelError> {
            let lit = cell[0].clone().into_literal();
            if op == UnaryOp::Plus {
                return Ok(CalcValue::Scalar(lit));
            }
            let n = to_number(&lit, &locale)?;
            let out = match op {
                UnaryOp::Neg => -n,
                _ => n / 100.0,
            };
            Ok(CalcValue::from(sanitize_numeric(out)?))
        };
        let args = [v];
        if has_array(&args) {
            Ok(broadcast(&args, apply))
        } else {
            apply(&args)
        }
    }

    fn eval_binary(
        &self,
        op: BinaryOp,
        left: &ASTNode,
        right: &ASTNode,
    ) -> Result<CalcValue, ExcelError> {
        let args = [self.eval_scalar_operand(left), self.eval_scalar_operand(right)];
        let locale = self.context.locale();
        let apply = |cell: &[CalcValue]| -> Result<CalcValue, ExcelError> {
            let l = cell[0].clone().into_literal();
            let r = cell[1].clone().into_literal();
            binary_scalar(op, &l, &r, &locale).map(CalcValue::Scalar)
        };
        if has_array(&args) {
            Ok(broadcast(&args, apply))
        } else {
            apply(&args)
        }
    }
}

fn binary_scalar(
    op: BinaryOp,
    l: &LiteralValue,
    r: &LiteralValue,
    locale: &crate::locale::Locale,
) -> Result<LiteralValue, ExcelError> {
    if op.is_comparison() {
        let ord = compare_values(l, r)?;
        let b = match op {
            BinaryOp::Eq => ord.is_eq(),
            BinaryOp::Ne => ord.is_ne(),
            BinaryOp::Lt => ord.is_lt(),
            BinaryOp::Le => ord.is_le(),
            BinaryOp::Gt => ord.is_gt(),
            _ => ord.is_ge(),
        };
        return Ok(LiteralValue::Boolean(b));
    }
    if op == BinaryOp::Concat {
        let a = to_text(l)?;
        let b = to_text(r)?;
        return Ok(LiteralValue::Text(a + &b));
    }
    let a = to_number(l, locale)?;
    let b = to_number(r, locale)?;
    let n = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(ExcelError::new_div());
            }
            a / b
        }
        _ => {
            // Excel domain: 0^0 and negative base with non-integer exponent
            if (a == 0.0 && b == 0.0) || (a < 0.0 && b.fract() != 0.0) {
                return Err(ExcelError::new_num());
            }
            if a == 0.0 && b < 0.0 {
                return Err(ExcelError::new_div());
            }
            a.powf(b)
        }
    };
    sanitize_numeric(n).map(LiteralValue::Number)
}
