//! Expression tree consumed by the interpreter.
//!
//! Formula text is parsed elsewhere; hosts build `ASTNode`s directly or
//! through the constructors below.

use std::fmt::{self, Display};

use xlcalc_common::{CellRef, LiteralValue, RangeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Plus,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Percent => "%",
        })
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Concat => "&",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ASTNodeType {
    Literal(LiteralValue),
    Reference(RangeRef),
    UnaryOp {
        op: UnaryOp,
        expr: Box<ASTNode>,
    },
    BinaryOp {
        op: BinaryOp,
        left: Box<ASTNode>,
        right: Box<ASTNode>,
    },
    Function {
        name: String,
        args: Vec<ASTNode>, // Most functions have <= 4 args
    },
    Array(Vec<Vec<ASTNode>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTNode {
    pub node_type: ASTNodeType,
}

impl ASTNode {
    pub fn new(node_type: ASTNodeType) -> Self {
        ASTNode { node_type }
    }

    pub fn literal(v: impl Into<LiteralValue>) -> Self {
        Self::new(ASTNodeType::Literal(v.into()))
    }

    pub fn number(n: f64) -> Self {
        Self::literal(n)
    }

    pub fn text(s: &str) -> Self {
        Self::literal(s)
    }

    pub fn boolean(b: bool) -> Self {
        Self::literal(b)
    }

    pub fn empty() -> Self {
        Self::literal(LiteralValue::Empty)
    }

    pub fn reference(r: RangeRef) -> Self {
        Self::new(ASTNodeType::Reference(r))
    }

    pub fn cell(c: CellRef) -> Self {
        Self::reference(c.into())
    }

    pub fn call(name: &str, args: Vec<ASTNode>) -> Self {
        Self::new(ASTNodeType::Function {
            name: name.to_string(),
            args,
        })
    }

    pub fn unary(op: UnaryOp, expr: ASTNode) -> Self {
        Self::new(ASTNodeType::UnaryOp {
            op,
            expr: Box::new(expr),
        })
    }

    pub fn binary(op: BinaryOp, left: ASTNode, right: ASTNode) -> Self {
        Self::new(ASTNodeType::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn array(rows: Vec<Vec<ASTNode>>) -> Self {
        Self::new(ASTNodeType::Array(rows))
    }

    /// True when any function call in the tree is volatile according to
    /// `is_volatile`.
    pub fn contains_volatile(&self, is_volatile: &dyn Fn(&str) -> bool) -> bool {
        match &self.node_type {
            ASTNodeType::Literal(_) | ASTNodeType::Reference(_) => false,
            ASTNodeType::UnaryOp { expr, .. } => expr.contains_volatile(is_volatile),
            ASTNodeType::BinaryOp { left, right, .. } => {
                left.contains_volatile(is_volatile) || right.contains_volatile(is_volatile)
            }
            ASTNodeType::Function { name, args } => {
                is_volatile(name) || args.iter().any(|a| a.contains_volatile(is_volatile))
            }
            ASTNodeType::Array(rows) => rows
                .iter()
                .flatten()
                .any(|a| a.contains_volatile(is_volatile)),
        }
    }
}

impl Display for ASTNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node_type {
            ASTNodeType::Literal(LiteralValue::Text(s)) => write!(f, "\"{}\"", s.replace('"', "\"\"")),
            ASTNodeType::Literal(v) => write!(f, "{v}"),
            ASTNodeType::Reference(r) => write!(f, "{r}"),
            ASTNodeType::UnaryOp {
                op: UnaryOp::Percent,
                expr,
            } => write!(f, "{expr}%"),
            ASTNodeType::UnaryOp { op, expr } => write!(f, "{op}{expr}"),
            ASTNodeType::BinaryOp { op, left, right } => write!(f, "({left}{op}{right})"),
            ASTNodeType::Function { name, args } => {
                write!(f, "{name}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{a}")?;
                }
                f.write_str(")")
            }
            ASTNodeType::Array(rows) => {
                f.write_str("{")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        f.write_str(";")?;
                    }
                    for (j, a) in row.iter().enumerate() {
                        if j > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "{a}")?;
                    }
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_formula_text() {
        let node = ASTNode::call(
            "DATE",
            vec![
                ASTNode::number(2021.0),
                ASTNode::binary(BinaryOp::Add, ASTNode::number(1.0), ASTNode::number(2.0)),
                ASTNode::cell(CellRef::new(1, 2).unwrap()),
            ],
        );
        assert_eq!(node.to_string(), "DATE(2021,(1+2),B1)");
        let arr = ASTNode::array(vec![
            vec![ASTNode::number(1.0), ASTNode::text("a\"b")],
            vec![ASTNode::boolean(true), ASTNode::number(0.5)],
        ]);
        assert_eq!(arr.to_string(), "{1,\"a\"\"b\";TRUE,0.5}");
    }

    #[test]
    fn finds_volatile_calls() {
        let node = ASTNode::binary(
            BinaryOp::Sub,
            ASTNode::call("today", vec![]),
            ASTNode::number(1.0),
        );
        let volatile = |n: &str| n.eq_ignore_ascii_case("TODAY");
        assert!(node.contains_volatile(&volatile));
        assert!(!ASTNode::number(1.0).contains_volatile(&volatile));
    }
}
