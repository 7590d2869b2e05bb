//! Expression folding.
//!
//! `fold_expr` takes the expression by value and returns the (possibly new)
//! root; the caller assigns it back over the slot. Only `+ - * / %` fold —
//! relational and logical operators cannot appear in SysY constant contexts,
//! so a surviving one simply fails the literal check at the use site.

use crate::ast::*;
use crate::consteval::ConstEval;
use crate::error::{Error, Result};
use crate::ty::Typename;

impl ConstEval {
    pub(crate) fn fold_expr(&self, expr: Expr) -> Result<Expr> {
        match expr {
            Expr::Number(_) => Ok(expr),

            Expr::Variable(lvalue) => {
                // Only scalar constants fold; indexed accesses and plain
                // variables survive to lowering.
                if lvalue.indices.is_empty() {
                    if let Some(value) = self.table().resolve(&lvalue.name) {
                        return Ok(Expr::Number(value));
                    }
                }
                Ok(Expr::Variable(lvalue))
            }

            Expr::Unary { op, expr } => {
                let folded = self.fold_expr(*expr)?;
                match op {
                    // `+x` is `x`; the node is replaced by its child.
                    UnaryOp::Plus => Ok(folded),
                    UnaryOp::Minus => match folded.as_number() {
                        Some(Number::Int(v)) => Ok(Expr::Number(Number::Int(v.wrapping_neg()))),
                        Some(Number::Float(v)) => Ok(Expr::Number(Number::Float(-v))),
                        None => Ok(Expr::Unary {
                            op,
                            expr: Box::new(folded),
                        }),
                    },
                    // `!` only appears in boolean contexts; lowering
                    // handles it.
                    UnaryOp::Not => Ok(Expr::Unary {
                        op,
                        expr: Box::new(folded),
                    }),
                }
            }

            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.fold_expr(*lhs)?;
                let rhs = self.fold_expr(*rhs)?;
                if let (Some(l), Some(r)) = (lhs.as_number(), rhs.as_number()) {
                    if let Some(value) = eval_binary(op, l, r)? {
                        return Ok(Expr::Number(value));
                    }
                }
                Ok(Expr::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                })
            }

            Expr::Call { .. } => Ok(expr),
        }
    }
}

/// Coerces a literal between the numeric types.
pub(crate) fn type_fix(value: Number, want: Typename) -> Result<Number> {
    match (value, want) {
        (Number::Int(_), Typename::Int) | (Number::Float(_), Typename::Float) => Ok(value),
        (Number::Int(v), Typename::Float) => Ok(Number::Float(v as f32)),
        (Number::Float(v), Typename::Int) => Ok(Number::Int(v as i32)),
        _ => Err(Error::InvalidCast {
            from: value.ty().to_string(),
            to: want.to_string(),
        }),
    }
}

/// Promotes both operands to their join type before evaluation.
fn binary_type_fix(l: Number, r: Number) -> Result<(Number, Number, Typename)> {
    let node_ty = l.ty().join(r.ty());
    Ok((type_fix(l, node_ty)?, type_fix(r, node_ty)?, node_ty))
}

/// Evaluates an arithmetic operator over two literals. `None` means the
/// operator does not fold (relational/logical).
fn eval_binary(op: BinaryOp, l: Number, r: Number) -> Result<Option<Number>> {
    let (l, r, node_ty) = binary_type_fix(l, r)?;
    let value = match (op, node_ty) {
        (BinaryOp::Add, Typename::Int) => Number::Int(int(l).wrapping_add(int(r))),
        (BinaryOp::Add, Typename::Float) => Number::Float(float(l) + float(r)),
        (BinaryOp::Sub, Typename::Int) => Number::Int(int(l).wrapping_sub(int(r))),
        (BinaryOp::Sub, Typename::Float) => Number::Float(float(l) - float(r)),
        (BinaryOp::Mul, Typename::Int) => Number::Int(int(l).wrapping_mul(int(r))),
        (BinaryOp::Mul, Typename::Float) => Number::Float(float(l) * float(r)),
        // Integer division truncates toward zero.
        (BinaryOp::Div, Typename::Int) => {
            if int(r) == 0 {
                return Err(Error::DivisionByZero);
            }
            Number::Int(int(l).wrapping_div(int(r)))
        }
        (BinaryOp::Div, Typename::Float) => Number::Float(float(l) / float(r)),
        (BinaryOp::Mod, Typename::Int) => {
            if int(r) == 0 {
                return Err(Error::DivisionByZero);
            }
            Number::Int(int(l).wrapping_rem(int(r)))
        }
        (BinaryOp::Mod, Typename::Float) => return Err(Error::FloatMod),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn int(n: Number) -> i32 {
    match n {
        Number::Int(v) => v,
        Number::Float(v) => v as i32,
    }
}

fn float(n: Number) -> f32 {
    match n {
        Number::Int(v) => v as f32,
        Number::Float(v) => v,
    }
}
