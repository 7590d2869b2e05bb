//! Implicit numeric conversion.
//!
//! `cast` implements the six legal entries of the cast table; everything
//! else is a fatal type error. The `*_type_fix` helpers compute an
//! operation's calculation type (`clamp(join(..), lo, hi)`) and coerce the
//! operands to it.

use crate::error::{Error, Result};
use crate::ir::{CastOp, FCmpCond, ICmpCond, IrType, Operand};
use crate::irgen::ctx::Ctx;
use crate::ty::Typename;

/// The lattice type of a scalar IR value.
pub fn typename_of(ty: &IrType) -> Option<Typename> {
    match ty {
        IrType::Bool => Some(Typename::Bool),
        IrType::Int => Some(Typename::Int),
        IrType::Float => Some(Typename::Float),
        _ => None,
    }
}

fn scalar_type(ctx: &Ctx, value: Operand) -> Result<Typename> {
    let ty = ctx.value_type(value);
    typename_of(&ty).ok_or_else(|| Error::InvalidCast {
        from: ty.to_string(),
        to: "scalar".to_string(),
    })
}

/// Coerces `value` to `want` per the cast table.
pub fn cast(ctx: &mut Ctx, value: Operand, want: Typename) -> Result<Operand> {
    let curr = scalar_type(ctx, value)?;
    if curr == want {
        return Ok(value);
    }
    let cast_err = || Error::InvalidCast {
        from: curr.to_string(),
        to: want.to_string(),
    };
    match (curr, want) {
        (Typename::Bool, Typename::Int) => Ok(ctx.emit_cast(CastOp::ZExt, value)),
        (Typename::Bool, Typename::Float) => Ok(ctx.emit_cast(CastOp::UiToFp, value)),
        (Typename::Int, Typename::Bool) => {
            Ok(ctx.emit_icmp(ICmpCond::Ne, value, Operand::ConstInt(0)))
        }
        (Typename::Int, Typename::Float) => Ok(ctx.emit_cast(CastOp::SiToFp, value)),
        (Typename::Float, Typename::Bool) => {
            Ok(ctx.emit_fcmp(FCmpCond::One, value, Operand::ConstFloat(0.0)))
        }
        (Typename::Float, Typename::Int) => Ok(ctx.emit_cast(CastOp::FpToSi, value)),
        _ => Err(cast_err()),
    }
}

/// Clamps a single operand's type into `[lo, hi]` and coerces.
pub fn unary_expr_type_fix(
    ctx: &mut Ctx,
    value: Operand,
    lo: Typename,
    hi: Typename,
) -> Result<(Operand, Typename)> {
    let ty = scalar_type(ctx, value)?;
    let calc = ty.clamp_to(lo, hi);
    let value = if ty != calc { cast(ctx, value, calc)? } else { value };
    Ok((value, calc))
}

/// Joins both operand types, clamps into `[lo, hi]`, and coerces each.
pub fn binary_expr_type_fix(
    ctx: &mut Ctx,
    lhs: Operand,
    rhs: Operand,
    lo: Typename,
    hi: Typename,
) -> Result<(Operand, Operand, Typename)> {
    let lty = scalar_type(ctx, lhs)?;
    let rty = scalar_type(ctx, rhs)?;
    let calc = lty.join(rty).clamp_to(lo, hi);
    let lhs = if lty != calc { cast(ctx, lhs, calc)? } else { lhs };
    let rhs = if rty != calc { cast(ctx, rhs, calc)? } else { rhs };
    Ok((lhs, rhs, calc))
}

/// Coerces a condition value to `Bool`.
pub fn to_bool(ctx: &mut Ctx, value: Operand) -> Result<Operand> {
    cast(ctx, value, Typename::Bool)
}
