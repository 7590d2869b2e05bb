//! Array helpers for lowering: dimension extraction, constant aggregates,
//! element addressing, and runtime initializer stores.

use crate::ast::{Expr, InitializerElement, Number};
use crate::error::{Error, Result};
use crate::ir::{ConstInit, IrType, Operand};
use crate::irgen::cast;
use crate::irgen::ctx::Ctx;
use crate::irgen::generate::gen_value;
use crate::ty::Typename;

/// Extracts the concrete extents of folded declaration dimensions.
pub fn dims_of(dims: &[Expr]) -> Result<Vec<usize>> {
    let mut lens = Vec::with_capacity(dims.len());
    for dim in dims {
        match dim.as_number() {
            Some(Number::Int(v)) if v >= 0 => lens.push(v as usize),
            _ => return Err(Error::InvalidArrayLen),
        }
    }
    Ok(lens)
}

/// Extracts a parameter's dimensions: `dims[0]` stays the unknown sentinel.
pub fn param_dims(dims: &[Option<Expr>]) -> Result<Vec<Option<usize>>> {
    let mut out = Vec::with_capacity(dims.len());
    for (i, dim) in dims.iter().enumerate() {
        match dim {
            None if i == 0 => out.push(None),
            Some(expr) => match expr.as_number() {
                Some(Number::Int(v)) if v >= 0 => out.push(Some(v as usize)),
                _ => return Err(Error::InvalidArrayLen),
            },
            None => return Err(Error::InvalidArrayLen),
        }
    }
    Ok(out)
}

/// Builds the constant aggregate of a fully-folded initializer tree.
/// An all-zero aggregate collapses to `Zero`.
pub fn const_init_from(init: &InitializerElement) -> Result<ConstInit> {
    let built = build_const_init(init)?;
    if built.is_zero() {
        return Ok(ConstInit::Zero);
    }
    Ok(built)
}

fn build_const_init(init: &InitializerElement) -> Result<ConstInit> {
    match init {
        InitializerElement::Expr(expr) => match expr.as_number() {
            Some(Number::Int(v)) => Ok(ConstInit::Int(v)),
            Some(Number::Float(v)) => Ok(ConstInit::Float(v)),
            None => Err(Error::NonConstInit),
        },
        InitializerElement::List(elements) => {
            let mut out = Vec::with_capacity(elements.len());
            for element in elements {
                out.push(build_const_init(element)?);
            }
            Ok(ConstInit::Array(out))
        }
    }
}

/// Computes the address of `name[indices...]`.
///
/// The symbol table stores the address of storage, so a scalar slot is
/// `T*` and an array-parameter slot is `T**`: its first index loads the
/// decayed pointer and steps it, later indices peel array layers with the
/// leading-zero form.
pub fn get_variable_pointer(ctx: &mut Ctx, name: &str, indices: &[Expr]) -> Result<Operand> {
    let var = ctx
        .symbol_table
        .resolve(name)
        .ok_or_else(|| Error::SymbolNotFound(name.to_string()))?;

    if indices.is_empty() {
        return Ok(var);
    }

    let mut base = var;
    let mut use_getptr_first = false;
    if ctx.value_type(var).pointee().is_some_and(IrType::is_ptr) {
        base = ctx.emit_load(var);
        use_getptr_first = true;
    }

    for (i, index) in indices.iter().enumerate() {
        let index = gen_value(index, ctx)?;
        let index = cast::cast(ctx, index, Typename::Int)?;
        base = if i == 0 && use_getptr_first {
            ctx.emit_get_ptr(base, index)
        } else {
            ctx.emit_get_elem_ptr(base, index)
        };
    }
    Ok(base)
}

/// Loads (or decays) a variable reference used as an expression.
///
/// A reference that still addresses an array — the bare name of a local or
/// global array, or a partial index chain — decays to a pointer to its
/// first element so it can be passed as an argument; anything else loads.
pub fn load_variable(ctx: &mut Ctx, name: &str, indices: &[Expr]) -> Result<Operand> {
    let addr = get_variable_pointer(ctx, name, indices)?;
    match ctx.value_type(addr).pointee() {
        Some(IrType::Array(..)) => Ok(ctx.emit_get_elem_ptr(addr, Operand::ConstInt(0))),
        _ => Ok(ctx.emit_load(addr)),
    }
}

/// Emits the runtime stores for a local initializer, one per leaf of the
/// normalized tree, addressing each element by its constant index path.
pub fn dynamic_init(
    ctx: &mut Ctx,
    slot: Operand,
    init: &InitializerElement,
    elem_ty: Typename,
) -> Result<()> {
    let mut indices = Vec::new();
    dynamic_init_walk(ctx, slot, init, elem_ty, &mut indices)
}

fn dynamic_init_walk(
    ctx: &mut Ctx,
    slot: Operand,
    init: &InitializerElement,
    elem_ty: Typename,
    indices: &mut Vec<i32>,
) -> Result<()> {
    match init {
        InitializerElement::Expr(expr) => {
            let value = gen_value(expr, ctx)?;
            let mut addr = slot;
            for &index in indices.iter() {
                addr = ctx.emit_get_elem_ptr(addr, Operand::ConstInt(index));
            }
            let value = cast::cast(ctx, value, elem_ty)?;
            ctx.emit_store(value, addr);
            Ok(())
        }
        InitializerElement::List(elements) => {
            for (i, element) in elements.iter().enumerate() {
                indices.push(i as i32);
                dynamic_init_walk(ctx, slot, element, elem_ty, indices)?;
                indices.pop();
            }
            Ok(())
        }
    }
}
