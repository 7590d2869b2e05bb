//! Initializer normalization.
//!
//! `fix_nested_initializer` rewrites a braced initializer into the canonical
//! nested form dictated by the declared dimensions, in two steps:
//!
//! 1. flatten: depth-first walk that splices flattened sub-lists into their
//!    parent, rejects over-full levels, and zero-pads under-full ones until
//!    the tree is a single flat list of exactly `∏ dims` leaves;
//! 2. split: re-nest the flat list by carving contiguous chunks of size
//!    `∏ dims[1..]`, recursively.

use crate::ast::{Expr, InitializerElement, Number};
use crate::consteval::fold::type_fix;
use crate::error::{Error, Result};
use crate::ty::Typename;

pub fn fix_nested_initializer(
    init: &mut InitializerElement,
    dims: &[usize],
    ty: Typename,
) -> Result<()> {
    // A bare scalar over an array shape fills the first element.
    if matches!(init, InitializerElement::Expr(_)) {
        let expr = std::mem::replace(
            init,
            InitializerElement::List(Vec::new()),
        );
        *init = InitializerElement::List(vec![expr]);
    }
    flatten(init, dims, ty)?;
    split(init, dims);
    Ok(())
}

fn flatten(init: &mut InitializerElement, dims: &[usize], ty: Typename) -> Result<()> {
    let elements = match init {
        InitializerElement::Expr(_) => return Ok(()),
        InitializerElement::List(elements) => elements,
    };

    if dims.is_empty() {
        return Err(Error::InitializerTooDeep);
    }
    let full_size: usize = dims.iter().product();
    let sub_dims = &dims[1..];

    let mut flat = Vec::with_capacity(full_size);
    for mut element in std::mem::take(elements) {
        flatten(&mut element, sub_dims, ty)?;
        match element {
            InitializerElement::Expr(_) => flat.push(element),
            InitializerElement::List(sub) => flat.extend(sub),
        }
    }

    if flat.len() > full_size {
        return Err(Error::InitializerOverflow);
    }
    while flat.len() < full_size {
        flat.push(InitializerElement::Expr(Expr::Number(Number::zero(ty))));
    }

    *elements = flat;
    Ok(())
}

fn split(init: &mut InitializerElement, dims: &[usize]) {
    if dims.len() <= 1 {
        return;
    }
    let elements = match init {
        InitializerElement::Expr(_) => return,
        InitializerElement::List(elements) => elements,
    };

    let full_size: usize = dims.iter().product();
    if full_size == 0 {
        elements.clear();
        return;
    }
    let step = full_size / dims[0];

    let flat = std::mem::take(elements);
    let mut nested = Vec::with_capacity(dims[0]);
    let mut iter = flat.into_iter();
    for _ in 0..dims[0] {
        let chunk: Vec<_> = iter.by_ref().take(step).collect();
        let mut element = InitializerElement::List(chunk);
        split(&mut element, &dims[1..]);
        nested.push(element);
    }
    *elements = nested;
}

/// Every leaf of a constant initializer must have folded to a literal.
pub(crate) fn const_initializer_assert(init: &InitializerElement) -> Result<()> {
    match init {
        InitializerElement::Expr(expr) => {
            if expr.as_number().is_none() {
                return Err(Error::NonConstInit);
            }
            Ok(())
        }
        InitializerElement::List(elements) => {
            for element in elements {
                const_initializer_assert(element)?;
            }
            Ok(())
        }
    }
}

/// Coerces every literal leaf to the declared element type. Non-literal
/// leaves are deferred to lowering, which casts the stored value instead.
pub(crate) fn initializer_type_fix(init: &mut InitializerElement, want: Typename) -> Result<()> {
    match init {
        InitializerElement::Expr(expr) => {
            if let Some(value) = expr.as_number() {
                if value.ty() != want {
                    *expr = Expr::Number(type_fix(value, want)?);
                }
            }
            Ok(())
        }
        InitializerElement::List(elements) => {
            for element in elements {
                initializer_type_fix(element, want)?;
            }
            Ok(())
        }
    }
}
