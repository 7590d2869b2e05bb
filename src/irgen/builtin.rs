//! SysY runtime library prototypes.
//!
//! The runtime is linked externally; only declarations are emitted, with
//! the signatures of the SysY standard library.

use crate::error::{Error, Result};
use crate::ir::{IrType, Linkage, Param};
use crate::irgen::ctx::Ctx;

fn param(name: &str, ty: IrType) -> Param {
    Param {
        name: name.to_string(),
        ty,
    }
}

pub fn load_builtins(ctx: &mut Ctx) -> Result<()> {
    let int_ptr = IrType::Int.ptr_to();
    let float_ptr = IrType::Float.ptr_to();

    let builtins: Vec<(IrType, &str, Vec<Param>)> = vec![
        (IrType::Int, "getint", vec![]),
        (IrType::Int, "getch", vec![]),
        (IrType::Float, "getfloat", vec![]),
        (IrType::Int, "getarray", vec![param("a", int_ptr.clone())]),
        (IrType::Int, "getfarray", vec![param("a", float_ptr.clone())]),
        (IrType::Void, "putint", vec![param("a", IrType::Int)]),
        (IrType::Void, "putch", vec![param("a", IrType::Int)]),
        (IrType::Void, "putfloat", vec![param("a", IrType::Float)]),
        (
            IrType::Void,
            "putarray",
            vec![param("n", IrType::Int), param("a", int_ptr)],
        ),
        (
            IrType::Void,
            "putfarray",
            vec![param("n", IrType::Int), param("a", float_ptr)],
        ),
        (
            IrType::Void,
            "_sysy_starttime",
            vec![param("lineno", IrType::Int)],
        ),
        (
            IrType::Void,
            "_sysy_stoptime",
            vec![param("lineno", IrType::Int)],
        ),
    ];

    for (return_ty, name, params) in builtins {
        ctx.module
            .declare_function(name, params, return_ty, Linkage::External)
            .map_err(|_| Error::DuplicatedDef(name.to_string()))?;
    }
    Ok(())
}
