//! Lowering pass: walks the const-eval'd AST and emits the IR module.

mod array;
mod builtin;
mod cast;
mod ctx;
mod generate;

pub use ctx::{Ctx, LoopFrame, SymbolTable};
pub use generate::IRGen;

use crate::ast::CompileUnit;
use crate::error::Result;
use crate::ir::Module;
use crate::log;

/// Lowers a whole compile unit. Expects const-eval to have run: every
/// declaration dimension is a literal and every initializer is in
/// canonical shape.
pub fn generate_module(unit: &CompileUnit) -> Result<Module> {
    log!("irgen", "start");
    let mut ctx = Ctx::new();
    unit.generate(&mut ctx)?;
    log!(
        "irgen",
        "done: {} globals, {} functions",
        ctx.module.globals().len(),
        ctx.module.functions().len()
    );
    Ok(ctx.module)
}
