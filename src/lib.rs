//! SysY compiler front-end.
//!
//! Pipeline: parse (lalrpop) → const-eval (fold constants, normalize
//! initializers) → lowering (typed SSA IR) → verify. The driver renders
//! the resulting module as LLVM-flavored text for the downstream pipeline.

pub mod ast;
pub mod cli;
pub mod consteval;
pub mod diagnostics;
pub mod error;
pub mod ir;
pub mod irgen;
pub mod json;
pub mod literal;
pub mod logger;
pub mod ty;

use lalrpop_util::lalrpop_mod;

lalrpop_mod!(sysy);

pub use error::{Error, ErrorKind, Result};

/// Parses a SysY source text into its AST.
pub fn parse(source: &str) -> Result<ast::CompileUnit> {
    sysy::CompUnitParser::new()
        .parse(source)
        .map_err(|e| Error::Syntax(diagnostics::render_parse_error(source, &e)))
}

/// Runs the whole front-end over a source text.
pub fn compile(source: &str) -> Result<ir::Module> {
    let mut unit = parse(source)?;
    log!("parser", "{}", json::dump(&unit));
    consteval::run(&mut unit)?;
    log!("consteval", "{}", json::dump(&unit));
    irgen::generate_module(&unit)
}
