//! Constant-evaluation pass.
//!
//! A whole-program AST rewrite that runs before lowering: declaration
//! dimensions are folded to non-negative integer literals, nested
//! initializers are reshaped to mirror the declared dimensions, literal
//! leaves are coerced to the declared element type, and scalar constants
//! are bound so later declaration contexts can fold through them.
//!
//! Folding is confined to declaration contexts: statement expressions and
//! conditions are left for the lowering pass.

mod fold;
mod init;

use std::collections::HashMap;

use crate::ast::*;
use crate::error::{Error, Result};
use crate::log;

pub use init::fix_nested_initializer;

/// Scoped table of scalar compile-time constants (name -> literal).
pub struct ConstSymTable {
    scopes: Vec<HashMap<String, Number>>,
}

impl ConstSymTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()], // global scope
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn define(&mut self, name: String, value: Number) -> Result<()> {
        let scope = self.scopes.last_mut().unwrap();
        if scope.contains_key(&name) {
            return Err(Error::DuplicatedDef(name));
        }
        scope.insert(name, value);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<Number> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .copied()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for ConstSymTable {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ConstEval {
    table: ConstSymTable,
}

/// Runs the pass over a whole compile unit, rewriting it in place.
pub fn run(unit: &mut CompileUnit) -> Result<()> {
    log!("consteval", "start");
    let mut pass = ConstEval::new();
    for item in &mut unit.items {
        match item {
            GlobalItem::Decl(decl) => pass.fold_decl(decl)?,
            GlobalItem::Func(func) => pass.fold_func(func)?,
        }
    }
    log!("consteval", "done");
    Ok(())
}

impl ConstEval {
    pub fn new() -> Self {
        Self {
            table: ConstSymTable::new(),
        }
    }

    fn fold_decl(&mut self, decl: &mut Decl) -> Result<()> {
        match decl {
            Decl::Const(decl) => self.fold_const_decl(decl),
            Decl::Var(decl) => self.fold_var_decl(decl),
        }
    }

    fn fold_const_decl(&mut self, decl: &mut ConstVariableDecl) -> Result<()> {
        for def in &mut decl.defs {
            let dims = self.fold_dims(&mut def.dims)?;

            if dims.is_empty() {
                if !matches!(def.init, InitializerElement::Expr(_)) {
                    return Err(Error::ScalarListInit);
                }
            } else {
                fix_nested_initializer(&mut def.init, &dims, decl.ty)?;
            }

            self.fold_initializer(&mut def.init)?;
            init::const_initializer_assert(&def.init)?;
            init::initializer_type_fix(&mut def.init, decl.ty)?;

            // Scalar constants feed later folds through the table; array
            // constants stay addressable storage and are not recorded.
            if def.dims.is_empty() {
                let InitializerElement::Expr(expr) = &def.init else {
                    return Err(Error::NonConstInit);
                };
                let value = expr.as_number().ok_or(Error::NonConstInit)?;
                self.table.define(def.name.clone(), value)?;
            }
        }
        Ok(())
    }

    fn fold_var_decl(&mut self, decl: &mut VariableDecl) -> Result<()> {
        for def in &mut decl.defs {
            let dims = self.fold_dims(&mut def.dims)?;

            let Some(init) = &mut def.init else {
                continue;
            };

            if dims.is_empty() {
                if !matches!(init, InitializerElement::Expr(_)) {
                    return Err(Error::ScalarListInit);
                }
            } else {
                fix_nested_initializer(init, &dims, decl.ty)?;
            }

            self.fold_initializer(init)?;
            // Non-literal leaves stay: local initializers become runtime
            // stores during lowering.
            init::initializer_type_fix(init, decl.ty)?;
        }
        Ok(())
    }

    fn fold_func(&mut self, func: &mut FunctionDef) -> Result<()> {
        self.table.enter_scope();
        let result = self.fold_func_inner(func);
        self.table.exit_scope();
        result
    }

    fn fold_func_inner(&mut self, func: &mut FunctionDef) -> Result<()> {
        for arg in &mut func.args {
            if let Some(dims) = &mut arg.dims {
                for dim in dims.iter_mut().flatten() {
                    *dim = self.fold_expr(std::mem::replace(dim, PLACEHOLDER))?;
                    check_dim(dim)?;
                }
            }
        }
        self.fold_block(&mut func.body)
    }

    fn fold_block(&mut self, block: &mut Block) -> Result<()> {
        for item in &mut block.items {
            match item {
                BlockItem::Decl(decl) => self.fold_decl(decl)?,
                BlockItem::Stmt(stmt) => self.fold_stmt(stmt)?,
            }
        }
        Ok(())
    }

    fn fold_stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        match stmt {
            // Only declaration contexts must be compile-time evaluable;
            // statement expressions are lowered as-is.
            Stmt::Assign { .. }
            | Stmt::Expr(_)
            | Stmt::Null
            | Stmt::Break
            | Stmt::Continue
            | Stmt::Return(_) => Ok(()),
            Stmt::Block(block) => {
                self.table.enter_scope();
                let result = self.fold_block(block);
                self.table.exit_scope();
                result
            }
            Stmt::If { then, els, .. } => {
                self.fold_stmt(then)?;
                if let Some(els) = els {
                    self.fold_stmt(els)?;
                }
                Ok(())
            }
            Stmt::While { body, .. } => self.fold_stmt(body),
        }
    }

    /// Folds every dimension expression and returns the concrete extents.
    fn fold_dims(&mut self, dims: &mut [Expr]) -> Result<Vec<usize>> {
        let mut lens = Vec::with_capacity(dims.len());
        for dim in dims.iter_mut() {
            *dim = self.fold_expr(std::mem::replace(dim, PLACEHOLDER))?;
            lens.push(check_dim(dim)?);
        }
        Ok(lens)
    }

    /// Folds every leaf expression of an initializer tree.
    fn fold_initializer(&mut self, init: &mut InitializerElement) -> Result<()> {
        match init {
            InitializerElement::Expr(expr) => {
                *expr = self.fold_expr(std::mem::replace(expr, PLACEHOLDER))?;
                Ok(())
            }
            InitializerElement::List(elements) => {
                for element in elements {
                    self.fold_initializer(element)?;
                }
                Ok(())
            }
        }
    }

    pub(crate) fn table(&self) -> &ConstSymTable {
        &self.table
    }
}

impl Default for ConstEval {
    fn default() -> Self {
        Self::new()
    }
}

/// Stand-in written over a slot while its owned expression is folded.
pub(crate) const PLACEHOLDER: Expr = Expr::Number(Number::Int(0));

/// A folded dimension must be a non-negative integer literal.
fn check_dim(dim: &Expr) -> Result<usize> {
    match dim.as_number() {
        Some(Number::Int(v)) if v >= 0 => Ok(v as usize),
        _ => Err(Error::InvalidArrayLen),
    }
}
