use crate::ast::*;
use crate::error::{Error, Result};
use crate::ir::{
    verify, BinOp, FCmpCond, FunctionBuilder, ICmpCond, IrType, Linkage, Operand, Param,
};
use crate::irgen::ctx::{Ctx, LoopFrame};
use crate::irgen::{array, builtin, cast};
use crate::log;
use crate::ty;
use crate::ty::Typename;

pub trait IRGen {
    type Output;

    fn generate(&self, ctx: &mut Ctx) -> Result<Self::Output>;
}

impl IRGen for CompileUnit {
    type Output = ();

    fn generate(&self, ctx: &mut Ctx) -> Result<Self::Output> {
        builtin::load_builtins(ctx)?;
        for item in &self.items {
            match item {
                GlobalItem::Decl(decl) => decl.generate(ctx)?,
                GlobalItem::Func(func) => func.generate(ctx)?,
            }
        }
        Ok(())
    }
}

impl IRGen for Decl {
    type Output = ();

    fn generate(&self, ctx: &mut Ctx) -> Result<Self::Output> {
        match self {
            Decl::Const(decl) => {
                for def in &decl.defs {
                    lower_const_def(ctx, decl.ty, def)?;
                }
                Ok(())
            }
            Decl::Var(decl) => {
                for def in &decl.defs {
                    if ctx.in_function {
                        lower_local_var(ctx, decl.ty, def)?;
                    } else {
                        lower_global_var(ctx, decl.ty, def)?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// Constants become internal globals with the fully-folded aggregate. A
/// constant declared inside a function gets a symbol qualified by the
/// enclosing function's name; the local name still binds in the current
/// scope.
fn lower_const_def(ctx: &mut Ctx, ty: Typename, def: &ConstVariableDef) -> Result<()> {
    let dims = array::dims_of(&def.dims)?;
    let opt_dims: Vec<Option<usize>> = dims.iter().map(|d| Some(*d)).collect();
    let ir_ty = ty::realize_array(ty, &opt_dims);
    let init = array::const_init_from(&def.init)?;

    let symbol = if ctx.in_function {
        format!("{}.{}", ctx.cur_func_name(), def.name)
    } else {
        def.name.clone()
    };
    let id = ctx.module.add_global(symbol, ir_ty, init, Linkage::Internal);
    ctx.symbol_table
        .define(def.name.clone(), Operand::Global(id))
}

fn lower_global_var(ctx: &mut Ctx, ty: Typename, def: &VariableDef) -> Result<()> {
    let dims = array::dims_of(&def.dims)?;
    let opt_dims: Vec<Option<usize>> = dims.iter().map(|d| Some(*d)).collect();
    let ir_ty = ty::realize_array(ty, &opt_dims);

    let init = match &def.init {
        Some(init) => array::const_init_from(init)?,
        None => crate::ir::ConstInit::Zero,
    };
    let id = ctx
        .module
        .add_global(def.name.clone(), ir_ty, init, Linkage::Internal);
    ctx.symbol_table
        .define(def.name.clone(), Operand::Global(id))
}

fn lower_local_var(ctx: &mut Ctx, ty: Typename, def: &VariableDef) -> Result<()> {
    let dims = array::dims_of(&def.dims)?;
    let opt_dims: Vec<Option<usize>> = dims.iter().map(|d| Some(*d)).collect();
    let ir_ty = ty::realize_array(ty, &opt_dims);

    let slot = ctx.alloca(ir_ty);
    if let Some(init) = &def.init {
        array::dynamic_init(ctx, slot, init, ty)?;
    }
    ctx.symbol_table.define(def.name.clone(), slot)
}

impl IRGen for FunctionDef {
    type Output = ();

    fn generate(&self, ctx: &mut Ctx) -> Result<Self::Output> {
        log!("irgen", "function {}", self.name);

        let return_ty = ty::realize(self.return_ty);
        let mut params = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            let ty = match &arg.dims {
                None => ty::realize(arg.ty),
                Some(dims) => ty::realize_array(arg.ty, &array::param_dims(dims)?),
            };
            params.push(Param {
                name: arg.name.clone(),
                ty,
            });
        }

        // `main` stays visible to the linker; everything else is internal
        // so the downstream pipeline can inline it.
        let linkage = if self.name == "main" {
            Linkage::External
        } else {
            Linkage::Internal
        };

        let id = ctx
            .module
            .declare_function(self.name.clone(), params.clone(), return_ty.clone(), linkage)
            .map_err(|_| Error::DuplicatedDef(self.name.clone()))?;

        let mut builder = FunctionBuilder::new(self.name.clone(), params, return_ty.clone(), linkage);
        let entry = builder.create_block("entry");
        builder.set_insert_point(entry);
        ctx.start_function(builder);

        ctx.symbol_table.enter_scope();
        let body = self.lower_body(ctx);
        ctx.symbol_table.exit_scope();
        body?;

        if return_ty.is_void() {
            ctx.builder().seal_unterminated_with_ret_void();
        }

        let func = ctx.finish_function();
        verify::verify_function(&func).map_err(Error::Verify)?;
        ctx.module.set_function_body(id, func);
        Ok(())
    }
}

impl FunctionDef {
    /// Parameters get a stack slot holding the incoming argument; the body
    /// shares the function scope with them.
    fn lower_body(&self, ctx: &mut Ctx) -> Result<()> {
        for (i, arg) in self.args.iter().enumerate() {
            let param_ty = ctx.builder().func().params[i].ty.clone();
            let slot = ctx.alloca(param_ty);
            ctx.emit_store(Operand::Arg(i as u32), slot);
            ctx.symbol_table.define(arg.name.clone(), slot)?;
        }
        self.body.generate(ctx)
    }
}

impl IRGen for Block {
    type Output = ();

    fn generate(&self, ctx: &mut Ctx) -> Result<Self::Output> {
        for item in &self.items {
            // Statements after break/continue/return never execute.
            if !ctx.is_live() {
                break;
            }
            match item {
                BlockItem::Decl(decl) => decl.generate(ctx)?,
                BlockItem::Stmt(stmt) => stmt.generate(ctx)?,
            }
        }
        Ok(())
    }
}

impl IRGen for Stmt {
    type Output = ();

    fn generate(&self, ctx: &mut Ctx) -> Result<Self::Output> {
        match self {
            Stmt::Assign { lvalue, rvalue } => {
                let addr = array::get_variable_pointer(ctx, &lvalue.name, &lvalue.indices)?;
                let pointee = ctx
                    .value_type(addr)
                    .pointee()
                    .cloned()
                    .unwrap_or(IrType::Void);
                let want = cast::typename_of(&pointee).ok_or(Error::ArrayAssign)?;
                let value = gen_value(rvalue, ctx)?;
                let value = cast::cast(ctx, value, want)?;
                ctx.emit_store(value, addr);
                Ok(())
            }

            Stmt::Expr(expr) => {
                expr.generate(ctx)?;
                Ok(())
            }

            Stmt::Null => Ok(()),

            Stmt::Block(block) => {
                ctx.symbol_table.enter_scope();
                let result = block.generate(ctx);
                ctx.symbol_table.exit_scope();
                result
            }

            Stmt::If { cond, then, els } => lower_if(ctx, cond, then, els.as_deref()),

            Stmt::While { cond, body } => lower_while(ctx, cond, body),

            Stmt::Break => {
                let frame = *ctx.loop_stack.last().ok_or(Error::NotInLoop)?;
                ctx.emit_jump(frame.break_target);
                ctx.builder().clear_insert_point();
                Ok(())
            }

            Stmt::Continue => {
                let frame = *ctx.loop_stack.last().ok_or(Error::NotInLoop)?;
                ctx.emit_jump(frame.continue_target);
                ctx.builder().clear_insert_point();
                Ok(())
            }

            Stmt::Return(expr) => {
                if !ctx.is_live() {
                    return Ok(());
                }
                let return_ty = ctx.builder().return_ty().clone();
                match expr {
                    Some(expr) => {
                        if return_ty.is_void() {
                            return Err(Error::RetValInVoidFunc);
                        }
                        let want = cast::typename_of(&return_ty).ok_or(Error::UseVoidValue)?;
                        let value = gen_value(expr, ctx)?;
                        let value = cast::cast(ctx, value, want)?;
                        ctx.emit_ret(Some(value));
                    }
                    // A bare `return` in a non-void function reaches the
                    // verifier as a ret-arity mismatch.
                    None => ctx.emit_ret(None),
                }
                ctx.builder().clear_insert_point();
                Ok(())
            }
        }
    }
}

fn lower_if(ctx: &mut Ctx, cond: &Expr, then: &Stmt, els: Option<&Stmt>) -> Result<()> {
    let cond_val = gen_value(cond, ctx)?;
    let cond_val = cast::to_bool(ctx, cond_val)?;

    match els {
        None => {
            let then_bb = ctx.builder().create_block("then");
            let merge_bb = ctx.builder().create_block("merge");
            ctx.emit_branch(cond_val, then_bb, merge_bb);

            ctx.builder().set_insert_point(then_bb);
            then.generate(ctx)?;
            if ctx.is_live() {
                ctx.emit_jump(merge_bb);
            }
            ctx.builder().set_insert_point(merge_bb);
            Ok(())
        }
        Some(els) => {
            let then_bb = ctx.builder().create_block("then");
            let else_bb = ctx.builder().create_block("else");
            ctx.emit_branch(cond_val, then_bb, else_bb);

            ctx.builder().set_insert_point(then_bb);
            then.generate(ctx)?;
            let then_end = ctx.is_live().then(|| ctx.builder().insert_point()).flatten();

            ctx.builder().set_insert_point(else_bb);
            els.generate(ctx)?;
            let else_end = ctx.is_live().then(|| ctx.builder().insert_point()).flatten();

            // The merge block only exists if some arm falls through to it.
            if then_end.is_some() || else_end.is_some() {
                let merge_bb = ctx.builder().create_block("merge");
                if let Some(bb) = then_end {
                    ctx.builder().set_insert_point(bb);
                    ctx.emit_jump(merge_bb);
                }
                if let Some(bb) = else_end {
                    ctx.builder().set_insert_point(bb);
                    ctx.emit_jump(merge_bb);
                }
                ctx.builder().set_insert_point(merge_bb);
            } else {
                ctx.builder().clear_insert_point();
            }
            Ok(())
        }
    }
}

fn lower_while(ctx: &mut Ctx, cond: &Expr, body: &Stmt) -> Result<()> {
    let cond_bb = ctx.builder().create_block("while_cond");
    let body_bb = ctx.builder().create_block("while_body");
    let end_bb = ctx.builder().create_block("while_end");

    ctx.emit_jump(cond_bb);

    ctx.builder().set_insert_point(cond_bb);
    let cond_val = gen_value(cond, ctx)?;
    let cond_val = cast::to_bool(ctx, cond_val)?;
    ctx.emit_branch(cond_val, body_bb, end_bb);

    ctx.builder().set_insert_point(body_bb);
    ctx.loop_stack.push(LoopFrame {
        continue_target: cond_bb,
        break_target: end_bb,
    });
    let result = body.generate(ctx);
    ctx.loop_stack.pop();
    result?;
    if ctx.is_live() {
        ctx.emit_jump(cond_bb);
    }

    ctx.builder().set_insert_point(end_bb);
    Ok(())
}

impl IRGen for Expr {
    type Output = Option<Operand>;

    fn generate(&self, ctx: &mut Ctx) -> Result<Self::Output> {
        match self {
            Expr::Number(Number::Int(v)) => Ok(Some(Operand::ConstInt(*v))),
            Expr::Number(Number::Float(v)) => Ok(Some(Operand::ConstFloat(*v))),

            Expr::Variable(lvalue) => {
                Ok(Some(array::load_variable(ctx, &lvalue.name, &lvalue.indices)?))
            }

            Expr::Unary { op, expr } => {
                let value = gen_value(expr, ctx)?;
                match op {
                    UnaryOp::Plus => {
                        let (value, _) =
                            cast::unary_expr_type_fix(ctx, value, Typename::Int, Typename::Float)?;
                        Ok(Some(value))
                    }
                    UnaryOp::Minus => {
                        let (value, calc) =
                            cast::unary_expr_type_fix(ctx, value, Typename::Int, Typename::Float)?;
                        let value = match calc {
                            Typename::Float => ctx.emit_fneg(value),
                            _ => ctx.emit_binary(BinOp::Sub, Operand::ConstInt(0), value),
                        };
                        Ok(Some(value))
                    }
                    UnaryOp::Not => {
                        let value = cast::to_bool(ctx, value)?;
                        Ok(Some(ctx.emit_not(value)))
                    }
                }
            }

            Expr::Binary { op, lhs, rhs } => match op {
                BinaryOp::And | BinaryOp::Or => short_circuit(ctx, *op, lhs, rhs),
                BinaryOp::Add
                | BinaryOp::Sub
                | BinaryOp::Mul
                | BinaryOp::Div
                | BinaryOp::Mod => arithmetic(ctx, *op, lhs, rhs),
                _ => comparison(ctx, *op, lhs, rhs),
            },

            Expr::Call { name, args } => lower_call(ctx, name, args),
        }
    }
}

/// Lowers an expression that must produce a value.
pub(crate) fn gen_value(expr: &Expr, ctx: &mut Ctx) -> Result<Operand> {
    expr.generate(ctx)?.ok_or(Error::UseVoidValue)
}

fn arithmetic(ctx: &mut Ctx, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Option<Operand>> {
    let lhs = gen_value(lhs, ctx)?;
    let rhs = gen_value(rhs, ctx)?;
    let (lhs, rhs, calc) =
        cast::binary_expr_type_fix(ctx, lhs, rhs, Typename::Int, Typename::Float)?;

    let bin_op = match (op, calc) {
        (BinaryOp::Add, Typename::Float) => BinOp::FAdd,
        (BinaryOp::Sub, Typename::Float) => BinOp::FSub,
        (BinaryOp::Mul, Typename::Float) => BinOp::FMul,
        (BinaryOp::Div, Typename::Float) => BinOp::FDiv,
        (BinaryOp::Mod, Typename::Float) => return Err(Error::FloatMod),
        (BinaryOp::Add, _) => BinOp::Add,
        (BinaryOp::Sub, _) => BinOp::Sub,
        (BinaryOp::Mul, _) => BinOp::Mul,
        (BinaryOp::Div, _) => BinOp::SDiv,
        (BinaryOp::Mod, _) => BinOp::SRem,
        _ => unreachable!("non-arithmetic operator"),
    };
    Ok(Some(ctx.emit_binary(bin_op, lhs, rhs)))
}

fn comparison(ctx: &mut Ctx, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Option<Operand>> {
    let lhs = gen_value(lhs, ctx)?;
    let rhs = gen_value(rhs, ctx)?;
    let (lhs, rhs, calc) =
        cast::binary_expr_type_fix(ctx, lhs, rhs, Typename::Int, Typename::Float)?;

    let value = if calc == Typename::Float {
        let cond = match op {
            BinaryOp::Lt => FCmpCond::Olt,
            BinaryOp::Le => FCmpCond::Ole,
            BinaryOp::Gt => FCmpCond::Ogt,
            BinaryOp::Ge => FCmpCond::Oge,
            BinaryOp::Eq => FCmpCond::Oeq,
            BinaryOp::Ne => FCmpCond::One,
            _ => unreachable!("non-relational operator"),
        };
        ctx.emit_fcmp(cond, lhs, rhs)
    } else {
        let cond = match op {
            BinaryOp::Lt => ICmpCond::Slt,
            BinaryOp::Le => ICmpCond::Sle,
            BinaryOp::Gt => ICmpCond::Sgt,
            BinaryOp::Ge => ICmpCond::Sge,
            BinaryOp::Eq => ICmpCond::Eq,
            BinaryOp::Ne => ICmpCond::Ne,
            _ => unreachable!("non-relational operator"),
        };
        ctx.emit_icmp(cond, lhs, rhs)
    };
    Ok(Some(value))
}

/// Short-circuit `&&`/`||`: the right-hand side only runs when the left
/// did not already decide the result; a phi merges the two paths.
fn short_circuit(ctx: &mut Ctx, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Option<Operand>> {
    let lhs = gen_value(lhs, ctx)?;
    let lhs = cast::to_bool(ctx, lhs)?;
    let lhs_end = ctx
        .builder()
        .insert_point()
        .expect("expression lowered without insertion point");

    let (rhs_bb, merge_bb) = match op {
        BinaryOp::And => {
            let rhs_bb = ctx.builder().create_block("and");
            let merge_bb = ctx.builder().create_block("merge");
            ctx.emit_branch(lhs, rhs_bb, merge_bb);
            (rhs_bb, merge_bb)
        }
        BinaryOp::Or => {
            let rhs_bb = ctx.builder().create_block("or");
            let merge_bb = ctx.builder().create_block("merge");
            ctx.emit_branch(lhs, merge_bb, rhs_bb);
            (rhs_bb, merge_bb)
        }
        _ => unreachable!("non-logical operator"),
    };

    ctx.builder().set_insert_point(rhs_bb);
    let rhs = gen_value(rhs, ctx)?;
    let rhs = cast::to_bool(ctx, rhs)?;
    let rhs_end = ctx
        .builder()
        .insert_point()
        .expect("expression lowered without insertion point");
    ctx.emit_jump(merge_bb);

    ctx.builder().set_insert_point(merge_bb);
    let value = ctx.emit_phi(IrType::Bool, vec![(lhs, lhs_end), (rhs, rhs_end)]);
    Ok(Some(value))
}

fn lower_call(ctx: &mut Ctx, name: &str, args: &[Expr]) -> Result<Option<Operand>> {
    // Functions live in a single module-wide namespace; local variables
    // never shadow them for calls.
    let id = ctx
        .module
        .func_id(name)
        .ok_or_else(|| Error::SymbolNotFound(name.to_string()))?;
    let callee = ctx.module.function(id);
    let param_tys: Vec<IrType> = callee.params.iter().map(|p| p.ty.clone()).collect();
    let return_ty = callee.return_ty.clone();

    if args.len() != param_tys.len() {
        return Err(Error::ArgMismatch(name.to_string()));
    }

    let mut values = Vec::with_capacity(args.len());
    for (arg, param_ty) in args.iter().zip(&param_tys) {
        let value = gen_value(arg, ctx)?;
        let value = if ctx.value_type(value) == *param_ty {
            value
        } else {
            match cast::typename_of(param_ty) {
                Some(want) => cast::cast(ctx, value, want)?,
                None => return Err(Error::ArgMismatch(name.to_string())),
            }
        };
        values.push(value);
    }

    Ok(ctx.emit_call(id, values, return_ty))
}
