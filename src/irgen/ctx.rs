use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::ir::{
    BinOp, BlockId, CastOp, FCmpCond, Function, FunctionBuilder, ICmpCond, Instr, IrType, Module,
    Operand, ValueId,
};

/// Scoped table mapping a name to the address of its storage (an alloca
/// slot or a module global).
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Operand>>,
}

impl SymbolTable {
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

    pub fn define(&mut self, name: String, addr: Operand) -> Result<()> {
        let scope = self.scopes.last_mut().unwrap();
        if scope.contains_key(&name) {
            return Err(Error::DuplicatedDef(name));
        }
        scope.insert(name, addr);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<Operand> {
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

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// One active `while`: where `continue` and `break` jump.
#[derive(Debug, Clone, Copy)]
pub struct LoopFrame {
    pub continue_target: BlockId,
    pub break_target: BlockId,
}

/// Mutable state threaded through the lowering walk.
pub struct Ctx {
    pub module: Module,
    builder: Option<FunctionBuilder>,
    pub symbol_table: SymbolTable,
    pub loop_stack: Vec<LoopFrame>,
    pub in_function: bool,
    cur_func_name: String,
}

impl Ctx {
    pub fn new() -> Self {
        Self {
            // The original front-end names its output module after the
            // source language.
            module: Module::new("SysY_src"),
            builder: None,
            symbol_table: SymbolTable::new(),
            loop_stack: Vec::new(),
            in_function: false,
            cur_func_name: String::new(),
        }
    }

    pub fn start_function(&mut self, builder: FunctionBuilder) {
        self.cur_func_name = builder.func().name.clone();
        self.builder = Some(builder);
        self.in_function = true;
    }

    pub fn finish_function(&mut self) -> Function {
        self.in_function = false;
        self.cur_func_name.clear();
        self.builder.take().expect("not inside a function").build()
    }

    pub fn builder(&mut self) -> &mut FunctionBuilder {
        self.builder.as_mut().expect("not inside a function")
    }

    pub fn cur_func_name(&self) -> &str {
        &self.cur_func_name
    }

    /// True when instructions currently land in a live block.
    pub fn is_live(&self) -> bool {
        self.builder.as_ref().map_or(false, FunctionBuilder::is_live)
    }

    /// The type of any operand in the current lowering position.
    pub fn value_type(&self, op: Operand) -> IrType {
        match op {
            Operand::Global(id) => self.module.global(id).ty.clone().ptr_to(),
            other => self
                .builder
                .as_ref()
                .and_then(|b| b.func().local_operand_type(other))
                .unwrap_or(IrType::Void),
        }
    }

    fn push_value(&mut self, instr: Instr, ty: IrType) -> Operand {
        let id = instr.result().expect("instruction defines a value");
        self.builder().push(instr, Some(ty));
        Operand::Value(id)
    }

    pub fn fresh_value(&mut self) -> ValueId {
        self.builder().fresh_value()
    }

    pub fn alloca(&mut self, ty: IrType) -> Operand {
        Operand::Value(self.builder().push_alloca(ty))
    }

    pub fn emit_binary(&mut self, op: BinOp, lhs: Operand, rhs: Operand) -> Operand {
        let ty = match op {
            BinOp::FAdd | BinOp::FSub | BinOp::FMul | BinOp::FDiv => IrType::Float,
            _ => IrType::Int,
        };
        let result = self.fresh_value();
        self.push_value(Instr::Binary { result, op, lhs, rhs }, ty)
    }

    pub fn emit_icmp(&mut self, cond: ICmpCond, lhs: Operand, rhs: Operand) -> Operand {
        let result = self.fresh_value();
        self.push_value(Instr::ICmp { result, cond, lhs, rhs }, IrType::Bool)
    }

    pub fn emit_fcmp(&mut self, cond: FCmpCond, lhs: Operand, rhs: Operand) -> Operand {
        let result = self.fresh_value();
        self.push_value(Instr::FCmp { result, cond, lhs, rhs }, IrType::Bool)
    }

    pub fn emit_cast(&mut self, op: CastOp, value: Operand) -> Operand {
        let ty = match op {
            CastOp::ZExt | CastOp::FpToSi => IrType::Int,
            CastOp::SiToFp | CastOp::UiToFp => IrType::Float,
        };
        let result = self.fresh_value();
        self.push_value(Instr::Cast { result, op, value }, ty)
    }

    pub fn emit_fneg(&mut self, value: Operand) -> Operand {
        let result = self.fresh_value();
        self.push_value(Instr::FNeg { result, value }, IrType::Float)
    }

    pub fn emit_not(&mut self, value: Operand) -> Operand {
        let result = self.fresh_value();
        self.push_value(Instr::Not { result, value }, IrType::Bool)
    }

    pub fn emit_load(&mut self, addr: Operand) -> Operand {
        let pointee = self
            .value_type(addr)
            .pointee()
            .cloned()
            .unwrap_or(IrType::Void);
        let result = self.fresh_value();
        self.push_value(Instr::Load { result, addr }, pointee)
    }

    pub fn emit_store(&mut self, value: Operand, addr: Operand) {
        self.builder().push(Instr::Store { value, addr }, None);
    }

    /// Array addressing: peels one array layer off the pointee.
    pub fn emit_get_elem_ptr(&mut self, base: Operand, index: Operand) -> Operand {
        let elem = match self.value_type(base).pointee() {
            Some(IrType::Array(elem, _)) => (**elem).clone(),
            _ => IrType::Void,
        };
        let result = self.fresh_value();
        self.push_value(Instr::GetElemPtr { result, base, index }, elem.ptr_to())
    }

    /// Pointer stepping: the pointee type is unchanged.
    pub fn emit_get_ptr(&mut self, base: Operand, index: Operand) -> Operand {
        let ty = self.value_type(base);
        let result = self.fresh_value();
        self.push_value(Instr::GetPtr { result, base, index }, ty)
    }

    pub fn emit_phi(&mut self, ty: IrType, incomings: Vec<(Operand, BlockId)>) -> Operand {
        let result = self.fresh_value();
        self.push_value(
            Instr::Phi {
                result,
                ty: ty.clone(),
                incomings,
            },
            ty,
        )
    }

    /// Emits a call; `None` for void callees.
    pub fn emit_call(
        &mut self,
        callee: crate::ir::FuncId,
        args: Vec<Operand>,
        return_ty: IrType,
    ) -> Option<Operand> {
        if return_ty.is_void() {
            self.builder().push(
                Instr::Call {
                    result: None,
                    callee,
                    args,
                },
                None,
            );
            None
        } else {
            let result = self.fresh_value();
            Some(self.push_value(
                Instr::Call {
                    result: Some(result),
                    callee,
                    args,
                },
                return_ty,
            ))
        }
    }

    pub fn emit_branch(&mut self, cond: Operand, then_bb: BlockId, else_bb: BlockId) {
        self.builder().push(
            Instr::Branch {
                cond,
                then_bb,
                else_bb,
            },
            None,
        );
    }

    pub fn emit_jump(&mut self, target: BlockId) {
        self.builder().push(Instr::Jump { target }, None);
    }

    pub fn emit_ret(&mut self, value: Option<Operand>) {
        self.builder().push(Instr::Ret { value }, None);
    }
}

impl Default for Ctx {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadowing_across_frames_duplicate_within() {
        let mut table = SymbolTable::new();
        table.define("x".into(), Operand::ConstInt(1)).unwrap();
        assert!(table.define("x".into(), Operand::ConstInt(2)).is_err());

        table.enter_scope();
        table.define("x".into(), Operand::ConstInt(3)).unwrap();
        assert_eq!(table.resolve("x"), Some(Operand::ConstInt(3)));
        table.exit_scope();

        assert_eq!(table.resolve("x"), Some(Operand::ConstInt(1)));
        assert_eq!(table.resolve("y"), None);
    }

    #[test]
    fn frames_balance() {
        let mut table = SymbolTable::new();
        assert_eq!(table.depth(), 1);
        table.enter_scope();
        table.enter_scope();
        assert_eq!(table.depth(), 3);
        table.exit_scope();
        table.exit_scope();
        assert_eq!(table.depth(), 1);
    }
}
