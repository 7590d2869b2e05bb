use std::collections::HashMap;

use crate::ir::block::{BlockId, IrBlock};
use crate::ir::types::IrType;
use crate::ir::value::{FuncId, Operand, ValueId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    /// Visible to the linker (`main` and the runtime prototypes).
    External,
    /// Module-private; lets the downstream pipeline inline freely.
    Internal,
}

/// A named, typed formal parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: IrType,
}

/// A function: either a body-carrying definition or a declaration-only
/// prototype (`is_decl`).
///
/// Blocks live in a flat list; `BlockId(n)` indexes `blocks[n]` and the
/// entry block is always `blocks[0]`.
#[derive(Debug, Clone)]
pub struct Function {
    pub id: FuncId,
    pub name: String,
    pub params: Vec<Param>,
    pub return_ty: IrType,
    pub linkage: Linkage,
    pub is_decl: bool,
    pub blocks: Vec<IrBlock>,
    /// `ValueId` -> result type, populated by the builder.
    pub(crate) value_types: HashMap<ValueId, IrType>,
    pub(crate) next_value: u32,
}

impl Function {
    pub fn entry_block(&self) -> &IrBlock {
        &self.blocks[0]
    }

    pub fn block(&self, id: BlockId) -> Option<&IrBlock> {
        self.blocks.get(id.0 as usize)
    }

    /// The type of a value defined in this function, if known.
    pub fn value_type(&self, v: ValueId) -> Option<&IrType> {
        self.value_types.get(&v)
    }

    /// The type of any operand evaluated inside this function. Global
    /// operands are resolved by `Module::operand_type` instead.
    pub(crate) fn local_operand_type(&self, op: Operand) -> Option<IrType> {
        match op {
            Operand::Value(v) => self.value_types.get(&v).cloned(),
            Operand::Arg(i) => self.params.get(i as usize).map(|p| p.ty.clone()),
            Operand::ConstInt(_) => Some(IrType::Int),
            Operand::ConstFloat(_) => Some(IrType::Float),
            Operand::ConstBool(_) => Some(IrType::Bool),
            Operand::Global(_) => None,
        }
    }

    pub(crate) fn fresh_value(&mut self) -> ValueId {
        let id = ValueId(self.next_value);
        self.next_value += 1;
        id
    }
}
