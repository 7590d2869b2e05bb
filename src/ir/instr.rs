use crate::ir::block::BlockId;
use crate::ir::types::IrType;
use crate::ir::value::{FuncId, Operand, ValueId};

/// Typed binary arithmetic. Integer division and remainder are signed and
/// truncate toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    SDiv,
    SRem,
    FAdd,
    FSub,
    FMul,
    FDiv,
}

/// Signed integer comparison conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ICmpCond {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
}

/// Ordered float comparison conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FCmpCond {
    Oeq,
    One,
    Olt,
    Ole,
    Ogt,
    Oge,
}

/// The implicit-conversion operations of the cast table. No other
/// conversion exists in the IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOp {
    /// bool -> int
    ZExt,
    /// int -> float
    SiToFp,
    /// bool -> float
    UiToFp,
    /// float -> int
    FpToSi,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    Alloca {
        result: ValueId,
        ty: IrType,
    },
    Load {
        result: ValueId,
        addr: Operand,
    },
    Store {
        value: Operand,
        addr: Operand,
    },
    /// Array addressing: `base` points at an array, the result points at
    /// element `index` (the two-operand leading-zero GEP form).
    GetElemPtr {
        result: ValueId,
        base: Operand,
        index: Operand,
    },
    /// Pointer stepping for decayed array parameters: `base` points at an
    /// element, the result points `index` elements further.
    GetPtr {
        result: ValueId,
        base: Operand,
        index: Operand,
    },
    Binary {
        result: ValueId,
        op: BinOp,
        lhs: Operand,
        rhs: Operand,
    },
    ICmp {
        result: ValueId,
        cond: ICmpCond,
        lhs: Operand,
        rhs: Operand,
    },
    FCmp {
        result: ValueId,
        cond: FCmpCond,
        lhs: Operand,
        rhs: Operand,
    },
    Cast {
        result: ValueId,
        op: CastOp,
        value: Operand,
    },
    FNeg {
        result: ValueId,
        value: Operand,
    },
    /// Logical NOT over a bool operand (`xor i1 x, true`).
    Not {
        result: ValueId,
        value: Operand,
    },
    Phi {
        result: ValueId,
        ty: IrType,
        incomings: Vec<(Operand, BlockId)>,
    },
    Call {
        result: Option<ValueId>,
        callee: FuncId,
        args: Vec<Operand>,
    },
    Branch {
        cond: Operand,
        then_bb: BlockId,
        else_bb: BlockId,
    },
    Jump {
        target: BlockId,
    },
    Ret {
        value: Option<Operand>,
    },
}

impl Instr {
    pub fn is_terminator(&self) -> bool {
        matches!(self, Instr::Branch { .. } | Instr::Jump { .. } | Instr::Ret { .. })
    }

    /// The value this instruction defines, if any.
    pub fn result(&self) -> Option<ValueId> {
        match self {
            Instr::Alloca { result, .. }
            | Instr::Load { result, .. }
            | Instr::GetElemPtr { result, .. }
            | Instr::GetPtr { result, .. }
            | Instr::Binary { result, .. }
            | Instr::ICmp { result, .. }
            | Instr::FCmp { result, .. }
            | Instr::Cast { result, .. }
            | Instr::FNeg { result, .. }
            | Instr::Not { result, .. }
            | Instr::Phi { result, .. } => Some(*result),
            Instr::Call { result, .. } => *result,
            Instr::Store { .. } | Instr::Branch { .. } | Instr::Jump { .. } | Instr::Ret { .. } => {
                None
            }
        }
    }

    /// All operands, in evaluation order.
    pub fn operands(&self) -> Vec<Operand> {
        match self {
            Instr::Alloca { .. } => vec![],
            Instr::Load { addr, .. } => vec![*addr],
            Instr::Store { value, addr } => vec![*value, *addr],
            Instr::GetElemPtr { base, index, .. } | Instr::GetPtr { base, index, .. } => {
                vec![*base, *index]
            }
            Instr::Binary { lhs, rhs, .. }
            | Instr::ICmp { lhs, rhs, .. }
            | Instr::FCmp { lhs, rhs, .. } => vec![*lhs, *rhs],
            Instr::Cast { value, .. } | Instr::FNeg { value, .. } | Instr::Not { value, .. } => {
                vec![*value]
            }
            Instr::Phi { incomings, .. } => incomings.iter().map(|(op, _)| *op).collect(),
            Instr::Call { args, .. } => args.clone(),
            Instr::Branch { cond, .. } => vec![*cond],
            Instr::Jump { .. } => vec![],
            Instr::Ret { value } => value.iter().copied().collect(),
        }
    }
}
