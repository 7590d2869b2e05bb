use crate::ir::instr::Instr;

/// An opaque index identifying a basic block within a `Function`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u32);

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// A basic block.
///
/// Invariants after lowering:
/// 1. The block ends with exactly one terminator, which is its last
///    instruction.
/// 2. Phis, when present, form a prefix of the instruction list.
#[derive(Debug, Clone, PartialEq)]
pub struct IrBlock {
    pub id: BlockId,
    /// Display label; unique within the function (the builder suffixes the
    /// block index).
    pub name: String,
    pub instrs: Vec<Instr>,
}

impl IrBlock {
    pub fn new(id: BlockId, name: String) -> Self {
        Self {
            id,
            name,
            instrs: Vec::new(),
        }
    }

    /// The terminator, if the block is sealed.
    pub fn terminator(&self) -> Option<&Instr> {
        self.instrs.last().filter(|i| i.is_terminator())
    }

    /// A block is sealed once it ends with a terminator.
    pub fn is_sealed(&self) -> bool {
        self.terminator().is_some()
    }
}
