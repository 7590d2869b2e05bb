//! In-tree SSA IR: typed values, basic blocks, functions, module.
//!
//! The lowering pass builds a `Module` through `FunctionBuilder`; the
//! verifier checks structural SSA invariants; the printer renders the
//! LLVM-flavored text the driver writes out.

pub mod block;
pub mod function;
pub mod instr;
pub mod module;
pub mod printer;
pub mod types;
pub mod value;
pub mod verify;

pub use block::{BlockId, IrBlock};
pub use function::{Function, Linkage, Param};
pub use instr::{BinOp, CastOp, FCmpCond, ICmpCond, Instr};
pub use module::{ConstInit, FunctionBuilder, GlobalVar, Module};
pub use types::IrType;
pub use value::{FuncId, GlobalId, Operand, ValueId};
