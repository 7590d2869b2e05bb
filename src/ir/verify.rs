//! SSA verifier.
//!
//! Runs over every function after lowering and rejects anything structurally
//! wrong. A failure here is a bug in the lowering pass, with one exception:
//! a non-void function whose control flow can fall off the end shows up as
//! `MissingTerminator` (the void fixup only seals void functions).

use std::collections::HashSet;

use thiserror::Error;

use crate::ir::function::Function;
use crate::ir::instr::Instr;
use crate::ir::module::Module;
use crate::ir::value::{Operand, ValueId};

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("block '{block}' in function '{func}' has no terminator")]
    MissingTerminator { func: String, block: String },

    #[error("terminator in the middle of block '{block}' in function '{func}'")]
    MisplacedTerminator { func: String, block: String },

    #[error("value {value} used before definition in function '{func}'")]
    UseBeforeDef { func: String, value: String },

    #[error("value {value} defined more than once in function '{func}'")]
    MultipleDefinition { func: String, value: String },

    #[error("phi after non-phi instruction in block '{block}' of function '{func}'")]
    MisplacedPhi { func: String, block: String },

    #[error("branch to unknown block in function '{func}'")]
    UnknownBlock { func: String },

    #[error("return arity mismatch in function '{func}'")]
    RetMismatch { func: String },
}

pub fn verify_module(module: &Module) -> Result<(), VerifyError> {
    for func in module.functions() {
        if !func.is_decl {
            verify_function(func)?;
        }
    }
    Ok(())
}

pub fn verify_function(func: &Function) -> Result<(), VerifyError> {
    let func_name = &func.name;
    let block_count = func.blocks.len() as u32;

    // Defined-before-use is checked by a linear scan in block order. The
    // lowering pass creates blocks in control-flow order and only back-edges
    // through jumps, so a forward use is always a bug.
    let mut defined: HashSet<ValueId> = HashSet::new();

    for block in &func.blocks {
        let n = block.instrs.len();
        let mut past_phis = false;

        for (i, instr) in block.instrs.iter().enumerate() {
            if instr.is_terminator() && i != n - 1 {
                return Err(VerifyError::MisplacedTerminator {
                    func: func_name.clone(),
                    block: block.name.clone(),
                });
            }

            match instr {
                Instr::Phi { .. } => {
                    if past_phis {
                        return Err(VerifyError::MisplacedPhi {
                            func: func_name.clone(),
                            block: block.name.clone(),
                        });
                    }
                }
                _ => past_phis = true,
            }

            for operand in instr.operands() {
                if let Operand::Value(v) = operand {
                    if !defined.contains(&v) {
                        return Err(VerifyError::UseBeforeDef {
                            func: func_name.clone(),
                            value: v.to_string(),
                        });
                    }
                }
            }

            match instr {
                Instr::Branch {
                    then_bb, else_bb, ..
                } => {
                    if then_bb.0 >= block_count || else_bb.0 >= block_count {
                        return Err(VerifyError::UnknownBlock {
                            func: func_name.clone(),
                        });
                    }
                }
                Instr::Jump { target } => {
                    if target.0 >= block_count {
                        return Err(VerifyError::UnknownBlock {
                            func: func_name.clone(),
                        });
                    }
                }
                Instr::Phi { incomings, .. } => {
                    if incomings.iter().any(|(_, bb)| bb.0 >= block_count) {
                        return Err(VerifyError::UnknownBlock {
                            func: func_name.clone(),
                        });
                    }
                }
                Instr::Ret { value } => {
                    if value.is_some() == func.return_ty.is_void() {
                        return Err(VerifyError::RetMismatch {
                            func: func_name.clone(),
                        });
                    }
                }
                _ => {}
            }

            if let Some(result) = instr.result() {
                if !defined.insert(result) {
                    return Err(VerifyError::MultipleDefinition {
                        func: func_name.clone(),
                        value: result.to_string(),
                    });
                }
            }
        }

        if !block.is_sealed() {
            return Err(VerifyError::MissingTerminator {
                func: func_name.clone(),
                block: block.name.clone(),
            });
        }
    }

    Ok(())
}
