//! Textual rendering of a module.
//!
//! The output follows LLVM's conventions (`define`/`declare`, typed
//! pointers, `getelementptr inbounds`, hex float constants) closely enough
//! to read with LLVM eyes; the downstream pipeline consumes the in-memory
//! module, not this text.

use std::fmt;

use crate::ir::block::BlockId;
use crate::ir::function::{Function, Linkage};
use crate::ir::instr::{BinOp, CastOp, FCmpCond, ICmpCond, Instr};
use crate::ir::module::{ConstInit, Module};
use crate::ir::types::IrType;
use crate::ir::value::Operand;

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        writeln!(f, "target datalayout = \"{}\"", self.data_layout)?;
        writeln!(f, "target triple = \"{}\"", self.target_triple)?;
        writeln!(f)?;

        for global in self.globals() {
            let linkage = linkage_str(global.linkage);
            writeln!(
                f,
                "@{} = {}global {} {}",
                global.name,
                linkage,
                global.ty,
                const_init(&global.init, &global.ty)
            )?;
        }
        if !self.globals().is_empty() {
            writeln!(f)?;
        }

        for func in self.functions() {
            if func.is_decl {
                write!(f, "declare {} @{}(", func.return_ty, func.name)?;
                for (i, p) in func.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} %{}", p.ty, p.name)?;
                }
                writeln!(f, ")")?;
            } else {
                writeln!(f)?;
                write!(
                    f,
                    "define {}{} @{}(",
                    linkage_str(func.linkage),
                    func.return_ty,
                    func.name
                )?;
                for (i, p) in func.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} %{}", p.ty, p.name)?;
                }
                writeln!(f, ") {{")?;
                for block in &func.blocks {
                    writeln!(f, "{}:", block.name)?;
                    for instr in &block.instrs {
                        writeln!(f, "  {}", print_instr(self, func, instr))?;
                    }
                }
                writeln!(f, "}}")?;
            }
        }
        Ok(())
    }
}

fn linkage_str(linkage: Linkage) -> &'static str {
    match linkage {
        Linkage::External => "",
        Linkage::Internal => "internal ",
    }
}

/// Floats print as the bit pattern of the value widened to double, the way
/// LLVM spells exact float constants.
fn float_str(v: f32) -> String {
    format!("0x{:016X}", (v as f64).to_bits())
}

fn const_init(init: &ConstInit, ty: &IrType) -> String {
    if init.is_zero() && ty.is_array() {
        return "zeroinitializer".to_string();
    }
    match init {
        ConstInit::Zero => match ty {
            IrType::Float => float_str(0.0),
            _ => "0".to_string(),
        },
        ConstInit::Int(v) => v.to_string(),
        ConstInit::Float(v) => float_str(*v),
        ConstInit::Array(elems) => {
            let elem_ty = ty.element().unwrap_or(&IrType::Int);
            let body = elems
                .iter()
                .map(|e| format!("{} {}", elem_ty, const_init(e, elem_ty)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("[{}]", body)
        }
    }
}

fn operand(module: &Module, func: &Function, op: Operand) -> String {
    match op {
        Operand::Value(v) => v.to_string(),
        Operand::Arg(i) => format!("%{}", func.params[i as usize].name),
        Operand::ConstInt(v) => v.to_string(),
        Operand::ConstBool(v) => if v { "true" } else { "false" }.to_string(),
        Operand::ConstFloat(v) => float_str(v),
        Operand::Global(id) => format!("@{}", module.global(id).name),
    }
}

fn operand_ty(module: &Module, func: &Function, op: Operand) -> IrType {
    module.operand_type(func, op).unwrap_or(IrType::Void)
}

fn label(func: &Function, bb: BlockId) -> String {
    format!("%{}", func.blocks[bb.0 as usize].name)
}

fn print_instr(module: &Module, func: &Function, instr: &Instr) -> String {
    let op_s = |op: Operand| operand(module, func, op);
    let ty_s = |op: Operand| operand_ty(module, func, op);
    match instr {
        Instr::Alloca { result, ty } => format!("{} = alloca {}", result, ty),
        Instr::Load { result, addr } => {
            let addr_ty = ty_s(*addr);
            let pointee = addr_ty.pointee().cloned().unwrap_or(IrType::Void);
            format!("{} = load {}, {} {}", result, pointee, addr_ty, op_s(*addr))
        }
        Instr::Store { value, addr } => {
            format!(
                "store {} {}, {} {}",
                ty_s(*value),
                op_s(*value),
                ty_s(*addr),
                op_s(*addr)
            )
        }
        Instr::GetElemPtr {
            result,
            base,
            index,
        } => {
            let base_ty = ty_s(*base);
            let pointee = base_ty.pointee().cloned().unwrap_or(IrType::Void);
            format!(
                "{} = getelementptr inbounds {}, {} {}, i32 0, i32 {}",
                result,
                pointee,
                base_ty,
                op_s(*base),
                op_s(*index)
            )
        }
        Instr::GetPtr {
            result,
            base,
            index,
        } => {
            let base_ty = ty_s(*base);
            let pointee = base_ty.pointee().cloned().unwrap_or(IrType::Void);
            format!(
                "{} = getelementptr inbounds {}, {} {}, i32 {}",
                result,
                pointee,
                base_ty,
                op_s(*base),
                op_s(*index)
            )
        }
        Instr::Binary {
            result,
            op,
            lhs,
            rhs,
        } => {
            let mnemonic = match op {
                BinOp::Add => "add",
                BinOp::Sub => "sub",
                BinOp::Mul => "mul",
                BinOp::SDiv => "sdiv",
                BinOp::SRem => "srem",
                BinOp::FAdd => "fadd",
                BinOp::FSub => "fsub",
                BinOp::FMul => "fmul",
                BinOp::FDiv => "fdiv",
            };
            format!(
                "{} = {} {} {}, {}",
                result,
                mnemonic,
                ty_s(*lhs),
                op_s(*lhs),
                op_s(*rhs)
            )
        }
        Instr::ICmp {
            result,
            cond,
            lhs,
            rhs,
        } => {
            let cond = match cond {
                ICmpCond::Eq => "eq",
                ICmpCond::Ne => "ne",
                ICmpCond::Slt => "slt",
                ICmpCond::Sle => "sle",
                ICmpCond::Sgt => "sgt",
                ICmpCond::Sge => "sge",
            };
            format!(
                "{} = icmp {} {} {}, {}",
                result,
                cond,
                ty_s(*lhs),
                op_s(*lhs),
                op_s(*rhs)
            )
        }
        Instr::FCmp {
            result,
            cond,
            lhs,
            rhs,
        } => {
            let cond = match cond {
                FCmpCond::Oeq => "oeq",
                FCmpCond::One => "one",
                FCmpCond::Olt => "olt",
                FCmpCond::Ole => "ole",
                FCmpCond::Ogt => "ogt",
                FCmpCond::Oge => "oge",
            };
            format!(
                "{} = fcmp {} {} {}, {}",
                result,
                cond,
                ty_s(*lhs),
                op_s(*lhs),
                op_s(*rhs)
            )
        }
        Instr::Cast { result, op, value } => {
            let (mnemonic, to) = match op {
                CastOp::ZExt => ("zext", IrType::Int),
                CastOp::SiToFp => ("sitofp", IrType::Float),
                CastOp::UiToFp => ("uitofp", IrType::Float),
                CastOp::FpToSi => ("fptosi", IrType::Int),
            };
            format!(
                "{} = {} {} {} to {}",
                result,
                mnemonic,
                ty_s(*value),
                op_s(*value),
                to
            )
        }
        Instr::FNeg { result, value } => format!("{} = fneg float {}", result, op_s(*value)),
        Instr::Not { result, value } => format!("{} = xor i1 {}, true", result, op_s(*value)),
        Instr::Phi {
            result,
            ty,
            incomings,
        } => {
            let arms = incomings
                .iter()
                .map(|(op, bb)| format!("[ {}, {} ]", op_s(*op), label(func, *bb)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} = phi {} {}", result, ty, arms)
        }
        Instr::Call {
            result,
            callee,
            args,
        } => {
            let callee = module.function(*callee);
            let args = args
                .iter()
                .map(|a| format!("{} {}", ty_s(*a), op_s(*a)))
                .collect::<Vec<_>>()
                .join(", ");
            match result {
                Some(r) => format!(
                    "{} = call {} @{}({})",
                    r, callee.return_ty, callee.name, args
                ),
                None => format!("call {} @{}({})", callee.return_ty, callee.name, args),
            }
        }
        Instr::Branch {
            cond,
            then_bb,
            else_bb,
        } => format!(
            "br i1 {}, label {}, label {}",
            op_s(*cond),
            label(func, *then_bb),
            label(func, *else_bb)
        ),
        Instr::Jump { target } => format!("br label {}", label(func, *target)),
        Instr::Ret { value } => match value {
            Some(v) => format!("ret {} {}", ty_s(*v), op_s(*v)),
            None => "ret void".to_string(),
        },
    }
}
