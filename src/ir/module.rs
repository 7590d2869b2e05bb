use std::collections::HashMap;

use crate::ir::block::{BlockId, IrBlock};
use crate::ir::function::{Function, Linkage, Param};
use crate::ir::instr::Instr;
use crate::ir::types::IrType;
use crate::ir::value::{FuncId, GlobalId, Operand, ValueId};

/// A compile-time initializer for a global. An all-zero aggregate is
/// collapsed to `Zero` by the producer.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstInit {
    Zero,
    Int(i32),
    Float(f32),
    Array(Vec<ConstInit>),
}

impl ConstInit {
    pub fn is_zero(&self) -> bool {
        match self {
            ConstInit::Zero => true,
            ConstInit::Int(v) => *v == 0,
            ConstInit::Float(v) => *v == 0.0,
            ConstInit::Array(elems) => elems.iter().all(ConstInit::is_zero),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GlobalVar {
    pub id: GlobalId,
    pub name: String,
    pub ty: IrType,
    pub init: ConstInit,
    pub linkage: Linkage,
}

/// The top-level IR container.
///
/// Function and global names are unique within a module; `FuncId(n)` and
/// `GlobalId(n)` always index `functions[n]` / `globals[n]`.
#[derive(Debug)]
pub struct Module {
    pub name: String,
    pub target_triple: String,
    pub data_layout: String,
    pub(crate) globals: Vec<GlobalVar>,
    pub(crate) functions: Vec<Function>,
    function_index: HashMap<String, FuncId>,
    global_index: HashMap<String, GlobalId>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_triple: "riscv64-unknown-linux-gnu".into(),
            data_layout: "e-m:e-p:64:64-i64:64-i128:128-n32:64-S128".into(),
            globals: Vec::new(),
            functions: Vec::new(),
            function_index: HashMap::new(),
            global_index: HashMap::new(),
        }
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn globals(&self) -> &[GlobalVar] {
        &self.globals
    }

    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.0 as usize]
    }

    pub fn global(&self, id: GlobalId) -> &GlobalVar {
        &self.globals[id.0 as usize]
    }

    pub fn function_by_name(&self, name: &str) -> Option<&Function> {
        let id = self.function_index.get(name)?;
        self.functions.get(id.0 as usize)
    }

    pub fn func_id(&self, name: &str) -> Option<FuncId> {
        self.function_index.get(name).copied()
    }

    pub fn global_by_name(&self, name: &str) -> Option<&GlobalVar> {
        let id = self.global_index.get(name)?;
        self.globals.get(id.0 as usize)
    }

    /// Registers a prototype. Definitions register here first so their own
    /// bodies can emit recursive calls, then attach the built body with
    /// `set_function_body`.
    pub fn declare_function(
        &mut self,
        name: impl Into<String>,
        params: Vec<Param>,
        return_ty: IrType,
        linkage: Linkage,
    ) -> Result<FuncId, String> {
        let func = Function {
            id: FuncId(0),
            name: name.into(),
            params,
            return_ty,
            linkage,
            is_decl: true,
            blocks: Vec::new(),
            value_types: HashMap::new(),
            next_value: 0,
        };
        self.insert_function(func)
    }

    /// Seals and registers a function built by `FunctionBuilder`.
    pub fn add_function(&mut self, func: Function) -> Result<FuncId, String> {
        self.insert_function(func)
    }

    /// Replaces the declaration registered under `id` with the completed
    /// definition.
    pub fn set_function_body(&mut self, id: FuncId, mut func: Function) {
        func.id = id;
        func.is_decl = false;
        self.functions[id.0 as usize] = func;
    }

    fn insert_function(&mut self, mut func: Function) -> Result<FuncId, String> {
        if self.function_index.contains_key(&func.name) {
            return Err(format!("function '{}' already defined", func.name));
        }
        let id = FuncId(self.functions.len() as u32);
        func.id = id;
        self.function_index.insert(func.name.clone(), id);
        self.functions.push(func);
        Ok(id)
    }

    /// Adds a global, making the symbol name unique on collision (local
    /// constants from sibling scopes may share a qualified name).
    pub fn add_global(
        &mut self,
        name: impl Into<String>,
        ty: IrType,
        init: ConstInit,
        linkage: Linkage,
    ) -> GlobalId {
        let base = name.into();
        let mut name = base.clone();
        let mut n = 0u32;
        while self.global_index.contains_key(&name) {
            n += 1;
            name = format!("{}.{}", base, n);
        }
        let id = GlobalId(self.globals.len() as u32);
        self.global_index.insert(name.clone(), id);
        self.globals.push(GlobalVar {
            id,
            name,
            ty,
            init,
            linkage,
        });
        id
    }

    /// The type of any operand, resolved against `func` for locals.
    pub fn operand_type(&self, func: &Function, op: Operand) -> Option<IrType> {
        match op {
            Operand::Global(id) => self
                .globals
                .get(id.0 as usize)
                .map(|g| g.ty.clone().ptr_to()),
            other => func.local_operand_type(other),
        }
    }
}

/// Builder for constructing a `Function` incrementally.
///
/// The insertion point is movable and clearable: `push` appends to the
/// current block, and silently drops the instruction when the point is
/// cleared or the block is already sealed (statements after
/// `break`/`continue`/`return` lower to no-ops).
pub struct FunctionBuilder {
    func: Function,
    current: Option<BlockId>,
}

impl FunctionBuilder {
    pub fn new(
        name: impl Into<String>,
        params: Vec<Param>,
        return_ty: IrType,
        linkage: Linkage,
    ) -> Self {
        Self {
            func: Function {
                id: FuncId(0), // reassigned by Module::add_function
                name: name.into(),
                params,
                return_ty,
                linkage,
                is_decl: false,
                blocks: Vec::new(),
                value_types: HashMap::new(),
                next_value: 0,
            },
            current: None,
        }
    }

    pub fn func(&self) -> &Function {
        &self.func
    }

    pub fn return_ty(&self) -> &IrType {
        &self.func.return_ty
    }

    /// Creates a block; the label is suffixed with the block index so
    /// every label in the function is unique.
    pub fn create_block(&mut self, name: &str) -> BlockId {
        let id = BlockId(self.func.blocks.len() as u32);
        let label = if id.0 == 0 {
            name.to_string()
        } else {
            format!("{}{}", name, id.0)
        };
        self.func.blocks.push(IrBlock::new(id, label));
        id
    }

    pub fn set_insert_point(&mut self, block: BlockId) {
        self.current = Some(block);
    }

    /// Marks the current block as abandoned; subsequent pushes are no-ops.
    pub fn clear_insert_point(&mut self) {
        self.current = None;
    }

    pub fn insert_point(&self) -> Option<BlockId> {
        self.current
    }

    /// True when there is a live, unsealed insertion point.
    pub fn is_live(&self) -> bool {
        match self.current {
            Some(id) => !self.func.blocks[id.0 as usize].is_sealed(),
            None => false,
        }
    }

    pub fn fresh_value(&mut self) -> ValueId {
        self.func.fresh_value()
    }

    pub fn value_type(&self, v: ValueId) -> Option<&IrType> {
        self.func.value_type(v)
    }

    /// Appends `instr` to the current block, registering its result type.
    /// `result_ty` must be `Some` iff the instruction produces a result.
    pub fn push(&mut self, instr: Instr, result_ty: Option<IrType>) -> Option<ValueId> {
        let result = instr.result();
        if let (Some(id), Some(ty)) = (result, result_ty) {
            self.func.value_types.insert(id, ty);
        }
        if let Some(block) = self.current {
            let block = &mut self.func.blocks[block.0 as usize];
            if !block.is_sealed() {
                block.instrs.push(instr);
            }
        }
        result
    }

    /// Emits an alloca into the entry block, ahead of its terminator once
    /// the entry is sealed, and returns the slot address.
    pub fn push_alloca(&mut self, ty: IrType) -> ValueId {
        let result = self.fresh_value();
        self.func
            .value_types
            .insert(result, ty.clone().ptr_to());
        let entry = &mut self.func.blocks[0];
        let instr = Instr::Alloca { result, ty };
        if entry.is_sealed() {
            let at = entry.instrs.len() - 1;
            entry.instrs.insert(at, instr);
        } else {
            entry.instrs.push(instr);
        }
        result
    }

    /// Terminator fixup for void functions: seals every open block with
    /// `ret void`.
    pub fn seal_unterminated_with_ret_void(&mut self) {
        for block in &mut self.func.blocks {
            if !block.is_sealed() {
                block.instrs.push(Instr::Ret { value: None });
            }
        }
    }

    /// Consumes the builder and returns the completed function. The
    /// verifier, not the builder, rejects unsealed blocks.
    pub fn build(self) -> Function {
        self.func
    }
}
