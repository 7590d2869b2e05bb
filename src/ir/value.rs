/// An opaque, index-based reference to an SSA value within a function.
///
/// Only valid inside the `Function` that allocated it; never store one
/// across function boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueId(pub u32);

impl std::fmt::Display for ValueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Index of a global variable within a `Module`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalId(pub u32);

/// Index of a function within a `Module`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(pub u32);

/// An instruction operand. Constants ride inline rather than as
/// materialized instructions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    /// An instruction result in the current function.
    Value(ValueId),
    /// The n-th incoming function argument.
    Arg(u32),
    ConstInt(i32),
    ConstFloat(f32),
    ConstBool(bool),
    /// The address of a module global.
    Global(GlobalId),
}
