/// Types carried by IR values.
///
/// `Bool` is the `i1` produced by comparisons and consumed by branches;
/// `Array` and `Ptr` only describe storage and address values (scalars in
/// registers are always `Bool`/`Int`/`Float`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrType {
    Void,
    Bool,
    Int,
    Float,
    Array(Box<IrType>, usize),
    Ptr(Box<IrType>),
}

impl IrType {
    pub fn ptr_to(self) -> IrType {
        IrType::Ptr(Box::new(self))
    }

    /// The pointed-to type, for `Ptr` values.
    pub fn pointee(&self) -> Option<&IrType> {
        match self {
            IrType::Ptr(inner) => Some(inner),
            _ => None,
        }
    }

    /// The element type, for `Array` values.
    pub fn element(&self) -> Option<&IrType> {
        match self {
            IrType::Array(inner, _) => Some(inner),
            _ => None,
        }
    }

    pub fn is_ptr(&self) -> bool {
        matches!(self, IrType::Ptr(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, IrType::Array(..))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, IrType::Void)
    }
}

impl std::fmt::Display for IrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IrType::Void => f.write_str("void"),
            IrType::Bool => f.write_str("i1"),
            IrType::Int => f.write_str("i32"),
            IrType::Float => f.write_str("float"),
            IrType::Array(elem, len) => write!(f, "[{} x {}]", len, elem),
            IrType::Ptr(inner) => write!(f, "{}*", inner),
        }
    }
}
