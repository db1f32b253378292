//! The analyzed, typed IR consumed by [`crate::lower`].
//!
//! This is the shape of what the semantic analyzer hands over: a set of
//! exports, the functions they reference, and the typed instructions
//! backing both, all stored in one arena so that constant identity is a
//! handle comparison. The lowering code treats it read-only.

use id_arena::{Arena, Id};
use num_bigint::BigInt;

use crate::ir::{BuiltinType, CallingConvention};

/// Handle to a typed instruction in its module's arena.
pub type InstId = Id<Inst>;

/// An analyzed type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(BuiltinType),
    Fn {
        param_types: Vec<Type>,
        return_type: Box<Type>,
        cc: CallingConvention,
    },
    /// A pointer to a fixed-length byte array (string constants point at
    /// these).
    BytesPtr,
}

impl Type {
    pub fn is_comptime_int(&self) -> bool {
        matches!(self, Type::Primitive(BuiltinType::ComptimeInt))
    }

    /// A runtime integer type of known width.
    pub fn is_sized_int(&self) -> bool {
        matches!(
            self,
            Type::Primitive(
                BuiltinType::Isize
                    | BuiltinType::Usize
                    | BuiltinType::CShort
                    | BuiltinType::CUshort
                    | BuiltinType::CInt
                    | BuiltinType::CUint
                    | BuiltinType::CLong
                    | BuiltinType::CUlong
                    | BuiltinType::CLonglong
                    | BuiltinType::CUlonglong
            )
        )
    }

    pub fn is_type(&self) -> bool {
        matches!(self, Type::Primitive(BuiltinType::Type))
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Primitive(tag) => write!(f, "{}", tag),
            Type::Fn {
                param_types,
                return_type,
                ..
            } => {
                f.write_str("fn(")?;
                for (i, p) in param_types.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") {}", return_type)
            }
            Type::BytesPtr => f.write_str("*const [_]u8"),
        }
    }
}

/// An analyzed compile-time value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bytes(Vec<u8>),
    Int(BigInt),
    Ty(Type),
    /// Index into [`Module::functions`].
    Fn(usize),
}

/// A typed instruction: source offset, result type, operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Inst {
    pub offset: u32,
    pub ty: Type,
    pub kind: InstKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstKind {
    /// A materialized compile-time value. Constants live in the arena but
    /// never in a function body; operands reference them directly.
    Constant(Value),
    Unreach,
    PtrToInt {
        operand: InstId,
    },
    /// Reinterpreting cast; the destination type is the instruction's own
    /// result type.
    BitCast {
        operand: InstId,
    },
    Asm {
        asm_source: Vec<u8>,
        is_volatile: bool,
        output: Option<Vec<u8>>,
        inputs: Vec<Vec<u8>>,
        clobbers: Vec<Vec<u8>>,
        args: Vec<InstId>,
    },
}

/// One exported symbol: name bytes plus the constant being exported.
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub offset: u32,
    pub symbol_name: Vec<u8>,
    pub value: InstId,
}

/// An analyzed function: its `Fn` type and its body in program order.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub ty: Type,
    pub body: Vec<InstId>,
}

/// The analyzed module.
#[derive(Debug, Default)]
pub struct Module {
    pub(crate) insts: Arena<Inst>,
    pub functions: Vec<Function>,
    pub exports: Vec<Export>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inst(&self, id: InstId) -> &Inst {
        &self.insts[id]
    }

    /// Allocates a constant instruction and returns its handle. Passing the
    /// same handle to several operands is what makes lowering share one
    /// declaration between them.
    pub fn constant(&mut self, offset: u32, ty: Type, value: Value) -> InstId {
        self.insts.alloc(Inst {
            offset,
            ty,
            kind: InstKind::Constant(value),
        })
    }

    /// Allocates a body instruction; the caller threads the handle into a
    /// [`Function::body`].
    pub fn body_inst(&mut self, offset: u32, ty: Type, kind: InstKind) -> InstId {
        self.insts.alloc(Inst { offset, ty, kind })
    }

    /// Registers a function and returns its index for [`Value::Fn`].
    pub fn add_function(&mut self, func: Function) -> usize {
        self.functions.push(func);
        self.functions.len() - 1
    }

    pub fn add_export(&mut self, offset: u32, symbol_name: impl Into<Vec<u8>>, value: InstId) {
        self.exports.push(Export {
            offset,
            symbol_name: symbol_name.into(),
            value,
        });
    }
}
