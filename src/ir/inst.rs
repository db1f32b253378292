//! The instruction schema.
//!
//! Every instruction kind is declared exactly once, in the `zir_insts!`
//! invocation at the bottom of this file. From that single declaration the
//! macro generates the [`InstData`] payload enum, the parser's per-tag
//! argument dispatch and the printer's per-tag argument dispatch, so the
//! parse and render sides cannot drift apart. Adding an instruction is a
//! one-entry change.
//!
//! Argument value kinds, closed set: `inst` (handle), `opt_inst`,
//! `inst_list`, `str` (raw bytes), `bigint`, `bool`, `builtin_type`, `cc`
//! (calling convention), and `body` (a function body block).

use id_arena::Id;
use num_bigint::BigInt;

/// Handle to an instruction in its module's arena.
///
/// Handles are freely copied and never imply ownership; they are valid
/// exactly while the owning [`Module`](crate::ir::Module) is alive.
pub type InstId = Id<Inst>;

/// A single instruction: source byte offset plus tag-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Inst {
    pub offset: u32,
    pub data: InstData,
}

/// The body of a `fn` instruction.
///
/// An ordered instruction sequence; each member is addressable as `%i` by
/// its index within this block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub insts: Vec<InstId>,
}

/// An enum whose values are parsed and printed by variant name.
pub trait NamedEnum: Sized + Copy {
    /// The enum's name as it appears in diagnostics.
    const ENUM_NAME: &'static str;
    fn from_name(name: &str) -> Option<Self>;
    fn name(self) -> &'static str;
}

/// The builtin primitive types ZIR can name directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Isize,
    Usize,
    CShort,
    CUshort,
    CInt,
    CUint,
    CLong,
    CUlong,
    CLonglong,
    CUlonglong,
    CLongdouble,
    CVoid,
    F16,
    F32,
    F64,
    F128,
    Bool,
    Void,
    NoReturn,
    Type,
    AnyError,
    ComptimeInt,
    ComptimeFloat,
}

impl NamedEnum for BuiltinType {
    const ENUM_NAME: &'static str = "BuiltinType";

    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "isize" => BuiltinType::Isize,
            "usize" => BuiltinType::Usize,
            "c_short" => BuiltinType::CShort,
            "c_ushort" => BuiltinType::CUshort,
            "c_int" => BuiltinType::CInt,
            "c_uint" => BuiltinType::CUint,
            "c_long" => BuiltinType::CLong,
            "c_ulong" => BuiltinType::CUlong,
            "c_longlong" => BuiltinType::CLonglong,
            "c_ulonglong" => BuiltinType::CUlonglong,
            "c_longdouble" => BuiltinType::CLongdouble,
            "c_void" => BuiltinType::CVoid,
            "f16" => BuiltinType::F16,
            "f32" => BuiltinType::F32,
            "f64" => BuiltinType::F64,
            "f128" => BuiltinType::F128,
            "bool" => BuiltinType::Bool,
            "void" => BuiltinType::Void,
            "noreturn" => BuiltinType::NoReturn,
            "type" => BuiltinType::Type,
            "anyerror" => BuiltinType::AnyError,
            "comptime_int" => BuiltinType::ComptimeInt,
            "comptime_float" => BuiltinType::ComptimeFloat,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            BuiltinType::Isize => "isize",
            BuiltinType::Usize => "usize",
            BuiltinType::CShort => "c_short",
            BuiltinType::CUshort => "c_ushort",
            BuiltinType::CInt => "c_int",
            BuiltinType::CUint => "c_uint",
            BuiltinType::CLong => "c_long",
            BuiltinType::CUlong => "c_ulong",
            BuiltinType::CLonglong => "c_longlong",
            BuiltinType::CUlonglong => "c_ulonglong",
            BuiltinType::CLongdouble => "c_longdouble",
            BuiltinType::CVoid => "c_void",
            BuiltinType::F16 => "f16",
            BuiltinType::F32 => "f32",
            BuiltinType::F64 => "f64",
            BuiltinType::F128 => "f128",
            BuiltinType::Bool => "bool",
            BuiltinType::Void => "void",
            BuiltinType::NoReturn => "noreturn",
            BuiltinType::Type => "type",
            BuiltinType::AnyError => "anyerror",
            BuiltinType::ComptimeInt => "comptime_int",
            BuiltinType::ComptimeFloat => "comptime_float",
        }
    }
}

impl std::fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Calling conventions a `fntype` can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallingConvention {
    Unspecified,
    C,
    Cold,
    Naked,
    Stdcall,
    Async,
}

impl NamedEnum for CallingConvention {
    const ENUM_NAME: &'static str = "CallingConvention";

    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Unspecified" => CallingConvention::Unspecified,
            "C" => CallingConvention::C,
            "Cold" => CallingConvention::Cold,
            "Naked" => CallingConvention::Naked,
            "Stdcall" => CallingConvention::Stdcall,
            "Async" => CallingConvention::Async,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            CallingConvention::Unspecified => "Unspecified",
            CallingConvention::C => "C",
            CallingConvention::Cold => "Cold",
            CallingConvention::Naked => "Naked",
            CallingConvention::Stdcall => "Stdcall",
            CallingConvention::Async => "Async",
        }
    }
}

impl std::fmt::Display for CallingConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps a value-kind token to the Rust type stored in the payload.
macro_rules! arg_ty {
    (inst) => { InstId };
    (opt_inst) => { Option<InstId> };
    (inst_list) => { Vec<InstId> };
    (str) => { Vec<u8> };
    (bigint) => { BigInt };
    (bool) => { bool };
    (builtin_type) => { BuiltinType };
    (cc) => { CallingConvention };
    (body) => { Block };
}

/// Parses one argument value of the given kind. `$p` is the parser,
/// `$scope` the enclosing block scope (for `%` references).
macro_rules! parse_arg {
    ($p:expr, $scope:expr, inst) => {
        $p.parse_inst_ref($scope)?
    };
    ($p:expr, $scope:expr, opt_inst) => {
        Some($p.parse_inst_ref($scope)?)
    };
    ($p:expr, $scope:expr, inst_list) => {
        $p.parse_inst_list($scope)?
    };
    ($p:expr, $scope:expr, str) => {
        $p.parse_str_lit()?
    };
    ($p:expr, $scope:expr, bigint) => {
        $p.parse_int_lit()?
    };
    ($p:expr, $scope:expr, bool) => {
        $p.parse_bool_lit()?
    };
    ($p:expr, $scope:expr, builtin_type) => {
        $p.parse_enum_name::<BuiltinType>()?
    };
    ($p:expr, $scope:expr, cc) => {
        $p.parse_enum_name::<CallingConvention>()?
    };
    ($p:expr, $scope:expr, body) => {
        $p.parse_body()?
    };
}

/// Writes one argument value of the given kind through the printer.
macro_rules! render_arg {
    ($p:expr, $v:expr, inst) => {
        $p.write_ref(*$v)?
    };
    ($p:expr, $v:expr, opt_inst) => {
        if let Some(id) = $v {
            $p.write_ref(*id)?
        }
    };
    ($p:expr, $v:expr, inst_list) => {
        $p.write_ref_list($v)?
    };
    ($p:expr, $v:expr, str) => {
        $p.write_str_lit($v)
    };
    ($p:expr, $v:expr, bigint) => {
        $p.write_int($v)?
    };
    ($p:expr, $v:expr, bool) => {
        $p.write_bool(*$v)
    };
    ($p:expr, $v:expr, builtin_type) => {
        $p.raw($v.name())
    };
    ($p:expr, $v:expr, cc) => {
        $p.raw($v.name())
    };
    ($p:expr, $v:expr, body) => {
        $p.write_body($v)?
    };
}

macro_rules! zir_insts {
    (
        $(
            $( #[$attr:meta] )*
            $token:literal => $variant:ident {
                positional: { $( $pos:ident : $ptk:tt ),* $(,)? },
                keyword: { $( $kw:ident : $ktk:tt = $kwdef:expr ),* $(,)? } $(,)?
            }
        )*
    ) => {
        /// Tag-specific instruction payloads.
        ///
        /// One variant per instruction kind; fields are the positional
        /// arguments followed by the keyword arguments in schema order.
        #[derive(Debug, Clone, PartialEq)]
        pub enum InstData {
            $(
                $( #[$attr] )*
                $variant { $( $pos: arg_ty!($ptk), )* $( $kw: arg_ty!($ktk), )* },
            )*
        }

        impl InstData {
            /// The textual tag of this instruction.
            pub fn tag_name(&self) -> &'static str {
                match self {
                    $( InstData::$variant { .. } => $token, )*
                }
            }

            /// Writes this instruction's argument list (the part between the
            /// parentheses). Keyword arguments equal to their schema default
            /// are elided so that rendering is a normal form.
            pub(crate) fn write_args(
                &self,
                p: &mut crate::printer::Printer<'_>,
            ) -> Result<(), crate::error::RenderError> {
                match self {
                    $(
                        InstData::$variant { $( $pos, )* $( $kw, )* } => {
                            #[allow(unused_mut)]
                            let mut first = true;
                            $(
                                if !first {
                                    p.raw(", ");
                                }
                                render_arg!(p, $pos, $ptk);
                                first = false;
                            )*
                            $(
                                if *$kw != $kwdef {
                                    if !first {
                                        p.raw(", ");
                                    }
                                    p.raw(stringify!($kw));
                                    p.raw("=");
                                    render_arg!(p, $kw, $ktk);
                                    first = false;
                                }
                            )*
                            let _ = first;
                            Ok(())
                        }
                    )*
                }
            }
        }

        impl<'src> crate::parser::Parser<'src> {
            /// Parses the argument list for the instruction named `tag`,
            /// driven by the schema. The cursor must sit just past the
            /// opening `(`; on success it sits past the closing `)`.
            #[allow(unused_assignments)]
            pub(crate) fn parse_inst_args(
                &mut self,
                tag: &'src str,
                tag_at: u32,
                scope: Option<&crate::parser::BlockScope<'src>>,
            ) -> crate::parser::ParseResult<InstData> {
                match tag {
                    $(
                        $token => {
                            $(
                                self.skip_space();
                                if self.peek() == b')' {
                                    let at = self.byte_pos();
                                    return self.fail(at, format!(
                                        "missing positional argument '{}'",
                                        stringify!($pos),
                                    ));
                                }
                                let $pos = parse_arg!(self, scope, $ptk);
                                self.skip_space();
                                self.eat_byte(b',');
                            )*
                            $(
                                #[allow(unused_mut)]
                                let mut $kw: arg_ty!($ktk) = $kwdef;
                            )*
                            loop {
                                self.skip_space();
                                if self.eat_byte(b')') {
                                    break;
                                }
                                let kw_at = self.byte_pos();
                                let name = self.scan_to_and_over(b'=')?;
                                #[allow(unused_mut)]
                                let mut matched = false;
                                $(
                                    if !matched && name == stringify!($kw) {
                                        $kw = parse_arg!(self, scope, $ktk);
                                        matched = true;
                                    }
                                )*
                                if !matched {
                                    return self.fail(kw_at, format!(
                                        "unrecognized keyword argument '{}'",
                                        name,
                                    ));
                                }
                                self.skip_space();
                                self.eat_byte(b',');
                            }
                            Ok(InstData::$variant { $( $pos, )* $( $kw, )* })
                        }
                    )*
                    _ => self.fail(tag_at, format!("unknown instruction '{}'", tag)),
                }
            }
        }
    };
}

zir_insts! {
    /// A byte-string constant.
    "str" => Str {
        positional: { bytes: str },
        keyword: {},
    }
    /// An arbitrary-precision integer constant.
    "int" => Int {
        positional: { value: bigint },
        keyword: {},
    }
    /// A builtin primitive type.
    "primitive" => Primitive {
        positional: { tag: builtin_type },
        keyword: {},
    }
    /// A function type: parameter types, return type, calling convention.
    "fntype" => FnType {
        positional: { param_types: inst_list, return_type: inst },
        keyword: { cc: cc = CallingConvention::Unspecified },
    }
    /// A function: its type and its body block.
    "fn" => Fn {
        positional: { fn_type: inst, body: body },
        keyword: {},
    }
    /// Exports `value` under `symbol_name`.
    "export" => Export {
        positional: { symbol_name: inst, value: inst },
        keyword: {},
    }
    /// Inline assembly.
    "asm" => Asm {
        positional: { asm_source: inst, return_type: inst },
        keyword: {
            volatile: bool = false,
            output: opt_inst = None,
            inputs: inst_list = Vec::new(),
            clobbers: inst_list = Vec::new(),
            args: inst_list = Vec::new(),
        },
    }
    /// Type coercion.
    "as" => As {
        positional: { dest_type: inst, value: inst },
        keyword: {},
    }
    /// Integer-to-integer cast.
    "intcast" => IntCast {
        positional: { dest_type: inst, value: inst },
        keyword: {},
    }
    /// Reinterpreting cast.
    "bitcast" => BitCast {
        positional: { dest_type: inst, operand: inst },
        keyword: {},
    }
    /// Converts a pointer to its address.
    "ptrtoint" => PtrToInt {
        positional: { ptr: inst },
        keyword: {},
    }
    /// Loads through a pointer.
    "deref" => Deref {
        positional: { ptr: inst },
        keyword: {},
    }
    /// Pointer to a named field of the pointed-to aggregate.
    "fieldptr" => FieldPtr {
        positional: { object_ptr: inst, field_name: inst },
        keyword: {},
    }
    /// Pointer to an element of the pointed-to array.
    "elemptr" => ElemPtr {
        positional: { array_ptr: inst, index: inst },
        keyword: {},
    }
    /// Addition.
    "add" => Add {
        positional: { lhs: inst, rhs: inst },
        keyword: {},
    }
    /// Marks an unreachable point; control must never arrive here.
    "unreachable" => Unreachable {
        positional: {},
        keyword: {},
    }
}
