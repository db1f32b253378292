pub mod inst;
pub mod module;

pub use inst::{Block, BuiltinType, CallingConvention, Inst, InstData, InstId, NamedEnum};
pub use module::{ErrorMsg, Module};
