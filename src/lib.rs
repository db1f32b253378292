//! ZIR: the compiler's textual intermediate representation.
//!
//! Three bidirectional services on one linear, SSA-style instruction list:
//!
//! ```text
//! text → parser → [Module] → printer → text
//! analyzed IR (tir) → lower → [Module] → printer → text
//! ```
//!
//! The parser never fails: syntax problems accumulate as byte-offset
//! diagnostics in [`Module::errors`] and parsing resumes at the next
//! declaration. Rendering is a normal form: parsing canonical text and
//! printing it back is the identity. The instruction schema lives in a
//! single declaration ([`ir::inst`]) that drives parsing and printing
//! alike, so the two sides cannot drift apart.
//!
//! Every allocation backing a module (instruction records, string bytes,
//! bigint digits) lives in the module's arena and is released when the
//! [`Module`] is dropped. Instruction handles are plain copyable ids,
//! valid for the owning module's lifetime.

pub mod diagnostics;
pub mod error;
pub mod ir;
pub mod lower;
pub mod parser;
pub mod printer;
pub mod strlit;
pub mod tir;

pub use error::Error;
pub use ir::{Block, BuiltinType, CallingConvention, ErrorMsg, Inst, InstData, InstId, Module};
pub use lower::emit_zir;
pub use printer::emit_zir_text;

/// Lowers an analyzed module and renders it to canonical text in one step.
pub fn lower_to_text(analyzed: &tir::Module) -> Result<String, Error> {
    let module = lower::emit_zir(analyzed)?;
    Ok(printer::emit_zir_text(&module)?)
}
