use std::fmt;

use id_arena::Arena;

use crate::error::RenderError;
use crate::ir::inst::{Inst, InstId};

/// A non-fatal problem found while parsing: byte offset into the source
/// plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMsg {
    pub byte: u32,
    pub msg: String,
}

impl fmt::Display for ErrorMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (byte {})", self.msg, self.byte)
    }
}

/// The top-level ZIR container.
///
/// Invariants:
/// - Every `InstId` reachable from `decls` points into this module's arena.
/// - `decls` order is declaration order; the printer derives the `@i`
///   indices from it.
/// - Dropping the module releases the arena, `decls` and `errors` in one
///   step; no per-instruction cleanup exists.
#[derive(Debug, Default)]
pub struct Module {
    pub(crate) insts: Arena<Inst>,
    /// Top-level declarations in source order.
    pub decls: Vec<InstId>,
    /// Diagnostics accumulated while producing this module.
    pub errors: Vec<ErrorMsg>,
}

impl Module {
    /// Parses ZIR text into a module.
    ///
    /// Never fails: syntax problems become entries in [`Module::errors`]
    /// and parsing resumes at the next declaration where possible.
    pub fn parse(source: &str) -> Module {
        crate::parser::Parser::new(source).parse_module()
    }

    pub fn inst(&self, id: InstId) -> &Inst {
        &self.insts[id]
    }

    pub(crate) fn alloc(&mut self, inst: Inst) -> InstId {
        self.insts.alloc(inst)
    }

    /// Writes the canonical text form to `w`.
    pub fn write<W: fmt::Write>(&self, w: &mut W) -> Result<(), RenderError> {
        let text = crate::printer::emit_zir_text(self)?;
        w.write_str(&text)?;
        Ok(())
    }
}
