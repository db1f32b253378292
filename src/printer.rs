//! ZIR pretty-printer.
//!
//! Emits the canonical text form of a [`Module`]. Output is deterministic:
//! declarations print in `decls` order as `@i = tag(args)`, one per line,
//! and function bodies print their members as two-space-indented
//! `%j = tag(args)` lines. The argument lists themselves are written by
//! the schema dispatch in [`crate::ir::inst`], the same declaration the
//! parser reads from, so a parse of the output reconstructs the module.

use std::collections::HashMap;
use std::fmt::Write;

use num_bigint::BigInt;

use crate::error::RenderError;
use crate::ir::inst::{Block, InstData, InstId};
use crate::ir::module::Module;
use crate::strlit;

/// Emits the full canonical text of a module.
pub fn emit_zir_text(module: &Module) -> Result<String, RenderError> {
    let mut p = Printer {
        module,
        refs: HashMap::new(),
        out: String::new(),
    };
    p.assign_indices();
    p.write_module()?;
    Ok(p.out)
}

/// How an instruction is addressed in text: `@i` for a top-level
/// declaration, `%j` for a member of a function body.
#[derive(Debug, Clone, Copy)]
enum Ref {
    Decl(usize),
    Local(usize),
}

pub(crate) struct Printer<'m> {
    module: &'m Module,
    refs: HashMap<InstId, Ref>,
    out: String,
}

impl<'m> Printer<'m> {
    // -----------------------------------------------------------------------
    // Pass 1: index assignment
    // -----------------------------------------------------------------------

    fn assign_indices(&mut self) {
        let module = self.module;
        for (i, &decl) in module.decls.iter().enumerate() {
            self.refs.insert(decl, Ref::Decl(i));
            self.assign_body_indices(decl);
        }
    }

    fn assign_body_indices(&mut self, id: InstId) {
        let module = self.module;
        if let InstData::Fn { body, .. } = &module.inst(id).data {
            for (j, &member) in body.insts.iter().enumerate() {
                self.refs.insert(member, Ref::Local(j));
                self.assign_body_indices(member);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Pass 2: emission
    // -----------------------------------------------------------------------

    fn write_module(&mut self) -> Result<(), RenderError> {
        let module = self.module;
        for (i, &decl) in module.decls.iter().enumerate() {
            write!(self.out, "@{} = ", i)?;
            self.write_inst(decl)?;
            self.out.push('\n');
        }
        Ok(())
    }

    fn write_inst(&mut self, id: InstId) -> Result<(), RenderError> {
        let module = self.module;
        let inst = module.inst(id);
        self.out.push_str(inst.data.tag_name());
        self.out.push('(');
        inst.data.write_args(self)?;
        self.out.push(')');
        Ok(())
    }

    pub(crate) fn raw(&mut self, s: &str) {
        self.out.push_str(s);
    }

    pub(crate) fn write_ref(&mut self, id: InstId) -> Result<(), RenderError> {
        match self.refs.get(&id).copied() {
            Some(Ref::Decl(i)) => write!(self.out, "@{}", i)?,
            Some(Ref::Local(j)) => write!(self.out, "%{}", j)?,
            None => return Err(RenderError::UnresolvedRef),
        }
        Ok(())
    }

    pub(crate) fn write_ref_list(&mut self, ids: &[InstId]) -> Result<(), RenderError> {
        self.out.push('[');
        for (i, &id) in ids.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.write_ref(id)?;
        }
        self.out.push(']');
        Ok(())
    }

    pub(crate) fn write_str_lit(&mut self, bytes: &[u8]) {
        strlit::render(bytes, &mut self.out);
    }

    pub(crate) fn write_int(&mut self, value: &BigInt) -> Result<(), RenderError> {
        write!(self.out, "{}", value)?;
        Ok(())
    }

    pub(crate) fn write_bool(&mut self, value: bool) {
        self.out.push(if value { '1' } else { '0' });
    }

    pub(crate) fn write_body(&mut self, body: &Block) -> Result<(), RenderError> {
        self.out.push_str("{\n");
        for &member in &body.insts {
            let j = match self.refs.get(&member).copied() {
                Some(Ref::Local(j)) => j,
                _ => return Err(RenderError::UnresolvedRef),
            };
            write!(self.out, "  %{} = ", j)?;
            self.write_inst(member)?;
            self.out.push('\n');
        }
        self.out.push('}');
        Ok(())
    }
}
