//! Typed IR → ZIR lowering.
//!
//! Walks the exports of an analyzed [`tir::Module`] and emits an
//! equivalent textual-form [`Module`]: each export becomes an
//! `export(str, value)` declaration plus every supporting declaration the
//! value requires. Typed constants are memoized, so two references to the
//! same analyzed constant share exactly one ZIR declaration.
//!
//! Categories the emitter cannot express yet abort with a
//! [`LowerError`]; they flag compiler gaps, not user input.

use std::collections::HashMap;

use crate::error::LowerError;
use crate::ir::inst::{Block, Inst, InstData, InstId};
use crate::ir::module::Module;
use crate::tir;

/// Lowers an analyzed module to ZIR.
pub fn emit_zir(analyzed: &tir::Module) -> Result<Module, LowerError> {
    let mut emitter = Emitter {
        analyzed,
        module: Module::default(),
        const_memo: HashMap::new(),
    };
    for export in &analyzed.exports {
        emitter.emit_export(export)?;
    }
    Ok(emitter.module)
}

struct Emitter<'t> {
    analyzed: &'t tir::Module,
    module: Module,
    /// Typed constant → its ZIR declaration.
    const_memo: HashMap<tir::InstId, InstId>,
}

impl<'t> Emitter<'t> {
    /// Allocates an instruction and appends it to the declaration list.
    fn add_decl(&mut self, offset: u32, data: InstData) -> InstId {
        let id = self.module.alloc(Inst { offset, data });
        self.module.decls.push(id);
        id
    }

    fn emit_export(&mut self, export: &tir::Export) -> Result<(), LowerError> {
        let value = self.emit_const(export.value)?;
        let symbol_name = self.add_decl(
            export.offset,
            InstData::Str {
                bytes: export.symbol_name.clone(),
            },
        );
        self.add_decl(export.offset, InstData::Export { symbol_name, value });
        Ok(())
    }

    /// Emits the declaration for a typed constant, reusing an earlier
    /// emission when the same constant was already referenced.
    fn emit_const(&mut self, id: tir::InstId) -> Result<InstId, LowerError> {
        if let Some(&done) = self.const_memo.get(&id) {
            return Ok(done);
        }
        let analyzed = self.analyzed;
        let inst = analyzed.inst(id);
        let emitted = match &inst.kind {
            tir::InstKind::Constant(value) => {
                self.emit_typed_value(inst.offset, &inst.ty, value)?
            }
            _ => unreachable!("emit_const called on a non-constant instruction"),
        };
        self.const_memo.insert(id, emitted);
        Ok(emitted)
    }

    /// Dispatches on the value's type category.
    fn emit_typed_value(
        &mut self,
        offset: u32,
        ty: &tir::Type,
        value: &tir::Value,
    ) -> Result<InstId, LowerError> {
        match (ty, value) {
            (tir::Type::BytesPtr, tir::Value::Bytes(bytes)) => Ok(self.add_decl(
                offset,
                InstData::Str {
                    bytes: bytes.clone(),
                },
            )),
            (t, tir::Value::Int(v)) if t.is_comptime_int() => Ok(self.add_decl(
                offset,
                InstData::Int { value: v.clone() },
            )),
            (t, tir::Value::Int(v)) if t.is_sized_int() => {
                let dest_type = self.emit_type(offset, ty)?;
                let int = self.add_decl(offset, InstData::Int { value: v.clone() });
                Ok(self.add_decl(
                    offset,
                    InstData::As {
                        dest_type,
                        value: int,
                    },
                ))
            }
            (t, tir::Value::Ty(inner)) if t.is_type() => self.emit_type(offset, inner),
            (tir::Type::Fn { .. }, tir::Value::Fn(index)) => self.emit_fn(offset, *index, ty),
            _ => Err(LowerError::UnsupportedValue { ty: ty.to_string() }),
        }
    }

    /// Emits the declaration naming a type.
    fn emit_type(&mut self, offset: u32, ty: &tir::Type) -> Result<InstId, LowerError> {
        match ty {
            tir::Type::Primitive(tag) => {
                Ok(self.add_decl(offset, InstData::Primitive { tag: *tag }))
            }
            tir::Type::Fn {
                param_types,
                return_type,
                cc,
            } => {
                let mut params = Vec::with_capacity(param_types.len());
                for p in param_types {
                    params.push(self.emit_type(offset, p)?);
                }
                let return_type = self.emit_type(offset, return_type)?;
                Ok(self.add_decl(
                    offset,
                    InstData::FnType {
                        param_types: params,
                        return_type,
                        cc: *cc,
                    },
                ))
            }
            tir::Type::BytesPtr => Err(LowerError::UnsupportedType { ty: ty.to_string() }),
        }
    }

    /// Emits a function body instruction-by-instruction, then wraps it in
    /// a `fn(fntype, { ... })` declaration.
    fn emit_fn(
        &mut self,
        offset: u32,
        index: usize,
        fn_ty: &tir::Type,
    ) -> Result<InstId, LowerError> {
        let analyzed = self.analyzed;
        let func = &analyzed.functions[index];
        let fn_type = self.emit_type(offset, fn_ty)?;
        let mut inst_map: HashMap<tir::InstId, InstId> = HashMap::new();
        let mut body = Block::default();
        for &tid in &func.body {
            let inst = analyzed.inst(tid);
            let data = match &inst.kind {
                tir::InstKind::Unreach => InstData::Unreachable {},
                tir::InstKind::PtrToInt { operand } => InstData::PtrToInt {
                    ptr: self.resolve_operand(&inst_map, *operand)?,
                },
                tir::InstKind::BitCast { operand } => {
                    let dest_type = self.emit_type(inst.offset, &inst.ty)?;
                    let operand = self.resolve_operand(&inst_map, *operand)?;
                    InstData::BitCast { dest_type, operand }
                }
                tir::InstKind::Asm {
                    asm_source,
                    is_volatile,
                    output,
                    inputs,
                    clobbers,
                    args,
                } => {
                    let asm_source = self.emit_str(inst.offset, asm_source);
                    let return_type = self.emit_type(inst.offset, &inst.ty)?;
                    let output = output.as_ref().map(|bytes| self.emit_str(inst.offset, bytes));
                    let inputs = inputs
                        .iter()
                        .map(|bytes| self.emit_str(inst.offset, bytes))
                        .collect();
                    let clobbers = clobbers
                        .iter()
                        .map(|bytes| self.emit_str(inst.offset, bytes))
                        .collect();
                    let mut arg_ids = Vec::with_capacity(args.len());
                    for &arg in args {
                        arg_ids.push(self.resolve_operand(&inst_map, arg)?);
                    }
                    InstData::Asm {
                        asm_source,
                        return_type,
                        volatile: *is_volatile,
                        output,
                        inputs,
                        clobbers,
                        args: arg_ids,
                    }
                }
                tir::InstKind::Constant(_) => {
                    unreachable!("constants are materialized on reference, not in function bodies")
                }
            };
            let emitted = self.module.alloc(Inst {
                offset: inst.offset,
                data,
            });
            inst_map.insert(tid, emitted);
            body.insts.push(emitted);
        }
        Ok(self.add_decl(offset, InstData::Fn { fn_type, body }))
    }

    /// A string operand becomes a `str` sub-declaration.
    fn emit_str(&mut self, offset: u32, bytes: &[u8]) -> InstId {
        self.add_decl(
            offset,
            InstData::Str {
                bytes: bytes.to_vec(),
            },
        )
    }

    /// Resolves a typed operand: a body instruction already emitted for
    /// this function, or a constant materialized (once) on first use.
    fn resolve_operand(
        &mut self,
        inst_map: &HashMap<tir::InstId, InstId>,
        id: tir::InstId,
    ) -> Result<InstId, LowerError> {
        if let Some(&emitted) = inst_map.get(&id) {
            return Ok(emitted);
        }
        self.emit_const(id)
    }
}
