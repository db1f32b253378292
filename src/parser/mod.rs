//! Handwritten byte-cursor parser for textual ZIR.
//!
//! There is no separate lexer: the parser scans bytes directly and resolves
//! identifier references inline, so every instruction argument is already a
//! handle into the module arena by the time a declaration finishes parsing.
//! Syntax problems are recorded as [`ErrorMsg`] diagnostics on the module
//! and parsing resumes at the next declaration.
//!
//! Grammar (informal):
//! ```text
//! program  := (decl | comment | ws)*
//! decl     := "@" ident ws "=" ws instr
//! instr    := ident "(" (value ("," ws value)*)? ("," ws ident "=" value)* ")"
//! value    := instref | instlist | string | integer | bool | enumname | block
//! instref  := ("@" | "%") ident
//! instlist := "[" (instref ("," ws instref)*)? "]"
//! block    := "{" (comment | "%" ident ws "=" ws instr | ws)* "}"
//! string   := '"' ... '"'        ('\' escapes the next byte)
//! integer  := "-"? digit+
//! bool     := "0" | "1"
//! comment  := ";" ... "\n"
//! ws       := (" " | "\n")*
//! ```
//!
//! Scanning reads through a virtual NUL sentinel: any access past the end
//! of the buffer yields 0, and an embedded NUL byte terminates parsing the
//! same way the end of input does.

use std::collections::HashMap;

use num_bigint::BigInt;

use crate::ir::inst::{Block, Inst, InstId, NamedEnum};
use crate::ir::module::{ErrorMsg, Module};
use crate::strlit;

/// Sentinel meaning "a diagnostic has already been recorded; abandon the
/// current declaration". The fatal channel (allocation failure) aborts the
/// process, so this is the only inner failure the parser threads around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParseFailed;

pub(crate) type ParseResult<T> = Result<T, ParseFailed>;

/// Identifier map for the innermost block being parsed. `%` references
/// resolve here; `@` references resolve in the module-level map. Keys
/// borrow the source buffer and die with the parse.
#[derive(Default)]
pub(crate) struct BlockScope<'src> {
    names: HashMap<&'src str, InstId>,
}

pub struct Parser<'src> {
    src: &'src str,
    pos: usize,
    module: Module,
    globals: HashMap<&'src str, InstId>,
}

impl<'src> Parser<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            pos: 0,
            module: Module::default(),
            globals: HashMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Byte-cursor helpers
    // -----------------------------------------------------------------------

    /// The byte at the cursor, or 0 at (or past) the end of input.
    pub(crate) fn peek(&self) -> u8 {
        self.src.as_bytes().get(self.pos).copied().unwrap_or(0)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    pub(crate) fn byte_pos(&self) -> u32 {
        self.pos as u32
    }

    pub(crate) fn skip_space(&mut self) {
        while matches!(self.peek(), b' ' | b'\n') {
            self.bump();
        }
    }

    /// Consumes `b` if it is the next byte.
    pub(crate) fn eat_byte(&mut self, b: u8) -> bool {
        if self.peek() == b {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Requires the exact bytes `s`; restores the cursor on mismatch.
    fn require_bytes(&mut self, s: &str) -> ParseResult<()> {
        let at = self.byte_pos();
        if self.src.as_bytes()[self.pos..].starts_with(s.as_bytes()) {
            self.pos += s.len();
            Ok(())
        } else {
            self.fail(at, format!("expected '{}'", s))
        }
    }

    /// Returns the span up to the next `b` and advances past it.
    pub(crate) fn scan_to_and_over(&mut self, b: u8) -> ParseResult<&'src str> {
        let src = self.src;
        let start = self.pos;
        loop {
            let c = self.peek();
            if c == 0 {
                let at = self.byte_pos();
                return self.fail(at, "unexpected EOF");
            }
            if c == b {
                break;
            }
            self.bump();
        }
        let s = &src[start..self.pos];
        self.bump();
        Ok(s)
    }

    /// Reads an identifier: any run of bytes up to `,`, `)`, `]`, newline
    /// or NUL. The terminator is not consumed.
    fn scan_ident(&mut self) -> &'src str {
        let src = self.src;
        let start = self.pos;
        while !matches!(self.peek(), b',' | b')' | b']' | b'\n' | 0) {
            self.bump();
        }
        &src[start..self.pos]
    }

    fn skip_line_comment(&mut self) {
        while !matches!(self.peek(), b'\n' | 0) {
            self.bump();
        }
        self.eat_byte(b'\n');
    }

    /// Skips to the start of the next line that begins a declaration, so a
    /// failed multi-line declaration does not cascade into bogus
    /// "unexpected byte" diagnostics for its remaining lines.
    fn recover_to_next_decl(&mut self) {
        loop {
            match self.peek() {
                0 => break,
                b'\n' => {
                    self.bump();
                    if self.peek() == b'@' {
                        break;
                    }
                }
                _ => self.bump(),
            }
        }
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    fn error(&mut self, byte: u32, msg: impl Into<String>) {
        self.module.errors.push(ErrorMsg {
            byte,
            msg: msg.into(),
        });
    }

    /// Records a diagnostic and abandons the current declaration.
    pub(crate) fn fail<T>(&mut self, byte: u32, msg: impl Into<String>) -> ParseResult<T> {
        self.error(byte, msg);
        Err(ParseFailed)
    }

    // -----------------------------------------------------------------------
    // Top-level
    // -----------------------------------------------------------------------

    /// Parses the whole source, consuming the parser. The identifier maps
    /// are dropped here; the returned module retains only indices.
    pub fn parse_module(mut self) -> Module {
        loop {
            match self.peek() {
                0 => break,
                b' ' | b'\n' => self.bump(),
                b';' => self.skip_line_comment(),
                b'@' => {
                    self.bump();
                    if self.parse_decl().is_err() {
                        self.recover_to_next_decl();
                    }
                }
                b => {
                    let at = self.byte_pos();
                    self.error(at, format!("unexpected byte: '{}'", b as char));
                    self.recover_to_next_decl();
                }
            }
        }
        self.module
    }

    /// Parses one `@name = instr` declaration. The leading `@` has already
    /// been consumed.
    fn parse_decl(&mut self) -> ParseResult<()> {
        let name_at = self.byte_pos();
        let name = self.scan_to_and_over(b' ')?;
        self.require_bytes("=")?;
        self.skip_space();
        let inst = self.parse_instruction(None)?;
        if self.globals.contains_key(name) {
            return self.fail(name_at, format!("redefinition of identifier '{}'", name));
        }
        self.globals.insert(name, inst);
        self.module.decls.push(inst);
        Ok(())
    }

    /// Parses `tag(args)` and allocates the instruction in the arena.
    fn parse_instruction(&mut self, scope: Option<&BlockScope<'src>>) -> ParseResult<InstId> {
        let at = self.byte_pos();
        let tag = self.scan_to_and_over(b'(')?;
        let data = self.parse_inst_args(tag, at, scope)?;
        Ok(self.module.alloc(Inst { offset: at, data }))
    }

    // -----------------------------------------------------------------------
    // Argument values
    // -----------------------------------------------------------------------

    /// Parses `@name` or `%name` and resolves it against the module map or
    /// the enclosing block map.
    pub(crate) fn parse_inst_ref(
        &mut self,
        scope: Option<&BlockScope<'src>>,
    ) -> ParseResult<InstId> {
        let at = self.byte_pos();
        match self.peek() {
            b'@' => {
                self.bump();
                let name = self.scan_ident();
                let found = self.globals.get(name).copied();
                match found {
                    Some(id) => Ok(id),
                    None => self.fail(at, format!("unrecognized identifier '{}'", name)),
                }
            }
            b'%' => {
                self.bump();
                let name = self.scan_ident();
                match scope {
                    Some(block) => match block.names.get(name).copied() {
                        Some(id) => Ok(id),
                        None => self.fail(at, format!("unrecognized identifier '{}'", name)),
                    },
                    None => self.fail(at, "referencing a % instruction in global scope"),
                }
            }
            _ => self.fail(at, "expected instruction reference"),
        }
    }

    /// Parses `[a, b, ...]` (possibly empty).
    pub(crate) fn parse_inst_list(
        &mut self,
        scope: Option<&BlockScope<'src>>,
    ) -> ParseResult<Vec<InstId>> {
        let at = self.byte_pos();
        if !self.eat_byte(b'[') {
            return self.fail(at, "expected instruction list");
        }
        let mut items = Vec::new();
        loop {
            self.skip_space();
            if self.eat_byte(b']') {
                break;
            }
            if self.peek() == 0 {
                let at = self.byte_pos();
                return self.fail(at, "unexpected EOF");
            }
            items.push(self.parse_inst_ref(scope)?);
            self.skip_space();
            self.eat_byte(b',');
        }
        Ok(items)
    }

    /// Parses a quoted string literal and decodes its escapes.
    pub(crate) fn parse_str_lit(&mut self) -> ParseResult<Vec<u8>> {
        let at = self.byte_pos();
        if !self.eat_byte(b'"') {
            return self.fail(at, "expected string literal");
        }
        let content_start = self.pos;
        loop {
            match self.peek() {
                0 => {
                    let at = self.byte_pos();
                    return self.fail(at, "unexpected EOF");
                }
                b'"' => break,
                b'\\' => {
                    self.bump();
                    if self.peek() == 0 {
                        let at = self.byte_pos();
                        return self.fail(at, "unexpected EOF");
                    }
                    self.bump();
                }
                _ => self.bump(),
            }
        }
        let raw = &self.src.as_bytes()[content_start..self.pos];
        self.bump(); // closing quote
        match strlit::unescape(raw) {
            Ok(bytes) => Ok(bytes),
            Err(bad) => self.fail(
                content_start as u32 + bad as u32,
                "invalid character in string literal",
            ),
        }
    }

    /// Parses an optionally negated decimal integer of unbounded size.
    pub(crate) fn parse_int_lit(&mut self) -> ParseResult<BigInt> {
        let at = self.byte_pos();
        let start = self.pos;
        self.eat_byte(b'-');
        if !self.peek().is_ascii_digit() {
            return self.fail(at, "expected integer literal");
        }
        while self.peek().is_ascii_digit() {
            self.bump();
        }
        match BigInt::parse_bytes(&self.src.as_bytes()[start..self.pos], 10) {
            Some(value) => Ok(value),
            None => self.fail(at, "invalid integer literal"),
        }
    }

    /// Parses a single `0` or `1`.
    pub(crate) fn parse_bool_lit(&mut self) -> ParseResult<bool> {
        let at = self.byte_pos();
        match self.peek() {
            b'0' => {
                self.bump();
                Ok(false)
            }
            b'1' => {
                self.bump();
                Ok(true)
            }
            _ => self.fail(at, "expected '0' or '1'"),
        }
    }

    /// Parses an enum value by variant name.
    pub(crate) fn parse_enum_name<E: NamedEnum>(&mut self) -> ParseResult<E> {
        let at = self.byte_pos();
        let name = self.scan_ident();
        match E::from_name(name) {
            Some(value) => Ok(value),
            None => self.fail(
                at,
                format!("tag '{}' not a member of enum '{}'", name, E::ENUM_NAME),
            ),
        }
    }

    /// Parses a `{ ... }` function body. Each `%name = instr` definition
    /// registers its identifier in a fresh block scope; references resolve
    /// inline, so forward references are "unrecognized identifier".
    pub(crate) fn parse_body(&mut self) -> ParseResult<Block> {
        let at = self.byte_pos();
        if !self.eat_byte(b'{') {
            return self.fail(at, "expected function body block");
        }
        let mut scope = BlockScope::default();
        let mut insts = Vec::new();
        loop {
            self.skip_space();
            match self.peek() {
                b'}' => {
                    self.bump();
                    break;
                }
                b';' => self.skip_line_comment(),
                b'%' => {
                    self.bump();
                    let name_at = self.byte_pos();
                    let name = self.scan_to_and_over(b' ')?;
                    self.require_bytes("=")?;
                    self.skip_space();
                    let inst = self.parse_instruction(Some(&scope))?;
                    if scope.names.contains_key(name) {
                        return self
                            .fail(name_at, format!("redefinition of identifier '{}'", name));
                    }
                    scope.names.insert(name, inst);
                    insts.push(inst);
                }
                0 => {
                    let at = self.byte_pos();
                    return self.fail(at, "unexpected EOF");
                }
                b => {
                    let at = self.byte_pos();
                    return self.fail(at, format!("unexpected byte: '{}'", b as char));
                }
            }
        }
        Ok(Block { insts })
    }
}
