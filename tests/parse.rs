//! Parser behavior: scanning, scoping, diagnostics, and recovery.

use num_bigint::BigInt;
use zir::{BuiltinType, InstData, Module};

fn parse_ok(source: &str) -> Module {
    let module = Module::parse(source);
    let msgs: Vec<&str> = module.errors.iter().map(|e| e.msg.as_str()).collect();
    assert!(msgs.is_empty(), "unexpected diagnostics: {:?}", msgs);
    module
}

fn single_error(source: &str) -> String {
    let module = Module::parse(source);
    assert_eq!(
        module.errors.len(),
        1,
        "expected one diagnostic, got {:?}",
        module.errors
    );
    module.errors[0].msg.clone()
}

// ---------------------------------------------------------------------------
// Well-formed input
// ---------------------------------------------------------------------------

#[test]
fn test_empty_module() {
    let module = parse_ok("");
    assert!(module.decls.is_empty());
}

#[test]
fn test_whitespace_and_comments_only() {
    let module = parse_ok("; header comment\n\n   \n; another\n");
    assert!(module.decls.is_empty());
}

#[test]
fn test_single_str_decl() {
    let module = parse_ok("@0 = str(\"hi\")\n");
    assert_eq!(module.decls.len(), 1);
    match &module.inst(module.decls[0]).data {
        InstData::Str { bytes } => assert_eq!(bytes.as_slice(), b"hi"),
        other => panic!("expected str, got {:?}", other),
    }
}

#[test]
fn test_str_escapes() {
    let module = parse_ok("@0 = str(\"a\\nb\\x00c\\\"d\")\n");
    match &module.inst(module.decls[0]).data {
        InstData::Str { bytes } => assert_eq!(bytes.as_slice(), b"a\nb\x00c\"d"),
        other => panic!("expected str, got {:?}", other),
    }
}

#[test]
fn test_int_decl_unbounded() {
    let module = parse_ok("@0 = int(-123456789012345678901234567890)\n");
    let expected: BigInt = "-123456789012345678901234567890".parse().unwrap();
    match &module.inst(module.decls[0]).data {
        InstData::Int { value } => assert_eq!(value, &expected),
        other => panic!("expected int, got {:?}", other),
    }
}

#[test]
fn test_primitive_decl() {
    let module = parse_ok("@0 = primitive(usize)\n");
    match &module.inst(module.decls[0]).data {
        InstData::Primitive { tag } => assert_eq!(*tag, BuiltinType::Usize),
        other => panic!("expected primitive, got {:?}", other),
    }
}

#[test]
fn test_named_identifiers_resolve() {
    let module = parse_ok("@void_ty = primitive(void)\n@sig = fntype([], @void_ty)\n");
    assert_eq!(module.decls.len(), 2);
    match &module.inst(module.decls[1]).data {
        InstData::FnType {
            param_types,
            return_type,
            ..
        } => {
            assert!(param_types.is_empty());
            assert_eq!(*return_type, module.decls[0]);
        }
        other => panic!("expected fntype, got {:?}", other),
    }
}

#[test]
fn test_comma_between_positionals_is_optional() {
    let module = parse_ok("@0 = primitive(void)\n@1 = fntype([] @0)\n");
    assert_eq!(module.decls.len(), 2);
}

#[test]
fn test_fn_with_body() {
    let source = "\
@0 = primitive(void)
@1 = fntype([], @0)
@2 = fn(@1, {
  %0 = unreachable()
})
";
    let module = parse_ok(source);
    assert_eq!(module.decls.len(), 3);
    match &module.inst(module.decls[2]).data {
        InstData::Fn { fn_type, body } => {
            assert_eq!(*fn_type, module.decls[1]);
            assert_eq!(body.insts.len(), 1);
            assert_eq!(module.inst(body.insts[0]).data.tag_name(), "unreachable");
        }
        other => panic!("expected fn, got {:?}", other),
    }
}

#[test]
fn test_block_local_references_resolve() {
    let source = "\
@0 = primitive(void)
@1 = fntype([], @0)
@2 = fn(@1, {
  %0 = unreachable()
  %1 = ptrtoint(%0)
})
";
    let module = parse_ok(source);
    match &module.inst(module.decls[2]).data {
        InstData::Fn { body, .. } => {
            assert_eq!(body.insts.len(), 2);
            match &module.inst(body.insts[1]).data {
                InstData::PtrToInt { ptr } => assert_eq!(*ptr, body.insts[0]),
                other => panic!("expected ptrtoint, got {:?}", other),
            }
        }
        other => panic!("expected fn, got {:?}", other),
    }
}

#[test]
fn test_asm_keywords_in_any_order() {
    let source = "\
@0 = str(\"syscall\")
@1 = primitive(usize)
@2 = asm(@0, @1, clobbers=[@0], volatile=1)
";
    let module = parse_ok(source);
    match &module.inst(module.decls[2]).data {
        InstData::Asm {
            volatile,
            output,
            inputs,
            clobbers,
            args,
            ..
        } => {
            assert!(*volatile);
            assert!(output.is_none());
            assert!(inputs.is_empty());
            assert_eq!(clobbers.len(), 1);
            assert!(args.is_empty());
        }
        other => panic!("expected asm, got {:?}", other),
    }
}

#[test]
fn test_asm_defaults_when_keywords_omitted() {
    let source = "\
@0 = str(\"nop\")
@1 = primitive(usize)
@2 = asm(@0, @1)
";
    let module = parse_ok(source);
    match &module.inst(module.decls[2]).data {
        InstData::Asm {
            volatile,
            output,
            inputs,
            clobbers,
            args,
            ..
        } => {
            assert!(!*volatile);
            assert!(output.is_none());
            assert!(inputs.is_empty());
            assert!(clobbers.is_empty());
            assert!(args.is_empty());
        }
        other => panic!("expected asm, got {:?}", other),
    }
}

#[test]
fn test_embedded_nul_terminates_parse() {
    let module = parse_ok("@0 = primitive(void)\n\u{0}@1 = primitive(bool)\n");
    assert_eq!(module.decls.len(), 1);
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_instruction() {
    let msg = single_error("@0 = frobnicate()\n");
    assert_eq!(msg, "unknown instruction 'frobnicate'");
}

#[test]
fn test_unknown_builtin_type() {
    let msg = single_error("@0 = primitive(i32)\n");
    assert_eq!(msg, "tag 'i32' not a member of enum 'BuiltinType'");
}

#[test]
fn test_unknown_calling_convention() {
    let msg = single_error("@0 = primitive(void)\n@1 = fntype([], @0, cc=Fastcall)\n");
    assert_eq!(msg, "tag 'Fastcall' not a member of enum 'CallingConvention'");
}

#[test]
fn test_percent_reference_in_global_scope() {
    let msg = single_error("@0 = ptrtoint(%7)\n");
    assert_eq!(msg, "referencing a % instruction in global scope");
}

#[test]
fn test_duplicate_identifier() {
    let source = "\
@x = primitive(bool)
@x = primitive(void)
";
    let module = Module::parse(source);
    assert_eq!(module.errors.len(), 1);
    assert_eq!(module.errors[0].msg, "redefinition of identifier 'x'");
    assert_eq!(module.decls.len(), 1);
}

#[test]
fn test_duplicate_block_identifier() {
    let source = "\
@0 = primitive(void)
@1 = fntype([], @0)
@2 = fn(@1, {
  %a = unreachable()
  %a = unreachable()
})
";
    let module = Module::parse(source);
    assert_eq!(module.errors.len(), 1);
    assert_eq!(module.errors[0].msg, "redefinition of identifier 'a'");
    assert_eq!(module.decls.len(), 2);
}

#[test]
fn test_unrecognized_identifier() {
    let msg = single_error("@0 = ptrtoint(@missing)\n");
    assert_eq!(msg, "unrecognized identifier 'missing'");
}

#[test]
fn test_forward_reference_in_block_is_unrecognized() {
    let source = "\
@0 = primitive(void)
@1 = fntype([], @0)
@2 = fn(@1, {
  %0 = ptrtoint(%1)
  %1 = unreachable()
})
";
    let module = Module::parse(source);
    assert_eq!(module.errors.len(), 1);
    assert_eq!(module.errors[0].msg, "unrecognized identifier '1'");
}

#[test]
fn test_missing_positional_argument() {
    let msg = single_error("@0 = fntype()\n");
    assert_eq!(msg, "missing positional argument 'param_types'");
}

#[test]
fn test_unrecognized_keyword_argument() {
    let msg = single_error("@0 = unreachable(volatile=1)\n");
    assert_eq!(msg, "unrecognized keyword argument 'volatile'");
}

#[test]
fn test_unexpected_byte_at_top_level() {
    let msg = single_error("hello\n");
    assert_eq!(msg, "unexpected byte: 'h'");
}

#[test]
fn test_unterminated_string() {
    let msg = single_error("@0 = str(\"abc");
    assert_eq!(msg, "unexpected EOF");
}

#[test]
fn test_invalid_string_escape() {
    let source = "@0 = str(\"a\\qb\")\n";
    let module = Module::parse(source);
    assert_eq!(module.errors.len(), 1);
    assert_eq!(module.errors[0].msg, "invalid character in string literal");
    // The diagnostic points at the 'q', not the start of the literal.
    assert_eq!(module.errors[0].byte as usize, source.find('q').unwrap());
}

#[test]
fn test_bad_bool_value() {
    let source = "\
@0 = str(\"nop\")
@1 = primitive(usize)
@2 = asm(@0, @1, volatile=2)
";
    let module = Module::parse(source);
    assert_eq!(module.errors.len(), 1);
    assert_eq!(module.errors[0].msg, "expected '0' or '1'");
}

#[test]
fn test_recovery_continues_at_next_decl() {
    let source = "\
@0 = bogus()
@1 = primitive(void)
";
    let module = Module::parse(source);
    assert_eq!(module.errors.len(), 1);
    assert_eq!(module.decls.len(), 1);
    assert_eq!(module.inst(module.decls[0]).data.tag_name(), "primitive");
}

#[test]
fn test_failed_fn_body_does_not_cascade() {
    let source = "\
@0 = primitive(void)
@1 = fntype([], @0)
@2 = fn(@1, {
  %0 = ptrtoint(%9)
  %1 = unreachable()
})
@3 = primitive(bool)
";
    let module = Module::parse(source);
    // One diagnostic for the bad reference; the body's remaining lines are
    // skipped and @3 still parses.
    assert_eq!(module.errors.len(), 1);
    assert_eq!(module.errors[0].msg, "unrecognized identifier '9'");
    assert_eq!(module.decls.len(), 3);
}

#[test]
fn test_diagnostic_offsets_point_into_source() {
    let source = "@0 = primitive(i32)\n";
    let module = Module::parse(source);
    assert_eq!(module.errors.len(), 1);
    let err = &module.errors[0];
    assert_eq!(err.byte as usize, source.find("i32").unwrap());
    let rendered = zir::diagnostics::render_error(source, err);
    assert!(rendered.contains("error: tag 'i32' not a member of enum 'BuiltinType'"));
    assert!(rendered.contains("--> 1:16"));
}

// ---------------------------------------------------------------------------
// String-literal collaborator
// ---------------------------------------------------------------------------

#[test]
fn test_strlit_render_unescape_identity() {
    let cases: &[&[u8]] = &[b"", b"plain", b"tab\there", b"nul\x00mid", b"q\"s\\b", b"\xff\xfe"];
    for case in cases {
        let mut quoted = String::new();
        zir::strlit::render(case, &mut quoted);
        let raw = &quoted.as_bytes()[1..quoted.len() - 1];
        assert_eq!(
            zir::strlit::unescape(raw).expect("rendered form must decode"),
            case.to_vec()
        );
    }
}
