//! jaw assembler test suite

use crate::arch::{set_register_from_any, set_register_from_known, ArchParams, Instruction};
use crate::asm::label::LabelToken;
use crate::asm::line::SizeRange;
use crate::asm::operand::unescape;
use crate::asm::pattern::{find_pattern, Shape, PATTERNS};
use crate::asm::program::MAX_LAYOUT_PASSES;
use crate::asm::{analyze_line, assemble, evaluate_line, parse_literal, AsmError, Target};
use crate::memory::BitString;
use crate::platform::Environment;
use std::str::FromStr;

fn jaw(r: u32, m: u32) -> Target {
    Target::new(ArchParams::new(r, m).unwrap(), Environment::Ascii)
}

macro_rules! assert_line_size {
    ($target: expr, $line: expr, $min: expr, $max: expr) => {
        assert_eq!(
            analyze_line($target, $line).unwrap().size,
            SizeRange {
                min: $min,
                max: Some($max)
            },
            "size of {:?}",
            $line
        )
    };
}

macro_rules! assert_line_err {
    ($target: expr, $line: expr, $err: expr) => {
        assert_eq!(evaluate_line($target, $line, 0, vec![]).unwrap_err(), $err)
    };
}

fn decode_all(target: Target, bits: &BitString) -> Vec<Instruction> {
    let mut reader = bits.reader();
    let mut out = Vec::new();

    while reader.remaining() > 0 {
        out.push(Instruction::decode(target.arch, &mut reader).unwrap());
    }

    out
}

/// Read back the value a run of whole-register bit writes loads.
fn loaded_value(instrs: &[Instruction]) -> u128 {
    instrs.iter().fold(0, |acc, instr| match instr {
        Instruction::SetRegBit { b, .. } => (acc << 1) | *b as u128,
        _ => panic!("not a register write: {}", instr),
    })
}

#[test]
fn pattern_table_order() {
    let shape = |line: &str| find_pattern(line).map(|(pattern, _)| pattern.shape());

    assert_eq!(PATTERNS.len(), 13);
    assert_eq!(shape("@.loop"), Some(Shape::LabelDecl));
    assert_eq!(shape("mem[reg0] = 1"), Some(Shape::SetMemBit));
    assert_eq!(shape("mem[reg0] ? pp += reg1"), Some(Shape::JumpIfMem));
    assert_eq!(shape("mem[reg0] ? pp += reg1 @.next"), Some(Shape::JumpIfMemDecl));
    assert_eq!(shape("mem[reg0] ? goto .top via reg1"), Some(Shape::GotoIfMem));
    assert_eq!(shape("reg1[2] = 0"), Some(Shape::SetRegBit));
    assert_eq!(shape("reg1[2] ? pp += reg3"), Some(Shape::JumpIfRegBit));
    assert_eq!(shape("reg1[2] ? pp += reg3 @.next"), Some(Shape::JumpIfRegBitDecl));
    assert_eq!(shape("reg1[2] ? goto 40 via reg3"), Some(Shape::GotoIfRegBit));
    assert_eq!(shape("reg1: any = const 5 - 3"), Some(Shape::SetRegisterDiff));
    assert_eq!(shape("reg1: any = const 5"), Some(Shape::SetRegister));
    assert_eq!(shape("#store \"hi\""), Some(Shape::Store));
    assert_eq!(shape("#print \"hi\""), Some(Shape::Print));
    assert_eq!(shape("mov a, b"), None);
}

#[test]
fn literals() {
    assert_eq!(parse_literal::<u128>("65"), Some(65));
    assert_eq!(parse_literal::<u128>("0x41"), Some(0x41));
    assert_eq!(parse_literal::<u128>("0XfF"), Some(0xFF));
    assert_eq!(parse_literal::<u128>("0o17"), Some(0o17));
    assert_eq!(parse_literal::<u128>("0b1010_0001"), Some(0b1010_0001));
    assert_eq!(parse_literal::<u128>("1_000"), Some(1000));
    assert_eq!(parse_literal::<u128>(" 7 "), Some(7));
    assert_eq!(parse_literal::<u128>(""), None);
    assert_eq!(parse_literal::<u128>("0x"), None);
    assert_eq!(parse_literal::<u128>("0x_1"), None);
    assert_eq!(parse_literal::<u128>("-1"), None);
    assert_eq!(parse_literal::<u128>("+1"), None);
    assert_eq!(parse_literal::<u128>("12a"), None);
    assert_eq!(parse_literal::<u8>("256"), None);
}

#[test]
fn string_escapes() {
    assert_eq!(unescape("plain"), Some("plain".to_string()));
    assert_eq!(unescape("a\\nb\\t\\\\"), Some("a\nb\t\\".to_string()));
    assert_eq!(unescape("\\\"q\\\""), Some("\"q\"".to_string()));
    assert_eq!(unescape("\\x41\\0"), Some("A\0".to_string()));
    assert_eq!(unescape("\\u{e9}\\u{1F600}"), Some("é😀".to_string()));
    assert_eq!(unescape("\\q"), None);
    assert_eq!(unescape("\\x4"), None);
    assert_eq!(unescape("\\u{41"), None);
    assert_eq!(unescape("\\u{d800}"), None);
    assert_eq!(unescape("bare\"quote"), None);
    assert_eq!(unescape("trailing\\"), None);
}

#[test]
fn label_tokens() {
    assert_eq!(
        LabelToken::from_str("@.loop"),
        Ok(LabelToken::Declaration("loop".to_string()))
    );
    assert_eq!(
        LabelToken::from_str(".loop_2"),
        Ok(LabelToken::Reference("loop_2".to_string()))
    );
    assert!(LabelToken::from_str(".2loop").is_err());
    assert!(LabelToken::from_str("@loop").is_err());
    assert!(LabelToken::from_str(".").is_err());
    assert!(LabelToken::from_str(".a-b").is_err());
    assert_eq!(format!("{}", LabelToken::Declaration("x".to_string())), "@.x");
    assert_eq!(format!("{}", LabelToken::Reference("x".to_string())), ".x");
}

#[test]
fn concrete_lines_have_exact_size() {
    let t = jaw(3, 4);

    assert_line_size!(t, "@.here", 0, 0);
    assert_line_size!(t, "mem[reg0] = 1", 6, 6);
    assert_line_size!(t, "mem[reg0] ? pp += reg1", 8, 8);
    assert_line_size!(t, "reg7[15] = 0", 10, 10);
    assert_line_size!(t, "reg7[15] ? pp += reg2", 12, 12);
    assert_line_size!(t, "reg2: 0x00FF = const 0x01F0", 50, 50);
    assert_line_size!(t, "reg2: 10 = const 10", 0, 0);
    assert_line_size!(t, "reg2: 0 = const 9 - 2", 30, 30);
    assert_line_size!(t, "reg2: any = const 5", 160, 160);
    assert_line_size!(t, "mem[reg0] ? goto 100 via reg1", 168, 168);
    assert_line_size!(t, "#store \"AB\"", 16, 16);
    assert_line_size!(t, "#print \"A\"", 96, 96);
}

#[test]
fn unresolved_lines_have_ranges() {
    let t = jaw(3, 4);

    assert_line_size!(t, "reg2: .a = const 5", 0, 160);
    assert_line_size!(t, "reg2: 0 = const .a", 0, 160);
    assert_line_size!(t, "reg2: any = const .a", 0, 160);
    assert_line_size!(t, "reg2: any = const .a - .b", 0, 160);
    assert_line_size!(t, "reg0[3] ? goto .top via reg7", 0, 172);
}

#[test]
fn size_range_display() {
    assert_eq!(format!("{}", SizeRange::exact(0)), "0x0-0x0");
    assert_eq!(format!("{}", SizeRange::up_to(160)), "0x0-0xa0");
    assert_eq!(format!("{}", SizeRange { min: 6, max: None }), "0x6-inf");
}

#[test]
fn analysis_lists_labels() {
    let t = jaw(3, 4);
    let analysis = analyze_line(t, "reg2: .init = const .a - .b").unwrap();

    assert!(analysis.declared.is_empty());
    assert_eq!(analysis.referenced, vec!["init", "a", "b"]);

    let analysis = analyze_line(t, "reg1[0] ? pp += reg2 @.after").unwrap();

    assert_eq!(analysis.declared, vec!["after"]);
    assert!(analysis.referenced.is_empty());
}

#[test]
fn evaluate_base_instructions() {
    let t = jaw(3, 4);
    let eval = evaluate_line(t, "reg7[9] = 1", 0, vec![]).unwrap();

    assert_eq!(eval.bits, BitString::from_str("10 111 1001 1").unwrap());
    assert!(eval.declared.is_empty());

    let eval = evaluate_line(t, "  mem[reg1] ? pp += reg6  ", 0, vec![]).unwrap();

    assert_eq!(eval.bits, BitString::from_str("01 001 110").unwrap());
}

#[test]
fn evaluate_declarations() {
    let t = jaw(3, 4);
    let eval = evaluate_line(t, "@.start", 40, vec![]).unwrap();

    assert!(eval.bits.is_empty());
    assert_eq!(eval.declared, vec![("start".to_string(), 40)]);

    let eval = evaluate_line(t, "mem[reg0] ? pp += reg1 @.after", 100, vec![]).unwrap();

    assert_eq!(eval.bits.len(), 8);
    assert_eq!(eval.declared, vec![("after".to_string(), 108)]);

    let eval = evaluate_line(t, "reg0[1] ? pp += reg1 @.after", 100, vec![]).unwrap();

    assert_eq!(eval.declared, vec![("after".to_string(), 112)]);
}

#[test]
fn evaluate_register_loads() {
    let t = jaw(3, 4);
    let eval = evaluate_line(t, "reg2: any = const .a - .b", 0, vec![10, 3]).unwrap();

    assert_eq!(eval.bits, set_register_from_any(t.arch, 2, 7).unwrap());

    let eval = evaluate_line(t, "reg2: .init = const 0x01F0", 0, vec![0x00FF]).unwrap();

    assert_eq!(
        eval.bits,
        set_register_from_known(t.arch, 2, 0x00FF, 0x01F0).unwrap()
    );

    let eval = evaluate_line(t, "reg2: 0 = const 3 - 4", 0, vec![]).unwrap();

    assert_eq!(eval.bits.len(), 160);
}

#[test]
fn evaluate_goto() {
    let t = jaw(3, 4);
    let eval = evaluate_line(t, "reg0[3] ? goto .top via reg7", 200, vec![20]).unwrap();
    let instrs = decode_all(t, &eval.bits);

    assert_eq!(instrs.len(), 17);
    assert_eq!(loaded_value(&instrs[..16]), (20u128).wrapping_sub(372) & 0xFFFF);
    assert_eq!(instrs[16], Instruction::JumpIfRegBit { n: 0, i: 3, k: 7 });
}

#[test]
fn evaluate_text() {
    let t = jaw(3, 4);
    let eval = evaluate_line(t, "#store \"AB\"", 0, vec![]).unwrap();

    assert_eq!(eval.bits, BitString::from_str("01000001 01000010").unwrap());

    let wide = Target::new(t.arch, Environment::Unicode);
    let eval = evaluate_line(wide, "#store \"\\u{e9}\"", 0, vec![]).unwrap();

    assert_eq!(eval.bits, BitString::from_str("00000000 11101001").unwrap());

    let eval = evaluate_line(t, "#print \"A\"", 0, vec![]).unwrap();
    let instrs = decode_all(t, &eval.bits);

    assert_eq!(instrs.len(), 16);
    for (i, pair) in instrs.chunks(2).enumerate() {
        assert_eq!(
            pair[0],
            Instruction::SetMemBit {
                n: 1,
                b: (0x41 >> (7 - i)) & 1 == 1
            }
        );
        assert_eq!(pair[1], Instruction::SetMemBit { n: 2, b: true });
    }
}

#[test]
fn line_errors() {
    let t = jaw(3, 4);

    assert_line_err!(
        t,
        "mov a, b",
        AsmError::NoMatchingPattern("mov a, b".to_string())
    );
    assert_line_err!(
        t,
        "mem[reg9] = 1",
        AsmError::ValueOutOfRange { value: 9, width: 3 }
    );
    assert_line_err!(
        t,
        "reg1[2] = 2",
        AsmError::ValueOutOfRange { value: 2, width: 1 }
    );
    assert_line_err!(
        t,
        "mem[regx] = 1",
        AsmError::InvalidOperand {
            token: "x".to_string(),
            line: "mem[regx] = 1".to_string()
        }
    );
    assert_line_err!(
        t,
        "reg1: some = const 4",
        AsmError::InvalidOperand {
            token: "some".to_string(),
            line: "reg1: some = const 4".to_string()
        }
    );
    assert_line_err!(
        t,
        "reg1: any = const 0x10000",
        AsmError::ValueOutOfRange {
            value: 0x10000,
            width: 16
        }
    );
    assert_line_err!(
        t,
        "#store \"€\"",
        AsmError::ValueOutOfRange {
            value: 0x20AC,
            width: 8
        }
    );
    assert!(matches!(
        evaluate_line(t, ".nowhere", 0, vec![5]),
        Err(AsmError::InvalidOperand { .. })
    ));
    assert!(matches!(
        analyze_line(t, "#print \"\\q\""),
        Err(AsmError::InvalidOperand { .. })
    ));
    assert_line_err!(
        t,
        "reg3[15] ? goto 0x40 via reg3",
        AsmError::InvalidOperand {
            token: "3".to_string(),
            line: "reg3[15] ? goto 0x40 via reg3".to_string()
        }
    );
    assert_line_err!(
        t,
        "mem[reg1] ? goto 0 via reg1",
        AsmError::InvalidOperand {
            token: "1".to_string(),
            line: "mem[reg1] ? goto 0 via reg1".to_string()
        }
    );
    assert!(matches!(
        analyze_line(t, "reg3[15] ? goto .skip via reg3"),
        Err(AsmError::InvalidOperand { .. })
    ));
}

#[test]
fn goto_via_condition_register_is_rejected() {
    let source = "reg3: any = const 0\nreg3[15] ? goto .skip via reg3\n@.skip\nmem[reg0] = 1";
    let err = assemble(jaw(2, 4), source).unwrap_err();

    assert!(matches!(err, AsmError::Line { line: 2, .. }));
    assert!(matches!(err.root(), AsmError::InvalidOperand { token, .. } if token == "3"));
}

#[test]
fn print_needs_io_registers() {
    assert_line_err!(
        jaw(1, 3),
        "#print \"A\"",
        AsmError::ValueOutOfRange { value: 2, width: 1 }
    );
}

#[test]
fn offset_queue_protocol() {
    let t = jaw(3, 4);

    assert_eq!(
        evaluate_line(t, "reg2: any = const .a - .b", 0, vec![10]).unwrap_err(),
        AsmError::UnresolvedLabelReference("b".to_string())
    );
    assert_eq!(
        evaluate_line(t, "mem[reg0] = 1", 0, vec![5]).unwrap_err(),
        AsmError::ExcessLabelOffsets {
            count: 1,
            line: "mem[reg0] = 1".to_string()
        }
    );
}

#[test]
fn assemble_listing() {
    let t = jaw(3, 4);
    let source = "// setup\nmem[reg0] = 0   // clear halt\n\n@.here\nreg1[0] = 1\n";
    let asm = assemble(t, source).unwrap();

    assert_eq!(asm.bits.len(), 16);
    assert_eq!(asm.labels.get("here"), Some(&6));
    assert_eq!(
        asm.listing
            .iter()
            .map(|e| (e.line, e.offset, e.len))
            .collect::<Vec<_>>(),
        vec![(2, 0, 6), (4, 6, 0), (5, 6, 10)]
    );
    assert_eq!(asm.listing[0].text, "mem[reg0] = 0");
    assert_eq!(asm.image().as_bytes(), &[0b0000_0010, 0b0010_0001]);
}

#[test]
fn assemble_keeps_comment_markers_in_strings() {
    let t = jaw(3, 4);
    let asm = assemble(t, "#store \"//\" // two slashes").unwrap();

    assert_eq!(asm.bits, BitString::from_str("00101111 00101111").unwrap());
}

#[test]
fn assemble_label_errors() {
    let t = jaw(3, 4);

    assert_eq!(
        assemble(t, "@.a\nmem[reg0] = 1\n@.a").unwrap_err(),
        AsmError::Line {
            line: 3,
            source: Box::new(AsmError::DuplicateLabel("a".to_string()))
        }
    );
    assert_eq!(
        assemble(t, "reg0: any = const .nowhere").unwrap_err(),
        AsmError::Line {
            line: 1,
            source: Box::new(AsmError::UndefinedLabel("nowhere".to_string()))
        }
    );

    let err = assemble(t, "mem[reg0] = 1\n\nbogus").unwrap_err();

    assert!(matches!(err, AsmError::Line { line: 3, .. }));
    assert_eq!(err.root(), &AsmError::NoMatchingPattern("bogus".to_string()));
}

#[test]
fn assemble_backward_goto() {
    let t = jaw(3, 4);
    let asm = assemble(t, "@.top\nmem[reg0] = 0\nmem[reg0] ? goto .top via reg1").unwrap();
    let instrs = decode_all(t, &asm.bits);

    assert_eq!(asm.labels.get("top"), Some(&0));
    assert_eq!(asm.bits.len(), 6 + 168);
    assert_eq!(loaded_value(&instrs[1..17]), (0u128).wrapping_sub(174) & 0xFFFF);
}

#[test]
fn assemble_forward_goto() {
    let t = jaw(3, 4);
    let asm = assemble(
        t,
        "reg0[0] ? goto .done via reg7\nmem[reg0] = 0\n@.done\nmem[reg0] = 1",
    )
    .unwrap();
    let instrs = decode_all(t, &asm.bits);

    assert_eq!(asm.labels.get("done"), Some(&178));
    assert_eq!(asm.bits.len(), 184);
    assert_eq!(loaded_value(&instrs[..16]), 6);
}

#[test]
fn assemble_forward_register_load() {
    let t = jaw(3, 4);
    let asm = assemble(t, "reg1: any = const .end\n@.end").unwrap();

    assert_eq!(asm.labels.get("end"), Some(&160));
    assert_eq!(loaded_value(&decode_all(t, &asm.bits)), 160);
}

#[test]
fn assemble_searches_cycling_layout() {
    // Guessing swings between 26 and 36: an end of 26 has three bits set,
    // which puts the end at 36, which has two. An end of 16 needs a single
    // register bit write and is where the end lands.
    let t = jaw(3, 4);
    let asm = assemble(t, "mem[reg0] = 1\nreg1: 0 = const .end\n@.end").unwrap();

    assert_eq!(asm.labels["end"], 16);
    assert_eq!(asm.bits.len(), 16);
}

#[test]
fn assemble_unsettled_layout() {
    // The end is always a multiple of ten, and counting the bits to flip
    // from 1 never gives back that multiple.
    let t = jaw(3, 4);

    assert_eq!(
        assemble(t, "reg1: 1 = const .end\n@.end").unwrap_err(),
        AsmError::UnresolvedLayout(MAX_LAYOUT_PASSES)
    );
}
