//! Integration tests for the EVM assembler.
//!
//! Tests cover:
//! - The sample programs under tests/programs (assemble, execute, check output)
//! - Lowering of jumps and calls as observed through the VM
//! - Determinism of assembly (fingerprinted with blake3)
//! - Every diagnostic, with its source position

use evm_assembler::{assemble, disassemble, AsmError, SourcePos, PLACEHOLDER};
use evm_common::{Opcode, Program};
use evm_vm::{RuntimeError, VmConfig, VM};

// ---- Test helpers ----

const HELLO: &str = include_str!("../../../tests/programs/hello.easm");
const FIB: &str = include_str!("../../../tests/programs/fib.easm");
const SUBROUTINE: &str = include_str!("../../../tests/programs/subroutine.easm");
const COUNTDOWN: &str = include_str!("../../../tests/programs/countdown.easm");

fn asm(text: &str) -> Program {
    assemble(text, "test.easm").unwrap()
}

fn asm_err(text: &str) -> AsmError {
    assemble(text, "test.easm").unwrap_err()
}

fn pos(row: usize, col: usize) -> SourcePos {
    SourcePos::new("test.easm", row, col)
}

/// Assemble and run, returning the machine for inspection.
fn execute(text: &str) -> (VM<Vec<u8>>, Result<(), RuntimeError>) {
    let mut vm = VM::with_config(asm(text), VmConfig::default(), Vec::new());
    let result = vm.run();
    (vm, result)
}

/// Assemble, run to `halt` and return everything printed.
fn output(text: &str) -> String {
    let (vm, result) = execute(text);
    result.unwrap();
    String::from_utf8(vm.into_output()).unwrap()
}

fn fingerprint(program: &Program) -> blake3::Hash {
    blake3::hash(&program.to_le_bytes())
}

// ---- Sample programs ----

#[test]
fn hello_world() {
    assert_eq!(output(HELLO), "Hello, World!\n");
}

#[test]
fn fibonacci() {
    assert_eq!(
        output(FIB),
        "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n55\n89\n144\n233\n377\n610\n"
    );
}

#[test]
fn subroutine_calls_return() {
    let (vm, result) = execute(SUBROUTINE);
    result.unwrap();
    assert!(vm.call_stack().is_empty());
    assert_eq!(vm.into_output(), b"49\n144\n");
}

#[test]
fn countdown_with_backwards_relative_jump() {
    let (vm, result) = execute(COUNTDOWN);
    result.unwrap();
    assert_eq!(vm.stack(), &[0]);
    assert_eq!(vm.into_output(), b"5\n4\n3\n2\n1\n");
}

#[test]
fn sample_programs_contain_no_placeholders() {
    for text in [HELLO, FIB, SUBROUTINE, COUNTDOWN] {
        let program = asm(text);
        for (addr, decoded) in program.instructions() {
            let instr = decoded.unwrap();
            if instr.opcode == Opcode::Push {
                assert_ne!(instr.operand, Some(PLACEHOLDER), "placeholder at {addr}");
            }
        }
    }
}

// ---- Behaviour through the VM ----

#[test]
fn add_and_print() {
    assert_eq!(output("push 3\npush 4\nadd\nprintu\nhalt\n"), "7");
}

#[test]
fn subtraction_wraps() {
    assert_eq!(
        output("push 0\npush 1\nsub\nprintu\nhalt\n"),
        "18446744073709551615"
    );
}

#[test]
fn dup_copies_from_depth() {
    let (vm, result) = execute("push 5\npush 7\ndup 0\nhalt\n");
    result.unwrap();
    assert_eq!(vm.stack(), &[5, 7, 7]);
}

#[test]
fn balanced_program_leaves_empty_stack() {
    let (vm, result) = execute("push 2\npush 3\nmultu\nprintu\nhalt\n");
    result.unwrap();
    assert!(vm.stack().is_empty());
}

#[test]
fn jpc_taken_skips_forward() {
    let text = "\
push 1
jpc target
halt
target:
push 2
printu
halt
";
    assert_eq!(output(text), "2");
}

#[test]
fn jpc_not_taken_falls_through() {
    let text = "\
push 0
jpc target
push 1
printu
halt
target:
push 2
printu
halt
";
    assert_eq!(output(text), "1");
}

#[test]
fn jpc_leaves_values_below_condition_alone() {
    let text = "\
push 42
push 1
jpc done
halt
done:
halt
";
    let (vm, result) = execute(text);
    result.unwrap();
    assert_eq!(vm.stack(), &[42]);
}

#[test]
fn jp_skips_unconditionally() {
    assert_eq!(
        output("jp over\npush 9\nprintu\nover:\npush 1\nprintu\nhalt\n"),
        "1"
    );
}

#[test]
fn jr_zero_is_next_instruction() {
    assert_eq!(output("jr 0\npush 1\nprintu\nhalt\n"), "1");
}

#[test]
fn jr_skips_words() {
    // `push 9` occupies two words and `printu` one.
    assert_eq!(output("jr 3\npush 9\nprintu\npush 1\nprintu\nhalt\n"), "1");
}

#[test]
fn jrc_only_jumps_on_nonzero() {
    assert_eq!(output("push 0\njrc 3\npush 9\nprintu\nhalt\n"), "9");
    assert_eq!(output("push 1\njrc 3\npush 9\nprintu\nhalt\n"), "");
}

#[test]
fn bare_call_uses_address_on_stack() {
    // sub starts at word 4: push(0-1) call(2) halt(3)
    let text = "\
push 4
call
halt
sub:
push 8
printu
ret
";
    assert_eq!(output(text), "8");
}

#[test]
fn nested_calls_unwind() {
    let text = "\
call outer
halt
outer:
call inner
push 2
printu
ret
inner:
push 1
printu
ret
";
    assert_eq!(output(text), "12");
}

// ---- Faults surface from assembled code ----

#[test]
fn lone_add_underflows_before_output() {
    let (vm, result) = execute("add\nprintu\nhalt\n");
    assert_eq!(result, Err(RuntimeError::StackUnderflow { at: 0 }));
    assert!(vm.into_output().is_empty());
}

#[test]
fn write64_past_capacity_faults() {
    let (_, result) = execute("push 1\npush 0x10000\nwrite64\nhalt\n");
    assert_eq!(
        result,
        Err(RuntimeError::MemoryOutOfBounds {
            at: 4,
            addr: 0x10000,
            width: 8,
            capacity: 0x10000,
        })
    );
}

#[test]
fn falling_off_the_end_faults() {
    let (_, result) = execute("push 1\n");
    assert_eq!(result, Err(RuntimeError::UnexpectedEndOfProgram { at: 2 }));
}

// ---- Determinism ----

#[test]
fn assembling_twice_is_identical() {
    for text in [HELLO, FIB, SUBROUTINE, COUNTDOWN] {
        assert_eq!(fingerprint(&asm(text)), fingerprint(&asm(text)));
    }
}

#[test]
fn comments_and_layout_do_not_change_output() {
    let plain = asm("push 3\npush 4\nadd\nprintu\nhalt\n");
    let decorated = "; header\n\n   push 3 ; three\n\tpush 0x4\nadd\n printu;x\nhalt\n";
    assert_eq!(fingerprint(&plain), fingerprint(&asm(decorated)));
}

#[test]
fn listing_shows_lowered_conditional_jump() {
    let program = asm("push 1\njpc end\nend:\nhalt\n");
    assert_eq!(
        disassemble(&program),
        "0000  push 1\n0002  push 6\n0004  swap\n0005  jpc\n0006  halt\n"
    );
}

// ---- Diagnostics ----

#[test]
fn unknown_opcode() {
    assert_eq!(
        asm_err("push 1\n  bogus\n"),
        AsmError::UnknownOpcode {
            pos: pos(2, 3),
            token: "bogus".to_string()
        }
    );
}

#[test]
fn missing_operand() {
    let err = asm_err("jr\n");
    assert_eq!(
        err.to_string(),
        "test.easm:1:3 jr expects a numeric operand"
    );
}

#[test]
fn missing_label_operand() {
    let err = asm_err("halt\njp ; where?\n");
    assert_eq!(err.to_string(), "test.easm:2:4 jp expects a label operand");
}

#[test]
fn invalid_number() {
    assert_eq!(
        asm_err("push 12ab\n"),
        AsmError::InvalidNumber {
            pos: pos(1, 6),
            token: "12ab".to_string()
        }
    );
}

#[test]
fn invalid_label() {
    assert_eq!(
        asm_err("my-label:\n"),
        AsmError::InvalidLabel {
            pos: pos(1, 1),
            token: "my-label".to_string()
        }
    );
}

#[test]
fn empty_label() {
    assert_eq!(asm_err("\n:\n"), AsmError::EmptyLabel { pos: pos(2, 1) });
}

#[test]
fn unexpected_symbol() {
    assert_eq!(
        asm_err("swap now\n"),
        AsmError::UnexpectedSymbol {
            pos: pos(1, 6),
            token: "now".to_string()
        }
    );
}

#[test]
fn undefined_label() {
    let err = asm_err("push 1\njpc L\nhalt\n");
    assert_eq!(err.to_string(), "test.easm:2:1 undefined label 'L'");
}

#[test]
fn duplicate_label() {
    let err = asm_err("again:\npush 1\n again:\nhalt\n");
    assert_eq!(
        err.to_string(),
        "test.easm:3:2 label 'again' already defined at test.easm:1:1"
    );
}

#[test]
fn first_error_wins() {
    let err = asm_err("push 1\npush x\nfrob\n");
    assert_eq!(err.pos(), &pos(2, 6));
}

// ---- Property tests ----

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any literal pushed and printed comes back as its decimal text.
        #[test]
        fn pushed_literal_prints_back(value in any::<u64>()) {
            let text = format!("push {value:#x}\nprintu\nhalt\n");
            prop_assert_eq!(output(&text), value.to_string());
        }

        /// Negative literals wrap to two's complement.
        #[test]
        fn negative_literal_wraps(value in 1u64..=i64::MAX as u64) {
            let program = asm(&format!("push -{value}\n"));
            prop_assert_eq!(program.words(), &[Opcode::Push as u64, value.wrapping_neg()][..]);
        }

        /// A label is resolved to the stream length at its definition.
        #[test]
        fn label_resolves_to_its_address(pad in 0usize..32) {
            let mut text = String::from("jp target\n");
            for _ in 0..pad {
                text.push_str("swap\n");
            }
            text.push_str("target:\nhalt\n");
            let program = asm(&text);
            prop_assert_eq!(program.words()[1], 3 + pad as u64);
        }
    }
}
