//! Parser for EVM assembly tokens → instruction stream.
//!
//! Emission runs in program order and leaves a placeholder wherever a label
//! is referenced; a second pass patches each placeholder with the label's
//! address once every definition has been seen.

use std::collections::HashMap;

use crate::error::AsmError;
use crate::lexer::{Location, Operand, Token, TokenKind};
use evm_common::{Opcode, Program};

/// Word written at an unresolved label reference until it is patched.
pub const PLACEHOLDER: u64 = u64::MAX;

/// A label reference waiting for its address.
struct Unresolved<'a> {
    pos: usize,
    name: &'a str,
    loc: Location<'a>,
}

#[derive(Default)]
struct Emitter<'a> {
    program: Program,
    labels: HashMap<&'a str, (u64, Location<'a>)>,
    unresolved: Vec<Unresolved<'a>>,
}

impl<'a> Emitter<'a> {
    fn here(&self) -> u64 {
        self.program.len() as u64
    }

    fn define(&mut self, name: &'a str, loc: Location<'a>) -> Result<(), AsmError> {
        if let Some((_, first)) = self.labels.get(name) {
            return Err(AsmError::DuplicateLabel {
                pos: loc.to_pos(),
                name: name.to_string(),
                first: first.to_pos(),
            });
        }
        let addr = self.here();
        self.labels.insert(name, (addr, loc));
        Ok(())
    }

    fn push_value(&mut self, value: u64) {
        self.program.push_opcode(Opcode::Push);
        self.program.push_word(value);
    }

    /// `PUSH <placeholder>`, remembering where the address must go.
    fn push_label(&mut self, name: &'a str, loc: Location<'a>) {
        self.program.push_opcode(Opcode::Push);
        self.unresolved.push(Unresolved {
            pos: self.program.len(),
            name,
            loc,
        });
        self.program.push_word(PLACEHOLDER);
    }

    /// `PUSH` a literal or a label's address.
    fn push_operand(&mut self, operand: Operand<'a>, loc: Location<'a>) {
        match operand {
            Operand::Number(value) => self.push_value(value),
            Operand::Label(name) => self.push_label(name, loc),
        }
    }

    fn emit(&mut self, opcode: Opcode, operand: Option<Operand<'a>>, loc: Location<'a>) {
        match (opcode, operand) {
            // Immediate operand
            (Opcode::Dup, Some(Operand::Number(value))) => {
                self.program.push_opcode(opcode);
                self.program.push_word(value);
            }
            (Opcode::Push, Some(operand)) => self.push_operand(operand, loc),

            // Unconditional: target on top of the stack
            (Opcode::Jp | Opcode::Jr | Opcode::Call, Some(operand)) => {
                self.push_operand(operand, loc);
                self.program.push_opcode(opcode);
            }

            // Conditional: target goes beneath the condition
            (Opcode::Jpc | Opcode::Jrc, Some(operand)) => {
                self.push_operand(operand, loc);
                self.program.push_opcode(Opcode::Swap);
                self.program.push_opcode(opcode);
            }

            _ => self.program.push_opcode(opcode),
        }
    }

    fn resolve(mut self) -> Result<Program, AsmError> {
        for entry in &self.unresolved {
            let (addr, _) = self
                .labels
                .get(entry.name)
                .ok_or_else(|| AsmError::UndefinedLabel {
                    pos: entry.loc.to_pos(),
                    name: entry.name.to_string(),
                })?;
            let patched = self.program.patch(entry.pos, *addr);
            debug_assert!(patched, "patch position {} out of range", entry.pos);
        }
        Ok(self.program)
    }
}

/// Lower tokens into a program and resolve every label reference.
///
/// A label's address is the stream length at the point it is defined.
pub fn parse(tokens: &[Token<'_>]) -> Result<Program, AsmError> {
    let mut emitter = Emitter::default();
    for token in tokens {
        match token.kind {
            TokenKind::Label(name) => emitter.define(name, token.loc)?,
            TokenKind::Instruction { opcode, operand } => emitter.emit(opcode, operand, token.loc),
        }
    }
    emitter.resolve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourcePos;
    use crate::lexer::tokenize;

    fn words(text: &str) -> Vec<u64> {
        let tokens = tokenize(text, "t.easm").unwrap();
        parse(&tokens).unwrap().words().to_vec()
    }

    fn err(text: &str) -> AsmError {
        let tokens = tokenize(text, "t.easm").unwrap();
        parse(&tokens).unwrap_err()
    }

    const PUSH: u64 = Opcode::Push as u64;
    const SWAP: u64 = Opcode::Swap as u64;
    const HALT: u64 = Opcode::Halt as u64;

    #[test]
    fn empty_source_is_empty_program() {
        assert!(words("; nothing\n\n").is_empty());
    }

    #[test]
    fn plain_instructions() {
        assert_eq!(
            words("push 3\npush 4\nadd\nhalt\n"),
            vec![PUSH, 3, PUSH, 4, Opcode::Add as u64, HALT]
        );
    }

    #[test]
    fn dup_keeps_immediate() {
        assert_eq!(words("dup 2"), vec![Opcode::Dup as u64, 2]);
    }

    #[test]
    fn jp_is_lowered_to_push_jp() {
        assert_eq!(words("start:\njp start"), vec![PUSH, 0, Opcode::Jp as u64]);
    }

    #[test]
    fn jpc_is_lowered_with_swap() {
        assert_eq!(
            words("push 1\njpc end\nend:\nhalt"),
            vec![PUSH, 1, PUSH, 6, SWAP, Opcode::Jpc as u64, HALT]
        );
    }

    #[test]
    fn jr_and_jrc_push_their_offset() {
        assert_eq!(words("jr 5"), vec![PUSH, 5, Opcode::Jr as u64]);
        assert_eq!(
            words("jrc -1"),
            vec![PUSH, u64::MAX, SWAP, Opcode::Jrc as u64]
        );
    }

    #[test]
    fn call_with_and_without_label() {
        assert_eq!(words("call"), vec![Opcode::Call as u64]);
        assert_eq!(
            words("call sub\nhalt\nsub:\nret"),
            vec![PUSH, 4, Opcode::Call as u64, HALT, Opcode::Ret as u64]
        );
    }

    #[test]
    fn forward_and_backward_references_resolve() {
        let program = words("top:\njp bottom\nbottom:\njp top");
        assert_eq!(
            program,
            vec![PUSH, 3, Opcode::Jp as u64, PUSH, 0, Opcode::Jp as u64]
        );
        assert!(!program.contains(&PLACEHOLDER));
    }

    #[test]
    fn adjacent_labels_share_an_address() {
        assert_eq!(
            words("a:\nb:\njp a\njp b"),
            vec![PUSH, 0, Opcode::Jp as u64, PUSH, 0, Opcode::Jp as u64]
        );
    }

    #[test]
    fn trailing_label_points_past_the_end() {
        assert_eq!(words("jp end\nend:"), vec![PUSH, 3, Opcode::Jp as u64]);
    }

    #[test]
    fn undefined_label_reports_reference_site() {
        assert_eq!(
            err("push 1\n  jpc nowhere\nhalt"),
            AsmError::UndefinedLabel {
                pos: SourcePos::new("t.easm", 2, 3),
                name: "nowhere".to_string()
            }
        );
    }

    #[test]
    fn label_prefix_does_not_match() {
        assert!(matches!(
            err("loop:\njp loo"),
            AsmError::UndefinedLabel { .. }
        ));
        assert!(matches!(
            err("lo:\njp loop"),
            AsmError::UndefinedLabel { .. }
        ));
    }

    #[test]
    fn duplicate_label_reports_both_sites() {
        assert_eq!(
            err("end:\nhalt\nend:\nhalt"),
            AsmError::DuplicateLabel {
                pos: SourcePos::new("t.easm", 3, 1),
                name: "end".to_string(),
                first: SourcePos::new("t.easm", 1, 1),
            }
        );
    }
}
