//! EVM assembler: translates assembly text into an instruction stream.
//!
//! Assembly runs in two stages: [`tokenize`] turns each source line into
//! at most one token, and [`parse`] lowers the tokens to words and patches
//! every label reference with its address.
//!
//! # Usage
//!
//! ```
//! use evm_assembler::assemble;
//!
//! let text = "push 1\njpc done\nhalt\ndone:\npush 2\nprintu\nhalt\n";
//! let program = assemble(text, "example.easm").unwrap();
//!
//! let mut out = Vec::new();
//! evm_vm::run_with_output(program, &mut out).unwrap();
//! assert_eq!(out, b"2");
//! ```
//!
//! # Diagnostics
//!
//! Every [`AsmError`] displays as `source:row:col message`. Assembly stops
//! at the first error.

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use disassembler::disassemble;
pub use error::{AsmError, SourcePos};
pub use lexer::{tokenize, Location, Operand, Token, TokenKind};
pub use parser::{parse, PLACEHOLDER};

use evm_common::Program;

/// Assemble source text into a program.
///
/// `source` names the text in diagnostics, usually its file path.
/// Assembling the same text always produces the same words.
pub fn assemble(text: &str, source: &str) -> Result<Program, AsmError> {
    let tokens = tokenize(text, source)?;
    parse(&tokens)
}
