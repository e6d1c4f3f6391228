//! Tokenizer for EVM assembly text.
//!
//! Each non-blank, non-comment line yields exactly one token: a label
//! definition (`name:`) or an instruction with its operand, if any.
//! Comments start with `;` and extend to end of line.

use crate::error::{AsmError, SourcePos};
use evm_common::Opcode;

/// Comment marker.
const COMMENT: char = ';';

/// Where a token starts in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'a> {
    /// Display name of the source, e.g. its file path.
    pub source: &'a str,
    /// 1-based line number.
    pub row: usize,
    /// 1-based column (byte offset within the line, plus one).
    pub col: usize,
}

impl Location<'_> {
    /// Owned copy for error reporting.
    pub fn to_pos(self) -> SourcePos {
        SourcePos::new(self.source, self.row, self.col)
    }
}

/// An instruction operand as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand<'a> {
    /// A numeric literal.
    Number(u64),
    /// A reference to a label, resolved after emission.
    Label(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Instruction {
        opcode: Opcode,
        operand: Option<Operand<'a>>,
    },
    Label(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub loc: Location<'a>,
}

/// What, if anything, follows a mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperandKind {
    None,
    Number,
    Label,
    OptionalLabel,
}

fn operand_kind(opcode: Opcode) -> OperandKind {
    match opcode {
        Opcode::Push | Opcode::Dup | Opcode::Jr | Opcode::Jrc => OperandKind::Number,
        Opcode::Jp | Opcode::Jpc => OperandKind::Label,
        Opcode::Call => OperandKind::OptionalLabel,
        Opcode::Swap
        | Opcode::Add
        | Opcode::Sub
        | Opcode::Multu
        | Opcode::Gt
        | Opcode::Lt
        | Opcode::Eq
        | Opcode::Ge
        | Opcode::Le
        | Opcode::Read8
        | Opcode::Read64
        | Opcode::Write8
        | Opcode::Write64
        | Opcode::Printu
        | Opcode::Puts
        | Opcode::Ret
        | Opcode::Halt => OperandKind::None,
    }
}

/// Tokenize a whole source text.
///
/// `source` is the display name used in token locations and diagnostics.
/// Returns the first error encountered.
pub fn tokenize<'a>(text: &'a str, source: &'a str) -> Result<Vec<Token<'a>>, AsmError> {
    let mut tokens = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if let Some(token) = tokenize_line(line, idx + 1, source)? {
            tokens.push(token);
        }
    }
    Ok(tokens)
}

/// Tokenize a single line. Returns `None` for blank and comment-only lines.
pub(crate) fn tokenize_line<'a>(
    line: &'a str,
    row: usize,
    source: &'a str,
) -> Result<Option<Token<'a>>, AsmError> {
    let mut cursor = Cursor::new(line, row, source);
    let Some((col, word)) = cursor.next_word() else {
        return Ok(None);
    };
    let loc = Location { source, row, col };

    let kind = if let Some(name) = word.strip_suffix(':') {
        if name.is_empty() {
            return Err(AsmError::EmptyLabel { pos: loc.to_pos() });
        }
        if !is_label_name(name) {
            return Err(AsmError::InvalidLabel {
                pos: loc.to_pos(),
                token: name.to_string(),
            });
        }
        TokenKind::Label(name)
    } else if let Some(opcode) = Opcode::from_mnemonic(word) {
        let operand = match operand_kind(opcode) {
            OperandKind::None => None,
            OperandKind::Number => Some(Operand::Number(cursor.expect_number(opcode)?)),
            OperandKind::Label => Some(Operand::Label(cursor.expect_label(opcode)?)),
            OperandKind::OptionalLabel if cursor.at_end() => None,
            OperandKind::OptionalLabel => Some(Operand::Label(cursor.expect_label(opcode)?)),
        };
        TokenKind::Instruction { opcode, operand }
    } else {
        return Err(AsmError::UnknownOpcode {
            pos: loc.to_pos(),
            token: word.to_string(),
        });
    };

    cursor.expect_end()?;
    Ok(Some(Token { kind, loc }))
}

fn is_label_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '.'
}

/// Label names: a letter, `_` or `.`, then letters, digits, `_` or `.`.
fn is_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_label_start)
        && chars.all(|c| is_label_start(c) || c.is_ascii_digit())
}

/// Parse a numeric literal: optional `-`, then `0x` hex, `0` octal or decimal.
///
/// A leading `-` negates in two's complement.
pub(crate) fn parse_number(word: &str) -> Option<u64> {
    let (negative, digits) = match word.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, word),
    };
    let hex = digits.strip_prefix("0x").or(digits.strip_prefix("0X"));
    let (radix, body) = if let Some(hex) = hex {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let mut value = u64::from_str_radix(body, radix).ok()?;
    if negative {
        value = value.wrapping_neg();
    }
    Some(value)
}

/// Walks one line word by word, tracking the byte offset for columns.
struct Cursor<'a> {
    line: &'a str,
    offset: usize,
    row: usize,
    source: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str, row: usize, source: &'a str) -> Self {
        Self {
            line,
            offset: 0,
            row,
            source,
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.line[self.offset..];
        self.offset += rest.len() - rest.trim_start().len();
    }

    /// True if only whitespace or a comment remains.
    fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        let rest = &self.line[self.offset..];
        rest.is_empty() || rest.starts_with(COMMENT)
    }

    /// Next word and its column, ended by whitespace or a comment marker.
    fn next_word(&mut self) -> Option<(usize, &'a str)> {
        if self.at_end() {
            return None;
        }
        let rest = &self.line[self.offset..];
        let len = rest
            .find(|c: char| c.is_whitespace() || c == COMMENT)
            .unwrap_or(rest.len());
        let col = self.offset + 1;
        self.offset += len;
        Some((col, &rest[..len]))
    }

    fn pos(&self, col: usize) -> SourcePos {
        SourcePos::new(self.source, self.row, col)
    }

    /// Error for an operand missing at the current position.
    fn missing(&self, opcode: Opcode, expected: &'static str) -> AsmError {
        AsmError::MissingOperand {
            pos: self.pos(self.offset + 1),
            opcode: opcode.mnemonic(),
            expected,
        }
    }

    fn expect_number(&mut self, opcode: Opcode) -> Result<u64, AsmError> {
        let Some((col, word)) = self.next_word() else {
            return Err(self.missing(opcode, "a numeric"));
        };
        match parse_number(word) {
            Some(value) => Ok(value),
            None => Err(AsmError::InvalidNumber {
                pos: self.pos(col),
                token: word.to_string(),
            }),
        }
    }

    fn expect_label(&mut self, opcode: Opcode) -> Result<&'a str, AsmError> {
        let Some((col, word)) = self.next_word() else {
            return Err(self.missing(opcode, "a label"));
        };
        if !is_label_name(word) {
            return Err(AsmError::InvalidLabel {
                pos: self.pos(col),
                token: word.to_string(),
            });
        }
        Ok(word)
    }

    /// Anything left on the line must be a comment.
    fn expect_end(&mut self) -> Result<(), AsmError> {
        match self.next_word() {
            None => Ok(()),
            Some((col, word)) => Err(AsmError::UnexpectedSymbol {
                pos: self.pos(col),
                token: word.to_string(),
            }),
        }
    }
}
