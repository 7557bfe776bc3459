//! Shared error utilities used across the compilation pipeline.
//!
//! Every failure the compiler can report lives in [`CompileError`]. Variants
//! that stem from the expression itself carry a [`SourceLocation`], which
//! renders the input with a caret under the offending byte, chibicc style.

use std::fmt;
use std::io;

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
  #[snafu(display("usage: {program} <expr>"))]
  Usage { program: String },

  #[snafu(display("{at} invalid token: '{invalid}' (remaining input: \"{rest}\")"))]
  Lex {
    at: SourceLocation,
    invalid: char,
    rest: String,
  },

  #[snafu(display("{at} invalid number \"{text}\": {source}"))]
  InvalidNumber {
    at: SourceLocation,
    text: String,
    source: std::num::ParseIntError,
  },

  #[snafu(display("{at} {message}"))]
  UnexpectedToken { at: SourceLocation, message: String },

  #[snafu(display(
    "{at} expected \")\" to close \"(\" at offset {open}, but got \"{got}\""
  ))]
  UnmatchedParen {
    at: SourceLocation,
    open: usize,
    got: String,
  },

  #[snafu(display("{at} parentheses nested deeper than {limit} levels"))]
  NestingTooDeep { at: SourceLocation, limit: usize },

  #[snafu(display("{at} expression is more than {limit} operators deep"))]
  ExpressionTooDeep { at: SourceLocation, limit: usize },

  #[snafu(display("failed to write assembly: {source}"))]
  Emit { source: io::Error },
}

/// The quoted source line plus a caret marker under one byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
  expr_line: String,
  marker: String,
  offset: usize,
}

impl SourceLocation {
  /// Anchor a location at a byte offset in the source. Offsets past the end
  /// are clamped so the caret lands just after the last character.
  pub fn new(expr: &str, loc: usize) -> Self {
    let expr_line = format!("'{expr}'");
    let safe_loc = loc.min(expr.len());
    let char_offset = expr[..safe_loc].chars().count() + 1; // account for opening quote
    let marker = format!("{}^", " ".repeat(char_offset));
    Self {
      expr_line,
      marker,
      offset: safe_loc,
    }
  }

  pub fn offset(&self) -> usize {
    self.offset
  }
}

impl fmt::Display for SourceLocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}\n{}", self.expr_line, self.marker)
  }
}

impl CompileError {
  /// Byte offset of the offending input, for the variants that have one.
  pub fn offset(&self) -> Option<usize> {
    match self {
      Self::Lex { at, .. }
      | Self::InvalidNumber { at, .. }
      | Self::UnexpectedToken { at, .. }
      | Self::UnmatchedParen { at, .. }
      | Self::NestingTooDeep { at, .. }
      | Self::ExpressionTooDeep { at, .. } => Some(at.offset()),
      Self::Usage { .. } | Self::Emit { .. } => None,
    }
  }
}
