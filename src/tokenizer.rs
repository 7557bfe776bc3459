//! Lexical analysis: turns the raw input string into a vector of tokens.
//!
//! The tokenizer is intentionally tiny – it knows nothing about semantics
//! beyond recognising the four arithmetic operators, parentheses and decimal
//! integer literals.

use snafu::ResultExt;
use tracing::debug;

use crate::error::{CompileResult, InvalidNumberSnafu, LexSnafu, SourceLocation};

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Num,
  Plus,
  Minus,
  Star,
  Slash,
  LParen,
  RParen,
  Eof,
}

impl TokenKind {
  fn punctuator(c: u8) -> Option<Self> {
    match c {
      b'+' => Some(Self::Plus),
      b'-' => Some(Self::Minus),
      b'*' => Some(Self::Star),
      b'/' => Some(Self::Slash),
      b'(' => Some(Self::LParen),
      b')' => Some(Self::RParen),
      _ => None,
    }
  }
}

/// One lexeme: its kind, the literal value for `Num`, and its byte span in
/// the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub value: Option<i64>,
  pub loc: usize,
  pub len: usize,
}

impl Token {
  pub fn new(kind: TokenKind, loc: usize, len: usize, value: Option<i64>) -> Self {
    Self {
      kind,
      value,
      loc,
      len,
    }
  }
}

/// C `isspace`: ASCII whitespace plus vertical tab, which
/// `u8::is_ascii_whitespace` leaves out.
fn is_space(c: u8) -> bool {
  c.is_ascii_whitespace() || c == b'\x0b'
}

/// Lex the input into a flat vector of tokens terminated by an `Eof` marker.
pub fn tokenize(input: &str) -> CompileResult<Vec<Token>> {
  let mut tokens = Vec::new();
  let bytes = input.as_bytes();
  let mut i = 0;

  while i < bytes.len() {
    let c = bytes[i];
    if is_space(c) {
      i += 1;
      continue;
    }

    if c.is_ascii_digit() {
      let start = i;
      i += 1;
      while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
      }
      let text = &input[start..i];
      let value = text.parse::<i64>().context(InvalidNumberSnafu {
        at: SourceLocation::new(input, start),
        text,
      })?;
      tokens.push(Token::new(TokenKind::Num, start, i - start, Some(value)));
      continue;
    }

    if let Some(kind) = TokenKind::punctuator(c) {
      tokens.push(Token::new(kind, i, 1, None));
      i += 1;
      continue;
    }

    // `i` always sits on a char boundary: every byte consumed so far is ASCII.
    let rest = &input[i..];
    let invalid = rest.chars().next().unwrap_or('\0');
    return LexSnafu {
      at: SourceLocation::new(input, i),
      invalid,
      rest,
    }
    .fail();
  }

  tokens.push(Token::new(TokenKind::Eof, input.len(), 0, None));
  debug!(count = tokens.len(), "tokenized input");
  Ok(tokens)
}

/// The lexeme behind `token`; empty for `Eof`.
pub fn token_text<'a>(token: &Token, source: &'a str) -> &'a str {
  let end = token.loc + token.len;
  &source[token.loc..end]
}

/// Render a token for an error message, `EOF` for the end marker or a
/// missing token.
pub fn describe_token(token: Option<&Token>, source: &str) -> String {
  match token {
    Some(t) if t.kind != TokenKind::Eof => token_text(t, source).to_string(),
    _ => "EOF".to_string(),
  }
}
