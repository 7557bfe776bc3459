//! Recursive-descent parser producing the expression AST.
//!
//! The parser mirrors the classic chibicc structure: one helper per grammar
//! rule, with precedence encoded by call nesting.
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := INTEGER | '(' expr ')'
//! ```

use std::fmt;

use tracing::debug;

use crate::error::{
  CompileResult, ExpressionTooDeepSnafu, NestingTooDeepSnafu, SourceLocation,
  UnexpectedTokenSnafu, UnmatchedParenSnafu,
};
use crate::tokenizer::{Token, TokenKind, describe_token};

/// Deepest parenthesis nesting accepted before parsing gives up. Each level
/// costs three stack frames, so this keeps recursion well inside the stack.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Deepest AST accepted, counted in binary operators from root to leaf.
/// Code generation, evaluation and drop all recurse once per level.
pub const MAX_TREE_DEPTH: usize = 1024;

/// Binary operators recognised by the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
}

impl BinaryOp {
  fn from_token(kind: TokenKind) -> Option<Self> {
    match kind {
      TokenKind::Plus => Some(Self::Add),
      TokenKind::Minus => Some(Self::Sub),
      TokenKind::Star => Some(Self::Mul),
      TokenKind::Slash => Some(Self::Div),
      _ => None,
    }
  }

  pub fn symbol(self) -> char {
    match self {
      Self::Add => '+',
      Self::Sub => '-',
      Self::Mul => '*',
      Self::Div => '/',
    }
  }

  /// Apply the operator with 64-bit wrapping semantics. Division truncates
  /// toward zero; `None` means division by zero.
  pub fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
    match self {
      Self::Add => Some(lhs.wrapping_add(rhs)),
      Self::Sub => Some(lhs.wrapping_sub(rhs)),
      Self::Mul => Some(lhs.wrapping_mul(rhs)),
      Self::Div if rhs == 0 => None,
      Self::Div => Some(lhs.wrapping_div(rhs)),
    }
  }
}

/// Expression tree produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
  Num {
    value: i64,
  },
  Binary {
    op: BinaryOp,
    lhs: Box<AstNode>,
    rhs: Box<AstNode>,
  },
}

impl AstNode {
  pub fn number(value: i64) -> Self {
    Self::Num { value }
  }

  pub fn binary(op: BinaryOp, lhs: AstNode, rhs: AstNode) -> Self {
    Self::Binary {
      op,
      lhs: Box::new(lhs),
      rhs: Box::new(rhs),
    }
  }

  /// Evaluate the tree directly. Returns `None` if any division by zero is
  /// reached.
  pub fn eval(&self) -> Option<i64> {
    match self {
      Self::Num { value } => Some(*value),
      Self::Binary { op, lhs, rhs } => op.apply(lhs.eval()?, rhs.eval()?),
    }
  }
}

/// Renders the tree as a prefix s-expression, e.g. `(+ 1 (* 2 3))`.
impl fmt::Display for AstNode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Num { value } => write!(f, "{value}"),
      Self::Binary { op, lhs, rhs } => write!(f, "({} {lhs} {rhs})", op.symbol()),
    }
  }
}

/// Parse a complete expression from the token stream.
pub fn parse(tokens: &[Token], source: &str) -> CompileResult<AstNode> {
  let mut stream = TokenStream::new(tokens, source);
  let (node, depth) = parse_expr(&mut stream)?;

  if !stream.is_eof() {
    let (loc, got) = stream.describe_current();
    return UnexpectedTokenSnafu {
      at: SourceLocation::new(source, loc),
      message: format!("unexpected token \"{got}\" after expression"),
    }
    .fail();
  }

  debug!(ast = %node, depth, "parsed expression");
  Ok(node)
}

// Each helper returns the subtree together with its depth (a leaf is 0).

fn parse_expr(stream: &mut TokenStream) -> CompileResult<(AstNode, usize)> {
  let (mut node, mut depth) = parse_term(stream)?;

  while let Some((op, op_token)) = stream.consume_op(&[TokenKind::Plus, TokenKind::Minus]) {
    let (rhs, rhs_depth) = parse_term(stream)?;
    depth = stream.fold_depth(depth.max(rhs_depth), op_token)?;
    node = AstNode::binary(op, node, rhs);
  }

  Ok((node, depth))
}

fn parse_term(stream: &mut TokenStream) -> CompileResult<(AstNode, usize)> {
  let (mut node, mut depth) = parse_factor(stream)?;

  while let Some((op, op_token)) = stream.consume_op(&[TokenKind::Star, TokenKind::Slash]) {
    let (rhs, rhs_depth) = parse_factor(stream)?;
    depth = stream.fold_depth(depth.max(rhs_depth), op_token)?;
    node = AstNode::binary(op, node, rhs);
  }

  Ok((node, depth))
}

fn parse_factor(stream: &mut TokenStream) -> CompileResult<(AstNode, usize)> {
  if let Some(open) = stream.consume(TokenKind::LParen) {
    stream.enter(open)?;
    let inner = parse_expr(stream)?;
    stream.leave();
    stream.close_paren(open)?;
    return Ok(inner);
  }

  let value = stream.get_number()?;
  Ok((AstNode::number(value), 0))
}

/// Lightweight cursor over the token slice.
struct TokenStream<'a> {
  tokens: &'a [Token],
  source: &'a str,
  pos: usize,
  nesting: usize,
}

impl<'a> TokenStream<'a> {
  fn new(tokens: &'a [Token], source: &'a str) -> Self {
    Self {
      tokens,
      source,
      pos: 0,
      nesting: 0,
    }
  }

  fn peek(&self) -> Option<&'a Token> {
    self.tokens.get(self.pos)
  }

  /// Location and rendering of the current token, falling back to the end of
  /// the source when the slice ran out without an `Eof` marker.
  fn describe_current(&self) -> (usize, String) {
    let token = self.peek();
    let loc = token.map_or(self.source.len(), |t| t.loc);
    (loc, describe_token(token, self.source))
  }

  /// Consume the current token if it has the given kind.
  fn consume(&mut self, kind: TokenKind) -> Option<&'a Token> {
    let token = self.peek().filter(|token| token.kind == kind)?;
    self.pos += 1;
    Some(token)
  }

  /// Consume the current token if it is one of `kinds`, yielding its operator.
  fn consume_op(&mut self, kinds: &[TokenKind]) -> Option<(BinaryOp, &'a Token)> {
    let token = self.peek().filter(|token| kinds.contains(&token.kind))?;
    let op = BinaryOp::from_token(token.kind)?;
    self.pos += 1;
    Some((op, token))
  }

  /// Depth of a new binary node whose deeper child has `child_depth`.
  fn fold_depth(&self, child_depth: usize, op: &Token) -> CompileResult<usize> {
    let depth = child_depth + 1;
    if depth > MAX_TREE_DEPTH {
      return ExpressionTooDeepSnafu {
        at: SourceLocation::new(self.source, op.loc),
        limit: MAX_TREE_DEPTH,
      }
      .fail();
    }
    Ok(depth)
  }

  fn close_paren(&mut self, open: &Token) -> CompileResult<()> {
    if self.consume(TokenKind::RParen).is_some() {
      return Ok(());
    }
    let (loc, got) = self.describe_current();
    UnmatchedParenSnafu {
      at: SourceLocation::new(self.source, loc),
      open: open.loc,
      got,
    }
    .fail()
  }

  fn enter(&mut self, open: &Token) -> CompileResult<()> {
    if self.nesting >= MAX_NESTING_DEPTH {
      return NestingTooDeepSnafu {
        at: SourceLocation::new(self.source, open.loc),
        limit: MAX_NESTING_DEPTH,
      }
      .fail();
    }
    self.nesting += 1;
    Ok(())
  }

  fn leave(&mut self) {
    self.nesting -= 1;
  }

  /// Parse the current token as an integer literal.
  fn get_number(&mut self) -> CompileResult<i64> {
    if let Some(token) = self.peek()
      && token.kind == TokenKind::Num
      && let Some(value) = token.value
    {
      self.pos += 1;
      return Ok(value);
    }

    let (loc, got) = self.describe_current();
    UnexpectedTokenSnafu {
      at: SourceLocation::new(self.source, loc),
      message: format!("expected a number or \"(\", but got \"{got}\""),
    }
    .fail()
  }

  fn is_eof(&self) -> bool {
    matches!(self.peek().map(|token| token.kind), Some(TokenKind::Eof) | None)
  }
}
