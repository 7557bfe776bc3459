//! Crate root: wires together the compilation pipeline.
//!
//! The stages are intentionally small and composable so they can be evolved
//! independently:
//! - `tokenizer` performs lexical analysis and produces a flat token stream.
//! - `parser` owns all syntactic knowledge and returns the expression AST.
//! - `codegen` lowers the AST into x86-64 Intel-syntax assembly.
//! - `config` turns process arguments into a [`Config`].
//! - `error` centralises reporting utilities shared by the other modules.

pub mod codegen;
pub mod config;
pub mod error;
pub mod parser;
pub mod tokenizer;

use std::io::Write;

use snafu::ResultExt;
use tracing::info;

pub use config::Config;
pub use error::{CompileError, CompileResult};
pub use parser::AstNode;

/// Tokenize and parse an expression without generating code.
pub fn parse_expression(expr: &str) -> CompileResult<AstNode> {
  let tokens = tokenizer::tokenize(expr)?;
  parser::parse(&tokens, expr)
}

/// Compile an expression, streaming the assembly into `out`. Nothing is
/// written unless the whole expression parses.
pub fn compile<W: Write>(expr: &str, out: &mut W) -> CompileResult<()> {
  let ast = parse_expression(expr)?;
  codegen::generate(&ast, out).context(error::EmitSnafu)?;
  info!(expr, "compiled expression");
  Ok(())
}

/// Compile a source string into assembly text.
pub fn generate_assembly(expr: &str) -> CompileResult<String> {
  let mut out = Vec::new();
  compile(expr, &mut out)?;
  // The emitter only writes ASCII.
  Ok(String::from_utf8_lossy(&out).into_owned())
}
