//! Code generation: lower the parsed AST into Intel-syntax x86-64 assembly.
//!
//! The emitter uses a simple stack machine: every expression leaves a single
//! value on the stack, binary operators pop their two operands into `rax`
//! and `rdi` and push the result back. Instructions are written to the
//! output as soon as they are produced.

use std::io::{self, Write};

use crate::parser::{AstNode, BinaryOp};

/// Emit a complete program computing `node` and returning it from `main`.
pub fn generate<W: Write>(node: &AstNode, out: &mut W) -> io::Result<()> {
  writeln!(out, ".intel_syntax noprefix")?;
  writeln!(out, ".global main")?;
  writeln!(out, "main:")?;

  emit_expr(node, out)?;

  // The whole expression's value is the only thing left on the stack.
  writeln!(out, "  pop rax")?;
  writeln!(out, "  ret")?;
  out.flush()
}

/// Emit stack-based code for a single expression node.
pub fn emit_expr<W: Write>(node: &AstNode, out: &mut W) -> io::Result<()> {
  match node {
    AstNode::Num { value } => {
      // `push imm` only takes a sign-extended 32-bit immediate.
      if i32::try_from(*value).is_ok() {
        writeln!(out, "  push {value}")
      } else {
        writeln!(out, "  mov rax, {value}")?;
        writeln!(out, "  push rax")
      }
    }
    AstNode::Binary { op, lhs, rhs } => {
      emit_expr(lhs, out)?;
      emit_expr(rhs, out)?;
      writeln!(out, "  pop rdi")?;
      writeln!(out, "  pop rax")?;
      match op {
        BinaryOp::Add => writeln!(out, "  add rax, rdi")?,
        BinaryOp::Sub => writeln!(out, "  sub rax, rdi")?,
        BinaryOp::Mul => writeln!(out, "  imul rax, rdi")?,
        BinaryOp::Div => {
          // Sign-extend rax into rdx before the 128-by-64 bit division.
          writeln!(out, "  cqo")?;
          writeln!(out, "  idiv rdi")?;
        }
      }
      writeln!(out, "  push rax")
    }
  }
}
