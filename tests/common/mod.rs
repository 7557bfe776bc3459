//! A tiny interpreter for the subset of Intel-syntax x86-64 the compiler
//! emits, so generated programs can be checked without an assembler.

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail, ensure};

#[derive(Debug, Default)]
pub struct Machine {
  stack: Vec<i64>,
  regs: HashMap<String, i64>,
}

impl Machine {
  fn reg(&self, name: &str) -> Result<i64> {
    self
      .regs
      .get(name)
      .copied()
      .ok_or_else(|| anyhow!("read of unset register {name}"))
  }

  fn operand(&self, text: &str) -> Result<i64> {
    match text.parse::<i64>() {
      Ok(value) => Ok(value),
      Err(_) => self.reg(text),
    }
  }

  fn binary(&mut self, args: &str, f: impl Fn(i64, i64) -> i64) -> Result<()> {
    let (dst, src) = args
      .split_once(',')
      .with_context(|| format!("expected two operands in {args:?}"))?;
    let (dst, src) = (dst.trim(), src.trim());
    let value = f(self.reg(dst)?, self.operand(src)?);
    self.regs.insert(dst.to_string(), value);
    Ok(())
  }

  /// Execute one instruction. Returns `Some(rax)` on `ret`.
  fn step(&mut self, line: &str) -> Result<Option<i64>> {
    let (mnemonic, args) = line.split_once(' ').unwrap_or((line, ""));
    let args = args.trim();
    match mnemonic {
      "push" => {
        let value = self.operand(args)?;
        self.stack.push(value);
      }
      "pop" => {
        let value = self.stack.pop().context("pop from empty stack")?;
        self.regs.insert(args.to_string(), value);
      }
      "mov" => {
        // The destination may not have been written yet.
        let (dst, src) = args.split_once(',').context("malformed mov")?;
        let value = self.operand(src.trim())?;
        self.regs.insert(dst.trim().to_string(), value);
      }
      "add" => self.binary(args, i64::wrapping_add)?,
      "sub" => self.binary(args, i64::wrapping_sub)?,
      "imul" => self.binary(args, i64::wrapping_mul)?,
      "cqo" => {
        let rax = self.reg("rax")?;
        self.regs.insert("rdx".to_string(), if rax < 0 { -1 } else { 0 });
      }
      "idiv" => {
        let divisor = self.reg(args)?;
        ensure!(divisor != 0, "division by zero");
        let rdx = self.reg("rdx")?;
        let rax = self.reg("rax")?;
        ensure!(rdx == if rax < 0 { -1 } else { 0 }, "rdx not sign-extended");
        self.regs.insert("rax".to_string(), rax.wrapping_div(divisor));
        self.regs.insert("rdx".to_string(), rax.wrapping_rem(divisor));
      }
      "ret" => {
        ensure!(self.stack.is_empty(), "stack not balanced at ret: {:?}", self.stack);
        return self.reg("rax").map(Some);
      }
      other => bail!("unsupported instruction {other:?}"),
    }
    Ok(None)
  }
}

/// Run an assembly listing starting at `main:` and return the value of `rax`
/// at `ret`.
pub fn run(asm: &str) -> Result<i64> {
  let mut lines = asm.lines().map(str::trim).filter(|line| !line.is_empty());
  lines
    .by_ref()
    .find(|line| *line == "main:")
    .context("no main label")?;

  let mut machine = Machine::default();
  for line in lines {
    if let Some(result) = machine.step(line)? {
      return Ok(result);
    }
  }
  bail!("program fell off the end without ret")
}
