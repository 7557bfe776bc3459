use std::process::{Command, Output};

fn exprcc(args: &[&str]) -> Output {
  Command::new(env!("CARGO_BIN_EXE_exprcc"))
    .args(args)
    .env_remove("RUST_LOG")
    .output()
    .expect("failed to spawn exprcc")
}

#[test]
fn prints_assembly_and_exits_zero() {
  let output = exprcc(&["1 + 2"]);
  assert!(output.status.success());
  assert!(output.stderr.is_empty());

  let stdout = String::from_utf8(output.stdout).unwrap();
  let lines: Vec<&str> = stdout.lines().collect();
  assert_eq!(&lines[..3], [".intel_syntax noprefix", ".global main", "main:"]);
  assert_eq!(&lines[lines.len() - 2..], ["  pop rax", "  ret"]);
}

#[test]
fn compile_errors_exit_one_with_empty_stdout() {
  for expr in ["1+(2", "1+@", "+1", ""] {
    let output = exprcc(&[expr]);
    assert_eq!(output.status.code(), Some(1), "expression {expr:?}");
    assert!(output.stdout.is_empty(), "expression {expr:?}");
    assert!(!output.stderr.is_empty(), "expression {expr:?}");
  }
}

#[test]
fn wrong_argument_count_is_a_usage_error() {
  for args in [&[][..], &["1", "2"][..]] {
    let output = exprcc(args);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("usage: "), "stderr {stderr:?}");
  }
}

#[test]
fn long_operator_chain_fails_cleanly() {
  let expr = vec!["1"; 60_000].join("+");
  let output = exprcc(&[expr.as_str()]);
  assert_eq!(output.status.code(), Some(1));
  assert!(output.stdout.is_empty());
  let stderr = String::from_utf8(output.stderr).unwrap();
  assert!(stderr.contains("operators deep"), "stderr {stderr:?}");
}
