use std::env;
use std::io;
use std::process;

use exprcc::{CompileResult, Config};
use tracing_subscriber::EnvFilter;

fn run() -> CompileResult<()> {
  let config = Config::from_args(env::args())?;
  let stdout = io::stdout();
  let mut out = stdout.lock();
  exprcc::compile(&config.expr, &mut out)
}

fn main() {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_target(false)
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .init();

  if let Err(err) = run() {
    eprintln!("{err}");
    process::exit(1);
  }
}
