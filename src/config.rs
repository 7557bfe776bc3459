//! Command-line configuration.

use crate::error::{CompileResult, UsageSnafu};

/// Everything a single compiler run needs from its invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub expr: String,
}

impl Config {
  /// Build a config from raw process arguments, program name first. Exactly
  /// one expression argument is accepted.
  pub fn from_args<I>(args: I) -> CompileResult<Self>
  where
    I: IntoIterator<Item = String>,
  {
    let mut args = args.into_iter();
    let program = args.next().unwrap_or_else(|| "exprcc".to_string());

    match (args.next(), args.next()) {
      (Some(expr), None) => Ok(Self { expr }),
      _ => UsageSnafu { program }.fail(),
    }
  }
}
