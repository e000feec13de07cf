//! Command results on stdout.
//!
//! Results are written as pretty JSON so they can be piped; progress and
//! summaries go through `tracing` to stderr.

use std::io::{self, Write};

use serde::Serialize;

use crate::error::CliError;

/// Write `value` to stdout as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn emit<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    let mut out = io::stdout().lock();
    writeln!(out, "{json}")?;
    Ok(())
}
