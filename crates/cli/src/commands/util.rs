//! Offline helpers over the core's pure functions.

use std::io::Read;
use std::path::PathBuf;

use bookstore_core::Order;
use bookstore_core::clock::{Clock, SystemClock};
use bookstore_core::dates::{parse_date_string, to_date_input_value};
use bookstore_core::promotion::derive_status;
use clap::Subcommand;
use serde_json::{Value, json};

use crate::error::CliError;
use crate::output::emit;

#[derive(Subcommand)]
pub enum UtilAction {
    /// Normalize a backend date (`[2025, 5, 23]`, ISO string) to YYYY-MM-DD
    Date { value: String },
    /// Compute subtotal, discount and total of an order JSON document
    Total {
        /// Order file; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Promotion status for a start/end pair, as of now
    PromotionStatus {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
}

pub fn run(action: UtilAction) -> Result<(), CliError> {
    match action {
        UtilAction::Date { value } => emit(&normalize_date(&value)),
        UtilAction::Total { file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut raw = String::new();
                    std::io::stdin().read_to_string(&mut raw)?;
                    raw
                }
            };
            let order: Order = serde_json::from_str(&raw)?;
            emit(&order.totals())
        }
        UtilAction::PromotionStatus { start, end } => {
            let start = parse_bound(start.as_deref())?;
            let end = parse_bound(end.as_deref())?;
            let status = derive_status(start, end, SystemClock.local_now());
            emit(&json!({ "status": status, "label": status.label() }))
        }
    }
}

/// Arguments are tried as JSON first so arrays work; anything else is
/// taken as a plain string.
fn normalize_date(arg: &str) -> String {
    let value = serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_string()));
    to_date_input_value(&value)
}

fn parse_bound(value: Option<&str>) -> Result<Option<chrono::NaiveDateTime>, CliError> {
    value
        .map(|s| {
            parse_date_string(s).ok_or_else(|| CliError::Input(format!("unrecognized date: {s}")))
        })
        .transpose()
}
