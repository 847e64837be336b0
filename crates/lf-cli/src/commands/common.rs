//! Shared utilities for CLI commands

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::io::Read;

use crate::cli::QueryInput;

/// Read the SQL text from `--query`, `--file` or stdin (`--file -`)
pub(crate) fn read_query(input: &QueryInput) -> Result<String> {
    let sql = match (&input.query, &input.file) {
        (Some(query), _) => query.clone(),
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read query from stdin")?;
            buf
        }
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read query file: {}", path.display()))?,
        (None, None) => bail!("No query given: pass --query or --file"),
    };

    if sql.trim().is_empty() {
        bail!("Query is empty");
    }
    Ok(sql)
}

/// Print a value as pretty JSON on stdout
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}
