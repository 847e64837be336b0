//! Lineage command implementation: column lineage and types for one query

use anyhow::{anyhow, Context, Result};
use lf_core::{LineageConfig, Schema};
use lf_lineage::{FunctionRegistry, LineageEngine, LineageReport, OutputColumn};
use lf_sql::TypeTag;
use std::collections::HashMap;

use crate::cli::{GlobalArgs, LineageArgs, ReportOutput};
use crate::commands::common::{print_json, read_query};

/// Execute the lineage command
pub(crate) fn execute(args: &LineageArgs, global: &GlobalArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => LineageConfig::load(path).context("Failed to load config")?,
        None => LineageConfig::default(),
    };

    let schema = match &args.schema {
        Some(path) => Schema::load(path).context("Failed to load schema")?,
        None => config.schema.clone(),
    };
    if schema.is_empty() && global.verbose {
        eprintln!("[verbose] No schema tables given; only table-free queries will resolve");
    }

    let dialect = args.dialect.unwrap_or(config.dialect);
    let functions = function_registry(&config.functions)?;
    if global.verbose {
        eprintln!(
            "[verbose] dialect={}, {} table(s), {} custom function(s)",
            dialect,
            schema.len(),
            config.functions.len()
        );
    }

    let sql = read_query(&args.input)?;
    let engine = LineageEngine::from_dialect_name(dialect.as_str())
        .context("Invalid SQL dialect")?
        .with_functions(functions);
    let report = engine
        .compute(&sql, &schema)
        .context("Failed to compute lineage")?;

    match args.output {
        ReportOutput::Json => print_json(&report)?,
        ReportOutput::Table => print_table(&report),
    }
    Ok(())
}

/// Standard signatures plus the config's `functions:` overrides
fn function_registry(overrides: &HashMap<String, String>) -> Result<FunctionRegistry> {
    let mut registry = FunctionRegistry::standard();
    for (name, tag) in overrides {
        let tag: TypeTag = tag
            .parse()
            .map_err(|e| anyhow!("Invalid return type for function '{}': {}", name, e))?;
        log::debug!("Custom function signature: {} -> {}", name, tag);
        registry = registry.with_return_type(name, tag);
    }
    Ok(registry)
}

/// Print the report as a human-readable table
fn print_table(report: &LineageReport) {
    if report.columns.is_empty() {
        println!("No output columns.");
        return;
    }

    print_section(&report.columns);
    println!("\n{} column(s).", report.columns.len());

    if !report.conditions.is_empty() {
        println!("\nFilter conditions:");
        print_section(&report.conditions);
    }
}

fn print_section(columns: &[OutputColumn]) {
    println!("{:<30} {:<10} UPSTREAM", "COLUMN", "TYPE");
    println!("{}", "-".repeat(80));

    for column in columns {
        let upstream = if column.upstream.is_empty() {
            "-".to_string()
        } else {
            column
                .upstream
                .iter()
                .map(|o| format!("{}.{}", o.table, o.column))
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!(
            "{:<30} {:<10} {}",
            column.name,
            column.type_tag.as_str(),
            upstream
        );
    }
}
