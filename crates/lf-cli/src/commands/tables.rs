//! Tables command implementation: base tables referenced by a query

use anyhow::{Context, Result};
use lf_sql::{extract_tables, SqlParser};

use crate::cli::{GlobalArgs, ReportOutput, TablesArgs};
use crate::commands::common::{print_json, read_query};

/// Execute the tables command
pub(crate) fn execute(args: &TablesArgs, global: &GlobalArgs) -> Result<()> {
    let sql = read_query(&args.input)?;
    let parser =
        SqlParser::from_dialect_name(args.dialect.as_str()).context("Invalid SQL dialect")?;
    let statements = parser.parse(&sql).context("Failed to parse SQL")?;
    let tables = extract_tables(&statements);

    if global.verbose {
        eprintln!(
            "[verbose] {} statement(s), {} table(s)",
            statements.len(),
            tables.len()
        );
    }

    match args.output {
        ReportOutput::Json => print_json(&tables)?,
        ReportOutput::Table => {
            if tables.is_empty() {
                println!("No tables referenced.");
            } else {
                for table in &tables {
                    println!("{}", table);
                }
            }
        }
    }
    Ok(())
}
