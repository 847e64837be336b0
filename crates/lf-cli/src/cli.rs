//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use lf_core::Dialect;
use std::path::PathBuf;

/// Lineflow - column-level lineage and type inference for SQL queries
#[derive(Parser, Debug)]
#[command(name = "lf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report the upstream columns and type of every output column
    Lineage(LineageArgs),

    /// List the base tables a query reads from
    Tables(TablesArgs),
}

/// Where the SQL comes from
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct QueryInput {
    /// SQL query text
    #[arg(short, long)]
    pub query: Option<String>,

    /// File containing the SQL query (`-` for stdin)
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Arguments for the lineage command
#[derive(Args, Debug)]
pub struct LineageArgs {
    #[command(flatten)]
    pub input: QueryInput,

    /// Config file with dialect, schema and function signatures
    #[arg(short, long, env = "LF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Schema file (table -> column -> type), overrides the config schema
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// SQL dialect, overrides the config dialect
    #[arg(short, long)]
    pub dialect: Option<Dialect>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub output: ReportOutput,
}

/// Arguments for the tables command
#[derive(Args, Debug)]
pub struct TablesArgs {
    #[command(flatten)]
    pub input: QueryInput,

    /// SQL dialect
    #[arg(short, long, default_value = "duckdb")]
    pub dialect: Dialect,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: ReportOutput,
}

/// Report output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutput {
    /// JSON output
    Json,
    /// Human-readable table
    Table,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
