//! lf-lineage - Column-level lineage engine for Lineflow
//!
//! Given one SQL query, a schema and a dialect, this crate reports for each
//! output column the base-table columns it is derived from and its
//! canonical type.
//!
//! The query is lowered into a graph of scopes (one per SELECT block,
//! derived table, CTE body and set operation). Each output slot of the
//! outermost scope is then traced back through that graph to the schema,
//! and typed along the way.

pub mod assembler;
pub mod error;
pub mod functions;
pub mod infer;
pub mod lowering;
pub mod report;
pub mod resolver;
pub mod scope;
pub mod tracer;

pub use assembler::{compute_lineage, LineageEngine};
pub use error::{LineageError, LineageResult};
pub use functions::{FunctionRegistry, FunctionSignatures, ReturnRule};
pub use infer::TypeInferencer;
pub use lowering::ScopeBuilder;
pub use report::{LineageReport, Origin, OutputColumn};
pub use resolver::{resolve_column, resolve_relation, ColumnTarget};
pub use scope::{Scope, ScopeArena, ScopeId};
pub use tracer::Tracer;
