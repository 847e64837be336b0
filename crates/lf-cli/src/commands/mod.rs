//! CLI command implementations

pub(crate) mod common;
pub(crate) mod lineage;
pub(crate) mod tables;
