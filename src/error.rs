//! Typed outcomes for data that is structurally unavailable.

use crate::models::Column;
use thiserror::Error;

/// An aggregation could not run because the source lacks a column it needs.
///
/// This is distinct from a query that ran and matched nothing: callers
/// branch on it before rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("column(s) not found in the record set: {}", join_columns(.columns))]
    MissingColumns { columns: Vec<Column> },
}

impl AnalysisError {
    pub fn missing(column: Column) -> Self {
        AnalysisError::MissingColumns {
            columns: vec![column],
        }
    }
}

fn join_columns(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| format!("'{}'", c))
        .collect::<Vec<_>>()
        .join(", ")
}
