//! Renders `REPLACE INTO` statements for each batch of a chunk plan.
//! Execution stays with the caller.

use std::ops::Range;

use crate::chunking::ChunkPlan;
use crate::error::{Error, Result};
use crate::limit_probe::ParameterLimit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStatement {
    pub rows: Range<usize>,
    pub sql: String,
}

impl BatchStatement {
    pub fn parameter_count(&self, columns_per_row: usize) -> usize {
        self.rows.len() * columns_per_row
    }
}

#[derive(Debug, Clone)]
pub struct BulkReplace {
    table: String,
    columns: Vec<String>,
}

impl BulkReplace {
    pub fn new<I, S>(table: &str, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(Error::Configuration(format!(
                "bulk replace into {table} needs at least one column"
            )));
        }
        Ok(Self {
            table: table.to_string(),
            columns,
        })
    }

    pub fn columns_per_row(&self) -> usize {
        self.columns.len()
    }

    /// One statement per batch; each binds at most `limit` parameters.
    pub fn statements(&self, row_count: usize, limit: ParameterLimit) -> Result<Vec<BatchStatement>> {
        let plan = ChunkPlan::for_limit(row_count, self.columns_per_row(), limit)?;
        Ok(plan
            .into_iter()
            .map(|rows| BatchStatement {
                sql: self.render(rows.len()),
                rows,
            })
            .collect())
    }

    fn render(&self, rows: usize) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| quote_name(c))
            .collect::<Vec<_>>()
            .join(", ");
        let tuple = format!("({})", vec!["?"; self.columns.len()].join(", "));
        let values = vec![tuple.as_str(); rows].join(", ");
        format!(
            "REPLACE INTO {} ({columns}) VALUES {values}",
            quote_name(&self.table)
        )
    }
}

fn quote_name(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
