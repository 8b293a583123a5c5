//! Batch sizing for bulk parameterized statements.
//!
//! A [`ChunkPlan`] splits `row_count` rows into contiguous, ordered ranges so
//! that `columns_per_row * range.len()` never exceeds the parameter limit.

use std::iter::FusedIterator;
use std::ops::Range;

use crate::error::{Error, Result};
use crate::limit_probe::ParameterLimit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    row_count: usize,
    rows_per_chunk: usize,
}

/// Fails before producing anything when a single row would not fit.
pub fn plan_chunks(row_count: usize, columns_per_row: usize, parameter_limit: usize) -> Result<ChunkPlan> {
    if columns_per_row == 0 {
        return Err(Error::Configuration(
            "columns_per_row must be at least 1".into(),
        ));
    }
    if parameter_limit < columns_per_row {
        return Err(Error::Configuration(format!(
            "a single row binds {columns_per_row} parameters but the limit is {parameter_limit}"
        )));
    }
    Ok(ChunkPlan {
        row_count,
        rows_per_chunk: parameter_limit / columns_per_row,
    })
}

impl ChunkPlan {
    pub fn for_limit(row_count: usize, columns_per_row: usize, limit: ParameterLimit) -> Result<Self> {
        plan_chunks(row_count, columns_per_row, limit.get())
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn rows_per_chunk(&self) -> usize {
        self.rows_per_chunk
    }

    /// Number of batches the plan yields.
    pub fn chunk_count(&self) -> usize {
        self.row_count.div_ceil(self.rows_per_chunk)
    }

    pub fn ranges(&self) -> ChunkRanges {
        ChunkRanges {
            next: 0,
            row_count: self.row_count,
            step: self.rows_per_chunk,
        }
    }
}

impl IntoIterator for ChunkPlan {
    type Item = Range<usize>;
    type IntoIter = ChunkRanges;

    fn into_iter(self) -> ChunkRanges {
        self.ranges()
    }
}

#[derive(Debug, Clone)]
pub struct ChunkRanges {
    next: usize,
    row_count: usize,
    step: usize,
}

impl Iterator for ChunkRanges {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Range<usize>> {
        if self.next >= self.row_count {
            return None;
        }
        let start = self.next;
        let end = start.saturating_add(self.step).min(self.row_count);
        self.next = end;
        Some(start..end)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.row_count.saturating_sub(self.next).div_ceil(self.step);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ChunkRanges {}

impl FusedIterator for ChunkRanges {}

/// Slices caller-owned rows into batches that each fit one statement.
pub fn chunk_rows<T>(
    rows: &[T],
    columns_per_row: usize,
    limit: ParameterLimit,
) -> Result<impl Iterator<Item = &[T]> + '_> {
    let plan = ChunkPlan::for_limit(rows.len(), columns_per_row, limit)?;
    Ok(plan.into_iter().map(move |range| &rows[range]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(row_count: usize, columns: usize, limit: usize) -> Vec<Range<usize>> {
        plan_chunks(row_count, columns, limit).unwrap().into_iter().collect()
    }

    #[test]
    fn empty_input_yields_no_ranges() {
        assert!(collect(0, 5, 100).is_empty());
        assert_eq!(plan_chunks(0, 5, 100).unwrap().chunk_count(), 0);
    }

    #[test]
    fn uneven_split_ends_with_remainder() {
        assert_eq!(collect(7, 3, 10), vec![0..3, 3..6, 6..7]);
    }

    #[test]
    fn single_row_over_limit_is_rejected() {
        let err = plan_chunks(5, 10, 5).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(matches!(plan_chunks(5, 0, 5), Err(Error::Configuration(_))));
    }

    #[test]
    fn every_range_fits_the_limit() {
        for columns in 1..=50 {
            for limit in (columns..=999).step_by(7) {
                for range in collect(113, columns, limit) {
                    assert!(!range.is_empty());
                    assert!(columns * range.len() <= limit, "columns={columns} limit={limit}");
                }
            }
        }
    }

    #[test]
    fn ranges_partition_rows_in_order() {
        for row_count in [0, 1, 2, 9, 10, 11, 100, 1_001] {
            for (columns, limit) in [(1, 1), (3, 10), (4, 999), (13, 250)] {
                let flattened: Vec<usize> = collect(row_count, columns, limit)
                    .into_iter()
                    .flatten()
                    .collect();
                assert_eq!(flattened, (0..row_count).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn plan_is_restartable() {
        let plan = plan_chunks(25, 2, 10).unwrap();
        let first: Vec<_> = plan.ranges().collect();
        let second: Vec<_> = plan.into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(plan.ranges().len(), plan.chunk_count());
        assert_eq!(plan.chunk_count(), 5);
    }

    #[test]
    fn chunk_rows_slices_in_order() {
        let rows: Vec<u32> = (0..10).collect();
        let limit = ParameterLimit::new(8).unwrap();
        let batches: Vec<&[u32]> = chunk_rows(&rows, 3, limit).unwrap().collect();
        assert_eq!(batches, vec![&rows[0..2], &rows[2..4], &rows[4..6], &rows[6..8], &rows[8..10]]);
    }
}
