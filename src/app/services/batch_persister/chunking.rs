//! Partitioning of record collections and datetime spans into chunks

use crate::app::models::DatetimeRange;
use std::ops::Range;

/// Index ranges splitting `total` records into chunks of at most `chunk_size`
///
/// A zero chunk size is treated as one record per chunk.
pub fn plan_chunks(total: usize, chunk_size: usize) -> Vec<Range<usize>> {
    let step = chunk_size.max(1);
    (0..total)
        .step_by(step)
        .map(|start| start..(start + step).min(total))
        .collect()
}

/// Sub-ranges used to delete a datetime span
///
/// While `end - begin` exceeds the chunk size, `[begin, begin + chunk_size - 1]`
/// is split off and the remainder `[begin + chunk_size, end]` is planned the
/// same way. The last sub-range takes whatever is left. Sub-ranges are
/// contiguous and never overlap.
pub fn plan_range_chunks(range: DatetimeRange, chunk_size: usize) -> Vec<DatetimeRange> {
    let step = chunk_size.max(1) as i64;
    let end = i64::from(range.end);
    let mut begin = i64::from(range.begin);
    let mut chunks = Vec::new();

    while end - begin > step {
        chunks.push(DatetimeRange {
            begin: begin as i32,
            end: (begin + step - 1) as i32,
        });
        begin += step;
    }

    chunks.push(DatetimeRange {
        begin: begin as i32,
        end: range.end,
    });
    chunks
}
