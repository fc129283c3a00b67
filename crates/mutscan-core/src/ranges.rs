//! Compact range notation for sets of identifiers.
//!
//! `[1, 2, 3, 7, 9, 10]` is written `1-3, 7, 9-10`.

use std::ops::RangeInclusive;

use crate::error::RangeError;

const SEPARATOR: &str = ", ";

/// Most numbers `expand` will produce.
pub const MAX_EXPANDED: usize = 1_000_000;

/// Deduplicate and sort `numbers`, then write maximal consecutive runs as
/// `n` or `lo-hi` joined with `", "`. Empty input gives an empty string.
pub fn compress(numbers: &[i64]) -> String {
    format_runs(&runs(numbers))
}

/// Maximal runs of consecutive integers in `numbers`, ascending.
pub fn runs(numbers: &[i64]) -> Vec<RangeInclusive<i64>> {
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut out: Vec<RangeInclusive<i64>> = Vec::new();
    for n in sorted {
        match out.last_mut() {
            Some(run) if run.end().checked_add(1) == Some(n) => {
                *run = *run.start()..=n;
            }
            _ => out.push(n..=n),
        }
    }
    out
}

/// Integers missing between the smallest and largest of `numbers`, as runs.
pub fn gap_ranges(numbers: &[i64]) -> Vec<RangeInclusive<i64>> {
    runs(numbers)
        .windows(2)
        .map(|pair| (*pair[0].end() + 1)..=(*pair[1].start() - 1))
        .collect()
}

/// Range notation for the identifiers missing from `numbers`.
pub fn compress_gaps(numbers: &[i64]) -> String {
    format_runs(&gap_ranges(numbers))
}

fn format_runs(runs: &[RangeInclusive<i64>]) -> String {
    runs.iter()
        .map(|r| {
            if r.start() == r.end() {
                r.start().to_string()
            } else {
                format!("{}-{}", r.start(), r.end())
            }
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Expand range notation back into the ascending list of integers.
///
/// Only non-negative values are understood; `compress` of a set of
/// non-negative integers always expands back to that set. Output longer
/// than [`MAX_EXPANDED`] is rejected before it is built.
pub fn expand(text: &str) -> Result<Vec<i64>, RangeError> {
    let mut out = Vec::new();

    for segment in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let invalid = || RangeError::InvalidSegment(segment.to_string());

        match segment.split_once('-') {
            Some((lo, hi)) => {
                let lo: u64 = lo.trim().parse().map_err(|_| invalid())?;
                let hi: u64 = hi.trim().parse().map_err(|_| invalid())?;
                if lo > hi {
                    return Err(RangeError::Descending { lo, hi });
                }
                let lo = i64::try_from(lo).map_err(|_| invalid())?;
                let hi = i64::try_from(hi).map_err(|_| invalid())?;
                let len = (hi - lo).unsigned_abs().saturating_add(1);
                if len > (MAX_EXPANDED - out.len()) as u64 {
                    return Err(RangeError::TooLarge {
                        limit: MAX_EXPANDED,
                    });
                }
                out.extend(lo..=hi);
            }
            None => {
                let n: u64 = segment.parse().map_err(|_| invalid())?;
                if out.len() >= MAX_EXPANDED {
                    return Err(RangeError::TooLarge {
                        limit: MAX_EXPANDED,
                    });
                }
                out.push(i64::try_from(n).map_err(|_| invalid())?);
            }
        }
    }

    Ok(out)
}
