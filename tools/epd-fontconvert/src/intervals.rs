//! Code point interval resolution
//!
//! Declared ranges (defaults plus user additions) are merged, then split
//! into runs of code points the font stack can actually render.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ConvertError;

/// Highest Unicode scalar value
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// Inclusive ranges exported unless the caller adds more
pub const DEFAULT_INTERVALS: &[CodePointRange] = &[
    // Basic Latin: ASCII letters, digits, punctuation, control characters
    CodePointRange::new(0x0000, 0x007F),
];

/// Inclusive code point range, `first <= last`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CodePointRange {
    pub first: u32,
    pub last: u32,
}

impl CodePointRange {
    pub const fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    /// Number of code points in the range
    pub fn len(&self) -> u32 {
        self.last - self.first + 1
    }

    pub fn code_points(&self) -> RangeInclusive<u32> {
        self.first..=self.last
    }
}

impl fmt::Display for CodePointRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}..={:#06x}", self.first, self.last)
    }
}

/// Parses `first,last` where each bound is decimal or `0x`-prefixed hex.
impl FromStr for CodePointRange {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ConvertError::InvalidInterval {
            input: s.to_string(),
            reason,
        };

        let bounds: Vec<&str> = s.split(',').collect();
        let &[first, last] = bounds.as_slice() else {
            return Err(invalid(format!(
                "expected 'first,last', got {} value(s)",
                bounds.len()
            )));
        };

        let first = parse_code_point(first).map_err(&invalid)?;
        let last = parse_code_point(last).map_err(&invalid)?;
        for cp in [first, last] {
            if cp > MAX_CODE_POINT {
                return Err(ConvertError::CodePointOutOfRange(cp));
            }
        }
        if first > last {
            return Err(invalid(format!("first {first:#x} is greater than last {last:#x}")));
        }

        Ok(Self::new(first, last))
    }
}

fn parse_code_point(token: &str) -> Result<u32, String> {
    let token = token.trim();
    let parsed = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => token.parse::<u32>(),
    };
    parsed.map_err(|e| format!("'{token}' is not a code point: {e}"))
}

/// Sort ranges and merge those that overlap or touch.
///
/// Two ranges merge when the next one starts at or before the current end + 1.
pub fn merge_ranges(ranges: impl IntoIterator<Item = CodePointRange>) -> Vec<CodePointRange> {
    let mut sorted: Vec<CodePointRange> = ranges.into_iter().collect();
    sorted.sort();

    let mut merged: Vec<CodePointRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        if let Some(current) = merged.last_mut() {
            if range.first <= current.last.saturating_add(1) {
                current.last = current.last.max(range.last);
                continue;
            }
        }
        merged.push(range);
    }
    merged
}

/// Split each range into maximal runs of code points for which `covers` holds.
///
/// Uncovered code points are logged and skipped. A range with no coverage
/// at all contributes nothing.
pub fn split_by_coverage(
    ranges: &[CodePointRange],
    mut covers: impl FnMut(u32) -> bool,
) -> Vec<CodePointRange> {
    let mut intervals = Vec::new();

    for range in ranges {
        let before = intervals.len();
        let mut run_start: Option<u32> = None;

        for code_point in range.code_points() {
            if covers(code_point) {
                run_start.get_or_insert(code_point);
                continue;
            }
            tracing::warn!(
                "code point {} ({:#x}) not found in font stack",
                code_point,
                code_point
            );
            if let Some(start) = run_start.take() {
                intervals.push(CodePointRange::new(start, code_point - 1));
            }
        }
        if let Some(start) = run_start {
            intervals.push(CodePointRange::new(start, range.last));
        }

        if intervals.len() == before {
            tracing::debug!("range {} has no coverage, dropped", range);
        }
    }

    intervals
}

/// Merge the declared ranges, then keep only what the font stack covers
pub fn resolve_intervals(
    declared: &[CodePointRange],
    covers: impl FnMut(u32) -> bool,
) -> Vec<CodePointRange> {
    let merged = merge_ranges(declared.iter().copied());
    split_by_coverage(&merged, covers)
}
