//! Hierarchical bin scheme shared by the G3D writer and reader.
//!
//! This is the UCSC/tabix layout: a 2^29 coordinate space split into five
//! levels below the root bin 0.
//!
//! | level | bin span | first bin |
//! |-------|----------|-----------|
//! | 1     | 64 Mbp   | 1         |
//! | 2     | 8 Mbp    | 9         |
//! | 3     | 1 Mbp    | 73        |
//! | 4     | 128 Kbp  | 585       |
//! | 5     | 16 Kbp   | 4681      |
//!
//! Records are filed under [`reg2bin`]; queries look up every bin returned by
//! [`reg2bins`], which may include bins that hold nothing.

/// Largest coordinate addressable by the scheme (exclusive).
pub const MAX_COORDINATE: u64 = 1 << 29;

/// (shift, first bin id) per level, coarse to fine
const LEVELS: [(u32, u32); 5] = [(26, 1), (23, 9), (20, 73), (17, 585), (14, 4681)];

/// Smallest bin that fully contains `[beg, end)`.
///
/// Coordinates are clamped to the last addressable position.
pub fn reg2bin(beg: u64, end: u64) -> u32 {
    let beg = beg.min(MAX_COORDINATE - 1);
    let end = end.saturating_sub(1).min(MAX_COORDINATE - 1);
    for &(shift, first) in LEVELS.iter().rev() {
        if beg >> shift == end >> shift {
            return first + (beg >> shift) as u32;
        }
    }
    0
}

/// All bins that may hold records overlapping `[beg, end)`.
///
/// Bin 0 is always first; the remaining bins follow level by level from
/// coarse to fine, ascending within a level.
pub fn reg2bins(beg: u64, end: u64) -> Vec<u32> {
    let mut bins = vec![0];
    if beg >= end {
        return bins;
    }
    let end = end.min(MAX_COORDINATE) - 1;
    for &(shift, first) in &LEVELS {
        let lo = beg >> shift;
        let hi = end >> shift;
        // beg past the addressable space leaves lo > hi and the level empty
        if lo <= hi {
            bins.extend((lo..=hi).map(|k| first + k as u32));
        }
    }
    bins
}
