use serde::Serialize;
use std::collections::BTreeMap;

/// Resolution queried when the caller does not name one.
pub const DEFAULT_RESOLUTION: u32 = 20000;

/// One decoded row of a block, split on tabs.
pub type Record = Vec<String>;

/// Bin id -> block location for a single chromosome at one resolution.
pub type BinMap = BTreeMap<u32, BlockLocation>;

/// File metadata stored in the fixed-size header region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileHeader {
    pub magic: String,
    pub genome: String,
    pub version: i64,
    pub resolutions: Vec<u32>,
    pub name: String,
    pub index_offset: u64,
    pub index_size: u64,
}

/// Byte range of one compressed, encoded data block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockLocation {
    pub offset: u64,
    pub size: u64,
}

/// Decoded footer: resolution -> chromosome -> bin -> block location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FooterIndex {
    entries: BTreeMap<u32, BTreeMap<String, BinMap>>,
}

impl FooterIndex {
    pub fn new(entries: BTreeMap<u32, BTreeMap<String, BinMap>>) -> Self {
        Self { entries }
    }

    pub fn resolution(&self, resolution: u32) -> Option<&BTreeMap<String, BinMap>> {
        self.entries.get(&resolution)
    }

    pub fn chromosome(&self, resolution: u32, chrom: &str) -> Option<&BinMap> {
        self.resolution(resolution)?.get(chrom)
    }

    /// Indexed resolutions in ascending order
    pub fn resolutions(&self) -> Vec<u32> {
        self.entries.keys().copied().collect()
    }

    pub fn chromosomes(&self, resolution: u32) -> Option<Vec<&str>> {
        self.resolution(resolution)
            .map(|chroms| chroms.keys().map(String::as_str).collect())
    }

    /// Total number of indexed blocks across all resolutions
    pub fn block_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(|chroms| chroms.values())
            .map(BTreeMap::len)
            .sum()
    }
}

/// Initialization lifecycle of a reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Uninitialized,
    Initializing,
    Ready,
}
