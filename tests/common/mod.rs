//! Fixture builders and instrumented sources shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use g3dr::binning::reg2bin;
use g3dr::source::{ByteRangeSource, MemorySource};
use g3dr::{BlockLocation, Error, FileHeader, Result};
use serde::Serialize;
use serde_pickle::SerOptions;
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

pub const HEADER_SIZE: usize = 1024;

pub fn pickle<T: Serialize>(value: &T) -> Vec<u8> {
    serde_pickle::to_vec(value, SerOptions::new()).unwrap()
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Compressed, pickled block of rows
pub fn block(rows: &[&str]) -> Vec<u8> {
    zlib(&pickle(&rows))
}

pub fn header(name: &str, resolutions: Vec<u32>, index_offset: u64, index_size: u64) -> FileHeader {
    FileHeader {
        magic: "G3D".to_string(),
        genome: "hg19".to_string(),
        version: 1,
        resolutions,
        name: name.to_string(),
        index_offset,
        index_size,
    }
}

/// Pickle `header` into a zero padded header region.
pub fn header_region(header: &FileHeader) -> Vec<u8> {
    let mut region = pickle(header);
    assert!(region.len() <= HEADER_SIZE, "header does not fit");
    region.resize(HEADER_SIZE, 0);
    region
}

type Footer = BTreeMap<u32, BTreeMap<String, BTreeMap<String, BlockLocation>>>;

/// Lays out a pickle/zlib G3D file the way the Python writer does:
/// header, then data blocks, then the index.
#[derive(Default)]
pub struct G3dBuilder {
    name: String,
    blocks: BTreeMap<(u32, String, u32), Vec<String>>,
}

impl G3dBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Store `rows` under an explicit bin.
    pub fn block(mut self, resolution: u32, chrom: &str, bin: u32, rows: &[&str]) -> Self {
        self.blocks
            .entry((resolution, chrom.to_string(), bin))
            .or_default()
            .extend(rows.iter().map(|r| r.to_string()));
        self
    }

    /// Store one structure record per start, binned by its span.
    pub fn records(mut self, resolution: u32, chrom: &str, starts: &[u64]) -> Self {
        for &start in starts {
            let end = start + u64::from(resolution);
            let row = record_row(chrom, start, end);
            self = self.block(resolution, chrom, reg2bin(start, end), &[&row]);
        }
        self
    }

    pub fn build(&self) -> Bytes {
        let mut data = vec![0u8; HEADER_SIZE];
        let mut footer = Footer::new();
        for ((resolution, chrom, bin), rows) in &self.blocks {
            let compressed = zlib(&pickle(rows));
            let location = BlockLocation {
                offset: data.len() as u64,
                size: compressed.len() as u64,
            };
            data.extend_from_slice(&compressed);
            footer
                .entry(*resolution)
                .or_default()
                .entry(chrom.clone())
                .or_default()
                .insert(bin.to_string(), location);
        }

        let index = zlib(&pickle(&footer));
        let header = header(
            &self.name,
            footer.keys().copied().collect(),
            data.len() as u64,
            index.len() as u64,
        );
        data.extend_from_slice(&index);
        data[..HEADER_SIZE].copy_from_slice(&header_region(&header));
        Bytes::from(data)
    }
}

pub fn record_row(chrom: &str, start: u64, end: u64) -> String {
    format!("{}\t{}\t{}\t0.5\t-1.25\t3.0\tpat", chrom, start, end)
}

/// Counts reads per offset; every read yields to the scheduler first.
pub struct CountingSource {
    inner: MemorySource,
    delay: Duration,
    reads: Mutex<HashMap<u64, usize>>,
}

impl CountingSource {
    pub fn new(data: Bytes, delay: Duration) -> Self {
        Self {
            inner: MemorySource::new(data),
            delay,
            reads: Mutex::new(HashMap::new()),
        }
    }

    pub fn reads_at(&self, offset: u64) -> usize {
        self.reads.lock().unwrap().get(&offset).copied().unwrap_or(0)
    }

    pub fn total_reads(&self) -> usize {
        self.reads.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl ByteRangeSource for CountingSource {
    async fn read(&self, offset: u64, length: u64) -> Result<Option<Bytes>> {
        *self.reads.lock().unwrap().entry(offset).or_default() += 1;
        tokio::time::sleep(self.delay).await;
        self.inner.read(offset, length).await
    }
}

/// Delays selected offsets and records the order reads complete in.
pub struct DelayedSource {
    inner: MemorySource,
    delays: HashMap<u64, Duration>,
    completed: Mutex<Vec<u64>>,
}

impl DelayedSource {
    pub fn new(data: Bytes, delays: HashMap<u64, Duration>) -> Self {
        Self {
            inner: MemorySource::new(data),
            delays,
            completed: Mutex::new(Vec::new()),
        }
    }

    pub fn completed(&self) -> Vec<u64> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ByteRangeSource for DelayedSource {
    async fn read(&self, offset: u64, length: u64) -> Result<Option<Bytes>> {
        if let Some(delay) = self.delays.get(&offset) {
            tokio::time::sleep(*delay).await;
        }
        self.completed.lock().unwrap().push(offset);
        self.inner.read(offset, length).await
    }
}

/// Fails reads at one offset with a transport error.
pub struct FailingSource {
    inner: MemorySource,
    fail_at: u64,
}

impl FailingSource {
    pub fn new(data: Bytes, fail_at: u64) -> Self {
        Self {
            inner: MemorySource::new(data),
            fail_at,
        }
    }
}

#[async_trait]
impl ByteRangeSource for FailingSource {
    async fn read(&self, offset: u64, length: u64) -> Result<Option<Bytes>> {
        if offset == self.fail_at {
            return Err(Error::Transport(format!("connection reset reading {}", offset)));
        }
        self.inner.read(offset, length).await
    }
}
