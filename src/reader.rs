//! Query entry point for G3D files.
//!
//! A [`G3dReader`] reads nothing on construction. The header is read the
//! first time metadata is requested; the header and index together are read
//! on [`G3dReader::init`] or the first query. Concurrent first callers share
//! one in-flight initialization, so each region is fetched and decoded once.
//!
//! # Example
//!
//! ```no_run
//! use g3dr::{FileSource, G3dReader};
//!
//! # async fn demo() -> g3dr::Result<()> {
//! let reader = G3dReader::new(FileSource::Url("https://example.com/cell.g3d".into()))?;
//! if let Some(records) = reader.read_data("chr7", 27_000_000, 28_000_000, 20000).await? {
//!     for record in records {
//!         println!("{}", record.join("\t"));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use crate::codec::{CompressionCodec, DeflateCodec, ObjectCodec, PickleCodec};
use crate::fetch::RecordFetcher;
use crate::source::{ByteRangeSource, FileSource};
use crate::types::{DEFAULT_RESOLUTION, FileHeader, FooterIndex, ReaderState, Record};
use crate::{Result, footer, header};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::OnceCell;

/// Options for building a [`G3dReader`]
pub struct ReaderBuilder {
    source: BuilderSource,
    object_codec: Box<dyn ObjectCodec>,
    compression: Box<dyn CompressionCodec>,
    default_resolution: u32,
    timeout: Option<Duration>,
}

enum BuilderSource {
    File(FileSource),
    Custom(Arc<dyn ByteRangeSource>),
}

impl ReaderBuilder {
    fn with(source: BuilderSource) -> Self {
        Self {
            source,
            object_codec: Box::new(PickleCodec),
            compression: Box::new(DeflateCodec),
            default_resolution: DEFAULT_RESOLUTION,
            timeout: None,
        }
    }

    pub fn new(source: FileSource) -> Self {
        Self::with(BuilderSource::File(source))
    }

    /// Read through a caller-supplied byte range source.
    pub fn from_source(source: Arc<dyn ByteRangeSource>) -> Self {
        Self::with(BuilderSource::Custom(source))
    }

    pub fn object_codec(mut self, codec: impl ObjectCodec + 'static) -> Self {
        self.object_codec = Box::new(codec);
        self
    }

    pub fn compression(mut self, codec: impl CompressionCodec + 'static) -> Self {
        self.compression = Box::new(codec);
        self
    }

    /// Resolution used by [`G3dReader::read_data_default`]
    pub fn default_resolution(mut self, resolution: u32) -> Self {
        self.default_resolution = resolution;
        self
    }

    /// Per-request timeout for remote sources, applied to every read.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<G3dReader> {
        let source = match self.source {
            BuilderSource::File(file) => file.open(self.timeout)?,
            BuilderSource::Custom(source) => source,
        };
        Ok(G3dReader {
            source,
            object_codec: self.object_codec,
            compression: self.compression,
            default_resolution: self.default_resolution,
            header: OnceCell::new(),
            footer: OnceCell::new(),
            in_flight: AtomicUsize::new(0),
        })
    }
}

/// Lazily initialized reader over one G3D file
pub struct G3dReader {
    source: Arc<dyn ByteRangeSource>,
    object_codec: Box<dyn ObjectCodec>,
    compression: Box<dyn CompressionCodec>,
    default_resolution: u32,
    header: OnceCell<Option<FileHeader>>,
    footer: OnceCell<Option<FooterIndex>>,
    in_flight: AtomicUsize,
}

impl G3dReader {
    /// Reader with the default pickle and DEFLATE codecs.
    pub fn new(source: FileSource) -> Result<Self> {
        ReaderBuilder::new(source).build()
    }

    pub fn builder(source: FileSource) -> ReaderBuilder {
        ReaderBuilder::new(source)
    }

    pub fn state(&self) -> ReaderState {
        if self.footer.initialized() {
            ReaderState::Ready
        } else if self.in_flight.load(Ordering::Acquire) > 0 {
            ReaderState::Initializing
        } else {
            ReaderState::Uninitialized
        }
    }

    pub fn default_resolution(&self) -> u32 {
        self.default_resolution
    }

    /// Read the header and index if that has not happened yet.
    ///
    /// A failed initialization leaves the reader uninitialized; the next call
    /// tries again.
    pub async fn init(&self) -> Result<()> {
        self.index().await?;
        Ok(())
    }

    /// File metadata. Reads only the header region.
    pub async fn metadata(&self) -> Result<Option<FileHeader>> {
        Ok(self.header().await?.cloned())
    }

    /// Decoded index, reading header and index on first use.
    pub async fn index(&self) -> Result<Option<&FooterIndex>> {
        if let Some(index) = self.footer.get() {
            return Ok(index.as_ref());
        }
        let _guard = InFlight::enter(&self.in_flight);
        let index = self
            .footer
            .get_or_try_init(move || async move {
                let Some(header) = self.header().await? else {
                    return Ok(None);
                };
                let index = footer::read_footer(
                    self.source.as_ref(),
                    header,
                    self.object_codec.as_ref(),
                    self.compression.as_ref(),
                )
                .await?;
                tracing::info!(
                    name = %header.name,
                    genome = %header.genome,
                    indexed = index.is_some(),
                    "g3d reader initialized"
                );
                Ok::<_, crate::Error>(index)
            })
            .await?;
        Ok(index.as_ref())
    }

    /// Resolutions present in the index, ascending. Empty without an index.
    pub async fn resolutions(&self) -> Result<Vec<u32>> {
        Ok(self
            .index()
            .await?
            .map(FooterIndex::resolutions)
            .unwrap_or_default())
    }

    /// Chromosomes indexed at `resolution`
    pub async fn chromosomes(&self, resolution: u32) -> Result<Option<Vec<&str>>> {
        Ok(self
            .index()
            .await?
            .and_then(|index| index.chromosomes(resolution)))
    }

    /// Records overlapping `[start, end)` on `chrom` at `resolution`.
    ///
    /// `Ok(None)` means the file has no index, or the resolution or chromosome
    /// is not in it. `Ok(Some(vec![]))` means the chromosome is indexed but no
    /// stored block matched.
    pub async fn read_data(
        &self,
        chrom: &str,
        start: u64,
        end: u64,
        resolution: u32,
    ) -> Result<Option<Vec<Record>>> {
        let Some(index) = self.index().await? else {
            return Ok(None);
        };
        RecordFetcher::new(
            self.source.as_ref(),
            self.object_codec.as_ref(),
            self.compression.as_ref(),
        )
        .fetch(index, chrom, start, end, resolution)
        .await
    }

    /// [`G3dReader::read_data`] at the reader's default resolution.
    pub async fn read_data_default(
        &self,
        chrom: &str,
        start: u64,
        end: u64,
    ) -> Result<Option<Vec<Record>>> {
        self.read_data(chrom, start, end, self.default_resolution)
            .await
    }

    async fn header(&self) -> Result<Option<&FileHeader>> {
        let header = self
            .header
            .get_or_try_init(move || {
                header::read_header(self.source.as_ref(), self.object_codec.as_ref())
            })
            .await?;
        Ok(header.as_ref())
    }
}

/// Marks an index read in progress for [`G3dReader::state`].
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
