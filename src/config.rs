use crate::codec::{JsonCodec, PickleCodec};
use crate::reader::ReaderBuilder;
use crate::source::FileSource;
use crate::types::DEFAULT_RESOLUTION;
use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "g3dr")]
#[command(about = "Query genomic structure records from G3D files")]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Object codec used by the file's header, index and blocks
    #[arg(long, env = "G3D_CODEC", value_enum, default_value = "pickle", global = true)]
    pub codec: CodecKind,

    /// Timeout in seconds for each remote range request
    #[arg(long, env = "G3D_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the file header as JSON
    Meta {
        /// Local path or http(s) URL of the G3D file
        source: String,
    },
    /// List indexed resolutions and chromosomes
    Info {
        /// Local path or http(s) URL of the G3D file
        source: String,
    },
    /// Print records overlapping a region as tab-separated lines
    Query {
        /// Local path or http(s) URL of the G3D file
        source: String,
        chrom: String,
        start: u64,
        end: u64,
        #[arg(short, long, default_value_t = DEFAULT_RESOLUTION)]
        resolution: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CodecKind {
    #[default]
    Pickle,
    Json,
}

impl Config {
    pub fn source(&self) -> &str {
        match &self.command {
            Command::Meta { source } | Command::Info { source } | Command::Query { source, .. } => {
                source.as_str()
            }
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Reader options derived from the command line.
    pub fn reader_builder(&self, source: FileSource) -> ReaderBuilder {
        let builder = ReaderBuilder::new(source).timeout(self.timeout());
        match self.codec {
            CodecKind::Pickle => builder.object_codec(PickleCodec),
            CodecKind::Json => builder.object_codec(JsonCodec),
        }
    }
}
