pub mod binning;
pub mod codec;
pub mod config;
pub mod error;
pub mod fetch;
pub mod footer;
pub mod header;
pub mod reader;
pub mod source;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use reader::{G3dReader, ReaderBuilder};
pub use source::FileSource;
pub use types::{BlockLocation, FileHeader, FooterIndex, ReaderState, Record};
