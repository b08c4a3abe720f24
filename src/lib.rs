//! Size-bounded XML sitemap generation.
//!
//! Locations are streamed into `{base}{n}.xml` part files that roll over
//! once they reach a byte ceiling, a sitemap index lists every part by its
//! public URL, and each output file can be gzipped alongside the original.
//!
//! ```rust,ignore
//! use sitemap_forge::{BuildConfig, Location, SitemapBuilder};
//!
//! let config = BuildConfig::new("./public/sitemaps", "https://example.com");
//! let builder = SitemapBuilder::new(config)?;
//! let report = builder.build(vec![Location::new("https://example.com/")?])?;
//! println!("{} urls in {} parts", report.url_count, report.parts.len());
//! ```

pub mod builder;
pub mod cleanup;
pub mod compressor;
pub mod config;
pub mod error;
pub mod fs_util;
pub mod index;
pub mod location;
pub mod reader;
pub mod writer;
mod xml;

pub use builder::{BuildReport, BuildStage, LocationSource, SitemapBuilder};
pub use cleanup::clean_output_dir;
pub use compressor::{compress_directory, compress_file, publish_compressed, CompressionStats};
pub use config::BuildConfig;
pub use error::{Error, Result};
pub use index::{IndexEntry, SitemapIndexBuilder};
pub use location::{ChangeFrequency, Location};
pub use reader::{read_index, read_listing, read_part};
pub use writer::{SitemapPart, SitemapWriter, MAX_PART_BYTES};
pub use xml::SITEMAP_NS;
