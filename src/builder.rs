//! Sitemap build orchestration.
//!
//! A build runs its stages strictly in order on the calling thread:
//!
//! ```text
//! Idle -> Cleaning -> Writing -> Indexing -> Compressing -> Publishing -> Done
//! ```
//!
//! `Compressing` only runs with `gzip` enabled and `Publishing` only with a
//! `publish_dir`. The first failing stage aborts the build; files already
//! written stay on disk, so re-running the build (which starts by cleaning)
//! is the recovery path.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::cleanup::clean_output_dir;
use crate::compressor::{compress_directory, publish_compressed};
use crate::config::BuildConfig;
use crate::index::SitemapIndexBuilder;
use crate::location::Location;
use crate::writer::{SitemapPart, SitemapWriter};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStage {
    Idle,
    Cleaning,
    Writing,
    Indexing,
    Compressing,
    Publishing,
    Done,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStage::Idle => "idle",
            BuildStage::Cleaning => "cleaning",
            BuildStage::Writing => "writing",
            BuildStage::Indexing => "indexing",
            BuildStage::Compressing => "compressing",
            BuildStage::Publishing => "publishing",
            BuildStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Supplies the locations for a build.
///
/// Implemented for any `FnMut() -> impl IntoIterator<Item = Location>`.
pub trait LocationSource {
    fn produce_locations(&mut self) -> Result<Box<dyn Iterator<Item = Result<Location>> + '_>>;
}

impl<F, I> LocationSource for F
where
    F: FnMut() -> I,
    I: IntoIterator<Item = Location>,
    I::IntoIter: 'static,
{
    fn produce_locations(&mut self) -> Result<Box<dyn Iterator<Item = Result<Location>> + '_>> {
        Ok(Box::new(self().into_iter().map(Ok)))
    }
}

/// What a finished build produced.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Parts in creation order.
    pub parts: Vec<SitemapPart>,
    /// Public URL of each part, as listed in the index.
    pub part_urls: Vec<String>,
    pub index_path: PathBuf,
    /// `.gz` files written (empty without gzip).
    pub compressed: Vec<PathBuf>,
    /// Stale files removed before writing.
    pub removed: Vec<PathBuf>,
    /// Archives copied to the publish dir.
    pub published: Vec<PathBuf>,
    pub url_count: usize,
    pub elapsed: Duration,
}

impl BuildReport {
    /// Part stems, in the order the index lists them.
    pub fn sitemap_files(&self) -> Vec<&str> {
        self.parts.iter().map(|part| part.file_name.as_str()).collect()
    }
}

/// Runs sitemap builds for one `BuildConfig`.
#[derive(Debug, Clone)]
pub struct SitemapBuilder {
    config: BuildConfig,
    index: SitemapIndexBuilder,
}

impl SitemapBuilder {
    pub fn new(config: BuildConfig) -> Result<Self> {
        config.validate()?;
        let index = SitemapIndexBuilder::new(&config.root_url, &config.sitemaps_path);
        Ok(Self { config, index })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn index_builder(&self) -> &SitemapIndexBuilder {
        &self.index
    }

    /// Build from an in-memory or lazy sequence of locations.
    pub fn build<I>(&self, locations: I) -> Result<BuildReport>
    where
        I: IntoIterator<Item = Location>,
    {
        self.build_iter(locations.into_iter().map(Ok))
    }

    /// Build from a `LocationSource`. The source is asked for its locations once
    /// the output dir is clean; an error it returns or yields aborts the build.
    pub fn build_from(&self, source: &mut dyn LocationSource) -> Result<BuildReport> {
        let started = Instant::now();
        let removed = self.clean()?;
        let locations = source
            .produce_locations()
            .map_err(|err| stage_error(BuildStage::Writing, err))?;
        self.write_locations(locations, removed, started)
    }

    /// Build from an asynchronous source, awaiting each location before writing it.
    #[cfg(feature = "async")]
    pub async fn build_stream<S>(&self, locations: S) -> Result<BuildReport>
    where
        S: futures_util::Stream<Item = Location>,
    {
        use futures_util::StreamExt;

        let started = Instant::now();
        let removed = self.clean()?;
        let mut writer = self.open_writer()?;
        futures_util::pin_mut!(locations);
        while let Some(location) = locations.next().await {
            writer
                .add_location(&location)
                .map_err(|err| stage_error(BuildStage::Writing, err))?;
        }
        self.complete(writer, removed, started)
    }

    /// Rewrite the index as a flat listing of the `.gz` files already in the output dir.
    pub fn reindex_existing_gzips(&self) -> Result<PathBuf> {
        run_stage(BuildStage::Indexing, || {
            self.index
                .build_from_existing_gzips(&self.config.output_dir, &self.config.base_name)
        })
    }

    fn build_iter<I>(&self, locations: I) -> Result<BuildReport>
    where
        I: Iterator<Item = Result<Location>>,
    {
        let started = Instant::now();
        let removed = self.clean()?;
        self.write_locations(locations, removed, started)
    }

    fn write_locations<I>(
        &self,
        locations: I,
        removed: Vec<PathBuf>,
        started: Instant,
    ) -> Result<BuildReport>
    where
        I: Iterator<Item = Result<Location>>,
    {
        let mut writer = self.open_writer()?;
        run_stage(BuildStage::Writing, || {
            for location in locations {
                writer.add_location(&location?)?;
            }
            Ok(())
        })?;
        self.complete(writer, removed, started)
    }

    fn clean(&self) -> Result<Vec<PathBuf>> {
        debug!("sitemap build: {} -> {}", BuildStage::Idle, BuildStage::Cleaning);
        run_stage(BuildStage::Cleaning, || {
            clean_output_dir(&self.config.output_dir, &self.config.base_name)
        })
    }

    fn open_writer(&self) -> Result<SitemapWriter> {
        run_stage(BuildStage::Writing, || {
            SitemapWriter::with_max_bytes(
                &self.config.output_dir,
                &self.config.base_name,
                self.config.indented,
                self.config.max_part_bytes,
            )
        })
    }

    /// Close the writer, then index, compress and publish.
    fn complete(
        &self,
        writer: SitemapWriter,
        removed: Vec<PathBuf>,
        started: Instant,
    ) -> Result<BuildReport> {
        let parts = run_stage(BuildStage::Writing, || writer.finish())?;
        let files: Vec<&str> = parts.iter().map(|part| part.file_name.as_str()).collect();
        let gzip = self.config.gzip;

        let index_path = run_stage(BuildStage::Indexing, || {
            self.index
                .build(&self.config.output_dir, &self.config.base_name, &files, gzip)
        })?;
        let part_urls = files
            .iter()
            .map(|file| self.index.part_url(file, gzip))
            .collect();

        let compressed = if gzip {
            run_stage(BuildStage::Compressing, || {
                compress_directory(&self.config.output_dir)
            })?
            .written
        } else {
            Vec::new()
        };

        let published = match (&self.config.publish_dir, gzip) {
            (Some(dest), true) => run_stage(BuildStage::Publishing, || {
                publish_compressed(&self.config.output_dir, dest)
            })?,
            _ => Vec::new(),
        };

        let url_count = parts.iter().map(|part| part.url_count).sum();
        let report = BuildReport {
            parts,
            part_urls,
            index_path,
            compressed,
            removed,
            published,
            url_count,
            elapsed: started.elapsed(),
        };
        info!(
            "sitemap build {}: {} urls in {} parts, index {} ({:?})",
            BuildStage::Done,
            report.url_count,
            report.parts.len(),
            report.index_path.display(),
            report.elapsed
        );
        Ok(report)
    }
}

fn run_stage<T>(stage: BuildStage, f: impl FnOnce() -> Result<T>) -> Result<T> {
    debug!("sitemap build stage: {stage}");
    f().map_err(|err| stage_error(stage, err))
}

fn stage_error(stage: BuildStage, err: Error) -> Error {
    match err {
        already @ Error::Stage { .. } => already,
        other => Error::Stage {
            stage,
            source: Box::new(other),
        },
    }
}
