use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use sitemap_forge::{BuildConfig, Location, LocationSource, SitemapBuilder};

#[derive(Parser, Debug)]
#[command(name = "sitemap-build")]
#[command(about = "Write size-bounded sitemap parts, a sitemap index and gzip copies")]
struct Cli {
    /// JSON build config; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Newline-delimited JSON locations (`{"url": ..., "lastmod": ..., ...}`); stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory for parts, index and .gz files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Public root URL of the site (e.g. https://example.com)
    #[arg(long)]
    root_url: Option<String>,

    /// Part file base name
    #[arg(long)]
    base_name: Option<String>,

    /// Path segment under the root URL where parts are served
    #[arg(long)]
    sitemaps_path: Option<String>,

    /// Byte ceiling checked before each entry
    #[arg(long)]
    max_part_bytes: Option<u64>,

    /// Pretty-print part files
    #[arg(long)]
    indented: bool,

    /// Skip gzip output; the index then points at plain .xml parts
    #[arg(long)]
    no_gzip: bool,

    /// Copy .gz files here after compression
    #[arg(long)]
    publish_dir: Option<PathBuf>,

    /// Only rewrite the index as a listing of existing .gz files
    #[arg(long)]
    reindex_gzips: bool,
}

impl Cli {
    fn build_config(&self) -> Result<BuildConfig> {
        let mut config = match &self.config {
            Some(path) => BuildConfig::from_json_file(path)
                .with_context(|| format!("load config {}", path.display()))?,
            None => BuildConfig::default(),
        };
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(url) = &self.root_url {
            config.root_url = url.clone();
        }
        if let Some(name) = &self.base_name {
            config.base_name = name.clone();
        }
        if let Some(path) = &self.sitemaps_path {
            config.sitemaps_path = path.clone();
        }
        if let Some(bytes) = self.max_part_bytes {
            config.max_part_bytes = bytes;
        }
        if self.indented {
            config.indented = true;
        }
        if self.no_gzip {
            config.gzip = false;
        }
        if let Some(dir) = &self.publish_dir {
            config.publish_dir = Some(dir.clone());
        }
        Ok(config)
    }
}

/// Locations read line by line from newline-delimited JSON.
struct JsonLines {
    reader: Box<dyn BufRead>,
}

impl LocationSource for JsonLines {
    fn produce_locations(
        &mut self,
    ) -> sitemap_forge::Result<Box<dyn Iterator<Item = sitemap_forge::Result<Location>> + '_>> {
        let lines = (&mut self.reader).lines().enumerate().filter_map(|(idx, line)| {
            let line = match line {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            if line.trim().is_empty() {
                return None;
            }
            Some(serde_json::from_str::<Location>(&line).map_err(|err| {
                sitemap_forge::Error::MalformedInput(format!("line {}: {err}", idx + 1))
            }))
        });
        Ok(Box::new(lines))
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = cli.build_config()?;
    let builder = SitemapBuilder::new(config).context("invalid build config")?;

    if cli.reindex_gzips {
        let path = builder
            .reindex_existing_gzips()
            .context("reindex existing gzip files")?;
        info!("wrote {}", path.display());
        return Ok(());
    }

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("open input {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let mut source = JsonLines { reader };
    let report = builder.build_from(&mut source).context("sitemap build")?;

    info!(
        "wrote {} urls across {} parts; index {}",
        report.url_count,
        report.parts.len(),
        report.index_path.display()
    );
    for url in &report.part_urls {
        println!("{url}");
    }
    Ok(())
}
