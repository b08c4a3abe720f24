use std::path::PathBuf;

use thiserror::Error;

use crate::builder::BuildStage;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("io error at {}: {source}", .path.display())]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("xml error: {0}")]
    Xml(String),
    #[error("build failed while {stage}: {source}")]
    Stage {
        stage: BuildStage,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::IoAt {
            path: path.into(),
            source,
        }
    }

    /// The stage a build failed in, if this error came out of `SitemapBuilder`.
    pub fn stage(&self) -> Option<BuildStage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// True for any flavour of filesystem failure, including one wrapped by a build stage.
    pub fn is_io(&self) -> bool {
        match self {
            Error::Io(_) | Error::IoAt { .. } => true,
            Error::Stage { source, .. } => source.is_io(),
            _ => false,
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(value: quick_xml::Error) -> Self {
        match value {
            quick_xml::Error::Io(err) => Error::Io(std::io::Error::new(err.kind(), err.to_string())),
            other => Error::Xml(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
