use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while building an element tree from XML text
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("syntax error: {0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("unbalanced markup: {0}")]
    Unbalanced(String),

    #[error("document has no root element")]
    NoRootElement,

    #[error("parse deadline exceeded")]
    DeadlineExceeded,
}

/// Failure on a single document. For transcripts this is recoverable: the
/// scanner logs it and skips the document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: XmlError,
    },

    #[error("worker for {} did not complete: {message}", .path.display())]
    Worker { path: PathBuf, message: String },
}

impl DocumentError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::Worker { path, .. } => path,
        }
    }
}

/// Which registry a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    Speakers,
    Taxonomy,
    Organizations,
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Speakers => "speaker",
            Self::Taxonomy => "taxonomy",
            Self::Organizations => "organization",
        };
        f.write_str(label)
    }
}

/// Registry failures are fatal: the pipeline cannot run without all three.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{kind} registry failed to load: {source}")]
    Document {
        kind: RegistryKind,
        #[source]
        source: DocumentError,
    },

    #[error("no {kind} document found under {}", .root.display())]
    NotFound { kind: RegistryKind, root: PathBuf },

    #[error("invalid search pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
