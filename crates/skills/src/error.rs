use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Walkdir(#[from] walkdir::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Regex(#[from] regex::Error),
    #[error("failed to fetch {source_name}: {reason}")]
    Fetch { source_name: String, reason: String },
    #[error("invalid skill source '{0}': expected 'owner/repo' or GitHub URL")]
    InvalidSource(String),
    #[error("invalid skill identifier '{0}'")]
    InvalidIdentifier(String),
    #[error("{what} not found: {path}")]
    NotFound { what: String, path: PathBuf },
    #[error("skills directory '{subtree}' not found in snapshot")]
    MissingSubtree { subtree: String },
    #[error("no skill files found in {}", .0.display())]
    EmptySnapshot(PathBuf),
    #[error("archive contains unsafe entry: {0}")]
    UnsafeArchive(String),
    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            what: what.into(),
            path: path.into(),
        }
    }

    /// True for the "no such skill / file / directory" family of errors.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
