use std::path::PathBuf;

use crate::catalog::CatalogError;
use crate::pattern::PatternError;
use crate::transfer::TransferError;

/// Why a target could not be synced.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("{source} for {}", .path.display())]
    Transfer {
        path: PathBuf,
        #[source]
        source: TransferError,
    },

    #[error("{source} for {}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not find any files on your system that match '{pattern}'")]
    NoLocalFiles { pattern: String },

    #[error("no remote locale matches the locale named by {}", .path.display())]
    UnknownLocale { path: PathBuf },
}

impl SyncError {
    /// The local file the error is attributed to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Transfer { path, .. }
            | Self::Filesystem { path, .. }
            | Self::UnknownLocale { path } => Some(path),
            Self::Pattern(_) | Self::Catalog(_) | Self::NoLocalFiles { .. } => None,
        }
    }
}
