use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not read transactions file {}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("could not read account translation file {}", path.display())]
    TranslationFile {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("could not write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Domain(#[from] crate::domain::error::Error),
}

impl Error {
    pub(crate) fn write(path: impl Into<PathBuf>, source: impl Into<csv::Error>) -> Self {
        Error::Write {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
