use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("run gate denied this machine")]
    GateDenied,
    #[error("run policy unavailable: {0}")]
    NetworkUnavailable(String),
    #[error("{path} is not valid UTF-8 text")]
    Decode { path: PathBuf },
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(feature = "remote-gate")]
impl From<reqwest::Error> for ConvertError {
    fn from(err: reqwest::Error) -> Self {
        ConvertError::NetworkUnavailable(err.to_string())
    }
}

#[cfg(feature = "remote-gate")]
impl From<url::ParseError> for ConvertError {
    fn from(err: url::ParseError) -> Self {
        ConvertError::NetworkUnavailable(format!("invalid policy url: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
