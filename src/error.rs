// Error taxonomy for the pinning client.
//
// Every variant is terminal: the pipeline surfaces the first failure and
// stops. Variants carry enough context to tell which stage failed.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PinataError>;

#[derive(Error, Debug)]
pub enum PinataError {
    /// No token in the credential store
    #[error("JWT not found. Please authorize first using the 'auth' command")]
    CredentialMissing,

    /// The credential store exists but could not be read or written
    #[error("Credential store error at {path}: {source}")]
    CredentialIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File or folder does not exist: {path}")]
    TargetNotFound { path: PathBuf },

    #[error("Failed to walk {path}: {source}")]
    Traversal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode form field: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("Failed to send the request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned an error {status}")]
    RemoteRejected { status: u16 },

    #[error("Failed to decode server response: {0}")]
    Decoding(#[source] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl PinataError {
    /// Status code of a rejected request, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            PinataError::RemoteRejected { status } => Some(*status),
            _ => None,
        }
    }
}
