use std::io;
use std::path::PathBuf;

use rinth_model::{InvalidLiteralError, WireError};

use crate::transport::TransportError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    InvalidLiteral(#[from] InvalidLiteralError),

    #[error("The Modrinth API returned a response that could not be decoded")]
    MalformedResponse(#[source] WireError),

    #[error("Failed to encode the request")]
    EncodeRequest(#[source] WireError),

    #[error("Authorization is required to {action}, but no token is available")]
    MissingAuthorization { action: &'static str },

    #[error("The provided token was refused by the Modrinth API (status {status})")]
    Unauthorized { status: u16, body: String },

    #[error("Could not find {what}")]
    NotFound { what: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("The Modrinth API responded with status {status}: {body}")]
    Server { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("An I/O error occurred, path at fault: {path:?}")]
    Io { source: io::Error, path: PathBuf },
}

impl Error {
    pub const fn io(source: io::Error, path: PathBuf) -> Self {
        Self::Io { source, path }
    }

    /// Maps a non-2xx status to its error kind.
    pub(crate) fn from_status(status: u16, body: String, what: impl FnOnce() -> String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status, body },
            404 => Self::NotFound { what: what() },
            _ => Self::Server { status, body },
        }
    }
}

/// Decoding failures blame the server, encoding failures blame the request.
impl From<WireError> for Error {
    fn from(error: WireError) -> Self {
        match error {
            WireError::Malformed { .. } => Self::MalformedResponse(error),
            WireError::Encode { .. } => Self::EncodeRequest(error),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
