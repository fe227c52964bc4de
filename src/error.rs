use crate::http::Status;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for the server
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Error accepting connection: {0}")]
    Accept(#[source] io::Error),

    #[error("Invalid request line: {0:?}")]
    MalformedRequestLine(String),

    #[error("Connection closed before the header block ended")]
    IncompleteHeaders,

    #[error("Request head exceeds {0} bytes")]
    HeadersTooLarge(usize),

    #[error("Connection closed before a request was sent")]
    ConnectionClosed,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Access outside the serving directory: {0}")]
    Forbidden(String),

    #[error("Could not read metadata of {name}: {source}")]
    FileStat {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Could not create {name}: {source}")]
    FileCreate {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("File transfer failed for {name}: {source}")]
    FileIo {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Missing or invalid Content-Length")]
    MissingOrInvalidContentLength,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ServerError {
    /// The status a handler answers with when it recovers from this error.
    ///
    /// Returns `None` for errors that abort the connection without a response.
    pub fn status(&self) -> Option<Status> {
        match self {
            ServerError::FileNotFound(_) => Some(Status::NotFound),
            ServerError::Forbidden(_) => Some(Status::Forbidden),
            ServerError::MissingOrInvalidContentLength => Some(Status::BadRequest),
            ServerError::FileStat { .. }
            | ServerError::FileCreate { .. }
            | ServerError::FileIo { .. } => Some(Status::InternalServerError),
            _ => None,
        }
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
