//! Error types for the PDD solver
//!
//! The PDD API answers HTTP 200 even when it rejects a request, so two
//! failure axes exist: [`TransportError`] covers everything that went wrong
//! before a well-formed envelope was obtained, and [`Error::Provider`]
//! carries a rejection reported inside the body.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for solver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Provider API operation, used as error context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `GET /list`
    List,
    /// `POST /add`
    Create,
    /// `POST /edit`
    Update,
    /// `POST /del`
    Delete,
}

impl Operation {
    /// Endpoint path segment for this operation
    pub fn endpoint(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Create => "add",
            Operation::Update => "edit",
            Operation::Delete => "del",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Operation::List => "list DNS records",
            Operation::Create => "add DNS record",
            Operation::Update => "edit DNS record",
            Operation::Delete => "delete DNS record",
        };
        f.write_str(verb)
    }
}

/// Failure to obtain a well-formed API envelope
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request did not complete within the client timeout
    #[error("request timed out after {after:?}")]
    Timeout {
        /// Configured timeout that elapsed
        after: Duration,
    },

    /// Connection, TLS or body read failure
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// Any status other than 200
    #[error("unexpected HTTP status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The body was not a JSON envelope of the expected shape
    #[error("malformed response envelope: {0}")]
    MalformedEnvelope(String),
}

impl TransportError {
    /// Whether this failure was a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }
}

/// Core error type for the PDD solver
#[derive(Error, Debug)]
pub enum Error {
    /// The provider could not be reached or answered with garbage
    #[error("{operation} for {target} failed: {source}")]
    Transport {
        /// Operation that was attempted
        operation: Operation,
        /// Record or domain the operation addressed
        target: String,
        /// Underlying transport failure
        #[source]
        source: TransportError,
    },

    /// The provider rejected the request in the response body
    #[error("{operation} for {target} rejected by provider: '{message}'")]
    Provider {
        /// Operation that was attempted
        operation: Operation,
        /// Record or domain the operation addressed
        target: String,
        /// Provider-supplied error string
        message: String,
    },

    /// A credential (secret or key) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error annotated with the step that failed
    #[error("{context}: {source}")]
    Context {
        /// What was being done
        context: String,
        /// The failure
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a transport error with operation context
    pub fn transport(operation: Operation, target: impl Into<String>, source: TransportError) -> Self {
        Self::Transport {
            operation,
            target: target.into(),
            source,
        }
    }

    /// Create a provider rejection with operation context
    pub fn provider(
        operation: Operation,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            operation,
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Annotate this error with the step that failed
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through any context layers
    pub fn root(&self) -> &Error {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the provider could not be reached or answered with garbage
    pub fn is_transport(&self) -> bool {
        matches!(self.root(), Self::Transport { .. })
    }

    /// Whether the provider rejected the request in the response body
    pub fn is_provider(&self) -> bool {
        matches!(self.root(), Self::Provider { .. })
    }

    /// Whether the failure was a request timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), Self::Transport { source, .. } if source.is_timeout())
    }

    /// Whether a credential lookup came back empty
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Self::NotFound(_))
    }

    /// The operation this error is attributed to, if any
    pub fn operation(&self) -> Option<Operation> {
        match self.root() {
            Self::Transport { operation, .. } | Self::Provider { operation, .. } => {
                Some(*operation)
            }
            _ => None,
        }
    }
}
