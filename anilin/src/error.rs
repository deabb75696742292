//! Custom error type definitions.

use anilin_proto::error::{EncodeError, ParseError};
use anilin_proto::Message;
use thiserror::Error;

/// Errors surfaced by the client, server, and transport layers.
#[derive(Debug, Error)]
pub enum Error {
    /// A query was longer than the transport's maximum message size.
    #[error("oversized query")]
    OversizedQuery,

    /// A response was longer than the transport's maximum message size.
    #[error("oversized message")]
    OversizedMessage,

    /// A response arrived with the truncation bit set. The partial message
    /// is carried so callers can inspect what did arrive (and retry over a
    /// stream transport).
    #[error("truncated message")]
    Truncated(Box<Message>),

    /// The address named a network this library cannot dial.
    #[error("unsupported network")]
    UnsupportedNetwork,

    /// The operation is not available on this writer, e.g. recursing on a
    /// writer with no upstream transport.
    #[error("unsupported operation")]
    UnsupportedOp,

    /// `reply` was called twice on the same writer.
    #[error("reply already sent")]
    AlreadyReplied,

    /// The context deadline passed before the operation completed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The connection backing a session failed; all of the session's pending
    /// queries observe this error.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// A nameserver selector had no entry for the dialed network.
    #[error("no nameservers for network: {0}")]
    NoNameservers(String),

    /// The TLS server name was not a valid DNS name or IP address.
    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
