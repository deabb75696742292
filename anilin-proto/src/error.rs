//! Custom error type definitions.

use thiserror::Error;

/// Errors that may arise while packing a message into the wire format.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Invalid name: contains an empty label.")]
    EmptyLabel,

    #[error("Invalid label length in name: must be at most 63, is {0}.")]
    LabelTooLong(usize),

    #[error("Compression pointer offset out of range: must fit in 14 bits, is {0}.")]
    InvalidPointer(usize),

    #[error("Too many records in section: must be at most 65535, is {0}.")]
    TooManyRecords(usize),

    #[error("RDATA too long: must be at most 65535 bytes, is {0}.")]
    OversizedRdata(usize),

    #[error("Character string too long: must be at most 255 bytes, is {0}.")]
    StringTooLong(usize),

    #[error("IO error.")]
    Io(#[from] std::io::Error),
}

/// Errors that may arise while parsing a message from the wire format.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Message ended unexpectedly.")]
    UnexpectedEof,

    #[error("Length field runs past the end of the message.")]
    FieldOverrun,

    #[error("Invalid compression pointer at offset {0}.")]
    InvalidPointer(usize),

    #[error("Compression pointer cycle via offset {0}.")]
    PointerCycle(usize),

    #[error("Invalid name length: must be at most 255 bytes, is {0}.")]
    NameTooLong(usize),

    #[error("RDATA length does not match the record contents.")]
    RdataLength,
}
