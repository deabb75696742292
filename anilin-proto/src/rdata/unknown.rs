//! Opaque RDATA for unrecognized record types.

use std::fmt::Display;

use crate::error::{EncodeError, ParseError};
use crate::name::Decompressor;
use crate::{read_slice, RecordType};

#[cfg(feature = "serde")]
use serde::Serialize;

/// A record of a TYPE this library does not recognize.
///
/// The raw RDATA bytes are carried unchanged so that unpacking and repacking
/// a message preserves records of any type.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Unknown {
    /// The TYPE value from the wire.
    pub rtype: RecordType,
    /// The raw RDATA bytes.
    pub data: Vec<u8>,
}

impl Unknown {
    pub(crate) fn pack(&self, mut buf: Vec<u8>) -> Result<Vec<u8>, EncodeError> {
        buf.extend_from_slice(&self.data);
        Ok(buf)
    }

    pub(crate) fn unpack(
        rtype: RecordType,
        dec: &Decompressor<'_>,
        off: usize,
        rdlength: u16,
    ) -> Result<(Self, usize), ParseError> {
        let (data, off) = read_slice(dec.buf, off, usize::from(rdlength))?;
        Ok((Self { rtype, data: data.to_vec() }, off))
    }
}

impl Display for Unknown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\\# {}", self.data.len())?;
        if !self.data.is_empty() {
            write!(f, " ")?;
            for b in &self.data {
                write!(f, "{:02x}", b)?;
            }
        }
        Ok(())
    }
}
