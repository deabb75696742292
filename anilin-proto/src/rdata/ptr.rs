//! `PTR` RDATA definition.

use std::fmt::Display;

use crate::error::{EncodeError, ParseError};
use crate::name::{Compressor, Decompressor};
use crate::RecordType;

use super::RdataType;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A pointer to another part of the domain name space, most commonly used
/// for reverse address lookups under `in-addr.arpa.` and `ip6.arpa.`.
/// [\[RFC 1035\]](https://www.rfc-editor.org/rfc/rfc1035)
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct PTR {
    /// The name the owner points at.
    pub ptrdname: String,
}

impl RdataType for PTR {
    fn rtype(&self) -> RecordType {
        RecordType::PTR
    }

    fn encoded_len(&self, cmp: &Compressor) -> usize {
        cmp.length(&[&self.ptrdname])
    }

    fn pack(&self, buf: Vec<u8>, cmp: &mut Compressor) -> Result<Vec<u8>, EncodeError> {
        cmp.pack(buf, &self.ptrdname)
    }

    fn unpack(
        dec: &Decompressor<'_>,
        off: usize,
        _rdlength: u16,
    ) -> Result<(Self, usize), ParseError> {
        let (ptrdname, off) = dec.unpack(off)?;
        Ok((Self { ptrdname }, off))
    }
}

impl Display for PTR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ptrdname)
    }
}
