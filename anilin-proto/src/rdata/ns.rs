//! `NS` RDATA definition.

use std::fmt::Display;

use crate::error::{EncodeError, ParseError};
use crate::name::{Compressor, Decompressor};
use crate::RecordType;

use super::RdataType;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A record naming an authoritative name server for the owner's zone.
/// [\[RFC 1035\]](https://www.rfc-editor.org/rfc/rfc1035)
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct NS {
    /// The name of the authoritative server.
    pub nsdname: String,
}

impl RdataType for NS {
    fn rtype(&self) -> RecordType {
        RecordType::NS
    }

    fn encoded_len(&self, cmp: &Compressor) -> usize {
        cmp.length(&[&self.nsdname])
    }

    fn pack(&self, buf: Vec<u8>, cmp: &mut Compressor) -> Result<Vec<u8>, EncodeError> {
        cmp.pack(buf, &self.nsdname)
    }

    fn unpack(
        dec: &Decompressor<'_>,
        off: usize,
        _rdlength: u16,
    ) -> Result<(Self, usize), ParseError> {
        let (nsdname, off) = dec.unpack(off)?;
        Ok((Self { nsdname }, off))
    }
}

impl Display for NS {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.nsdname)
    }
}
