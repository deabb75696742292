//! `CNAME` RDATA definition.

use std::fmt::Display;

use crate::error::{EncodeError, ParseError};
use crate::name::{Compressor, Decompressor};
use crate::RecordType;

use super::RdataType;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A record that identifies the canonical name of an alias.
/// [\[RFC 1035\]](https://www.rfc-editor.org/rfc/rfc1035)
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct CNAME {
    /// The canonical name the owner is an alias for.
    pub cname: String,
}

impl RdataType for CNAME {
    fn rtype(&self) -> RecordType {
        RecordType::CNAME
    }

    fn encoded_len(&self, cmp: &Compressor) -> usize {
        cmp.length(&[&self.cname])
    }

    fn pack(&self, buf: Vec<u8>, cmp: &mut Compressor) -> Result<Vec<u8>, EncodeError> {
        cmp.pack(buf, &self.cname)
    }

    fn unpack(
        dec: &Decompressor<'_>,
        off: usize,
        _rdlength: u16,
    ) -> Result<(Self, usize), ParseError> {
        let (cname, off) = dec.unpack(off)?;
        Ok((Self { cname }, off))
    }
}

impl Display for CNAME {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cname)
    }
}
