//! `MX` RDATA definition.

use std::fmt::Display;

use byteorder::{NetworkEndian, WriteBytesExt};

use crate::error::{EncodeError, ParseError};
use crate::name::{Compressor, Decompressor};
use crate::{read_u16, RecordType};

use super::RdataType;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A record naming a mail exchange willing to accept mail for the owner.
/// [\[RFC 1035\]](https://www.rfc-editor.org/rfc/rfc1035)
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MX {
    /// The preference given to this record among others at the same owner.
    /// Lower values are preferred.
    pub preference: u16,
    /// The name of the host acting as mail exchange.
    pub exchange: String,
}

impl RdataType for MX {
    fn rtype(&self) -> RecordType {
        RecordType::MX
    }

    fn encoded_len(&self, cmp: &Compressor) -> usize {
        2 + cmp.length(&[&self.exchange])
    }

    fn pack(&self, mut buf: Vec<u8>, cmp: &mut Compressor) -> Result<Vec<u8>, EncodeError> {
        buf.write_u16::<NetworkEndian>(self.preference)?;
        cmp.pack(buf, &self.exchange)
    }

    fn unpack(
        dec: &Decompressor<'_>,
        off: usize,
        _rdlength: u16,
    ) -> Result<(Self, usize), ParseError> {
        let (preference, off) = read_u16(dec.buf, off)?;
        let (exchange, off) = dec.unpack(off)?;
        Ok((Self { preference, exchange }, off))
    }
}

impl Display for MX {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange)
    }
}
