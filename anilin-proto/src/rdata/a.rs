//! `A` RDATA definition.

use std::fmt::Display;
use std::net::Ipv4Addr;

use crate::error::{EncodeError, ParseError};
use crate::name::{Compressor, Decompressor};
use crate::{read_slice, RecordType};

use super::RdataType;

#[cfg(feature = "serde")]
use serde::Serialize;

/// An IPv4 host address record.
/// [\[RFC 1035\]](https://www.rfc-editor.org/rfc/rfc1035)
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct A {
    /// The host's IPv4 address.
    pub addr: Ipv4Addr,
}

impl RdataType for A {
    fn rtype(&self) -> RecordType {
        RecordType::A
    }

    fn encoded_len(&self, _cmp: &Compressor) -> usize {
        4
    }

    fn pack(&self, mut buf: Vec<u8>, _cmp: &mut Compressor) -> Result<Vec<u8>, EncodeError> {
        buf.extend_from_slice(&self.addr.octets());
        Ok(buf)
    }

    fn unpack(
        dec: &Decompressor<'_>,
        off: usize,
        rdlength: u16,
    ) -> Result<(Self, usize), ParseError> {
        if rdlength != 4 {
            return Err(ParseError::RdataLength);
        }

        let (octets, off) = read_slice(dec.buf, off, 4)?;
        let addr = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
        Ok((Self { addr }, off))
    }
}

impl Display for A {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.addr)
    }
}
