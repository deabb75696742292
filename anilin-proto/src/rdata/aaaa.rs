//! `AAAA` RDATA definition.

use std::fmt::Display;
use std::net::Ipv6Addr;

use crate::error::{EncodeError, ParseError};
use crate::name::{Compressor, Decompressor};
use crate::{read_slice, RecordType};

use super::RdataType;

#[cfg(feature = "serde")]
use serde::Serialize;

/// An IPv6 host address record.
/// [\[RFC 3596\]](https://www.rfc-editor.org/rfc/rfc3596)
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct AAAA {
    /// The host's IPv6 address.
    pub addr: Ipv6Addr,
}

impl RdataType for AAAA {
    fn rtype(&self) -> RecordType {
        RecordType::AAAA
    }

    fn encoded_len(&self, _cmp: &Compressor) -> usize {
        16
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
        if rdlength != 16 {
            return Err(ParseError::RdataLength);
        }

        let (bytes, off) = read_slice(dec.buf, off, 16)?;
        let octets = <[u8; 16]>::try_from(bytes).map_err(|_| ParseError::RdataLength)?;
        Ok((Self { addr: Ipv6Addr::from(octets) }, off))
    }
}

impl Display for AAAA {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.addr)
    }
}
