//! `SOA` RDATA definition.

use std::fmt::Display;

use byteorder::{NetworkEndian, WriteBytesExt};

use crate::error::{EncodeError, ParseError};
use crate::name::{Compressor, Decompressor};
use crate::{read_u32, RecordType};

use super::RdataType;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A record that marks the start of a zone of authority.
/// [\[RFC 1035\]](https://www.rfc-editor.org/rfc/rfc1035)
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Default, Debug)]
pub struct SOA {
    /// The name server that was the original or primary source of data for
    /// this zone.
    pub mname: String,
    /// The mailbox of the person responsible for this zone.
    pub rname: String,
    /// The version number of the original copy of the zone. This value wraps
    /// and should be compared using sequence space arithmetic.
    pub serial: u32,
    /// The interval, in seconds, before the zone should be refreshed.
    pub refresh: u32,
    /// The interval, in seconds, before a failed refresh should be retried.
    pub retry: u32,
    /// The upper limit, in seconds, on the time that can elapse before the
    /// zone is no longer authoritative.
    pub expire: u32,
    /// The TTL, in seconds, for negative responses from this zone.
    /// [\[RFC 2308\]](https://www.rfc-editor.org/rfc/rfc2308)
    pub minimum: u32,
}

impl RdataType for SOA {
    fn rtype(&self) -> RecordType {
        RecordType::SOA
    }

    fn encoded_len(&self, cmp: &Compressor) -> usize {
        cmp.length(&[&self.mname, &self.rname]) + 20
    }

    fn pack(&self, buf: Vec<u8>, cmp: &mut Compressor) -> Result<Vec<u8>, EncodeError> {
        let buf = cmp.pack(buf, &self.mname)?;
        let mut buf = cmp.pack(buf, &self.rname)?;
        buf.write_u32::<NetworkEndian>(self.serial)?;
        buf.write_u32::<NetworkEndian>(self.refresh)?;
        buf.write_u32::<NetworkEndian>(self.retry)?;
        buf.write_u32::<NetworkEndian>(self.expire)?;
        buf.write_u32::<NetworkEndian>(self.minimum)?;
        Ok(buf)
    }

    fn unpack(
        dec: &Decompressor<'_>,
        off: usize,
        _rdlength: u16,
    ) -> Result<(Self, usize), ParseError> {
        let (mname, off) = dec.unpack(off)?;
        let (rname, off) = dec.unpack(off)?;
        let (serial, off) = read_u32(dec.buf, off)?;
        let (refresh, off) = read_u32(dec.buf, off)?;
        let (retry, off) = read_u32(dec.buf, off)?;
        let (expire, off) = read_u32(dec.buf, off)?;
        let (minimum, off) = read_u32(dec.buf, off)?;

        Ok((
            Self { mname, rname, serial, refresh, retry, expire, minimum },
            off,
        ))
    }
}

impl Display for SOA {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.mname, self.rname, self.serial, self.refresh, self.retry, self.expire, self.minimum
        )
    }
}
