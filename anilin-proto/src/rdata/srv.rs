//! `SRV` RDATA definition.

use std::fmt::Display;

use byteorder::{NetworkEndian, WriteBytesExt};

use crate::error::{EncodeError, ParseError};
use crate::name::{Compressor, Decompressor};
use crate::{read_u16, RecordType};

use super::RdataType;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A record specifying the location of the server(s) for a specific protocol
/// and domain.
/// [\[RFC 2782\]](https://www.rfc-editor.org/rfc/rfc2782)
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct SRV {
    /// The priority of this target host. Clients contact the target with the
    /// lowest-numbered priority they can reach.
    pub priority: u16,
    /// A relative weight for entries with the same priority.
    pub weight: u16,
    /// The port of this service on the target host.
    pub port: u16,
    /// The name of the target host. Must not be an alias.
    pub target: String,
}

impl RdataType for SRV {
    fn rtype(&self) -> RecordType {
        RecordType::SRV
    }

    fn encoded_len(&self, _cmp: &Compressor) -> usize {
        // the target is exempt from compression (RFC 2782)
        6 + Compressor::new(false, 0).length(&[&self.target])
    }

    fn pack(&self, mut buf: Vec<u8>, _cmp: &mut Compressor) -> Result<Vec<u8>, EncodeError> {
        buf.write_u16::<NetworkEndian>(self.priority)?;
        buf.write_u16::<NetworkEndian>(self.weight)?;
        buf.write_u16::<NetworkEndian>(self.port)?;
        Compressor::new(false, 0).pack(buf, &self.target)
    }

    fn unpack(
        dec: &Decompressor<'_>,
        off: usize,
        _rdlength: u16,
    ) -> Result<(Self, usize), ParseError> {
        let (priority, off) = read_u16(dec.buf, off)?;
        let (weight, off) = read_u16(dec.buf, off)?;
        let (port, off) = read_u16(dec.buf, off)?;
        let (target, off) = dec.unpack(off)?;

        Ok((Self { priority, weight, port, target }, off))
    }
}

impl Display for SRV {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.priority, self.weight, self.port, self.target
        )
    }
}
