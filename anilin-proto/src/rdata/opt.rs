//! `OPT` pseudo-record RDATA definition.

use std::fmt::Display;

use crate::edns::EdnsOption;
use crate::error::{EncodeError, ParseError};
use crate::name::{Compressor, Decompressor};
use crate::RecordType;

use super::RdataType;

#[cfg(feature = "serde")]
use serde::Serialize;

/// The RDATA of an EDNS(0) `OPT` pseudo-record.
/// [\[RFC 6891\]](https://www.rfc-editor.org/rfc/rfc6891)
///
/// The owner of an `OPT` record must be the root, and its class and TTL
/// fields are repurposed to carry the requestor's payload size and extended
/// header bits. This library carries those fields unchanged on the
/// containing [`Resource`][crate::Resource] and treats the options
/// themselves as opaque code/data pairs.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Default, Debug)]
pub struct OPT {
    /// The options carried in the RDATA, in wire order.
    pub options: Vec<EdnsOption>,
}

impl RdataType for OPT {
    fn rtype(&self) -> RecordType {
        RecordType::OPT
    }

    fn encoded_len(&self, _cmp: &Compressor) -> usize {
        self.options.iter().map(|opt| 4 + opt.data.len()).sum()
    }

    fn pack(&self, mut buf: Vec<u8>, _cmp: &mut Compressor) -> Result<Vec<u8>, EncodeError> {
        for opt in &self.options {
            buf = opt.pack(buf)?;
        }
        Ok(buf)
    }

    fn unpack(
        dec: &Decompressor<'_>,
        mut off: usize,
        rdlength: u16,
    ) -> Result<(Self, usize), ParseError> {
        let end = off + usize::from(rdlength);

        let mut options = Vec::new();
        while off < end {
            let (opt, next) = EdnsOption::unpack(dec.buf, off)?;
            if next > end {
                return Err(ParseError::RdataLength);
            }

            options.push(opt);
            off = next;
        }

        Ok((Self { options }, off))
    }
}

impl Display for OPT {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for opt in &self.options {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}", opt)?;
            first = false;
        }
        Ok(())
    }
}
