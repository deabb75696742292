//! `TXT` RDATA definition.

use std::fmt::Display;

use crate::error::{EncodeError, ParseError};
use crate::name::{Compressor, Decompressor};
use crate::{read_slice, read_u8, RecordType};

use super::RdataType;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A record holding descriptive text.
/// [\[RFC 1035\]](https://www.rfc-editor.org/rfc/rfc1035)
///
/// On the wire the RDATA is one or more character strings, each prefixed
/// with its one-byte length and at most 255 bytes long.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct TXT {
    /// The character strings, in wire order.
    pub strings: Vec<String>,
}

impl RdataType for TXT {
    fn rtype(&self) -> RecordType {
        RecordType::TXT
    }

    fn encoded_len(&self, _cmp: &Compressor) -> usize {
        self.strings.iter().map(|s| 1 + s.len()).sum()
    }

    fn pack(&self, mut buf: Vec<u8>, _cmp: &mut Compressor) -> Result<Vec<u8>, EncodeError> {
        for s in &self.strings {
            if s.len() > 255 {
                return Err(EncodeError::StringTooLong(s.len()));
            }

            buf.push(s.len() as u8);
            buf.extend_from_slice(s.as_bytes());
        }
        Ok(buf)
    }

    fn unpack(
        dec: &Decompressor<'_>,
        mut off: usize,
        rdlength: u16,
    ) -> Result<(Self, usize), ParseError> {
        let end = off + usize::from(rdlength);

        let mut strings = Vec::new();
        while off < end {
            let (len, next) = read_u8(dec.buf, off)?;
            let (bytes, next) = read_slice(dec.buf, next, usize::from(len))?;
            if next > end {
                return Err(ParseError::RdataLength);
            }

            strings.push(String::from_utf8_lossy(bytes).into_owned());
            off = next;
        }

        Ok((Self { strings }, off))
    }
}

impl Display for TXT {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for s in &self.strings {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "\"{}\"", s)?;
            first = false;
        }
        Ok(())
    }
}
