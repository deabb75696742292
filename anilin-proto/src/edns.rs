//! EDNS(0) option carriage.
//!
//! Options are carried as opaque code/data pairs inside the RDATA of an
//! [`OPT`][crate::rdata::OPT] pseudo-record. This library does not interpret
//! option contents; it only preserves them across a round trip.
//!
//! See [RFC 6891](https://www.rfc-editor.org/rfc/rfc6891) and the
//! [IANA registry](https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-11)
//! for further information.

use std::fmt::{self, Display};

use byteorder::{NetworkEndian, WriteBytesExt};
use repr_with_fallback::repr_with_fallback;

use crate::error::{EncodeError, ParseError};
use crate::{read_slice, read_u16};

#[cfg(feature = "serde")]
use serde::Serialize;

repr_with_fallback! {
    /// An EDNS option code.
    #[cfg_attr(feature = "serde", derive(Serialize))]
    #[derive(PartialEq, Eq, Copy, Clone, Hash, Debug)]
    #[non_exhaustive]
    pub enum OptionCode {
        NSID = 3,
        Cookie = 10,
        TcpKeepalive = 11,
        Padding = 12,
        Unknown(u16),
    }
}

/// A single EDNS option.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct EdnsOption {
    /// The option code.
    pub code: OptionCode,
    /// The option data, opaque to this library.
    pub data: Vec<u8>,
}

impl EdnsOption {
    /// Appends the wire encoding of the option to `buf`.
    ///
    /// # Examples
    /// ```rust
    /// use anilin_proto::edns::{EdnsOption, OptionCode};
    ///
    /// let opt = EdnsOption {
    ///     code: OptionCode::Cookie,
    ///     data: vec![0, 1, 2, 3, 4, 5, 6, 7],
    /// };
    /// let buf = opt.pack(Vec::new()).unwrap();
    /// assert_eq!(buf, [0, 10, 0, 8, 0, 1, 2, 3, 4, 5, 6, 7]);
    /// ```
    pub fn pack(&self, mut buf: Vec<u8>) -> Result<Vec<u8>, EncodeError> {
        if self.data.len() > usize::from(u16::MAX) {
            return Err(EncodeError::OversizedRdata(self.data.len()));
        }

        buf.write_u16::<NetworkEndian>(self.code.into())?;
        buf.write_u16::<NetworkEndian>(self.data.len() as u16)?;
        buf.extend_from_slice(&self.data);
        Ok(buf)
    }

    /// Parses one option starting at `off`, returning it together with the
    /// offset of the first byte past its data.
    pub fn unpack(buf: &[u8], off: usize) -> Result<(Self, usize), ParseError> {
        let (code, off) = read_u16(buf, off)?;
        let (len, off) = read_u16(buf, off)?;
        let (data, off) = read_slice(buf, off, usize::from(len))?;

        Ok((
            Self {
                code: code.into(),
                data: data.to_vec(),
            },
            off,
        ))
    }
}

impl Display for OptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionCode::Unknown(x) => write!(f, "OPT{}", x),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl Display for EdnsOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} bytes", self.code, self.data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_pack_unpack() {
        let tests = [
            // client cookie to an unknown server
            EdnsOption {
                code: OptionCode::Cookie,
                data: vec![0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07],
            },
            // client cookie to a known server
            EdnsOption {
                code: OptionCode::Cookie,
                data: (0u8..24).collect(),
            },
            EdnsOption {
                code: OptionCode::Unknown(0xFDE9),
                data: b"local use".to_vec(),
            },
        ];

        for opt in tests {
            let raw = opt.pack(Vec::new()).unwrap();
            assert_eq!(raw.len(), 4 + opt.data.len());

            let (unpacked, off) = EdnsOption::unpack(&raw, 0).unwrap();
            assert_eq!(off, raw.len(), "left-over data after unpack");
            assert_eq!(unpacked, opt);
        }
    }
}
