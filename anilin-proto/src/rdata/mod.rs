//! RDATA type definitions.

use std::fmt::{self, Display};

use crate::error::{EncodeError, ParseError};
use crate::name::{Compressor, Decompressor};
use crate::RecordType;

#[cfg(feature = "serde")]
use serde::Serialize;

pub mod a;
pub mod aaaa;
pub mod cname;
pub mod mx;
pub mod ns;
pub mod opt;
pub mod ptr;
pub mod soa;
pub mod srv;
pub mod txt;
pub mod unknown;

pub use a::A;
pub use aaaa::AAAA;
pub use cname::CNAME;
pub use mx::MX;
pub use ns::NS;
pub use opt::OPT;
pub use ptr::PTR;
pub use soa::SOA;
pub use srv::SRV;
pub use txt::TXT;
pub use unknown::Unknown;

/// The record data (RDATA) for a [`Resource`][crate::Resource].
///
/// One variant per recognized record type; anything else is carried opaquely
/// as [`Unknown`] so that unrecognized records survive a round trip.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
#[non_exhaustive]
pub enum Rdata {
    A(A),
    NS(NS),
    CNAME(CNAME),
    SOA(SOA),
    PTR(PTR),
    MX(MX),
    TXT(TXT),
    AAAA(AAAA),
    SRV(SRV),
    OPT(OPT),
    Unknown(Unknown),
}

/// A trait for working with the different RDATA variants.
pub trait RdataType: Sized {
    /// The TYPE value identifying this RDATA on the wire.
    fn rtype(&self) -> RecordType;

    /// Returns the number of bytes [`pack`][Self::pack] would write under the
    /// compressor's current dictionary state, without modifying it.
    ///
    /// This fills the RDLENGTH field, which precedes the RDATA on the wire;
    /// the dictionary is only advanced by the body write that follows.
    fn encoded_len(&self, cmp: &Compressor) -> usize;

    /// Appends the RDATA wire encoding to `buf`.
    fn pack(&self, buf: Vec<u8>, cmp: &mut Compressor) -> Result<Vec<u8>, EncodeError>;

    /// Parses RDATA spanning `rdlength` bytes starting at `off`. Returns the
    /// parsed value and the offset of the first byte past the RDATA.
    fn unpack(
        dec: &Decompressor<'_>,
        off: usize,
        rdlength: u16,
    ) -> Result<(Self, usize), ParseError>;
}

impl Rdata {
    /// The TYPE value identifying this RDATA on the wire.
    pub fn rtype(&self) -> RecordType {
        match self {
            Rdata::A(rd) => rd.rtype(),
            Rdata::NS(rd) => rd.rtype(),
            Rdata::CNAME(rd) => rd.rtype(),
            Rdata::SOA(rd) => rd.rtype(),
            Rdata::PTR(rd) => rd.rtype(),
            Rdata::MX(rd) => rd.rtype(),
            Rdata::TXT(rd) => rd.rtype(),
            Rdata::AAAA(rd) => rd.rtype(),
            Rdata::SRV(rd) => rd.rtype(),
            Rdata::OPT(rd) => rd.rtype(),
            Rdata::Unknown(rd) => rd.rtype,
        }
    }

    /// See [`RdataType::encoded_len`].
    pub fn encoded_len(&self, cmp: &Compressor) -> usize {
        match self {
            Rdata::A(rd) => rd.encoded_len(cmp),
            Rdata::NS(rd) => rd.encoded_len(cmp),
            Rdata::CNAME(rd) => rd.encoded_len(cmp),
            Rdata::SOA(rd) => rd.encoded_len(cmp),
            Rdata::PTR(rd) => rd.encoded_len(cmp),
            Rdata::MX(rd) => rd.encoded_len(cmp),
            Rdata::TXT(rd) => rd.encoded_len(cmp),
            Rdata::AAAA(rd) => rd.encoded_len(cmp),
            Rdata::SRV(rd) => rd.encoded_len(cmp),
            Rdata::OPT(rd) => rd.encoded_len(cmp),
            Rdata::Unknown(rd) => rd.data.len(),
        }
    }

    /// See [`RdataType::pack`].
    pub fn pack(&self, buf: Vec<u8>, cmp: &mut Compressor) -> Result<Vec<u8>, EncodeError> {
        match self {
            Rdata::A(rd) => rd.pack(buf, cmp),
            Rdata::NS(rd) => rd.pack(buf, cmp),
            Rdata::CNAME(rd) => rd.pack(buf, cmp),
            Rdata::SOA(rd) => rd.pack(buf, cmp),
            Rdata::PTR(rd) => rd.pack(buf, cmp),
            Rdata::MX(rd) => rd.pack(buf, cmp),
            Rdata::TXT(rd) => rd.pack(buf, cmp),
            Rdata::AAAA(rd) => rd.pack(buf, cmp),
            Rdata::SRV(rd) => rd.pack(buf, cmp),
            Rdata::OPT(rd) => rd.pack(buf, cmp),
            Rdata::Unknown(rd) => rd.pack(buf),
        }
    }

    /// Parses the RDATA of a record of type `rtype`, dispatching to the
    /// matching variant. Unrecognized types become [`Rdata::Unknown`].
    pub fn unpack(
        rtype: RecordType,
        dec: &Decompressor<'_>,
        off: usize,
        rdlength: u16,
    ) -> Result<(Self, usize), ParseError> {
        match rtype {
            RecordType::A => A::unpack(dec, off, rdlength).map(|(rd, o)| (Rdata::A(rd), o)),
            RecordType::NS => NS::unpack(dec, off, rdlength).map(|(rd, o)| (Rdata::NS(rd), o)),
            RecordType::CNAME => {
                CNAME::unpack(dec, off, rdlength).map(|(rd, o)| (Rdata::CNAME(rd), o))
            }
            RecordType::SOA => SOA::unpack(dec, off, rdlength).map(|(rd, o)| (Rdata::SOA(rd), o)),
            RecordType::PTR => PTR::unpack(dec, off, rdlength).map(|(rd, o)| (Rdata::PTR(rd), o)),
            RecordType::MX => MX::unpack(dec, off, rdlength).map(|(rd, o)| (Rdata::MX(rd), o)),
            RecordType::TXT => TXT::unpack(dec, off, rdlength).map(|(rd, o)| (Rdata::TXT(rd), o)),
            RecordType::AAAA => {
                AAAA::unpack(dec, off, rdlength).map(|(rd, o)| (Rdata::AAAA(rd), o))
            }
            RecordType::SRV => SRV::unpack(dec, off, rdlength).map(|(rd, o)| (Rdata::SRV(rd), o)),
            RecordType::OPT => OPT::unpack(dec, off, rdlength).map(|(rd, o)| (Rdata::OPT(rd), o)),
            rtype => {
                Unknown::unpack(rtype, dec, off, rdlength).map(|(rd, o)| (Rdata::Unknown(rd), o))
            }
        }
    }
}

impl Display for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rdata::A(rd) => rd.fmt(f),
            Rdata::NS(rd) => rd.fmt(f),
            Rdata::CNAME(rd) => rd.fmt(f),
            Rdata::SOA(rd) => rd.fmt(f),
            Rdata::PTR(rd) => rd.fmt(f),
            Rdata::MX(rd) => rd.fmt(f),
            Rdata::TXT(rd) => rd.fmt(f),
            Rdata::AAAA(rd) => rd.fmt(f),
            Rdata::SRV(rd) => rd.fmt(f),
            Rdata::OPT(rd) => rd.fmt(f),
            Rdata::Unknown(rd) => rd.fmt(f),
        }
    }
}
