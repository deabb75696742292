//! `anilin-proto` provides the definition of the DNS protocol's data types as
//! well as the means to de-/serialize them from/to the RFC 1035 wire format.
//! In simpler terms, you can construct, encode, and decode DNS queries and
//! responses with it.
//!
//! It is the protocol backend for [`anilin`], a DNS client and server
//! library, but it can be used on its own as well.
//!
//! # Basic usage example
//! ```rust
//! use anilin_proto::{Class, Message, Question, RecordType};
//!
//! let msg = Message {
//!     id: 0x1234,
//!     recursion_desired: true,
//!     questions: vec![Question {
//!         qname: "example.com.".to_string(),
//!         qtype: RecordType::A,
//!         qclass: Class::IN,
//!     }],
//!     ..Default::default()
//! };
//!
//! let packed = msg.pack(Vec::new(), true).unwrap();
//! let (unpacked, rest) = Message::unpack(&packed).unwrap();
//! assert!(rest.is_empty());
//! assert_eq!(unpacked, msg);
//! ```
//!
//! # Usage note
//! Domain names are plain strings in fully-qualified form: every name ends
//! with a dot, and the DNS root is `"."` by itself. Names are validated at
//! pack time (label lengths, empty labels), not at construction time.
//!
//! [`anilin`]: https://docs.rs/anilin

use std::fmt::{self, Display};
use std::time::Duration;

use byteorder::{NetworkEndian, WriteBytesExt};
use repr_with_fallback::repr_with_fallback;

#[cfg(feature = "serde")]
use serde::Serialize;

pub mod edns;
pub mod error;
pub mod name;
pub mod rdata;

use error::{EncodeError, ParseError};
use name::{Compressor, Decompressor};

pub use rdata::Rdata;

/// The length of a DNS message header, in bytes.
pub const HEADER_LEN: usize = 12;

repr_with_fallback! {
    /// Represents a DNS TYPE.
    ///
    /// See the documentation in the [`rdata`] module for explanations of the
    /// recognized types. Unrecognized values are preserved in the `Unknown`
    /// variant.
    #[cfg_attr(feature = "serde", derive(Serialize))]
    #[derive(PartialEq, Eq, Copy, Clone, Hash, Debug)]
    #[non_exhaustive]
    pub enum RecordType {
        A = 1,
        NS = 2,
        CNAME = 5,
        SOA = 6,
        PTR = 12,
        MX = 15,
        TXT = 16,
        AAAA = 28,
        SRV = 33,
        OPT = 41,
        Unknown(u16),
    }
}

repr_with_fallback! {
    /// Represents a DNS CLASS.
    ///
    /// Classes other than `IN` exist only for completeness and historical
    /// reasons. Note that an [`OPT`][rdata::OPT] record repurposes the class
    /// field of its resource for the requestor's UDP payload size, so
    /// arbitrary values round-trip through `Unknown`.
    #[cfg_attr(feature = "serde", derive(Serialize))]
    #[derive(PartialEq, Eq, Copy, Clone, Hash, Debug)]
    #[non_exhaustive]
    pub enum Class {
        IN = 1,
        CH = 3,
        HS = 4,
        NONE = 254,
        ANY = 255,
        Unknown(u16),
    }
}

repr_with_fallback! {
    /// Represents a DNS OpCode.
    ///
    /// See [here](https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-5)
    /// for further information.
    #[cfg_attr(feature = "serde", derive(Serialize))]
    #[derive(PartialEq, Eq, Copy, Clone, Hash, Debug)]
    #[non_exhaustive]
    pub enum Opcode {
        Query = 0,
        IQuery = 1,
        Status = 2,
        Notify = 4,
        Update = 5,
        Unknown(u16),
    }
}

repr_with_fallback! {
    /// Represents a DNS RCODE.
    ///
    /// Only the four bits carried in the message header are modeled here;
    /// extended RCODE bits live in an [`OPT`][rdata::OPT] record and are
    /// carried opaquely.
    #[cfg_attr(feature = "serde", derive(Serialize))]
    #[derive(PartialEq, Eq, Copy, Clone, Hash, Debug)]
    #[non_exhaustive]
    pub enum RCode {
        NoError = 0,
        FormatError = 1,
        ServerFailure = 2,
        NXDomain = 3,
        NotImplemented = 4,
        Refused = 5,
        YXDomain = 6,
        YXRRSet = 7,
        NXRRSet = 8,
        NotAuth = 9,
        NotZone = 10,
        Unknown(u16),
    }
}

impl Default for Opcode {
    fn default() -> Self {
        Opcode::Query
    }
}

impl Default for RCode {
    fn default() -> Self {
        RCode::NoError
    }
}

impl Default for Class {
    fn default() -> Self {
        Class::IN
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::Unknown(x) => write!(f, "TYPE{}", x),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Class::Unknown(x) => write!(f, "CLASS{}", x),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Display for RCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Represents a DNS question, i.e. an entry in the question section of a DNS
/// message.
///
/// `Question` is a value type with equality and hashing, which makes it
/// usable as a lookup key (answer caches key on it).
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct Question {
    /// The fully-qualified name to query for.
    pub qname: String,
    /// The record type to query for.
    pub qtype: RecordType,
    /// The query class (almost always [`Class::IN`]).
    pub qclass: Class,
}

impl Question {
    /// Appends the wire encoding of the question to `buf`.
    pub fn pack(&self, buf: Vec<u8>, cmp: &mut Compressor) -> Result<Vec<u8>, EncodeError> {
        let mut buf = cmp.pack(buf, &self.qname)?;
        buf.write_u16::<NetworkEndian>(self.qtype.into())?;
        buf.write_u16::<NetworkEndian>(self.qclass.into())?;
        Ok(buf)
    }

    /// Parses a question starting at `off`, returning it together with the
    /// offset of the first byte past it.
    pub fn unpack(dec: &Decompressor<'_>, off: usize) -> Result<(Self, usize), ParseError> {
        let (qname, off) = dec.unpack(off)?;
        let (qtype, off) = read_u16(dec.buf, off)?;
        let (qclass, off) = read_u16(dec.buf, off)?;

        Ok((
            Question {
                qname,
                qtype: qtype.into(),
                qclass: qclass.into(),
            },
            off,
        ))
    }
}

impl Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.qname, self.qclass, self.qtype)
    }
}

/// Represents a DNS resource record, i.e. an entry in the answer, authority
/// or additional section of a DNS message.
///
/// The record's TYPE is derived from the [`Rdata`] variant and is not stored
/// separately.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Resource {
    /// The fully-qualified name this record is for.
    pub name: String,
    /// The record class (almost always [`Class::IN`]).
    pub class: Class,
    /// How long the record may be cached.
    pub ttl: Duration,
    /// The record data.
    pub rdata: Rdata,
}

impl Resource {
    /// Appends the wire encoding of the record to `buf`.
    ///
    /// The RDLENGTH field is computed with a non-mutating length probe
    /// against the compressor's current state; the dictionary is advanced by
    /// the RDATA write that follows.
    pub fn pack(&self, buf: Vec<u8>, cmp: &mut Compressor) -> Result<Vec<u8>, EncodeError> {
        let mut buf = cmp.pack(buf, &self.name)?;
        buf.write_u16::<NetworkEndian>(self.rdata.rtype().into())?;
        buf.write_u16::<NetworkEndian>(self.class.into())?;
        let ttl = u32::try_from(self.ttl.as_secs()).unwrap_or(u32::MAX);
        buf.write_u32::<NetworkEndian>(ttl)?;

        let rdlength = self.rdata.encoded_len(cmp);
        let rdlength =
            u16::try_from(rdlength).map_err(|_| EncodeError::OversizedRdata(rdlength))?;
        buf.write_u16::<NetworkEndian>(rdlength)?;

        let len_before = buf.len();
        let buf = self.rdata.pack(buf, cmp)?;
        debug_assert_eq!(buf.len() - len_before, usize::from(rdlength));

        Ok(buf)
    }

    /// Parses a record starting at `off`, returning it together with the
    /// offset of the first byte past its RDATA.
    pub fn unpack(dec: &Decompressor<'_>, off: usize) -> Result<(Self, usize), ParseError> {
        let (name, off) = dec.unpack(off)?;
        let (rtype, off) = read_u16(dec.buf, off)?;
        let (class, off) = read_u16(dec.buf, off)?;
        let (ttl, off) = read_u32(dec.buf, off)?;
        let (rdlength, off) = read_u16(dec.buf, off)?;

        let end = off + usize::from(rdlength);
        if end > dec.buf.len() {
            return Err(ParseError::RdataLength);
        }

        let (rdata, off) = Rdata::unpack(rtype.into(), dec, off, rdlength)?;
        if off != end {
            return Err(ParseError::RdataLength);
        }

        Ok((
            Resource {
                name,
                class: class.into(),
                ttl: Duration::from_secs(ttl.into()),
                rdata,
            },
            off,
        ))
    }
}

/// Represents a DNS message.
///
/// The header is stored flattened: the ID, the individual flag bits, and the
/// RCODE are fields; the per-section record counts are derived at pack time
/// from the section lengths.
///
/// See [RFC 1035](https://www.rfc-editor.org/rfc/rfc1035) for further
/// information.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Default, Debug)]
pub struct Message {
    /// Supplied by the questioner and reflected back unchanged by the
    /// responder.
    pub id: u16,
    /// False for queries, true for responses (the QR bit).
    pub response: bool,
    /// The kind of query.
    pub opcode: Opcode,
    /// Whether the responder is an authority for the queried zone (AA).
    pub authoritative: bool,
    /// Whether the message was shortened to fit the transport (TC).
    pub truncated: bool,
    /// Whether the questioner wants the server to recurse (RD).
    pub recursion_desired: bool,
    /// Whether the responder supports recursion (RA).
    pub recursion_available: bool,
    /// The response code; [`RCode::NoError`] in queries.
    pub rcode: RCode,
    /// The list of questions.
    pub questions: Vec<Question>,
    /// The records answering the questions.
    pub answers: Vec<Resource>,
    /// The records pointing toward an authority.
    pub authorities: Vec<Resource>,
    /// The records holding additional information.
    pub additionals: Vec<Resource>,
}

impl Message {
    /// Appends the wire encoding of the message to `buf` and returns the
    /// buffer.
    ///
    /// If `compress` is true, domain names are compressed with RFC 1035
    /// Section 4.1.4 pointers. The compression dictionary lives for exactly
    /// this one call; compressed output is never larger than expanded
    /// output.
    ///
    /// Passing a non-empty `buf` packs the message after the existing bytes
    /// (used by stream transports to reserve room for the length prefix);
    /// pointer offsets remain relative to the start of the message.
    pub fn pack(&self, mut buf: Vec<u8>, compress: bool) -> Result<Vec<u8>, EncodeError> {
        let mut cmp = Compressor::new(compress, buf.len());

        buf.write_u16::<NetworkEndian>(self.id)?;

        let opcode = (u16::from(self.opcode) as u8) & 0x0F;
        let rcode = (u16::from(self.rcode) as u8) & 0x0F;

        let mut b2 = opcode << 3;
        if self.response {
            b2 |= 1 << 7;
        }
        if self.authoritative {
            b2 |= 1 << 2;
        }
        if self.truncated {
            b2 |= 1 << 1;
        }
        if self.recursion_desired {
            b2 |= 1;
        }

        let mut b3 = rcode;
        if self.recursion_available {
            b3 |= 1 << 7;
        }

        buf.write_u8(b2)?;
        buf.write_u8(b3)?;

        buf.write_u16::<NetworkEndian>(section_count(self.questions.len())?)?;
        buf.write_u16::<NetworkEndian>(section_count(self.answers.len())?)?;
        buf.write_u16::<NetworkEndian>(section_count(self.authorities.len())?)?;
        buf.write_u16::<NetworkEndian>(section_count(self.additionals.len())?)?;

        for question in &self.questions {
            buf = question.pack(buf, &mut cmp)?;
        }
        for section in [&self.answers, &self.authorities, &self.additionals] {
            for resource in section {
                buf = resource.pack(buf, &mut cmp)?;
            }
        }

        Ok(buf)
    }

    /// Parses a message, returning it together with the remaining,
    /// unconsumed bytes of `buf`.
    pub fn unpack(buf: &[u8]) -> Result<(Self, &[u8]), ParseError> {
        let (msg, result) = Self::unpack_partial(buf);
        let off = result?;
        Ok((msg, &buf[off..]))
    }

    /// Parses as much of a message as `buf` holds.
    ///
    /// On success the result carries the offset of the first unconsumed
    /// byte. On failure the returned message still holds everything parsed
    /// before the error, which lets callers inspect the header (notably the
    /// truncation bit) and the leading records of a message that was cut
    /// short in flight.
    pub fn unpack_partial(buf: &[u8]) -> (Self, Result<usize, ParseError>) {
        let mut msg = Message::default();
        let result = msg.unpack_into(buf);
        (msg, result)
    }

    fn unpack_into(&mut self, buf: &[u8]) -> Result<usize, ParseError> {
        if buf.len() < HEADER_LEN {
            return Err(ParseError::UnexpectedEof);
        }

        let dec = Decompressor::new(buf);

        let (id, off) = read_u16(buf, 0)?;
        let (b2, off) = read_u8(buf, off)?;
        let (b3, off) = read_u8(buf, off)?;

        self.id = id;
        self.response = b2 & (1 << 7) != 0;
        self.opcode = u16::from((b2 >> 3) & 0x0F).into();
        self.authoritative = b2 & (1 << 2) != 0;
        self.truncated = b2 & (1 << 1) != 0;
        self.recursion_desired = b2 & 1 != 0;
        self.recursion_available = b3 & (1 << 7) != 0;
        self.rcode = u16::from(b3 & 0x0F).into();

        let (qdcount, off) = read_u16(buf, off)?;
        let (ancount, off) = read_u16(buf, off)?;
        let (nscount, off) = read_u16(buf, off)?;
        let (arcount, mut off) = read_u16(buf, off)?;

        for _ in 0..qdcount {
            let (question, next) = Question::unpack(&dec, off)?;
            self.questions.push(question);
            off = next;
        }
        for _ in 0..ancount {
            let (resource, next) = Resource::unpack(&dec, off)?;
            self.answers.push(resource);
            off = next;
        }
        for _ in 0..nscount {
            let (resource, next) = Resource::unpack(&dec, off)?;
            self.authorities.push(resource);
            off = next;
        }
        for _ in 0..arcount {
            let (resource, next) = Resource::unpack(&dec, off)?;
            self.additionals.push(resource);
            off = next;
        }

        Ok(off)
    }
}

fn section_count(len: usize) -> Result<u16, EncodeError> {
    u16::try_from(len).map_err(|_| EncodeError::TooManyRecords(len))
}

pub(crate) fn read_u8(buf: &[u8], off: usize) -> Result<(u8, usize), ParseError> {
    match buf.get(off) {
        Some(&b) => Ok((b, off + 1)),
        None => Err(ParseError::UnexpectedEof),
    }
}

pub(crate) fn read_u16(buf: &[u8], off: usize) -> Result<(u16, usize), ParseError> {
    match buf.get(off..off + 2) {
        Some(bytes) => Ok((u16::from_be_bytes([bytes[0], bytes[1]]), off + 2)),
        None => Err(ParseError::UnexpectedEof),
    }
}

pub(crate) fn read_u32(buf: &[u8], off: usize) -> Result<(u32, usize), ParseError> {
    match buf.get(off..off + 4) {
        Some(bytes) => Ok((
            u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            off + 4,
        )),
        None => Err(ParseError::UnexpectedEof),
    }
}

pub(crate) fn read_slice(buf: &[u8], off: usize, len: usize) -> Result<(&[u8], usize), ParseError> {
    match buf.get(off..off + len) {
        Some(bytes) => Ok((bytes, off + len)),
        None => Err(ParseError::UnexpectedEof),
    }
}
