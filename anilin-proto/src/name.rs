//! Packing and unpacking of domain names, including RFC 1035 Section 4.1.4
//! message compression.
//!
//! Domain names are kept as strings in fully-qualified form, terminated with
//! a trailing `"."`. The DNS root is `"."` on its own; both `"."` and `""`
//! encode to a single zero byte.

use std::collections::{HashMap, HashSet};

use crate::error::{EncodeError, ParseError};

/// Maximum length of a single label, in bytes.
pub const MAX_LABEL_LEN: usize = 63;

/// Maximum length of a domain name in its string form, in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// Encodes domain names into a message buffer, optionally applying message
/// compression.
///
/// The dictionary maps every name suffix written so far to its offset within
/// the message; a later occurrence of the same suffix is emitted as a two-byte
/// pointer (`0xC000 | offset`). A `Compressor` is only valid for a single
/// message: offsets are relative to `base`, the buffer position where the
/// message header starts.
///
/// # Examples
/// ```rust
/// use anilin_proto::name::Compressor;
///
/// let mut c = Compressor::new(false, 0);
/// let buf = c.pack(Vec::new(), "example.com.").unwrap();
/// assert_eq!(buf, b"\x07example\x03com\0");
/// ```
pub struct Compressor {
    table: Option<HashMap<String, usize>>,
    base: usize,
}

impl Compressor {
    /// Creates a compressor for a message whose header starts at offset
    /// `base` of the target buffer. If `compress` is false, names are always
    /// written in expanded form.
    pub fn new(compress: bool, base: usize) -> Self {
        Self {
            table: compress.then(HashMap::new),
            base,
        }
    }

    /// Returns the number of bytes `pack` would write for the given names,
    /// in order, under the current dictionary state.
    ///
    /// The dictionary is not modified; suffixes that packing the earlier
    /// names would insert are tracked in a transient overlay so that repeated
    /// suffixes within one call count as pointers. This is what allows
    /// RDLENGTH to be computed before the RDATA itself is written.
    pub fn length(&self, names: &[&str]) -> usize {
        let mut visited = self.table.as_ref().map(|_| HashSet::new());

        names.iter().map(|n| self.name_len(n, &mut visited)).sum()
    }

    fn name_len(&self, name: &str, visited: &mut Option<HashSet<String>>) -> usize {
        if name == "." || name.is_empty() {
            return 1;
        }

        if let Some(table) = &self.table {
            if table.contains_key(name) {
                return 2;
            }
        }
        if let Some(visited) = visited {
            if visited.contains(name) {
                return 2;
            }
            visited.insert(name.to_owned());
        }

        match name.find('.') {
            Some(pvt) => pvt + 1 + self.name_len(&name[pvt + 1..], visited),
            // unterminated final label, followed by the root
            None => name.len() + 2,
        }
    }

    /// Appends the wire encoding of `fqdn` to `buf`.
    ///
    /// Compression works on suffixes, not labels: the first time a suffix is
    /// written its offset is recorded under the full remaining name, and any
    /// later name ending in that suffix is completed with a single pointer.
    pub fn pack(&mut self, mut buf: Vec<u8>, fqdn: &str) -> Result<Vec<u8>, EncodeError> {
        if fqdn == "." || fqdn.is_empty() {
            buf.push(0x00);
            return Ok(buf);
        }

        if let Some(table) = &self.table {
            if let Some(&idx) = table.get(fqdn) {
                buf.extend_from_slice(&pointer_to(idx)?);
                return Ok(buf);
            }
        }

        let pvt = match fqdn.find('.') {
            Some(0) => return Err(EncodeError::EmptyLabel),
            Some(pvt) => pvt,
            None => fqdn.len(),
        };
        if pvt > MAX_LABEL_LEN {
            return Err(EncodeError::LabelTooLong(pvt));
        }

        if let Some(table) = &mut self.table {
            // a later reuse of an offset past the 14-bit pointer range fails
            // with InvalidPointer instead of emitting a corrupt pointer
            table.insert(fqdn.to_owned(), buf.len() - self.base);
        }

        buf.push(pvt as u8);
        buf.extend_from_slice(fqdn[..pvt].as_bytes());

        let suffix = if pvt < fqdn.len() { &fqdn[pvt + 1..] } else { "" };
        self.pack(buf, suffix)
    }
}

fn pointer_to(idx: usize) -> Result<[u8; 2], EncodeError> {
    if idx >= 1 << 14 {
        return Err(EncodeError::InvalidPointer(idx));
    }

    Ok((0xC000 | idx as u16).to_be_bytes())
}

/// Decodes domain names from a message buffer, following compression
/// pointers.
///
/// A `Decompressor` borrows the complete message, because pointers refer to
/// byte offsets from the start of the message. It is only valid for a single
/// `Message::unpack` call.
pub struct Decompressor<'a> {
    pub(crate) buf: &'a [u8],
}

impl<'a> Decompressor<'a> {
    /// Creates a decompressor over the complete message buffer.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Reads the name starting at `off` and returns it together with the
    /// offset of the first byte past the label sequence (not past any
    /// referenced bytes).
    ///
    /// The set of pointer targets followed so far is carried through the
    /// dereference chain and seeded with `off` itself, so a pointer that
    /// targets an offset already being parsed fails with
    /// [`ParseError::PointerCycle`]. A pointer whose target byte is itself a
    /// pointer fails with [`ParseError::InvalidPointer`].
    pub fn unpack(&self, off: usize) -> Result<(String, usize), ParseError> {
        let mut visited = vec![off];
        self.unpack_at(off, &mut visited)
    }

    fn unpack_at(
        &self,
        mut off: usize,
        visited: &mut Vec<usize>,
    ) -> Result<(String, usize), ParseError> {
        let mut name = String::new();

        loop {
            let b = *self.buf.get(off).ok_or(ParseError::UnexpectedEof)?;

            if b == 0x00 {
                if name.is_empty() {
                    name.push('.');
                }
                return Ok((name, off + 1));
            }

            if b & 0xC0 == 0xC0 {
                let lo = *self.buf.get(off + 1).ok_or(ParseError::UnexpectedEof)?;
                let target = usize::from(u16::from_be_bytes([b & 0x3F, lo]));

                let suffix = self.deref(target, visited)?;
                if name.is_empty() || suffix != "." {
                    name.push_str(&suffix);
                }
                return Ok((name, off + 2));
            }

            if b & 0xC0 != 0 {
                // 0b01/0b10 label types were never assigned
                return Err(ParseError::InvalidPointer(off));
            }

            let end = off + 1 + usize::from(b);
            if end > self.buf.len() {
                return Err(ParseError::FieldOverrun);
            }

            name.push_str(&String::from_utf8_lossy(&self.buf[off + 1..end]));
            name.push('.');
            if name.len() > MAX_NAME_LEN {
                return Err(ParseError::NameTooLong(name.len()));
            }

            off = end;
        }
    }

    fn deref(&self, target: usize, visited: &mut Vec<usize>) -> Result<String, ParseError> {
        if visited.contains(&target) {
            return Err(ParseError::PointerCycle(target));
        }
        if target >= self.buf.len() || self.buf[target] & 0xC0 != 0 {
            return Err(ParseError::InvalidPointer(target));
        }

        visited.push(target);
        let (name, _) = self.unpack_at(target, visited)?;
        Ok(name)
    }
}
