//! Raw tag-length-value helpers.
//!
//! `picky-asn1-der` drives the structured decoding, but a few places need to look at the
//! bytes directly: IMPLICIT tagging (the leading tag byte is rewritten before handing the
//! element to serde), opaque values that must be reproduced byte for byte, and the signed
//! envelope split.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub const CLASS_MASK: u8 = 0xC0;
pub const CONSTRUCTED: u8 = 0x20;
pub const NUMBER_MASK: u8 = 0x1F;

const CONTEXT_CLASS: u8 = 0x80;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TlvError {
    #[error("empty input")]
    Empty,
    #[error("truncated element: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },
    #[error("indefinite length encoding is not supported")]
    IndefiniteLength,
    #[error("length field of {0} bytes is too large")]
    LengthOverflow(usize),
    #[error("multi-byte tag numbers are not supported")]
    HighTagNumber,
    #[error("{0} trailing bytes after element")]
    TrailingData(usize),
    #[error("unexpected tag: expected 0x{expected:02X}, got 0x{actual:02X}")]
    UnexpectedTag { expected: u8, actual: u8 },
    #[error("unexpected element with tag 0x{0:02X}")]
    UnexpectedElement(u8),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("(asn1) couldn't process {element}: {message}")]
    Der { element: &'static str, message: String },
}

impl TlvError {
    pub(crate) fn der(element: &'static str, source: picky_asn1_der::Asn1DerError) -> Self {
        Self::Der {
            element,
            message: source.to_string(),
        }
    }
}

/// Universal tags referenced by the wire types.
pub mod universal {
    pub const BOOLEAN: u8 = 0x01;
    pub const INTEGER: u8 = 0x02;
    pub const BIT_STRING: u8 = 0x03;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OID: u8 = 0x06;
    pub const ENUMERATED: u8 = 0x0A;
    pub const UTF8_STRING: u8 = 0x0C;
    pub const NUMERIC_STRING: u8 = 0x12;
    pub const PRINTABLE_STRING: u8 = 0x13;
    pub const TELETEX_STRING: u8 = 0x14;
    pub const IA5_STRING: u8 = 0x16;
    pub const UTC_TIME: u8 = 0x17;
    pub const GENERALIZED_TIME: u8 = 0x18;
    pub const VISIBLE_STRING: u8 = 0x1A;
    pub const GENERAL_STRING: u8 = 0x1B;
    pub const UNIVERSAL_STRING: u8 = 0x1C;
    pub const BMP_STRING: u8 = 0x1E;
    pub const SEQUENCE: u8 = 0x30;
    pub const SET: u8 = 0x31;
}

/// Context-specific primitive tag `[n]`
pub const fn context_primitive(number: u8) -> u8 {
    CONTEXT_CLASS | (number & NUMBER_MASK)
}

/// Context-specific constructed tag `[n]`
pub const fn context_constructed(number: u8) -> u8 {
    CONTEXT_CLASS | CONSTRUCTED | (number & NUMBER_MASK)
}

pub fn is_context_specific(tag: u8) -> bool {
    tag & CLASS_MASK == CONTEXT_CLASS
}

pub fn tag_number(tag: u8) -> u8 {
    tag & NUMBER_MASK
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub tag: u8,
    pub header_len: usize,
    pub content_len: usize,
}

impl Header {
    /// Header and content together, `None` if that does not fit in `usize`.
    pub fn total_len(&self) -> Option<usize> {
        self.header_len.checked_add(self.content_len)
    }

    pub fn is_constructed(&self) -> bool {
        self.tag & CONSTRUCTED != 0
    }
}

/// Reads the identifier and length octets of the element starting at `input[0]`.
pub fn read_header(input: &[u8]) -> Result<Header, TlvError> {
    let tag = *input.first().ok_or(TlvError::Empty)?;
    if tag & NUMBER_MASK == NUMBER_MASK {
        return Err(TlvError::HighTagNumber);
    }

    let first_len = *input.get(1).ok_or(TlvError::Truncated {
        needed: 2,
        available: input.len(),
    })?;

    let (header_len, content_len) = if first_len & 0x80 == 0 {
        (2, usize::from(first_len))
    } else {
        let num_octets = usize::from(first_len & 0x7F);
        if num_octets == 0 {
            return Err(TlvError::IndefiniteLength);
        }
        if num_octets > std::mem::size_of::<usize>() {
            return Err(TlvError::LengthOverflow(num_octets));
        }

        let octets = input.get(2..2 + num_octets).ok_or(TlvError::Truncated {
            needed: 2 + num_octets,
            available: input.len(),
        })?;
        let len = octets.iter().fold(0usize, |acc, byte| (acc << 8) | usize::from(*byte));
        (2 + num_octets, len)
    };

    let header = Header {
        tag,
        header_len,
        content_len,
    };

    let total_len = element_len(&header)?;
    if input.len() < total_len {
        return Err(TlvError::Truncated {
            needed: total_len,
            available: input.len(),
        });
    }

    Ok(header)
}

fn element_len(header: &Header) -> Result<usize, TlvError> {
    header
        .total_len()
        .ok_or(TlvError::LengthOverflow(header.header_len.saturating_sub(2)))
}

/// Splits off the first element of `input`, returning its header, its content octets and
/// whatever follows it.
pub fn split_first(input: &[u8]) -> Result<(Header, &[u8], &[u8]), TlvError> {
    let header = read_header(input)?;
    let (element, rest) = input.split_at(element_len(&header)?);
    Ok((header, &element[header.header_len..], rest))
}

/// Splits off the first whole element of `input`.
pub fn split_element(input: &[u8]) -> Result<(&[u8], &[u8]), TlvError> {
    let header = read_header(input)?;
    Ok(input.split_at(element_len(&header)?))
}

/// Parses `input` as exactly one element.
pub fn parse_single(input: &[u8]) -> Result<(Header, &[u8]), TlvError> {
    let (header, content, rest) = split_first(input)?;
    if !rest.is_empty() {
        return Err(TlvError::TrailingData(rest.len()));
    }
    Ok((header, content))
}

/// Like [`parse_single`], but also checks the tag.
pub fn expect_single(input: &[u8], expected: u8) -> Result<&[u8], TlvError> {
    let (header, content) = parse_single(input)?;
    if header.tag != expected {
        return Err(TlvError::UnexpectedTag {
            expected,
            actual: header.tag,
        });
    }
    Ok(content)
}

/// Iterates over consecutive elements.
pub fn elements(mut input: &[u8]) -> Result<Vec<&[u8]>, TlvError> {
    let mut elements = Vec::new();
    while !input.is_empty() {
        let (element, rest) = split_element(input)?;
        elements.push(element);
        input = rest;
    }
    Ok(elements)
}

pub fn encode_length(len: usize, out: &mut Vec<u8>) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }

    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|byte| **byte == 0).count();
    let significant = &bytes[skip..];
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
}

/// Encodes a whole element from its tag and content octets.
pub fn encode(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 6);
    out.push(tag);
    encode_length(content.len(), &mut out);
    out.extend_from_slice(content);
    out
}

/// Rewrites the identifier octet of an encoded element.
pub fn retag(mut der: Vec<u8>, tag: u8) -> Result<Vec<u8>, TlvError> {
    match der.first_mut() {
        Some(first) => {
            *first = tag;
            Ok(der)
        }
        None => Err(TlvError::Empty),
    }
}

/// Decodes an IMPLICIT tagged value by restoring its universal tag first.
pub fn decode_implicit<T: DeserializeOwned>(
    element: &[u8],
    universal: u8,
    name: &'static str,
) -> Result<T, TlvError> {
    let der = retag(element.to_vec(), universal)?;
    picky_asn1_der::from_bytes(&der).map_err(|e| TlvError::der(name, e))
}

/// Encodes `value` then replaces its universal tag with `tag`.
pub fn encode_implicit<T: Serialize>(value: &T, tag: u8, name: &'static str) -> Result<Vec<u8>, TlvError> {
    let der = picky_asn1_der::to_vec(value).map_err(|e| TlvError::der(name, e))?;
    retag(der, tag)
}

/// Decodes the inner value of an EXPLICIT tagged element.
pub fn decode_explicit<T: DeserializeOwned>(element: &[u8], tag: u8, name: &'static str) -> Result<T, TlvError> {
    let content = expect_single(element, tag)?;
    picky_asn1_der::from_bytes(content).map_err(|e| TlvError::der(name, e))
}

pub fn encode_explicit<T: Serialize>(value: &T, tag: u8, name: &'static str) -> Result<Vec<u8>, TlvError> {
    let inner = picky_asn1_der::to_vec(value).map_err(|e| TlvError::der(name, e))?;
    Ok(encode(tag, &inner))
}

/// Walks the elements of a constructed value one at a time.
///
/// This is the layout-driven half of the codec: callers describe which tag comes next and how
/// it is tagged (universal, IMPLICIT or EXPLICIT), and each element is handed to
/// `picky-asn1-der` on its own.
pub struct SequenceReader<'a> {
    elements: std::iter::Peekable<std::vec::IntoIter<&'a [u8]>>,
}

impl<'a> SequenceReader<'a> {
    /// `der` must hold exactly one element tagged `tag`.
    pub fn new(der: &'a [u8], tag: u8) -> Result<Self, TlvError> {
        let content = expect_single(der, tag)?;
        Self::from_content(content)
    }

    pub fn from_content(content: &'a [u8]) -> Result<Self, TlvError> {
        Ok(Self {
            elements: elements(content)?.into_iter().peekable(),
        })
    }

    pub fn peek_tag(&mut self) -> Option<u8> {
        self.elements.peek().map(|element| element[0])
    }

    pub fn is_empty(&mut self) -> bool {
        self.elements.peek().is_none()
    }

    pub fn next_raw(&mut self, name: &'static str) -> Result<&'a [u8], TlvError> {
        self.elements.next().ok_or(TlvError::Missing(name))
    }

    /// Next element, only if its tag is `tag`.
    pub fn next_raw_if(&mut self, tag: u8) -> Option<&'a [u8]> {
        if self.peek_tag() == Some(tag) {
            self.elements.next()
        } else {
            None
        }
    }

    pub fn next<T: DeserializeOwned>(&mut self, name: &'static str) -> Result<T, TlvError> {
        let element = self.next_raw(name)?;
        picky_asn1_der::from_bytes(element).map_err(|e| TlvError::der(name, e))
    }

    pub fn next_if<T: DeserializeOwned>(&mut self, tag: u8, name: &'static str) -> Result<Option<T>, TlvError> {
        match self.next_raw_if(tag) {
            Some(element) => picky_asn1_der::from_bytes(element)
                .map(Some)
                .map_err(|e| TlvError::der(name, e)),
            None => Ok(None),
        }
    }

    /// Optional `[n] IMPLICIT` element. Both the primitive and the constructed form of the
    /// context tag are accepted.
    pub fn next_implicit<T: DeserializeOwned>(
        &mut self,
        number: u8,
        universal: u8,
        name: &'static str,
    ) -> Result<Option<T>, TlvError> {
        match self.peek_tag() {
            Some(tag) if tag == context_primitive(number) || tag == context_constructed(number) => {
                let element = self.next_raw(name)?;
                decode_implicit(element, universal, name).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Optional `[n] EXPLICIT` element.
    pub fn next_explicit<T: DeserializeOwned>(&mut self, number: u8, name: &'static str) -> Result<Option<T>, TlvError> {
        let tag = context_constructed(number);
        match self.next_raw_if(tag) {
            Some(element) => decode_explicit(element, tag, name).map(Some),
            None => Ok(None),
        }
    }

    /// Fails if elements remain.
    pub fn finish(mut self) -> Result<(), TlvError> {
        match self.peek_tag() {
            Some(tag) => Err(TlvError::UnexpectedElement(tag)),
            None => Ok(()),
        }
    }
}

/// Builds a constructed value element by element.
#[derive(Debug, Default)]
pub struct SequenceWriter {
    content: Vec<u8>,
}

impl SequenceWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T: Serialize>(&mut self, value: &T, name: &'static str) -> Result<(), TlvError> {
        let der = picky_asn1_der::to_vec(value).map_err(|e| TlvError::der(name, e))?;
        self.content.extend_from_slice(&der);
        Ok(())
    }

    pub fn push_raw(&mut self, der: &[u8]) {
        self.content.extend_from_slice(der);
    }

    pub fn push_implicit<T: Serialize>(&mut self, value: &T, tag: u8, name: &'static str) -> Result<(), TlvError> {
        let der = encode_implicit(value, tag, name)?;
        self.content.extend_from_slice(&der);
        Ok(())
    }

    pub fn push_explicit<T: Serialize>(&mut self, value: &T, number: u8, name: &'static str) -> Result<(), TlvError> {
        let der = encode_explicit(value, context_constructed(number), name)?;
        self.content.extend_from_slice(&der);
        Ok(())
    }

    pub fn finish(self, tag: u8) -> Vec<u8> {
        encode(tag, &self.content)
    }

    pub fn finish_sequence(self) -> Vec<u8> {
        self.finish(universal::SEQUENCE)
    }
}

/// Big-endian magnitude of an INTEGER's content octets, without leading zero octets.
pub fn unsigned_magnitude(content: &[u8]) -> &[u8] {
    let skip = content.iter().take_while(|byte| **byte == 0).count();
    &content[skip..]
}

/// Content octets of a non-negative INTEGER holding `magnitude`.
pub fn unsigned_content(magnitude: &[u8]) -> Vec<u8> {
    let magnitude = unsigned_magnitude(magnitude);
    match magnitude.first() {
        None => vec![0],
        Some(first) if first & 0x80 != 0 => {
            let mut content = Vec::with_capacity(magnitude.len() + 1);
            content.push(0);
            content.extend_from_slice(magnitude);
            content
        }
        Some(_) => magnitude.to_vec(),
    }
}

/// Reads a non-negative INTEGER's content octets as a `u32`, refusing anything wider.
pub fn content_to_u32(content: &[u8]) -> Option<u32> {
    if content.first().map_or(true, |first| first & 0x80 != 0) {
        return None;
    }

    let magnitude = unsigned_magnitude(content);
    if magnitude.len() > 4 {
        return None;
    }

    Some(magnitude.iter().fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte)))
}

pub fn u32_to_content(value: u32) -> Vec<u8> {
    unsigned_content(&value.to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_and_long_lengths() {
        let short = encode(0x04, &[1, 2, 3]);
        assert_eq!(short, [0x04, 0x03, 1, 2, 3]);

        let long = encode(0x04, &[0xAA; 200]);
        assert_eq!(&long[..3], &[0x04, 0x81, 200]);
        let header = read_header(&long).unwrap();
        assert_eq!(header.header_len, 3);
        assert_eq!(header.content_len, 200);

        let longer = encode(0x30, &[0; 0x1234]);
        assert_eq!(&longer[..4], &[0x30, 0x82, 0x12, 0x34]);
    }

    #[test]
    fn rejects_malformed_headers() {
        assert_eq!(read_header(&[]), Err(TlvError::Empty));
        assert_eq!(read_header(&[0x30, 0x80]), Err(TlvError::IndefiniteLength));
        assert_eq!(read_header(&[0x1F, 0x01, 0x00]), Err(TlvError::HighTagNumber));
        assert_eq!(
            read_header(&[0x04, 0x05, 0x00]),
            Err(TlvError::Truncated { needed: 7, available: 3 })
        );
        assert_eq!(parse_single(&[0x05, 0x00, 0x00]), Err(TlvError::TrailingData(1)));
    }

    #[test]
    fn rejects_lengths_past_usize() {
        let mut all_ones = vec![0x30, 0x88];
        all_ones.extend_from_slice(&[0xFF; 8]);
        assert_eq!(read_header(&all_ones), Err(TlvError::LengthOverflow(8)));
        assert_eq!(split_first(&all_ones), Err(TlvError::LengthOverflow(8)));
        assert_eq!(elements(&all_ones), Err(TlvError::LengthOverflow(8)));

        // header_len + content_len lands exactly on usize::MAX + 1
        let width = std::mem::size_of::<usize>();
        let long_form = 0x80 | width as u8;
        let mut near_max = vec![0x04, long_form];
        near_max.extend_from_slice(&(usize::MAX - width - 1).to_be_bytes());
        assert_eq!(read_header(&near_max), Err(TlvError::LengthOverflow(width)));

        let mut fits = vec![0x04, long_form];
        fits.extend_from_slice(&(usize::MAX - width - 2).to_be_bytes());
        assert_eq!(
            read_header(&fits),
            Err(TlvError::Truncated {
                needed: usize::MAX,
                available: width + 2
            })
        );
    }

    #[test]
    fn context_tags() {
        assert_eq!(context_primitive(2), 0x82);
        assert_eq!(context_constructed(3), 0xA3);
        assert!(is_context_specific(0xA4));
        assert!(!is_context_specific(0x30));
        assert_eq!(tag_number(0xA4), 4);
    }

    #[test]
    fn integer_helpers() {
        assert_eq!(unsigned_content(&[0x00, 0x00, 0x7F]), vec![0x7F]);
        assert_eq!(unsigned_content(&[0xC0, 0xFF, 0xEE]), vec![0x00, 0xC0, 0xFF, 0xEE]);
        assert_eq!(unsigned_content(&[]), vec![0x00]);
        assert_eq!(content_to_u32(&[0x00, 0xFF, 0xFF, 0xFF, 0xFF]), Some(u32::MAX));
        assert_eq!(content_to_u32(&[0x01, 0x00, 0x00, 0x00, 0x00]), None);
        assert_eq!(content_to_u32(&[0x80]), None);
        assert_eq!(u32_to_content(7), vec![0x07]);
    }

    #[test]
    fn splits_consecutive_elements() {
        let input = [0x02, 0x01, 0x05, 0x04, 0x00, 0x30, 0x02, 0x05, 0x00];
        let elements = elements(&input).unwrap();
        assert_eq!(elements, vec![&input[0..3], &input[3..5], &input[5..9]]);
    }
}
