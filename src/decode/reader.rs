//! The stream reader: a positioned, counted, VR-dispatching decoder.
//!
//! [`StreamReader`] is the one place that understands byte framing. It
//! knows nothing about file meta groups or pixel data indexing; those are
//! built on top of it in [`crate::meta`] and [`crate::pixeldata`].

use crate::dataset::DataSet;
use crate::dictionary::DataDictionary;
use crate::element::Element;
use crate::error::{self, Result};
use crate::length::Length;
use crate::sequence::Sequence;
use crate::tag::{self, Tag};
use crate::value::{Value, C};
use crate::vr::VR;
use byteordered::Endianness;
use snafu::{ensure, ResultExt};
use std::io::{Read, Seek, SeekFrom};

use super::basic;

/// The outcome of reading an 8-byte item/delimiter header: a tag followed
/// by a 32-bit length, with no VR of its own. Used both for sequence
/// items and for encapsulated pixel data fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemHeader {
    /// A regular item, of the given (possibly undefined) length.
    Item(Length),
    /// An item delimiter, closing an undefined-length item.
    ItemDelimiter,
    /// A sequence delimiter, closing an undefined-length sequence.
    SequenceDelimiter,
}

/// A positioned reader over a DICOM byte stream, aware of one transfer
/// syntax's endianness and VR-explicitness.
///
/// `position()` tracks the number of bytes consumed since this reader was
/// constructed (or last repositioned with [`StreamReader::seek`]), so
/// callers can compute byte offsets for later random access (as the pixel
/// data indexer does for frame offsets).
#[derive(Debug)]
pub struct StreamReader<S> {
    source: S,
    endianness: Endianness,
    position: u64,
}

impl<S> StreamReader<S> {
    /// Wrap `source`, assumed to already be positioned at `position` bytes
    /// into the logical stream, decoding numbers with `endianness`.
    pub fn new(source: S, endianness: Endianness, position: u64) -> Self {
        StreamReader { source, endianness, position }
    }

    /// The number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Access the endianness this reader was constructed with.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Consume the reader, returning the underlying source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Borrow the underlying source.
    pub fn inner(&self) -> &S {
        &self.source
    }

    /// Mutably borrow the underlying source.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: Seek> StreamReader<S> {
    /// Reposition the reader to an absolute byte offset, resetting the
    /// tracked position to match.
    pub fn seek(&mut self, position: u64) -> Result<()> {
        self.source
            .seek(SeekFrom::Start(position))
            .context(error::IoSnafu { position: self.position })?;
        self.position = position;
        Ok(())
    }
}

impl<S: Read> StreamReader<S> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.source
            .read_exact(buf)
            .context(error::IoSnafu { position: self.position })?;
        self.position += buf.len() as u64;
        Ok(())
    }

    fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        basic::read_u16(&buf[..], self.endianness).context(error::IoSnafu { position: self.position })
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        basic::read_u32(&buf[..], self.endianness).context(error::IoSnafu { position: self.position })
    }

    fn read_to_vec(&mut self, length: u32) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; length as usize];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read `length` raw bytes. Used by the pixel data indexer to pull out
    /// a fragment's or frame's encoded bytes once its length is known.
    pub(crate) fn read_raw(&mut self, length: u32) -> Result<Vec<u8>> {
        self.read_to_vec(length)
    }

    /// Read `count` consecutive 32-bit values in this reader's endianness.
    /// Used by the pixel data indexer to read basic offset table entries.
    pub(crate) fn read_u32_vec(&mut self, count: usize) -> Result<Vec<u32>> {
        let raw = self.read_to_vec(count as u32 * 4)?;
        let mut out = vec![0u32; count];
        basic::read_u32_into(&mut &raw[..], self.endianness, &mut out)
            .context(error::IoSnafu { position: self.position })?;
        Ok(out)
    }

    /// Skip forward `n` bytes without interpreting them. Used by the pixel
    /// data indexer to step over fragment item bodies while scanning.
    pub(crate) fn skip(&mut self, n: u64) -> Result<()>
    where
        S: Seek,
    {
        self.seek(self.position + n)
    }

    /// Read a tag as two 16-bit group/element numbers, in the reader's
    /// endianness.
    pub fn read_tag(&mut self) -> Result<Tag> {
        let group = self.read_u16()?;
        let element = self.read_u16()?;
        Ok(Tag(group, element))
    }

    /// Read an 8-byte item header: a tag followed by a 32-bit length.
    /// Fails with `UnexpectedToken` unless the tag is one of the three
    /// recognized item/delimiter tags.
    pub fn read_item_header(&mut self) -> Result<ItemHeader> {
        let position = self.position;
        let tag = self.read_tag()?;
        let len = Length(self.read_u32()?);
        match tag {
            tag::ITEM => Ok(ItemHeader::Item(len)),
            tag::ITEM_DELIMITER => Ok(ItemHeader::ItemDelimiter),
            tag::SEQUENCE_DELIMITER => Ok(ItemHeader::SequenceDelimiter),
            _ => error::UnexpectedTokenSnafu {
                position,
                detail: format!("expected an item or delimiter tag, found {}", tag),
            }
            .fail(),
        }
    }

    /// Read an element header, dispatching to implicit- or explicit-VR
    /// framing rules as directed by `implicit`. The VR of an implicit
    /// header is resolved through `dict`; tags the dictionary does not
    /// recognize decode as `VR::UN`.
    pub fn read_element_header<D: DataDictionary>(
        &mut self,
        dict: &D,
        implicit: bool,
    ) -> Result<(Tag, VR, Length)> {
        let tag = self.read_tag()?;
        self.read_element_header_given_tag(tag, dict, implicit)
    }

    fn read_element_header_given_tag<D: DataDictionary>(
        &mut self,
        tag: Tag,
        dict: &D,
        implicit: bool,
    ) -> Result<(Tag, VR, Length)> {
        let position = self.position;
        if implicit {
            let vr = dict.vr_of(tag).unwrap_or_else(|| {
                tracing::debug!("unrecognized tag {} in implicit VR, defaulting to UN", tag);
                VR::UN
            });
            let len = Length(self.read_u32()?);
            Ok((tag, vr, len))
        } else {
            let mut vr_bytes = [0u8; 2];
            self.read_exact(&mut vr_bytes)?;
            let vr = match VR::from_binary(vr_bytes) {
                Some(vr) => vr,
                None => return error::InvalidVRSnafu { bytes: vr_bytes, position }.fail(),
            };
            let len = if vr.has_short_length_header() {
                Length(u32::from(self.read_u16()?))
            } else {
                let mut reserved = [0u8; 2];
                self.read_exact(&mut reserved)?;
                ensure!(
                    reserved == [0u8, 0u8],
                    error::UnexpectedTokenSnafu {
                        position,
                        detail: "non-zero reserved bytes in explicit VR header".to_string(),
                    }
                );
                Length(self.read_u32()?)
            };
            Ok((tag, vr, len))
        }
    }

    /// Read the header and body of one data element, recursing into
    /// nested sequences as needed.
    pub fn read_element<D: DataDictionary>(&mut self, dict: &D, implicit: bool) -> Result<Element> {
        let (tag, vr, length) = self.read_element_header(dict, implicit)?;
        let value = self.read_value(tag, vr, length, dict, implicit)?;
        let vm = value.multiplicity();
        Ok(Element::from_parts(tag, vr, length, vm, value))
    }

    /// Read the value body for an already-decoded header.
    pub fn read_value<D: DataDictionary>(
        &mut self,
        tag: Tag,
        vr: VR,
        length: Length,
        dict: &D,
        implicit: bool,
    ) -> Result<Value> {
        use crate::vr::ValueKind;
        match vr.value_kind() {
            ValueKind::StringList => self.read_string_list(vr, length),
            ValueKind::Text => self.read_text(length),
            ValueKind::Bytes => self.read_bytes(length),
            ValueKind::Tag => self.read_tags(length),
            ValueKind::Numeric => self.read_numeric(vr, length),
            ValueKind::Sequence => {
                let seq = self.read_sequence(dict, implicit, tag, length)?;
                Ok(Value::Sequence(seq))
            }
        }
    }

    fn read_string_list(&mut self, vr: VR, length: Length) -> Result<Value> {
        let len = length.get().unwrap_or(0);
        if len == 0 {
            return Ok(Value::Strings(C::from_vec(vec![String::new()])));
        }
        let mut raw = self.read_to_vec(len)?;
        if vr != VR::UI && raw.last() == Some(&b' ') {
            raw.pop();
        }
        let values = raw
            .split(|&b| b == b'\\')
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect::<Vec<_>>();
        Ok(Value::Strings(C::from_vec(values)))
    }

    fn read_text(&mut self, length: Length) -> Result<Value> {
        let len = length.get().unwrap_or(0);
        let raw = self.read_to_vec(len)?;
        Ok(Value::Text(String::from_utf8_lossy(&raw).into_owned()))
    }

    fn read_bytes(&mut self, length: Length) -> Result<Value> {
        let len = length
            .get()
            .ok_or_else(|| error::Error::malformed("opaque byte value has undefined length"))?;
        Ok(Value::Bytes(self.read_to_vec(len)?))
    }

    fn read_tags(&mut self, length: Length) -> Result<Value> {
        let len = length.get().unwrap_or(0);
        let vm = (len / 4) as usize;
        let mut raw = vec![0u32; vm];
        let buf = self.read_to_vec(len)?;
        basic::read_u32_into(&mut &buf[..], self.endianness, &mut raw)
            .context(error::IoSnafu { position: self.position })?;
        Ok(Value::Tags(raw.into_iter().map(Tag::from).collect()))
    }

    fn read_numeric(&mut self, vr: VR, length: Length) -> Result<Value> {
        let element_size = vr.element_size().expect("numeric VR always has an element size");
        let len = length.get().unwrap_or(0);
        let vm = (len / element_size) as usize;
        let endianness = self.endianness;
        macro_rules! read_vec {
            ($t:ty, $reader:path) => {{
                let raw = self.read_to_vec(len)?;
                let mut out = vec![<$t>::default(); vm];
                $reader(&mut &raw[..], endianness, &mut out)
                    .context(error::IoSnafu { position: self.position })?;
                out
            }};
        }
        Ok(match vr {
            VR::FL => Value::F32(read_vec!(f32, basic::read_f32_into).into()),
            VR::FD => Value::F64(read_vec!(f64, basic::read_f64_into).into()),
            VR::SS => Value::I16(read_vec!(i16, basic::read_i16_into).into()),
            VR::SL => Value::I32(read_vec!(i32, basic::read_i32_into).into()),
            VR::SV => Value::I64(read_vec!(i64, basic::read_i64_into).into()),
            VR::US => Value::U16(read_vec!(u16, basic::read_u16_into).into()),
            VR::UL => Value::U32(read_vec!(u32, basic::read_u32_into).into()),
            VR::UV => Value::U64(read_vec!(u64, basic::read_u64_into).into()),
            _ => unreachable!("non-numeric VR reached read_numeric"),
        })
    }

    fn read_sequence<D: DataDictionary>(
        &mut self,
        dict: &D,
        implicit: bool,
        _tag: Tag,
        length: Length,
    ) -> Result<Sequence> {
        let mut seq = Sequence::new();
        let end = length.get().map(|l| self.position + u64::from(l));
        loop {
            if let Some(end) = end {
                if self.position >= end {
                    break;
                }
            }
            match self.read_item_header()? {
                ItemHeader::SequenceDelimiter => break,
                ItemHeader::ItemDelimiter => {
                    return error::UnexpectedTokenSnafu {
                        position: self.position,
                        detail: "item delimiter found directly inside a sequence".to_string(),
                    }
                    .fail()
                }
                ItemHeader::Item(item_length) => {
                    let item = self.read_item_dataset(dict, implicit, item_length)?;
                    seq.append(item)?;
                }
            }
        }
        Ok(seq)
    }

    fn read_item_dataset<D: DataDictionary>(
        &mut self,
        dict: &D,
        implicit: bool,
        item_length: Length,
    ) -> Result<DataSet> {
        let mut ds = DataSet::new();
        if let Some(len) = item_length.get() {
            let end = self.position + u64::from(len);
            while self.position < end {
                let el = self.read_element(dict, implicit)?;
                ds.insert(el)?;
            }
        } else {
            loop {
                let tag = self.read_tag()?;
                if tag == tag::ITEM_DELIMITER {
                    let _ = self.read_u32()?;
                    break;
                }
                let (tag, vr, length) = self.read_element_header_given_tag(tag, dict, implicit)?;
                let value = self.read_value(tag, vr, length, dict, implicit)?;
                let vm = value.multiplicity();
                ds.insert(Element::from_parts(tag, vr, length, vm, value))?;
            }
        }
        Ok(ds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::StandardDataDictionary;
    use std::io::Cursor;

    // Tag (0002,0002) VR UI Length 26 "1.2.840.10008.5.1.4.1.1.1\0"
    // Tag (0002,0010) VR UI Length 20 "1.2.840.10008.1.2.1\0"
    const RAW: &[u8; 62] = &[
        0x02, 0x00, 0x02, 0x00, 0x55, 0x49, 0x1a, 0x00, 0x31, 0x2e, 0x32, 0x2e, 0x38, 0x34, 0x30,
        0x2e, 0x31, 0x30, 0x30, 0x30, 0x38, 0x2e, 0x35, 0x2e, 0x31, 0x2e, 0x34, 0x2e, 0x31, 0x2e,
        0x31, 0x2e, 0x31, 0x00, 0x02, 0x00, 0x10, 0x00, 0x55, 0x49, 0x14, 0x00, 0x31, 0x2e, 0x32,
        0x2e, 0x38, 0x34, 0x30, 0x2e, 0x31, 0x30, 0x30, 0x30, 0x38, 0x2e, 0x31, 0x2e, 0x32, 0x2e,
        0x31, 0x00,
    ];

    #[test]
    fn decodes_explicit_vr_elements() {
        let dict = StandardDataDictionary;
        let mut reader = StreamReader::new(Cursor::new(&RAW[..]), Endianness::Little, 0);

        let el = reader.read_element(&dict, false).unwrap();
        assert_eq!(el.tag(), Tag(0x0002, 0x0002));
        assert_eq!(el.vr(), VR::UI);
        assert_eq!(el.length().get(), Some(26));
        assert_eq!(reader.position(), 8 + 26);
        assert_eq!(el.value().strings(), Some(&["1.2.840.10008.5.1.4.1.1.1\0".to_string()][..]));

        let el = reader.read_element(&dict, false).unwrap();
        assert_eq!(el.tag(), Tag(0x0002, 0x0010));
        assert_eq!(el.length().get(), Some(20));
        assert_eq!(el.value().strings(), Some(&["1.2.840.10008.1.2.1\0".to_string()][..]));
    }

    #[test]
    fn seek_rewinds_and_rereads() {
        let dict = StandardDataDictionary;
        let mut reader = StreamReader::new(Cursor::new(&RAW[..]), Endianness::Little, 0);
        let _ = reader.read_element(&dict, false).unwrap();
        let pos_after_first = reader.position();
        reader.seek(0).unwrap();
        assert_eq!(reader.position(), 0);
        let el = reader.read_element(&dict, false).unwrap();
        assert_eq!(el.tag(), Tag(0x0002, 0x0002));
        assert_eq!(reader.position(), pos_after_first);
    }

    #[test]
    fn implicit_vr_uses_dictionary() {
        // Tag (0028,0010) Rows, length 2, value 10 (US per dictionary)
        let raw: [u8; 8] = [0x28, 0x00, 0x10, 0x00, 0x02, 0x00, 0x00, 0x00];
        let dict = StandardDataDictionary;
        let mut reader = StreamReader::new(Cursor::new(&raw[..]), Endianness::Little, 0);
        let el = reader.read_element(&dict, true).unwrap();
        assert_eq!(el.vr(), VR::US);
        assert_eq!(el.value().u16s(), Some(&[10u16][..]));
    }

    #[test]
    fn rejects_non_zero_reserved_bytes() {
        // OB header with non-zero reserved bytes
        let raw: [u8; 12] = [0x28, 0x00, 0x00, 0x01, b'O', b'B', 0x01, 0x00, 0x02, 0x00, 0x00, 0x00];
        let dict = StandardDataDictionary;
        let mut reader = StreamReader::new(Cursor::new(&raw[..]), Endianness::Little, 0);
        let err = reader.read_element(&dict, false);
        assert!(matches!(err, Err(error::Error::UnexpectedToken { .. })));
    }

    #[test]
    fn reads_undefined_length_sequence_with_one_item() {
        // (0040,A168) SQ undefined length
        //   item, undefined length
        //     (0018,0050) DS len 4 "0.01"
        //   item delimiter
        // sequence delimiter
        let mut raw = Vec::new();
        raw.extend_from_slice(&[0x40, 0x00, 0x68, 0xA1, b'S', b'Q', 0x00, 0x00]);
        raw.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        // item header, undefined length
        raw.extend_from_slice(&[0xFE, 0xFF, 0x00, 0xE0]);
        raw.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        // DS element
        raw.extend_from_slice(&[0x18, 0x00, 0x50, 0x00, b'D', b'S', 0x04, 0x00]);
        raw.extend_from_slice(b"0.01");
        // item delimiter
        raw.extend_from_slice(&[0xFE, 0xFF, 0x0D, 0xE0, 0x00, 0x00, 0x00, 0x00]);
        // sequence delimiter
        raw.extend_from_slice(&[0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00]);

        let dict = StandardDataDictionary;
        let mut reader = StreamReader::new(Cursor::new(&raw[..]), Endianness::Little, 0);
        let el = reader.read_element(&dict, false).unwrap();
        assert_eq!(el.vr(), VR::SQ);
        let seq = el.value().as_sequence().unwrap();
        assert_eq!(seq.count(), 1);
    }
}
