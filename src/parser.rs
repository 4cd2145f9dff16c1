//! Top-level control flow: preamble, magic code, file meta group, then the
//! main dataset up to (but not including) the pixel data element.

use crate::dataset::DataSet;
use crate::decode::StreamReader;
use crate::dictionary::DataDictionary;
use crate::element::Element;
use crate::error::{self, Error, Result};
use crate::meta::{self, FileMetaTable};
use crate::tag;
use snafu::ResultExt;
use std::io::{Read, Seek, SeekFrom};

/// Length of the preamble that precedes the `"DICM"` magic code.
pub const PREAMBLE_LEN: u64 = 128;
const MAGIC: &[u8; 4] = b"DICM";

/// The main dataset, plus the byte offset of the pixel data element's
/// header if one was encountered before the dataset ended.
///
/// `pixel_data_offset` lets the pixel data indexer re-enter the element
/// later without re-parsing everything that came before it; the reader
/// is left seeked back to that offset when it is returned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedDataset {
    pub dataset: DataSet,
    pub pixel_data_offset: Option<u64>,
}

/// Skip the 128-byte preamble and verify the `"DICM"` magic code that
/// follows it. Leaves `source` positioned right after the magic code
/// (byte 132) on success.
pub fn read_preamble<S: Read + Seek>(source: &mut S) -> Result<()> {
    source
        .seek(SeekFrom::Start(PREAMBLE_LEN))
        .context(error::IoSnafu { position: 0 })?;
    let mut magic = [0u8; 4];
    source
        .read_exact(&mut magic)
        .context(error::IoSnafu { position: PREAMBLE_LEN })?;
    if &magic != MAGIC {
        return error::NotADicomFileSnafu.fail();
    }
    Ok(())
}

/// Parse the file meta group, assuming `source` is positioned right after
/// the `"DICM"` magic code. Returns the parsed group and a stream reader
/// ready to continue past it, still at Explicit VR Little Endian; the
/// caller must reconfigure it for the announced transfer syntax before
/// reading the main dataset (see [`crate::file`]).
pub fn read_meta<S: Read, D: DataDictionary>(
    source: S,
    dict: &D,
) -> Result<(FileMetaTable, StreamReader<S>)> {
    let mut reader = meta::meta_reader(source, PREAMBLE_LEN + 4);
    let meta = FileMetaTable::read_from(&mut reader, dict)?;
    Ok((meta, reader))
}

/// Read the main dataset from `reader`, which must already be configured
/// with the transfer syntax's endianness, stopping at EOF, the dataset
/// trailing padding tag `(FFFC,FFFC)`, or a pixel data tag.
///
/// On a pixel data tag the reader is rewound to the first byte of that
/// element's header and `pixel_data_offset` records where. Any element
/// whose tag belongs to group `0002` found here (outside the file meta
/// phase) is a structural error.
pub fn read_dataset<S: Read + Seek, D: DataDictionary>(
    reader: &mut StreamReader<S>,
    dict: &D,
    implicit: bool,
) -> Result<ParsedDataset> {
    let mut dataset = DataSet::new();
    let mut pixel_data_offset = None;

    loop {
        let header_position = reader.position();
        let header = reader.read_element_header(dict, implicit);
        let (tag, vr, length) = match header {
            Ok(h) => h,
            Err(Error::Io { source, .. }) if source.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(e),
        };

        if tag == tag::DATASET_TRAILING_PADDING {
            break;
        }
        if tag.is_pixel_data() {
            reader.seek(header_position)?;
            pixel_data_offset = Some(header_position);
            break;
        }
        if tag.is_file_meta_group() {
            return error::UnexpectedTokenSnafu {
                position: header_position,
                detail: format!("file meta element {} found outside the file meta group", tag),
            }
            .fail();
        }

        let value = reader.read_value(tag, vr, length, dict, implicit)?;
        let vm = value.multiplicity();
        dataset.insert(Element::from_parts(tag, vr, length, vm, value))?;
    }

    Ok(ParsedDataset { dataset, pixel_data_offset })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::StandardDataDictionary;
    use crate::decode::StreamReader;
    use byteordered::Endianness;
    use std::io::Cursor;

    #[test]
    fn rejects_missing_magic() {
        let mut cursor = Cursor::new(vec![0u8; 200]);
        let err = read_preamble(&mut cursor);
        assert!(matches!(err, Err(Error::NotADicomFile { .. })));
    }

    #[test]
    fn accepts_valid_magic() {
        let mut buf = vec![0u8; 128];
        buf.extend_from_slice(b"DICM");
        let mut cursor = Cursor::new(buf);
        assert!(read_preamble(&mut cursor).is_ok());
    }

    #[test]
    fn stops_at_pixel_data_and_records_offset() {
        // (0028,0010) US len 2 value 10, then (7FE0,0010) OW undefined length header
        let mut raw = Vec::new();
        raw.extend_from_slice(&[0x28, 0x00, 0x10, 0x00, b'U', b'S', 0x02, 0x00, 0x0a, 0x00]);
        let pixel_data_start = raw.len() as u64;
        raw.extend_from_slice(&[0xe0, 0x7f, 0x10, 0x00, b'O', b'W', 0x00, 0x00]);
        raw.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());

        let dict = StandardDataDictionary;
        let mut reader = StreamReader::new(Cursor::new(raw), Endianness::Little, 0);
        let parsed = read_dataset(&mut reader, &dict, false).unwrap();
        assert_eq!(parsed.dataset.count(), 1);
        assert_eq!(parsed.pixel_data_offset, Some(pixel_data_start));
        assert_eq!(reader.position(), pixel_data_start);
    }

    #[test]
    fn stops_at_trailing_padding() {
        let raw: [u8; 12] =
            [0xfc, 0xff, 0xfc, 0xff, b'O', b'B', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let dict = StandardDataDictionary;
        let mut reader = StreamReader::new(Cursor::new(&raw[..]), Endianness::Little, 0);
        let parsed = read_dataset(&mut reader, &dict, false).unwrap();
        assert_eq!(parsed.dataset.count(), 0);
        assert_eq!(parsed.pixel_data_offset, None);
    }

    #[test]
    fn rejects_group_0002_outside_meta() {
        let raw: [u8; 12] =
            [0x02, 0x00, 0x01, 0x00, b'O', b'B', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let dict = StandardDataDictionary;
        let mut reader = StreamReader::new(Cursor::new(&raw[..]), Endianness::Little, 0);
        let err = read_dataset(&mut reader, &dict, false);
        assert!(matches!(err, Err(Error::UnexpectedToken { .. })));
    }
}
