//! The file meta information group: the forced-explicit-VR-little-endian
//! preamble to every Part 10 file that announces the transfer syntax the
//! main dataset is encoded with.

use crate::dataset::DataSet;
use crate::decode::StreamReader;
use crate::dictionary::DataDictionary;
use crate::error::{self, Error, Result};
use crate::tag::Tag;
use crate::transfer_syntax::TransferSyntax;
use byteordered::Endianness;
use std::io::Read;

/// Tag of the file meta information group length element, whose value
/// bounds how many further bytes belong to the group.
const GROUP_LENGTH: Tag = Tag(0x0002, 0x0000);
/// Tag carrying the transfer syntax UID of the main dataset.
const TRANSFER_SYNTAX_UID: Tag = Tag(0x0002, 0x0010);

/// The parsed file meta information group.
///
/// Always encoded in Explicit VR Little Endian regardless of the main
/// dataset's transfer syntax, per the Part 10 file format. The dataset is
/// locked once parsing completes.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetaTable {
    dataset: DataSet,
    transfer_syntax: TransferSyntax,
}

impl FileMetaTable {
    /// The file meta elements themselves, keyed by tag.
    pub fn dataset(&self) -> &DataSet {
        &self.dataset
    }

    /// The transfer syntax announced by `(0002,0010)`, governing how the
    /// main dataset that follows is encoded.
    pub fn transfer_syntax(&self) -> &TransferSyntax {
        &self.transfer_syntax
    }

    /// Read the file meta group from `reader`, which must be positioned
    /// right after the `"DICM"` magic code and configured for Explicit VR
    /// Little Endian.
    ///
    /// Reads `(0002,0000)` to learn the group's byte length, then reads
    /// elements until that many bytes have been consumed. Any element
    /// outside group `0002`, or a duplicate tag, fails the whole group: the
    /// partially built dataset is dropped along with the error.
    pub fn read_from<S: Read, D: DataDictionary>(
        reader: &mut StreamReader<S>,
        dict: &D,
    ) -> Result<Self> {
        let mut dataset = DataSet::new();

        let group_length_element = reader.read_element(dict, false)?;
        if group_length_element.tag() != GROUP_LENGTH {
            return error::UnexpectedTokenSnafu {
                position: reader.position(),
                detail: format!(
                    "expected file meta group length {}, found {}",
                    GROUP_LENGTH,
                    group_length_element.tag()
                ),
            }
            .fail();
        }
        let group_length = group_length_element
            .value()
            .u32s()
            .and_then(|v| v.first().copied())
            .ok_or_else(|| Error::malformed("file meta group length is not a UL value"))?;

        let start = reader.position();
        dataset.insert(group_length_element)?;

        while reader.position() - start < u64::from(group_length) {
            let element = reader.read_element(dict, false)?;
            if element.tag().group() != 0x0002 {
                return error::UnexpectedTokenSnafu {
                    position: reader.position(),
                    detail: format!(
                        "element {} outside the file meta group's declared length",
                        element.tag()
                    ),
                }
                .fail();
            }
            dataset.insert(element)?;
        }

        let transfer_syntax_uid = dataset
            .get(TRANSFER_SYNTAX_UID)
            .and_then(|e| e.value().strings())
            .and_then(|v| v.first())
            .cloned()
            .ok_or_else(|| Error::malformed("missing TransferSyntaxUID (0002,0010)"))?;

        dataset.lock();
        Ok(FileMetaTable {
            dataset,
            transfer_syntax: TransferSyntax::new(transfer_syntax_uid),
        })
    }
}

/// Construct a stream reader positioned to decode the file meta group:
/// Explicit VR Little Endian, starting at `position`.
pub fn meta_reader<S>(source: S, position: u64) -> StreamReader<S> {
    StreamReader::new(source, Endianness::Little, position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::StandardDataDictionary;
    use std::io::Cursor;

    // (0002,0000) UL 4 -> group length covering the two elements below
    // (0002,0002) UI 26 "1.2.840.10008.5.1.4.1.1.1\0"   (not counted: appears after)
    // (0002,0010) UI 20 "1.2.840.10008.1.2.1\0"
    fn bytes() -> Vec<u8> {
        let mut buf = Vec::new();
        let mut body = Vec::new();
        body.extend_from_slice(&[0x02, 0x00, 0x02, 0x00, b'U', b'I', 0x1a, 0x00]);
        body.extend_from_slice(b"1.2.840.10008.5.1.4.1.1.1\0");
        body.extend_from_slice(&[0x02, 0x00, 0x10, 0x00, b'U', b'I', 0x14, 0x00]);
        body.extend_from_slice(b"1.2.840.10008.1.2.1\0");

        buf.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, b'U', b'L', 0x04, 0x00]);
        buf.extend_from_slice(&(body.len() as u32).to_le_bytes());
        buf.extend_from_slice(&body);
        buf
    }

    #[test]
    fn reads_file_meta_group() {
        let dict = StandardDataDictionary;
        let raw = bytes();
        let mut reader = meta_reader(Cursor::new(&raw[..]), 0);
        let meta = FileMetaTable::read_from(&mut reader, &dict).unwrap();
        assert_eq!(meta.transfer_syntax().uid(), "1.2.840.10008.1.2.1");
        assert!(meta.dataset().is_locked());
        assert_eq!(meta.dataset().count(), 3);
        assert_eq!(
            meta.dataset().get(Tag(0x0002, 0x0002)).unwrap().value().strings(),
            Some(&["1.2.840.10008.5.1.4.1.1.1\0".to_string()][..])
        );
    }

    #[test]
    fn rejects_element_outside_group() {
        let mut buf = Vec::new();
        let mut body = Vec::new();
        // claims a length far larger than what actually follows in group 0002,
        // so the loop reads into an element from group 0008.
        body.extend_from_slice(&[0x08, 0x00, 0x18, 0x00, b'U', b'I', 0x06, 0x00]);
        body.extend_from_slice(b"2.25.1");

        buf.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, b'U', b'L', 0x04, 0x00]);
        buf.extend_from_slice(&(body.len() as u32).to_le_bytes());
        buf.extend_from_slice(&body);

        let dict = StandardDataDictionary;
        let mut reader = meta_reader(Cursor::new(&buf[..]), 0);
        let err = FileMetaTable::read_from(&mut reader, &dict);
        assert!(matches!(err, Err(Error::UnexpectedToken { .. })));
    }
}
