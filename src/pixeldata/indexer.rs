//! Ties the stream reader, the parsed main dataset, and the transfer
//! syntax together to read (or synthesize) a basic offset table and pull
//! individual frames out of the pixel data element.

use crate::dataset::DataSet;
use crate::decode::{ItemHeader, StreamReader};
use crate::error::{self, Error, Result};
use crate::pixeldata::bot::{is_sentinel_offset, BasicOffsetTable};
use crate::pixeldata::frame::Frame;
use crate::tag::Tag;
use crate::transfer_syntax::TransferSyntax;
use snafu::ensure;
use std::io::{Read, Seek};

/// Byte length of the pixel data element's own header, for encapsulated
/// syntaxes (tag, VR, two reserved bytes, 32-bit undefined length).
const ENCAPSULATED_PIXEL_HEADER_LEN: u64 = 12;
/// Byte length of the pixel data element's header for native syntaxes.
const NATIVE_PIXEL_HEADER_LEN: u64 = 10;

fn u16_value(metadata: &DataSet, tag: Tag, keyword: &str) -> Result<u16> {
    metadata
        .get(tag)
        .and_then(|e| e.value().u16s())
        .and_then(|v| v.first().copied())
        .ok_or_else(|| Error::missing_metadata(format!("missing or malformed {}", keyword)))
}

fn number_of_frames(metadata: &DataSet) -> Result<u32> {
    metadata
        .get(Tag(0x0028, 0x0008))
        .and_then(|e| e.value().strings())
        .and_then(|v| v.first())
        .and_then(|s| s.trim().parse::<u32>().ok())
        .ok_or_else(|| Error::missing_metadata("missing or malformed NumberOfFrames (0028,0008)"))
}

fn photometric_interpretation(metadata: &DataSet) -> Result<String> {
    metadata
        .get(Tag(0x0028, 0x0004))
        .and_then(|e| e.value().strings())
        .and_then(|v| v.first())
        .cloned()
        .ok_or_else(|| Error::missing_metadata("missing PhotometricInterpretation (0028,0004)"))
}

/// The pixel data indexer: given a reader seeked anywhere, and the
/// geometry pulled from the main dataset, it can read the stored basic
/// offset table, synthesize one by scanning, and extract any single
/// frame by its one-based number.
pub struct PixelDataIndexer<'a, S> {
    reader: &'a mut StreamReader<S>,
    pixel_data_offset: u64,
    transfer_syntax: TransferSyntax,
    rows: u16,
    columns: u16,
    samples_per_pixel: u16,
    bits_allocated: u16,
    bits_stored: u16,
    pixel_representation: u16,
    planar_configuration: u16,
    photometric_interpretation: String,
    number_of_frames: u32,
    /// Absolute byte position of the first frame item, cached once
    /// [`read_bot`](Self::read_bot) or [`build_bot`](Self::build_bot) has
    /// located it. Measured, as the basic offset table itself is, from the
    /// actual bytes read rather than from an assumed header size, since a
    /// stored offset table item may be empty even when encapsulated.
    frame_region_start: Option<u64>,
}

impl<'a, S: Read + Seek> PixelDataIndexer<'a, S> {
    /// Build an indexer, reading the geometry elements it needs out of
    /// `metadata` (the main dataset parsed before the pixel data element
    /// was reached). `pixel_data_offset` is the byte offset of the pixel
    /// data element's own header, as recorded by [`crate::parser::read_dataset`].
    pub fn new(
        reader: &'a mut StreamReader<S>,
        metadata: &DataSet,
        transfer_syntax: TransferSyntax,
        pixel_data_offset: u64,
    ) -> Result<Self> {
        Ok(PixelDataIndexer {
            reader,
            pixel_data_offset,
            transfer_syntax,
            rows: u16_value(metadata, Tag(0x0028, 0x0010), "Rows")?,
            columns: u16_value(metadata, Tag(0x0028, 0x0011), "Columns")?,
            samples_per_pixel: u16_value(metadata, Tag(0x0028, 0x0002), "SamplesPerPixel")?,
            bits_allocated: u16_value(metadata, Tag(0x0028, 0x0100), "BitsAllocated")?,
            bits_stored: u16_value(metadata, Tag(0x0028, 0x0101), "BitsStored")?,
            pixel_representation: u16_value(metadata, Tag(0x0028, 0x0103), "PixelRepresentation")?,
            planar_configuration: metadata
                .get(Tag(0x0028, 0x0006))
                .and_then(|e| e.value().u16s())
                .and_then(|v| v.first().copied())
                .unwrap_or_else(|| {
                    tracing::debug!("PlanarConfiguration (0028,0006) absent, defaulting to 0");
                    0
                }),
            photometric_interpretation: photometric_interpretation(metadata)?,
            number_of_frames: number_of_frames(metadata)?,
            frame_region_start: None,
        })
    }

    fn native_frame_len(&self) -> u64 {
        u64::from(self.rows)
            * u64::from(self.columns)
            * u64::from(self.samples_per_pixel)
            * (u64::from(self.bits_allocated) / 8)
    }

    /// Read the basic offset table as stored in the file. Only defined
    /// for encapsulated transfer syntaxes. Fails with `AbsentBOT` if the
    /// stored item is empty.
    pub fn read_bot(&mut self) -> Result<BasicOffsetTable> {
        ensure!(
            self.transfer_syntax.is_encapsulated(),
            error::MalformedSnafu { detail: "read_bot is only defined for encapsulated transfer syntaxes" }
        );
        self.reader.seek(self.pixel_data_offset + ENCAPSULATED_PIXEL_HEADER_LEN)?;
        let len = match self.reader.read_item_header()? {
            ItemHeader::Item(len) => len.get().unwrap_or(0),
            _ => {
                return error::MalformedSnafu { detail: "expected the basic offset table item" }.fail()
            }
        };
        ensure!(len > 0, error::AbsentBOTSnafu);

        let count = (len / 4) as usize;
        let raw = self.reader.read_u32_vec(count)?;
        self.frame_region_start = Some(self.reader.position());
        let mut offsets = Vec::with_capacity(count);
        for value in raw {
            ensure!(
                !is_sentinel_offset(value),
                error::MalformedSnafu { detail: "stored BOT offset equals the item tag sentinel" }
            );
            offsets.push(u64::from(value));
        }
        Ok(BasicOffsetTable::from_offsets(offsets))
    }

    /// Synthesize the basic offset table rather than trusting the stored
    /// one. For native syntaxes this derives offsets directly from pixel
    /// geometry; for encapsulated syntaxes it scans the fragment items
    /// after the (possibly empty) stored BOT, and the resulting frame
    /// count must match `NumberOfFrames`.
    pub fn build_bot(&mut self) -> Result<BasicOffsetTable> {
        if !self.transfer_syntax.is_encapsulated() {
            self.frame_region_start = Some(self.pixel_data_offset + NATIVE_PIXEL_HEADER_LEN);
            let frame_len = self.native_frame_len();
            let offsets = (0..u64::from(self.number_of_frames)).map(|i| i * frame_len).collect();
            return Ok(BasicOffsetTable::from_offsets(offsets));
        }

        self.reader.seek(self.pixel_data_offset + ENCAPSULATED_PIXEL_HEADER_LEN)?;
        let bot_len = match self.reader.read_item_header()? {
            ItemHeader::Item(len) => len.get().unwrap_or(0),
            _ => {
                return error::MalformedSnafu { detail: "expected the basic offset table item" }.fail()
            }
        };
        self.reader.skip(u64::from(bot_len))?;

        let frame_region_start = self.reader.position();
        self.frame_region_start = Some(frame_region_start);
        let mut offsets = Vec::new();
        loop {
            let item_start = self.reader.position() - frame_region_start;
            match self.reader.read_item_header()? {
                ItemHeader::SequenceDelimiter => break,
                ItemHeader::ItemDelimiter => {
                    return error::MalformedSnafu {
                        detail: "unexpected item delimiter while scanning pixel data fragments",
                    }
                    .fail();
                }
                ItemHeader::Item(len) => {
                    offsets.push(item_start);
                    let len = len
                        .get()
                        .ok_or_else(|| Error::malformed("pixel data fragment has undefined length"))?;
                    self.reader.skip(u64::from(len))?;
                }
            }
        }

        ensure!(
            offsets.len() == self.number_of_frames as usize,
            error::FrameCountMismatchSnafu { scanned: offsets.len(), declared: self.number_of_frames as usize }
        );
        Ok(BasicOffsetTable::from_offsets(offsets))
    }

    /// Extract frame `number` (one-based), using `bot` to locate it.
    ///
    /// Requires [`read_bot`](Self::read_bot) or [`build_bot`](Self::build_bot)
    /// to have run first on this indexer, so the first frame item's
    /// position is known.
    pub fn read_frame(&mut self, number: u32, bot: &BasicOffsetTable) -> Result<Frame> {
        let frame_offset = bot.offset_of(number)?;
        let frame_region_start = self.frame_region_start.ok_or_else(|| {
            Error::malformed("read_frame called before read_bot or build_bot located the frame region")
        })?;
        self.reader.seek(frame_region_start + frame_offset)?;

        let data = if self.transfer_syntax.is_encapsulated() {
            match self.reader.read_item_header()? {
                ItemHeader::Item(len) => {
                    let len = len
                        .get()
                        .ok_or_else(|| Error::malformed("pixel data fragment has undefined length"))?;
                    self.reader.read_raw(len)?
                }
                _ => {
                    return error::MalformedSnafu { detail: "expected a pixel data fragment item" }.fail()
                }
            }
        } else {
            self.reader.read_raw(self.native_frame_len() as u32)?
        };

        Frame::new(
            number,
            data,
            self.rows,
            self.columns,
            self.samples_per_pixel,
            self.bits_allocated,
            self.bits_stored,
            self.pixel_representation,
            self.planar_configuration,
            self.photometric_interpretation.clone(),
            self.transfer_syntax.uid().to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DataSet;
    use crate::element::Element;
    use crate::transfer_syntax::EXPLICIT_VR_LITTLE_ENDIAN;
    use crate::value::{Value, C};
    use crate::vr::VR;
    use byteordered::Endianness;
    use std::io::Cursor;

    fn us(tag: Tag, v: u16) -> Element {
        Element::new(tag, VR::US, Value::U16(C::from_vec(vec![v]))).unwrap()
    }

    fn cs(tag: Tag, v: &str) -> Element {
        Element::new(tag, VR::CS, Value::Strings(C::from_vec(vec![v.to_string()]))).unwrap()
    }

    fn is(tag: Tag, v: &str) -> Element {
        Element::new(tag, VR::IS, Value::Strings(C::from_vec(vec![v.to_string()]))).unwrap()
    }

    fn metadata(num_frames: &str) -> DataSet {
        let mut ds = DataSet::new();
        ds.insert(us(Tag(0x0028, 0x0010), 10)).unwrap();
        ds.insert(us(Tag(0x0028, 0x0011), 10)).unwrap();
        ds.insert(us(Tag(0x0028, 0x0002), 3)).unwrap();
        ds.insert(us(Tag(0x0028, 0x0100), 8)).unwrap();
        ds.insert(us(Tag(0x0028, 0x0101), 8)).unwrap();
        ds.insert(us(Tag(0x0028, 0x0103), 0)).unwrap();
        ds.insert(cs(Tag(0x0028, 0x0004), "RGB")).unwrap();
        ds.insert(is(Tag(0x0028, 0x0008), num_frames)).unwrap();
        ds
    }

    // Encapsulated pixel data with two single-byte "compressed" fragments
    // and an empty stored BOT.
    fn encapsulated_bytes() -> (Vec<u8>, u64) {
        let mut raw = Vec::new();
        raw.extend_from_slice(&[0x28, 0x00, 0x00, 0x01]); // padding so offset isn't 0
        let pixel_data_offset = raw.len() as u64;
        raw.extend_from_slice(&[0xe0, 0x7f, 0x10, 0x00, b'O', b'B', 0x00, 0x00]);
        raw.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        // empty BOT item
        raw.extend_from_slice(&[0xfe, 0xff, 0x00, 0xe0, 0x00, 0x00, 0x00, 0x00]);
        // fragment 1: length 4
        raw.extend_from_slice(&[0xfe, 0xff, 0x00, 0xe0, 0x04, 0x00, 0x00, 0x00]);
        raw.extend_from_slice(&[1, 2, 3, 4]);
        // fragment 2: length 2
        raw.extend_from_slice(&[0xfe, 0xff, 0x00, 0xe0, 0x02, 0x00, 0x00, 0x00]);
        raw.extend_from_slice(&[5, 6]);
        // sequence delimiter
        raw.extend_from_slice(&[0xfe, 0xff, 0xdd, 0xe0, 0x00, 0x00, 0x00, 0x00]);
        (raw, pixel_data_offset)
    }

    #[test]
    fn build_bot_scans_encapsulated_fragments() {
        let (raw, pixel_data_offset) = encapsulated_bytes();
        let metadata = metadata("2");
        let mut reader = StreamReader::new(Cursor::new(raw), Endianness::Little, 0);
        let ts = TransferSyntax::new("1.2.840.10008.1.2.4.70");
        let mut indexer = PixelDataIndexer::new(&mut reader, &metadata, ts, pixel_data_offset).unwrap();
        let bot = indexer.build_bot().unwrap();
        assert_eq!(bot.num_frames(), 2);
        assert_eq!(bot.offset_of(1).unwrap(), 0);
        assert_eq!(bot.offset_of(2).unwrap(), 12);
    }

    #[test]
    fn read_frame_extracts_fragment_bytes() {
        let (raw, pixel_data_offset) = encapsulated_bytes();
        let metadata = metadata("2");
        let mut reader = StreamReader::new(Cursor::new(raw), Endianness::Little, 0);
        let ts = TransferSyntax::new("1.2.840.10008.1.2.4.70");
        let mut indexer = PixelDataIndexer::new(&mut reader, &metadata, ts, pixel_data_offset).unwrap();
        let bot = indexer.build_bot().unwrap();
        let frame = indexer.read_frame(1, &bot).unwrap();
        assert_eq!(frame.data(), &[1, 2, 3, 4]);
        let frame2 = indexer.read_frame(2, &bot).unwrap();
        assert_eq!(frame2.data(), &[5, 6]);
    }

    #[test]
    fn read_bot_reports_absent_when_empty() {
        let (raw, pixel_data_offset) = encapsulated_bytes();
        let metadata = metadata("2");
        let mut reader = StreamReader::new(Cursor::new(raw), Endianness::Little, 0);
        let ts = TransferSyntax::new("1.2.840.10008.1.2.4.70");
        let mut indexer = PixelDataIndexer::new(&mut reader, &metadata, ts, pixel_data_offset).unwrap();
        let err = indexer.read_bot();
        assert!(matches!(err, Err(Error::AbsentBOT { .. })));
    }

    #[test]
    fn build_bot_is_formulaic_for_native_syntax() {
        let metadata = metadata("3");
        let raw = vec![0u8; 10];
        let mut reader = StreamReader::new(Cursor::new(raw), Endianness::Little, 0);
        let ts = TransferSyntax::new(EXPLICIT_VR_LITTLE_ENDIAN);
        let mut indexer = PixelDataIndexer::new(&mut reader, &metadata, ts, 0).unwrap();
        let bot = indexer.build_bot().unwrap();
        assert_eq!(bot.offsets(), &[0, 300, 600]);
    }
}
