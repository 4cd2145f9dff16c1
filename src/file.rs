//! The high-level entry point: open a Part 10 byte stream and get back its
//! file meta information, its main dataset, and (if present) a handle onto
//! its pixel data.

use crate::dataset::DataSet;
use crate::decode::StreamReader;
use crate::dictionary::DataDictionary;
use crate::error::Result;
use crate::meta::FileMetaTable;
use crate::parser;
use crate::pixeldata::PixelDataIndexer;
use crate::transfer_syntax::TransferSyntax;
use std::io::{Read, Seek};

/// A parsed Part 10 file: file meta information, the main dataset read up
/// to (but not including) the pixel data element, and enough state to index
/// into that pixel data on demand.
#[derive(Debug)]
pub struct DicomFile<S> {
    meta: FileMetaTable,
    dataset: DataSet,
    pixel_data_offset: Option<u64>,
    transfer_syntax: TransferSyntax,
    reader: StreamReader<S>,
}

impl<S: Read + Seek> DicomFile<S> {
    /// The file meta information group.
    pub fn meta(&self) -> &FileMetaTable {
        &self.meta
    }

    /// The main dataset, excluding the pixel data element.
    pub fn dataset(&self) -> &DataSet {
        &self.dataset
    }

    /// The transfer syntax the main dataset (and pixel data) are encoded
    /// with, as announced by the file meta group.
    pub fn transfer_syntax(&self) -> &TransferSyntax {
        &self.transfer_syntax
    }

    /// Whether a pixel data element was found while reading the dataset.
    pub fn has_pixel_data(&self) -> bool {
        self.pixel_data_offset.is_some()
    }

    /// Build a pixel data indexer positioned at this file's pixel data
    /// element. Fails with [`crate::error::Error::MissingMetadata`] if no
    /// pixel data element was present, or if the geometry elements the
    /// indexer needs are missing from the dataset.
    pub fn pixel_data(&mut self) -> Result<PixelDataIndexer<'_, S>> {
        let offset = self.pixel_data_offset.ok_or_else(|| {
            crate::error::Error::missing_metadata("this file has no pixel data element")
        })?;
        PixelDataIndexer::new(&mut self.reader, &self.dataset, self.transfer_syntax.clone(), offset)
    }
}

/// Open a Part 10 DICOM byte stream: skip the preamble, verify the magic
/// code, parse the file meta group, reconfigure for the announced transfer
/// syntax, then parse the main dataset up to the pixel data element.
///
/// Deflated transfer syntaxes are rejected with a `Malformed` error:
/// inflating the byte stream past the file meta group is a transport-layer
/// concern outside this crate (see [`TransferSyntax::is_deflated`]).
pub fn open_file<S: Read + Seek, D: DataDictionary>(mut source: S, dict: &D) -> Result<DicomFile<S>> {
    parser::read_preamble(&mut source)?;
    let (meta, meta_reader) = parser::read_meta(source, dict)?;
    let transfer_syntax = meta.transfer_syntax().clone();

    if transfer_syntax.is_deflated() {
        return crate::error::MalformedSnafu {
            detail: "deflated transfer syntax requires inflating the stream before this reader can continue",
        }
        .fail();
    }

    let position = meta_reader.position();
    let source = meta_reader.into_inner();
    let mut reader = StreamReader::new(source, transfer_syntax.endianness(), position);
    let parsed = parser::read_dataset(&mut reader, dict, transfer_syntax.is_implicit_vr())?;

    Ok(DicomFile {
        meta,
        dataset: parsed.dataset,
        pixel_data_offset: parsed.pixel_data_offset,
        transfer_syntax,
        reader,
    })
}
