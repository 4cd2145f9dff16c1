//! A reader for the DICOM Part 10 file format: element, dataset, and
//! sequence data model, a binary parser over the four native transfer
//! syntaxes, and a pixel data indexer for encapsulated and native frames.
//!
//! Out of scope: writing/serialization, network transport (the upper-layer
//! protocol and association negotiation), character set transcoding beyond
//! raw bytes, pixel codec decoding (JPEG, JPEG 2000, RLE, ...), and
//! semantic or clinical validation of element values.
//!
//! The entry point is [`file::open_file`], which reads the preamble, the
//! file meta group, and the main dataset, leaving the pixel data element
//! (if any) ready for [`pixeldata::PixelDataIndexer`].

pub mod dataset;
pub mod decode;
pub mod dictionary;
pub mod element;
pub mod error;
pub mod file;
pub mod length;
pub mod meta;
pub mod parser;
pub mod pixeldata;
pub mod sequence;
pub mod tag;
pub mod transfer_syntax;
pub mod value;
pub mod vr;

pub use dataset::DataSet;
pub use dictionary::{DataDictionary, StandardDataDictionary};
pub use element::Element;
pub use error::{Error, Result};
pub use file::{DicomFile, open_file};
pub use length::Length;
pub use pixeldata::{BasicOffsetTable, Frame, PixelDataIndexer};
pub use sequence::Sequence;
pub use tag::Tag;
pub use transfer_syntax::TransferSyntax;
pub use value::Value;
pub use vr::VR;
