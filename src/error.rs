//! Error types shared across the reader.
//!
//! Every fallible operation in this crate surfaces one [`Error`], whose
//! variant names the kind of failure. Construction and mutation errors
//! (on [`crate::dataset::DataSet`] and [`crate::sequence::Sequence`]) carry
//! back the value that could not be inserted so the caller's ownership
//! discipline stays intact: a failed `insert`/`append` always yields the
//! rejected value for the caller to drop or otherwise dispose of.

use crate::tag::Tag;
use snafu::{Backtrace, Snafu};

/// The result type used throughout this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The kinds of failure this library can report.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// An underlying read, seek, or open on the byte source failed.
    #[snafu(display("I/O error at position {}", position))]
    Io {
        position: u64,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The 128-byte preamble was not followed by the `DICM` magic code.
    #[snafu(display("not a DICOM file: missing 'DICM' magic code"))]
    NotADicomFile { backtrace: Backtrace },

    /// A tag read from the stream does not resolve to any known attribute,
    /// private group, or structural marker.
    #[snafu(display("invalid tag {} at position {}", tag, position))]
    InvalidTag { tag: Tag, position: u64, backtrace: Backtrace },

    /// The two bytes read as a VR code in explicit encoding do not belong
    /// to the closed set of recognized value representations.
    #[snafu(display("invalid VR bytes {:?} at position {}", bytes, position))]
    InvalidVR { bytes: [u8; 2], position: u64, backtrace: Backtrace },

    /// A header, item, or delimiter was not the one the grammar expected
    /// at this point (e.g. reserved bytes were non-zero, or a group-0002
    /// element was found outside the file meta group).
    #[snafu(display("unexpected token at position {}: {}", position, detail))]
    UnexpectedToken {
        position: u64,
        detail: String,
        backtrace: Backtrace,
    },

    /// A string value exceeds the per-value character capacity of its VR.
    #[snafu(display("value too long for VR {}: {} characters (max {})", vr, len, max))]
    ValueTooLong {
        vr: crate::vr::VR,
        len: usize,
        max: usize,
        backtrace: Backtrace,
    },

    /// An element with this tag is already present in the target dataset.
    #[snafu(display("duplicate element tagged {}", tag))]
    Duplicate { tag: Tag, backtrace: Backtrace },

    /// A mutating operation was attempted on a locked dataset or sequence.
    #[snafu(display("attempted to mutate a locked container"))]
    Locked { backtrace: Backtrace },

    /// An index was out of range for the addressed container (a sequence
    /// item index, or a one-based frame number).
    #[snafu(display("index {} out of range (count is {})", index, count))]
    OutOfRange {
        index: usize,
        count: usize,
        backtrace: Backtrace,
    },

    /// A basic offset table was requested for an encapsulated pixel data
    /// element, but the stored BOT item is empty.
    #[snafu(display("the stored basic offset table is absent (empty item)"))]
    AbsentBOT { backtrace: Backtrace },

    /// The synthesized frame count from scanning pixel data items
    /// disagrees with the `NumberOfFrames` (0028,0008) metadata value.
    #[snafu(display(
        "frame count mismatch: scanned {} items but metadata declares {} frames",
        scanned,
        declared
    ))]
    FrameCountMismatch { scanned: usize, declared: usize, backtrace: Backtrace },

    /// A required piece of metadata was missing or could not be coerced to
    /// the required type.
    #[snafu(display("missing or malformed metadata: {}", detail))]
    MissingMetadata { detail: String, backtrace: Backtrace },

    /// A catch-all for encoding violations not covered by a more specific
    /// variant above.
    #[snafu(display("malformed DICOM content: {}", detail))]
    Malformed { detail: String, backtrace: Backtrace },
}

impl Error {
    /// Build an [`Error::Malformed`] from a formatted detail message.
    pub fn malformed(detail: impl Into<String>) -> Self {
        MalformedSnafu { detail: detail.into() }.build()
    }

    /// Build an [`Error::MissingMetadata`] from a formatted detail message.
    pub fn missing_metadata(detail: impl Into<String>) -> Self {
        MissingMetadataSnafu { detail: detail.into() }.build()
    }
}

