//! Pixel data access: the basic offset table and per-frame extraction.
//!
//! Decoding the encoded bytes themselves (JPEG, JPEG 2000, RLE, ...) is out
//! of scope; this module only locates and hands back the raw, still-encoded
//! bytes for each frame.

pub mod bot;
pub mod frame;
pub mod indexer;

pub use bot::BasicOffsetTable;
pub use frame::Frame;
pub use indexer::PixelDataIndexer;
