//! The basic offset table (BOT): per-frame byte offsets inside an
//! encapsulated pixel data element.

use crate::error::{self, Result};
use crate::tag;
use snafu::ensure;

/// Per-frame byte offsets, measured from the first byte of the first frame
/// item inside the pixel-data element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicOffsetTable {
    offsets: Vec<u64>,
}

impl BasicOffsetTable {
    pub(crate) fn from_offsets(offsets: Vec<u64>) -> Self {
        BasicOffsetTable { offsets }
    }

    /// The number of frames this table accounts for.
    pub fn num_frames(&self) -> usize {
        self.offsets.len()
    }

    /// The byte offset of the one-based frame `number`, measured from the
    /// first byte of the first frame item. Fails with `OutOfRange` if
    /// `number` is `0` or exceeds `num_frames()`.
    pub fn offset_of(&self, number: u32) -> Result<u64> {
        let count = self.offsets.len();
        ensure!(
            number >= 1 && (number as usize) <= count,
            error::OutOfRangeSnafu { index: number.saturating_sub(1) as usize, count }
        );
        Ok(self.offsets[(number - 1) as usize])
    }

    /// Borrow the raw offsets, in frame order.
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }
}

/// The item-tag sentinel value a stored BOT offset must never equal; a
/// stored offset equal to the item tag's packed value indicates a
/// malformed table.
pub(crate) fn is_sentinel_offset(offset: u32) -> bool {
    offset == u32::from(tag::ITEM)
}
