//! The value of a VR=SQ element: an ordered list of dataset items.

use crate::dataset::DataSet;
use crate::error::{self, Result};
use snafu::ensure;

/// An ordered list of dataset items, owned exclusively by the sequence.
///
/// Like [`DataSet`], a sequence carries a *locked* flag: once locked,
/// `append` and `remove` fail with [`crate::error::Error::Locked`]. Calling
/// [`Sequence::get`] locks the returned item (not the sequence itself) so
/// that a caller holding the borrow cannot mutate shared structure out
/// from under a concurrent reader of the same sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    items: Vec<DataSet>,
    locked: bool,
}

impl Sequence {
    /// Create a new, empty, unlocked sequence.
    pub fn new() -> Self {
        Sequence { items: Vec::new(), locked: false }
    }

    /// Append an item to the end of the sequence. Fails if the sequence
    /// is locked; the item is dropped along with the error either way.
    pub fn append(&mut self, item: DataSet) -> Result<()> {
        ensure!(!self.locked, error::LockedSnafu);
        self.items.push(item);
        Ok(())
    }

    /// Borrow the item at `index`, locking it in the process so that
    /// holders of the borrow cannot mutate it further. Fails with
    /// `OutOfRange` if `index >= count()`.
    pub fn get(&mut self, index: usize) -> Result<&DataSet> {
        let count = self.items.len();
        ensure!(index < count, error::OutOfRangeSnafu { index, count });
        let item = &mut self.items[index];
        item.lock();
        Ok(item)
    }

    /// Remove and return the item at `index`. Fails if the sequence is
    /// locked.
    pub fn remove(&mut self, index: usize) -> Result<Option<DataSet>> {
        ensure!(!self.locked, error::LockedSnafu);
        if index >= self.items.len() {
            return Ok(None);
        }
        Ok(Some(self.items.remove(index)))
    }

    /// The number of items in the sequence.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Lock the sequence, rejecting further `append`/`remove` calls.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Whether the sequence is locked.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Visit every item in order.
    pub fn foreach<F: FnMut(&DataSet)>(&self, mut f: F) {
        for item in &self.items {
            f(item);
        }
    }

    /// Iterate over the items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, DataSet> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::tag::Tag;
    use crate::value::{Value, C};
    use crate::vr::VR;

    fn ds_item() -> DataSet {
        let mut ds = DataSet::new();
        ds.insert(Element::new(Tag(0x0018, 0x0050), VR::DS, Value::Strings(C::from_vec(vec!["0.01".to_string()]))).unwrap())
            .unwrap();
        ds
    }

    #[test]
    fn append_and_count() {
        let mut seq = Sequence::new();
        seq.append(ds_item()).unwrap();
        assert_eq!(seq.count(), 1);
    }

    #[test]
    fn get_locks_the_item_not_the_sequence() {
        let mut seq = Sequence::new();
        seq.append(ds_item()).unwrap();
        {
            let item = seq.get(0).unwrap();
            assert!(item.is_locked());
        }
        assert!(!seq.is_locked());
        // the sequence itself still accepts new items
        seq.append(ds_item()).unwrap();
        assert_eq!(seq.count(), 2);
    }

    #[test]
    fn get_out_of_range() {
        let mut seq = Sequence::new();
        let err = seq.get(0);
        assert!(matches!(err, Err(crate::error::Error::OutOfRange { .. })));
    }

    #[test]
    fn locked_sequence_rejects_mutation() {
        let mut seq = Sequence::new();
        seq.append(ds_item()).unwrap();
        seq.lock();
        assert!(matches!(seq.append(ds_item()), Err(crate::error::Error::Locked { .. })));
        assert!(matches!(seq.remove(0), Err(crate::error::Error::Locked { .. })));
        assert_eq!(seq.count(), 1);
    }
}
