//! An ordered-by-tag collection of data elements.

use crate::element::Element;
use crate::error::{self, Result};
use crate::tag::Tag;
use snafu::ensure;
use std::collections::BTreeMap;

/// A tag-keyed, tag-ordered collection of elements.
///
/// Internally this is a [`BTreeMap`], so iteration is naturally ascending
/// by tag regardless of insertion order — the reference implementation's
/// intrusive hash table plus a separate sort pass on every traversal is
/// unnecessary in a target language with an ordered map in its standard
/// library.
///
/// A dataset carries a *locked* flag: once locked, `insert` and `remove`
/// fail with [`crate::error::Error::Locked`]. A dataset exclusively owns
/// its elements; dropping it drops every contained element (and, through
/// them, any nested sequences and their items).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    elements: BTreeMap<Tag, Element>,
    locked: bool,
}

impl DataSet {
    /// Create a new, empty, unlocked dataset.
    pub fn new() -> Self {
        DataSet { elements: BTreeMap::new(), locked: false }
    }

    /// Insert an element. Fails with `Locked` if the dataset is locked, or
    /// `Duplicate` if an element with the same tag is already present; in
    /// either case `element` is dropped along with the error.
    pub fn insert(&mut self, element: Element) -> Result<()> {
        ensure!(!self.locked, error::LockedSnafu);
        ensure!(
            !self.elements.contains_key(&element.tag()),
            error::DuplicateSnafu { tag: element.tag() }
        );
        self.elements.insert(element.tag(), element);
        Ok(())
    }

    /// Remove the element tagged `tag`, if present. Fails with `Locked` if
    /// the dataset is locked; returns `Ok(false)` with no side effect if
    /// the tag was absent.
    pub fn remove(&mut self, tag: Tag) -> Result<bool> {
        ensure!(!self.locked, error::LockedSnafu);
        Ok(self.elements.remove(&tag).is_some())
    }

    /// Borrow the element tagged `tag`, if present.
    pub fn get(&self, tag: Tag) -> Option<&Element> {
        self.elements.get(&tag)
    }

    /// Deep-copy the element tagged `tag`, if present, so that the
    /// returned element is independent of this dataset.
    pub fn get_clone(&self, tag: Tag) -> Option<Element> {
        self.elements.get(&tag).cloned()
    }

    /// Whether an element with this tag is present.
    pub fn contains(&self, tag: Tag) -> bool {
        self.elements.contains_key(&tag)
    }

    /// The number of elements in the dataset.
    pub fn count(&self) -> usize {
        self.elements.len()
    }

    /// Visit every element in ascending tag order.
    pub fn foreach<F: FnMut(&Element)>(&self, mut f: F) {
        for element in self.elements.values() {
            f(element);
        }
    }

    /// Iterate over the elements in ascending tag order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Lock the dataset, rejecting further `insert`/`remove` calls.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Whether the dataset is locked.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Write every tag into `out`, in ascending order.
    pub fn copy_tags(&self, out: &mut Vec<Tag>) {
        out.clear();
        out.extend(self.elements.keys().copied());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Value, C};
    use crate::vr::VR;

    fn el(tag: Tag) -> Element {
        Element::new(tag, VR::CS, Value::Strings(C::from_vec(vec!["A".to_string()]))).unwrap()
    }

    #[test]
    fn insert_and_lookup() {
        let mut ds = DataSet::new();
        ds.insert(el(Tag(0x0008, 0x0018))).unwrap();
        assert!(ds.contains(Tag(0x0008, 0x0018)));
        assert_eq!(ds.count(), 1);
    }

    #[test]
    fn duplicate_insert_rejected() {
        let mut ds = DataSet::new();
        ds.insert(el(Tag(0x0008, 0x0018))).unwrap();
        let err = ds.insert(el(Tag(0x0008, 0x0018)));
        assert!(matches!(err, Err(crate::error::Error::Duplicate { .. })));
        assert_eq!(ds.count(), 1);
    }

    #[test]
    fn iteration_is_ascending_by_tag_regardless_of_insertion_order() {
        let mut ds = DataSet::new();
        ds.insert(el(Tag(0x0010, 0x0010))).unwrap();
        ds.insert(el(Tag(0x0008, 0x0018))).unwrap();
        ds.insert(el(Tag(0x0028, 0x0010))).unwrap();
        let tags: Vec<Tag> = ds.iter().map(|e| e.tag()).collect();
        assert_eq!(tags, vec![Tag(0x0008, 0x0018), Tag(0x0010, 0x0010), Tag(0x0028, 0x0010)]);
    }

    #[test]
    fn locked_dataset_rejects_mutation_and_keeps_count() {
        let mut ds = DataSet::new();
        ds.insert(el(Tag(0x0008, 0x0018))).unwrap();
        ds.lock();
        assert!(matches!(ds.insert(el(Tag(0x0010, 0x0010))), Err(crate::error::Error::Locked { .. })));
        assert!(matches!(ds.remove(Tag(0x0008, 0x0018)), Err(crate::error::Error::Locked { .. })));
        assert_eq!(ds.count(), 1);
    }

    #[test]
    fn remove_absent_tag_is_a_noop() {
        let mut ds = DataSet::new();
        assert_eq!(ds.remove(Tag(0x0008, 0x0018)).unwrap(), false);
    }

    #[test]
    fn copy_tags_is_ascending() {
        let mut ds = DataSet::new();
        ds.insert(el(Tag(0x0028, 0x0010))).unwrap();
        ds.insert(el(Tag(0x0008, 0x0018))).unwrap();
        let mut out = Vec::new();
        ds.copy_tags(&mut out);
        assert_eq!(out, vec![Tag(0x0008, 0x0018), Tag(0x0028, 0x0010)]);
    }
}
