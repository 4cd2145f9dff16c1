//! A single DICOM data element: tag, VR, declared length, VM, and value.

use crate::error::{self, Error, Result};
use crate::length::Length;
use crate::tag::Tag;
use crate::value::Value;
use crate::vr::{ValueKind, VR};
use snafu::ensure;

/// A tag, VR, declared length, value multiplicity, and owned value.
///
/// Construction validates the invariants from the data model: the value's
/// shape must match the VR's [`ValueKind`], string values must respect the
/// VR's per-value character capacity, and the declared length is derived
/// from the value and rounded up to the next even number.
///
/// Building an element consumes the supplied [`Value`]; on a validation
/// failure the value is dropped along with the `Err`, which is the Rust
/// equivalent of the "constructor takes ownership and frees on failure"
/// contract the data model relies on when elements are chained into
/// [`crate::dataset::DataSet::insert`].
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: Tag,
    vr: VR,
    length: Length,
    vm: u32,
    value: Value,
}

impl Element {
    /// Construct an element, validating it against the invariants of its
    /// VR. Returns an error (and drops `value`) if the value's shape does
    /// not match the VR's value kind, or if a string value exceeds its
    /// VR's capacity.
    pub fn new(tag: Tag, vr: VR, value: Value) -> Result<Self> {
        let expected_kind = vr.value_kind();
        let actual_kind = match &value {
            Value::Strings(_) => ValueKind::StringList,
            Value::Text(_) => ValueKind::Text,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::F32(_) | Value::F64(_) | Value::I16(_) | Value::I32(_) | Value::I64(_)
            | Value::U16(_) | Value::U32(_) | Value::U64(_) => ValueKind::Numeric,
            Value::Tags(_) => ValueKind::Tag,
            Value::Sequence(_) => ValueKind::Sequence,
        };
        ensure!(
            actual_kind == expected_kind,
            error::MalformedSnafu {
                detail: format!("value kind {:?} does not match VR {}", actual_kind, vr)
            }
        );

        if let Value::Strings(strings) = &value {
            if let Some(max) = vr.max_value_chars() {
                for s in strings {
                    ensure!(
                        s.chars().count() <= max,
                        error::ValueTooLongSnafu { vr, len: s.chars().count(), max }
                    );
                }
            }
        }

        let vm = value.multiplicity();
        let length = match vr.element_size() {
            Some(size) => Length::defined(vm * size),
            None => Length::defined(value.raw_length()).to_even(),
        };

        Ok(Element { tag, vr, length, vm, value })
    }

    /// Construct an empty element of the given tag and VR (VM = 1, an
    /// empty value appropriate for that VR's kind).
    pub fn empty(tag: Tag, vr: VR) -> Result<Self> {
        let value = match vr.value_kind() {
            ValueKind::StringList => Value::Strings(Default::default()),
            ValueKind::Text => Value::Text(String::new()),
            ValueKind::Bytes => Value::Bytes(Vec::new()),
            ValueKind::Numeric => match vr {
                VR::FL => Value::F32(Default::default()),
                VR::FD => Value::F64(Default::default()),
                VR::SS => Value::I16(Default::default()),
                VR::SL => Value::I32(Default::default()),
                VR::SV => Value::I64(Default::default()),
                VR::US => Value::U16(Default::default()),
                VR::UL => Value::U32(Default::default()),
                VR::UV => Value::U64(Default::default()),
                _ => unreachable!("non-numeric VR in numeric branch"),
            },
            ValueKind::Tag => Value::Tags(Default::default()),
            ValueKind::Sequence => Value::Sequence(crate::sequence::Sequence::new()),
        };
        Element::new(tag, vr, value)
    }

    /// Construct a data element directly from an already-decoded header
    /// and value, skipping capacity re-validation. Used by the stream
    /// reader, which has already sized the value according to the header
    /// it read off the wire.
    pub(crate) fn from_parts(tag: Tag, vr: VR, length: Length, vm: u32, value: Value) -> Self {
        Element { tag, vr, length, vm, value }
    }

    /// The element's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// The element's value representation.
    pub fn vr(&self) -> VR {
        self.vr
    }

    /// The element's declared length, in bytes, even-padded.
    pub fn length(&self) -> Length {
        self.length
    }

    /// The element's value multiplicity.
    pub fn vm(&self) -> u32 {
        self.vm
    }

    /// Borrow the element's value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Mutably borrow the element's value.
    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    /// Consume the element, returning its owned value.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Copy out the element's value as a vector of owned strings,
    /// regardless of whether it is stored as a string list or a single
    /// text block. Returns `Err` if the value is numeric, byte, tag, or
    /// sequence typed.
    pub fn copy_strings(&self) -> Result<Vec<String>> {
        match &self.value {
            Value::Strings(v) => Ok(v.to_vec()),
            Value::Text(s) => Ok(vec![s.clone()]),
            _ => Err(Error::malformed(format!(
                "element tagged {} (VR {}) does not hold a string value",
                self.tag, self.vr
            ))),
        }
    }
}
