//! The value store: the tagged union holding a single element's decoded
//! content.
//!
//! Every variant corresponds to one of the [`ValueKind`](crate::vr::ValueKind)
//! classes a VR can decode into. Only [`Value::Sequence`] carries a nested
//! [`Sequence`]; every other VR carries a flat array of strings, numbers,
//! bytes, or tags.

use crate::sequence::Sequence;
use crate::tag::Tag;
use smallvec::SmallVec;

/// Inline capacity for value vectors; most elements are single- or
/// few-valued, so this avoids a heap allocation in the common case.
pub type C<T> = SmallVec<[T; 2]>;

/// The decoded value of a data element, discriminated by VR class.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A backslash-separated list of strings (AE, AS, CS, DA, DT, IS, DS,
    /// LO, PN, SH, TM, UI).
    Strings(C<String>),
    /// A single text block (LT, ST, UR, UT). Always VM = 1, even if the
    /// content happens to contain a backslash.
    Text(String),
    /// An opaque byte buffer (OB, OD, OF, OV, OW, UC, UN). Always VM = 1.
    Bytes(Vec<u8>),
    /// `FL` values.
    F32(C<f32>),
    /// `FD` values.
    F64(C<f64>),
    /// `SS` values.
    I16(C<i16>),
    /// `SL` values.
    I32(C<i32>),
    /// `SV` values.
    I64(C<i64>),
    /// `US` values.
    U16(C<u16>),
    /// `UL` values.
    U32(C<u32>),
    /// `UV` values.
    U64(C<u64>),
    /// `AT` values.
    Tags(C<Tag>),
    /// The value of a VR=SQ element.
    Sequence(Sequence),
}

impl Value {
    /// The value multiplicity: the number of values held, as it would be
    /// reported by the element's VM.
    pub fn multiplicity(&self) -> u32 {
        match self {
            Value::Strings(v) => (v.len().max(1)) as u32,
            Value::Text(_) | Value::Bytes(_) => 1,
            Value::F32(v) => v.len() as u32,
            Value::F64(v) => v.len() as u32,
            Value::I16(v) => v.len() as u32,
            Value::I32(v) => v.len() as u32,
            Value::I64(v) => v.len() as u32,
            Value::U16(v) => v.len() as u32,
            Value::U32(v) => v.len() as u32,
            Value::U64(v) => v.len() as u32,
            Value::Tags(v) => v.len() as u32,
            Value::Sequence(seq) => seq.count() as u32,
        }
    }

    /// The declared byte length this value would occupy on the wire,
    /// before even-padding. For string lists this is the sum of the UTF-8
    /// byte lengths of each value plus a 2-byte separator between
    /// consecutive values.
    pub fn raw_length(&self) -> u32 {
        match self {
            Value::Strings(v) => {
                let sum: usize = v.iter().map(|s| s.len()).sum();
                let seps = 2 * v.len().saturating_sub(1);
                (sum + seps) as u32
            }
            Value::Text(s) => s.len() as u32,
            Value::Bytes(b) => b.len() as u32,
            Value::F32(v) => (v.len() * 4) as u32,
            Value::F64(v) => (v.len() * 8) as u32,
            Value::I16(v) => (v.len() * 2) as u32,
            Value::I32(v) => (v.len() * 4) as u32,
            Value::I64(v) => (v.len() * 8) as u32,
            Value::U16(v) => (v.len() * 2) as u32,
            Value::U32(v) => (v.len() * 4) as u32,
            Value::U64(v) => (v.len() * 8) as u32,
            Value::Tags(v) => (v.len() * 4) as u32,
            Value::Sequence(_) => 0,
        }
    }

    /// Borrow this value as a slice of strings, if it holds a string list.
    pub fn strings(&self) -> Option<&[String]> {
        match self {
            Value::Strings(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow this value as a single text block, if applicable.
    pub fn text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow this value as an opaque byte buffer, if applicable.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Borrow the nested sequence, if this value holds one.
    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    /// Mutably borrow the nested sequence, if this value holds one.
    pub fn as_sequence_mut(&mut self) -> Option<&mut Sequence> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }
}

macro_rules! numeric_accessor {
    ($method:ident, $variant:ident, $t:ty) => {
        impl Value {
            /// Borrow this value as a numeric slice, if the variant matches.
            pub fn $method(&self) -> Option<&[$t]> {
                match self {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

numeric_accessor!(f32s, F32, f32);
numeric_accessor!(f64s, F64, f64);
numeric_accessor!(i16s, I16, i16);
numeric_accessor!(i32s, I32, i32);
numeric_accessor!(i64s, I64, i64);
numeric_accessor!(u16s, U16, u16);
numeric_accessor!(u32s, U32, u32);
numeric_accessor!(u64s, U64, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplicity_of_empty_strings_is_one() {
        let v = Value::Strings(C::new());
        assert_eq!(v.multiplicity(), 1);
    }

    #[test]
    fn text_block_is_always_single_valued() {
        let v = Value::Text("a\\b\\c".to_string());
        assert_eq!(v.multiplicity(), 1);
        assert_eq!(v.text(), Some("a\\b\\c"));
    }

    #[test]
    fn raw_length_accounts_for_separators() {
        let v = Value::Strings(C::from_vec(vec![
            "ORIGINAL".to_string(),
            "PRIMARY".to_string(),
            "VOLUME".to_string(),
            "NONE".to_string(),
        ]));
        assert_eq!(v.multiplicity(), 4);
        assert_eq!(v.raw_length(), 8 + 7 + 6 + 4 + 3 * 2);
    }
}
