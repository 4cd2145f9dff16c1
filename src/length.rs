//! Element and item byte lengths, with DICOM's "undefined length" sentinel.

use std::fmt;

const UNDEFINED_LEN: u32 = 0xFFFF_FFFF;

/// A byte length as found on the wire in an element or item header.
///
/// The raw value `0xFFFF_FFFF` is reserved to mean "undefined", used by
/// sequences and encapsulated pixel data items whose extent is only known
/// once a delimiter is reached. Because of this, `Length` does not behave
/// like a plain integer: two undefined lengths do not compare equal, and
/// ordering comparisons against an undefined length are never true.
///
/// ```
/// # use dicom_reader::Length;
/// assert_ne!(Length::UNDEFINED, Length::UNDEFINED);
/// assert!(!(Length::UNDEFINED < Length::defined(64)));
/// ```
#[derive(Clone, Copy)]
pub struct Length(pub u32);

impl Length {
    /// The undefined length sentinel.
    pub const UNDEFINED: Self = Length(UNDEFINED_LEN);

    /// Wrap a raw 32-bit length value as read from the wire.
    pub fn new(len: u32) -> Self {
        Length(len)
    }

    /// Construct a length known to be defined.
    ///
    /// # Panics
    /// Panics if `len` is the undefined-length sentinel.
    pub fn defined(len: u32) -> Self {
        assert_ne!(len, UNDEFINED_LEN);
        Length(len)
    }

    /// Whether this length is the undefined-length sentinel.
    #[inline]
    pub fn is_undefined(self) -> bool {
        self.0 == UNDEFINED_LEN
    }

    /// Whether this length carries a concrete byte count.
    #[inline]
    pub fn is_defined(self) -> bool {
        !self.is_undefined()
    }

    /// The concrete byte count, or `None` if undefined.
    #[inline]
    pub fn get(self) -> Option<u32> {
        match self.0 {
            UNDEFINED_LEN => None,
            v => Some(v),
        }
    }

    /// Round a defined length up to the next even number. DICOM requires
    /// element values to occupy an even number of bytes; odd-length
    /// values are padded by the writer, so a declared length is always
    /// rounded this way on construction.
    pub fn to_even(self) -> Self {
        match self.0 {
            UNDEFINED_LEN => self,
            v if v % 2 == 1 => Length(v + 1),
            v => Length(v),
        }
    }
}

impl From<u32> for Length {
    fn from(o: u32) -> Self {
        Length(o)
    }
}

impl PartialEq<Length> for Length {
    fn eq(&self, rhs: &Length) -> bool {
        match (self.0, rhs.0) {
            (UNDEFINED_LEN, _) | (_, UNDEFINED_LEN) => false,
            (l1, l2) => l1 == l2,
        }
    }
}

impl PartialOrd<Length> for Length {
    fn partial_cmp(&self, rhs: &Length) -> Option<std::cmp::Ordering> {
        match (self.0, rhs.0) {
            (UNDEFINED_LEN, _) | (_, UNDEFINED_LEN) => None,
            (l1, l2) => Some(l1.cmp(&l2)),
        }
    }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            UNDEFINED_LEN => f.write_str("Length(Undefined)"),
            l => f.debug_tuple("Length").field(&l).finish(),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            UNDEFINED_LEN => f.write_str("U/L"),
            l => write!(f, "{}", l),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_never_equal() {
        assert_ne!(Length::UNDEFINED, Length::UNDEFINED);
    }

    #[test]
    fn even_padding() {
        assert_eq!(Length::defined(6).to_even(), Length::defined(6));
        assert_eq!(Length::defined(5).to_even().get(), Some(6));
        assert!(Length::UNDEFINED.to_even().is_undefined());
    }

    #[test]
    fn ordering_with_undefined_is_never_true() {
        assert!(!(Length::UNDEFINED < Length::defined(64)));
        assert!(!(Length::UNDEFINED > Length::defined(64)));
        assert!(Length::defined(16) < Length::defined(64));
    }
}
