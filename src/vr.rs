//! Value representation codes and their wire properties.

use std::fmt;
use std::str::{from_utf8, FromStr};

/// The kind of value a VR's bytes decode into.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum ValueKind {
    /// A backslash-separated list of strings.
    StringList,
    /// A single string block; the backslash is not a separator.
    Text,
    /// An opaque byte buffer.
    Bytes,
    /// A vector of fixed-width numbers.
    Numeric,
    /// A vector of attribute tags (4 bytes each).
    Tag,
    /// A nested sequence of datasets.
    Sequence,
}

/// A DICOM value representation: a two-letter code that determines how an
/// element's bytes are framed and decoded.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Ord, PartialOrd)]
pub enum VR {
    /// Application Entity
    AE,
    /// Age String
    AS,
    /// Attribute Tag
    AT,
    /// Code String
    CS,
    /// Date
    DA,
    /// Decimal String
    DS,
    /// Date Time
    DT,
    /// Floating Point Single
    FL,
    /// Floating Point Double
    FD,
    /// Integer String
    IS,
    /// Long String
    LO,
    /// Long Text
    LT,
    /// Other Byte
    OB,
    /// Other Double
    OD,
    /// Other Float
    OF,
    /// Other Very Long
    OV,
    /// Other Word
    OW,
    /// Person Name
    PN,
    /// Short String
    SH,
    /// Signed Long
    SL,
    /// Sequence of Items
    SQ,
    /// Signed Short
    SS,
    /// Short Text
    ST,
    /// Signed Very Long
    SV,
    /// Time
    TM,
    /// Unlimited Characters
    UC,
    /// Unique Identifier (UID)
    UI,
    /// Unsigned Long
    UL,
    /// Unknown
    UN,
    /// Universal Resource Identifier or Universal Resource Locator (URI/URL)
    UR,
    /// Unsigned Short
    US,
    /// Unlimited Text
    UT,
    /// Unsigned Very Long
    UV,
}

impl VR {
    /// All value representations recognized by this library.
    pub const ALL: [VR; 31] = [
        VR::AE,
        VR::AS,
        VR::AT,
        VR::CS,
        VR::DA,
        VR::DS,
        VR::DT,
        VR::FL,
        VR::FD,
        VR::IS,
        VR::LO,
        VR::LT,
        VR::OB,
        VR::OD,
        VR::OF,
        VR::OV,
        VR::OW,
        VR::PN,
        VR::SH,
        VR::SL,
        VR::SQ,
        VR::SS,
        VR::ST,
        VR::SV,
        VR::TM,
        VR::UC,
        VR::UI,
        VR::UL,
        VR::UN,
        VR::UR,
        VR::US,
        VR::UT,
        VR::UV,
    ];

    /// Parse a VR out of its two-byte wire representation. Unrecognized
    /// byte pairs yield `None` rather than falling back silently, so
    /// callers can decide how to treat an invalid VR (the reference
    /// parser maps it to `UN`).
    pub fn from_binary(chars: [u8; 2]) -> Option<Self> {
        from_utf8(chars.as_ref()).ok().and_then(|s| VR::from_str(s).ok())
    }

    /// The two-letter textual representation of this VR.
    pub fn to_str(self) -> &'static str {
        use VR::*;
        match self {
            AE => "AE",
            AS => "AS",
            AT => "AT",
            CS => "CS",
            DA => "DA",
            DS => "DS",
            DT => "DT",
            FL => "FL",
            FD => "FD",
            IS => "IS",
            LO => "LO",
            LT => "LT",
            OB => "OB",
            OD => "OD",
            OF => "OF",
            OV => "OV",
            OW => "OW",
            PN => "PN",
            SH => "SH",
            SL => "SL",
            SQ => "SQ",
            SS => "SS",
            ST => "ST",
            SV => "SV",
            TM => "TM",
            UC => "UC",
            UI => "UI",
            UL => "UL",
            UN => "UN",
            UR => "UR",
            US => "US",
            UT => "UT",
            UV => "UV",
        }
    }

    /// This VR's two-byte wire representation.
    pub fn to_bytes(self) -> [u8; 2] {
        let bytes = self.to_str().as_bytes();
        [bytes[0], bytes[1]]
    }

    /// The kind of value this VR decodes into.
    pub fn value_kind(self) -> ValueKind {
        use VR::*;
        match self {
            AE | AS | CS | DA | DT | IS | DS | LO | PN | SH | TM | UI => ValueKind::StringList,
            LT | ST | UR | UT => ValueKind::Text,
            OB | OD | OF | OV | OW | UC | UN => ValueKind::Bytes,
            FL | FD | SS | SL | SV | US | UL | UV => ValueKind::Numeric,
            AT => ValueKind::Tag,
            SQ => ValueKind::Sequence,
        }
    }

    /// The element size in bytes for a fixed-width numeric VR (or `AT`,
    /// whose values are 4-byte tag pairs). Returns `None` for
    /// non-numeric VRs.
    pub fn element_size(self) -> Option<u32> {
        use VR::*;
        match self {
            FL => Some(4),
            FD => Some(8),
            SS => Some(2),
            SL => Some(4),
            SV => Some(8),
            US => Some(2),
            UL => Some(4),
            UV => Some(8),
            AT => Some(4),
            _ => None,
        }
    }

    /// Whether this VR is read with a 16-bit length header in explicit VR
    /// encoding (as opposed to two reserved bytes plus a 32-bit length).
    pub fn has_short_length_header(self) -> bool {
        use VR::*;
        matches!(
            self,
            AE | AS | AT | CS | DA | DS | DT | FL | FD | IS | LO | LT | PN | SH | SL | SS | ST
                | TM | UI | UL | US
        )
    }

    /// The maximum number of characters permitted in a single value of
    /// this VR, for string-like VRs. `None` for VRs with no defined cap
    /// (or non-string VRs).
    pub fn max_value_chars(self) -> Option<usize> {
        use VR::*;
        match self {
            AE => Some(16),
            AS => Some(4),
            CS => Some(16),
            DA => Some(8),
            DS => Some(16),
            DT => Some(26),
            IS => Some(12),
            LO => Some(64),
            PN => Some(324),
            SH => Some(16),
            TM => Some(16),
            UI => Some(64),
            LT => Some(10240),
            ST => Some(1024),
            UR => None,
            UT => None,
            UC => None,
            _ => None,
        }
    }

    /// Whether a single element of this VR may hold more than one value
    /// (backslash-separated). Text-block VRs always carry VM = 1 even
    /// though their value kind is string-shaped.
    pub fn is_multivalued(self) -> bool {
        matches!(self.value_kind(), ValueKind::StringList | ValueKind::Numeric | ValueKind::Tag)
    }
}

impl FromStr for VR {
    type Err = &'static str;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        use VR::*;
        match string {
            "AE" => Ok(AE),
            "AS" => Ok(AS),
            "AT" => Ok(AT),
            "CS" => Ok(CS),
            "DA" => Ok(DA),
            "DS" => Ok(DS),
            "DT" => Ok(DT),
            "FL" => Ok(FL),
            "FD" => Ok(FD),
            "IS" => Ok(IS),
            "LO" => Ok(LO),
            "LT" => Ok(LT),
            "OB" => Ok(OB),
            "OD" => Ok(OD),
            "OF" => Ok(OF),
            "OV" => Ok(OV),
            "OW" => Ok(OW),
            "PN" => Ok(PN),
            "SH" => Ok(SH),
            "SL" => Ok(SL),
            "SQ" => Ok(SQ),
            "SS" => Ok(SS),
            "ST" => Ok(ST),
            "SV" => Ok(SV),
            "TM" => Ok(TM),
            "UC" => Ok(UC),
            "UI" => Ok(UI),
            "UL" => Ok(UL),
            "UN" => Ok(UN),
            "UR" => Ok(UR),
            "US" => Ok(US),
            "UT" => Ok(UT),
            "UV" => Ok(UV),
            _ => Err("no such value representation"),
        }
    }
}

impl fmt::Display for VR {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Whether a two-letter code is a member of the value representations
/// recognized by this library.
pub fn is_valid_vr(code: &str) -> bool {
    VR::from_str(code).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_binary() {
        for vr in VR::ALL {
            assert_eq!(VR::from_binary(vr.to_bytes()), Some(vr));
        }
    }

    #[test]
    fn numeric_element_sizes() {
        assert_eq!(VR::US.element_size(), Some(2));
        assert_eq!(VR::UL.element_size(), Some(4));
        assert_eq!(VR::SV.element_size(), Some(8));
        assert_eq!(VR::CS.element_size(), None);
    }

    #[test]
    fn short_header_set_matches_spec() {
        assert!(VR::AE.has_short_length_header());
        assert!(VR::AT.has_short_length_header());
        assert!(!VR::OB.has_short_length_header());
        assert!(!VR::SQ.has_short_length_header());
        assert!(!VR::UN.has_short_length_header());
    }

    #[test]
    fn text_block_is_single_valued() {
        assert!(!VR::UT.is_multivalued());
        assert!(!VR::LT.is_multivalued());
        assert!(VR::CS.is_multivalued());
    }

    #[test]
    fn uc_is_opaque_bytes_not_a_string_list() {
        assert_eq!(VR::UC.value_kind(), ValueKind::Bytes);
        assert!(!VR::UC.is_multivalued());
        assert!(!VR::UC.has_short_length_header());
    }
}
