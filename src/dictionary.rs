//! The attribute dictionary collaborator.
//!
//! Resolving a tag to its value representation or its keyword is explicitly
//! out of scope for the core data model and parser: those components only
//! depend on the two operations below, through the [`DataDictionary`] trait.
//! A minimal standard dictionary, covering the attributes this crate itself
//! needs to parse file meta information and pixel data geometry, is
//! provided as [`StandardDataDictionary`]; a full dictionary implementation
//! is an external concern.

use crate::tag::Tag;
use crate::vr::VR;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::Debug;

/// A source of VR and keyword information for DICOM tags.
pub trait DataDictionary: Debug {
    /// The value representation typically associated with this tag, if the
    /// dictionary recognizes it.
    fn vr_of(&self, tag: Tag) -> Option<VR>;

    /// The keyword (alias) of this tag, if the dictionary recognizes it.
    fn keyword_of(&self, tag: Tag) -> Option<&str>;
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    tag: Tag,
    keyword: &'static str,
    vr: VR,
}

/// The built-in attribute table. This is intentionally small: it lists the
/// file meta attributes and the image pixel description attributes needed
/// to drive parsing and frame extraction, not a full copy of PS3.6.
static ENTRIES: &[Entry] = &[
    Entry { tag: Tag(0x0002, 0x0000), keyword: "FileMetaInformationGroupLength", vr: VR::UL },
    Entry { tag: Tag(0x0002, 0x0001), keyword: "FileMetaInformationVersion", vr: VR::OB },
    Entry { tag: Tag(0x0002, 0x0002), keyword: "MediaStorageSOPClassUID", vr: VR::UI },
    Entry { tag: Tag(0x0002, 0x0003), keyword: "MediaStorageSOPInstanceUID", vr: VR::UI },
    Entry { tag: Tag(0x0002, 0x0010), keyword: "TransferSyntaxUID", vr: VR::UI },
    Entry { tag: Tag(0x0002, 0x0012), keyword: "ImplementationClassUID", vr: VR::UI },
    Entry { tag: Tag(0x0002, 0x0013), keyword: "ImplementationVersionName", vr: VR::SH },
    Entry { tag: Tag(0x0002, 0x0016), keyword: "SourceApplicationEntityTitle", vr: VR::AE },
    Entry { tag: Tag(0x0002, 0x0017), keyword: "SendingApplicationEntityTitle", vr: VR::AE },
    Entry { tag: Tag(0x0002, 0x0018), keyword: "ReceivingApplicationEntityTitle", vr: VR::AE },
    Entry { tag: Tag(0x0002, 0x0102), keyword: "PrivateInformation", vr: VR::OB },
    Entry { tag: Tag(0x0008, 0x0005), keyword: "SpecificCharacterSet", vr: VR::CS },
    Entry { tag: Tag(0x0008, 0x0008), keyword: "ImageType", vr: VR::CS },
    Entry { tag: Tag(0x0008, 0x0016), keyword: "SOPClassUID", vr: VR::UI },
    Entry { tag: Tag(0x0008, 0x0018), keyword: "SOPInstanceUID", vr: VR::UI },
    Entry { tag: Tag(0x0018, 0x0050), keyword: "SliceThickness", vr: VR::DS },
    Entry { tag: Tag(0x0028, 0x0002), keyword: "SamplesPerPixel", vr: VR::US },
    Entry { tag: Tag(0x0028, 0x0004), keyword: "PhotometricInterpretation", vr: VR::CS },
    Entry { tag: Tag(0x0028, 0x0006), keyword: "PlanarConfiguration", vr: VR::US },
    Entry { tag: Tag(0x0028, 0x0008), keyword: "NumberOfFrames", vr: VR::IS },
    Entry { tag: Tag(0x0028, 0x0010), keyword: "Rows", vr: VR::US },
    Entry { tag: Tag(0x0028, 0x0011), keyword: "Columns", vr: VR::US },
    Entry { tag: Tag(0x0028, 0x0100), keyword: "BitsAllocated", vr: VR::US },
    Entry { tag: Tag(0x0028, 0x0101), keyword: "BitsStored", vr: VR::US },
    Entry { tag: Tag(0x0028, 0x0102), keyword: "HighBit", vr: VR::US },
    Entry { tag: Tag(0x0028, 0x0103), keyword: "PixelRepresentation", vr: VR::US },
    Entry { tag: Tag(0x0028, 0x9110), keyword: "PixelMeasuresSequence", vr: VR::SQ },
    Entry { tag: Tag(0x7FE0, 0x0008), keyword: "FloatPixelData", vr: VR::OF },
    Entry { tag: Tag(0x7FE0, 0x0009), keyword: "DoubleFloatPixelData", vr: VR::OD },
    Entry { tag: Tag(0x7FE0, 0x0010), keyword: "PixelData", vr: VR::OW },
];

static BY_TAG: Lazy<HashMap<Tag, &'static Entry>> =
    Lazy::new(|| ENTRIES.iter().map(|e| (e.tag, e)).collect());

/// The built-in standard dictionary.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardDataDictionary;

impl DataDictionary for StandardDataDictionary {
    fn vr_of(&self, tag: Tag) -> Option<VR> {
        BY_TAG.get(&tag).map(|e| e.vr)
    }

    fn keyword_of(&self, tag: Tag) -> Option<&str> {
        BY_TAG.get(&tag).map(|e| e.keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_tags() {
        let dict = StandardDataDictionary;
        assert_eq!(dict.vr_of(Tag(0x0028, 0x0010)), Some(VR::US));
        assert_eq!(dict.keyword_of(Tag(0x0028, 0x0010)), Some("Rows"));
    }

    #[test]
    fn unknown_tag_resolves_to_none() {
        let dict = StandardDataDictionary;
        assert_eq!(dict.vr_of(Tag(0x0009, 0x0001)), None);
        assert_eq!(dict.keyword_of(Tag(0x0009, 0x0001)), None);
    }
}
