//! Built-in part profiles.
//!
//! Column layouts follow the vendor part library for each device. Only the
//! configuration-address view is recorded here (block types and their
//! column subtypes), not the physical column order of the die.

use crate::error::ProfileError;
use crate::loader::resolve_columns;
use crate::types::{BlockType, DeviceProfile, Family};
use std::collections::BTreeMap;

struct PartDef {
    name: &'static str,
    family: Family,
    top_rows: u32,
    bottom_rows: u32,
    block_types: &'static [(&'static str, &'static [&'static str])],
}

const V4_BRAM_INTERCONNECT: &[&str] = &[
    "BRAMINTERCONNECT",
    "BRAMINTERCONNECT",
    "BRAMINTERCONNECT",
    "BRAMOVERHEAD",
];

const V4_BRAM_CONTENT: &[&str] = &["BRAMCONTENT", "BRAMCONTENT", "BRAMCONTENT", "BRAMOVERHEAD"];

const PARTS: &[PartDef] = &[
    PartDef {
        name: "XC4VFX12",
        family: Family::Virtex4,
        top_rows: 2,
        bottom_rows: 2,
        block_types: &[
            (
                "LOGIC",
                &[
                    "IOB", "CLB", "CLB", "CLB", "CLB", "CLB", "CLB", "CLB", "CLB", "CLB", "CLB",
                    "CLB", "CLB", "IOB", "CLK", "CLB", "CLB", "CLB", "CLB", "DSP", "CLB", "CLB",
                    "CLB", "CLB", "CLB", "CLB", "CLB", "CLB", "IOB", "LOGIC_OVERHEAD",
                ],
            ),
            ("BRAMINTERCONNECT", V4_BRAM_INTERCONNECT),
            ("BRAM", V4_BRAM_CONTENT),
        ],
    },
    PartDef {
        name: "XC4VLX15",
        family: Family::Virtex4,
        top_rows: 2,
        bottom_rows: 2,
        block_types: &[
            (
                "LOGIC",
                &[
                    "IOB", "CLB", "CLB", "CLB", "CLB", "CLB", "CLB", "CLB", "CLB", "DSP", "CLB",
                    "CLB", "CLB", "CLB", "IOB", "CLK", "CLB", "CLB", "CLB", "CLB", "CLB", "CLB",
                    "CLB", "CLB", "CLB", "CLB", "CLB", "CLB", "IOB", "LOGIC_OVERHEAD",
                ],
            ),
            ("BRAMINTERCONNECT", V4_BRAM_INTERCONNECT),
            ("BRAM", V4_BRAM_CONTENT),
        ],
    },
];

/// Names of every built-in part.
pub fn builtin_part_names() -> impl Iterator<Item = &'static str> {
    PARTS.iter().map(|p| p.name)
}

impl DeviceProfile {
    /// Returns the built-in profile for `part` (case-insensitive, e.g. "xc4vlx15").
    pub fn builtin(part: &str) -> Result<DeviceProfile, ProfileError> {
        let def = PARTS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(part))
            .ok_or_else(|| ProfileError::UnknownPart(part.to_string()))?;

        let subtypes: BTreeMap<String, u32> = def
            .family
            .default_subtypes()
            .iter()
            .map(|&(name, frames)| (name.to_string(), frames))
            .collect();
        let block_types = def
            .block_types
            .iter()
            .map(|&(name, columns)| {
                Ok(BlockType::new(
                    name,
                    resolve_columns(name, columns, &subtypes)?,
                ))
            })
            .collect::<Result<Vec<_>, ProfileError>>()?;

        let frame_size = def
            .family
            .default_frame_size()
            .ok_or_else(|| ProfileError::MissingField("frame_size".to_string()))?;
        let far = def
            .family
            .default_far_layout()
            .ok_or_else(|| ProfileError::MissingField("far".to_string()))?;

        DeviceProfile::new(
            def.family,
            def.name,
            frame_size,
            def.top_rows,
            def.bottom_rows,
            block_types,
            far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_part_validates() {
        for name in builtin_part_names() {
            let p = DeviceProfile::builtin(name).unwrap();
            assert_eq!(p.device(), name);
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let p = DeviceProfile::builtin("xc4vlx15").unwrap();
        assert_eq!(p.device(), "XC4VLX15");
        assert_eq!(p.frame_size(), 41);
    }

    #[test]
    fn lx15_geometry() {
        let p = DeviceProfile::builtin("XC4VLX15").unwrap();
        assert_eq!(p.block_type_count(), 3);
        assert_eq!(p.number_of_columns(0), 30);
        assert_eq!(p.number_of_columns(1), 4);
        assert_eq!(p.number_of_columns(2), 4);
        assert_eq!(p.block_subtype_name(0, 9), Some("DSP"));
        assert_eq!(p.frames_per_configuration_block(2, 0), 64);
        assert_eq!(p.block_type_index("BRAM"), Some(2));
    }

    #[test]
    fn unknown_part_errors() {
        let err = DeviceProfile::builtin("xc7a35t").unwrap_err();
        assert!(matches!(err, ProfileError::UnknownPart(_)));
    }
}
