//! Profile file loading and validation.
//!
//! A profile file is TOML:
//!
//! ```text
//! family = "virtex4"
//! device = "XC4VLX15"
//! top_rows = 2
//! bottom_rows = 2
//!
//! [subtypes]        # optional; family presets supply the usual ones
//! CLB = 22
//!
//! [[block_types]]
//! name = "LOGIC"
//! columns = ["IOB", "CLB", "CLB", "LOGIC_OVERHEAD"]
//! ```
//!
//! `frame_size` and a `[far]` table may override the family defaults and are
//! required for `family = "custom"`.

use crate::error::ProfileError;
use crate::layout::FarLayout;
use crate::types::{BlockSubType, BlockType, DeviceProfile, Family};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawProfile {
    family: Family,
    #[serde(default)]
    device: String,
    top_rows: u32,
    bottom_rows: u32,
    frame_size: Option<usize>,
    far: Option<FarLayout>,
    #[serde(default)]
    subtypes: BTreeMap<String, u32>,
    #[serde(default)]
    block_types: Vec<RawBlockType>,
}

#[derive(Debug, Deserialize)]
struct RawBlockType {
    name: String,
    columns: Vec<String>,
}

/// Loads and validates a profile from a TOML file.
pub fn load_profile(path: &Path) -> Result<DeviceProfile, ProfileError> {
    let content = std::fs::read_to_string(path)?;
    load_profile_from_str(&content)
}

/// Parses and validates a profile from a TOML string.
pub fn load_profile_from_str(content: &str) -> Result<DeviceProfile, ProfileError> {
    let raw: RawProfile =
        toml::from_str(content).map_err(|e| ProfileError::Parse(e.to_string()))?;

    let frame_size = raw
        .frame_size
        .or_else(|| raw.family.default_frame_size())
        .ok_or_else(|| ProfileError::MissingField("frame_size".to_string()))?;
    let far = raw
        .far
        .or_else(|| raw.family.default_far_layout())
        .ok_or_else(|| ProfileError::MissingField("far".to_string()))?;

    let mut subtypes: BTreeMap<String, u32> = raw
        .family
        .default_subtypes()
        .iter()
        .map(|&(name, frames)| (name.to_string(), frames))
        .collect();
    subtypes.extend(raw.subtypes);

    let block_types = raw
        .block_types
        .iter()
        .map(|bt| {
            let names: Vec<&str> = bt.columns.iter().map(String::as_str).collect();
            Ok(BlockType::new(
                bt.name.clone(),
                resolve_columns(&bt.name, &names, &subtypes)?,
            ))
        })
        .collect::<Result<Vec<_>, ProfileError>>()?;

    DeviceProfile::new(
        raw.family,
        raw.device,
        frame_size,
        raw.top_rows,
        raw.bottom_rows,
        block_types,
        far,
    )
}

/// Resolves column subtype names against a name-to-frames table.
pub(crate) fn resolve_columns(
    block_type: &str,
    names: &[&str],
    subtypes: &BTreeMap<String, u32>,
) -> Result<Vec<BlockSubType>, ProfileError> {
    names
        .iter()
        .map(|&name| {
            subtypes
                .get(name)
                .map(|&frames| BlockSubType::new(name, frames))
                .ok_or_else(|| ProfileError::UnknownSubType {
                    block_type: block_type.to_string(),
                    subtype: name.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
family = "virtex4"
device = "TINY"
top_rows = 1
bottom_rows = 1

[[block_types]]
name = "LOGIC"
columns = ["CLB", "CLK"]

[[block_types]]
name = "BRAM"
columns = ["BRAMCONTENT", "BRAMOVERHEAD"]
"#;

    #[test]
    fn parse_minimal_profile() {
        let p = load_profile_from_str(MINIMAL).unwrap();
        assert_eq!(p.device(), "TINY");
        assert_eq!(p.family(), Family::Virtex4);
        assert_eq!(p.frame_size(), 41);
        assert_eq!(p.far_layout(), &FarLayout::VIRTEX4);
        assert_eq!(p.block_type_count(), 2);
        assert_eq!(p.frames_per_configuration_block(0, 0), 22);
        assert_eq!(p.frames_per_configuration_block(0, 1), 3);
        assert_eq!(p.frames_per_configuration_block(1, 0), 64);
    }

    #[test]
    fn subtypes_override_family_defaults() {
        let toml = format!("{MINIMAL}\n[subtypes]\nCLB = 4\n");
        let p = load_profile_from_str(&toml).unwrap();
        assert_eq!(p.frames_per_configuration_block(0, 0), 4);
    }

    #[test]
    fn custom_family_needs_geometry() {
        let toml = r#"
family = "custom"
device = "X"
top_rows = 1
bottom_rows = 1

[subtypes]
A = 2

[[block_types]]
name = "LOGIC"
columns = ["A"]
"#;
        let err = load_profile_from_str(toml).unwrap_err();
        assert!(matches!(err, ProfileError::MissingField(ref f) if f == "frame_size"));
    }

    #[test]
    fn custom_family_full() {
        let toml = r#"
family = "custom"
device = "X"
frame_size = 3
top_rows = 2
bottom_rows = 1

[far]
top_bottom = { shift = 16, width = 1 }
block_type = { shift = 17, width = 2 }
row = { shift = 12, width = 4 }
column = { shift = 4, width = 8 }
minor = { shift = 0, width = 4 }

[subtypes]
A = 2
B = 5

[[block_types]]
name = "LOGIC"
columns = ["A", "B", "A"]
"#;
        let p = load_profile_from_str(toml).unwrap();
        assert_eq!(p.frame_size(), 3);
        assert_eq!(p.far_layout().block_type.shift, 17);
        assert_eq!(p.number_of_columns(0), 3);
        assert_eq!(p.top_rows(), 2);
    }

    #[test]
    fn far_shift_out_of_range_errors() {
        let toml = r#"
family = "custom"
device = "X"
frame_size = 3
top_rows = 1
bottom_rows = 1

[far]
top_bottom = { shift = 4294967295, width = 1 }
block_type = { shift = 17, width = 2 }
row = { shift = 12, width = 4 }
column = { shift = 4, width = 8 }
minor = { shift = 0, width = 4 }

[subtypes]
A = 2

[[block_types]]
name = "LOGIC"
columns = ["A"]
"#;
        let err = load_profile_from_str(toml).unwrap_err();
        assert!(matches!(err, ProfileError::Validation(ref m) if m.contains("top_bottom")));
    }

    #[test]
    fn virtex5_uses_family_subtypes() {
        let toml = r#"
family = "virtex5"
device = "V5"
top_rows = 1
bottom_rows = 1

[[block_types]]
name = "LOGIC"
columns = ["IOB", "CLB", "DSP", "CLK"]

[[block_types]]
name = "BRAM"
columns = ["BRAMCONTENT"]
"#;
        let p = load_profile_from_str(toml).unwrap();
        assert_eq!(p.frames_per_configuration_block(0, 1), 36);
        assert_eq!(p.frames_per_configuration_block(1, 0), 128);
    }

    #[test]
    fn unknown_subtype_errors() {
        let toml = MINIMAL.replace("\"CLK\"", "\"URAM\"");
        let err = load_profile_from_str(&toml).unwrap_err();
        assert!(matches!(err, ProfileError::UnknownSubType { .. }));
    }

    #[test]
    fn missing_device_errors() {
        let toml = MINIMAL.replace("device = \"TINY\"\n", "");
        let err = load_profile_from_str(&toml).unwrap_err();
        assert!(matches!(err, ProfileError::MissingField(ref f) if f == "device"));
    }

    #[test]
    fn no_block_types_errors() {
        let toml = r#"
family = "virtex4"
device = "EMPTY"
top_rows = 1
bottom_rows = 1
"#;
        let err = load_profile_from_str(toml).unwrap_err();
        assert!(matches!(err, ProfileError::MissingField(ref f) if f == "block_types"));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_profile_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ProfileError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let p = load_profile(file.path()).unwrap();
        assert_eq!(p.device(), "TINY");
    }

    #[test]
    fn io_error_from_nonexistent_file() {
        let err = load_profile(Path::new("/nonexistent/profile.toml")).unwrap_err();
        assert!(matches!(err, ProfileError::Io(_)));
    }
}
