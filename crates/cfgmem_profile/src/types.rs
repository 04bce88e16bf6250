//! The device configuration profile and its building blocks.

use crate::error::ProfileError;
use crate::layout::FarLayout;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Device family, which fixes the frame size and FAR layout unless overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// Xilinx Virtex-4.
    Virtex4,
    /// Xilinx Virtex-5.
    Virtex5,
    /// Xilinx Virtex-6.
    Virtex6,
    /// A family not known to this crate; every geometry value must be given.
    Custom,
}

impl Family {
    /// Frame size in 32-bit words, if the family defines one.
    pub fn default_frame_size(self) -> Option<usize> {
        match self {
            Family::Virtex4 | Family::Virtex5 => Some(41),
            Family::Virtex6 => Some(81),
            Family::Custom => None,
        }
    }

    /// FAR bit layout, if the family defines one.
    pub fn default_far_layout(self) -> Option<FarLayout> {
        match self {
            Family::Virtex4 => Some(FarLayout::VIRTEX4),
            Family::Virtex5 | Family::Virtex6 => Some(FarLayout::VIRTEX5),
            Family::Custom => None,
        }
    }

    /// Column subtypes and their frames per configuration block.
    pub fn default_subtypes(self) -> &'static [(&'static str, u32)] {
        match self {
            Family::Virtex4 => &[
                ("IOB", 30),
                ("CLB", 22),
                ("DSP", 21),
                ("CLK", 3),
                ("MGT", 20),
                ("LOGIC_OVERHEAD", 2),
                ("BRAMINTERCONNECT", 20),
                ("BRAMCONTENT", 64),
                ("BRAMOVERHEAD", 2),
            ],
            // UG191 frame counts per column type.
            Family::Virtex5 => &[
                ("IOB", 54),
                ("CLB", 36),
                ("DSP", 28),
                ("CLK", 4),
                ("GTP", 32),
                ("GTX", 32),
                ("LOGIC_OVERHEAD", 2),
                ("BRAMINTERCONNECT", 30),
                ("BRAMCONTENT", 128),
                ("BRAMOVERHEAD", 2),
            ],
            Family::Virtex6 => &[
                ("CLB", 36),
                ("IOB", 44),
                ("DSP", 28),
                ("CLK", 38),
                ("GTX", 30),
                ("GTH", 30),
                ("LOGIC_OVERHEAD", 2),
                ("BRAMINTERCONNECT", 28),
                ("BRAMCONTENT", 128),
                ("BRAMOVERHEAD", 2),
            ],
            Family::Custom => &[],
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Virtex4 => write!(f, "Virtex4"),
            Family::Virtex5 => write!(f, "Virtex5"),
            Family::Virtex6 => write!(f, "Virtex6"),
            Family::Custom => write!(f, "Custom"),
        }
    }
}

/// A kind of configuration column and how many frames one block of it spans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockSubType {
    /// Subtype name (e.g., "CLB", "BRAMCONTENT").
    pub name: String,
    /// Frames per configuration block.
    pub frames: u32,
}

impl BlockSubType {
    /// Creates a new subtype.
    pub fn new(name: impl Into<String>, frames: u32) -> Self {
        Self {
            name: name.into(),
            frames,
        }
    }
}

/// One FAR block type and the ordered subtypes of its columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockType {
    /// Block type name (e.g., "LOGIC", "BRAM").
    pub name: String,
    /// The subtype of every column, in FAR column order.
    pub columns: Vec<BlockSubType>,
}

impl BlockType {
    /// Creates a new block type.
    pub fn new(name: impl Into<String>, columns: Vec<BlockSubType>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }
}

/// Geometry of one device's configuration memory.
///
/// A profile is immutable once built: [`DeviceProfile::new`] validates every
/// value and callers only get read access afterwards. Memories share a
/// profile through `Arc<DeviceProfile>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceProfile {
    family: Family,
    device: String,
    frame_size: usize,
    top_rows: u32,
    bottom_rows: u32,
    block_types: Vec<BlockType>,
    far: FarLayout,
}

impl DeviceProfile {
    /// Builds and validates a profile.
    pub fn new(
        family: Family,
        device: impl Into<String>,
        frame_size: usize,
        top_rows: u32,
        bottom_rows: u32,
        block_types: Vec<BlockType>,
        far: FarLayout,
    ) -> Result<Self, ProfileError> {
        let profile = Self {
            family,
            device: device.into(),
            frame_size,
            top_rows,
            bottom_rows,
            block_types,
            far,
        };
        profile.validate()?;
        Ok(profile)
    }

    fn validate(&self) -> Result<(), ProfileError> {
        if self.device.is_empty() {
            return Err(ProfileError::MissingField("device".to_string()));
        }
        if self.frame_size == 0 {
            return Err(ProfileError::Validation(
                "frame_size must be at least one word".to_string(),
            ));
        }
        // Increment needs a last row in each half to wrap from.
        if self.top_rows == 0 || self.bottom_rows == 0 {
            return Err(ProfileError::Validation(
                "top_rows and bottom_rows must both be at least 1".to_string(),
            ));
        }
        if self.block_types.is_empty() {
            return Err(ProfileError::MissingField("block_types".to_string()));
        }
        for bt in &self.block_types {
            if bt.columns.is_empty() {
                return Err(ProfileError::Validation(format!(
                    "block type '{}' has no columns",
                    bt.name
                )));
            }
            if let Some(sub) = bt.columns.iter().find(|s| s.frames == 0) {
                return Err(ProfileError::Validation(format!(
                    "subtype '{}' in block type '{}' has zero frames",
                    sub.name, bt.name
                )));
            }
        }
        self.far.check().map_err(ProfileError::Validation)?;

        let max_columns = self.block_types.iter().map(|b| b.columns.len()).max();
        let max_frames = self
            .block_types
            .iter()
            .flat_map(|b| b.columns.iter().map(|s| s.frames))
            .max();
        let needs = [
            ("top_bottom", self.far.top_bottom.max_value(), 1u64),
            (
                "block_type",
                self.far.block_type.max_value(),
                self.block_types.len() as u64 - 1,
            ),
            (
                "row",
                self.far.row.max_value(),
                u64::from(self.top_rows.max(self.bottom_rows)) - 1,
            ),
            (
                "column",
                self.far.column.max_value(),
                max_columns.unwrap_or(1) as u64 - 1,
            ),
            (
                "minor",
                self.far.minor.max_value(),
                u64::from(max_frames.unwrap_or(1)) - 1,
            ),
        ];
        for (name, capacity, required) in needs {
            if u64::from(capacity) < required {
                return Err(ProfileError::Validation(format!(
                    "FAR field '{name}' holds at most {capacity} but the device needs {required}"
                )));
            }
        }
        Ok(())
    }

    /// The device family.
    pub fn family(&self) -> Family {
        self.family
    }

    /// The device name (e.g., "XC4VLX15").
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Number of 32-bit words in one frame.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// The ordered block types.
    pub fn block_types(&self) -> &[BlockType] {
        &self.block_types
    }

    /// Number of block types; any FAR with a larger block type is past the end.
    pub fn block_type_count(&self) -> u32 {
        self.block_types.len() as u32
    }

    /// Rows in the top half.
    pub fn top_rows(&self) -> u32 {
        self.top_rows
    }

    /// Rows in the bottom half.
    pub fn bottom_rows(&self) -> u32 {
        self.bottom_rows
    }

    /// Rows in the half selected by `top_bottom` (0 = top, anything else = bottom).
    pub fn rows_in_half(&self, top_bottom: u32) -> u32 {
        if top_bottom == 0 {
            self.top_rows
        } else {
            self.bottom_rows
        }
    }

    /// The FAR bit layout.
    pub fn far_layout(&self) -> &FarLayout {
        &self.far
    }

    /// Frames per configuration block of `column` in `block_type`.
    ///
    /// Returns 0 for a block type or column outside the device.
    pub fn frames_per_configuration_block(&self, block_type: u32, column: u32) -> u32 {
        self.block_types
            .get(block_type as usize)
            .and_then(|bt| bt.columns.get(column as usize))
            .map_or(0, |sub| sub.frames)
    }

    /// Number of columns in `block_type`, or 0 if the block type does not exist.
    pub fn number_of_columns(&self, block_type: u32) -> u32 {
        self.block_types
            .get(block_type as usize)
            .map_or(0, |bt| bt.columns.len() as u32)
    }

    /// Name of the block type at `index`.
    pub fn block_type_name(&self, index: u32) -> Option<&str> {
        self.block_types
            .get(index as usize)
            .map(|bt| bt.name.as_str())
    }

    /// Name of the subtype at `column` of `block_type`.
    pub fn block_subtype_name(&self, block_type: u32, column: u32) -> Option<&str> {
        self.block_types
            .get(block_type as usize)
            .and_then(|bt| bt.columns.get(column as usize))
            .map(|sub| sub.name.as_str())
    }

    /// Index of the block type called `name`.
    pub fn block_type_index(&self, name: &str) -> Option<u32> {
        self.block_types
            .iter()
            .position(|bt| bt.name == name)
            .map(|i| i as u32)
    }
}

impl fmt::Display for DeviceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Device: {} ({})", self.device, self.family)?;
        writeln!(f, "Frame Size: {}", self.frame_size)?;
        writeln!(f, "Rows: {} top, {} bottom", self.top_rows, self.bottom_rows)?;
        for bt in &self.block_types {
            write!(f, "\t{} ({} columns):", bt.name, bt.columns.len())?;
            for sub in &bt.columns {
                write!(f, " {}", sub.name)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_block_types() -> Vec<BlockType> {
        vec![
            BlockType::new(
                "LOGIC",
                vec![BlockSubType::new("CLB", 2), BlockSubType::new("IOB", 3)],
            ),
            BlockType::new("BRAM", vec![BlockSubType::new("BRAMCONTENT", 4)]),
        ]
    }

    fn small_profile() -> DeviceProfile {
        DeviceProfile::new(
            Family::Virtex4,
            "TEST",
            4,
            1,
            1,
            small_block_types(),
            FarLayout::VIRTEX4,
        )
        .unwrap()
    }

    #[test]
    fn queries() {
        let p = small_profile();
        assert_eq!(p.frame_size(), 4);
        assert_eq!(p.block_type_count(), 2);
        assert_eq!(p.number_of_columns(0), 2);
        assert_eq!(p.number_of_columns(1), 1);
        assert_eq!(p.frames_per_configuration_block(0, 1), 3);
        assert_eq!(p.frames_per_configuration_block(1, 0), 4);
        assert_eq!(p.rows_in_half(0), 1);
        assert_eq!(p.rows_in_half(1), 1);
    }

    #[test]
    fn out_of_range_queries_are_zero() {
        let p = small_profile();
        assert_eq!(p.frames_per_configuration_block(0, 9), 0);
        assert_eq!(p.frames_per_configuration_block(5, 0), 0);
        assert_eq!(p.number_of_columns(5), 0);
        assert!(p.block_type_name(5).is_none());
        assert!(p.block_subtype_name(0, 9).is_none());
    }

    #[test]
    fn names_and_indices() {
        let p = small_profile();
        assert_eq!(p.block_type_name(1), Some("BRAM"));
        assert_eq!(p.block_subtype_name(0, 1), Some("IOB"));
        assert_eq!(p.block_type_index("BRAM"), Some(1));
        assert_eq!(p.block_type_index("NOPE"), None);
    }

    #[test]
    fn empty_device_name_rejected() {
        let err = DeviceProfile::new(
            Family::Virtex4,
            "",
            4,
            1,
            1,
            small_block_types(),
            FarLayout::VIRTEX4,
        )
        .unwrap_err();
        assert!(matches!(err, ProfileError::MissingField(_)));
    }

    #[test]
    fn zero_rows_rejected() {
        let err = DeviceProfile::new(
            Family::Virtex4,
            "T",
            4,
            0,
            1,
            small_block_types(),
            FarLayout::VIRTEX4,
        )
        .unwrap_err();
        assert!(matches!(err, ProfileError::Validation(_)));

        // An empty bottom half is rejected too, even with top rows present.
        let err = DeviceProfile::new(
            Family::Virtex4,
            "T",
            4,
            2,
            0,
            small_block_types(),
            FarLayout::VIRTEX4,
        )
        .unwrap_err();
        assert!(matches!(err, ProfileError::Validation(ref m) if m.contains("bottom_rows")));
    }

    #[test]
    fn zero_frame_subtype_rejected() {
        let bts = vec![BlockType::new("LOGIC", vec![BlockSubType::new("CLB", 0)])];
        let err =
            DeviceProfile::new(Family::Virtex4, "T", 4, 1, 1, bts, FarLayout::VIRTEX4).unwrap_err();
        assert!(format!("{err}").contains("zero frames"));
    }

    #[test]
    fn minor_field_too_narrow_rejected() {
        // Virtex-4 minor is 6 bits wide, so 65 frames cannot be addressed.
        let bts = vec![BlockType::new("LOGIC", vec![BlockSubType::new("BIG", 65)])];
        let err =
            DeviceProfile::new(Family::Virtex4, "T", 4, 1, 1, bts, FarLayout::VIRTEX4).unwrap_err();
        assert!(format!("{err}").contains("'minor'"));
    }

    #[test]
    fn family_defaults() {
        assert_eq!(Family::Virtex4.default_frame_size(), Some(41));
        assert_eq!(Family::Virtex6.default_frame_size(), Some(81));
        assert_eq!(Family::Custom.default_far_layout(), None);
        assert!(Family::Virtex4
            .default_subtypes()
            .contains(&("BRAMCONTENT", 64)));
        assert!(Family::Virtex5.default_subtypes().contains(&("CLB", 36)));
        assert!(Family::Custom.default_subtypes().is_empty());
    }

    #[test]
    fn display_lists_block_types() {
        let s = format!("{}", small_profile());
        assert!(s.contains("Device: TEST (Virtex4)"));
        assert!(s.contains("LOGIC (2 columns): CLB IOB"));
    }

    #[test]
    fn serializes_to_json() {
        let json = serde_json::to_value(small_profile()).unwrap();
        assert_eq!(json["device"], "TEST");
        assert_eq!(json["family"], "virtex4");
        assert_eq!(json["block_types"][1]["columns"][0]["frames"], 4);
    }
}
