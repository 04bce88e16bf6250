//! Bit layout of the Frame Address Register.
//!
//! A FAR packs five fields into one 32-bit word. Each family places the
//! fields at different bit positions; [`FarLayout`] records where each one
//! lives so that the codec in `cfgmem_frames` never hardcodes a family.

use serde::{Deserialize, Serialize};

/// One contiguous bit field inside the 32-bit FAR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FarField {
    /// Bit position of the field's least-significant bit.
    pub shift: u32,
    /// Number of bits in the field.
    pub width: u32,
}

impl FarField {
    /// Creates a field of `width` bits starting at bit `shift`.
    pub const fn new(shift: u32, width: u32) -> Self {
        Self { shift, width }
    }

    /// Returns the in-place mask of this field.
    ///
    /// Only meaningful once `shift + width <= 32`, which profile validation
    /// guarantees.
    pub fn mask(&self) -> u32 {
        if self.width == 0 || self.width > 32 {
            return 0;
        }
        (u32::MAX >> (32 - self.width))
            .checked_shl(self.shift)
            .unwrap_or(0)
    }

    /// Extracts this field's value from a packed address.
    pub fn extract(&self, address: u32) -> u32 {
        (address & self.mask()).checked_shr(self.shift).unwrap_or(0)
    }

    /// Shifts `value` into this field's position.
    ///
    /// Bits of `value` wider than the field are not masked off, so callers
    /// that need a lossless round trip must stay within [`FarField::max_value`].
    pub fn insert(&self, value: u32) -> u32 {
        value.checked_shl(self.shift).unwrap_or(0)
    }

    /// The largest value the field can hold.
    pub fn max_value(&self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        }
    }

    /// Returns true if the field lies entirely within a 32-bit word.
    pub fn fits_in_word(&self) -> bool {
        self.shift
            .checked_add(self.width)
            .is_some_and(|end| end <= 32)
    }
}

/// Positions of the five FAR fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FarLayout {
    /// Top (0) or bottom (1) half of the device.
    pub top_bottom: FarField,
    /// Block type index.
    pub block_type: FarField,
    /// Row within the current half.
    pub row: FarField,
    /// Major column.
    pub column: FarField,
    /// Frame within the configuration block.
    pub minor: FarField,
}

impl FarLayout {
    /// Virtex-4 layout: top/bottom 22, type 21:19, row 18:14, column 13:6, minor 5:0.
    pub const VIRTEX4: FarLayout = FarLayout {
        top_bottom: FarField::new(22, 1),
        block_type: FarField::new(19, 3),
        row: FarField::new(14, 5),
        column: FarField::new(6, 8),
        minor: FarField::new(0, 6),
    };

    /// Virtex-5 and Virtex-6 layout: type 23:21, top/bottom 20, row 19:15,
    /// column 14:7, minor 6:0.
    pub const VIRTEX5: FarLayout = FarLayout {
        top_bottom: FarField::new(20, 1),
        block_type: FarField::new(21, 3),
        row: FarField::new(15, 5),
        column: FarField::new(7, 8),
        minor: FarField::new(0, 7),
    };

    /// Returns the fields in odometer order, outermost first, with their names.
    pub fn named_fields(&self) -> [(&'static str, FarField); 5] {
        [
            ("block_type", self.block_type),
            ("top_bottom", self.top_bottom),
            ("row", self.row),
            ("column", self.column),
            ("minor", self.minor),
        ]
    }

    /// Checks that every field fits in 32 bits and no two fields overlap.
    pub fn check(&self) -> Result<(), String> {
        let fields = self.named_fields();
        for (name, field) in &fields {
            if field.width == 0 {
                return Err(format!("FAR field '{name}' has zero width"));
            }
            if !field.fits_in_word() {
                return Err(format!(
                    "FAR field '{name}' (shift {}, width {}) does not fit in 32 bits",
                    field.shift, field.width
                ));
            }
        }
        for (i, (a_name, a)) in fields.iter().enumerate() {
            for (b_name, b) in &fields[i + 1..] {
                if a.mask() & b.mask() != 0 {
                    return Err(format!("FAR fields '{a_name}' and '{b_name}' overlap"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtex4_masks() {
        let l = FarLayout::VIRTEX4;
        assert_eq!(l.top_bottom.mask(), 0x0040_0000);
        assert_eq!(l.block_type.mask(), 0x7 << 19);
        assert_eq!(l.row.mask(), 0x1F << 14);
        assert_eq!(l.column.mask(), 0xFF << 6);
        assert_eq!(l.minor.mask(), 0x3F);
    }

    #[test]
    fn extract_and_insert() {
        let f = FarField::new(6, 8);
        let packed = f.insert(0x5A);
        assert_eq!(packed, 0x5A << 6);
        assert_eq!(f.extract(packed | 0x3F), 0x5A);
    }

    #[test]
    fn full_width_field() {
        let f = FarField::new(0, 32);
        assert_eq!(f.mask(), u32::MAX);
        assert_eq!(f.max_value(), u32::MAX);
        assert_eq!(f.extract(0xDEAD_BEEF), 0xDEAD_BEEF);
    }

    #[test]
    fn presets_are_well_formed() {
        assert!(FarLayout::VIRTEX4.check().is_ok());
        assert!(FarLayout::VIRTEX5.check().is_ok());
    }

    #[test]
    fn overlapping_fields_rejected() {
        let mut l = FarLayout::VIRTEX4;
        l.row = FarField::new(12, 5);
        let err = l.check().unwrap_err();
        assert!(err.contains("overlap"));
    }

    #[test]
    fn oversized_field_rejected() {
        let mut l = FarLayout::VIRTEX4;
        l.top_bottom = FarField::new(31, 2);
        assert!(l.check().unwrap_err().contains("does not fit"));
    }

    #[test]
    fn huge_shift_rejected() {
        let f = FarField::new(u32::MAX, 1);
        assert!(!f.fits_in_word());
        assert!(!FarField::new(1, u32::MAX).fits_in_word());
        assert!(FarField::new(31, 1).fits_in_word());

        let mut l = FarLayout::VIRTEX4;
        l.top_bottom = f;
        assert!(l.check().unwrap_err().contains("does not fit"));
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&FarLayout::VIRTEX5).unwrap();
        let back: FarLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FarLayout::VIRTEX5);
    }
}
