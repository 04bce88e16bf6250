//! Frame Address Register arithmetic.
//!
//! The FAR does not count linearly. It is an odometer of five digits,
//! innermost first: minor, column, row, top/bottom, block type. The base of
//! each digit depends on the outer digits (the minor count depends on the
//! column's subtype, the row count on the half), so incrementing is a
//! cascade of bounded steps rather than a single addition.
//!
//! Two representations of one position are used throughout:
//!
//! - the packed 32-bit FAR value written to the FAR register, and
//! - the consecutive address, a dense index `0..N` over every frame in
//!   device order, used to index the frame array.
//!
//! See Xilinx UG071 (Virtex-4) and UG191 (Virtex-5) for the register layout.

use cfgmem_profile::{DeviceProfile, FarLayout};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The five decoded FAR fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FarFields {
    /// 0 = top half, 1 = bottom half.
    pub top_bottom: u32,
    /// Block type index; equal to the block type count when past the end.
    pub block_type: u32,
    /// Row within the half.
    pub row: u32,
    /// Major column.
    pub column: u32,
    /// Frame within the configuration block.
    pub minor: u32,
}

impl FarFields {
    /// Splits a packed FAR into its fields.
    pub fn decode(layout: &FarLayout, address: u32) -> Self {
        Self {
            top_bottom: layout.top_bottom.extract(address),
            block_type: layout.block_type.extract(address),
            row: layout.row.extract(address),
            column: layout.column.extract(address),
            minor: layout.minor.extract(address),
        }
    }

    /// Packs the fields into a FAR value.
    pub fn encode(&self, layout: &FarLayout) -> u32 {
        layout.top_bottom.insert(self.top_bottom)
            | layout.block_type.insert(self.block_type)
            | layout.row.insert(self.row)
            | layout.column.insert(self.column)
            | layout.minor.insert(self.minor)
    }
}

/// Advances one odometer digit. Returns true if it wrapped and the next
/// digit must be advanced.
///
/// A digit wraps only from its last value `modulus - 1`; a digit already
/// beyond that keeps counting up, as the hardware register does.
fn step(digit: &mut u32, modulus: u32) -> bool {
    if modulus.checked_sub(1) == Some(*digit) {
        *digit = 0;
        return true;
    }
    *digit = digit.saturating_add(1);
    false
}

/// A Frame Address Register bound to a device profile.
#[derive(Debug, Clone)]
pub struct FrameAddress {
    profile: Arc<DeviceProfile>,
    fields: FarFields,
}

impl FrameAddress {
    /// Creates a FAR at address 0, the first frame of the device.
    pub fn new(profile: Arc<DeviceProfile>) -> Self {
        Self {
            profile,
            fields: FarFields::default(),
        }
    }

    /// Creates a FAR from a packed address.
    pub fn from_address(profile: Arc<DeviceProfile>, address: u32) -> Self {
        let fields = FarFields::decode(profile.far_layout(), address);
        Self { profile, fields }
    }

    /// Creates a FAR from explicit field values.
    pub fn from_fields(profile: Arc<DeviceProfile>, fields: FarFields) -> Self {
        Self { profile, fields }
    }

    /// Creates the FAR whose consecutive address is `index`.
    ///
    /// An index at or beyond the device's frame count yields the past-the-end
    /// FAR (block type equal to the block type count, all other fields zero).
    pub fn from_consecutive(profile: Arc<DeviceProfile>, index: usize) -> Self {
        let mut far = Self::new(profile);
        far.set_consecutive(index);
        far
    }

    /// The profile this FAR navigates.
    pub fn profile(&self) -> &Arc<DeviceProfile> {
        &self.profile
    }

    /// The decoded fields.
    pub fn fields(&self) -> FarFields {
        self.fields
    }

    /// 0 = top, 1 = bottom.
    pub fn top_bottom(&self) -> u32 {
        self.fields.top_bottom
    }

    /// Block type index.
    pub fn block_type(&self) -> u32 {
        self.fields.block_type
    }

    /// Row within the half.
    pub fn row(&self) -> u32 {
        self.fields.row
    }

    /// Major column.
    pub fn column(&self) -> u32 {
        self.fields.column
    }

    /// Minor frame within the block.
    pub fn minor(&self) -> u32 {
        self.fields.minor
    }

    /// Moves back to address 0.
    pub fn reset(&mut self) {
        self.fields = FarFields::default();
    }

    /// Loads a packed address, as a FAR register write does.
    pub fn set(&mut self, address: u32) {
        self.fields = FarFields::decode(self.profile.far_layout(), address);
    }

    /// The packed 32-bit FAR value.
    pub fn address(&self) -> u32 {
        self.fields.encode(self.profile.far_layout())
    }

    /// The packed address as eight uppercase hex digits.
    pub fn hex_address(&self) -> String {
        format!("{:08X}", self.address())
    }

    /// True unless the FAR has run past the last block type.
    pub fn is_valid(&self) -> bool {
        self.fields.block_type < self.profile.block_type_count()
    }

    /// Advances to the next frame address.
    ///
    /// Returns false if the FAR was already invalid or has just stepped past
    /// the last frame of the device; in the latter case the fields are left
    /// at the past-the-end position.
    pub fn increment(&mut self) -> bool {
        if !self.is_valid() {
            return false;
        }
        let p = &self.profile;
        let f = &mut self.fields;

        let frames = p.frames_per_configuration_block(f.block_type, f.column);
        if !step(&mut f.minor, frames) {
            return true;
        }
        if !step(&mut f.column, p.number_of_columns(f.block_type)) {
            return true;
        }
        if !step(&mut f.row, p.rows_in_half(f.top_bottom)) {
            return true;
        }
        // Bottom half follows top half within the same block type.
        match f.top_bottom {
            0 => {
                f.top_bottom = 1;
                true
            }
            1 => {
                f.top_bottom = 0;
                f.block_type += 1;
                self.is_valid()
            }
            _ => true,
        }
    }

    /// Increments `n` times, stopping at the first failed increment.
    pub fn increment_by(&mut self, n: usize) -> bool {
        (0..n).all(|_| self.increment())
    }

    /// The dense index of this FAR in device order.
    ///
    /// Past-the-end FARs map to indices at or beyond the device frame count.
    pub fn to_consecutive(&self) -> usize {
        let p = &self.profile;
        let f = &self.fields;

        let mut index: usize = (0..f.block_type)
            .map(|bt| Self::frames_per_block_type(p, bt))
            .sum();
        if f.top_bottom > 0 {
            index += Self::frames_in_top(p, f.block_type);
        }
        index += f.row as usize * Self::frames_per_row(p, f.block_type);
        index += (0..f.column)
            .map(|c| p.frames_per_configuration_block(f.block_type, c) as usize)
            .sum::<usize>();
        index + f.minor as usize
    }

    /// Moves to the FAR whose consecutive address is `index`.
    pub fn set_consecutive(&mut self, index: usize) {
        let p = Arc::clone(&self.profile);
        let mut remaining = index;

        let mut block_type = 0;
        while block_type < p.block_type_count() {
            let frames = Self::frames_per_block_type(&p, block_type);
            if remaining < frames {
                break;
            }
            remaining -= frames;
            block_type += 1;
        }
        if block_type >= p.block_type_count() {
            self.fields = FarFields {
                block_type,
                ..FarFields::default()
            };
            return;
        }

        let top = Self::frames_in_top(&p, block_type);
        let top_bottom = if remaining >= top {
            remaining -= top;
            1
        } else {
            0
        };

        let per_row = Self::frames_per_row(&p, block_type);
        let row = remaining / per_row;
        remaining -= row * per_row;

        let mut column = 0;
        loop {
            let frames = p.frames_per_configuration_block(block_type, column) as usize;
            if remaining < frames || frames == 0 {
                break;
            }
            remaining -= frames;
            column += 1;
        }

        self.fields = FarFields {
            top_bottom,
            block_type,
            row: row as u32,
            column,
            minor: remaining as u32,
        };
    }

    /// Frames in one row of `block_type`: the sum over its columns.
    pub fn frames_per_row(profile: &DeviceProfile, block_type: u32) -> usize {
        (0..profile.number_of_columns(block_type))
            .map(|c| profile.frames_per_configuration_block(block_type, c) as usize)
            .sum()
    }

    /// Frames in the top half of `block_type`.
    pub fn frames_in_top(profile: &DeviceProfile, block_type: u32) -> usize {
        Self::frames_per_row(profile, block_type) * profile.top_rows() as usize
    }

    /// Frames in the bottom half of `block_type`.
    pub fn frames_in_bottom(profile: &DeviceProfile, block_type: u32) -> usize {
        Self::frames_per_row(profile, block_type) * profile.bottom_rows() as usize
    }

    /// Frames in both halves of `block_type`.
    pub fn frames_per_block_type(profile: &DeviceProfile, block_type: u32) -> usize {
        Self::frames_in_top(profile, block_type) + Self::frames_in_bottom(profile, block_type)
    }

    /// Total number of frames in the device.
    pub fn total_frames(profile: &DeviceProfile) -> usize {
        (0..profile.block_type_count())
            .map(|bt| Self::frames_per_block_type(profile, bt))
            .sum()
    }

    /// Packs explicit field values into a FAR value.
    pub fn pack(profile: &DeviceProfile, fields: FarFields) -> u32 {
        fields.encode(profile.far_layout())
    }

    /// The first FAR of `block_type`.
    pub fn block_start(profile: &DeviceProfile, block_type: u32) -> u32 {
        Self::pack(
            profile,
            FarFields {
                block_type,
                ..FarFields::default()
            },
        )
    }

    /// The first FAR of the block RAM content block type, if the device has one.
    pub fn bram_content_start(profile: &DeviceProfile) -> Option<u32> {
        profile
            .block_type_index("BRAM")
            .map(|bt| Self::block_start(profile, bt))
    }

    /// Number of block RAM content frames, if the device has a `BRAM` block type.
    pub fn bram_content_frame_count(profile: &DeviceProfile) -> Option<usize> {
        profile
            .block_type_index("BRAM")
            .map(|bt| Self::frames_per_block_type(profile, bt))
    }

    /// Consecutive address of a packed FAR.
    pub fn consecutive_of(profile: Arc<DeviceProfile>, address: u32) -> usize {
        Self::from_address(profile, address).to_consecutive()
    }

    /// Iterates over every valid FAR of the device in increment order.
    pub fn walk(profile: Arc<DeviceProfile>) -> FarWalk {
        FarWalk {
            next: Some(Self::new(profile)),
        }
    }
}

impl PartialEq for FrameAddress {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
            && (Arc::ptr_eq(&self.profile, &other.profile) || self.profile == other.profile)
    }
}

impl Eq for FrameAddress {}

impl fmt::Display for FrameAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return f.write_str(&self.hex_address());
        }
        let half = if self.fields.top_bottom == 0 {
            "top"
        } else {
            "bottom"
        };
        let block = self
            .profile
            .block_type_name(self.fields.block_type)
            .unwrap_or("-");
        let subtype = self
            .profile
            .block_subtype_name(self.fields.block_type, self.fields.column)
            .unwrap_or("-");
        write!(
            f,
            "FAR={}, {half} Type={block} ({}), Row={}, Column={} ({subtype}), Minor={}",
            self.hex_address(),
            self.fields.block_type,
            self.fields.row,
            self.fields.column,
            self.fields.minor
        )
    }
}

/// Iterator over every valid FAR, created by [`FrameAddress::walk`].
#[derive(Debug, Clone)]
pub struct FarWalk {
    next: Option<FrameAddress>,
}

impl Iterator for FarWalk {
    type Item = FrameAddress;

    fn next(&mut self) -> Option<FrameAddress> {
        let current = self.next.take()?;
        if !current.is_valid() {
            return None;
        }
        let mut following = current.clone();
        if following.increment() {
            self.next = Some(following);
        }
        Some(current)
    }
}
