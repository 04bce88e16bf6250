//! Shared fixtures for unit tests.

use cfgmem_profile::{BlockSubType, BlockType, DeviceProfile, Family, FarLayout};
use std::sync::Arc;

/// A small device: 4-word frames, two top rows and one bottom row.
///
/// LOGIC has columns A (2 frames) and B (3 frames); BRAM has one column C
/// (4 frames). That gives 15 LOGIC frames, 12 BRAM frames, 27 in total.
pub(crate) fn tiny_profile() -> Arc<DeviceProfile> {
    let block_types = vec![
        BlockType::new(
            "LOGIC",
            vec![BlockSubType::new("A", 2), BlockSubType::new("B", 3)],
        ),
        BlockType::new("BRAM", vec![BlockSubType::new("C", 4)]),
    ];
    let profile = DeviceProfile::new(
        Family::Custom,
        "TINY",
        4,
        2,
        1,
        block_types,
        FarLayout::VIRTEX4,
    )
    .expect("tiny profile is valid");
    Arc::new(profile)
}
