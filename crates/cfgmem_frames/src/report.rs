//! Summaries of configuration images for tooling output.

use crate::error::FrameResult;
use crate::far::FrameAddress;
use crate::hash::ImageHash;
use crate::memory::ConfigMemory;
use cfgmem_profile::DeviceProfile;
use serde::Serialize;
use std::sync::Arc;

/// Whether a run of frames carries any set bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    /// Unconfigured or all-zero frames.
    Empty,
    /// Configured frames with at least one set bit.
    NonEmpty,
}

/// A maximal stretch of consecutive frames of one [`RunKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameRun {
    /// Empty or non-empty.
    pub kind: RunKind,
    /// Packed FAR of the first frame in the run.
    pub start_far: u32,
    /// Number of frames in the run.
    pub count: usize,
}

/// Groups the frames of `memory` into runs of empty and non-empty frames, in device order.
pub fn non_empty_runs(memory: &ConfigMemory) -> Vec<FrameRun> {
    let mut runs: Vec<FrameRun> = Vec::new();
    for frame in memory.all_frames() {
        let kind = match frame.data() {
            Some(data) if !data.is_zero() => RunKind::NonEmpty,
            _ => RunKind::Empty,
        };
        match runs.last_mut() {
            Some(run) if run.kind == kind => run.count += 1,
            _ => runs.push(FrameRun {
                kind,
                start_far: frame.address(),
                count: 1,
            }),
        }
    }
    runs
}

/// The frames an FDRI write would touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    /// FAR loaded before the write.
    pub start_far: u32,
    /// Payload length in words.
    pub words: usize,
    /// Whole frames in the payload.
    pub frames: usize,
    /// Packed FAR of each frame written, stopping at the end of the device.
    pub touched: Vec<u32>,
}

/// Lists the FARs that a `words`-word FDRI write starting at `far` lands on.
pub fn write_summary(profile: Arc<DeviceProfile>, far: u32, words: usize) -> WriteSummary {
    let frames = words / profile.frame_size();
    let mut cursor = FrameAddress::from_address(profile, far);
    let mut touched = Vec::with_capacity(frames);
    for _ in 0..frames {
        if !cursor.is_valid() {
            break;
        }
        touched.push(cursor.address());
        cursor.increment();
    }
    WriteSummary {
        start_far: far,
        words,
        frames,
        touched,
    }
}

/// Result of comparing two images of the same device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    /// Device name.
    pub device: String,
    /// Frames compared.
    pub compared: usize,
    /// Whether frames configured on one side only were skipped.
    pub ignore_unconfigured: bool,
    /// Packed FARs of differing frames, in device order.
    pub differing: Vec<u32>,
}

impl DiffReport {
    /// Compares `left` against `right`.
    pub fn build(
        left: &ConfigMemory,
        right: &ConfigMemory,
        ignore_unconfigured: bool,
    ) -> FrameResult<Self> {
        let differing = left.differing_frames(right, ignore_unconfigured)?;
        Ok(Self {
            device: left.profile().device().to_string(),
            compared: left.frame_count(),
            ignore_unconfigured,
            differing,
        })
    }

    /// True when no frame differs.
    pub fn is_identical(&self) -> bool {
        self.differing.is_empty()
    }
}

/// Headline numbers for one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSummary {
    /// Device name.
    pub device: String,
    /// Words per frame.
    pub frame_size: usize,
    /// Frames in the device.
    pub frames: usize,
    /// Frames that have been written.
    pub configured: usize,
    /// Configured frames with at least one set bit.
    pub non_empty: usize,
    /// Hash of the configured contents.
    pub hash: String,
}

impl ImageSummary {
    /// Summarizes `memory`.
    pub fn of(memory: &ConfigMemory) -> Self {
        let hash: ImageHash = memory.content_hash();
        Self {
            device: memory.profile().device().to_string(),
            frame_size: memory.profile().frame_size(),
            frames: memory.frame_count(),
            configured: memory.configured_frames().count(),
            non_empty: memory
                .configured_frames()
                .filter(|f| f.data().is_some_and(|d| !d.is_zero()))
                .count(),
            hash: hash.to_string(),
        }
    }
}
