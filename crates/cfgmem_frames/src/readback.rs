//! Loading configuration memory from raw readback data.

use crate::error::{FrameError, FrameResult};
use crate::memory::ConfigMemory;
use cfgmem_profile::DeviceProfile;
use std::sync::Arc;
use tracing::debug;

impl ConfigMemory {
    /// Builds a memory from a raw readback dump.
    ///
    /// `bytes` holds big-endian words as read back through the configuration
    /// port. The first frame's worth of words is the readback pipeline
    /// frame and is discarded; the rest is written from `start_far` on, the
    /// same way an FDRI write is replayed.
    pub fn from_readback(
        profile: Arc<DeviceProfile>,
        bytes: &[u8],
        start_far: u32,
    ) -> FrameResult<Self> {
        let frame_size = profile.frame_size();
        let words: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        if words.len() < frame_size {
            return Err(FrameError::ReadbackTooShort {
                words: words.len(),
                frame_size,
            });
        }

        let mut memory = ConfigMemory::new(profile);
        memory.set_far(start_far);
        memory.write_frame_data(&words[frame_size..]);
        debug!(
            words = words.len(),
            frames = memory.configured_frames().count(),
            "readback loaded"
        );
        Ok(memory)
    }
}
