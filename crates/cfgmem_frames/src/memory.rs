//! The configuration memory of one device.
//!
//! [`ConfigMemory`] holds one [`Frame`] per frame address and replays the
//! register writes of a bitstream against them: FAR loads, FDRI frame data
//! and MFWR repeats. Writes that land past the end of the device are
//! dropped, as the hardware drops trailing pad frames.

use crate::error::{FrameError, FrameResult};
use crate::far::{FarFields, FrameAddress};
use crate::frame::Frame;
use crate::frame_data::FrameData;
use crate::hash::ImageHash;
use cfgmem_profile::DeviceProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A register write that affects configuration memory.
///
/// Packet decoding happens upstream; other registers are filtered out before
/// they reach the memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Load the FAR register.
    SetFar(u32),
    /// FDRI payload, possibly spanning several frames. Empty payloads are no-ops.
    WriteFrameData(Vec<u32>),
    /// MFWR: write the last FDRI frame again at the current FAR.
    RepeatWrite,
}

/// Frame-level model of a device's configuration memory.
#[derive(Debug, Clone)]
pub struct ConfigMemory {
    profile: Arc<DeviceProfile>,
    frames: Vec<Frame>,
    far_to_index: HashMap<u32, usize>,
    far: FrameAddress,
    fdri_buffer: FrameData,
}

impl ConfigMemory {
    /// Creates an unconfigured memory with one frame per address of `profile`.
    pub fn new(profile: Arc<DeviceProfile>) -> Self {
        let total = FrameAddress::total_frames(&profile);
        let mut frames = Vec::with_capacity(total);
        let mut far_to_index = HashMap::with_capacity(total);

        let mut far = FrameAddress::new(Arc::clone(&profile));
        for index in 0..total {
            debug_assert_eq!(far.to_consecutive(), index);
            frames.push(Frame::new(far.address()));
            far_to_index.insert(far.address(), index);
            far.increment();
        }

        let fdri_buffer = FrameData::new(profile.frame_size());
        Self {
            far: FrameAddress::new(Arc::clone(&profile)),
            profile,
            frames,
            far_to_index,
            fdri_buffer,
        }
    }

    /// The device profile.
    pub fn profile(&self) -> &Arc<DeviceProfile> {
        &self.profile
    }

    /// Number of frames in the device.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// True if `other` was built from an equal profile.
    pub fn is_compatible(&self, other: &ConfigMemory) -> bool {
        Arc::ptr_eq(&self.profile, &other.profile) || self.profile == other.profile
    }

    pub(crate) fn ensure_compatible(&self, other: &ConfigMemory) -> FrameResult<()> {
        if self.is_compatible(other) {
            Ok(())
        } else {
            Err(FrameError::IncompatibleProfile {
                left: self.profile.device().to_string(),
                right: other.profile.device().to_string(),
            })
        }
    }

    // ---- command replay ----

    /// Applies one command.
    pub fn apply(&mut self, command: &Command) {
        match command {
            Command::SetFar(address) => self.set_far(*address),
            Command::WriteFrameData(words) => self.write_frame_data(words),
            Command::RepeatWrite => self.repeat_write(),
        }
    }

    /// Applies commands in order.
    pub fn apply_all<'a>(&mut self, commands: impl IntoIterator<Item = &'a Command>) {
        for command in commands {
            self.apply(command);
        }
    }

    /// The internal FAR register.
    pub fn far(&self) -> &FrameAddress {
        &self.far
    }

    /// Loads the FAR register. Frame data is not touched.
    pub fn set_far(&mut self, address: u32) {
        self.far.set(address);
        debug!(far = %self.far.hex_address(), "FAR set");
    }

    /// Advances the FAR register by one frame.
    pub fn increment_far(&mut self) -> bool {
        self.far.increment()
    }

    /// Streams FDRI words into consecutive frames starting at the current FAR.
    ///
    /// Each frame-sized chunk is loaded into the scratch buffer, committed to
    /// the current frame, and the FAR advanced. The buffer is cleared once per
    /// call, not per chunk: a short final chunk keeps the previous chunk's
    /// words in its tail.
    pub fn write_frame_data(&mut self, words: &[u32]) {
        if words.is_empty() {
            return;
        }
        self.fdri_buffer.zero();
        for chunk in words.chunks(self.profile.frame_size()) {
            self.fdri_buffer.load_prefix(chunk);
            self.commit_buffer();
            self.far.increment();
        }
    }

    /// Commits the unchanged scratch buffer to the current frame and advances the FAR.
    pub fn repeat_write(&mut self) {
        self.commit_buffer();
        self.far.increment();
    }

    fn commit_buffer(&mut self) {
        match self.current_index() {
            Some(index) => {
                self.frames[index].configure(&self.fdri_buffer);
                debug!(far = %self.far.hex_address(), index, "frame configured");
            }
            None => debug!(far = %self.far.hex_address(), "write past end of device ignored"),
        }
    }

    pub(crate) fn current_index(&self) -> Option<usize> {
        if !self.far.is_valid() {
            return None;
        }
        let index = self.far.to_consecutive();
        (index < self.frames.len()).then_some(index)
    }

    /// The frame under the FAR register, or `None` past the end of the device.
    pub fn current_frame(&self) -> Option<&Frame> {
        self.current_index().map(|i| &self.frames[i])
    }

    /// Writes `data` straight into the frame at `address`.
    pub fn configure_frame(&mut self, address: u32, data: &FrameData) -> FrameResult<()> {
        if data.word_count() != self.profile.frame_size() {
            return Err(FrameError::SizeMismatch {
                left: self.profile.frame_size(),
                right: data.word_count(),
            });
        }
        let index = self.index_of(address)?;
        self.frames[index].configure(data);
        Ok(())
    }

    /// Returns every frame to the unconfigured state and the FAR to 0.
    pub fn reset(&mut self) {
        self.frames.iter_mut().for_each(Frame::reset);
        self.far.reset();
        self.fdri_buffer.zero();
    }

    // ---- lookup ----

    /// Consecutive index of the frame at packed address `address`.
    pub fn index_of(&self, address: u32) -> FrameResult<usize> {
        self.far_to_index
            .get(&address)
            .copied()
            .filter(|&i| i < self.frames.len())
            .ok_or(FrameError::AddressOutOfRange { address })
    }

    /// The frame at packed address `address`.
    pub fn frame(&self, address: u32) -> FrameResult<&Frame> {
        self.index_of(address).map(|i| &self.frames[i])
    }

    /// The frame addressed by `far`.
    pub fn frame_at(&self, far: &FrameAddress) -> FrameResult<&Frame> {
        self.frame(far.address())
    }

    pub(crate) fn frame_mut_by_index(&mut self, index: usize) -> Option<&mut Frame> {
        self.frames.get_mut(index)
    }

    /// Every frame, in consecutive order.
    pub fn all_frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frames that have been written.
    pub fn configured_frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter().filter(|f| f.is_configured())
    }

    /// `count` frames starting at the frame addressed by `start`.
    pub fn consecutive_frames(&self, start: u32, count: usize) -> FrameResult<&[Frame]> {
        let first = self.index_of(start)?;
        let total = self.frames.len();
        match first.checked_add(count) {
            Some(end) if end <= total => Ok(&self.frames[first..end]),
            _ => Err(FrameError::SliceOutOfRange {
                start: first,
                count,
                total,
            }),
        }
    }

    /// The frames of one configuration block: every minor of one column.
    pub fn configuration_block_frames(
        &self,
        top_bottom: u32,
        block_type: u32,
        row: u32,
        column: u32,
    ) -> FrameResult<&[Frame]> {
        let start = FrameAddress::pack(
            &self.profile,
            FarFields {
                top_bottom,
                block_type,
                row,
                column,
                minor: 0,
            },
        );
        let count = self.profile.frames_per_configuration_block(block_type, column);
        self.consecutive_frames(start, count as usize)
    }

    // ---- reporting ----

    /// Packed addresses of frames whose contents differ from `other`'s.
    ///
    /// A frame configured on one side only counts as different unless
    /// `ignore_unconfigured` is set.
    pub fn differing_frames(
        &self,
        other: &ConfigMemory,
        ignore_unconfigured: bool,
    ) -> FrameResult<Vec<u32>> {
        self.ensure_compatible(other)?;
        let differing = self
            .frames
            .iter()
            .zip(&other.frames)
            .filter(|(a, b)| match (a.data(), b.data()) {
                (Some(x), Some(y)) => x != y,
                (None, None) => false,
                _ => !ignore_unconfigured,
            })
            .map(|(a, _)| a.address())
            .collect();
        Ok(differing)
    }

    /// Text dump of up to `count` frames starting at packed address `start`.
    ///
    /// Stops early at the end of the device.
    pub fn frame_contents(&self, start: u32, count: usize) -> String {
        FrameContents {
            memory: self,
            start,
            count,
        }
        .to_string()
    }

    /// Text dump of every frame in the device.
    pub fn frame_contents_all(&self) -> String {
        self.frame_contents(0, self.frames.len())
    }

    /// A command stream that rebuilds this image on an empty memory.
    ///
    /// Each run of consecutive configured frames becomes one FAR load
    /// followed by one FDRI write.
    pub fn to_commands(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        let mut run: Vec<u32> = Vec::new();
        for frame in &self.frames {
            match frame.data() {
                Some(data) => {
                    if run.is_empty() {
                        commands.push(Command::SetFar(frame.address()));
                    }
                    run.extend_from_slice(data.words());
                }
                None if !run.is_empty() => {
                    commands.push(Command::WriteFrameData(std::mem::take(&mut run)));
                }
                None => {}
            }
        }
        if !run.is_empty() {
            commands.push(Command::WriteFrameData(run));
        }
        commands
    }

    /// Hash over the address and data of every configured frame.
    pub fn content_hash(&self) -> ImageHash {
        ImageHash::from_frames(
            self.configured_frames()
                .filter_map(|f| f.data().map(|d| (f.address(), d.words()))),
        )
    }
}

struct FrameContents<'a> {
    memory: &'a ConfigMemory,
    start: u32,
    count: usize,
}

impl fmt::Display for FrameContents<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut far = FrameAddress::from_address(Arc::clone(&self.memory.profile), self.start);
        for _ in 0..self.count {
            if !far.is_valid() {
                break;
            }
            if let Ok(frame) = self.memory.frame_at(&far) {
                match frame.data() {
                    Some(data) => write!(f, "{far}\n{data}")?,
                    None => writeln!(f, "{far} Not configured")?,
                }
            }
            far.increment();
        }
        Ok(())
    }
}
