//! Frame-level model of Xilinx FPGA configuration memory.
//!
//! [`ConfigMemory`] holds one [`Frame`] per frame address of a device and
//! replays the FAR, FDRI and MFWR register writes of a bitstream against
//! them. [`FrameAddress`] implements the FAR odometer and its translation to
//! dense frame indices. [`combine`] builds derived images (XOR diffs,
//! masks) from two memories, and the [`report`] module summarizes images
//! for tooling.

#![warn(missing_docs)]

pub mod error;
pub mod far;
pub mod frame;
pub mod frame_data;
pub mod hash;
pub mod memory;
pub mod operation;
pub mod readback;
pub mod report;

#[cfg(test)]
mod testing;

pub use error::{FrameError, FrameResult};
pub use far::{FarFields, FarWalk, FrameAddress};
pub use frame::Frame;
pub use frame_data::FrameData;
pub use hash::ImageHash;
pub use memory::{Command, ConfigMemory};
pub use operation::{combine, FrameOperation};
pub use report::{
    non_empty_runs, write_summary, DiffReport, FrameRun, ImageSummary, RunKind, WriteSummary,
};
