//! Whole-image bitwise operations.
//!
//! These combine two configuration images frame by frame to build derived
//! images: an XOR of two bitstreams marks every bit that differs, an AND
//! with a mask image keeps only the masked region, and so on.

use crate::error::FrameResult;
use crate::frame::Frame;
use crate::frame_data::FrameData;
use crate::memory::ConfigMemory;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// A word-wise operation applied to every frame of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameOperation {
    /// `a ^ b`
    Xor,
    /// `a & b`
    And,
    /// `a | b`
    Or,
    /// `a & !b`
    Mask,
    /// `!a`; the second operand is ignored.
    Not,
}

impl FrameOperation {
    /// True for every operation except [`FrameOperation::Not`].
    pub fn takes_operand(self) -> bool {
        !matches!(self, FrameOperation::Not)
    }

    /// Applies the operation to one frame in place.
    pub fn apply(self, target: &mut FrameData, operand: &FrameData) -> FrameResult<()> {
        match self {
            FrameOperation::Xor => target.xor_with(operand),
            FrameOperation::And => target.and_with(operand),
            FrameOperation::Or => target.or_with(operand),
            FrameOperation::Mask => target.mask_with(operand),
            FrameOperation::Not => {
                target.invert();
                Ok(())
            }
        }
    }
}

impl fmt::Display for FrameOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameOperation::Xor => "xor",
            FrameOperation::And => "and",
            FrameOperation::Or => "or",
            FrameOperation::Mask => "mask",
            FrameOperation::Not => "not",
        };
        f.write_str(name)
    }
}

/// Combines `b` into `a` frame by frame, in device order.
///
/// Both FAR registers are set to 0 and stepped together until `a`'s FAR
/// runs past the end of the device, so afterwards `a` is past the end and
/// `b` has advanced by the same number of frames.
///
/// Only frames configured in `a` are rewritten; unconfigured frames stay
/// unconfigured. Where `b` is absent or its frame is unconfigured, the
/// operand is all zeros.
pub fn combine(
    a: &mut ConfigMemory,
    mut b: Option<&mut ConfigMemory>,
    op: FrameOperation,
) -> FrameResult<()> {
    if let Some(b) = b.as_deref() {
        a.ensure_compatible(b)?;
    }
    let zeros = FrameData::new(a.profile().frame_size());
    let mut rewritten = 0usize;

    a.set_far(0);
    if let Some(b) = b.as_deref_mut() {
        b.set_far(0);
    }
    while let Some(index) = a.current_index() {
        let operand = b
            .as_deref()
            .and_then(ConfigMemory::current_frame)
            .and_then(Frame::data)
            .unwrap_or(&zeros);
        if let Some(target) = a.frame_mut_by_index(index).and_then(Frame::data_mut) {
            op.apply(target, operand)?;
            rewritten += 1;
        }
        a.increment_far();
        if let Some(b) = b.as_deref_mut() {
            b.increment_far();
        }
    }

    debug!(%op, frames = rewritten, "image operation applied");
    Ok(())
}

impl ConfigMemory {
    /// XORs `other` into this image.
    pub fn xor_with(&mut self, other: &mut ConfigMemory) -> FrameResult<()> {
        combine(self, Some(other), FrameOperation::Xor)
    }

    /// ANDs `other` into this image.
    pub fn and_with(&mut self, other: &mut ConfigMemory) -> FrameResult<()> {
        combine(self, Some(other), FrameOperation::And)
    }

    /// ORs `other` into this image.
    pub fn or_with(&mut self, other: &mut ConfigMemory) -> FrameResult<()> {
        combine(self, Some(other), FrameOperation::Or)
    }

    /// Clears every bit that is set in `other`.
    pub fn mask_with(&mut self, other: &mut ConfigMemory) -> FrameResult<()> {
        combine(self, Some(other), FrameOperation::Mask)
    }

    /// Inverts every configured frame.
    pub fn invert(&mut self) -> FrameResult<()> {
        combine(self, None, FrameOperation::Not)
    }
}
