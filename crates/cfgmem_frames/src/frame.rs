//! A single addressable configuration frame.

use crate::frame_data::FrameData;
use serde::Serialize;
use std::fmt;

/// One frame of configuration memory.
///
/// A frame starts unconfigured and holds no data. Writing data configures it;
/// [`Frame::reset`] drops the data again, like pulsing the PROG pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    address: u32,
    data: Option<FrameData>,
}

impl Frame {
    /// Creates an unconfigured frame at the packed FAR `address`.
    pub fn new(address: u32) -> Self {
        Self {
            address,
            data: None,
        }
    }

    /// The packed FAR of this frame.
    pub fn address(&self) -> u32 {
        self.address
    }

    /// True once data has been written to the frame.
    pub fn is_configured(&self) -> bool {
        self.data.is_some()
    }

    /// The frame's data, or `None` while unconfigured.
    pub fn data(&self) -> Option<&FrameData> {
        self.data.as_ref()
    }

    /// Copies `data` into the frame and marks it configured.
    pub fn configure(&mut self, data: &FrameData) {
        match &mut self.data {
            Some(own) => own.clone_from(data),
            None => self.data = Some(data.clone()),
        }
    }

    /// Drops the frame's data and marks it unconfigured.
    pub fn reset(&mut self) {
        self.data = None;
    }

    /// Zeroes the data of a configured frame. Unconfigured frames stay unconfigured.
    pub fn clear(&mut self) {
        if let Some(data) = &mut self.data {
            data.zero();
        }
    }

    pub(crate) fn data_mut(&mut self) -> Option<&mut FrameData> {
        self.data.as_mut()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(data) => writeln!(f, "{data}"),
            None => write!(f, "Not Configured"),
        }
    }
}
