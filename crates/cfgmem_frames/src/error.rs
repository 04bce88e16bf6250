//! Error types for frame storage and configuration memory operations.
//!
//! Only caller misuse is reported here. Conditions the configuration
//! hardware itself tolerates (writes past the last frame, empty FDRI
//! payloads) are absorbed by [`ConfigMemory`](crate::ConfigMemory) and
//! never surface as errors.

/// The standard result type for fallible frame operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors reported by frame storage and configuration memory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// A FAR or consecutive index has no backing frame.
    #[error("frame address {address:#010x} is outside the device")]
    AddressOutOfRange {
        /// The packed FAR (or consecutive index) that was requested.
        address: u32,
    },

    /// A slice of consecutive frames runs past the last frame.
    #[error("{count} frames starting at index {start} exceed the device's {total} frames")]
    SliceOutOfRange {
        /// Consecutive index of the first requested frame.
        start: usize,
        /// Number of frames requested.
        count: usize,
        /// Number of frames in the device.
        total: usize,
    },

    /// A word or bit index lies outside the frame.
    #[error("index {index} is outside a frame of {len} entries")]
    IndexOutOfRange {
        /// The requested word or bit index.
        index: usize,
        /// Number of words or bits in the frame.
        len: usize,
    },

    /// Two frame word stores of different lengths were combined or copied.
    #[error("frame size mismatch: {left} words vs {right} words")]
    SizeMismatch {
        /// Length of the store being modified.
        left: usize,
        /// Length of the operand.
        right: usize,
    },

    /// Two memories built from different device profiles were compared or combined.
    #[error("incompatible device profiles: '{left}' and '{right}'")]
    IncompatibleProfile {
        /// Device name of the first memory.
        left: String,
        /// Device name of the second memory.
        right: String,
    },

    /// Readback data holds less than the leading pipeline frame.
    #[error("readback data has {words} words, fewer than one {frame_size}-word frame")]
    ReadbackTooShort {
        /// Words found in the readback data.
        words: usize,
        /// Words per frame for the device.
        frame_size: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_address_out_of_range() {
        let err = FrameError::AddressOutOfRange { address: 0x0040_0000 };
        assert_eq!(
            format!("{err}"),
            "frame address 0x00400000 is outside the device"
        );
    }

    #[test]
    fn display_size_mismatch() {
        let err = FrameError::SizeMismatch { left: 41, right: 81 };
        assert_eq!(format!("{err}"), "frame size mismatch: 41 words vs 81 words");
    }

    #[test]
    fn display_incompatible_profile() {
        let err = FrameError::IncompatibleProfile {
            left: "XC4VLX15".into(),
            right: "XC4VFX12".into(),
        };
        assert_eq!(
            format!("{err}"),
            "incompatible device profiles: 'XC4VLX15' and 'XC4VFX12'"
        );
    }

    #[test]
    fn display_slice_out_of_range() {
        let err = FrameError::SliceOutOfRange {
            start: 10,
            count: 5,
            total: 12,
        };
        assert_eq!(
            format!("{err}"),
            "5 frames starting at index 10 exceed the device's 12 frames"
        );
    }
}
