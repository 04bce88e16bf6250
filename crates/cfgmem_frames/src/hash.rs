//! Configuration image hashing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit XXH3 hash of a configuration image.
///
/// Two memories with the same `ImageHash` hold the same configured frames
/// with the same contents. Unconfigured frames do not contribute.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHash([u8; 16]);

impl ImageHash {
    /// Hashes a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data).to_le_bytes())
    }

    /// Hashes a sequence of `(far, words)` records.
    pub fn from_frames<'a>(frames: impl IntoIterator<Item = (u32, &'a [u32])>) -> Self {
        let mut bytes = Vec::new();
        for (far, words) in frames {
            bytes.extend_from_slice(&far.to_le_bytes());
            bytes.extend_from_slice(&(words.len() as u32).to_le_bytes());
            for w in words {
                bytes.extend_from_slice(&w.to_le_bytes());
            }
        }
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for ImageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ImageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let words = [1u32, 2, 3];
        let a = ImageHash::from_frames([(0x40, &words[..])]);
        let b = ImageHash::from_frames([(0x40, &words[..])]);
        assert_eq!(a, b);
    }

    #[test]
    fn address_contributes() {
        let words = [1u32, 2, 3];
        let a = ImageHash::from_frames([(0x40, &words[..])]);
        let b = ImageHash::from_frames([(0x41, &words[..])]);
        assert_ne!(a, b);
    }

    #[test]
    fn frame_boundaries_contribute() {
        let a = ImageHash::from_frames([(0, &[1u32, 2][..]), (1, &[3u32][..])]);
        let b = ImageHash::from_frames([(0, &[1u32][..]), (1, &[2u32, 3][..])]);
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_hex() {
        let s = ImageHash::from_bytes(b"image").to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn debug_abbreviated() {
        let s = format!("{:?}", ImageHash::from_bytes(b"image"));
        assert!(s.starts_with("ImageHash("));
    }

    #[test]
    fn serde_roundtrip() {
        let h = ImageHash::from_bytes(b"serde");
        let json = serde_json::to_string(&h).unwrap();
        let back: ImageHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
