//! Device configuration profiles for Xilinx configuration memory.
//!
//! A [`DeviceProfile`] describes everything the frame engine needs to know
//! about one device: frame size in words, the ordered FAR block types and
//! their column layouts, row counts for the top and bottom halves, and the
//! bit positions of the five FAR fields. Profiles come from built-in parts
//! ([`DeviceProfile::builtin`]) or TOML files ([`load_profile`]).

#![warn(missing_docs)]

pub mod error;
pub mod layout;
pub mod loader;
pub mod parts;
pub mod types;

pub use error::ProfileError;
pub use layout::{FarField, FarLayout};
pub use loader::{load_profile, load_profile_from_str};
pub use parts::builtin_part_names;
pub use types::{BlockSubType, BlockType, DeviceProfile, Family};
