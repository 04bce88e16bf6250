//! Device and image loading shared by the subcommands.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use cfgmem_frames::{Command, ConfigMemory};
use cfgmem_profile::{builtin_part_names, load_profile, DeviceProfile};
use tracing::debug;

use crate::GlobalArgs;

/// Resolves the device profile from `--profile` or `--part`.
pub fn resolve_profile(global: &GlobalArgs) -> Result<Arc<DeviceProfile>, Box<dyn Error>> {
    let profile = match (&global.profile, &global.part) {
        (Some(path), _) => load_profile(Path::new(path))?,
        (None, Some(part)) => DeviceProfile::builtin(part)?,
        (None, None) => {
            let parts: Vec<&str> = builtin_part_names().collect();
            return Err(format!(
                "no device selected; pass --profile <file> or --part <{}>",
                parts.join("|")
            )
            .into());
        }
    };
    if global.verbose {
        eprintln!(
            "   Using {} ({} frames of {} words)",
            profile.device(),
            cfgmem_frames::FrameAddress::total_frames(&profile),
            profile.frame_size()
        );
    }
    Ok(Arc::new(profile))
}

/// Loads an image file.
///
/// `*.json` files hold a command stream and are replayed onto an empty
/// memory; anything else is a raw readback dump starting at `start_far`.
pub fn load_image(
    profile: Arc<DeviceProfile>,
    path: &Path,
    start_far: u32,
) -> Result<ConfigMemory, Box<dyn Error>> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let memory = if is_json {
        let text = std::fs::read_to_string(path)?;
        let commands: Vec<Command> = serde_json::from_str(&text)
            .map_err(|e| format!("{}: invalid command stream: {e}", path.display()))?;
        let mut memory = ConfigMemory::new(profile);
        memory.apply_all(&commands);
        memory
    } else {
        let bytes = std::fs::read(path)?;
        ConfigMemory::from_readback(profile, &bytes, start_far)
            .map_err(|e| format!("{}: {e}", path.display()))?
    };
    debug!(
        path = %path.display(),
        configured = memory.configured_frames().count(),
        "image loaded"
    );
    Ok(memory)
}

/// Writes `memory` as a JSON command stream.
pub fn save_commands(memory: &ConfigMemory, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(&memory.to_commands())?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Parses a FAR given as `0x`-prefixed hex or decimal.
pub fn parse_far(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid frame address '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(part: Option<&str>, profile: Option<&str>) -> GlobalArgs {
        GlobalArgs {
            quiet: false,
            verbose: false,
            profile: profile.map(str::to_string),
            part: part.map(str::to_string),
        }
    }

    #[test]
    fn parse_far_hex_and_decimal() {
        assert_eq!(parse_far("0x40"), Ok(0x40));
        assert_eq!(parse_far("0X00080000"), Ok(0x0008_0000));
        assert_eq!(parse_far("64"), Ok(64));
        assert!(parse_far("0xZZ").unwrap_err().contains("invalid frame address"));
        assert!(parse_far("").is_err());
    }

    #[test]
    fn resolve_builtin_part() {
        let p = resolve_profile(&global(Some("XC4VFX12"), None)).unwrap();
        assert_eq!(p.device(), "XC4VFX12");
    }

    #[test]
    fn resolve_requires_a_device() {
        let err = resolve_profile(&global(None, None)).unwrap_err();
        assert!(err.to_string().contains("--part"));
    }

    #[test]
    fn resolve_unknown_part_fails() {
        assert!(resolve_profile(&global(Some("xc9zz"), None)).is_err());
    }

    #[test]
    fn resolve_profile_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev.toml");
        std::fs::write(
            &path,
            "family = \"virtex4\"\ndevice = \"FILEDEV\"\ntop_rows = 1\nbottom_rows = 1\n\n\
             [[block_types]]\nname = \"LOGIC\"\ncolumns = [\"CLB\"]\n",
        )
        .unwrap();
        let p = resolve_profile(&global(None, path.to_str())).unwrap();
        assert_eq!(p.device(), "FILEDEV");
    }

    #[test]
    fn json_image_roundtrip() {
        let profile = resolve_profile(&global(Some("xc4vfx12"), None)).unwrap();
        let mut memory = ConfigMemory::new(Arc::clone(&profile));
        memory.write_frame_data(&vec![0x0F0F_0F0F; profile.frame_size() * 3]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.json");
        save_commands(&memory, &path).unwrap();

        let loaded = load_image(profile, &path, 0).unwrap();
        assert_eq!(loaded.content_hash(), memory.content_hash());
    }

    #[test]
    fn readback_image() {
        let profile = resolve_profile(&global(Some("xc4vfx12"), None)).unwrap();
        let words = vec![0xFFFF_FFFFu32; profile.frame_size() * 2];
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readback.bin");
        std::fs::write(&path, bytes).unwrap();

        let loaded = load_image(profile, &path, 0).unwrap();
        assert_eq!(loaded.configured_frames().count(), 1);
    }

    #[test]
    fn malformed_json_reports_path() {
        let profile = resolve_profile(&global(Some("xc4vfx12"), None)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_image(profile, &path, 0).unwrap_err();
        assert!(err.to_string().contains("invalid command stream"));
    }
}
