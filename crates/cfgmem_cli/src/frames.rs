//! `cfgmem frames`: runs of empty and non-empty frames.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use cfgmem_frames::{non_empty_runs, ConfigMemory, FrameAddress, FrameRun, RunKind};

use crate::image::{load_image, resolve_profile};
use crate::{FramesArgs, GlobalArgs, ReportFormat};

/// Runs the `cfgmem frames` command.
pub fn run(args: &FramesArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let profile = resolve_profile(global)?;
    let memory = load_image(profile, Path::new(&args.image), args.start_far)?;
    let runs = non_empty_runs(&memory);

    match args.format {
        ReportFormat::Text => print!("{}", render_runs(&memory, &runs, args.detail)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&runs)?),
    }
    Ok(0)
}

/// One line per non-empty run: start address, length and the decoded FAR
/// of the frame that ends it. With `detail`, every frame of the run follows.
fn render_runs(memory: &ConfigMemory, runs: &[FrameRun], detail: bool) -> String {
    let profile = memory.profile();
    let mut out = String::new();
    for run in runs.iter().filter(|r| r.kind == RunKind::NonEmpty) {
        let mut far = FrameAddress::from_address(Arc::clone(profile), run.start_far);
        let mut members = Vec::with_capacity(run.count);
        for _ in 0..run.count {
            members.push(far.to_string());
            far.increment();
        }
        out.push_str(&format!(
            "0x{:x} ({} frames) {}\n",
            run.start_far,
            run.count,
            if far.is_valid() {
                far.to_string()
            } else {
                "end of device".to_string()
            }
        ));
        if detail {
            for m in members {
                out.push_str(&format!("\t{m}\n"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfgmem_profile::DeviceProfile;

    fn memory() -> ConfigMemory {
        let profile = Arc::new(DeviceProfile::builtin("xc4vfx12").unwrap());
        let size = profile.frame_size();
        let mut m = ConfigMemory::new(profile);
        let mut words = vec![0u32; size * 4];
        words[size] = 1;
        words[size * 2] = 1;
        m.write_frame_data(&words);
        m
    }

    #[test]
    fn one_line_per_non_empty_run() {
        let m = memory();
        let text = render_runs(&m, &non_empty_runs(&m), false);
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("0x1 (2 frames) FAR=00000003"));
    }

    #[test]
    fn detail_lists_members() {
        let m = memory();
        let text = render_runs(&m, &non_empty_runs(&m), true);
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(1).unwrap().starts_with("\tFAR=00000001"));
    }
}
