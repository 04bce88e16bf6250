//! `cfgmem writes`: frames touched by an FDRI write.

use std::error::Error;
use std::sync::Arc;

use cfgmem_frames::{write_summary, FrameAddress, WriteSummary};
use cfgmem_profile::DeviceProfile;

use crate::image::resolve_profile;
use crate::{GlobalArgs, ReportFormat, WritesArgs};

/// Runs the `cfgmem writes` command.
pub fn run(args: &WritesArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let profile = resolve_profile(global)?;
    let summary = write_summary(Arc::clone(&profile), args.far, args.words);

    match args.format {
        ReportFormat::Text => print!("{}", render_summary(&profile, &summary)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(0)
}

fn render_summary(profile: &Arc<DeviceProfile>, summary: &WriteSummary) -> String {
    let start = FrameAddress::from_address(Arc::clone(profile), summary.start_far);
    let mut out = format!(
        "Initial FAR: {start}\nFDRI words={} ({} frames)\n",
        summary.words, summary.frames
    );
    for (i, &address) in summary.touched.iter().enumerate() {
        let far = FrameAddress::from_address(Arc::clone(profile), address);
        out.push_str(&format!("Frame #{i}: {far}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_each_frame() {
        let profile = Arc::new(DeviceProfile::builtin("xc4vfx12").unwrap());
        let summary = write_summary(Arc::clone(&profile), 0, 41 * 2 + 5);
        let text = render_summary(&profile, &summary);
        assert!(text.contains("FDRI words=87 (2 frames)"));
        assert!(text.contains("Frame #1: FAR=00000001"));
        assert_eq!(text.lines().count(), 4);
    }
}
