//! `cfgmem diff`: frames that differ between two images.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use cfgmem_frames::{DiffReport, FrameAddress};
use cfgmem_profile::DeviceProfile;

use crate::image::{load_image, resolve_profile};
use crate::{DiffArgs, GlobalArgs, ReportFormat};

/// Runs the `cfgmem diff` command.
///
/// Exits with 0 when the images match and 1 when any frame differs.
pub fn run(args: &DiffArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let profile = resolve_profile(global)?;
    let left = load_image(Arc::clone(&profile), Path::new(&args.left), args.start_far)?;
    let right = load_image(Arc::clone(&profile), Path::new(&args.right), args.start_far)?;
    let report = DiffReport::build(&left, &right, args.ignore_unconfigured)?;

    match args.format {
        ReportFormat::Text => {
            if !global.quiet {
                print!("{}", render_report(&profile, &report));
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(if report.is_identical() { 0 } else { 1 })
}

fn render_report(profile: &Arc<DeviceProfile>, report: &DiffReport) -> String {
    let mut out = String::new();
    for &address in &report.differing {
        let far = FrameAddress::from_address(Arc::clone(profile), address);
        out.push_str(&format!("{far}\n"));
    }
    out.push_str(&format!(
        "{} of {} frames differ\n",
        report.differing.len(),
        report.compared
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_text() {
        let profile = Arc::new(DeviceProfile::builtin("xc4vfx12").unwrap());
        let report = DiffReport {
            device: "XC4VFX12".into(),
            compared: 100,
            ignore_unconfigured: false,
            differing: vec![0x40],
        };
        let text = render_report(&profile, &report);
        assert!(text.starts_with("FAR=00000040, top Type=LOGIC (0), Row=0, Column=1"));
        assert!(text.ends_with("1 of 100 frames differ\n"));
    }
}
