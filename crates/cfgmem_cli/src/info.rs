//! `cfgmem info`: device geometry and image summary.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use cfgmem_frames::{FrameAddress, ImageSummary};
use cfgmem_profile::DeviceProfile;
use serde::Serialize;

use crate::image::{load_image, resolve_profile};
use crate::{GlobalArgs, InfoArgs, ReportFormat};

/// Frame counts of one block type.
#[derive(Debug, Serialize)]
struct BlockTypeInfo {
    name: String,
    columns: u32,
    frames: usize,
    start_far: u32,
}

/// Geometry of a device as reported by `info`.
#[derive(Debug, Serialize)]
struct DeviceInfo {
    device: String,
    family: String,
    frame_size: usize,
    top_rows: u32,
    bottom_rows: u32,
    frames: usize,
    block_types: Vec<BlockTypeInfo>,
}

impl DeviceInfo {
    fn of(profile: &DeviceProfile) -> Self {
        let block_types = profile
            .block_types()
            .iter()
            .zip(0u32..)
            .map(|(bt, index)| BlockTypeInfo {
                name: bt.name.clone(),
                columns: profile.number_of_columns(index),
                frames: FrameAddress::frames_per_block_type(profile, index),
                start_far: FrameAddress::block_start(profile, index),
            })
            .collect();
        Self {
            device: profile.device().to_string(),
            family: profile.family().to_string(),
            frame_size: profile.frame_size(),
            top_rows: profile.top_rows(),
            bottom_rows: profile.bottom_rows(),
            frames: FrameAddress::total_frames(profile),
            block_types,
        }
    }
}

/// Runs the `cfgmem info` command.
pub fn run(args: &InfoArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let profile = resolve_profile(global)?;

    let Some(image) = &args.image else {
        let info = DeviceInfo::of(&profile);
        match args.format {
            ReportFormat::Text => {
                if !global.quiet {
                    print!("{}", render_device(&profile, &info));
                }
            }
            ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
        }
        return Ok(0);
    };

    let memory = load_image(Arc::clone(&profile), Path::new(image), args.start_far)?;
    let summary = ImageSummary::of(&memory);
    match args.format {
        ReportFormat::Text => {
            if !global.quiet {
                print!("{}", render_summary(&summary));
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(0)
}

fn render_device(profile: &DeviceProfile, info: &DeviceInfo) -> String {
    let mut out = profile.to_string();
    out.push_str(&format!("Frames: {}\n", info.frames));
    for bt in &info.block_types {
        out.push_str(&format!(
            "\t{}: {} frames from FAR {:08X}\n",
            bt.name, bt.frames, bt.start_far
        ));
    }
    out
}

fn render_summary(summary: &ImageSummary) -> String {
    format!(
        "Device: {}\nFrames: {} ({} words each)\nConfigured: {}\nNon-empty: {}\nHash: {}\n",
        summary.device,
        summary.frames,
        summary.frame_size,
        summary.configured,
        summary.non_empty,
        summary.hash
    )
}
