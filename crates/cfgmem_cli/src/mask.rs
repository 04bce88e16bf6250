//! `cfgmem mask`: bitwise combination of two images.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use cfgmem_frames::{combine, FrameOperation};

use crate::image::{load_image, resolve_profile, save_commands};
use crate::{GlobalArgs, MaskArgs};

/// Runs the `cfgmem mask` command.
pub fn run(args: &MaskArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let op = FrameOperation::from(args.op);
    let profile = resolve_profile(global)?;

    let mut left = load_image(Arc::clone(&profile), Path::new(&args.left), args.start_far)?;
    let mut right = match (&args.right, op.takes_operand()) {
        (Some(path), true) => Some(load_image(
            Arc::clone(&profile),
            Path::new(path),
            args.start_far,
        )?),
        (None, true) => return Err(format!("operation '{op}' needs a second image").into()),
        (_, false) => None,
    };

    combine(&mut left, right.as_mut(), op)?;
    save_commands(&left, Path::new(&args.output))?;

    if !global.quiet {
        eprintln!(
            "   Wrote {} configured frames to {}",
            left.configured_frames().count(),
            args.output
        );
    }
    Ok(0)
}
