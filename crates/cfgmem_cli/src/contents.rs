//! `cfgmem contents`: per-frame dump.

use std::error::Error;
use std::path::Path;

use crate::image::{load_image, resolve_profile};
use crate::{ContentsArgs, GlobalArgs};

/// Runs the `cfgmem contents` command.
pub fn run(args: &ContentsArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let profile = resolve_profile(global)?;
    let memory = load_image(profile, Path::new(&args.image), args.start_far)?;
    memory.index_of(args.from)?;

    let count = args.count.unwrap_or_else(|| memory.frame_count());
    print!("{}", memory.frame_contents(args.from, count));
    Ok(0)
}
