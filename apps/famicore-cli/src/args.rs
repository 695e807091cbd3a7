use std::path::PathBuf;

use clap::Parser;

/// Headless famicore runner
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the NES ROM file
    #[arg(required = true)]
    pub rom: PathBuf,

    /// Number of frames to emulate
    #[arg(long, default_value_t = 60)]
    pub frames: u64,

    /// Write the final frame as a binary PPM image
    #[arg(long)]
    pub dump_frame: Option<PathBuf>,

    /// Print the CPU register snapshot after every frame
    #[arg(long)]
    pub trace_cpu: bool,
}
