mod args;

use std::fs::File;
use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use famicore_core::{MASTER_PALETTE, Nes, SCREEN_HEIGHT, SCREEN_WIDTH};

use crate::args::Args;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let mut nes = Nes::new();
    nes.load_cartridge_from_file(&args.rom)
        .with_context(|| format!("loading {}", args.rom.display()))?;
    info!(rom = %args.rom.display(), frames = args.frames, "starting emulation");

    for frame in 0..args.frames {
        nes.tick_until_vsync();
        if args.trace_cpu {
            let snap = nes.cpu_snapshot();
            println!(
                "frame {frame:5}  PC:{:04X} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X}",
                snap.pc, snap.a, snap.x, snap.y, snap.p, snap.s
            );
        }
    }

    info!(
        cpu_cycles = nes.cpu_cycles(),
        ppu_dots = nes.ppu_dots(),
        "emulation finished"
    );

    if let Some(path) = &args.dump_frame {
        write_ppm(&nes, path).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "frame dumped");
    }

    Ok(())
}

/// Writes the current frame as a binary PPM (P6) using the master palette.
fn write_ppm(nes: &Nes, path: &std::path::Path) -> Result<()> {
    let mut file = File::create(path)?;
    write!(file, "P6\n{SCREEN_WIDTH} {SCREEN_HEIGHT}\n255\n")?;

    let mut pixels = Vec::with_capacity(SCREEN_WIDTH * SCREEN_HEIGHT * 3);
    for &index in nes.frame_buffer() {
        let (r, g, b) = MASTER_PALETTE[(index & 0x3F) as usize];
        pixels.extend_from_slice(&[r, g, b]);
    }
    file.write_all(&pixels)?;
    Ok(())
}
