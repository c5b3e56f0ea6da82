//! Headless demo binary exercising the Host Seam. Deliberately does not open
//! a window, poll a gamepad, or play audio — those are a collaborator's job.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use gbcore::Gameboy;

#[derive(Parser)]
#[command(about = "Runs a ROM against the core and optionally dumps a frame")]
struct Args {
    /// Path to the ROM file to load.
    rom: PathBuf,

    /// Number of frames to step before stopping.
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Write the final frame as an ASCII PGM image to this path.
    #[arg(long)]
    dump: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut gb = match Gameboy::initialise(&args.rom) {
        Ok(gb) => gb,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    for _ in 0..args.frames {
        gb.step();
    }

    if let Some(path) = &args.dump {
        if let Err(err) = dump_frame(&gb, path) {
            error!("failed to write frame dump: {err}");
            return ExitCode::FAILURE;
        }
    }

    if let Err(err) = gb.save_ram() {
        error!("{err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn dump_frame(gb: &Gameboy, path: &PathBuf) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    gb.read_framebuffer().write_pgm(file)
}
