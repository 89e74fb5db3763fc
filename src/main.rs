use std::{path::PathBuf, process::ExitCode, time::Duration};

use anyhow::Context;
use chip8::{Chip8, Driver, Key};
use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[command(version, about = "Run a CHIP-8 program headless and print the final screen", long_about = None)]
struct Args {
    #[arg(short, long, value_name = "PATH", help = "Load ROM into memory", value_hint = clap::ValueHint::FilePath)]
    load: PathBuf,
    #[arg(short, long, default_value_t = 1000, help = "Stop after this many ticks")]
    ticks: usize,
    #[arg(short, long, value_name = "MS", default_value_t = 2, help = "Milliseconds between ticks")]
    interval_ms: u64,
    #[arg(long, help = "Seed the random number generator")]
    seed: Option<u64>,
    #[arg(short, long, value_name = "HEX", value_parser = parse_key, help = "Hold down a key for the whole run")]
    key: Option<Key>,
    #[arg(long, help = "Toggle shift operation modes")]
    legacy_shift: bool,
    #[arg(long, help = "Toggle jump operation modes")]
    jump_add_offset: bool,
    #[arg(long, help = "Toggle memory read/write operation modes")]
    memory_increment_i: bool,
    #[arg(long, help = "Leave VF alone on XOR")]
    plain_xor: bool,
    #[arg(long, help = "Print registers and a memory dump when done")]
    dump: bool,
}

fn parse_key(value: &str) -> Result<Key, String> {
    u8::from_str_radix(value.trim_start_matches("0x"), 16)
        .ok()
        .filter(|&n| n <= 0xF)
        .map(Key::from_hex)
        .ok_or_else(|| format!("'{}' is not a hex digit between 0 and F", value))
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut chip8 = Chip8::new()
        .context("construct new chip8 instance")?
        .legacy_shift(args.legacy_shift)
        .jump_add_offset(args.jump_add_offset)
        .memory_increment_i(args.memory_increment_i)
        .xor_flag(!args.plain_xor);
    if let Some(seed) = args.seed {
        chip8 = chip8.with_seed(seed);
    }

    let rom = std::fs::read(&args.load)
        .with_context(|| format!("read rom file {}", args.load.display()))?;
    chip8.load_rom(&rom).context("load rom into memory")?;
    info!("loaded {} ({} bytes)", args.load.display(), rom.len());

    let mut driver = Driver::new(chip8, Duration::from_millis(args.interval_ms));
    if let Some(key) = args.key {
        driver.keydown(key);
    }

    let mut frames = 0usize;
    let ticks = driver
        .run_for(args.ticks, |_| frames += 1)
        .context("run program")?;
    info!("ran {} ticks, {} frames", ticks, frames);

    let chip8 = driver.chip8();
    print!("{}", chip8.display());
    if chip8.is_sound_playing() {
        println!("(sound timer active: {})", chip8.st());
    }
    if args.dump {
        println!("{}", chip8);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}
