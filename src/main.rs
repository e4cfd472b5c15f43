mod bits;
mod cpu;
mod gameboy;
mod mem;

use std::fs;

use anyhow::{Context, Result};
use clap::{App, Arg};
use log::info;

use crate::gameboy::{GameBoy, Policy};

fn main() -> Result<()> {
  env_logger::init()?;

  let matches = App::new("gbstep")
    .version("0.1.0")
    .about("Cycle-stepped Game Boy CPU interpreter")
    .arg(
      Arg::with_name("rom")
        .help("ROM image to execute")
        .required(true),
    )
    .arg(
      Arg::with_name("steps")
        .short("n")
        .long("steps")
        .takes_value(true)
        .help("Machine steps to run before stopping"),
    )
    .arg(
      Arg::with_name("strict")
        .long("strict")
        .help("Treat illegal opcodes and unusable-region writes as fatal"),
    )
    .get_matches();

  let path = matches.value_of("rom").unwrap();
  let steps = matches
    .value_of("steps")
    .unwrap_or("10000000")
    .parse::<u64>()
    .context("invalid step count")?;
  let policy = if matches.is_present("strict") {
    Policy::Strict
  } else {
    Policy::Permissive
  };

  let rom = fs::read(path).with_context(|| format!("failed to read ROM {}", path))?;
  let mut gb = GameBoy::new_with_policy(policy);
  let title = gb.load_rom(&rom)?;
  info!("loaded \"{}\" ({} bytes)", title, rom.len());

  let mut cycles = 0u64;
  for _ in 0..steps {
    let step_cycles = gb.step();
    if step_cycles == 0 {
      break;
    }
    cycles += u64::from(step_cycles);
  }

  info!("ran {} machine cycles", cycles);
  info!(
    "AF={:#06x} BC={:#06x} DE={:#06x} HL={:#06x} SP={:#06x} PC={:#06x}",
    gb.cpu.regs.af(),
    gb.cpu.regs.bc(),
    gb.cpu.regs.de(),
    gb.cpu.regs.hl(),
    gb.cpu.regs.sp,
    gb.cpu.regs.pc
  );
  Ok(())
}
