//! The assembled machine: one CPU, one bus, and the step loop that ties
//! the interrupt state machine and the timer together.

use anyhow::Result;

use crate::cpu::CPU;
use crate::mem::Memory;

/// How the machine reacts to suspicious guest behavior: writes to the
/// unusable region and illegal opcodes are either logged and tolerated
/// or treated as fatal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Policy {
  Permissive,
  Strict,
}

pub struct GameBoy {
  pub cpu: CPU,
  pub mem: Memory,
}

impl GameBoy {
  pub fn new() -> GameBoy {
    GameBoy::new_with_policy(Policy::Permissive)
  }

  pub fn new_with_policy(policy: Policy) -> GameBoy {
    GameBoy {
      cpu: CPU::new(policy),
      mem: Memory::new(policy),
    }
  }

  /// Load a flat ROM image, returning the cartridge title.
  pub fn load_rom(&mut self, rom: &[u8]) -> Result<String> {
    self.mem.load_rom(rom)
  }

  /// Run one machine step: at most one instruction or one interrupt
  /// dispatch, plus one timer tick. Returns the machine cycles spent,
  /// or 0 once the machine has stopped on a strict-policy fault.
  pub fn step(&mut self) -> u32 {
    if self.cpu.hung || self.mem.fault() {
      return 0;
    }

    self.cpu.tick_ime();

    if self.cpu.halted && !self.cpu.try_wake(&self.mem) {
      self.mem.tick_timer();
      return 1;
    }

    let cycles = match self.cpu.dispatch_interrupt(&mut self.mem) {
      Some(cycles) => cycles,
      None => self.cpu.exec(&mut self.mem),
    };
    self.cpu.regs.update_f();

    self.mem.tick_timer();
    cycles
  }
}
