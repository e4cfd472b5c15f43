//! The LR35902 core: register file, instruction tables, execution, and
//! the interrupt state machine.

mod alu;
mod decode;
mod exec;
pub mod reg;

#[cfg(test)]
mod optest;

use log::info;

use crate::cpu::decode::{CbOp, Op};
use crate::cpu::reg::Registers;
use crate::gameboy::Policy;
use crate::mem::{Memory, IE, IF};

/// Handler addresses for the five interrupt sources, in priority order:
/// VBlank, LCD STAT, timer, serial, joypad.
const INT_VECTORS: [u16; 5] = [0x40, 0x48, 0x50, 0x58, 0x60];

pub struct CPU {
  pub regs: Registers,

  /// Master interrupt enable.
  pub ime: bool,
  /// Countdown armed by EI; IME turns on when it reaches zero.
  ime_delay: Option<u8>,

  /// Parked on a HALT, waiting for a pending interrupt.
  pub halted: bool,
  /// Stopped permanently after a strict-policy fault.
  pub hung: bool,

  policy: Policy,
  base: [Op; 256],
  cb: [CbOp; 256],
}

impl CPU {
  pub fn new(policy: Policy) -> CPU {
    CPU {
      regs: Registers::new(),
      ime: false,
      ime_delay: None,
      halted: false,
      hung: false,
      policy,
      base: decode::base_table(),
      cb: decode::cb_table(),
    }
  }

  /// Advance the delayed-EI countdown. Runs at the start of every step,
  /// so the instruction after EI still executes with interrupts off.
  pub fn tick_ime(&mut self) {
    if let Some(delay) = self.ime_delay {
      if delay == 0 {
        self.ime = true;
        self.ime_delay = None;
      } else {
        self.ime_delay = Some(delay - 1);
      }
    }
  }

  /// Interrupt sources both requested and enabled.
  pub fn pending(&self, mem: &Memory) -> u8 {
    mem.rb(IF) & mem.rb(IE) & 0x1f
  }

  /// Service the highest-priority pending interrupt, if IME allows.
  /// Acknowledges the request, pushes PC, and jumps to the vector.
  pub fn dispatch_interrupt(&mut self, mem: &mut Memory) -> Option<u32> {
    if !self.ime {
      return None;
    }
    let pending = self.pending(mem);
    for bit in 0..5 {
      if pending & (1 << bit) != 0 {
        info!("servicing interrupt {} at {:#06x}", bit, INT_VECTORS[bit]);
        self.ime = false;
        self.ime_delay = None;
        mem.modify_bit(IF, bit as u8, false);
        let pc = self.regs.pc;
        self.push_word(mem, pc);
        self.regs.pc = INT_VECTORS[bit];
        return Some(5);
      }
    }
    None
  }

  /// Leave the halted state if any enabled interrupt is requested,
  /// whether or not IME is set, stepping past the HALT opcode.
  pub fn try_wake(&mut self, mem: &Memory) -> bool {
    if self.halted && self.pending(mem) != 0 {
      self.halted = false;
      self.regs.pc = self.regs.pc.wrapping_add(1);
      return true;
    }
    false
  }
}
