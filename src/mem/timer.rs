//! The free-running timer. One tick per emulated machine step: DIV
//! mirrors the counter's high byte, TIMA advances at the TAC-selected
//! rate and raises the timer interrupt on overflow.

use crate::bits;
use crate::mem::{Memory, DIV, IF, TAC, TIMA, TMA};

impl Memory {
  /// Advance the timer by one machine step.
  pub fn tick_timer(&mut self) {
    self.bytes[DIV as usize] = (self.counter >> 8) as u8;

    if bits::get_bit(self.rb(TAC), 2) {
      // The TAC clock select maps to a divisor of the step counter.
      let divisor = match self.rb(TAC) & 0x3 {
        0 => 256,
        1 => 4,
        2 => 16,
        _ => 64,
      };
      if self.counter % divisor == 0 {
        self.inc_tima();
      }
    }

    self.counter = self.counter.wrapping_add(1);
  }

  /// Increment TIMA, reloading from TMA and flagging the timer
  /// interrupt on overflow.
  fn inc_tima(&mut self) {
    let tima = self.rb(TIMA).wrapping_add(1);
    if tima == 0 {
      let tma = self.rb(TMA);
      self.bytes[TIMA as usize] = tma;
      self.modify_bit(IF, 2, true);
    } else {
      self.bytes[TIMA as usize] = tima;
    }
  }
}
