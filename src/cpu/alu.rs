//! Arithmetic and logic primitives. Each routine mutates its value (or
//! the accumulator) and recomputes the flags from the actual result;
//! nothing here reads stale flag state except where an operation is
//! defined in terms of the incoming carry.

use crate::bits;
use crate::cpu::CPU;

impl CPU {
  /// ADD A,n / ADC A,n. The carry-in participates in the half-carry and
  /// carry checks against the original operands, not the sum.
  pub fn add_a(&mut self, n: u8, with_carry: bool) {
    let a = self.regs.a;
    let c = if with_carry && self.regs.cf { 1 } else { 0 };
    let result = a.wrapping_add(n).wrapping_add(c);
    self.regs.hf = (a & 0xf) + (n & 0xf) + c > 0xf;
    self.regs.cf = u16::from(a) + u16::from(n) + u16::from(c) > 0xff;
    self.regs.zf = result == 0;
    self.regs.nf = false;
    self.regs.a = result;
  }

  /// SUB n / SBC A,n.
  pub fn sub_a(&mut self, n: u8, with_carry: bool) {
    let a = self.regs.a;
    let c = if with_carry && self.regs.cf { 1 } else { 0 };
    let result = a.wrapping_sub(n).wrapping_sub(c);
    self.regs.hf = (a & 0xf) < (n & 0xf) + c;
    self.regs.cf = u16::from(n) + u16::from(c) > u16::from(a);
    self.regs.zf = result == 0;
    self.regs.nf = true;
    self.regs.a = result;
  }

  pub fn and_a(&mut self, n: u8) {
    self.regs.a &= n;
    self.regs.zf = self.regs.a == 0;
    self.regs.nf = false;
    self.regs.hf = true;
    self.regs.cf = false;
  }

  pub fn xor_a(&mut self, n: u8) {
    self.regs.a ^= n;
    self.regs.zf = self.regs.a == 0;
    self.regs.nf = false;
    self.regs.hf = false;
    self.regs.cf = false;
  }

  pub fn or_a(&mut self, n: u8) {
    self.regs.a |= n;
    self.regs.zf = self.regs.a == 0;
    self.regs.nf = false;
    self.regs.hf = false;
    self.regs.cf = false;
  }

  /// CP n: SUB's flag computation with the result discarded.
  pub fn cp_a(&mut self, n: u8) {
    let a = self.regs.a;
    self.regs.hf = bits::half_carry_sub(a, n);
    self.regs.cf = n > a;
    self.regs.zf = a == n;
    self.regs.nf = true;
  }

  /// INC on a byte. Carry is left untouched.
  pub fn inc8(&mut self, v: u8) -> u8 {
    let result = v.wrapping_add(1);
    self.regs.hf = bits::half_carry_add(v, 1);
    self.regs.zf = result == 0;
    self.regs.nf = false;
    result
  }

  /// DEC on a byte. Carry is left untouched.
  pub fn dec8(&mut self, v: u8) -> u8 {
    let result = v.wrapping_sub(1);
    self.regs.hf = bits::half_carry_sub(v, 1);
    self.regs.zf = result == 0;
    self.regs.nf = true;
    result
  }

  /// ADD HL,rr. Half-carry is at the low-12-bit boundary; Z untouched.
  pub fn add_hl(&mut self, n: u16) {
    let hl = self.regs.hl();
    self.regs.hf = bits::half_carry_add16(hl, n);
    self.regs.cf = u32::from(hl) + u32::from(n) > 0xffff;
    self.regs.nf = false;
    self.regs.set_hl(hl.wrapping_add(n));
  }

  /// Shared by ADD SP,e and LD HL,SP+e: flags come from the unsigned
  /// low-byte addition, Z and N are cleared.
  pub fn add_sp_offset(&mut self, offset: i8) -> u16 {
    let sp = self.regs.sp;
    let e = offset as u8;
    self.regs.hf = bits::half_carry_add(sp as u8, e);
    self.regs.cf = (sp & 0xff) + u16::from(e) > 0xff;
    self.regs.zf = false;
    self.regs.nf = false;
    sp.wrapping_add(offset as i16 as u16)
  }

  /// BCD adjustment. Branches on the subtract flag, and the correction
  /// thresholds come from the carry/half-carry left by the previous
  /// operation, never re-derived from A.
  pub fn daa(&mut self) {
    let mut a = self.regs.a;
    if !self.regs.nf {
      if self.regs.cf || a > 0x99 {
        a = a.wrapping_add(0x60);
        self.regs.cf = true;
      }
      if self.regs.hf || a & 0xf > 0x9 {
        a = a.wrapping_add(0x06);
      }
    } else {
      if self.regs.cf {
        a = a.wrapping_sub(0x60);
      }
      if self.regs.hf {
        a = a.wrapping_sub(0x06);
      }
    }
    self.regs.zf = a == 0;
    self.regs.hf = false;
    self.regs.a = a;
  }

  pub fn cpl(&mut self) {
    self.regs.a = !self.regs.a;
    self.regs.nf = true;
    self.regs.hf = true;
  }

  pub fn scf(&mut self) {
    self.regs.cf = true;
    self.regs.nf = false;
    self.regs.hf = false;
  }

  pub fn ccf(&mut self) {
    self.regs.cf = !self.regs.cf;
    self.regs.nf = false;
    self.regs.hf = false;
  }

  /// Rotate left. Without carry-through the bit rotated out is also the
  /// bit rotated in; with carry-through the old carry comes in instead.
  pub fn rot_left(&mut self, v: u8, through_carry: bool) -> u8 {
    let b7 = v >> 7;
    let low = if through_carry {
      self.regs.cf as u8
    } else {
      b7
    };
    let result = (v << 1) | low;
    self.regs.cf = b7 != 0;
    self.set_rotate_flags(result);
    result
  }

  /// Rotate right; mirror of `rot_left`.
  pub fn rot_right(&mut self, v: u8, through_carry: bool) -> u8 {
    let b0 = v & 0x1;
    let high = if through_carry {
      self.regs.cf as u8
    } else {
      b0
    };
    let result = (v >> 1) | (high << 7);
    self.regs.cf = b0 != 0;
    self.set_rotate_flags(result);
    result
  }

  /// SLA: arithmetic shift left.
  pub fn shift_left(&mut self, v: u8) -> u8 {
    let result = v << 1;
    self.regs.cf = v >> 7 != 0;
    self.set_rotate_flags(result);
    result
  }

  /// SRA: arithmetic shift right, bit 7 preserved.
  pub fn shift_right_arith(&mut self, v: u8) -> u8 {
    let result = ((v as i8) >> 1) as u8;
    self.regs.cf = v & 0x1 != 0;
    self.set_rotate_flags(result);
    result
  }

  /// SRL: logical shift right, bit 7 cleared.
  pub fn shift_right_logic(&mut self, v: u8) -> u8 {
    let result = v >> 1;
    self.regs.cf = v & 0x1 != 0;
    self.set_rotate_flags(result);
    result
  }

  /// Exchange the high and low nibbles.
  pub fn swap(&mut self, v: u8) -> u8 {
    let result = (v << 4) | (v >> 4);
    self.regs.zf = result == 0;
    self.regs.nf = false;
    self.regs.hf = false;
    self.regs.cf = false;
    result
  }

  /// BIT: Z reports the tested bit, carry is untouched, nothing is
  /// written back.
  pub fn bit_test(&mut self, pos: u8, v: u8) {
    self.regs.zf = !bits::get_bit(v, pos);
    self.regs.nf = false;
    self.regs.hf = true;
  }

  fn set_rotate_flags(&mut self, result: u8) {
    self.regs.zf = result == 0;
    self.regs.nf = false;
    self.regs.hf = false;
  }
}
