//! Byte and word manipulation helpers shared by the CPU and the bus.

/// Combine a high and low byte into a word.
pub fn combine(hi: u8, lo: u8) -> u16 {
  (u16::from(hi) << 8) | u16::from(lo)
}

/// Split a word into its (high, low) bytes.
pub fn split(value: u16) -> (u8, u8) {
  ((value >> 8) as u8, value as u8)
}

/// Read bit `pos` of `value`.
pub fn get_bit(value: u8, pos: u8) -> bool {
  value & (1 << pos) != 0
}

/// Return `value` with bit `pos` set or cleared.
pub fn set_bit(value: u8, pos: u8, on: bool) -> u8 {
  if on {
    value | (1 << pos)
  } else {
    value & !(1 << pos)
  }
}

/// True if adding the low nibbles of `a` and `b` carries out of bit 3.
pub fn half_carry_add(a: u8, b: u8) -> bool {
  (a & 0xf) + (b & 0xf) > 0xf
}

/// True if subtracting `b` from `a` borrows into bit 3.
pub fn half_carry_sub(a: u8, b: u8) -> bool {
  a & 0xf < b & 0xf
}

/// True if adding the low twelve bits of `a` and `b` carries out of
/// bit 11. This is the 16-bit half-carry used by ADD HL,rr.
pub fn half_carry_add16(a: u16, b: u16) -> bool {
  (a & 0xfff) + (b & 0xfff) > 0xfff
}
