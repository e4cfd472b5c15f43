use crate::bits;

// Flag bit positions in F.
pub const Z: u8 = 0x80;
pub const N: u8 = 0x40;
pub const H: u8 = 0x20;
pub const C: u8 = 0x10;

/// The CPU register file: eight 8-bit registers, the two 16-bit
/// pointers, and the four condition flags.
///
/// The booleans are the working flag state; ALU operations set them
/// directly and `update_f` packs them into F's high nibble once per
/// step. F's low nibble is always zero.
#[derive(Debug, Eq, PartialEq)]
pub struct Registers {
  pub a: u8,
  pub b: u8,
  pub c: u8,
  pub d: u8,
  pub e: u8,
  pub f: u8,
  pub h: u8,
  pub l: u8,

  /// Stack pointer.
  pub sp: u16,

  /// Program counter.
  pub pc: u16,

  // Condition flags: zero, subtract, half-carry, carry.
  pub zf: bool,
  pub nf: bool,
  pub hf: bool,
  pub cf: bool,
}

impl Registers {
  /// Documented post-boot-ROM register values.
  pub fn new() -> Registers {
    Registers {
      a: 0x01,
      f: 0xb0,
      b: 0x00,
      c: 0x13,
      d: 0x00,
      e: 0xd8,
      h: 0x01,
      l: 0x4d,

      sp: 0xfffe,
      pc: 0x100,

      zf: true,
      nf: false,
      hf: true,
      cf: true,
    }
  }

  pub fn af(&self) -> u16 {
    bits::combine(self.a, self.flags_byte())
  }
  pub fn bc(&self) -> u16 {
    bits::combine(self.b, self.c)
  }
  pub fn de(&self) -> u16 {
    bits::combine(self.d, self.e)
  }
  pub fn hl(&self) -> u16 {
    bits::combine(self.h, self.l)
  }

  pub fn set_bc(&mut self, value: u16) {
    let (hi, lo) = bits::split(value);
    self.b = hi;
    self.c = lo;
  }
  pub fn set_de(&mut self, value: u16) {
    let (hi, lo) = bits::split(value);
    self.d = hi;
    self.e = lo;
  }
  pub fn set_hl(&mut self, value: u16) {
    let (hi, lo) = bits::split(value);
    self.h = hi;
    self.l = lo;
  }

  pub fn hl_inc(&mut self) {
    let hl = self.hl().wrapping_add(1);
    self.set_hl(hl);
  }
  pub fn hl_dec(&mut self) {
    let hl = self.hl().wrapping_sub(1);
    self.set_hl(hl);
  }

  /// Pack the current flags into a byte without touching F.
  pub fn flags_byte(&self) -> u8 {
    let mut f = 0;
    if self.zf {
      f |= Z;
    }
    if self.nf {
      f |= N;
    }
    if self.hf {
      f |= H;
    }
    if self.cf {
      f |= C;
    }
    f
  }

  /// Mirror the flags into F. Called once per step after the
  /// instruction has executed.
  pub fn update_f(&mut self) {
    self.f = self.flags_byte();
  }

  /// Load F (POP AF), unpacking the high nibble back into the flags.
  /// The low nibble is discarded, as on hardware.
  pub fn set_f(&mut self, value: u8) {
    self.f = value & 0xf0;
    self.zf = self.f & Z != 0;
    self.nf = self.f & N != 0;
    self.hf = self.f & H != 0;
    self.cf = self.f & C != 0;
  }
}
