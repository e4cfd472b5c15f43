mod timer;

use anyhow::{bail, Result};
use log::{error, warn};

use crate::bits;
use crate::gameboy::Policy;

const MEM_SIZE: usize = 0x10000;

// Named I/O registers in the memory map.
pub const JOYP: u16 = 0xff00;
pub const SB: u16 = 0xff01;
pub const SC: u16 = 0xff02;
pub const DIV: u16 = 0xff04;
pub const TIMA: u16 = 0xff05;
pub const TMA: u16 = 0xff06;
pub const TAC: u16 = 0xff07;
pub const IF: u16 = 0xff0f;
pub const LCDC: u16 = 0xff40;
pub const SCY: u16 = 0xff42;
pub const SCX: u16 = 0xff43;
pub const LYC: u16 = 0xff45;
pub const DMA: u16 = 0xff46;
pub const BGP: u16 = 0xff47;
pub const WY: u16 = 0xff4a;
pub const WX: u16 = 0xff4b;
pub const IE: u16 = 0xffff;

const TITLE_START: usize = 0x134;
const TITLE_END: usize = 0x144;

/// The 64KB address space plus the CPU-facing write policy.
///
/// `rb` is a plain array read. `wb` is the single entry point for all
/// writes performed by CPU instructions; it applies the address-dependent
/// interception rules (echo RAM, blocked ROM, register side effects, DMA).
/// Collaborators outside the CPU (video, input, the loader) use `poke` and
/// `modify_bit`, which bypass the policy the way hardware peripherals do.
pub struct Memory {
  bytes: Box<[u8; MEM_SIZE]>,

  /// Free-running divider counter. DIV mirrors its high byte.
  counter: u16,

  policy: Policy,
  fault: bool,
}

impl Memory {
  pub fn new(policy: Policy) -> Memory {
    let mut result = Memory {
      bytes: Box::new([0; MEM_SIZE]),
      counter: 0,
      policy,
      fault: false,
    };
    result.power_on();
    result
  }

  /// Set the documented post-boot-ROM I/O register values.
  /// See http://nocash.emubase.de/pandocs.htm#powerupsequence
  fn power_on(&mut self) {
    self.counter = 0xabbc;
    self.poke(DIV, 0xab);
    self.poke(TIMA, 0x00);
    self.poke(TMA, 0x00);
    self.poke(TAC, 0x00);
    self.poke(0xff10, 0x80); // NR10
    self.poke(0xff11, 0xbf); // NR11
    self.poke(0xff12, 0xf3); // NR12
    self.poke(0xff14, 0xbf); // NR14
    self.poke(0xff16, 0x3f); // NR21
    self.poke(0xff17, 0x00); // NR22
    self.poke(0xff19, 0xbf); // NR24
    self.poke(0xff1a, 0x7f); // NR30
    self.poke(0xff1b, 0xff); // NR31
    self.poke(0xff1c, 0x9f); // NR32
    self.poke(0xff1e, 0xbf); // NR33
    self.poke(0xff20, 0xff); // NR41
    self.poke(0xff21, 0x00); // NR42
    self.poke(0xff22, 0x00); // NR43
    self.poke(0xff23, 0xbf); // NR30
    self.poke(0xff24, 0x77); // NR50
    self.poke(0xff25, 0xf3); // NR51
    self.poke(0xff26, 0xf1); // NR52
    self.poke(LCDC, 0x91);
    self.poke(SCY, 0x00);
    self.poke(SCX, 0x00);
    self.poke(LYC, 0x00);
    self.poke(BGP, 0xfc);
    self.poke(0xff48, 0xff); // OBP0
    self.poke(0xff49, 0xff); // OBP1
    self.poke(WY, 0x00);
    self.poke(WX, 0x00);
    self.poke(IE, 0x00);
  }

  /// Copy a flat ROM image into the low memory region and return the
  /// cartridge title from the header.
  pub fn load_rom(&mut self, rom: &[u8]) -> Result<String> {
    if rom.len() > MEM_SIZE {
      bail!(
        "ROM image is {} bytes, larger than the 64KB address space",
        rom.len()
      );
    }
    self.bytes[..rom.len()].copy_from_slice(rom);

    let title = self.bytes[TITLE_START..TITLE_END]
      .iter()
      .take_while(|&&b| b != 0)
      .map(|&b| b as char)
      .collect::<String>();
    Ok(title.trim().to_string())
  }

  /// Read a byte at address `addr`.
  pub fn rb(&self, addr: u16) -> u8 {
    self.bytes[addr as usize]
  }

  /// Read a 2-byte little-endian word from `addr`.
  pub fn rw(&self, addr: u16) -> u16 {
    bits::combine(self.rb(addr.wrapping_add(1)), self.rb(addr))
  }

  /// Write `value` at address `addr`, applying the bus policy.
  pub fn wb(&mut self, addr: u16, value: u8) {
    // Serial debug stub: writing 0x81 to SC sends the byte in SB.
    // Compatibility test ROMs report through here.
    if addr == SC && value == 0x81 {
      print!("{}", self.rb(SB) as char);
    }

    match addr {
      // ROM region is read-only to the CPU; banking is not modeled.
      0x0000..=0x7fff => (),
      // WRAM, mirrored into echo RAM.
      0xc000..=0xddff => {
        self.bytes[addr as usize] = value;
        self.bytes[(addr + 0x2000) as usize] = value;
      }
      // Echo RAM, mirrored back into WRAM.
      0xe000..=0xfdff => {
        self.bytes[addr as usize] = value;
        self.bytes[(addr - 0x2000) as usize] = value;
      }
      // Unusable region: the write is dropped either way.
      0xfea0..=0xfeff => match self.policy {
        Policy::Permissive => {
          warn!("write to unusable region: {:#06x} <- {:#04x}", addr, value);
        }
        Policy::Strict => {
          error!("write to unusable region: {:#06x} <- {:#04x}", addr, value);
          self.fault = true;
        }
      },
      // Only the input-select lines of JOYP are CPU-writable; the low
      // bits are driven by the input collaborator.
      JOYP => {
        let joyp = self.bytes[JOYP as usize];
        let joyp = bits::set_bit(joyp, 4, bits::get_bit(value, 4));
        let joyp = bits::set_bit(joyp, 5, bits::get_bit(value, 5));
        self.bytes[JOYP as usize] = joyp;
      }
      // Any write to DIV resets it along with the internal counter.
      DIV => {
        self.bytes[DIV as usize] = 0;
        self.counter = 0;
      }
      // Only the enable bit and clock select of TAC are settable.
      TAC => self.bytes[TAC as usize] = value & 0x7,
      // DMA transfer: copy 160 bytes into OAM, synchronously.
      DMA => {
        self.bytes[DMA as usize] = value;
        let src = u16::from(value) << 8;
        for i in 0..0xa0 {
          self.bytes[(0xfe00 + i) as usize] = self.bytes[(src + i) as usize];
        }
      }
      _ => self.bytes[addr as usize] = value,
    }
  }

  /// Write a 2-byte little-endian word to `addr`.
  pub fn ww(&mut self, addr: u16, value: u16) {
    let (hi, lo) = bits::split(value);
    self.wb(addr, lo);
    self.wb(addr.wrapping_add(1), hi);
  }

  /// Raw write, bypassing the CPU write policy. For collaborators that
  /// own their registers (video writes LY/STAT/IF, the loader fills ROM).
  pub fn poke(&mut self, addr: u16, value: u8) {
    self.bytes[addr as usize] = value;
  }

  /// Raw single-bit write, bypassing the CPU write policy. The input
  /// collaborator drives the low JOYP lines through this.
  pub fn modify_bit(&mut self, addr: u16, pos: u8, on: bool) {
    let value = bits::set_bit(self.bytes[addr as usize], pos, on);
    self.bytes[addr as usize] = value;
  }

  /// True if a strict-policy memory fault has been recorded.
  pub fn fault(&self) -> bool {
    self.fault
  }
}
