//! Instruction execution: fetch, table lookup, and one match arm per
//! decoded operation. Returns the instruction's machine-cycle count;
//! conditional control flow reports the taken or not-taken cost.

use log::{debug, error, warn};

use crate::bits;
use crate::cpu::decode::{AluOp, CbKind, CbOp, Cond, Op, Operand, Src, R16, R8};
use crate::cpu::CPU;
use crate::gameboy::Policy;
use crate::mem::Memory;

impl CPU {
  /// Fetch, decode and execute one instruction at PC.
  pub fn exec(&mut self, mem: &mut Memory) -> u32 {
    let code = self.fetch(mem);
    let op = self.base[code as usize];
    if op == Op::Prefix {
      let cb = self.cb[self.fetch(mem) as usize];
      self.exec_cb(cb, mem)
    } else {
      self.exec_op(op, code, mem)
    }
  }

  fn fetch(&mut self, mem: &Memory) -> u8 {
    let code = mem.rb(self.regs.pc);
    self.regs.pc = self.regs.pc.wrapping_add(1);
    code
  }

  fn imm16(&mut self, mem: &Memory) -> u16 {
    let lo = self.fetch(mem);
    let hi = self.fetch(mem);
    bits::combine(hi, lo)
  }

  fn read_r8(&self, r: R8) -> u8 {
    match r {
      R8::A => self.regs.a,
      R8::B => self.regs.b,
      R8::C => self.regs.c,
      R8::D => self.regs.d,
      R8::E => self.regs.e,
      R8::H => self.regs.h,
      R8::L => self.regs.l,
    }
  }

  fn write_r8(&mut self, r: R8, value: u8) {
    match r {
      R8::A => self.regs.a = value,
      R8::B => self.regs.b = value,
      R8::C => self.regs.c = value,
      R8::D => self.regs.d = value,
      R8::E => self.regs.e = value,
      R8::H => self.regs.h = value,
      R8::L => self.regs.l = value,
    }
  }

  fn read_operand(&self, operand: Operand, mem: &Memory) -> u8 {
    match operand {
      Operand::Reg(r) => self.read_r8(r),
      Operand::HlInd => mem.rb(self.regs.hl()),
    }
  }

  fn write_operand(&mut self, operand: Operand, mem: &mut Memory, value: u8) {
    match operand {
      Operand::Reg(r) => self.write_r8(r, value),
      Operand::HlInd => mem.wb(self.regs.hl(), value),
    }
  }

  fn read_src(&mut self, src: Src, mem: &Memory) -> u8 {
    match src {
      Src::Op(operand) => self.read_operand(operand, mem),
      Src::Imm => self.fetch(mem),
    }
  }

  fn read_r16(&self, r: R16) -> u16 {
    match r {
      R16::Af => self.regs.af(),
      R16::Bc => self.regs.bc(),
      R16::De => self.regs.de(),
      R16::Hl => self.regs.hl(),
      R16::Sp => self.regs.sp,
    }
  }

  fn write_r16(&mut self, r: R16, value: u16) {
    match r {
      R16::Af => {
        let (hi, lo) = bits::split(value);
        self.regs.a = hi;
        self.regs.set_f(lo);
      }
      R16::Bc => self.regs.set_bc(value),
      R16::De => self.regs.set_de(value),
      R16::Hl => self.regs.set_hl(value),
      R16::Sp => self.regs.sp = value,
    }
  }

  fn cond(&self, cond: Cond) -> bool {
    match cond {
      Cond::Always => true,
      Cond::Nz => !self.regs.zf,
      Cond::Z => self.regs.zf,
      Cond::Nc => !self.regs.cf,
      Cond::C => self.regs.cf,
    }
  }

  /// Push a word: high byte first, so it sits at the higher address.
  pub fn push_word(&mut self, mem: &mut Memory, value: u16) {
    let (hi, lo) = bits::split(value);
    self.regs.sp = self.regs.sp.wrapping_sub(1);
    mem.wb(self.regs.sp, hi);
    self.regs.sp = self.regs.sp.wrapping_sub(1);
    mem.wb(self.regs.sp, lo);
  }

  pub fn pop_word(&mut self, mem: &Memory) -> u16 {
    let value = mem.rw(self.regs.sp);
    self.regs.sp = self.regs.sp.wrapping_add(2);
    value
  }

  fn exec_op(&mut self, op: Op, code: u8, mem: &mut Memory) -> u32 {
    match op {
      Op::Nop => 1,
      Op::Stop => {
        // Low-power mode is not modeled; skip the pad byte.
        debug!("STOP at {:#06x}", self.regs.pc.wrapping_sub(1));
        self.fetch(mem);
        1
      }
      Op::Halt => {
        // Park on the opcode until an interrupt becomes pending.
        self.halted = true;
        self.regs.pc = self.regs.pc.wrapping_sub(1);
        1
      }
      Op::Di => {
        self.ime = false;
        self.ime_delay = None;
        1
      }
      Op::Ei => {
        // Takes effect after the following instruction.
        self.ime_delay = Some(1);
        1
      }

      Op::Ld(dst, src) => {
        let value = self.read_src(src, mem);
        self.write_operand(dst, mem, value);
        match (dst, src) {
          (Operand::HlInd, Src::Imm) => 3,
          (Operand::HlInd, _) | (_, Src::Op(Operand::HlInd)) | (_, Src::Imm) => 2,
          _ => 1,
        }
      }
      Op::LdAInd(r) => {
        self.regs.a = mem.rb(self.read_r16(r));
        2
      }
      Op::LdIndA(r) => {
        mem.wb(self.read_r16(r), self.regs.a);
        2
      }
      Op::LdiHlA => {
        mem.wb(self.regs.hl(), self.regs.a);
        self.regs.hl_inc();
        2
      }
      Op::LdiAHl => {
        self.regs.a = mem.rb(self.regs.hl());
        self.regs.hl_inc();
        2
      }
      Op::LddHlA => {
        mem.wb(self.regs.hl(), self.regs.a);
        self.regs.hl_dec();
        2
      }
      Op::LddAHl => {
        self.regs.a = mem.rb(self.regs.hl());
        self.regs.hl_dec();
        2
      }
      Op::LdAAbs => {
        let addr = self.imm16(mem);
        self.regs.a = mem.rb(addr);
        4
      }
      Op::LdAbsA => {
        let addr = self.imm16(mem);
        mem.wb(addr, self.regs.a);
        4
      }
      Op::LdAHiImm => {
        let addr = 0xff00 + u16::from(self.fetch(mem));
        self.regs.a = mem.rb(addr);
        3
      }
      Op::LdHiImmA => {
        let addr = 0xff00 + u16::from(self.fetch(mem));
        mem.wb(addr, self.regs.a);
        3
      }
      Op::LdAHiC => {
        self.regs.a = mem.rb(0xff00 + u16::from(self.regs.c));
        2
      }
      Op::LdHiCA => {
        mem.wb(0xff00 + u16::from(self.regs.c), self.regs.a);
        2
      }
      Op::Ld16Imm(r) => {
        let value = self.imm16(mem);
        self.write_r16(r, value);
        3
      }
      Op::LdAbsSp => {
        let addr = self.imm16(mem);
        mem.ww(addr, self.regs.sp);
        5
      }
      Op::LdSpHl => {
        self.regs.sp = self.regs.hl();
        2
      }
      Op::LdHlSpOff => {
        let offset = self.fetch(mem) as i8;
        let value = self.add_sp_offset(offset);
        self.regs.set_hl(value);
        3
      }

      Op::Push(r) => {
        let value = self.read_r16(r);
        self.push_word(mem, value);
        4
      }
      Op::Pop(r) => {
        let value = self.pop_word(mem);
        self.write_r16(r, value);
        3
      }

      Op::Alu(kind, src) => {
        let n = self.read_src(src, mem);
        match kind {
          AluOp::Add => self.add_a(n, false),
          AluOp::Adc => self.add_a(n, true),
          AluOp::Sub => self.sub_a(n, false),
          AluOp::Sbc => self.sub_a(n, true),
          AluOp::And => self.and_a(n),
          AluOp::Xor => self.xor_a(n),
          AluOp::Or => self.or_a(n),
          AluOp::Cp => self.cp_a(n),
        }
        match src {
          Src::Op(Operand::Reg(_)) => 1,
          _ => 2,
        }
      }
      Op::Inc(operand) => {
        let value = self.read_operand(operand, mem);
        let value = self.inc8(value);
        self.write_operand(operand, mem, value);
        if operand == Operand::HlInd {
          3
        } else {
          1
        }
      }
      Op::Dec(operand) => {
        let value = self.read_operand(operand, mem);
        let value = self.dec8(value);
        self.write_operand(operand, mem, value);
        if operand == Operand::HlInd {
          3
        } else {
          1
        }
      }
      Op::Inc16(r) => {
        let value = self.read_r16(r).wrapping_add(1);
        self.write_r16(r, value);
        2
      }
      Op::Dec16(r) => {
        let value = self.read_r16(r).wrapping_sub(1);
        self.write_r16(r, value);
        2
      }
      Op::AddHl(r) => {
        let n = self.read_r16(r);
        self.add_hl(n);
        2
      }
      Op::AddSpImm => {
        let offset = self.fetch(mem) as i8;
        self.regs.sp = self.add_sp_offset(offset);
        4
      }

      Op::Rlca => {
        let a = self.regs.a;
        self.regs.a = self.rot_left(a, false);
        1
      }
      Op::Rla => {
        let a = self.regs.a;
        self.regs.a = self.rot_left(a, true);
        1
      }
      Op::Rrca => {
        let a = self.regs.a;
        self.regs.a = self.rot_right(a, false);
        1
      }
      Op::Rra => {
        let a = self.regs.a;
        self.regs.a = self.rot_right(a, true);
        1
      }
      Op::Daa => {
        self.daa();
        1
      }
      Op::Cpl => {
        self.cpl();
        1
      }
      Op::Scf => {
        self.scf();
        1
      }
      Op::Ccf => {
        self.ccf();
        1
      }

      Op::Jp(cond) => {
        let target = self.imm16(mem);
        if self.cond(cond) {
          self.regs.pc = target;
          4
        } else {
          3
        }
      }
      Op::JpHl => {
        self.regs.pc = self.regs.hl();
        1
      }
      Op::Jr(cond) => {
        let offset = self.fetch(mem) as i8;
        if self.cond(cond) {
          self.regs.pc = self.regs.pc.wrapping_add(offset as i16 as u16);
          3
        } else {
          2
        }
      }
      Op::Call(cond) => {
        let target = self.imm16(mem);
        if self.cond(cond) {
          let ret = self.regs.pc;
          self.push_word(mem, ret);
          self.regs.pc = target;
          6
        } else {
          3
        }
      }
      Op::Ret(cond) => {
        if self.cond(cond) {
          self.regs.pc = self.pop_word(mem);
          if cond == Cond::Always {
            4
          } else {
            5
          }
        } else {
          2
        }
      }
      Op::Reti => {
        // Unlike EI, interrupts come back on immediately.
        self.regs.pc = self.pop_word(mem);
        self.ime = true;
        self.ime_delay = None;
        4
      }
      Op::Rst(vector) => {
        let ret = self.regs.pc;
        self.push_word(mem, ret);
        self.regs.pc = vector;
        4
      }

      Op::Prefix => unreachable!("prefix byte dispatched before exec_op"),
      Op::Illegal => {
        match self.policy {
          Policy::Permissive => {
            warn!(
              "illegal opcode {:#04x} at {:#06x}, treating as NOP",
              code,
              self.regs.pc.wrapping_sub(1)
            );
          }
          Policy::Strict => {
            error!(
              "illegal opcode {:#04x} at {:#06x}, halting execution",
              code,
              self.regs.pc.wrapping_sub(1)
            );
            self.regs.pc = self.regs.pc.wrapping_sub(1);
            self.hung = true;
          }
        }
        1
      }
    }
  }

  fn exec_cb(&mut self, cb: CbOp, mem: &mut Memory) -> u32 {
    let value = self.read_operand(cb.operand, mem);
    let written = match cb.kind {
      CbKind::Rlc => Some(self.rot_left(value, false)),
      CbKind::Rrc => Some(self.rot_right(value, false)),
      CbKind::Rl => Some(self.rot_left(value, true)),
      CbKind::Rr => Some(self.rot_right(value, true)),
      CbKind::Sla => Some(self.shift_left(value)),
      CbKind::Sra => Some(self.shift_right_arith(value)),
      CbKind::Swap => Some(self.swap(value)),
      CbKind::Srl => Some(self.shift_right_logic(value)),
      CbKind::Bit(pos) => {
        self.bit_test(pos, value);
        None
      }
      CbKind::Res(pos) => Some(bits::set_bit(value, pos, false)),
      CbKind::Set(pos) => Some(bits::set_bit(value, pos, true)),
    };
    if let Some(result) = written {
      self.write_operand(cb.operand, mem, result);
    }

    match (cb.operand, cb.kind) {
      (Operand::Reg(_), _) => 2,
      (Operand::HlInd, CbKind::Bit(_)) => 3,
      (Operand::HlInd, _) => 4,
    }
  }
}
