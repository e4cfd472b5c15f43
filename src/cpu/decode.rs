//! Instruction tables. The unprefixed and CB-prefixed opcode spaces are
//! each a flat 256-entry array of decoded entries, built once when the
//! CPU is constructed. Regular regions (the LD block, the ALU block, the
//! whole CB space) are filled by loops; irregular opcodes are assigned
//! one by one.

/// One of the eight-bit general registers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum R8 {
  A,
  B,
  C,
  D,
  E,
  H,
  L,
}

/// A register pair (AF only ever appears in PUSH/POP).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum R16 {
  Af,
  Bc,
  De,
  Hl,
  Sp,
}

/// An addressable 8-bit operand: a register, or the byte at (HL).
/// ALU and CB routines are written once against this.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operand {
  Reg(R8),
  HlInd,
}

/// An 8-bit ALU source: an addressable operand or an immediate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Src {
  Op(Operand),
  Imm,
}

/// Branch condition for JP/JR/CALL/RET.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cond {
  Always,
  Nz,
  Z,
  Nc,
  C,
}

/// The eight accumulator ALU operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AluOp {
  Add,
  Adc,
  Sub,
  Sbc,
  And,
  Xor,
  Or,
  Cp,
}

/// A decoded unprefixed instruction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Op {
  Nop,
  Stop,
  Halt,
  Di,
  Ei,

  /// 8-bit load: register/(HL) destination from register/(HL)/immediate.
  Ld(Operand, Src),
  /// A <- (BC) or (DE).
  LdAInd(R16),
  /// (BC) or (DE) <- A.
  LdIndA(R16),
  /// (HL+) <- A and A <- (HL+).
  LdiHlA,
  LdiAHl,
  /// (HL-) <- A and A <- (HL-).
  LddHlA,
  LddAHl,
  /// A <-> (a16).
  LdAAbs,
  LdAbsA,
  /// A <-> (0xFF00 + d8).
  LdAHiImm,
  LdHiImmA,
  /// A <-> (0xFF00 + C).
  LdAHiC,
  LdHiCA,
  /// rr <- d16 (little-endian immediate).
  Ld16Imm(R16),
  /// (a16) <- SP.
  LdAbsSp,
  LdSpHl,
  /// HL <- SP + signed d8.
  LdHlSpOff,

  Push(R16),
  Pop(R16),

  Alu(AluOp, Src),
  Inc(Operand),
  Dec(Operand),
  Inc16(R16),
  Dec16(R16),
  AddHl(R16),
  /// SP <- SP + signed d8.
  AddSpImm,

  // Accumulator rotates and flag ops.
  Rlca,
  Rla,
  Rrca,
  Rra,
  Daa,
  Cpl,
  Scf,
  Ccf,

  Jp(Cond),
  JpHl,
  Jr(Cond),
  Call(Cond),
  Ret(Cond),
  Reti,
  Rst(u16),

  /// The CB prefix byte; dispatched through the second table.
  Prefix,
  /// One of the eleven unassigned opcodes.
  Illegal,
}

/// The CB-prefixed operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CbKind {
  Rlc,
  Rrc,
  Rl,
  Rr,
  Sla,
  Sra,
  Swap,
  Srl,
  Bit(u8),
  Res(u8),
  Set(u8),
}

/// A decoded CB-prefixed instruction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CbOp {
  pub kind: CbKind,
  pub operand: Operand,
}

/// Operand encoding shared by the LD/ALU/CB blocks: the low three bits
/// select B,C,D,E,H,L,(HL),A.
fn operand(code: u8) -> Operand {
  match code & 0x7 {
    0 => Operand::Reg(R8::B),
    1 => Operand::Reg(R8::C),
    2 => Operand::Reg(R8::D),
    3 => Operand::Reg(R8::E),
    4 => Operand::Reg(R8::H),
    5 => Operand::Reg(R8::L),
    6 => Operand::HlInd,
    _ => Operand::Reg(R8::A),
  }
}

/// Build the unprefixed instruction table.
pub fn base_table() -> [Op; 256] {
  use self::Op::*;

  let mut t = [Illegal; 256];

  // 0x00-0x3F: loads, 16-bit arithmetic, rotates, relative jumps.
  t[0x00] = Nop;
  t[0x01] = Ld16Imm(R16::Bc);
  t[0x02] = LdIndA(R16::Bc);
  t[0x03] = Inc16(R16::Bc);
  t[0x04] = Inc(Operand::Reg(R8::B));
  t[0x05] = Dec(Operand::Reg(R8::B));
  t[0x06] = Ld(Operand::Reg(R8::B), Src::Imm);
  t[0x07] = Rlca;
  t[0x08] = LdAbsSp;
  t[0x09] = AddHl(R16::Bc);
  t[0x0a] = LdAInd(R16::Bc);
  t[0x0b] = Dec16(R16::Bc);
  t[0x0c] = Inc(Operand::Reg(R8::C));
  t[0x0d] = Dec(Operand::Reg(R8::C));
  t[0x0e] = Ld(Operand::Reg(R8::C), Src::Imm);
  t[0x0f] = Rrca;

  t[0x10] = Stop;
  t[0x11] = Ld16Imm(R16::De);
  t[0x12] = LdIndA(R16::De);
  t[0x13] = Inc16(R16::De);
  t[0x14] = Inc(Operand::Reg(R8::D));
  t[0x15] = Dec(Operand::Reg(R8::D));
  t[0x16] = Ld(Operand::Reg(R8::D), Src::Imm);
  t[0x17] = Rla;
  t[0x18] = Jr(Cond::Always);
  t[0x19] = AddHl(R16::De);
  t[0x1a] = LdAInd(R16::De);
  t[0x1b] = Dec16(R16::De);
  t[0x1c] = Inc(Operand::Reg(R8::E));
  t[0x1d] = Dec(Operand::Reg(R8::E));
  t[0x1e] = Ld(Operand::Reg(R8::E), Src::Imm);
  t[0x1f] = Rra;

  t[0x20] = Jr(Cond::Nz);
  t[0x21] = Ld16Imm(R16::Hl);
  t[0x22] = LdiHlA;
  t[0x23] = Inc16(R16::Hl);
  t[0x24] = Inc(Operand::Reg(R8::H));
  t[0x25] = Dec(Operand::Reg(R8::H));
  t[0x26] = Ld(Operand::Reg(R8::H), Src::Imm);
  t[0x27] = Daa;
  t[0x28] = Jr(Cond::Z);
  t[0x29] = AddHl(R16::Hl);
  t[0x2a] = LdiAHl;
  t[0x2b] = Dec16(R16::Hl);
  t[0x2c] = Inc(Operand::Reg(R8::L));
  t[0x2d] = Dec(Operand::Reg(R8::L));
  t[0x2e] = Ld(Operand::Reg(R8::L), Src::Imm);
  t[0x2f] = Cpl;

  t[0x30] = Jr(Cond::Nc);
  t[0x31] = Ld16Imm(R16::Sp);
  t[0x32] = LddHlA;
  t[0x33] = Inc16(R16::Sp);
  t[0x34] = Inc(Operand::HlInd);
  t[0x35] = Dec(Operand::HlInd);
  t[0x36] = Ld(Operand::HlInd, Src::Imm);
  t[0x37] = Scf;
  t[0x38] = Jr(Cond::C);
  t[0x39] = AddHl(R16::Sp);
  t[0x3a] = LddAHl;
  t[0x3b] = Dec16(R16::Sp);
  t[0x3c] = Inc(Operand::Reg(R8::A));
  t[0x3d] = Dec(Operand::Reg(R8::A));
  t[0x3e] = Ld(Operand::Reg(R8::A), Src::Imm);
  t[0x3f] = Ccf;

  // 0x40-0x7F: the 8-bit load block, with HALT in the (HL),(HL) slot.
  for code in 0x40..=0x7fu8 {
    let dst = operand(code >> 3);
    let src = operand(code);
    t[code as usize] = if dst == Operand::HlInd && src == Operand::HlInd {
      Halt
    } else {
      Ld(dst, Src::Op(src))
    };
  }

  // 0x80-0xBF: the accumulator ALU block.
  for code in 0x80..=0xbfu8 {
    let kind = match (code >> 3) & 0x7 {
      0 => AluOp::Add,
      1 => AluOp::Adc,
      2 => AluOp::Sub,
      3 => AluOp::Sbc,
      4 => AluOp::And,
      5 => AluOp::Xor,
      6 => AluOp::Or,
      _ => AluOp::Cp,
    };
    t[code as usize] = Alu(kind, Src::Op(operand(code)));
  }

  // 0xC0-0xFF: control flow, stack ops, immediate ALU forms. The gaps
  // (0xD3, 0xDB, ...) stay Illegal.
  t[0xc0] = Ret(Cond::Nz);
  t[0xc1] = Pop(R16::Bc);
  t[0xc2] = Jp(Cond::Nz);
  t[0xc3] = Jp(Cond::Always);
  t[0xc4] = Call(Cond::Nz);
  t[0xc5] = Push(R16::Bc);
  t[0xc6] = Alu(AluOp::Add, Src::Imm);
  t[0xc7] = Rst(0x00);
  t[0xc8] = Ret(Cond::Z);
  t[0xc9] = Ret(Cond::Always);
  t[0xca] = Jp(Cond::Z);
  t[0xcb] = Prefix;
  t[0xcc] = Call(Cond::Z);
  t[0xcd] = Call(Cond::Always);
  t[0xce] = Alu(AluOp::Adc, Src::Imm);
  t[0xcf] = Rst(0x08);

  t[0xd0] = Ret(Cond::Nc);
  t[0xd1] = Pop(R16::De);
  t[0xd2] = Jp(Cond::Nc);
  t[0xd4] = Call(Cond::Nc);
  t[0xd5] = Push(R16::De);
  t[0xd6] = Alu(AluOp::Sub, Src::Imm);
  t[0xd7] = Rst(0x10);
  t[0xd8] = Ret(Cond::C);
  t[0xd9] = Reti;
  t[0xda] = Jp(Cond::C);
  t[0xdc] = Call(Cond::C);
  t[0xde] = Alu(AluOp::Sbc, Src::Imm);
  t[0xdf] = Rst(0x18);

  t[0xe0] = LdHiImmA;
  t[0xe1] = Pop(R16::Hl);
  t[0xe2] = LdHiCA;
  t[0xe5] = Push(R16::Hl);
  t[0xe6] = Alu(AluOp::And, Src::Imm);
  t[0xe7] = Rst(0x20);
  t[0xe8] = AddSpImm;
  t[0xe9] = JpHl;
  t[0xea] = LdAbsA;
  t[0xee] = Alu(AluOp::Xor, Src::Imm);
  t[0xef] = Rst(0x28);

  t[0xf0] = LdAHiImm;
  t[0xf1] = Pop(R16::Af);
  t[0xf2] = LdAHiC;
  t[0xf3] = Di;
  t[0xf5] = Push(R16::Af);
  t[0xf6] = Alu(AluOp::Or, Src::Imm);
  t[0xf7] = Rst(0x30);
  t[0xf8] = LdHlSpOff;
  t[0xf9] = LdSpHl;
  t[0xfa] = LdAAbs;
  t[0xfb] = Ei;
  t[0xfe] = Alu(AluOp::Cp, Src::Imm);
  t[0xff] = Rst(0x38);

  t
}

/// Build the CB-prefixed table. The whole space is regular: the high
/// five bits select the operation (and bit index), the low three the
/// operand.
pub fn cb_table() -> [CbOp; 256] {
  let mut t = [CbOp {
    kind: CbKind::Rlc,
    operand: Operand::Reg(R8::B),
  }; 256];

  for code in 0..=255u8 {
    let bit = (code >> 3) & 0x7;
    let kind = match code >> 3 {
      0 => CbKind::Rlc,
      1 => CbKind::Rrc,
      2 => CbKind::Rl,
      3 => CbKind::Rr,
      4 => CbKind::Sla,
      5 => CbKind::Sra,
      6 => CbKind::Swap,
      7 => CbKind::Srl,
      8..=15 => CbKind::Bit(bit),
      16..=23 => CbKind::Res(bit),
      _ => CbKind::Set(bit),
    };
    t[code as usize] = CbOp {
      kind,
      operand: operand(code),
    };
  }

  t
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn base_table_spot_checks() {
    let t = base_table();
    assert_eq!(t[0x00], Op::Nop);
    assert_eq!(t[0x41], Op::Ld(Operand::Reg(R8::B), Src::Op(Operand::Reg(R8::C))));
    assert_eq!(t[0x76], Op::Halt);
    assert_eq!(t[0x7e], Op::Ld(Operand::Reg(R8::A), Src::Op(Operand::HlInd)));
    assert_eq!(t[0x86], Op::Alu(AluOp::Add, Src::Op(Operand::HlInd)));
    assert_eq!(t[0xaf], Op::Alu(AluOp::Xor, Src::Op(Operand::Reg(R8::A))));
    assert_eq!(t[0xc3], Op::Jp(Cond::Always));
    assert_eq!(t[0xcb], Op::Prefix);
    assert_eq!(t[0xff], Op::Rst(0x38));
  }

  #[test]
  fn illegal_opcodes() {
    let t = base_table();
    for &code in &[0xd3, 0xdb, 0xdd, 0xe3, 0xe4, 0xeb, 0xec, 0xed, 0xf4, 0xfc, 0xfd] {
      assert_eq!(t[code as usize], Op::Illegal, "opcode {:#04x}", code);
    }
    let illegal = t.iter().filter(|&&op| op == Op::Illegal).count();
    assert_eq!(illegal, 11);
  }

  #[test]
  fn cb_table_spot_checks() {
    let t = cb_table();
    assert_eq!(t[0x00].kind, CbKind::Rlc);
    assert_eq!(t[0x00].operand, Operand::Reg(R8::B));
    assert_eq!(t[0x37].kind, CbKind::Swap);
    assert_eq!(t[0x37].operand, Operand::Reg(R8::A));
    assert_eq!(t[0x3e].kind, CbKind::Srl);
    assert_eq!(t[0x3e].operand, Operand::HlInd);
    assert_eq!(t[0x7e].kind, CbKind::Bit(7));
    assert_eq!(t[0x87].kind, CbKind::Res(0));
    assert_eq!(t[0xff].kind, CbKind::Set(7));
    assert_eq!(t[0xff].operand, Operand::Reg(R8::A));
  }
}
