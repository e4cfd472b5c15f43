//! Per-opcode behavior tests. Each test assembles a few bytes into WRAM,
//! points PC at them, runs single steps, and checks registers, memory
//! and cycle counts.

use crate::gameboy::{GameBoy, Policy};

const BASE: u16 = 0xc000;

/// A machine with `code` placed in WRAM and PC pointing at it.
fn init(code: &[u8]) -> GameBoy {
  let mut gb = GameBoy::new_with_policy(Policy::Permissive);
  for (i, &b) in code.iter().enumerate() {
    gb.mem.poke(BASE + i as u16, b);
  }
  gb.cpu.regs.pc = BASE;
  gb
}

macro_rules! exec_test {
  ($name:ident, $code:expr, $setup:expr, $check:expr) => {
    #[test]
    fn $name() {
      let mut gb = init($code);
      let setup: fn(&mut GameBoy) = $setup;
      setup(&mut gb);
      let cycles = gb.step();
      let check: fn(&GameBoy, u32) = $check;
      check(&gb, cycles);
    }
  };
}

exec_test!(nop, &[0x00], |_| (), |gb, cycles| {
  assert_eq!(gb.cpu.regs.pc, BASE + 1);
  assert_eq!(cycles, 1);
});

// The 16-bit immediate is little-endian: low byte first.
exec_test!(ld_bc_d16, &[0x01, 0x34, 0x12], |_| (), |gb, cycles| {
  assert_eq!(gb.cpu.regs.b, 0x12);
  assert_eq!(gb.cpu.regs.c, 0x34);
  assert_eq!(gb.cpu.regs.pc, BASE + 3);
  assert_eq!(cycles, 3);
});

exec_test!(
  ld_b_c,
  &[0x41],
  |gb| gb.cpu.regs.c = 0x99,
  |gb, cycles| {
    assert_eq!(gb.cpu.regs.b, 0x99);
    assert_eq!(cycles, 1);
  }
);

exec_test!(
  ld_a_hl_ind,
  &[0x7e],
  |gb| {
    gb.cpu.regs.set_hl(0xd000);
    gb.mem.poke(0xd000, 0x5a);
  },
  |gb, cycles| {
    assert_eq!(gb.cpu.regs.a, 0x5a);
    assert_eq!(cycles, 2);
  }
);

exec_test!(
  ld_hl_ind_d8,
  &[0x36, 0x77],
  |gb| gb.cpu.regs.set_hl(0xd000),
  |gb, cycles| {
    assert_eq!(gb.mem.rb(0xd000), 0x77);
    assert_eq!(cycles, 3);
  }
);

exec_test!(
  ldi_a_from_hl,
  &[0x2a],
  |gb| {
    gb.cpu.regs.set_hl(0xd000);
    gb.mem.poke(0xd000, 0x42);
  },
  |gb, _| {
    assert_eq!(gb.cpu.regs.a, 0x42);
    assert_eq!(gb.cpu.regs.hl(), 0xd001);
  }
);

exec_test!(
  ldd_hl_from_a,
  &[0x32],
  |gb| {
    gb.cpu.regs.set_hl(0xd000);
    gb.cpu.regs.a = 0x42;
  },
  |gb, _| {
    assert_eq!(gb.mem.rb(0xd000), 0x42);
    assert_eq!(gb.cpu.regs.hl(), 0xcfff);
  }
);

exec_test!(
  ldh_write,
  &[0xe0, 0x80],
  |gb| gb.cpu.regs.a = 0x42,
  |gb, cycles| {
    assert_eq!(gb.mem.rb(0xff80), 0x42);
    assert_eq!(cycles, 3);
  }
);

exec_test!(
  ld_a16_sp,
  &[0x08, 0x00, 0xd0],
  |gb| gb.cpu.regs.sp = 0x1234,
  |gb, cycles| {
    assert_eq!(gb.mem.rb(0xd000), 0x34);
    assert_eq!(gb.mem.rb(0xd001), 0x12);
    assert_eq!(cycles, 5);
  }
);

exec_test!(
  inc_hl_ind,
  &[0x34],
  |gb| {
    gb.cpu.regs.set_hl(0xd000);
    gb.mem.poke(0xd000, 0x0f);
  },
  |gb, cycles| {
    assert_eq!(gb.mem.rb(0xd000), 0x10);
    assert!(gb.cpu.regs.hf);
    assert_eq!(cycles, 3);
  }
);

exec_test!(
  jr_negative_offset,
  &[0x18, 0xfe],
  |_| (),
  |gb, cycles| {
    // -2 lands back on the JR itself.
    assert_eq!(gb.cpu.regs.pc, BASE);
    assert_eq!(cycles, 3);
  }
);

exec_test!(
  jr_not_taken,
  &[0x20, 0x10],
  |gb| gb.cpu.regs.zf = true,
  |gb, cycles| {
    assert_eq!(gb.cpu.regs.pc, BASE + 2);
    assert_eq!(cycles, 2);
  }
);

exec_test!(
  jp_hl,
  &[0xe9],
  |gb| gb.cpu.regs.set_hl(0x1234),
  |gb, cycles| {
    assert_eq!(gb.cpu.regs.pc, 0x1234);
    assert_eq!(cycles, 1);
  }
);

exec_test!(
  rst_pushes_return_address,
  &[0xef],
  |gb| gb.cpu.regs.sp = 0xd100,
  |gb, cycles| {
    assert_eq!(gb.cpu.regs.pc, 0x28);
    assert_eq!(gb.cpu.regs.sp, 0xd0fe);
    // Return address is the byte after the RST.
    assert_eq!(gb.mem.rw(0xd0fe), BASE + 1);
    assert_eq!(cycles, 4);
  }
);

exec_test!(
  cb_set_on_hl_ind,
  &[0xcb, 0xfe],
  |gb| {
    gb.cpu.regs.set_hl(0xd000);
    gb.mem.poke(0xd000, 0x00);
  },
  |gb, cycles| {
    assert_eq!(gb.mem.rb(0xd000), 0x80);
    assert_eq!(cycles, 4);
  }
);

exec_test!(
  cb_bit_on_hl_ind,
  &[0xcb, 0x7e],
  |gb| {
    gb.cpu.regs.set_hl(0xd000);
    gb.mem.poke(0xd000, 0x80);
  },
  |gb, cycles| {
    assert!(!gb.cpu.regs.zf);
    assert!(gb.cpu.regs.hf);
    assert_eq!(cycles, 3);
  }
);

exec_test!(
  cb_swap_register,
  &[0xcb, 0x37],
  |gb| gb.cpu.regs.a = 0xf1,
  |gb, cycles| {
    assert_eq!(gb.cpu.regs.a, 0x1f);
    assert_eq!(cycles, 2);
  }
);

exec_test!(
  add_sp_imm,
  &[0xe8, 0xfe],
  |gb| gb.cpu.regs.sp = 0xd000,
  |gb, cycles| {
    assert_eq!(gb.cpu.regs.sp, 0xcffe);
    assert_eq!(cycles, 4);
  }
);

exec_test!(
  ld_hl_sp_offset,
  &[0xf8, 0x02],
  |gb| gb.cpu.regs.sp = 0xd0ff,
  |gb, cycles| {
    assert_eq!(gb.cpu.regs.hl(), 0xd101);
    assert!(gb.cpu.regs.hf);
    assert!(gb.cpu.regs.cf);
    assert!(!gb.cpu.regs.zf);
    assert_eq!(cycles, 3);
  }
);

#[test]
fn push_pop_round_trip() {
  // PUSH DE; POP BC.
  let mut gb = init(&[0xd5, 0xc1]);
  gb.cpu.regs.sp = 0xd100;
  gb.cpu.regs.set_de(0xbeef);
  let cycles = gb.step();
  assert_eq!(cycles, 4);
  assert_eq!(gb.cpu.regs.sp, 0xd0fe);
  assert_eq!(gb.mem.rb(0xd0ff), 0xbe);
  assert_eq!(gb.mem.rb(0xd0fe), 0xef);
  let cycles = gb.step();
  assert_eq!(cycles, 3);
  assert_eq!(gb.cpu.regs.bc(), 0xbeef);
  assert_eq!(gb.cpu.regs.sp, 0xd100);
}

#[test]
fn pop_af_discards_flag_low_nibble() {
  // PUSH BC; POP AF.
  let mut gb = init(&[0xc5, 0xf1]);
  gb.cpu.regs.sp = 0xd100;
  gb.cpu.regs.set_bc(0x12ff);
  gb.step();
  gb.step();
  assert_eq!(gb.cpu.regs.a, 0x12);
  assert_eq!(gb.cpu.regs.f, 0xf0);
  assert!(gb.cpu.regs.zf && gb.cpu.regs.nf && gb.cpu.regs.hf && gb.cpu.regs.cf);
}

#[test]
fn call_and_ret() {
  // CALL 0xD050 ... at 0xD050: RET.
  let mut gb = init(&[0xcd, 0x50, 0xd0]);
  gb.mem.poke(0xd050, 0xc9);
  gb.cpu.regs.sp = 0xd100;

  let cycles = gb.step();
  assert_eq!(cycles, 6);
  assert_eq!(gb.cpu.regs.pc, 0xd050);
  assert_eq!(gb.mem.rw(0xd0fe), BASE + 3);

  let cycles = gb.step();
  assert_eq!(cycles, 4);
  assert_eq!(gb.cpu.regs.pc, BASE + 3);
  assert_eq!(gb.cpu.regs.sp, 0xd100);
}

#[test]
fn conditional_call_not_taken() {
  // CALL NZ with Z set: three bytes consumed, nothing pushed.
  let mut gb = init(&[0xc4, 0x50, 0xd0]);
  gb.cpu.regs.sp = 0xd100;
  gb.cpu.regs.zf = true;
  let cycles = gb.step();
  assert_eq!(cycles, 3);
  assert_eq!(gb.cpu.regs.pc, BASE + 3);
  assert_eq!(gb.cpu.regs.sp, 0xd100);
}

#[test]
fn conditional_ret_cycle_counts() {
  // RET C taken costs more than RET's unconditional form.
  let mut gb = init(&[0xd8]);
  gb.cpu.regs.sp = 0xd0fe;
  gb.mem.poke(0xd0fe, 0x34);
  gb.mem.poke(0xd0ff, 0x12);
  gb.cpu.regs.cf = true;
  let cycles = gb.step();
  assert_eq!(cycles, 5);
  assert_eq!(gb.cpu.regs.pc, 0x1234);

  let mut gb = init(&[0xd8]);
  gb.cpu.regs.cf = false;
  let cycles = gb.step();
  assert_eq!(cycles, 2);
  assert_eq!(gb.cpu.regs.pc, BASE + 1);
}

#[test]
fn alu_block_against_registers() {
  // SUB B; then CP (HL) leaving A untouched.
  let mut gb = init(&[0x90, 0xbe]);
  gb.cpu.regs.a = 0x10;
  gb.cpu.regs.b = 0x01;
  gb.cpu.regs.set_hl(0xd000);
  gb.mem.poke(0xd000, 0x0f);

  let cycles = gb.step();
  assert_eq!(cycles, 1);
  assert_eq!(gb.cpu.regs.a, 0x0f);
  assert!(gb.cpu.regs.nf && gb.cpu.regs.hf);

  let cycles = gb.step();
  assert_eq!(cycles, 2);
  assert_eq!(gb.cpu.regs.a, 0x0f);
  assert!(gb.cpu.regs.zf);
}

#[test]
fn f_register_mirrors_flags_after_step() {
  // ADD A,0xFF sets Z/H/C; F reads 0xB0 after the step.
  let mut gb = init(&[0xc6, 0xff]);
  gb.cpu.regs.a = 0x01;
  gb.step();
  assert_eq!(gb.cpu.regs.f, 0xb0);
}

#[test]
fn stop_consumes_pad_byte() {
  let mut gb = init(&[0x10, 0x00, 0x3e, 0x07]);
  gb.step();
  assert_eq!(gb.cpu.regs.pc, BASE + 2);
  gb.step();
  assert_eq!(gb.cpu.regs.a, 0x07);
}
