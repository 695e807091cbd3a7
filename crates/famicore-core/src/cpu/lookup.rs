//! Static opcode dispatch table.
//!
//! Every opcode maps to `(mnemonic, addressing, cycle class)`. The cycle
//! class carries the nominal cycle count and whether the instruction pays
//! an extra cycle on page cross (`Cross`) or on a taken branch (`Branch`).
//! Undocumented slots decode as `Nop` with the undocumented instruction's
//! addressing mode and cycle count so size and timing stay correct; the
//! JAM slots become 2-cycle implied no-ops.

use crate::cpu::addressing::Addressing as A;
use crate::cpu::mnemonic::Mnemonic as M;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Cycle {
    /// Fixed cycle count.
    Normal(u8),
    /// Base count; +1 when the indexed access crosses a page.
    Cross(u8),
    /// Base count; +1 when taken, +2 when taken across a page.
    Branch(u8),
}

impl Cycle {
    pub(crate) const fn base(self) -> u8 {
        match self {
            Cycle::Normal(n) | Cycle::Cross(n) | Cycle::Branch(n) => n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Instruction {
    pub(crate) mnemonic: M,
    pub(crate) addressing: A,
    pub(crate) cycle: Cycle,
}

impl Instruction {
    /// Cycles after the opcode fetch, at maximum length (optional page-cross
    /// fix-ups included; the skip logic trims them at run time).
    pub(crate) const fn len(&self) -> u8 {
        match self.cycle {
            Cycle::Normal(n) => n - 1,
            Cycle::Cross(n) => n,
            Cycle::Branch(_) => 3,
        }
    }
}

const fn n(mnemonic: M, addressing: A, cycles: u8) -> Instruction {
    Instruction {
        mnemonic,
        addressing,
        cycle: Cycle::Normal(cycles),
    }
}

const fn c(mnemonic: M, addressing: A, cycles: u8) -> Instruction {
    Instruction {
        mnemonic,
        addressing,
        cycle: Cycle::Cross(cycles),
    }
}

const fn b(mnemonic: M) -> Instruction {
    Instruction {
        mnemonic,
        addressing: A::Relative,
        cycle: Cycle::Branch(2),
    }
}

#[rustfmt::skip]
pub(crate) static LOOKUP_TABLE: [Instruction; 256] = [
    // 0x00
    n(M::Brk, A::Implied, 7),   n(M::Ora, A::IndirectX, 6), n(M::Nop, A::Implied, 2),   n(M::Nop, A::IndirectX, 8),
    n(M::Nop, A::ZeroPage, 3),  n(M::Ora, A::ZeroPage, 3),  n(M::Asl, A::ZeroPage, 5),  n(M::Nop, A::ZeroPage, 5),
    n(M::Php, A::Implied, 3),   n(M::Ora, A::Immediate, 2), n(M::Asl, A::Accumulator, 2), n(M::Nop, A::Immediate, 2),
    n(M::Nop, A::Absolute, 4),  n(M::Ora, A::Absolute, 4),  n(M::Asl, A::Absolute, 6),  n(M::Nop, A::Absolute, 6),
    // 0x10
    b(M::Bpl),                  c(M::Ora, A::IndirectY, 5), n(M::Nop, A::Implied, 2),   n(M::Nop, A::IndirectY, 8),
    n(M::Nop, A::ZeroPageX, 4), n(M::Ora, A::ZeroPageX, 4), n(M::Asl, A::ZeroPageX, 6), n(M::Nop, A::ZeroPageX, 6),
    n(M::Clc, A::Implied, 2),   c(M::Ora, A::AbsoluteY, 4), n(M::Nop, A::Implied, 2),   n(M::Nop, A::AbsoluteY, 7),
    c(M::Nop, A::AbsoluteX, 4), c(M::Ora, A::AbsoluteX, 4), n(M::Asl, A::AbsoluteX, 7), n(M::Nop, A::AbsoluteX, 7),
    // 0x20
    n(M::Jsr, A::Absolute, 6),  n(M::And, A::IndirectX, 6), n(M::Nop, A::Implied, 2),   n(M::Nop, A::IndirectX, 8),
    n(M::Bit, A::ZeroPage, 3),  n(M::And, A::ZeroPage, 3),  n(M::Rol, A::ZeroPage, 5),  n(M::Nop, A::ZeroPage, 5),
    n(M::Plp, A::Implied, 4),   n(M::And, A::Immediate, 2), n(M::Rol, A::Accumulator, 2), n(M::Nop, A::Immediate, 2),
    n(M::Bit, A::Absolute, 4),  n(M::And, A::Absolute, 4),  n(M::Rol, A::Absolute, 6),  n(M::Nop, A::Absolute, 6),
    // 0x30
    b(M::Bmi),                  c(M::And, A::IndirectY, 5), n(M::Nop, A::Implied, 2),   n(M::Nop, A::IndirectY, 8),
    n(M::Nop, A::ZeroPageX, 4), n(M::And, A::ZeroPageX, 4), n(M::Rol, A::ZeroPageX, 6), n(M::Nop, A::ZeroPageX, 6),
    n(M::Sec, A::Implied, 2),   c(M::And, A::AbsoluteY, 4), n(M::Nop, A::Implied, 2),   n(M::Nop, A::AbsoluteY, 7),
    c(M::Nop, A::AbsoluteX, 4), c(M::And, A::AbsoluteX, 4), n(M::Rol, A::AbsoluteX, 7), n(M::Nop, A::AbsoluteX, 7),
    // 0x40
    n(M::Rti, A::Implied, 6),   n(M::Eor, A::IndirectX, 6), n(M::Nop, A::Implied, 2),   n(M::Nop, A::IndirectX, 8),
    n(M::Nop, A::ZeroPage, 3),  n(M::Eor, A::ZeroPage, 3),  n(M::Lsr, A::ZeroPage, 5),  n(M::Nop, A::ZeroPage, 5),
    n(M::Pha, A::Implied, 3),   n(M::Eor, A::Immediate, 2), n(M::Lsr, A::Accumulator, 2), n(M::Nop, A::Immediate, 2),
    n(M::Jmp, A::Absolute, 3),  n(M::Eor, A::Absolute, 4),  n(M::Lsr, A::Absolute, 6),  n(M::Nop, A::Absolute, 6),
    // 0x50
    b(M::Bvc),                  c(M::Eor, A::IndirectY, 5), n(M::Nop, A::Implied, 2),   n(M::Nop, A::IndirectY, 8),
    n(M::Nop, A::ZeroPageX, 4), n(M::Eor, A::ZeroPageX, 4), n(M::Lsr, A::ZeroPageX, 6), n(M::Nop, A::ZeroPageX, 6),
    n(M::Cli, A::Implied, 2),   c(M::Eor, A::AbsoluteY, 4), n(M::Nop, A::Implied, 2),   n(M::Nop, A::AbsoluteY, 7),
    c(M::Nop, A::AbsoluteX, 4), c(M::Eor, A::AbsoluteX, 4), n(M::Lsr, A::AbsoluteX, 7), n(M::Nop, A::AbsoluteX, 7),
    // 0x60
    n(M::Rts, A::Implied, 6),   n(M::Adc, A::IndirectX, 6), n(M::Nop, A::Implied, 2),   n(M::Nop, A::IndirectX, 8),
    n(M::Nop, A::ZeroPage, 3),  n(M::Adc, A::ZeroPage, 3),  n(M::Ror, A::ZeroPage, 5),  n(M::Nop, A::ZeroPage, 5),
    n(M::Pla, A::Implied, 4),   n(M::Adc, A::Immediate, 2), n(M::Ror, A::Accumulator, 2), n(M::Nop, A::Immediate, 2),
    n(M::Jmp, A::Indirect, 5),  n(M::Adc, A::Absolute, 4),  n(M::Ror, A::Absolute, 6),  n(M::Nop, A::Absolute, 6),
    // 0x70
    b(M::Bvs),                  c(M::Adc, A::IndirectY, 5), n(M::Nop, A::Implied, 2),   n(M::Nop, A::IndirectY, 8),
    n(M::Nop, A::ZeroPageX, 4), n(M::Adc, A::ZeroPageX, 4), n(M::Ror, A::ZeroPageX, 6), n(M::Nop, A::ZeroPageX, 6),
    n(M::Sei, A::Implied, 2),   c(M::Adc, A::AbsoluteY, 4), n(M::Nop, A::Implied, 2),   n(M::Nop, A::AbsoluteY, 7),
    c(M::Nop, A::AbsoluteX, 4), c(M::Adc, A::AbsoluteX, 4), n(M::Ror, A::AbsoluteX, 7), n(M::Nop, A::AbsoluteX, 7),
    // 0x80
    n(M::Nop, A::Immediate, 2), n(M::Sta, A::IndirectX, 6), n(M::Nop, A::Immediate, 2), n(M::Nop, A::IndirectX, 6),
    n(M::Sty, A::ZeroPage, 3),  n(M::Sta, A::ZeroPage, 3),  n(M::Stx, A::ZeroPage, 3),  n(M::Nop, A::ZeroPage, 3),
    n(M::Dey, A::Implied, 2),   n(M::Nop, A::Immediate, 2), n(M::Txa, A::Implied, 2),   n(M::Nop, A::Immediate, 2),
    n(M::Sty, A::Absolute, 4),  n(M::Sta, A::Absolute, 4),  n(M::Stx, A::Absolute, 4),  n(M::Nop, A::Absolute, 4),
    // 0x90
    b(M::Bcc),                  n(M::Sta, A::IndirectY, 6), n(M::Nop, A::Implied, 2),   n(M::Nop, A::IndirectY, 6),
    n(M::Sty, A::ZeroPageX, 4), n(M::Sta, A::ZeroPageX, 4), n(M::Stx, A::ZeroPageY, 4), n(M::Nop, A::ZeroPageY, 4),
    n(M::Tya, A::Implied, 2),   n(M::Sta, A::AbsoluteY, 5), n(M::Txs, A::Implied, 2),   n(M::Nop, A::AbsoluteY, 5),
    n(M::Nop, A::AbsoluteX, 5), n(M::Sta, A::AbsoluteX, 5), n(M::Nop, A::AbsoluteY, 5), n(M::Nop, A::AbsoluteY, 5),
    // 0xA0
    n(M::Ldy, A::Immediate, 2), n(M::Lda, A::IndirectX, 6), n(M::Ldx, A::Immediate, 2), n(M::Nop, A::IndirectX, 6),
    n(M::Ldy, A::ZeroPage, 3),  n(M::Lda, A::ZeroPage, 3),  n(M::Ldx, A::ZeroPage, 3),  n(M::Nop, A::ZeroPage, 3),
    n(M::Tay, A::Implied, 2),   n(M::Lda, A::Immediate, 2), n(M::Tax, A::Implied, 2),   n(M::Nop, A::Immediate, 2),
    n(M::Ldy, A::Absolute, 4),  n(M::Lda, A::Absolute, 4),  n(M::Ldx, A::Absolute, 4),  n(M::Nop, A::Absolute, 4),
    // 0xB0
    b(M::Bcs),                  c(M::Lda, A::IndirectY, 5), n(M::Nop, A::Implied, 2),   c(M::Nop, A::IndirectY, 5),
    n(M::Ldy, A::ZeroPageX, 4), n(M::Lda, A::ZeroPageX, 4), n(M::Ldx, A::ZeroPageY, 4), n(M::Nop, A::ZeroPageY, 4),
    n(M::Clv, A::Implied, 2),   c(M::Lda, A::AbsoluteY, 4), n(M::Tsx, A::Implied, 2),   c(M::Nop, A::AbsoluteY, 4),
    c(M::Ldy, A::AbsoluteX, 4), c(M::Lda, A::AbsoluteX, 4), c(M::Ldx, A::AbsoluteY, 4), c(M::Nop, A::AbsoluteY, 4),
    // 0xC0
    n(M::Cpy, A::Immediate, 2), n(M::Cmp, A::IndirectX, 6), n(M::Nop, A::Immediate, 2), n(M::Nop, A::IndirectX, 8),
    n(M::Cpy, A::ZeroPage, 3),  n(M::Cmp, A::ZeroPage, 3),  n(M::Dec, A::ZeroPage, 5),  n(M::Nop, A::ZeroPage, 5),
    n(M::Iny, A::Implied, 2),   n(M::Cmp, A::Immediate, 2), n(M::Dex, A::Implied, 2),   n(M::Nop, A::Immediate, 2),
    n(M::Cpy, A::Absolute, 4),  n(M::Cmp, A::Absolute, 4),  n(M::Dec, A::Absolute, 6),  n(M::Nop, A::Absolute, 6),
    // 0xD0
    b(M::Bne),                  c(M::Cmp, A::IndirectY, 5), n(M::Nop, A::Implied, 2),   n(M::Nop, A::IndirectY, 8),
    n(M::Nop, A::ZeroPageX, 4), n(M::Cmp, A::ZeroPageX, 4), n(M::Dec, A::ZeroPageX, 6), n(M::Nop, A::ZeroPageX, 6),
    n(M::Cld, A::Implied, 2),   c(M::Cmp, A::AbsoluteY, 4), n(M::Nop, A::Implied, 2),   n(M::Nop, A::AbsoluteY, 7),
    c(M::Nop, A::AbsoluteX, 4), c(M::Cmp, A::AbsoluteX, 4), n(M::Dec, A::AbsoluteX, 7), n(M::Nop, A::AbsoluteX, 7),
    // 0xE0
    n(M::Cpx, A::Immediate, 2), n(M::Sbc, A::IndirectX, 6), n(M::Nop, A::Immediate, 2), n(M::Nop, A::IndirectX, 8),
    n(M::Cpx, A::ZeroPage, 3),  n(M::Sbc, A::ZeroPage, 3),  n(M::Inc, A::ZeroPage, 5),  n(M::Nop, A::ZeroPage, 5),
    n(M::Inx, A::Implied, 2),   n(M::Sbc, A::Immediate, 2), n(M::Nop, A::Implied, 2),   n(M::Nop, A::Immediate, 2),
    n(M::Cpx, A::Absolute, 4),  n(M::Sbc, A::Absolute, 4),  n(M::Inc, A::Absolute, 6),  n(M::Nop, A::Absolute, 6),
    // 0xF0
    b(M::Beq),                  c(M::Sbc, A::IndirectY, 5), n(M::Nop, A::Implied, 2),   n(M::Nop, A::IndirectY, 8),
    n(M::Nop, A::ZeroPageX, 4), n(M::Sbc, A::ZeroPageX, 4), n(M::Inc, A::ZeroPageX, 6), n(M::Nop, A::ZeroPageX, 6),
    n(M::Sed, A::Implied, 2),   c(M::Sbc, A::AbsoluteY, 4), n(M::Nop, A::Implied, 2),   n(M::Nop, A::AbsoluteY, 7),
    c(M::Nop, A::AbsoluteX, 4), c(M::Sbc, A::AbsoluteX, 4), n(M::Inc, A::AbsoluteX, 7), n(M::Nop, A::AbsoluteX, 7),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_entries_match_reference_counts() {
        // Spot checks against the published 6502 cycle table.
        let cases: &[(u8, M, u8)] = &[
            (0x00, M::Brk, 7),
            (0x20, M::Jsr, 6),
            (0x4C, M::Jmp, 3),
            (0x6C, M::Jmp, 5),
            (0x60, M::Rts, 6),
            (0x40, M::Rti, 6),
            (0xA9, M::Lda, 2),
            (0xAD, M::Lda, 4),
            (0xB1, M::Lda, 5),
            (0x91, M::Sta, 6),
            (0x9D, M::Sta, 5),
            (0xEE, M::Inc, 6),
            (0xFE, M::Inc, 7),
            (0x48, M::Pha, 3),
            (0x68, M::Pla, 4),
        ];
        for &(opcode, mnemonic, cycles) in cases {
            let instr = &LOOKUP_TABLE[opcode as usize];
            assert_eq!(instr.mnemonic, mnemonic, "opcode {opcode:#04X}");
            assert_eq!(instr.cycle.base(), cycles, "opcode {opcode:#04X}");
        }
    }

    #[test]
    fn branches_use_relative_addressing() {
        for opcode in [0x10u8, 0x30, 0x50, 0x70, 0x90, 0xB0, 0xD0, 0xF0] {
            let instr = &LOOKUP_TABLE[opcode as usize];
            assert!(instr.mnemonic.is_branch(), "opcode {opcode:#04X}");
            assert_eq!(instr.addressing, A::Relative);
        }
    }

    #[test]
    fn undocumented_slots_decode_as_nop() {
        for opcode in [0x02u8, 0x03, 0x1A, 0x80, 0xEB, 0xFF] {
            assert_eq!(
                LOOKUP_TABLE[opcode as usize].mnemonic,
                M::Nop,
                "opcode {opcode:#04X}"
            );
        }
    }

    #[test]
    fn every_len_covers_addressing_cycles() {
        for (opcode, instr) in LOOKUP_TABLE.iter().enumerate() {
            if instr.mnemonic.is_branch()
                || matches!(
                    instr.mnemonic,
                    M::Brk | M::Jsr | M::Rts | M::Rti | M::Pha | M::Php | M::Pla | M::Plp
                )
            {
                continue;
            }
            assert!(
                instr.len() >= instr.addressing.cycles(),
                "opcode {opcode:#04X} shorter than its addressing phase"
            );
        }
    }
}
