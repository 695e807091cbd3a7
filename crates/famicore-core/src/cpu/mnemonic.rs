//! Operation semantics for the official instruction set.
//!
//! Each mnemonic's data path lives here; the cycle scheduling (which bus
//! access happens on which cycle) stays in `cpu.rs`. Undocumented opcodes
//! decode as `Nop` with the real instruction's addressing mode and cycle
//! count, so programs that stumble into them keep correct size and timing.

use crate::cpu::{Cpu, status::Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Mnemonic {
    // Loads / stores
    Lda,
    Ldx,
    Ldy,
    Sta,
    Stx,
    Sty,
    // Arithmetic / logic
    Adc,
    Sbc,
    And,
    Ora,
    Eor,
    Cmp,
    Cpx,
    Cpy,
    Bit,
    // Shifts / rotates
    Asl,
    Lsr,
    Rol,
    Ror,
    // Increments / decrements
    Inc,
    Dec,
    Inx,
    Iny,
    Dex,
    Dey,
    // Register transfers
    Tax,
    Tay,
    Txa,
    Tya,
    Tsx,
    Txs,
    // Branches
    Bcc,
    Bcs,
    Beq,
    Bmi,
    Bne,
    Bpl,
    Bvc,
    Bvs,
    // Flag operations
    Clc,
    Sec,
    Cli,
    Sei,
    Clv,
    Cld,
    Sed,
    // Stack
    Pha,
    Php,
    Pla,
    Plp,
    // Control flow
    Jmp,
    Jsr,
    Rts,
    Rti,
    Brk,
    // Official and undocumented no-ops
    Nop,
}

impl Mnemonic {
    /// Memory read-modify-write operation (when not in accumulator form).
    pub(crate) const fn is_rmw(self) -> bool {
        matches!(
            self,
            Mnemonic::Asl | Mnemonic::Lsr | Mnemonic::Rol | Mnemonic::Ror | Mnemonic::Inc | Mnemonic::Dec
        )
    }

    pub(crate) const fn is_store(self) -> bool {
        matches!(self, Mnemonic::Sta | Mnemonic::Stx | Mnemonic::Sty)
    }

    pub(crate) const fn is_branch(self) -> bool {
        matches!(
            self,
            Mnemonic::Bcc
                | Mnemonic::Bcs
                | Mnemonic::Beq
                | Mnemonic::Bmi
                | Mnemonic::Bne
                | Mnemonic::Bpl
                | Mnemonic::Bvc
                | Mnemonic::Bvs
        )
    }

    /// Branch condition against the current flags.
    pub(crate) fn branch_taken(self, p: Status) -> bool {
        match self {
            Mnemonic::Bcc => !p.contains(Status::CARRY),
            Mnemonic::Bcs => p.contains(Status::CARRY),
            Mnemonic::Bne => !p.contains(Status::ZERO),
            Mnemonic::Beq => p.contains(Status::ZERO),
            Mnemonic::Bpl => !p.contains(Status::NEGATIVE),
            Mnemonic::Bmi => p.contains(Status::NEGATIVE),
            Mnemonic::Bvc => !p.contains(Status::OVERFLOW),
            Mnemonic::Bvs => p.contains(Status::OVERFLOW),
            _ => false,
        }
    }

    /// Applies a read-class or register-class operation to `value`.
    pub(crate) fn apply(self, cpu: &mut Cpu, value: u8) {
        match self {
            Mnemonic::Lda => {
                cpu.a = value;
                cpu.p.set_zn(cpu.a);
            }
            Mnemonic::Ldx => {
                cpu.x = value;
                cpu.p.set_zn(cpu.x);
            }
            Mnemonic::Ldy => {
                cpu.y = value;
                cpu.p.set_zn(cpu.y);
            }
            Mnemonic::Adc => add_with_carry(cpu, value),
            Mnemonic::Sbc => add_with_carry(cpu, value ^ 0xFF),
            Mnemonic::And => {
                cpu.a &= value;
                cpu.p.set_zn(cpu.a);
            }
            Mnemonic::Ora => {
                cpu.a |= value;
                cpu.p.set_zn(cpu.a);
            }
            Mnemonic::Eor => {
                cpu.a ^= value;
                cpu.p.set_zn(cpu.a);
            }
            Mnemonic::Cmp => compare(cpu, cpu.a, value),
            Mnemonic::Cpx => compare(cpu, cpu.x, value),
            Mnemonic::Cpy => compare(cpu, cpu.y, value),
            Mnemonic::Bit => {
                cpu.p.set(Status::ZERO, cpu.a & value == 0);
                cpu.p.set(Status::NEGATIVE, value & 0x80 != 0);
                cpu.p.set(Status::OVERFLOW, value & 0x40 != 0);
            }
            Mnemonic::Inx => {
                cpu.x = cpu.x.wrapping_add(1);
                cpu.p.set_zn(cpu.x);
            }
            Mnemonic::Iny => {
                cpu.y = cpu.y.wrapping_add(1);
                cpu.p.set_zn(cpu.y);
            }
            Mnemonic::Dex => {
                cpu.x = cpu.x.wrapping_sub(1);
                cpu.p.set_zn(cpu.x);
            }
            Mnemonic::Dey => {
                cpu.y = cpu.y.wrapping_sub(1);
                cpu.p.set_zn(cpu.y);
            }
            Mnemonic::Tax => {
                cpu.x = cpu.a;
                cpu.p.set_zn(cpu.x);
            }
            Mnemonic::Tay => {
                cpu.y = cpu.a;
                cpu.p.set_zn(cpu.y);
            }
            Mnemonic::Txa => {
                cpu.a = cpu.x;
                cpu.p.set_zn(cpu.a);
            }
            Mnemonic::Tya => {
                cpu.a = cpu.y;
                cpu.p.set_zn(cpu.a);
            }
            Mnemonic::Tsx => {
                cpu.x = cpu.s;
                cpu.p.set_zn(cpu.x);
            }
            Mnemonic::Txs => cpu.s = cpu.x,
            Mnemonic::Clc => cpu.p.remove(Status::CARRY),
            Mnemonic::Sec => cpu.p.insert(Status::CARRY),
            Mnemonic::Cli => cpu.p.remove(Status::INTERRUPT),
            Mnemonic::Sei => cpu.p.insert(Status::INTERRUPT),
            Mnemonic::Clv => cpu.p.remove(Status::OVERFLOW),
            Mnemonic::Cld => cpu.p.remove(Status::DECIMAL),
            Mnemonic::Sed => cpu.p.insert(Status::DECIMAL),
            Mnemonic::Nop => {}
            _ => {}
        }
    }

    /// Applies a shift/rotate/inc/dec data path, returning the new value.
    /// Used by both the accumulator forms and the RMW modify cycle.
    pub(crate) fn modify(self, cpu: &mut Cpu, value: u8) -> u8 {
        let result = match self {
            Mnemonic::Asl => {
                cpu.p.set_c(value & 0x80 != 0);
                value << 1
            }
            Mnemonic::Lsr => {
                cpu.p.set_c(value & 0x01 != 0);
                value >> 1
            }
            Mnemonic::Rol => {
                let carry_in = cpu.p.carry();
                cpu.p.set_c(value & 0x80 != 0);
                (value << 1) | carry_in
            }
            Mnemonic::Ror => {
                let carry_in = cpu.p.carry() << 7;
                cpu.p.set_c(value & 0x01 != 0);
                (value >> 1) | carry_in
            }
            Mnemonic::Inc => value.wrapping_add(1),
            Mnemonic::Dec => value.wrapping_sub(1),
            _ => value,
        };
        cpu.p.set_zn(result);
        result
    }

    /// Register stored by a write-class instruction.
    pub(crate) fn store_value(self, cpu: &Cpu) -> u8 {
        match self {
            Mnemonic::Sta => cpu.a,
            Mnemonic::Stx => cpu.x,
            Mnemonic::Sty => cpu.y,
            _ => 0,
        }
    }
}

/// Shared ADC/SBC data path (binary mode only; the 2A03 has no decimal
/// circuitry).
fn add_with_carry(cpu: &mut Cpu, value: u8) {
    let a = cpu.a;
    let sum = u16::from(a) + u16::from(value) + u16::from(cpu.p.carry());
    let result = sum as u8;

    cpu.p.set_c(sum > 0xFF);
    cpu.p.set_v((a ^ result) & (value ^ result) & 0x80 != 0);
    cpu.p.set_zn(result);
    cpu.a = result;
}

fn compare(cpu: &mut Cpu, register: u8, value: u8) {
    let diff = register.wrapping_sub(value);
    cpu.p.set_c(register >= value);
    cpu.p.set_zn(diff);
}
