//! Addressing modes as per-cycle step functions.
//!
//! Each mode is a fixed sequence of bus cycles that leaves the effective
//! address in `cpu.operand.addr`. Modes with an optional page-cross fix-up
//! cycle (`Cycle::Cross` instructions) skip it via `Cpu::check_cross_page`
//! when the index stayed inside the page; write and RMW instructions always
//! pay the fix-up cycle.

use crate::bus::cpu::CpuBus;
use crate::cpu::Cpu;

/// Operand addressing modes of the 6502.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Addressing {
    /// No operand; the instruction works on registers alone.
    Implied,
    /// The operation targets the accumulator instead of memory.
    Accumulator,
    /// Operand byte follows the opcode.
    Immediate,
    /// Full 16-bit address follows the opcode.
    Absolute,
    /// Absolute plus X, with a fix-up cycle on page cross.
    AbsoluteX,
    /// Absolute plus Y, with a fix-up cycle on page cross.
    AbsoluteY,
    /// JMP-only pointer indirection, with the `$xxFF` page-wrap bug.
    Indirect,
    /// Single-byte address into page zero.
    ZeroPage,
    /// Zero-page plus X, wrapping within page zero.
    ZeroPageX,
    /// Zero-page plus Y, wrapping within page zero.
    ZeroPageY,
    /// Pre-indexed: pointer at `(zp + X) & $FF`.
    IndirectX,
    /// Post-indexed: pointer at `zp`, then plus Y with fix-up on cross.
    IndirectY,
    /// Signed 8-bit branch offset; cycles handled by the branch sequence.
    Relative,
}

impl Addressing {
    /// Number of addressing cycles after the opcode fetch, counting the
    /// optional page-cross fix-up where one exists.
    pub(crate) const fn cycles(self) -> u8 {
        match self {
            Addressing::Implied
            | Addressing::Accumulator
            | Addressing::Immediate
            | Addressing::Relative => 0,
            Addressing::ZeroPage => 1,
            Addressing::Absolute | Addressing::ZeroPageX | Addressing::ZeroPageY => 2,
            Addressing::AbsoluteX | Addressing::AbsoluteY => 3,
            Addressing::Indirect | Addressing::IndirectX | Addressing::IndirectY => 4,
        }
    }

    /// Runs addressing cycle `step` for this mode.
    pub(crate) fn exec(self, cpu: &mut Cpu, bus: &mut CpuBus<'_>, step: u8) {
        match self {
            Addressing::Implied
            | Addressing::Accumulator
            | Addressing::Immediate
            | Addressing::Relative => {
                cpu.invalid_step(step);
            }
            Addressing::Absolute => absolute(cpu, bus, step),
            Addressing::AbsoluteX => absolute_indexed(cpu, bus, step, IndexReg::X),
            Addressing::AbsoluteY => absolute_indexed(cpu, bus, step, IndexReg::Y),
            Addressing::Indirect => indirect(cpu, bus, step),
            Addressing::ZeroPage => zero_page(cpu, bus, step),
            Addressing::ZeroPageX => zero_page_indexed(cpu, bus, step, IndexReg::X),
            Addressing::ZeroPageY => zero_page_indexed(cpu, bus, step, IndexReg::Y),
            Addressing::IndirectX => indirect_x(cpu, bus, step),
            Addressing::IndirectY => indirect_y(cpu, bus, step),
        }
    }
}

#[derive(Clone, Copy)]
enum IndexReg {
    X,
    Y,
}

impl IndexReg {
    fn value(self, cpu: &Cpu) -> u8 {
        match self {
            IndexReg::X => cpu.x,
            IndexReg::Y => cpu.y,
        }
    }
}

fn absolute(cpu: &mut Cpu, bus: &mut CpuBus<'_>, step: u8) {
    match step {
        0 => {
            cpu.operand.lo = bus.read(cpu.pc, cpu);
            cpu.incr_pc();
        }
        1 => {
            cpu.operand.hi = bus.read(cpu.pc, cpu);
            cpu.incr_pc();
            cpu.operand.addr = u16::from_le_bytes([cpu.operand.lo, cpu.operand.hi]);
        }
        _ => cpu.invalid_step(step),
    }
}

fn absolute_indexed(cpu: &mut Cpu, bus: &mut CpuBus<'_>, step: u8, index: IndexReg) {
    match step {
        0 => {
            cpu.operand.lo = bus.read(cpu.pc, cpu);
            cpu.incr_pc();
        }
        1 => {
            cpu.operand.hi = bus.read(cpu.pc, cpu);
            cpu.incr_pc();
            let base = u16::from_le_bytes([cpu.operand.lo, cpu.operand.hi]);
            let addr = base.wrapping_add(u16::from(index.value(cpu)));
            cpu.operand.addr = addr;
            cpu.check_cross_page(base, addr);
        }
        2 => {
            // Speculative read at (old high byte, new low byte); the real
            // access follows once the high byte is fixed up.
            let dummy = (u16::from(cpu.operand.hi) << 8) | (cpu.operand.addr & 0x00FF);
            let _ = bus.read(dummy, cpu);
        }
        _ => cpu.invalid_step(step),
    }
}

fn indirect(cpu: &mut Cpu, bus: &mut CpuBus<'_>, step: u8) {
    match step {
        0 => {
            cpu.operand.lo = bus.read(cpu.pc, cpu);
            cpu.incr_pc();
        }
        1 => {
            cpu.operand.hi = bus.read(cpu.pc, cpu);
            cpu.incr_pc();
        }
        2 => {
            let ptr = u16::from_le_bytes([cpu.operand.lo, cpu.operand.hi]);
            cpu.operand.addr = u16::from(bus.read(ptr, cpu));
        }
        3 => {
            // The pointer high byte comes from the same page: JMP ($xxFF)
            // reads its high byte from $xx00.
            let ptr = u16::from_le_bytes([cpu.operand.lo, cpu.operand.hi]);
            let hi_ptr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
            let hi = bus.read(hi_ptr, cpu);
            cpu.operand.addr |= u16::from(hi) << 8;
        }
        _ => cpu.invalid_step(step),
    }
}

fn zero_page(cpu: &mut Cpu, bus: &mut CpuBus<'_>, step: u8) {
    match step {
        0 => {
            cpu.operand.lo = bus.read(cpu.pc, cpu);
            cpu.incr_pc();
            cpu.operand.addr = u16::from(cpu.operand.lo);
        }
        _ => cpu.invalid_step(step),
    }
}

fn zero_page_indexed(cpu: &mut Cpu, bus: &mut CpuBus<'_>, step: u8, index: IndexReg) {
    match step {
        0 => {
            cpu.operand.lo = bus.read(cpu.pc, cpu);
            cpu.incr_pc();
        }
        1 => {
            let _ = bus.read(u16::from(cpu.operand.lo), cpu);
            cpu.operand.addr = u16::from(cpu.operand.lo.wrapping_add(index.value(cpu)));
        }
        _ => cpu.invalid_step(step),
    }
}

fn indirect_x(cpu: &mut Cpu, bus: &mut CpuBus<'_>, step: u8) {
    match step {
        0 => {
            cpu.operand.lo = bus.read(cpu.pc, cpu);
            cpu.incr_pc();
        }
        1 => {
            let _ = bus.read(u16::from(cpu.operand.lo), cpu);
        }
        2 => {
            let ptr = u16::from(cpu.operand.lo.wrapping_add(cpu.x));
            cpu.operand.addr = u16::from(bus.read(ptr, cpu));
        }
        3 => {
            let ptr = u16::from(cpu.operand.lo.wrapping_add(cpu.x).wrapping_add(1));
            let hi = bus.read(ptr, cpu);
            cpu.operand.addr |= u16::from(hi) << 8;
        }
        _ => cpu.invalid_step(step),
    }
}

fn indirect_y(cpu: &mut Cpu, bus: &mut CpuBus<'_>, step: u8) {
    match step {
        0 => {
            cpu.operand.lo = bus.read(cpu.pc, cpu);
            cpu.incr_pc();
        }
        1 => {
            cpu.operand.addr = u16::from(bus.read(u16::from(cpu.operand.lo), cpu));
        }
        2 => {
            let hi_ptr = u16::from(cpu.operand.lo.wrapping_add(1));
            cpu.operand.hi = bus.read(hi_ptr, cpu);
            let base = (u16::from(cpu.operand.hi) << 8) | cpu.operand.addr;
            let addr = base.wrapping_add(u16::from(cpu.y));
            cpu.operand.addr = addr;
            cpu.check_cross_page(base, addr);
        }
        3 => {
            let dummy = (u16::from(cpu.operand.hi) << 8) | (cpu.operand.addr & 0x00FF);
            let _ = bus.read(dummy, cpu);
        }
        _ => cpu.invalid_step(step),
    }
}
