//! 2A03 CPU core: a per-cycle micro-stepper.
//!
//! The first cycle of every instruction fetches the opcode and looks up its
//! `(mnemonic, addressing, cycle)` entry. Each further call to [`Cpu::step`]
//! executes exactly one cycle: an addressing-phase bus access, an operation
//! bus access, or one step of the OAM DMA engine. Bus accesses drive system
//! time (the bus runs three PPU dots per access), so mid-instruction reads
//! and writes land on the correct dot.
//!
//! Interrupts are sampled at the end of every cycle with a one-cycle delay.
//! The delayed copies are what the instruction boundary consults, which
//! yields both the penultimate-cycle IRQ poll and the one-instruction
//! latency of SEI/CLI/PLP without special cases.

use std::fmt::{Debug, Display};

use tracing::error;

use crate::bus::cpu::CpuBus;
use crate::cpu::addressing::Addressing;
use crate::cpu::lookup::{Cycle, Instruction, LOOKUP_TABLE};
use crate::cpu::mnemonic::Mnemonic;
use crate::cpu::status::Status;
use crate::interrupt::InterruptLines;
use crate::memory::cpu::{
    IRQ_VECTOR_LO, NMI_VECTOR_LO, RESET_VECTOR_HI, RESET_VECTOR_LO, STACK_PAGE_START,
};
use crate::memory::ppu::Register as PpuRegister;
use crate::reset_kind::ResetKind;

pub(crate) mod addressing;
pub(crate) mod lookup;
pub(crate) mod mnemonic;
pub(crate) mod status;

/// Lightweight CPU register snapshot for tracing and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CpuSnapshot {
    pub pc: u16,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub p: u8,
}

/// Scratch state carried across the cycles of one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct Operand {
    /// First operand byte (or RMW read value).
    pub(crate) lo: u8,
    /// Second operand byte (or RMW write-back value).
    pub(crate) hi: u8,
    /// Effective address once addressing completes.
    pub(crate) addr: u16,
    /// The indexed access crossed a page boundary.
    pub(crate) crossed: bool,
}

/// OAM DMA engine: one alignment cycle (two when started on an odd CPU
/// cycle), then 256 read/write pairs into `$2004`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct OamDma {
    page: u8,
    offset: u16,
    dummy_cycles: u8,
    read_phase: bool,
    latch: u8,
}

impl OamDma {
    fn new(page: u8, start_on_odd_cycle: bool) -> Self {
        Self {
            page,
            offset: 0,
            dummy_cycles: 1 + u8::from(start_on_odd_cycle),
            read_phase: true,
            latch: 0,
        }
    }

    /// Runs one DMA cycle. Returns `true` once all 256 bytes are in OAM.
    fn step(&mut self, cpu: &mut Cpu, bus: &mut CpuBus<'_>) -> bool {
        if self.dummy_cycles > 0 {
            self.dummy_cycles -= 1;
            let _ = bus.read(cpu.pc, cpu);
            return false;
        }

        if self.read_phase {
            let addr = (u16::from(self.page) << 8) | self.offset;
            self.latch = bus.read(addr, cpu);
            self.read_phase = false;
            return false;
        }

        bus.write(PpuRegister::OamData.addr(), self.latch, cpu);
        self.offset += 1;
        self.read_phase = true;
        self.offset >= 0x100
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cpu {
    pub(crate) a: u8,
    pub(crate) x: u8,
    pub(crate) y: u8,
    pub(crate) s: u8,
    pub(crate) p: Status,
    pub(crate) pc: u16,

    opcode_in_flight: Option<u8>,
    /// Cycle index within the current instruction (post-fetch).
    step: u8,
    pub(crate) operand: Operand,

    /// Interrupt line samples; `prev_*` lag one cycle and drive the
    /// boundary decision.
    nmi_seen: bool,
    prev_nmi_seen: bool,
    irq_active: bool,
    prev_irq_active: bool,

    oam_dma: Option<OamDma>,
}

impl Cpu {
    /// CPU with documented power-up register values. `reset` loads PC.
    pub(crate) fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0xFD,
            p: Status::from_bits_retain(0x34),
            pc: 0,
            opcode_in_flight: None,
            step: 0,
            operand: Operand::default(),
            nmi_seen: false,
            prev_nmi_seen: false,
            irq_active: false,
            prev_irq_active: false,
            oam_dma: None,
        }
    }

    /// Loads PC from the reset vector and applies register init.
    ///
    /// Power-on clears A/X/Y and forces S/P; a soft reset keeps registers,
    /// sets I, and drops S by 3 as the hardware does.
    pub(crate) fn reset(&mut self, bus: &mut CpuBus<'_>, kind: ResetKind) {
        let lo = bus.peek(RESET_VECTOR_LO);
        let hi = bus.peek(RESET_VECTOR_HI);
        self.pc = u16::from_le_bytes([lo, hi]);

        match kind {
            ResetKind::PowerOn => {
                self.a = 0;
                self.x = 0;
                self.y = 0;
                self.s = 0xFD;
                self.p = Status::from_bits_retain(0x34);
            }
            ResetKind::Soft => {
                self.p.insert(Status::INTERRUPT);
                self.s = self.s.wrapping_sub(3);
            }
        }

        self.opcode_in_flight = None;
        self.step = 0;
        self.operand = Operand::default();
        self.nmi_seen = false;
        self.prev_nmi_seen = false;
        self.irq_active = false;
        self.prev_irq_active = false;
        self.oam_dma = None;
    }

    /// Executes one CPU cycle.
    pub(crate) fn step(&mut self, bus: &mut CpuBus<'_>) {
        if self.handle_oam_dma(bus) {
            return;
        }

        match self.opcode_in_flight {
            Some(opcode) => {
                let instr = &LOOKUP_TABLE[opcode as usize];
                self.exec_cycle(bus, instr);
                self.step += 1;
                if self.step >= instr.len() {
                    self.finish_instruction();
                }
            }
            None => {
                let nmi_ready = self.prev_nmi_seen && bus.interrupts.nmi_pending();
                if nmi_ready || self.prev_irq_active {
                    self.service_interrupt(bus);
                } else {
                    let opcode = bus.read(self.pc, self);
                    self.incr_pc();
                    self.opcode_in_flight = Some(opcode);
                    self.step = 0;
                    self.operand = Operand::default();
                }
            }
        }
    }

    /// End-of-cycle interrupt sampling; called by the bus after every
    /// access.
    pub(crate) fn end_cycle(&mut self, interrupts: &InterruptLines) {
        self.prev_nmi_seen = self.nmi_seen;
        self.nmi_seen = interrupts.nmi_pending();
        self.prev_irq_active = self.irq_active;
        self.irq_active = interrupts.irq_line() && !self.p.contains(Status::INTERRUPT);
    }

    /// `true` when an instruction is mid-flight.
    pub fn opcode_active(&self) -> bool {
        self.opcode_in_flight.is_some()
    }

    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            pc: self.pc,
            a: self.a,
            x: self.x,
            y: self.y,
            s: self.s,
            p: self.p.bits(),
        }
    }

    // =====================================================================
    // Per-cycle dispatch
    // =====================================================================

    fn exec_cycle(&mut self, bus: &mut CpuBus<'_>, instr: &Instruction) {
        match instr.mnemonic {
            Mnemonic::Brk => return self.brk_cycle(bus),
            Mnemonic::Jsr => return self.jsr_cycle(bus),
            Mnemonic::Rts => return self.rts_cycle(bus),
            Mnemonic::Rti => return self.rti_cycle(bus),
            Mnemonic::Pha | Mnemonic::Php => return self.push_cycle(bus, instr.mnemonic),
            Mnemonic::Pla | Mnemonic::Plp => return self.pull_cycle(bus, instr.mnemonic),
            m if m.is_branch() => return self.branch_cycle(bus, m),
            _ => {}
        }

        let addr_cycles = instr.addressing.cycles();
        if self.step < addr_cycles {
            let step = self.step;
            instr.addressing.exec(self, bus, step);
            // JMP has no operation cycle: PC updates as soon as the final
            // address byte lands.
            if instr.mnemonic == Mnemonic::Jmp && self.step + 1 >= addr_cycles {
                self.pc = self.operand.addr;
            }
        } else {
            self.operation_cycle(bus, instr, self.step - addr_cycles);
        }
    }

    fn operation_cycle(&mut self, bus: &mut CpuBus<'_>, instr: &Instruction, op_step: u8) {
        let mnemonic = instr.mnemonic;

        if mnemonic.is_store() {
            bus.write(self.operand.addr, mnemonic.store_value(self), self);
            return;
        }

        if mnemonic.is_rmw() && instr.addressing != Addressing::Accumulator {
            match op_step {
                0 => self.operand.lo = bus.read(self.operand.addr, self),
                1 => {
                    // The write-back of the unmodified value is real bus
                    // traffic, not an idle cycle.
                    bus.write(self.operand.addr, self.operand.lo, self);
                    let value = self.operand.lo;
                    self.operand.hi = mnemonic.modify(self, value);
                }
                2 => bus.write(self.operand.addr, self.operand.hi, self),
                step => self.invalid_step(step),
            }
            return;
        }

        // Read-class and register-class operations, including the dummy
        // reads that pad undocumented NOPs out to their real cycle counts.
        let value = self.fetch_operand(bus, instr.addressing);
        if op_step == 0 {
            if instr.addressing == Addressing::Accumulator {
                self.a = mnemonic.modify(self, value);
            } else {
                mnemonic.apply(self, value);
            }
        }
    }

    fn fetch_operand(&mut self, bus: &mut CpuBus<'_>, addressing: Addressing) -> u8 {
        match addressing {
            Addressing::Immediate => {
                let value = bus.read(self.pc, self);
                self.incr_pc();
                value
            }
            Addressing::Implied | Addressing::Accumulator => {
                let _ = bus.read(self.pc, self);
                self.a
            }
            _ => bus.read(self.operand.addr, self),
        }
    }

    // =====================================================================
    // Bespoke sequences
    // =====================================================================

    fn branch_cycle(&mut self, bus: &mut CpuBus<'_>, mnemonic: Mnemonic) {
        match self.step {
            0 => {
                let offset = bus.read(self.pc, self) as i8;
                self.incr_pc();
                if mnemonic.branch_taken(self.p) {
                    let target = self.pc.wrapping_add(offset as u16);
                    self.operand.addr = target;
                    self.operand.crossed = (target & 0xFF00) != (self.pc & 0xFF00);
                } else {
                    self.step += 2;
                }
            }
            1 => {
                let _ = bus.read(self.pc, self);
                let target = self.operand.addr;
                self.pc = (self.pc & 0xFF00) | (target & 0x00FF);
                if !self.operand.crossed {
                    self.pc = target;
                    self.step += 1;
                }
            }
            2 => {
                // PCH fix-up after the low byte wrapped within the page.
                let _ = bus.read(self.pc, self);
                self.pc = self.operand.addr;
            }
            step => self.invalid_step(step),
        }
    }

    fn jsr_cycle(&mut self, bus: &mut CpuBus<'_>) {
        match self.step {
            0 => {
                self.operand.lo = bus.read(self.pc, self);
                self.incr_pc();
            }
            1 => {
                let _ = bus.read(self.stack_addr(), self);
            }
            2 => {
                let hi = (self.pc >> 8) as u8;
                self.push(bus, hi);
            }
            3 => {
                let lo = self.pc as u8;
                self.push(bus, lo);
            }
            4 => {
                // PC still points at the high operand byte, so the pushed
                // return address is the jump's last byte (RTS adds one).
                let hi = bus.read(self.pc, self);
                self.pc = u16::from_le_bytes([self.operand.lo, hi]);
            }
            step => self.invalid_step(step),
        }
    }

    fn rts_cycle(&mut self, bus: &mut CpuBus<'_>) {
        match self.step {
            0 => {
                let _ = bus.read(self.pc, self);
            }
            1 => {
                let _ = bus.read(self.stack_addr(), self);
            }
            2 => self.operand.lo = self.pull(bus),
            3 => {
                let hi = self.pull(bus);
                self.pc = u16::from_le_bytes([self.operand.lo, hi]);
            }
            4 => {
                let _ = bus.read(self.pc, self);
                self.incr_pc();
            }
            step => self.invalid_step(step),
        }
    }

    fn rti_cycle(&mut self, bus: &mut CpuBus<'_>) {
        match self.step {
            0 => {
                let _ = bus.read(self.pc, self);
            }
            1 => {
                let _ = bus.read(self.stack_addr(), self);
            }
            2 => {
                let value = self.pull(bus);
                self.p.load(value);
            }
            3 => self.operand.lo = self.pull(bus),
            4 => {
                let hi = self.pull(bus);
                self.pc = u16::from_le_bytes([self.operand.lo, hi]);
            }
            step => self.invalid_step(step),
        }
    }

    fn brk_cycle(&mut self, bus: &mut CpuBus<'_>) {
        match self.step {
            0 => {
                // BRK consumes a padding byte.
                let _ = bus.read(self.pc, self);
                self.incr_pc();
            }
            1 => {
                let hi = (self.pc >> 8) as u8;
                self.push(bus, hi);
            }
            2 => {
                let lo = self.pc as u8;
                self.push(bus, lo);
            }
            3 => {
                let status = self.p.pushed_with_break();
                self.push(bus, status);
            }
            4 => {
                // An NMI arriving by the vector fetch hijacks BRK.
                let vector = if bus.interrupts.take_nmi() {
                    NMI_VECTOR_LO
                } else {
                    IRQ_VECTOR_LO
                };
                self.operand.addr = vector;
                self.operand.lo = bus.read(vector, self);
                self.p.insert(Status::INTERRUPT);
            }
            5 => {
                let hi = bus.read(self.operand.addr + 1, self);
                self.pc = u16::from_le_bytes([self.operand.lo, hi]);
            }
            step => self.invalid_step(step),
        }
    }

    fn push_cycle(&mut self, bus: &mut CpuBus<'_>, mnemonic: Mnemonic) {
        match self.step {
            0 => {
                let _ = bus.read(self.pc, self);
            }
            1 => {
                let value = if mnemonic == Mnemonic::Php {
                    self.p.pushed_with_break()
                } else {
                    self.a
                };
                self.push(bus, value);
            }
            step => self.invalid_step(step),
        }
    }

    fn pull_cycle(&mut self, bus: &mut CpuBus<'_>, mnemonic: Mnemonic) {
        match self.step {
            0 => {
                let _ = bus.read(self.pc, self);
            }
            1 => {
                let _ = bus.read(self.stack_addr(), self);
            }
            2 => {
                let value = self.pull(bus);
                if mnemonic == Mnemonic::Pla {
                    self.a = value;
                    self.p.set_zn(self.a);
                } else {
                    self.p.load(value);
                }
            }
            step => self.invalid_step(step),
        }
    }

    /// The 7-cycle NMI/IRQ entry sequence. The vector is chosen at fetch
    /// time, so a late NMI hijacks an in-progress IRQ.
    fn service_interrupt(&mut self, bus: &mut CpuBus<'_>) {
        let _ = bus.read(self.pc, self);
        let _ = bus.read(self.pc, self);

        let hi = (self.pc >> 8) as u8;
        let lo = self.pc as u8;
        self.push(bus, hi);
        self.push(bus, lo);

        let status = self.p.pushed_without_break();
        self.push(bus, status);
        self.p.insert(Status::INTERRUPT);

        let vector = if bus.interrupts.take_nmi() {
            NMI_VECTOR_LO
        } else {
            IRQ_VECTOR_LO
        };
        let lo = bus.read(vector, self);
        let hi = bus.read(vector + 1, self);
        self.pc = u16::from_le_bytes([lo, hi]);
    }

    // =====================================================================
    // OAM DMA
    // =====================================================================

    fn handle_oam_dma(&mut self, bus: &mut CpuBus<'_>) -> bool {
        if let Some(mut dma) = self.oam_dma.take() {
            let done = dma.step(self, bus);
            if !done {
                self.oam_dma = Some(dma);
            }
            return true;
        }

        // DMA only begins at an instruction boundary.
        if self.opcode_in_flight.is_none() {
            if let Some(page) = bus.take_oam_dma_request() {
                let start_on_odd_cycle = bus.cycles() & 1 == 1;
                let mut dma = OamDma::new(page, start_on_odd_cycle);
                let done = dma.step(self, bus);
                if !done {
                    self.oam_dma = Some(dma);
                }
                return true;
            }
        }

        false
    }

    // =====================================================================
    // Helpers
    // =====================================================================

    /// Records page-cross state; read-class instructions (`Cycle::Cross`)
    /// skip the fix-up cycle when the page did not change, write/RMW forms
    /// always pay it.
    pub(crate) fn check_cross_page(&mut self, base: u16, addr: u16) {
        self.operand.crossed = (base & 0xFF00) != (addr & 0xFF00);
        if let Some(opcode) = self.opcode_in_flight {
            let instr = &LOOKUP_TABLE[opcode as usize];
            if matches!(instr.cycle, Cycle::Cross(_)) && !self.operand.crossed {
                self.step += 1;
            }
        }
    }

    pub(crate) fn invalid_step(&self, step: u8) {
        debug_assert!(
            false,
            "invalid micro-step {step} for opcode {:02X?}",
            self.opcode_in_flight
        );
        error!(step, opcode = ?self.opcode_in_flight, "invalid CPU micro-step, treating as no-op");
    }

    #[inline]
    pub(crate) fn incr_pc(&mut self) {
        self.pc = self.pc.wrapping_add(1);
    }

    fn finish_instruction(&mut self) {
        self.opcode_in_flight = None;
        self.step = 0;
        self.operand = Operand::default();
    }

    fn stack_addr(&self) -> u16 {
        STACK_PAGE_START | u16::from(self.s)
    }

    fn push(&mut self, bus: &mut CpuBus<'_>, value: u8) {
        bus.write(self.stack_addr(), value, self);
        self.s = self.s.wrapping_sub(1);
    }

    fn pull(&mut self, bus: &mut CpuBus<'_>) -> u8 {
        self.s = self.s.wrapping_add(1);
        bus.read(self.stack_addr(), self)
    }
}

impl Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "A:{:02X} X:{:02X} Y:{:02X} S:{:02X} P:{:02X} PC:{:04X} O:{:02X?} I:{}",
            self.a,
            self.x,
            self.y,
            self.s,
            self.p.bits(),
            self.pc,
            self.opcode_in_flight,
            self.step,
        )
    }
}

impl Display for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} PC:{:04X}",
            self.a,
            self.x,
            self.y,
            self.p.bits(),
            self.s,
            self.pc,
        )
    }
}
