//! famicore: a cycle-accurate NTSC NES core (2A03 CPU + 2C02 PPU + bus).
//!
//! The console is a single `Nes` value that owns every device. One master
//! step is one CPU cycle: the bus runs three PPU dots, then the CPU runs
//! one cycle and samples the interrupt lines. `tick_until_vsync` drives
//! master steps until the PPU finishes a frame.

use std::path::Path;

use crate::{
    bus::{OpenBus, PendingDma, cpu::CpuBus},
    cartridge::Cartridge,
    controller::{Button, Controller, ControllerPorts},
    cpu::Cpu,
    error::Error,
    interrupt::InterruptLines,
    mem_block::cpu::Ram,
    ppu::Ppu,
    reset_kind::ResetKind,
};

pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod interrupt;
pub mod mem_block;
pub mod memory;
pub mod ppu;
pub mod reset_kind;

pub use cpu::CpuSnapshot;
pub use interrupt::IrqSource;
pub use ppu::palette::{MASTER_PALETTE, Rgb};
pub use ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

macro_rules! nes_cpu_bus {
    ($nes:ident) => {
        CpuBus {
            ram: &mut $nes.ram,
            ppu: &mut $nes.ppu,
            cartridge: $nes.cartridge.as_mut(),
            controllers: &mut $nes.controllers,
            interrupts: &mut $nes.interrupts,
            open_bus: &mut $nes.open_bus,
            cycles: &mut $nes.cycles,
            pending_dma: &mut $nes.pending_dma,
        }
    };
}

#[derive(Debug)]
pub struct Nes {
    pub cpu: Cpu,
    pub ppu: Ppu,
    ram: Ram,
    cartridge: Option<Cartridge>,
    controllers: ControllerPorts,
    interrupts: InterruptLines,
    open_bus: OpenBus,
    pending_dma: PendingDma,
    /// CPU cycles since power-on.
    cycles: u64,
}

impl Nes {
    /// Constructs a powered-on console with no cartridge inserted.
    pub fn new() -> Self {
        let mut nes = Self {
            cpu: Cpu::new(),
            ppu: Ppu::new(),
            ram: Ram::new(),
            cartridge: None,
            controllers: [Controller::new(), Controller::new()],
            interrupts: InterruptLines::new(),
            open_bus: OpenBus::new(),
            pending_dma: PendingDma::default(),
            cycles: 0,
        };
        nes.reset(ResetKind::PowerOn);
        nes
    }

    /// Applies a power-on or soft reset.
    ///
    /// Power-on clears work RAM and fully reinitializes CPU and PPU; a
    /// soft reset preserves RAM, sets the CPU I flag, and arms the PPU's
    /// write-ignore warm-up window.
    pub fn reset(&mut self, kind: ResetKind) {
        if kind == ResetKind::PowerOn {
            self.ram.fill(0);
            self.cycles = 0;
        }
        self.ppu.reset(kind);
        self.interrupts.reset();
        self.open_bus.reset();
        self.pending_dma = PendingDma::default();

        let mut bus = nes_cpu_bus!(self);
        self.cpu.reset(&mut bus, kind);
    }

    /// Loads a cartridge image from disk and inserts it.
    pub fn load_cartridge_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        let cartridge = Cartridge::from_file(path)?;
        self.insert_cartridge(cartridge);
        Ok(())
    }

    /// Inserts a cartridge. Swapping cartridges is a power cycle.
    pub fn insert_cartridge(&mut self, cartridge: Cartridge) {
        self.cartridge = Some(cartridge);
        self.reset(ResetKind::PowerOn);
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    /// Advances the console by one CPU cycle (three PPU dots).
    pub fn step_cpu_cycle(&mut self) {
        let mut bus = nes_cpu_bus!(self);
        self.cpu.step(&mut bus);
    }

    /// Runs master steps until the PPU completes the frame in progress.
    pub fn tick_until_vsync(&mut self) {
        let target = self.ppu.frame_count() + 1;
        while self.ppu.frame_count() < target {
            self.step_cpu_cycle();
        }
    }

    /// Executes until the next instruction boundary.
    pub fn step_instruction(&mut self) {
        let mut seen_active = false;
        loop {
            self.step_cpu_cycle();
            if self.cpu.opcode_active() {
                seen_active = true;
            } else if seen_active {
                break;
            }
        }
    }

    /// Indexed 256x240 frame buffer (one master-palette index per pixel).
    pub fn frame_buffer(&self) -> &[u8] {
        self.ppu.frame_buffer()
    }

    /// Frames completed since power-on.
    pub fn frame_count(&self) -> u64 {
        self.ppu.frame_count()
    }

    /// CPU cycles executed since power-on.
    pub fn cpu_cycles(&self) -> u64 {
        self.cycles
    }

    /// PPU dots ticked since power-on.
    pub fn ppu_dots(&self) -> u64 {
        self.ppu.total_dots()
    }

    /// Asserts the IRQ line on behalf of an external peripheral (the APU
    /// lines live outside the core).
    pub fn assert_irq(&mut self, source: IrqSource) {
        self.interrupts.assert_irq(source);
    }

    /// Releases an external peripheral's hold on the IRQ line.
    pub fn release_irq(&mut self, source: IrqSource) {
        self.interrupts.release_irq(source);
    }

    /// Updates the pressed state of a controller button (port 0 or 1).
    pub fn set_button(&mut self, port: usize, button: Button, pressed: bool) {
        if let Some(pad) = self.controllers.get_mut(port) {
            pad.set_button(button, pressed);
        }
    }

    /// CPU register snapshot for tracing and tests.
    pub fn cpu_snapshot(&self) -> CpuSnapshot {
        self.cpu.snapshot()
    }

    /// Reads a CPU-visible byte without side effects.
    pub fn peek_cpu_byte(&mut self, addr: u16) -> u8 {
        let mut bus = nes_cpu_bus!(self);
        bus.peek(addr)
    }

    /// Reads a contiguous CPU-visible range into `buffer`, starting at
    /// `base`, without side effects.
    pub fn peek_cpu_slice(&mut self, base: u16, buffer: &mut [u8]) {
        let mut bus = nes_cpu_bus!(self);
        for (offset, byte) in buffer.iter_mut().enumerate() {
            *byte = bus.peek(base.wrapping_add(offset as u16));
        }
    }

    /// Battery-backed cartridge RAM, when the inserted board persists any.
    pub fn sram(&self) -> Option<&[u8]> {
        self.cartridge.as_ref().and_then(Cartridge::sram)
    }

    /// Restores battery-backed cartridge RAM from a saved buffer.
    pub fn load_sram(&mut self, bytes: &[u8]) {
        if let Some(cart) = self.cartridge.as_mut() {
            cart.load_sram(bytes);
        }
    }
}

impl Default for Nes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use ctor::ctor;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    #[ctor]
    fn init_tracing() {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::WARN)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}
