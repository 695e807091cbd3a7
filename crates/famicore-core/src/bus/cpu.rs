//! CPU-visible address decode and the system's master clock.
//!
//! `CpuBus` borrows every device for the duration of one CPU call. Each
//! read or write is one CPU cycle: the bus first advances the PPU three
//! dots (so all PPU side effects of this master tick are visible to the
//! CPU), performs the access, latches the data bus, then lets the CPU
//! sample the interrupt lines.

use crate::{
    bus::{OpenBus, PendingDma},
    cartridge::Cartridge,
    controller::ControllerPorts,
    cpu::Cpu,
    interrupt::{InterruptLines, IrqSource},
    mem_block::cpu::Ram,
    memory::cpu as cpu_mem,
    ppu::{ChrBus, Ppu},
};

pub(crate) struct CpuBus<'a> {
    pub(crate) ram: &'a mut Ram,
    pub(crate) ppu: &'a mut Ppu,
    pub(crate) cartridge: Option<&'a mut Cartridge>,
    pub(crate) controllers: &'a mut ControllerPorts,
    pub(crate) interrupts: &'a mut InterruptLines,
    pub(crate) open_bus: &'a mut OpenBus,
    pub(crate) cycles: &'a mut u64,
    pub(crate) pending_dma: &'a mut PendingDma,
}

impl<'a> CpuBus<'a> {
    /// One timed bus read (one CPU cycle).
    pub(crate) fn read(&mut self, addr: u16, cpu: &mut Cpu) -> u8 {
        self.begin_cycle();
        let value = self.decode_read(addr);
        self.open_bus.latch(value);
        cpu.end_cycle(self.interrupts);
        value
    }

    /// One timed bus write (one CPU cycle).
    pub(crate) fn write(&mut self, addr: u16, data: u8, cpu: &mut Cpu) {
        self.begin_cycle();
        self.open_bus.latch(data);
        self.decode_write(addr, data);
        cpu.end_cycle(self.interrupts);
    }

    /// Side-effect-free read: no clocking, no latches, no register
    /// mutation. Used by the reset sequence, tests, and debuggers.
    pub(crate) fn peek(&mut self, addr: u16) -> u8 {
        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize]
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => {
                self.ppu.cpu_register_peek(addr)
            }
            cpu_mem::CONTROLLER_PORT_1 => {
                self.controllers[0].peek() | (self.open_bus.sample() & 0xE0)
            }
            cpu_mem::CONTROLLER_PORT_2 => {
                self.controllers[1].peek() | (self.open_bus.sample() & 0xE0)
            }
            cpu_mem::IO_REGISTER_BASE..=cpu_mem::OAM_DMA | 0x4015 => self.open_bus.sample(),
            _ => self
                .cartridge
                .as_deref_mut()
                .and_then(|cart| cart.cpu_read(addr))
                .unwrap_or_else(|| self.open_bus.sample()),
        }
    }

    /// Pending OAM DMA page from a `$4014` write, if any.
    pub(crate) fn take_oam_dma_request(&mut self) -> Option<u8> {
        self.pending_dma.take()
    }

    /// CPU cycles since power-on.
    pub(crate) fn cycles(&self) -> u64 {
        *self.cycles
    }

    /// Advances system time by one CPU cycle: three PPU dots, then a fresh
    /// sample of the mapper IRQ level.
    fn begin_cycle(&mut self) {
        *self.cycles += 1;

        let mut chr = ChrBus::new(self.cartridge.as_deref_mut());
        for _ in 0..3 {
            self.ppu.tick(&mut chr, self.interrupts);
        }
        drop(chr);

        let mapper_irq = self
            .cartridge
            .as_deref()
            .map(Cartridge::irq_line)
            .unwrap_or(false);
        self.interrupts.set_irq(IrqSource::MAPPER, mapper_irq);
    }

    fn decode_read(&mut self, addr: u16) -> u8 {
        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize]
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => {
                let mut chr = ChrBus::new(self.cartridge.as_deref_mut());
                self.ppu.cpu_register_read(addr, &mut chr, self.interrupts)
            }
            cpu_mem::CONTROLLER_PORT_1 => {
                self.controllers[0].read() | (self.open_bus.sample() & 0xE0)
            }
            cpu_mem::CONTROLLER_PORT_2 => {
                self.controllers[1].read() | (self.open_bus.sample() & 0xE0)
            }
            // APU registers and the write-only DMA port float the bus.
            cpu_mem::IO_REGISTER_BASE..=cpu_mem::OAM_DMA | 0x4015 => self.open_bus.sample(),
            _ => self
                .cartridge
                .as_deref_mut()
                .and_then(|cart| cart.cpu_read(addr))
                .unwrap_or_else(|| self.open_bus.sample()),
        }
    }

    fn decode_write(&mut self, addr: u16, data: u8) {
        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize] = data;
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => {
                let mut chr = ChrBus::new(self.cartridge.as_deref_mut());
                self.ppu
                    .cpu_register_write(addr, data, &mut chr, self.interrupts);
            }
            cpu_mem::OAM_DMA => self.pending_dma.request(data),
            cpu_mem::CONTROLLER_PORT_1 => {
                for pad in self.controllers.iter_mut() {
                    pad.write_strobe(data);
                }
            }
            // Remaining APU/frame-counter registers are out of scope.
            cpu_mem::IO_REGISTER_BASE..=cpu_mem::IO_REGISTER_END => {}
            _ => {
                if let Some(cart) = self.cartridge.as_deref_mut() {
                    cart.cpu_write(addr, data);
                }
            }
        }
    }
}
