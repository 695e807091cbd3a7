//! The cartridge mapper contract.
//!
//! Mappers own PRG/CHR banking, nametable layout, and (for boards like MMC3)
//! an IRQ line clocked by PPU A12 rising edges. The core only talks to this
//! trait; concrete boards beyond NROM live outside the tree.

use std::fmt::Debug;

use dyn_clone::DynClone;

use crate::{
    cartridge::header::{Header, Mirroring},
    error::Error,
};

pub mod nrom;

/// Interface every cartridge board implements.
///
/// Address conventions:
/// - `cpu_*` receive the full CPU address (`$4018-$FFFF` is routed here, the
///   bus also forwards `$4018-$5FFF` so expansion hardware can claim it).
/// - `ppu_*` receive pattern-table addresses (`$0000-$1FFF`).
///
/// Returning `None` from a read means the board does not drive the bus for
/// that address and open-bus (CPU) or fallback CHR RAM (PPU) applies.
pub trait Mapper: DynClone + Debug {
    fn cpu_read(&mut self, addr: u16) -> Option<u8>;

    fn cpu_write(&mut self, addr: u16, data: u8);

    fn ppu_read(&mut self, addr: u16) -> Option<u8>;

    /// Returns `true` when the board claimed the write (CHR RAM boards).
    fn ppu_write(&mut self, addr: u16, data: u8) -> bool;

    /// Current nametable layout. Boards with mirroring control re-derive it
    /// from their registers on every call.
    fn mirroring(&self) -> Mirroring;

    /// Level of the board's IRQ output. Re-polled every CPU cycle.
    fn irq_line(&self) -> bool {
        false
    }

    /// Debounced PPU A12 rising edge (scanline-counter clock for MMC3-style
    /// boards). The default board has no counter to clock.
    fn a12_rise(&mut self) {}

    /// Battery-backed PRG RAM contents, when the board persists any.
    fn save_ram(&self) -> Option<&[u8]> {
        None
    }

    fn save_ram_mut(&mut self) -> Option<&mut [u8]> {
        None
    }
}

dyn_clone::clone_trait_object!(Mapper);

/// Instantiates the board named by the header.
pub fn build_mapper(
    header: &Header,
    prg_rom: Vec<u8>,
    chr_rom: Vec<u8>,
    trainer: Option<[u8; 512]>,
) -> Result<Box<dyn Mapper>, Error> {
    match header.mapper {
        0 => Ok(Box::new(nrom::Nrom::new(header, prg_rom, chr_rom, trainer))),
        id => Err(Error::UnsupportedMapper(id)),
    }
}
