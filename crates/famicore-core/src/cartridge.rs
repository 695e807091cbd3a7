//! Cartridge loading and the mapper boundary.

use std::{fs, path::Path};

use crate::{
    cartridge::{
        header::{Header, Mirroring, NES_HEADER_LEN, TRAINER_LEN},
        mapper::{Mapper, build_mapper},
    },
    error::Error,
};

pub mod header;
pub mod mapper;

/// A parsed cartridge: header metadata plus the board that decodes accesses.
#[derive(Debug, Clone)]
pub struct Cartridge {
    pub header: Header,
    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    /// Parses an iNES image from an in-memory byte slice.
    ///
    /// The sections after the header are consumed front to back: optional
    /// trainer, then PRG ROM, then CHR ROM, each sized by the header.
    pub fn new(bytes: &[u8]) -> Result<Self, Error> {
        let header = Header::parse(bytes)?;
        let mut rest = &bytes[NES_HEADER_LEN..];

        let trainer = if header.trainer_present {
            let mut block = [0u8; TRAINER_LEN];
            block.copy_from_slice(split_section(&mut rest, TRAINER_LEN, "trainer")?);
            Some(block)
        } else {
            None
        };

        let prg_rom = split_section(&mut rest, header.prg_rom_size, "PRG ROM")?.to_vec();
        let chr_rom = split_section(&mut rest, header.chr_rom_size, "CHR ROM")?.to_vec();

        let mapper = build_mapper(&header, prg_rom, chr_rom, trainer)?;
        Ok(Self { header, mapper })
    }

    /// Loads and parses a cartridge directly from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let bytes = fs::read(path)?;
        Self::new(&bytes)
    }

    /// CPU-side access, `$4018-$FFFF`. `None` means open bus.
    #[inline]
    pub fn cpu_read(&mut self, addr: u16) -> Option<u8> {
        self.mapper.cpu_read(addr)
    }

    #[inline]
    pub fn cpu_write(&mut self, addr: u16, data: u8) {
        self.mapper.cpu_write(addr, data);
    }

    /// PPU-side pattern access, `$0000-$1FFF`. `None` means the board does
    /// not drive CHR and the PPU's fallback pattern RAM applies.
    #[inline]
    pub fn ppu_read(&mut self, addr: u16) -> Option<u8> {
        self.mapper.ppu_read(addr)
    }

    #[inline]
    pub fn ppu_write(&mut self, addr: u16, data: u8) -> bool {
        self.mapper.ppu_write(addr, data)
    }

    #[inline]
    pub fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring()
    }

    /// Level of the board's IRQ output.
    #[inline]
    pub fn irq_line(&self) -> bool {
        self.mapper.irq_line()
    }

    /// Forwards a debounced PPU A12 rising edge to the board.
    #[inline]
    pub fn a12_rise(&mut self) {
        self.mapper.a12_rise();
    }

    /// Battery-backed RAM contents for persistence, when present.
    pub fn sram(&self) -> Option<&[u8]> {
        self.mapper.save_ram()
    }

    /// Restores battery-backed RAM from a previously saved buffer.
    pub fn load_sram(&mut self, bytes: &[u8]) {
        if let Some(ram) = self.mapper.save_ram_mut() {
            let len = ram.len().min(bytes.len());
            ram[..len].copy_from_slice(&bytes[..len]);
        }
    }
}

/// Splits the next `len` bytes off the front of `rest`, naming the section
/// that ran dry when the image is shorter than its header claims.
fn split_section<'a>(
    rest: &mut &'a [u8],
    len: usize,
    section: &'static str,
) -> Result<&'a [u8], Error> {
    if rest.len() < len {
        return Err(Error::Truncated {
            section,
            needed: len,
            available: rest.len(),
        });
    }
    let (block, tail) = rest.split_at(len);
    *rest = tail;
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_header(prg_banks: u8, chr_banks: u8, flags6: u8) -> [u8; NES_HEADER_LEN] {
        [
            b'N', b'E', b'S', 0x1A, prg_banks, chr_banks, flags6, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ]
    }

    #[test]
    fn parses_basic_cartridge() {
        let mut rom = base_header(1, 1, 0).to_vec();
        rom.extend(vec![0xAA; 16 * 1024]);
        rom.extend(vec![0x55; 8 * 1024]);

        let mut cartridge = Cartridge::new(&rom).expect("parse cartridge");
        assert_eq!(cartridge.header.prg_rom_size, 16 * 1024);
        assert_eq!(cartridge.cpu_read(0x8000), Some(0xAA));
        assert_eq!(cartridge.ppu_read(0x0000), Some(0x55));
    }

    #[test]
    fn errors_when_prg_section_missing() {
        let mut rom = base_header(1, 0, 0).to_vec();
        rom.extend(vec![0xAA; 1024]);

        let err = Cartridge::new(&rom).expect_err("should fail");
        assert!(matches!(
            err,
            Error::Truncated {
                section: "PRG ROM",
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_mapper() {
        let mut rom = base_header(1, 0, 0xF0).to_vec();
        rom.extend(vec![0; 16 * 1024]);
        assert!(matches!(
            Cartridge::new(&rom),
            Err(Error::UnsupportedMapper(0x0F))
        ));
    }

    #[test]
    fn battery_flag_exposes_sram() {
        let mut rom = base_header(1, 1, 0b0000_0010).to_vec();
        rom.extend(vec![0; 16 * 1024]);
        rom.extend(vec![0; 8 * 1024]);

        let mut cartridge = Cartridge::new(&rom).expect("parse cartridge");
        assert!(cartridge.sram().is_some());

        cartridge.load_sram(&[0xDE; 16]);
        assert_eq!(cartridge.cpu_read(0x6000), Some(0xDE));
    }
}
