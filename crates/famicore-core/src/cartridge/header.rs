//! iNES header parsing.
//!
//! Only the 16-byte iNES 1.0 layout is interpreted: magic, PRG/CHR bank
//! counts, and the flags 6/7 bits the core needs (mirroring, battery,
//! trainer, four-screen, mapper number). NES 2.0 extensions are ignored; a
//! NES 2.0 file still parses as its iNES 1.0 subset.

use bitflags::bitflags;

use crate::error::Error;

/// Length of the iNES header in bytes.
pub const NES_HEADER_LEN: usize = 16;

/// PRG ROM bank granularity (16 KiB).
pub const PRG_BANK_SIZE: usize = 16 * 1024;
/// CHR ROM bank granularity (8 KiB).
pub const CHR_BANK_SIZE: usize = 8 * 1024;
/// Trainer blob size when flags 6 bit 2 is set.
pub const TRAINER_LEN: usize = 512;

const MAGIC: [u8; 4] = [b'N', b'E', b'S', 0x1A];

bitflags! {
    /// Byte 6 of the iNES header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags6: u8 {
        const VERTICAL_MIRRORING = 0b0000_0001;
        const BATTERY            = 0b0000_0010;
        const TRAINER            = 0b0000_0100;
        const FOUR_SCREEN        = 0b0000_1000;
        const MAPPER_LOW         = 0b1111_0000;
    }
}

bitflags! {
    /// Byte 7 of the iNES header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags7: u8 {
        const VS_UNISYSTEM  = 0b0000_0001;
        const PLAYCHOICE_10 = 0b0000_0010;
        const NES2_ID       = 0b0000_1100;
        const MAPPER_HIGH   = 0b1111_0000;
    }
}

/// Nametable layout selected by the cartridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mirroring {
    /// Nametables stacked vertically; `$2000/$2400` share CIRAM page 0.
    Horizontal,
    /// Nametables side by side; `$2000/$2800` share CIRAM page 0.
    Vertical,
    /// Everything maps to CIRAM page 0.
    SingleScreenLower,
    /// Everything maps to CIRAM page 1.
    SingleScreenUpper,
    /// Cartridge supplies its own extra nametable RAM.
    FourScreen,
}

/// Decoded iNES header fields the core cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    pub mapper: u8,
    pub mirroring: Mirroring,
    pub battery_backed: bool,
    pub trainer_present: bool,
    pub prg_rom_size: usize,
    pub chr_rom_size: usize,
}

impl Header {
    /// Parses the 16-byte header, validating magic bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < NES_HEADER_LEN {
            return Err(Error::TooShort { len: bytes.len() });
        }
        if bytes[..4] != MAGIC {
            return Err(Error::InvalidMagic);
        }

        let flags6 = Flags6::from_bits_retain(bytes[6]);
        let flags7 = Flags7::from_bits_retain(bytes[7]);

        let mirroring = if flags6.contains(Flags6::FOUR_SCREEN) {
            Mirroring::FourScreen
        } else if flags6.contains(Flags6::VERTICAL_MIRRORING) {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let mapper = (flags7.bits() & Flags7::MAPPER_HIGH.bits())
            | ((flags6.bits() & Flags6::MAPPER_LOW.bits()) >> 4);

        Ok(Self {
            mapper,
            mirroring,
            battery_backed: flags6.contains(Flags6::BATTERY),
            trainer_present: flags6.contains(Flags6::TRAINER),
            prg_rom_size: bytes[4] as usize * PRG_BANK_SIZE,
            chr_rom_size: bytes[5] as usize * CHR_BANK_SIZE,
        })
    }

    /// `true` when the cartridge ships no CHR ROM and expects 8 KiB CHR RAM.
    pub fn uses_chr_ram(&self) -> bool {
        self.chr_rom_size == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(prg: u8, chr: u8, flags6: u8, flags7: u8) -> [u8; NES_HEADER_LEN] {
        [
            b'N', b'E', b'S', 0x1A, prg, chr, flags6, flags7, 0, 0, 0, 0, 0, 0, 0, 0,
        ]
    }

    #[test]
    fn parses_mapper_from_both_nibbles() {
        let header = Header::parse(&raw(1, 1, 0x40, 0x20)).expect("parse");
        assert_eq!(header.mapper, 0x24);
    }

    #[test]
    fn vertical_bit_selects_vertical_mirroring() {
        let header = Header::parse(&raw(1, 1, 0x01, 0)).expect("parse");
        assert_eq!(header.mirroring, Mirroring::Vertical);
    }

    #[test]
    fn four_screen_wins_over_mirroring_bit() {
        let header = Header::parse(&raw(1, 1, 0x09, 0)).expect("parse");
        assert_eq!(header.mirroring, Mirroring::FourScreen);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = raw(1, 1, 0, 0);
        bytes[0] = b'X';
        assert!(matches!(Header::parse(&bytes), Err(Error::InvalidMagic)));
    }

    #[test]
    fn rejects_short_buffer() {
        assert!(matches!(
            Header::parse(&[0u8; 4]),
            Err(Error::TooShort { len: 4 })
        ));
    }
}
