#![allow(dead_code)]

//! In-memory iNES image builder and run helpers shared by the integration
//! tests. No ROM files are needed: tests assemble tiny programs directly.

use famicore_core::{Nes, cartridge::Cartridge};

/// PRG bank size for the test board (NROM-128, mirrored at `$C000`).
pub const PRG_LEN: usize = 16 * 1024;
/// CHR bank size.
pub const CHR_LEN: usize = 8 * 1024;

/// Builds a mapper-0 iNES image byte by byte.
pub struct RomBuilder {
    prg: Vec<u8>,
    chr: Vec<u8>,
    flags6: u8,
}

impl Default for RomBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RomBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            prg: vec![0; PRG_LEN],
            chr: vec![0; CHR_LEN],
            flags6: 0,
        };
        builder.set_reset_vector(0x8000);
        builder
    }

    /// Copies `bytes` into PRG at the CPU address `addr` (`$8000`-based).
    pub fn program_at(mut self, addr: u16, bytes: &[u8]) -> Self {
        let offset = (addr as usize - 0x8000) % PRG_LEN;
        self.prg[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    /// Main program at the reset target `$8000`.
    pub fn program(self, bytes: &[u8]) -> Self {
        self.program_at(0x8000, bytes)
    }

    pub fn chr_tile(mut self, tile: usize, plane0: [u8; 8], plane1: [u8; 8]) -> Self {
        let base = tile * 16;
        self.chr[base..base + 8].copy_from_slice(&plane0);
        self.chr[base + 8..base + 16].copy_from_slice(&plane1);
        self
    }

    pub fn battery(mut self) -> Self {
        self.flags6 |= 0b0000_0010;
        self
    }

    pub fn reset_vector(mut self, addr: u16) -> Self {
        self.set_reset_vector(addr);
        self
    }

    pub fn nmi_vector(mut self, addr: u16) -> Self {
        self.set_vector(0x3FFA, addr);
        self
    }

    pub fn irq_vector(mut self, addr: u16) -> Self {
        self.set_vector(0x3FFE, addr);
        self
    }

    fn set_reset_vector(&mut self, addr: u16) {
        self.set_vector(0x3FFC, addr);
    }

    fn set_vector(&mut self, prg_offset: usize, addr: u16) {
        self.prg[prg_offset] = addr as u8;
        self.prg[prg_offset + 1] = (addr >> 8) as u8;
    }

    pub fn build(self) -> Vec<u8> {
        let mut image = vec![
            b'N',
            b'E',
            b'S',
            0x1A,
            1,
            1,
            self.flags6,
            0,
            0,
            0,
            0,
            0,
            0,
            0,
            0,
            0,
        ];
        image.extend_from_slice(&self.prg);
        image.extend_from_slice(&self.chr);
        image
    }

    /// Builds the image, inserts it, and returns the powered-on console.
    pub fn into_nes(self) -> Nes {
        let cartridge = Cartridge::new(&self.build()).expect("test ROM parses");
        let mut nes = Nes::new();
        nes.insert_cartridge(cartridge);
        nes
    }
}

/// Console running `program` from `$8000`.
pub fn nes_with_program(program: &[u8]) -> Nes {
    RomBuilder::new().program(program).into_nes()
}

/// Executes the next instruction and returns the CPU cycles it took
/// (interrupt entry sequences and DMA stalls are included in the count).
pub fn step_counted(nes: &mut Nes) -> u64 {
    let before = nes.cpu_cycles();
    nes.step_instruction();
    nes.cpu_cycles() - before
}
