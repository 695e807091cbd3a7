//! Shared definitions for the NES memory map.
//!
//! Keeping every address-related constant in one module keeps the hardware
//! layout in one place and stops magic numbers from spreading through the
//! bus, CPU, and PPU code.

/// CPU memory map details.
pub mod cpu {
    /// First address of internal work RAM.
    pub const INTERNAL_RAM_START: u16 = 0x0000;
    /// Last address of the mirrored work-RAM region.
    pub const INTERNAL_RAM_MIRROR_END: u16 = 0x1FFF;
    /// Physical work RAM size (2 KiB, mirrored four times).
    pub const INTERNAL_RAM_SIZE: usize = 0x0800;
    /// Mask applied to fold mirrors back onto physical RAM.
    pub const INTERNAL_RAM_MASK: u16 = 0x07FF;

    /// First address of the hardware stack page.
    pub const STACK_PAGE_START: u16 = 0x0100;

    /// First CPU-visible PPU register mirror address.
    pub const PPU_REGISTER_BASE: u16 = 0x2000;
    /// Last CPU-visible PPU register mirror address.
    pub const PPU_REGISTER_END: u16 = 0x3FFF;

    /// Start of the APU/I-O register block.
    pub const IO_REGISTER_BASE: u16 = 0x4000;
    /// End of the APU/I-O register block.
    pub const IO_REGISTER_END: u16 = 0x4017;

    /// OAM DMA trigger register (`$4014`).
    pub const OAM_DMA: u16 = 0x4014;
    /// Controller port 1 latch/read register (`$4016`).
    pub const CONTROLLER_PORT_1: u16 = 0x4016;
    /// Controller port 2 read register (`$4017`).
    pub const CONTROLLER_PORT_2: u16 = 0x4017;

    /// Start of cartridge-mapped space (everything past the test-mode block).
    pub const CARTRIDGE_SPACE_BASE: u16 = 0x4018;
    /// PRG RAM window start (`$6000`).
    pub const PRG_RAM_START: u16 = 0x6000;
    /// PRG RAM window end (`$7FFF`).
    pub const PRG_RAM_END: u16 = 0x7FFF;
    /// PRG ROM window start (`$8000`).
    pub const PRG_ROM_START: u16 = 0x8000;
    /// Last CPU address.
    pub const CPU_ADDR_END: u16 = 0xFFFF;

    /// NMI vector (`$FFFA/$FFFB`).
    pub const NMI_VECTOR_LO: u16 = 0xFFFA;
    pub const NMI_VECTOR_HI: u16 = 0xFFFB;
    /// Reset vector (`$FFFC/$FFFD`).
    pub const RESET_VECTOR_LO: u16 = 0xFFFC;
    pub const RESET_VECTOR_HI: u16 = 0xFFFD;
    /// IRQ/BRK vector (`$FFFE/$FFFF`).
    pub const IRQ_VECTOR_LO: u16 = 0xFFFE;
    pub const IRQ_VECTOR_HI: u16 = 0xFFFF;
}

/// PPU register layout and VRAM mirror rules.
pub mod ppu {
    /// Mask for decoding register mirrors (`addr & 0x0007`).
    pub const REGISTER_SELECT_MASK: u16 = 0x0007;

    /// Address mask applied to every PPU bus access (14-bit space).
    pub const VRAM_MIRROR_MASK: u16 = 0x3FFF;

    /// Pattern table base addresses.
    pub const PATTERN_TABLE_0: u16 = 0x0000;
    pub const PATTERN_TABLE_1: u16 = 0x1000;
    /// Total pattern-table space (8 KiB).
    pub const PATTERN_TABLE_SIZE: usize = 0x2000;

    /// Base address of nametable 0.
    pub const NAMETABLE_BASE: u16 = 0x2000;
    /// Size of a single nametable in bytes.
    pub const NAMETABLE_SIZE: u16 = 0x0400;
    /// Internal nametable RAM (CIRAM) size: two 1 KiB tables.
    pub const CIRAM_SIZE: usize = 0x0800;

    /// Palette RAM base address (`$3F00`).
    pub const PALETTE_BASE: u16 = 0x3F00;
    /// Palette RAM byte count (32 bytes, mirrored every 32).
    pub const PALETTE_RAM_SIZE: usize = 0x20;

    /// Primary OAM size (64 sprites x 4 bytes).
    pub const OAM_RAM_SIZE: usize = 0x100;
    /// Secondary OAM size (8 sprites x 4 bytes).
    pub const SECONDARY_OAM_RAM_SIZE: usize = 0x20;

    /// CPU-visible PPU register identifiers.
    #[repr(u16)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Register {
        /// `$2000` - PPUCTRL
        Control = 0x2000,
        /// `$2001` - PPUMASK
        Mask = 0x2001,
        /// `$2002` - PPUSTATUS
        Status = 0x2002,
        /// `$2003` - OAMADDR
        OamAddr = 0x2003,
        /// `$2004` - OAMDATA
        OamData = 0x2004,
        /// `$2005` - PPUSCROLL
        Scroll = 0x2005,
        /// `$2006` - PPUADDR
        Addr = 0x2006,
        /// `$2007` - PPUDATA
        Data = 0x2007,
    }

    impl Register {
        /// Raw address backing the register.
        pub const fn addr(self) -> u16 {
            self as u16
        }

        /// Resolves the canonical register for a CPU address in `$2000-$3FFF`.
        pub const fn from_cpu_addr(addr: u16) -> Self {
            match addr & REGISTER_SELECT_MASK {
                0 => Self::Control,
                1 => Self::Mask,
                2 => Self::Status,
                3 => Self::OamAddr,
                4 => Self::OamData,
                5 => Self::Scroll,
                6 => Self::Addr,
                _ => Self::Data,
            }
        }
    }
}
