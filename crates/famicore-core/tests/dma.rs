//! OAM DMA stall length and transfer contents.

mod common;

use common::{RomBuilder, step_counted};

/// The DMA source page lives in PRG ROM at `$8100` so its contents are
/// fully under test control.
fn dma_rom() -> RomBuilder {
    let pattern: Vec<u8> = (0..=255u8).map(|i| i.wrapping_mul(3)).collect();
    RomBuilder::new()
        .program(&[
            0xA9, 0x81, // LDA #$81
            0x8D, 0x14, 0x40, // STA $4014
            0xEA, // NOP
            0xA9, 0x05, // LDA #$05
            0x8D, 0x03, 0x20, // STA $2003
            0xEA, // NOP (spacer; host peeks $2004 here)
        ])
        .program_at(0x8100, &pattern)
}

#[test]
fn oam_dma_stalls_for_513_or_514_cycles() {
    let mut nes = dma_rom().into_nes();

    nes.step_instruction(); // LDA #$81
    nes.step_instruction(); // STA $4014 arms the DMA
    // The NOP only executes once the 513/514-cycle transfer drains.
    let stalled = step_counted(&mut nes);
    assert!(
        stalled == 513 + 2 || stalled == 514 + 2,
        "DMA stall was {} cycles",
        stalled - 2
    );
}

#[test]
fn oam_dma_copies_all_256_bytes() {
    let mut nes = dma_rom().into_nes();

    for _ in 0..5 {
        nes.step_instruction();
    }
    // OAMADDR is now 5; $2004 peeks read OAM[5].
    assert_eq!(nes.peek_cpu_byte(0x2004), 5u8.wrapping_mul(3));

    // The final byte written came from the end of the source page.
    let mut probe = dma_rom()
        .program_at(0x8006, &[0xA9, 0xFF, 0x8D, 0x03, 0x20, 0xEA])
        .into_nes();
    for _ in 0..5 {
        probe.step_instruction();
    }
    assert_eq!(probe.peek_cpu_byte(0x2004), 255u8.wrapping_mul(3));
}
