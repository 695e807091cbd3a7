//! CPU interrupt input lines.
//!
//! NMI is edge-triggered: the PPU pulls the line low at VBL start and the
//! transition latches a pending flag that survives until the CPU begins
//! service. IRQ is level-triggered: the line reads high while any source
//! holds it, and the CPU re-samples it every cycle.

use bitflags::bitflags;

bitflags! {
    /// Identifies which peripheral is holding the IRQ line.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IrqSource: u8 {
        /// Cartridge mapper (scanline counters and friends).
        const MAPPER    = 0b0000_0001;
        /// APU frame counter.
        const APU_FRAME = 0b0000_0010;
        /// APU DMC sample fetch.
        const APU_DMC   = 0b0000_0100;
    }
}

impl Default for IrqSource {
    fn default() -> Self {
        Self::empty()
    }
}

/// The CPU-facing interrupt inputs: one NMI edge latch, one ORed IRQ level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InterruptLines {
    nmi_pending: bool,
    irq: IrqSource,
}

impl InterruptLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears both lines (power-on / reset).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Latches an NMI edge. Safe to call repeatedly; the latch stays set
    /// until the CPU consumes it.
    #[inline]
    pub fn raise_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Drops a latched NMI without servicing it (VBL race suppression).
    #[inline]
    pub fn cancel_nmi(&mut self) {
        self.nmi_pending = false;
    }

    /// Consumes the NMI latch; returns whether one was pending.
    #[inline]
    pub fn take_nmi(&mut self) -> bool {
        core::mem::take(&mut self.nmi_pending)
    }

    /// Current NMI latch state, non-destructive.
    #[inline]
    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Asserts the IRQ line on behalf of `source`.
    #[inline]
    pub fn assert_irq(&mut self, source: IrqSource) {
        self.irq.insert(source);
    }

    /// Releases `source`'s hold on the IRQ line.
    #[inline]
    pub fn release_irq(&mut self, source: IrqSource) {
        self.irq.remove(source);
    }

    /// Replaces `source`'s contribution with `level` (for level re-polling).
    #[inline]
    pub fn set_irq(&mut self, source: IrqSource, level: bool) {
        self.irq.set(source, level);
    }

    /// `true` while any source holds the IRQ line.
    #[inline]
    pub fn irq_line(&self) -> bool {
        !self.irq.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nmi_latch_survives_until_taken() {
        let mut lines = InterruptLines::new();
        lines.raise_nmi();
        lines.raise_nmi();
        assert!(lines.nmi_pending());
        assert!(lines.take_nmi());
        assert!(!lines.take_nmi());
    }

    #[test]
    fn irq_is_an_or_of_sources() {
        let mut lines = InterruptLines::new();
        lines.assert_irq(IrqSource::MAPPER);
        lines.assert_irq(IrqSource::APU_FRAME);
        lines.release_irq(IrqSource::MAPPER);
        assert!(lines.irq_line());
        lines.release_irq(IrqSource::APU_FRAME);
        assert!(!lines.irq_line());
    }
}
