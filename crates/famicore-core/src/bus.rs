//! CPU-side system bus.

pub(crate) mod cpu;
pub(crate) mod open_bus;

pub(crate) use open_bus::OpenBus;

/// Mailbox for a `$4014` write: the CPU picks the DMA up at its next
/// instruction boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct PendingDma(Option<u8>);

impl PendingDma {
    pub(crate) fn request(&mut self, page: u8) {
        self.0 = Some(page);
    }

    pub(crate) fn take(&mut self) -> Option<u8> {
        self.0.take()
    }
}
