use bitflags::bitflags;

bitflags! {
    /// The 8-bit processor status register (P).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N V U B D I Z C
    /// ```
    /// U reads as 1 in-register. B is not a real flag: it only exists in
    /// the byte pushed to the stack (1 for PHP/BRK, 0 for NMI/IRQ).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Status: u8 {
        /// Carry (C): set by additions out of bit 7 and shifts/compares.
        const CARRY     = 0b0000_0001;
        /// Zero (Z): result was zero.
        const ZERO      = 0b0000_0010;
        /// Interrupt disable (I): masks IRQ while set.
        const INTERRUPT = 0b0000_0100;
        /// Decimal (D): stored but has no effect on the 2A03.
        const DECIMAL   = 0b0000_1000;
        /// Break (B): only meaningful in pushed copies of P.
        const BREAK     = 0b0001_0000;
        /// Unused (U): always 1 in-register.
        const UNUSED    = 0b0010_0000;
        /// Overflow (V): signed arithmetic overflow.
        const OVERFLOW  = 0b0100_0000;
        /// Negative (N): bit 7 of the last result.
        const NEGATIVE  = 0b1000_0000;
    }
}

impl Status {
    /// Updates Z and N from a result byte.
    #[inline]
    pub(crate) fn set_zn(&mut self, value: u8) {
        self.set(Status::ZERO, value == 0);
        self.set(Status::NEGATIVE, value & 0x80 != 0);
    }

    #[inline]
    pub(crate) fn set_c(&mut self, value: bool) {
        self.set(Status::CARRY, value);
    }

    #[inline]
    pub(crate) fn set_v(&mut self, value: bool) {
        self.set(Status::OVERFLOW, value);
    }

    #[inline]
    pub(crate) fn carry(&self) -> u8 {
        (*self & Status::CARRY).bits()
    }

    /// Restores P from a pulled stack byte: U forced on, B never stored.
    #[inline]
    pub(crate) fn load(&mut self, byte: u8) {
        *self = (Status::from_bits_retain(byte) | Status::UNUSED) - Status::BREAK;
    }

    /// The byte pushed by PHP/BRK (B and U forced on).
    #[inline]
    pub(crate) fn pushed_with_break(&self) -> u8 {
        (*self | Status::UNUSED | Status::BREAK).bits()
    }

    /// The byte pushed during NMI/IRQ entry (U on, B off).
    #[inline]
    pub(crate) fn pushed_without_break(&self) -> u8 {
        ((*self | Status::UNUSED) - Status::BREAK).bits()
    }
}
