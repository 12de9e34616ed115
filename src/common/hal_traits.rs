// src/common/hal_traits.rs

use super::registers::{Control, Status};

/// Access to the USART register set.
///
/// Implementations bind these accessors to the real peripheral (see
/// [`MmioRegisters`](crate::mmio::MmioRegisters)) or to a simulation. Each
/// call maps to exactly one register access, so bit layouts and access
/// order are preserved. Register access on this peripheral cannot fail.
pub trait UsartRegisters {
    /// Reads `UCSRA`.
    fn read_status(&self) -> Status;

    /// Writes the writable bits of `UCSRA` (`U2X`, `MPCM`, and `TXC` to clear it).
    fn write_status(&mut self, status: Status);

    /// Writes `UCSRB`.
    fn write_control(&mut self, control: Control);

    /// Writes the divisor, high byte (`UBRRH`) before low byte (`UBRRL`).
    fn write_divisor(&mut self, divisor: u16);

    /// Writes `UCSRC`. The caller includes the register select bit.
    fn write_mode(&mut self, mode: u8);

    /// Reads `UDR`, popping the receive buffer.
    fn read_data(&mut self) -> u8;

    /// Writes `UDR`, starting a transmission.
    fn write_data(&mut self, byte: u8);
}

impl<T: UsartRegisters + ?Sized> UsartRegisters for &mut T {
    fn read_status(&self) -> Status {
        (**self).read_status()
    }

    fn write_status(&mut self, status: Status) {
        (**self).write_status(status)
    }

    fn write_control(&mut self, control: Control) {
        (**self).write_control(control)
    }

    fn write_divisor(&mut self, divisor: u16) {
        (**self).write_divisor(divisor)
    }

    fn write_mode(&mut self, mode: u8) {
        (**self).write_mode(mode)
    }

    fn read_data(&mut self) -> u8 {
        (**self).read_data()
    }

    fn write_data(&mut self, byte: u8) {
        (**self).write_data(byte)
    }
}

/// Byte reads from a read-only address space, such as program flash on
/// Harvard-architecture parts.
pub trait ProgramMemory {
    /// Returns the byte stored at `addr`.
    fn read_byte(&self, addr: usize) -> u8;
}

/// A slice stands in for flash on hosts. Reads past the end return NUL.
impl ProgramMemory for [u8] {
    fn read_byte(&self, addr: usize) -> u8 {
        self.get(addr).copied().unwrap_or(0)
    }
}

/// Any `Fn(usize) -> u8`, e.g. a wrapper around the target's `lpm` load.
impl<F> ProgramMemory for F
where
    F: Fn(usize) -> u8,
{
    fn read_byte(&self, addr: usize) -> u8 {
        self(addr)
    }
}
