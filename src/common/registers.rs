// src/common/registers.rs

//! Bit layouts of the USART register set.
//!
//! Bit positions follow the ATmega16/32 datasheet. `UBRRH` and `UCSRC` share
//! one I/O address on these parts; [`mode::URSEL`] selects `UCSRC` on writes.

use bitflags::bitflags;

/// Largest value the 12-bit `UBRRH:UBRRL` pair can hold.
pub const DIVISOR_MAX: u16 = 0x0FFF;

/// Largest divisor accepted before falling back from double to normal speed.
pub const DOUBLE_SPEED_DIVISOR_MAX: u16 = 0x00FF;

bitflags! {
    /// Control and Status Register A (`UCSRA`).
    ///
    /// `RXC`, `UDRE`, `FE`, `DOR` and `PE` are read-only status bits. `TXC`
    /// is cleared by writing a one to it; `U2X` and `MPCM` are plain
    /// read/write configuration bits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Status: u8 {
        /// Receive complete: unread data is waiting in `UDR`.
        const RXC = 1 << 7;
        /// Transmit complete: the shift register and `UDR` are both empty.
        const TXC = 1 << 6;
        /// Data register empty: `UDR` can accept a new byte.
        const UDRE = 1 << 5;
        /// Frame error on the byte currently in the receive buffer.
        const FE = 1 << 4;
        /// Data overrun: a byte was lost before `UDR` was read.
        const DOR = 1 << 3;
        /// Parity error on the byte currently in the receive buffer.
        const PE = 1 << 2;
        /// Double transmission speed (8 samples per bit).
        const U2X = 1 << 1;
        /// Multi-processor communication mode.
        const MPCM = 1 << 0;
    }
}

impl Status {
    /// Line error bits latched alongside a received byte.
    pub const LINE_ERRORS: Status = Status::FE.union(Status::DOR).union(Status::PE);
}

bitflags! {
    /// Control and Status Register B (`UCSRB`).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Control: u8 {
        const RXCIE = 1 << 7;
        const TXCIE = 1 << 6;
        const UDRIE = 1 << 5;
        /// Receiver enable.
        const RXEN = 1 << 4;
        /// Transmitter enable.
        const TXEN = 1 << 3;
        /// Character size bit 2 (9-bit frames only).
        const UCSZ2 = 1 << 2;
        const RXB8 = 1 << 1;
        const TXB8 = 1 << 0;
    }
}

/// Bit positions of the mode register (`UCSRC`).
pub mod mode {
    /// Register select: must be set for a write to land in `UCSRC` instead of `UBRRH`.
    pub const URSEL: u8 = 1 << 7;
    /// Synchronous mode select. Always cleared by this driver.
    pub const UMSEL: u8 = 1 << 6;
    pub const UPM1: u8 = 1 << 5;
    pub const UPM0: u8 = 1 << 4;
    /// Stop bit select: set for two stop bits.
    pub const USBS: u8 = 1 << 3;
    pub const UCSZ1: u8 = 1 << 2;
    pub const UCSZ0: u8 = 1 << 1;
    /// Clock polarity, synchronous mode only.
    pub const UCPOL: u8 = 1 << 0;

    /// Character size field.
    pub const CHAR_SIZE_MASK: u8 = UCSZ1 | UCSZ0;
    pub const CHAR_SIZE_SHIFT: u8 = 1;
    /// Stop bit field.
    pub const STOP_BITS_MASK: u8 = USBS;
    /// Parity mode field.
    pub const PARITY_MASK: u8 = UPM1 | UPM0;
}
