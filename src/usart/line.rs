// src/usart/line.rs

//! Line reception with backspace editing and CR/LF normalization.
//!
//! State machine, per received byte:
//!
//! * CR or LF ends the line. After a CR, a byte that is already waiting is
//!   inspected: LF is swallowed (CR+LF counts as one terminator), anything
//!   else is pushed back for the next read.
//! * BS or DEL with at least one stored byte erases the last byte and echoes
//!   `" \x08"` so the terminal blanks it.
//! * Anything else is stored, including BS/DEL on an empty line.
//!
//! No other bytes are echoed.

use super::Usart;
use crate::common::hal_traits::UsartRegisters;

pub const CR: u8 = b'\r';
pub const LF: u8 = b'\n';
pub const BACKSPACE: u8 = 0x08;
pub const DELETE: u8 = 0x7F;
/// Written after the last data byte by [`Usart::receive_line`].
pub const LINE_TERMINATOR: u8 = 0x00;

impl<R, const F_CPU: u32> Usart<R, F_CPU>
where
    R: UsartRegisters,
{
    /// Receives one line into `buf`, blocking until a terminator arrives or
    /// `buf.len() - 1` bytes have been stored.
    ///
    /// The data is followed by a NUL at `buf[count]`; `count` is returned and
    /// excludes the NUL and the line terminator. Nothing outside `buf` is
    /// written. An empty `buf` returns 0 without reading.
    pub fn receive_line(&mut self, buf: &mut [u8]) -> usize {
        let Some(limit) = buf.len().checked_sub(1) else {
            return 0;
        };
        let count = self.collect_line(&mut buf[..limit]);
        buf[count] = LINE_TERMINATOR;
        count
    }

    /// Receives one line of at most `N` bytes into an owned buffer.
    #[cfg(feature = "heapless")]
    pub fn read_line<const N: usize>(&mut self) -> heapless::Vec<u8, N> {
        let mut scratch = [0u8; N];
        let count = self.collect_line(&mut scratch);
        heapless::Vec::from_slice(&scratch[..count]).unwrap_or_default()
    }

    /// Runs the editing state machine until a terminator or until `data` is
    /// full. Returns the number of bytes stored at the front of `data`.
    fn collect_line(&mut self, data: &mut [u8]) -> usize {
        let mut idx = 0;

        while idx < data.len() {
            let byte = self.recv_byte();
            match byte {
                CR | LF => {
                    if byte == CR && self.data_available() {
                        let next = self.recv_byte();
                        if next != LF {
                            self.push_back(next);
                        }
                    }
                    break;
                }
                BACKSPACE | DELETE if idx > 0 => {
                    idx -= 1;
                    self.send_byte(b' ');
                    self.send_byte(BACKSPACE);
                }
                _ => {
                    data[idx] = byte;
                    idx += 1;
                }
            }
        }

        idx
    }
}
