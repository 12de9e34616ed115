// src/usart/mod.rs

//! Polling USART driver.
//!
//! Every blocking call busy-waits on a status flag with no timeout. The
//! non-blocking `try_*` primitives return `nb::Error::WouldBlock` instead, and
//! the `timeout` module (feature `embedded-hal`) bounds waits with a delay
//! source.

mod format;
mod line;
#[cfg(feature = "embedded-hal")]
mod timeout;

pub use format::MAX_DECIMAL_DIGITS;
pub use line::{BACKSPACE, CR, DELETE, LF, LINE_TERMINATOR};
#[cfg(feature = "embedded-hal")]
pub use timeout::POLL_INTERVAL_US;

use crate::common::{
    config::{configure, Configuration, UsartConfig},
    error::{ConfigError, ReceiveError},
    hal_traits::{ProgramMemory, UsartRegisters},
    registers::{mode, Control, Status, DIVISOR_MAX},
    timing::{BaudRequest, SpeedMode, DEFAULT_F_CPU},
};
use core::convert::Infallible;
use core::fmt;

/// Driver for one USART, clocked at `F_CPU` Hz.
///
/// Owning the register binding makes the driver the only reader and writer
/// of the peripheral. Every operation that changes peripheral or driver state
/// takes `&mut self`, so a reconfiguration can never overlap a transfer.
///
/// The driver keeps one byte of state besides the hardware: a push-back slot
/// holding the byte that followed a lone CR in [`receive_line`](Self::receive_line).
#[derive(Debug)]
pub struct Usart<R, const F_CPU: u32 = DEFAULT_F_CPU> {
    regs: R,
    pushback: Option<u8>,
}

impl<R, const F_CPU: u32> Usart<R, F_CPU>
where
    R: UsartRegisters,
{
    /// Reference clock this driver computes divisors for.
    pub const CLOCK_HZ: u32 = F_CPU;

    /// Wraps the registers without touching them. Call [`configure`](Self::configure) next.
    pub fn new(regs: R) -> Self {
        Usart { regs, pushback: None }
    }

    /// Wraps the registers and applies `config`.
    pub fn with_config<B: BaudRequest>(regs: R, config: &UsartConfig<B>) -> Result<Self, ConfigError> {
        let mut usart = Self::new(regs);
        usart.configure(config)?;
        Ok(usart)
    }

    /// Derives the divisor, speed mode and mode byte for `config` and writes
    /// them to the peripheral, enabling both receiver and transmitter.
    ///
    /// Calling this again fully replaces the previous configuration. On error
    /// nothing is written.
    pub fn configure<B: BaudRequest>(&mut self, config: &UsartConfig<B>) -> Result<Configuration, ConfigError> {
        let configuration = configure::<F_CPU, B>(config).inspect_err(|e| {
            warn!("usart: rejected configuration for {} baud: {:?}", config.baud.bps(), e);
        })?;
        self.apply(&configuration)?;
        Ok(configuration)
    }

    /// Writes an already derived configuration to the peripheral.
    ///
    /// A divisor wider than the 12-bit `UBRR` is rejected before any register
    /// is touched.
    pub fn apply(&mut self, configuration: &Configuration) -> Result<(), ConfigError> {
        let setting = configuration.setting;
        if setting.divisor > DIVISOR_MAX {
            warn!("usart: divisor {} does not fit UBRR", setting.divisor);
            return Err(ConfigError::DivisorOverflow {
                divisor: setting.divisor as u32,
                max: DIVISOR_MAX,
            });
        }

        self.regs.write_divisor(setting.divisor);

        let mut status = self.regs.read_status() & (Status::U2X | Status::MPCM);
        status.set(Status::U2X, setting.speed == SpeedMode::Double);
        self.regs.write_status(status);

        self.regs.write_control(Control::RXEN | Control::TXEN);
        self.regs.write_mode(mode::URSEL | configuration.mode);

        self.pushback = None;

        debug!(
            "usart: divisor {} speed {:?} mode {} ({} baud effective)",
            setting.divisor,
            setting.speed,
            configuration.mode,
            setting.effective_baud(F_CPU)
        );
        Ok(())
    }

    /// Releases the register binding.
    pub fn free(self) -> R {
        self.regs
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    // --- Transmit ---

    /// Writes `byte` if the data register is empty.
    pub fn try_send_byte(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        if self.regs.read_status().contains(Status::UDRE) {
            self.regs.write_data(byte);
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Waits for the data register to empty, then writes `byte`.
    pub fn send_byte(&mut self, byte: u8) {
        match nb::block!(self.try_send_byte(byte)) {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// Sends every byte of `bytes`, NULs included.
    pub fn send_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.send_byte(byte);
        }
    }

    /// Sends `s` up to, not including, its first NUL (or all of it if there is none).
    pub fn send_str(&mut self, s: &[u8]) {
        for &byte in s.iter().take_while(|&&b| b != 0) {
            self.send_byte(byte);
        }
    }

    /// Sends the NUL-terminated string stored at `addr` in read-only memory.
    pub fn send_progmem_str<M>(&mut self, mem: &M, addr: usize)
    where
        M: ProgramMemory + ?Sized,
    {
        let mut addr = addr;
        loop {
            let byte = mem.read_byte(addr);
            if byte == 0 {
                break;
            }
            self.send_byte(byte);
            addr += 1;
        }
    }

    // --- Receive ---

    /// Pops the push-back slot or, failing that, a byte from `UDR` along
    /// with the line error bits that were latched for it.
    fn try_recv_raw(&mut self) -> nb::Result<(u8, Status), Infallible> {
        if let Some(byte) = self.pushback.take() {
            return Ok((byte, Status::empty()));
        }
        // Error flags belong to the byte in UDR and must be read before it.
        let status = self.regs.read_status();
        if !status.contains(Status::RXC) {
            return Err(nb::Error::WouldBlock);
        }
        let byte = self.regs.read_data();
        Ok((byte, status & Status::LINE_ERRORS))
    }

    /// Reads one byte if available, reporting framing, overrun and parity
    /// errors. A byte that carried an error is consumed and dropped.
    pub fn try_recv_byte(&mut self) -> nb::Result<u8, ReceiveError> {
        let (byte, errors) = self.try_recv_raw().map_err(|e| match e {
            nb::Error::WouldBlock => nb::Error::WouldBlock,
            nb::Error::Other(never) => match never {},
        })?;

        let error = if errors.contains(Status::FE) {
            ReceiveError::Framing
        } else if errors.contains(Status::DOR) {
            ReceiveError::Overrun
        } else if errors.contains(Status::PE) {
            ReceiveError::Parity
        } else {
            return Ok(byte);
        };
        warn!("usart: dropped byte {}: {:?}", byte, error);
        Err(nb::Error::Other(error))
    }

    /// Waits for a byte and returns it. Line errors are not reported.
    pub fn recv_byte(&mut self) -> u8 {
        match nb::block!(self.try_recv_raw()) {
            Ok((byte, _)) => byte,
            Err(never) => match never {},
        }
    }

    /// Whether a byte can be read without blocking. Consumes nothing.
    pub fn data_available(&self) -> bool {
        self.pushback.is_some() || self.regs.read_status().contains(Status::RXC)
    }

    /// Discards every byte that is already pending, including a pushed-back
    /// one. Never waits for new bytes.
    pub fn flush_receive_buffer(&mut self) {
        self.pushback = None;
        while self.regs.read_status().contains(Status::RXC) {
            let _ = self.regs.read_data();
        }
    }

    /// Returns `byte` to the front of the receive stream.
    fn push_back(&mut self, byte: u8) {
        trace!("usart: pushed back {}", byte);
        self.pushback = Some(byte);
    }
}

impl<R, const F_CPU: u32> fmt::Write for Usart<R, F_CPU>
where
    R: UsartRegisters,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.send_bytes(s.as_bytes());
        Ok(())
    }
}
