// src/lib.rs

//! Polling driver for the AVR-class USART.
//!
//! ```no_run
//! use avr_usart::{mmio::{MmioRegisters, RegisterMap}, Parity, Usart, UsartConfig};
//!
//! let regs = unsafe { MmioRegisters::new(RegisterMap::ATMEGA32) };
//! let mut usart: Usart<_, 16_000_000> = Usart::new(regs);
//! usart.configure(&UsartConfig::new(38_400u32).parity(Parity::Even)).unwrap();
//!
//! usart.send_str(b"ready> ");
//! let mut line = [0u8; 32];
//! let n = usart.receive_line(&mut line);
//! usart.send_decimal(n as u32);
//! ```

#![no_std] // Specify no_std at the crate root

// Must come first so the logging macros are visible to later modules
mod fmt;

pub mod common;
pub mod mmio;
pub mod usart;

// Re-export key types for convenience
pub use common::{
    BaudSetting, ConfigError, Configuration, DataBits, DivisorRounding, FrameFormat, Parity,
    ProgramMemory, ReceiveError, SpeedMode, StandardBaud, StopBits, UsartConfig, UsartRegisters,
};
#[cfg(feature = "embedded-hal")]
pub use common::TimedOut;
pub use usart::Usart;
