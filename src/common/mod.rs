// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod config;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod registers;
pub mod timing;

#[cfg(test)]
pub(crate) mod mock;

// --- Re-export key types/traits/functions for easier access ---

// From config.rs
pub use config::{configure, Configuration, UsartConfig};

// From error.rs
pub use error::{ConfigError, ReceiveError};
#[cfg(feature = "embedded-hal")]
pub use error::TimedOut;

// From frame.rs
pub use frame::{DataBits, FrameFormat, Parity, StopBits};

// From hal_traits.rs
pub use hal_traits::{ProgramMemory, UsartRegisters};

// From registers.rs (bit constants stay under common::registers::*)
pub use registers::{Control, Status};

// From timing.rs
pub use timing::{
    derive_divisor, BaudRequest, BaudSetting, DivisorRounding, SpeedMode, StandardBaud,
    DEFAULT_F_CPU,
};
