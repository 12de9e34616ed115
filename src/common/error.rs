// src/common/error.rs

/// Errors raised while deriving a configuration.
///
/// Configuration is pure integer arithmetic, so these are all range faults in
/// the request itself. Nothing is written to the hardware when one is returned.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A baud rate of zero was requested.
    #[error("baud rate must be non-zero")]
    ZeroBaudRate,

    /// Even the normal-speed divisor does not fit the divisor register.
    #[error("divisor {divisor} exceeds register maximum {max}")]
    DivisorOverflow { divisor: u32, max: u16 },

    /// The standard rate has no table entry for the configured clock.
    #[error("no table entry for {baud} baud at {clock_hz} Hz")]
    UnsupportedBaudRate { baud: u32, clock_hz: u32 },
}

/// Line errors latched by the receiver alongside a byte.
///
/// Reported only by the non-blocking receive primitive; the byte that carried
/// the error has already been consumed when this is returned.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiveError {
    /// Stop bit was sampled low.
    #[error("USART framing error")]
    Framing,

    /// The receive buffer was full and a byte was dropped.
    #[error("USART data overrun")]
    Overrun,

    /// Parity check failed.
    #[error("USART parity error")]
    Parity,
}

/// A bounded wait elapsed before the peripheral became ready.
#[cfg(feature = "embedded-hal")]
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("operation timed out after {waited_us} us")]
pub struct TimedOut {
    pub waited_us: u32,
}
