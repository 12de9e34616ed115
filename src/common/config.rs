// src/common/config.rs

use super::error::ConfigError;
use super::frame::{DataBits, FrameFormat, Parity, StopBits};
use super::timing::{BaudRequest, BaudSetting, DivisorRounding};

/// User-facing USART configuration.
///
/// `B` is either a plain `u32` (any rate, derived at runtime) or a
/// [`StandardBaud`](super::timing::StandardBaud) (table lookup, 8/16 MHz only).
///
/// ```
/// use avr_usart::{Parity, StopBits, UsartConfig};
///
/// let config = UsartConfig::new(19_200u32).parity(Parity::Even).stop_bits(StopBits::Two);
/// assert_eq!(config.baud, 19_200);
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UsartConfig<B = u32> {
    pub baud: B,
    pub frame: FrameFormat,
    pub rounding: DivisorRounding,
}

impl Default for UsartConfig<u32> {
    /// 9600 baud, 8N1, ceiling rounding.
    fn default() -> Self {
        UsartConfig::new(9600)
    }
}

impl<B: BaudRequest> UsartConfig<B> {
    /// Starts from `baud` with an 8N1 frame.
    pub const fn new(baud: B) -> Self {
        UsartConfig {
            baud,
            frame: FrameFormat::EIGHT_N_ONE,
            rounding: DivisorRounding::Ceiling,
        }
    }

    /// Replaces the baud request, possibly switching between table and derived rates.
    pub fn baud<C: BaudRequest>(self, baud: C) -> UsartConfig<C> {
        UsartConfig {
            baud,
            frame: self.frame,
            rounding: self.rounding,
        }
    }

    pub fn data_bits(mut self, data_bits: DataBits) -> Self {
        self.frame.data_bits = data_bits;
        self
    }

    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.frame.stop_bits = stop_bits;
        self
    }

    pub fn parity(mut self, parity: Parity) -> Self {
        self.frame.parity = parity;
        self
    }

    pub fn frame(mut self, frame: FrameFormat) -> Self {
        self.frame = frame;
        self
    }

    /// Rounding policy for derived rates. Ignored by table lookups.
    pub fn rounding(mut self, rounding: DivisorRounding) -> Self {
        self.rounding = rounding;
        self
    }
}

/// Everything that gets written to the hardware for one configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configuration {
    pub setting: BaudSetting,
    /// Frame mode byte without the register select bit.
    pub mode: u8,
}

/// Derives divisor, speed mode and mode byte for clock `F_CPU`.
///
/// Pure computation; see [`Usart::configure`](crate::Usart::configure) for
/// the variant that also programs the peripheral.
pub fn configure<const F_CPU: u32, B: BaudRequest>(
    config: &UsartConfig<B>,
) -> Result<Configuration, ConfigError> {
    let setting = config.baud.resolve::<F_CPU>(config.rounding)?;
    Ok(Configuration {
        setting,
        mode: config.frame.mode_byte(),
    })
}
