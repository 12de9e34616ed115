// src/common/frame.rs

use super::registers::mode;

/// Number of data bits per character.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Five,
    Six,
    Seven,
    #[default]
    Eight,
}

impl DataBits {
    /// Value of the `UCSZ1:0` field (0 for five bits through 3 for eight).
    #[inline]
    pub const fn field(self) -> u8 {
        match self {
            DataBits::Five => 0b00,
            DataBits::Six => 0b01,
            DataBits::Seven => 0b10,
            DataBits::Eight => 0b11,
        }
    }

    /// Number of bits as an integer.
    #[inline]
    pub const fn count(self) -> u8 {
        self.field() + 5
    }
}

/// Number of stop bits per character.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    #[default]
    One,
    Two,
}

/// Parity scheme.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

/// Shape of one serial character: data bits, stop bits and parity.
///
/// Every combination is valid and maps to exactly one mode byte.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameFormat {
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
}

impl FrameFormat {
    /// 8 data bits, no parity, 1 stop bit.
    pub const EIGHT_N_ONE: FrameFormat = FrameFormat::new(DataBits::Eight, StopBits::One, Parity::None);

    pub const fn new(data_bits: DataBits, stop_bits: StopBits, parity: Parity) -> Self {
        FrameFormat { data_bits, stop_bits, parity }
    }

    /// Encodes the frame shape into a mode (`UCSRC`) byte.
    ///
    /// Each field is cleared and rewritten on its own, so the result does not
    /// depend on evaluation order. The register select bit is left clear; the
    /// driver adds it when writing to hardware.
    pub const fn mode_byte(&self) -> u8 {
        let mut value = 0u8;

        // Character size
        value &= !mode::CHAR_SIZE_MASK;
        value |= self.data_bits.field() << mode::CHAR_SIZE_SHIFT;

        // Stop bits
        value &= !mode::STOP_BITS_MASK;
        if let StopBits::Two = self.stop_bits {
            value |= mode::USBS;
        }

        // Parity
        value &= !mode::PARITY_MASK;
        value |= match self.parity {
            Parity::None => 0,
            Parity::Even => mode::UPM1,
            Parity::Odd => mode::UPM1 | mode::UPM0,
        };

        value
    }

    /// Total bits on the wire per character, including start and stop bits.
    pub const fn bits_per_character(&self) -> u8 {
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Even | Parity::Odd => 1,
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        1 + self.data_bits.count() + parity + stop
    }
}
