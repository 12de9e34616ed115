// src/usart/format.rs

use super::Usart;
use crate::common::hal_traits::UsartRegisters;
use arrayvec::ArrayVec;

/// Decimal digits in `u32::MAX`.
pub const MAX_DECIMAL_DIGITS: usize = 10;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// ASCII decimal digits of `value`, least significant first.
fn decimal_digits_reversed(mut value: u32) -> ArrayVec<u8, MAX_DECIMAL_DIGITS> {
    let mut digits = ArrayVec::new();
    if value == 0 {
        digits.push(b'0');
        return digits;
    }
    while value != 0 {
        digits.push(b'0' + (value % 10) as u8);
        value /= 10;
    }
    digits
}

impl<R, const F_CPU: u32> Usart<R, F_CPU>
where
    R: UsartRegisters,
{
    /// Sends `value` in decimal without leading zeros.
    pub fn send_decimal(&mut self, value: u32) {
        let digits = decimal_digits_reversed(value);
        for &digit in digits.iter().rev() {
            self.send_byte(digit);
        }
    }

    /// Sends `value` as `0x` followed by uppercase hex digits without leading zeros.
    pub fn send_hex(&mut self, value: u32) {
        self.send_byte(b'0');
        self.send_byte(b'x');

        if value == 0 {
            self.send_byte(b'0');
            return;
        }

        let mut started = false;
        for shift in (0..32).step_by(4).rev() {
            let nibble = ((value >> shift) & 0x0F) as usize;
            if !started && nibble == 0 {
                continue;
            }
            started = true;
            self.send_byte(HEX_DIGITS[nibble]);
        }
    }
}
