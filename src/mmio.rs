// src/mmio.rs

//! Memory-mapped binding of [`UsartRegisters`].

use crate::common::hal_traits::UsartRegisters;
use crate::common::registers::{Control, Status};
use core::ptr;

/// Data-space addresses of the USART registers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterMap {
    pub udr: usize,
    pub ucsra: usize,
    pub ucsrb: usize,
    /// Shared by `UBRRH` and `UCSRC` on parts with `URSEL`.
    pub ucsrc: usize,
    pub ubrrl: usize,
    pub ubrrh: usize,
}

impl RegisterMap {
    /// ATmega16 / ATmega32 / ATmega8535 (I/O address + 0x20).
    pub const ATMEGA32: RegisterMap = RegisterMap {
        udr: 0x2C,
        ucsra: 0x2B,
        ucsrb: 0x2A,
        ucsrc: 0x40,
        ubrrl: 0x29,
        ubrrh: 0x40,
    };
}

/// Volatile access to a USART through raw register addresses.
#[derive(Debug)]
pub struct MmioRegisters {
    map: RegisterMap,
}

impl MmioRegisters {
    /// # Safety
    ///
    /// Every address in `map` must be a valid USART register for the running
    /// device, and no other code may access those registers while the
    /// returned value is alive.
    pub const unsafe fn new(map: RegisterMap) -> Self {
        MmioRegisters { map }
    }

    pub const fn map(&self) -> &RegisterMap {
        &self.map
    }

    #[inline(always)]
    fn read(&self, addr: usize) -> u8 {
        // SAFETY: address validity and exclusivity are guaranteed by `new`.
        unsafe { ptr::read_volatile(addr as *const u8) }
    }

    #[inline(always)]
    fn write(&mut self, addr: usize, value: u8) {
        // SAFETY: address validity and exclusivity are guaranteed by `new`.
        unsafe { ptr::write_volatile(addr as *mut u8, value) }
    }
}

impl UsartRegisters for MmioRegisters {
    fn read_status(&self) -> Status {
        Status::from_bits_retain(self.read(self.map.ucsra))
    }

    fn write_status(&mut self, status: Status) {
        let writable = status & (Status::U2X | Status::MPCM | Status::TXC);
        self.write(self.map.ucsra, writable.bits());
    }

    fn write_control(&mut self, control: Control) {
        self.write(self.map.ucsrb, control.bits());
    }

    fn write_divisor(&mut self, divisor: u16) {
        let [high, low] = divisor.to_be_bytes();
        // URSEL clear: the shared address selects UBRRH. Only four bits exist.
        self.write(self.map.ubrrh, high & 0x0F);
        self.write(self.map.ubrrl, low);
    }

    fn write_mode(&mut self, mode: u8) {
        self.write(self.map.ucsrc, mode);
    }

    fn read_data(&mut self) -> u8 {
        self.read(self.map.udr)
    }

    fn write_data(&mut self, byte: u8) {
        self.write(self.map.udr, byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Fake register file in host memory; addresses are offsets into it.
    fn map_over(regs: &mut [u8; 6]) -> RegisterMap {
        let base = regs.as_mut_ptr() as usize;
        RegisterMap {
            udr: base,
            ucsra: base + 1,
            ucsrb: base + 2,
            ucsrc: base + 3,
            ubrrl: base + 4,
            ubrrh: base + 5,
        }
    }

    #[test]
    fn test_divisor_split_high_first() {
        let mut regs = [0u8; 6];
        let map = map_over(&mut regs);
        let mut usart = unsafe { MmioRegisters::new(map) };
        usart.write_divisor(0x0ABC);
        drop(usart);
        assert_eq!(regs[4], 0xBC);
        assert_eq!(regs[5], 0x0A);
    }

    #[test]
    fn test_status_round_trip_masks_read_only_bits() {
        let mut regs = [0u8; 6];
        let map = map_over(&mut regs);
        let mut usart = unsafe { MmioRegisters::new(map) };
        usart.write_status(Status::U2X | Status::RXC | Status::FE);
        assert_eq!(usart.read_status(), Status::U2X);
    }

    #[test]
    fn test_data_and_control() {
        let mut regs = [0u8; 6];
        let map = map_over(&mut regs);
        let mut usart = unsafe { MmioRegisters::new(map) };
        usart.write_control(Control::RXEN | Control::TXEN);
        usart.write_data(b'Z');
        assert_eq!(usart.read_data(), b'Z');
        drop(usart);
        assert_eq!(regs[2], 0b0001_1000);
    }

    #[test]
    fn test_atmega32_shares_ubrrh_and_ucsrc() {
        assert_eq!(RegisterMap::ATMEGA32.ubrrh, RegisterMap::ATMEGA32.ucsrc);
    }
}
