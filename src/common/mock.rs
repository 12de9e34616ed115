// src/common/mock.rs

// Simulated register file shared by the driver unit tests.

use super::hal_traits::UsartRegisters;
use super::registers::{Control, Status};
use core::cell::Cell;
use heapless::{Deque, Vec};

pub const RX_CAPACITY: usize = 64;
pub const TX_CAPACITY: usize = 256;

#[derive(Debug, Default)]
pub struct MockRegisters {
    /// Pending received bytes with the error bits latched for each.
    pub rx_queue: Deque<(u8, Status), RX_CAPACITY>,
    /// Every byte written to `UDR`, in order.
    pub tx_log: Vec<u8, TX_CAPACITY>,
    /// Status reads that report the transmitter busy before `UDRE` sets.
    pub tx_busy_polls: Cell<u32>,
    pub status_reads: Cell<u32>,
    /// Writable `UCSRA` bits.
    pub status_config: Status,
    pub control: Control,
    pub divisor: Option<u16>,
    pub mode: Option<u8>,
    pub divisor_writes: u32,
}

impl MockRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage_rx(&mut self, data: &[u8]) {
        for &byte in data {
            self.rx_queue.push_back((byte, Status::empty())).unwrap();
        }
    }

    pub fn stage_rx_with_error(&mut self, byte: u8, errors: Status) {
        self.rx_queue.push_back((byte, errors)).unwrap();
    }

    pub fn transmitted(&self) -> &[u8] {
        &self.tx_log
    }
}

impl UsartRegisters for MockRegisters {
    fn read_status(&self) -> Status {
        self.status_reads.set(self.status_reads.get() + 1);

        let mut status = self.status_config & (Status::U2X | Status::MPCM);
        if let Some(&(_, errors)) = self.rx_queue.front() {
            status |= Status::RXC | errors;
        }
        let busy = self.tx_busy_polls.get();
        if busy > 0 {
            self.tx_busy_polls.set(busy - 1);
        } else {
            status |= Status::UDRE;
        }
        status
    }

    fn write_status(&mut self, status: Status) {
        self.status_config = status;
    }

    fn write_control(&mut self, control: Control) {
        self.control = control;
    }

    fn write_divisor(&mut self, divisor: u16) {
        self.divisor = Some(divisor);
        self.divisor_writes += 1;
    }

    fn write_mode(&mut self, mode: u8) {
        self.mode = Some(mode);
    }

    fn read_data(&mut self) -> u8 {
        self.rx_queue.pop_front().map(|(byte, _)| byte).unwrap_or(0)
    }

    fn write_data(&mut self, byte: u8) {
        self.tx_log.push(byte).unwrap();
    }
}
