// src/usart/timeout.rs

//! Bounded waits built on the non-blocking primitives.
//!
//! The plain `send_byte` / `recv_byte` calls block forever when the
//! peripheral never becomes ready. These variants poll with a
//! [`DelayNs`] between attempts and give up after `timeout_us`.

use super::Usart;
use crate::common::{error::TimedOut, hal_traits::UsartRegisters};
use core::convert::Infallible;
use embedded_hal::delay::DelayNs;

/// Sleep between two polls of the status register.
pub const POLL_INTERVAL_US: u32 = 10;

impl<R, const F_CPU: u32> Usart<R, F_CPU>
where
    R: UsartRegisters,
{
    /// Executes a non-blocking operation repeatedly until it stops returning
    /// `WouldBlock` or `timeout_us` microseconds of delay have accumulated.
    fn poll_with_timeout<D, T, F>(&mut self, delay: &mut D, timeout_us: u32, mut f: F) -> Result<T, TimedOut>
    where
        D: DelayNs,
        F: FnMut(&mut Self) -> nb::Result<T, Infallible>,
    {
        let mut waited_us = 0u32;
        loop {
            match f(self) {
                Ok(value) => return Ok(value),
                Err(nb::Error::Other(never)) => match never {},
                Err(nb::Error::WouldBlock) => {
                    if waited_us >= timeout_us {
                        return Err(TimedOut { waited_us });
                    }
                    let step = POLL_INTERVAL_US.min(timeout_us - waited_us);
                    delay.delay_us(step);
                    waited_us += step;
                }
            }
        }
    }

    /// [`send_byte`](Self::send_byte) that gives up after `timeout_us`.
    pub fn send_byte_timeout<D: DelayNs>(&mut self, byte: u8, delay: &mut D, timeout_us: u32) -> Result<(), TimedOut> {
        self.poll_with_timeout(delay, timeout_us, |usart| usart.try_send_byte(byte))
    }

    /// [`recv_byte`](Self::recv_byte) that gives up after `timeout_us`.
    pub fn recv_byte_timeout<D: DelayNs>(&mut self, delay: &mut D, timeout_us: u32) -> Result<u8, TimedOut> {
        self.poll_with_timeout(delay, timeout_us, |usart| usart.try_recv_raw().map(|(byte, _)| byte))
    }
}
