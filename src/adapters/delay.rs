//! Settling-delay providers.
//!
//! - [`StdDelay`] blocks the calling thread (`std::thread::sleep`).
//! - [`NoDelay`] returns immediately, for simulation and tests.
//!
//! Both implement [`DelayNs`], so an MCU-side delay from any HAL can be
//! dropped in instead.

use core::time::Duration;

use embedded_hal::delay::DelayNs;

/// Blocking host delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// Delay that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
