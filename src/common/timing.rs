// src/common/timing.rs

//! Baud-rate derivation.
//!
//! Two request kinds exist. [`StandardBaud`] selects a precomputed entry from
//! a table that only exists for 8 MHz and 16 MHz clocks; using it with any
//! other `F_CPU` is rejected at build time. A plain `u32` goes through
//! [`derive_divisor`], which works for any clock.

use super::error::ConfigError;
use super::registers::{DIVISOR_MAX, DOUBLE_SPEED_DIVISOR_MAX};

/// Reference clock used when none is given.
pub const DEFAULT_F_CPU: u32 = 8_000_000;

/// Clock sampling mode of the receiver and transmitter.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedMode {
    /// 16 clock samples per bit (`U2X` clear).
    Normal,
    /// 8 clock samples per bit (`U2X` set). Finer divisor steps, less noise margin.
    Double,
}

impl SpeedMode {
    #[inline]
    pub const fn samples_per_bit(self) -> u32 {
        match self {
            SpeedMode::Normal => 16,
            SpeedMode::Double => 8,
        }
    }
}

/// Divisor register value together with the sampling mode it was computed for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BaudSetting {
    pub divisor: u16,
    pub speed: SpeedMode,
}

impl BaudSetting {
    pub const fn new(divisor: u16, speed: SpeedMode) -> Self {
        BaudSetting { divisor, speed }
    }

    /// Baud rate actually produced by this setting on a `clock_hz` clock.
    pub const fn effective_baud(&self, clock_hz: u32) -> u32 {
        let period = self.speed.samples_per_bit() as u64 * (self.divisor as u64 + 1);
        (clock_hz as u64 / period) as u32
    }

    /// Signed deviation of the effective rate from `target_baud`, in tenths of a percent.
    pub const fn error_permille(&self, clock_hz: u32, target_baud: u32) -> i32 {
        if target_baud == 0 {
            return 0;
        }
        let effective = self.effective_baud(clock_hz) as i64;
        let target = target_baud as i64;
        ((effective - target) * 1000 / target) as i32
    }
}

/// How the generalized divisor computation rounds the clock ratio.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DivisorRounding {
    /// Round the ratio up. The effective rate never exceeds the requested rate.
    #[default]
    Ceiling,
    /// Round the ratio to the nearest integer, halves up.
    Nearest,
}

impl DivisorRounding {
    #[inline]
    const fn divide(self, numerator: u64, denominator: u64) -> u64 {
        match self {
            DivisorRounding::Ceiling => numerator.div_ceil(denominator),
            DivisorRounding::Nearest => (numerator + denominator / 2) / denominator,
        }
    }
}

/// Computes divisor and speed mode for an arbitrary baud rate.
///
/// Double speed is tried first and kept whenever its divisor fits in
/// [`DOUBLE_SPEED_DIVISOR_MAX`]; otherwise the normal-speed divisor is used.
/// A normal-speed divisor above [`DIVISOR_MAX`] is reported instead of being
/// truncated into the register.
pub fn derive_divisor(
    clock_hz: u32,
    baud: u32,
    rounding: DivisorRounding,
) -> Result<BaudSetting, ConfigError> {
    if baud == 0 {
        return Err(ConfigError::ZeroBaudRate);
    }

    let clock = clock_hz as u64;
    let baud = baud as u64;

    let divisor8 = rounding.divide(clock, 8 * baud).saturating_sub(1);
    if divisor8 <= DOUBLE_SPEED_DIVISOR_MAX as u64 {
        return Ok(BaudSetting::new(divisor8 as u16, SpeedMode::Double));
    }

    let divisor16 = rounding.divide(clock, 16 * baud).saturating_sub(1);
    if divisor16 > DIVISOR_MAX as u64 {
        return Err(ConfigError::DivisorOverflow {
            divisor: divisor16 as u32,
            max: DIVISOR_MAX,
        });
    }

    Ok(BaudSetting::new(divisor16 as u16, SpeedMode::Normal))
}

/// Baud rates with precomputed table entries.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StandardBaud {
    B2400,
    B4800,
    B9600,
    B14400,
    B19200,
    B28800,
    B38400,
    B57600,
    B76800,
}

/// Compile-time guard for the clock used with the standard table.
struct TableClock<const F_CPU: u32>;

impl<const F_CPU: u32> TableClock<F_CPU> {
    const SUPPORTED: () = assert!(
        F_CPU == 8_000_000 || F_CPU == 16_000_000,
        "standard baud table requires F_CPU of 8 MHz or 16 MHz"
    );
}

impl StandardBaud {
    pub const ALL: [StandardBaud; 9] = [
        StandardBaud::B2400,
        StandardBaud::B4800,
        StandardBaud::B9600,
        StandardBaud::B14400,
        StandardBaud::B19200,
        StandardBaud::B28800,
        StandardBaud::B38400,
        StandardBaud::B57600,
        StandardBaud::B76800,
    ];

    /// Nominal rate in bits per second.
    pub const fn bps(self) -> u32 {
        match self {
            StandardBaud::B2400 => 2400,
            StandardBaud::B4800 => 4800,
            StandardBaud::B9600 => 9600,
            StandardBaud::B14400 => 14400,
            StandardBaud::B19200 => 19200,
            StandardBaud::B28800 => 28800,
            StandardBaud::B38400 => 38400,
            StandardBaud::B57600 => 57600,
            StandardBaud::B76800 => 76800,
        }
    }

    /// Looks up the table entry for clock `F_CPU`.
    ///
    /// Fails to build unless `F_CPU` is 8 MHz or 16 MHz. Returns `None` for
    /// 2400 baud at 16 MHz, which the table does not cover.
    pub const fn table_setting<const F_CPU: u32>(self) -> Option<BaudSetting> {
        #[allow(clippy::let_unit_value)]
        let () = TableClock::<F_CPU>::SUPPORTED;

        use SpeedMode::{Double as D, Normal as N};
        let entry = if F_CPU == 8_000_000 {
            match self {
                StandardBaud::B2400 => (207, N),  // 0.2%
                StandardBaud::B4800 => (103, N),  // 0.2%
                StandardBaud::B9600 => (51, N),   // 0.2%
                StandardBaud::B14400 => (68, D),  // 0.6%
                StandardBaud::B19200 => (25, N),  // 0.2%
                StandardBaud::B28800 => (34, D),  // -0.8%
                StandardBaud::B38400 => (25, D),  // 0.2%
                StandardBaud::B57600 => (16, D),  // 2.1%
                StandardBaud::B76800 => (12, D),  // 0.2%
            }
        } else {
            match self {
                StandardBaud::B2400 => return None,
                StandardBaud::B4800 => (207, N),  // 0.2%
                StandardBaud::B9600 => (103, N),  // 0.2%
                StandardBaud::B14400 => (138, D), // -0.1%
                StandardBaud::B19200 => (51, N),  // 0.2%
                StandardBaud::B28800 => (68, D),  // 0.6%
                StandardBaud::B38400 => (51, D),  // 0.2%
                StandardBaud::B57600 => (34, D),  // -0.8%
                StandardBaud::B76800 => (25, D),  // 0.2%
            }
        };
        Some(BaudSetting::new(entry.0, entry.1))
    }
}

/// A baud-rate request that can be resolved against a build-time clock.
pub trait BaudRequest: Copy {
    /// Nominal rate in bits per second.
    fn bps(self) -> u32;

    /// Resolves the request into a register setting for clock `F_CPU`.
    fn resolve<const F_CPU: u32>(self, rounding: DivisorRounding) -> Result<BaudSetting, ConfigError>;
}

impl BaudRequest for StandardBaud {
    fn bps(self) -> u32 {
        StandardBaud::bps(self)
    }

    /// Table lookup; `rounding` does not apply.
    fn resolve<const F_CPU: u32>(self, _rounding: DivisorRounding) -> Result<BaudSetting, ConfigError> {
        self.table_setting::<F_CPU>().ok_or(ConfigError::UnsupportedBaudRate {
            baud: self.bps(),
            clock_hz: F_CPU,
        })
    }
}

impl BaudRequest for u32 {
    fn bps(self) -> u32 {
        self
    }

    fn resolve<const F_CPU: u32>(self, rounding: DivisorRounding) -> Result<BaudSetting, ConfigError> {
        derive_divisor(F_CPU, self, rounding)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const STANDARD_RATES: [u32; 9] = [2400, 4800, 9600, 14400, 19200, 28800, 38400, 57600, 76800];

    #[test]
    fn test_derive_prefers_double_speed() {
        let s = derive_divisor(8_000_000, 9600, DivisorRounding::Ceiling).unwrap();
        assert_eq!(s, BaudSetting::new(104, SpeedMode::Double));

        let s = derive_divisor(16_000_000, 76800, DivisorRounding::Ceiling).unwrap();
        assert_eq!(s, BaudSetting::new(26, SpeedMode::Double));
    }

    #[test]
    fn test_derive_falls_back_to_normal_speed() {
        // ceil(8e6 / 19200) - 1 = 416 does not fit in eight bits
        let s = derive_divisor(8_000_000, 2400, DivisorRounding::Ceiling).unwrap();
        assert_eq!(s, BaudSetting::new(208, SpeedMode::Normal));

        let s = derive_divisor(16_000_000, 2400, DivisorRounding::Ceiling).unwrap();
        assert_eq!(s, BaudSetting::new(416, SpeedMode::Normal));
    }

    #[test]
    fn test_double_speed_whenever_divisor_fits() {
        for &clock in &[1_000_000u32, 3_686_400, 8_000_000, 11_059_200, 16_000_000, 20_000_000] {
            for baud in (300u32..=250_000).step_by(97) {
                let ceil8 = (clock as u64).div_ceil(8 * baud as u64) - 1;
                match derive_divisor(clock, baud, DivisorRounding::Ceiling) {
                    Ok(s) if ceil8 <= 255 => {
                        assert_eq!(s.speed, SpeedMode::Double, "clock={} baud={}", clock, baud);
                        assert_eq!(s.divisor as u64, ceil8);
                    }
                    Ok(s) => {
                        assert_eq!(s.speed, SpeedMode::Normal, "clock={} baud={}", clock, baud);
                        assert_eq!(s.divisor as u64, (clock as u64).div_ceil(16 * baud as u64) - 1);
                    }
                    Err(e) => assert!(matches!(e, ConfigError::DivisorOverflow { .. })),
                }
            }
        }
    }

    #[test]
    fn test_ceiling_never_exceeds_target() {
        for &clock in &[8_000_000u32, 16_000_000] {
            for baud in (1200u32..=clock / 16).step_by(113) {
                let s = derive_divisor(clock, baud, DivisorRounding::Ceiling).unwrap();
                assert!(s.effective_baud(clock) <= baud, "clock={} baud={} -> {:?}", clock, baud, s);
            }
        }
    }

    #[test]
    fn test_nearest_rounding_within_table_tolerance() {
        for &clock in &[8_000_000u32, 16_000_000] {
            for &baud in &STANDARD_RATES {
                let s = derive_divisor(clock, baud, DivisorRounding::Nearest).unwrap();
                let err = s.error_permille(clock, baud);
                assert!(err.abs() <= 21, "clock={} baud={} err={}", clock, baud, err);
            }
        }
        let s = derive_divisor(8_000_000, 9600, DivisorRounding::Nearest).unwrap();
        assert_eq!(s, BaudSetting::new(103, SpeedMode::Double));
    }

    #[test]
    fn test_derive_rejects_zero_baud() {
        assert_eq!(derive_divisor(8_000_000, 0, DivisorRounding::Ceiling), Err(ConfigError::ZeroBaudRate));
    }

    #[test]
    fn test_derive_reports_divisor_overflow() {
        // 16 MHz / (16 * 200) = 5000 > 4095
        let result = derive_divisor(16_000_000, 200, DivisorRounding::Ceiling);
        assert_eq!(result, Err(ConfigError::DivisorOverflow { divisor: 4999, max: DIVISOR_MAX }));

        // Largest divisor that still fits
        let s = derive_divisor(16_000_000, 245, DivisorRounding::Ceiling).unwrap();
        assert_eq!(s.speed, SpeedMode::Normal);
        assert!(s.divisor <= DIVISOR_MAX);
    }

    #[test]
    fn test_derive_baud_above_clock_clamps_to_zero() {
        let s = derive_divisor(8_000_000, 2_000_000, DivisorRounding::Ceiling).unwrap();
        assert_eq!(s, BaudSetting::new(0, SpeedMode::Double));
    }

    #[test]
    fn test_table_8mhz() {
        assert_eq!(StandardBaud::B2400.table_setting::<8_000_000>(), Some(BaudSetting::new(207, SpeedMode::Normal)));
        assert_eq!(StandardBaud::B9600.table_setting::<8_000_000>(), Some(BaudSetting::new(51, SpeedMode::Normal)));
        assert_eq!(StandardBaud::B57600.table_setting::<8_000_000>(), Some(BaudSetting::new(16, SpeedMode::Double)));
        assert_eq!(StandardBaud::B76800.table_setting::<8_000_000>(), Some(BaudSetting::new(12, SpeedMode::Double)));
    }

    #[test]
    fn test_table_16mhz() {
        assert_eq!(StandardBaud::B2400.table_setting::<16_000_000>(), None);
        assert_eq!(StandardBaud::B14400.table_setting::<16_000_000>(), Some(BaudSetting::new(138, SpeedMode::Double)));
        assert_eq!(StandardBaud::B19200.table_setting::<16_000_000>(), Some(BaudSetting::new(51, SpeedMode::Normal)));
    }

    #[test]
    fn test_table_within_tolerance() {
        for rate in StandardBaud::ALL {
            let s = rate.table_setting::<8_000_000>().unwrap();
            assert!(s.error_permille(8_000_000, rate.bps()).abs() <= 21, "{:?} @ 8 MHz", rate);
            if let Some(s) = rate.table_setting::<16_000_000>() {
                assert!(s.error_permille(16_000_000, rate.bps()).abs() <= 21, "{:?} @ 16 MHz", rate);
            }
        }
    }

    #[test]
    fn test_standard_request_resolve() {
        let r = StandardBaud::B2400.resolve::<16_000_000>(DivisorRounding::Ceiling);
        assert_eq!(r, Err(ConfigError::UnsupportedBaudRate { baud: 2400, clock_hz: 16_000_000 }));

        let r = StandardBaud::B38400.resolve::<8_000_000>(DivisorRounding::Nearest);
        assert_eq!(r, Ok(BaudSetting::new(25, SpeedMode::Double)));
    }

    #[test]
    fn test_custom_request_resolve_any_clock() {
        let r = 115_200u32.resolve::<14_745_600>(DivisorRounding::Ceiling).unwrap();
        assert_eq!(r, BaudSetting::new(15, SpeedMode::Double));
        assert_eq!(r.effective_baud(14_745_600), 115_200);
    }

    #[test]
    fn test_error_permille_sign() {
        let s = BaudSetting::new(104, SpeedMode::Double);
        assert_eq!(s.effective_baud(8_000_000), 9523);
        assert_eq!(s.error_permille(8_000_000, 9600), -8);
        assert_eq!(s.error_permille(8_000_000, 0), 0);
    }
}
