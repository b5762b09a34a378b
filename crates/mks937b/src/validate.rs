//! Parameter checks applied before a frame is sent.
//!
//! Each check returns the offending value inside the matching [`Error`]
//! variant and performs no I/O. Enumerated parameters are checked by their
//! types in `mks937b_core::types`; what remains here are channels, the
//! address and numeric bounds.

use mks937b_core::error::{Error, Result};

/// Lowest valid controller address.
pub const MIN_ADDRESS: u32 = 1;
/// Highest valid controller address.
pub const MAX_ADDRESS: u32 = 254;

/// Channels that carry control and sensor settings.
pub const CONTROL_CHANNELS: [u8; 3] = [1, 3, 5];

/// Protection set point bounds in Torr; `0` disables protection.
pub const PRO_MIN: f64 = 1e-5;
pub const PRO_MAX: f64 = 1e-2;

/// Control set point bounds in Torr. The upper bound is the extended range
/// available with upper control (`XCS`) enabled.
pub const CSP_MIN: f64 = 5e-4;
pub const CSP_MAX: f64 = 9.5e-1;

/// Hysteresis lower bound as a multiple of the control set point, and its
/// absolute upper bound in Torr.
pub const HYSTERESIS_CSP_FACTOR: f64 = 1.2;
pub const HYSTERESIS_MAX: f64 = 0.03;

pub const GAS_CORRECTION_MIN: f64 = 0.1;
pub const GAS_CORRECTION_MAX: f64 = 50.0;

pub const GAS_SENSITIVITY_MIN: f64 = 1.0;
pub const GAS_SENSITIVITY_MAX: f64 = 50.0;

/// Degas duration bounds in seconds.
pub const DEGAS_TIME_MIN: u32 = 5;
pub const DEGAS_TIME_MAX: u32 = 240;

pub fn address(address: u32) -> Result<u32> {
    if (MIN_ADDRESS..=MAX_ADDRESS).contains(&address) {
        Ok(address)
    } else {
        Err(Error::InvalidAddress { got: address })
    }
}

/// Accept only channels 1, 3 and 5.
pub fn control_channel(channel: u8) -> Result<u8> {
    if CONTROL_CHANNELS.contains(&channel) {
        Ok(channel)
    } else {
        Err(Error::InvalidChannelControl { got: channel })
    }
}

pub fn channel_in(channel: u8, min: u8, max: u8) -> Result<u8> {
    if (min..=max).contains(&channel) {
        Ok(channel)
    } else {
        Err(Error::InvalidChannel {
            min,
            max,
            got: channel,
        })
    }
}

/// Inclusive bounds check. NaN is always out of range.
pub fn range(min: f64, max: f64, got: f64) -> Result<f64> {
    if got >= min && got <= max {
        Ok(got)
    } else {
        Err(Error::InvalidRangeExp { min, max, got })
    }
}

pub fn protection_target(target: f64) -> Result<f64> {
    if target == 0.0 || (PRO_MIN..=PRO_MAX).contains(&target) {
        Ok(target)
    } else {
        Err(Error::InvalidPRO {
            min: PRO_MIN,
            max: PRO_MAX,
            got: target,
        })
    }
}

/// Check a hysteresis value against the channel's live control set point.
pub fn hysteresis(csp: f64, target: f64) -> Result<f64> {
    range(HYSTERESIS_CSP_FACTOR * csp, HYSTERESIS_MAX, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_bounds() {
        assert_eq!(address(1).unwrap(), 1);
        assert_eq!(address(254).unwrap(), 254);
        assert!(matches!(address(0), Err(Error::InvalidAddress { got: 0 })));
        assert!(matches!(
            address(255),
            Err(Error::InvalidAddress { got: 255 })
        ));
    }

    #[test]
    fn control_channels_only_odd() {
        for ch in [1, 3, 5] {
            assert_eq!(control_channel(ch).unwrap(), ch);
        }
        for ch in [0, 2, 4, 6, 7] {
            assert!(matches!(
                control_channel(ch),
                Err(Error::InvalidChannelControl { got }) if got == ch
            ));
        }
    }

    #[test]
    fn channel_range() {
        assert!(channel_in(6, 1, 6).is_ok());
        assert!(matches!(
            channel_in(0, 1, 6),
            Err(Error::InvalidChannel { min: 1, max: 6, got: 0 })
        ));
        assert!(matches!(
            channel_in(3, 1, 2),
            Err(Error::InvalidChannel { min: 1, max: 2, got: 3 })
        ));
    }

    #[test]
    fn range_inclusive_and_nan() {
        assert!(range(0.1, 50.0, 0.1).is_ok());
        assert!(range(0.1, 50.0, 50.0).is_ok());
        assert!(range(0.1, 50.0, 50.1).is_err());
        assert!(range(0.1, 50.0, f64::NAN).is_err());
    }

    #[test]
    fn protection_target_zero_disables() {
        assert!(protection_target(0.0).is_ok());
        assert!(protection_target(5e-3).is_ok());
        assert!(protection_target(1e-5).is_ok());
        assert!(matches!(
            protection_target(5e-2),
            Err(Error::InvalidPRO { got, .. }) if got == 5e-2
        ));
        assert!(protection_target(1e-6).is_err());
    }

    #[test]
    fn hysteresis_against_csp() {
        assert!(hysteresis(1e-3, 1.0e-3).is_err());
        assert!(hysteresis(1e-3, 1.4e-3).is_ok());
        assert!(hysteresis(1e-3, 0.03).is_ok());
        assert!(hysteresis(1e-3, 0.031).is_err());
    }
}
