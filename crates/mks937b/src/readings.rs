//! Pressure readings.
//!
//! A pressure field from the controller is either a number in scientific
//! notation (`4.50E-03`) or a status token that replaces the number when the
//! sensor cannot produce one (`LO<`, `MISCONN`, `CTRL_OFF`, ...). Tokens may
//! appear with surrounding characters, so they are matched as substrings.

use std::fmt;

use tracing::debug;

use mks937b_core::error::{Error, Result};

use crate::gauge::Mks937b;
use crate::protocol::format_sci;
use crate::validate;

/// Number of fields in a `PRZ` (all channels) reply.
pub const CHANNEL_COUNT: usize = 6;

/// Sensor state reported alongside a pressure value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PressureStatus {
    /// A valid numeric reading.
    Ok,
    BelowRange,
    Atmosphere,
    Off,
    Wait,
    LowEmission,
    ControlledOff,
    ProtectedOff,
    Misconnected,
    NoGauge,
    CombinationDisabled,
}

impl PressureStatus {
    /// Human-readable description of the status.
    pub fn description(&self) -> &'static str {
        match self {
            PressureStatus::Ok => "OK",
            PressureStatus::BelowRange => "Pressure lower than minimum",
            PressureStatus::Atmosphere => "PR when pressure is higher than 450 Torr",
            PressureStatus::Off => "Cold cathode HV is OFF, or HC/PR/CP power is OFF",
            PressureStatus::Wait => "CC or HC startup delay",
            PressureStatus::LowEmission => "HC OFF due to low emission",
            PressureStatus::ControlledOff => "CC or HC is OFF in controlled state",
            PressureStatus::ProtectedOff => "CC or HC is OFF in protected state",
            PressureStatus::Misconnected => {
                "Sensor improperly connected, or broken filament (PR, CP only)"
            }
            PressureStatus::NoGauge => "Controller unable to determine sensor connection",
            PressureStatus::CombinationDisabled => "Combination disabled",
        }
    }
}

impl fmt::Display for PressureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Status tokens, longest first so that `CTRL_OFF` and `PROT_OFF` win over
/// `OFF` and `NO_GAUGE` over anything it contains.
const STATUS_TOKENS: &[(&str, PressureStatus)] = &[
    ("COMB_DISABLED", PressureStatus::CombinationDisabled),
    ("CTRL_OFF", PressureStatus::ControlledOff),
    ("PROT_OFF", PressureStatus::ProtectedOff),
    ("NO_GAUGE", PressureStatus::NoGauge),
    ("LowEmis", PressureStatus::LowEmission),
    ("MISCONN", PressureStatus::Misconnected),
    ("NOGAUGE", PressureStatus::NoGauge),
    ("WAIT", PressureStatus::Wait),
    ("LO<", PressureStatus::BelowRange),
    ("ATM", PressureStatus::Atmosphere),
    ("OFF", PressureStatus::Off),
];

/// One decoded pressure reading.
///
/// `value` is only meaningful when `status` is [`PressureStatus::Ok`]; it is
/// `0.0` otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub value: f64,
    pub status: PressureStatus,
}

impl Reading {
    /// The pressure, if the sensor reported one.
    pub fn pressure(&self) -> Option<f64> {
        (self.status == PressureStatus::Ok).then_some(self.value)
    }

    pub fn is_ok(&self) -> bool {
        self.status == PressureStatus::Ok
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            PressureStatus::Ok => f.write_str(&format_sci(self.value)),
            status => write!(f, "{status}"),
        }
    }
}

/// Decode a single pressure field.
///
/// ```
/// use mks937b::readings::{parse_reading, PressureStatus};
///
/// let r = parse_reading("4.50E-03").unwrap();
/// assert_eq!(r.pressure(), Some(4.5e-3));
///
/// let r = parse_reading("LO<").unwrap();
/// assert_eq!(r.status, PressureStatus::BelowRange);
/// ```
pub fn parse_reading(text: &str) -> Result<Reading> {
    if let Some(&(_, status)) = STATUS_TOKENS
        .iter()
        .find(|(token, _)| text.contains(token))
    {
        return Ok(Reading { value: 0.0, status });
    }

    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Reading {
            value,
            status: PressureStatus::Ok,
        }),
        _ => Err(Error::InvalidReading {
            got: text.to_string(),
        }),
    }
}

/// Decode a space-separated `PRZ` reply into one reading per channel.
///
/// The reply must hold exactly [`CHANNEL_COUNT`] fields; the first field
/// that fails to decode fails the whole call.
pub fn parse_readings(text: &str) -> Result<Vec<Reading>> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != CHANNEL_COUNT {
        return Err(Error::InvalidReading {
            got: text.to_string(),
        });
    }
    fields.into_iter().map(parse_reading).collect()
}

impl Mks937b {
    /// Read the pressure on a channel (1-6).
    pub async fn get_pressure(&self, channel: u8) -> Result<Reading> {
        validate::channel_in(channel, 1, 6)?;
        debug!(channel, "reading pressure");
        let response = self.query(&format!("PR{channel}")).await?;
        parse_reading(&response)
    }

    /// Read the pressures of all six channels.
    pub async fn get_pressures(&self) -> Result<Vec<Reading>> {
        debug!("reading all pressures");
        let response = self.query("PRZ").await?;
        parse_readings(&response)
    }

    /// Read the combined pressure of a channel (1 or 2) and its
    /// combination sensor.
    pub async fn get_pressure_combination(&self, channel: u8) -> Result<Reading> {
        validate::channel_in(channel, 1, 2)?;
        debug!(channel, "reading combination pressure");
        let response = self.query(&format!("PC{channel}")).await?;
        parse_reading(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_reading() {
        let r = parse_reading("4.50E-03").unwrap();
        assert_eq!(r.value, 4.5e-3);
        assert_eq!(r.status, PressureStatus::Ok);
        assert_eq!(r.status.description(), "OK");
    }

    #[test]
    fn below_range_token() {
        let r = parse_reading("LO<").unwrap();
        assert_eq!(r.value, 0.0);
        assert_eq!(r.status.description(), "Pressure lower than minimum");
        assert_eq!(r.pressure(), None);
    }

    #[test]
    fn no_gauge_tokens() {
        for token in ["NOGAUGE", "NO_GAUGE"] {
            let r = parse_reading(token).unwrap();
            assert_eq!(
                r.status.description(),
                "Controller unable to determine sensor connection"
            );
        }
    }

    #[test]
    fn controlled_off_is_not_plain_off() {
        assert_eq!(
            parse_reading("CTRL_OFF").unwrap().status,
            PressureStatus::ControlledOff
        );
        assert_eq!(
            parse_reading("PROT_OFF").unwrap().status,
            PressureStatus::ProtectedOff
        );
        assert_eq!(parse_reading("OFF").unwrap().status, PressureStatus::Off);
    }

    #[test]
    fn token_matches_as_substring() {
        let r = parse_reading(" LO<1.0E-04").unwrap();
        assert_eq!(r.status, PressureStatus::BelowRange);
        assert_eq!(r.value, 0.0);
    }

    #[test]
    fn tokens_are_ordered_longest_first() {
        for pair in STATUS_TOKENS.windows(2) {
            assert!(pair[0].0.len() >= pair[1].0.len(), "{:?}", pair);
        }
    }

    #[test]
    fn invalid_reading() {
        let err = parse_reading("xyz").unwrap_err();
        assert!(matches!(err, Error::InvalidReading { got } if got == "xyz"));
    }

    #[test]
    fn non_finite_is_invalid() {
        assert!(matches!(
            parse_reading("inf"),
            Err(Error::InvalidReading { .. })
        ));
        assert!(matches!(
            parse_reading("NaN"),
            Err(Error::InvalidReading { .. })
        ));
    }

    #[test]
    fn all_channels() {
        let readings = parse_readings("1.0E-03 2.0E-03 OFF 1.0E-04 LO< 3.0E-03").unwrap();
        assert_eq!(readings.len(), 6);
        assert_eq!(readings[0].pressure(), Some(1.0e-3));
        assert_eq!(readings[1].pressure(), Some(2.0e-3));
        assert_eq!(readings[2].status, PressureStatus::Off);
        assert_eq!(readings[3].pressure(), Some(1.0e-4));
        assert_eq!(readings[4].status, PressureStatus::BelowRange);
        assert_eq!(readings[5].pressure(), Some(3.0e-3));
    }

    #[test]
    fn all_channels_one_bad_field_fails() {
        assert!(matches!(
            parse_readings("1.0E-03 2.0E-03 ??? 1.0E-04 LO< 3.0E-03"),
            Err(Error::InvalidReading { got }) if got == "???"
        ));
    }

    #[test]
    fn all_channels_wrong_field_count() {
        assert!(matches!(
            parse_readings("1.0E-03 2.0E-03"),
            Err(Error::InvalidReading { .. })
        ));
        assert!(matches!(
            parse_readings("1 2 3 4 5 6 7"),
            Err(Error::InvalidReading { .. })
        ));
    }

    #[test]
    fn reading_display() {
        assert_eq!(parse_reading("4.50E-03").unwrap().to_string(), "4.50E-03");
        assert_eq!(parse_reading("7.60E+02").unwrap().to_string(), "7.60E+02");
        assert_eq!(
            parse_reading("WAIT").unwrap().to_string(),
            "CC or HC startup delay"
        );
    }
}
