//! Enumerated controller parameters.
//!
//! Every parameter the MKS 937B accepts from a fixed set is modelled as a
//! closed enum. [`as_str`](BaudRate::as_str) yields the exact token sent on
//! the wire; `FromStr` accepts that token (case-insensitively) and fails with
//! the parameter's own [`Error`] variant, so both user input and controller
//! replies go through the same check.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

fn lookup<T: Copy>(all: &[T], token: &str, as_str: fn(&T) -> &'static str) -> Option<T> {
    let token = token.trim();
    all.iter()
        .find(|v| as_str(v).eq_ignore_ascii_case(token))
        .copied()
}

/// Serial baud rates supported by the controller (`BR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaudRate {
    B9600,
    B19200,
    B38400,
    B57600,
    B115200,
}

impl BaudRate {
    pub const ALL: [BaudRate; 5] = [
        BaudRate::B9600,
        BaudRate::B19200,
        BaudRate::B38400,
        BaudRate::B57600,
        BaudRate::B115200,
    ];

    /// Baud rate in bits per second.
    pub fn bps(&self) -> u32 {
        match self {
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115_200,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BaudRate::B9600 => "9600",
            BaudRate::B19200 => "19200",
            BaudRate::B38400 => "38400",
            BaudRate::B57600 => "57600",
            BaudRate::B115200 => "115200",
        }
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = Error;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        BaudRate::ALL
            .into_iter()
            .find(|b| b.bps() == bps)
            .ok_or_else(|| Error::InvalidBaudRate {
                got: bps.to_string(),
            })
    }
}

impl FromStr for BaudRate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&BaudRate::ALL, s, BaudRate::as_str).ok_or_else(|| Error::InvalidBaudRate {
            got: s.to_string(),
        })
    }
}

/// Serial parity (`PAR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl Parity {
    pub const ALL: [Parity; 3] = [Parity::None, Parity::Even, Parity::Odd];

    pub fn as_str(&self) -> &'static str {
        match self {
            Parity::None => "NONE",
            Parity::Even => "EVEN",
            Parity::Odd => "ODD",
        }
    }
}

impl FromStr for Parity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&Parity::ALL, s, Parity::as_str).ok_or_else(|| Error::InvalidParity {
            got: s.to_string(),
        })
    }
}

/// Pressure display/reporting unit (`U`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PressureUnit {
    Torr,
    Mbar,
    Pascal,
    Micron,
}

impl PressureUnit {
    pub const ALL: [PressureUnit; 4] = [
        PressureUnit::Torr,
        PressureUnit::Mbar,
        PressureUnit::Pascal,
        PressureUnit::Micron,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PressureUnit::Torr => "Torr",
            PressureUnit::Mbar => "MBAR",
            PressureUnit::Pascal => "PASCAL",
            PressureUnit::Micron => "Micron",
        }
    }
}

impl FromStr for PressureUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&PressureUnit::ALL, s, PressureUnit::as_str).ok_or_else(|| Error::InvalidUnit {
            got: s.to_string(),
        })
    }
}

/// Control mode of a sensor channel (`CTL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlMode {
    /// HC/CC can be turned on or off by the controlling sensor.
    Auto,
    /// The controlling sensor can turn the sensor off but not on.
    Safe,
    /// Control disabled.
    Off,
}

impl ControlMode {
    pub const ALL: [ControlMode; 3] = [ControlMode::Auto, ControlMode::Safe, ControlMode::Off];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::Auto => "AUTO",
            ControlMode::Safe => "SAFE",
            ControlMode::Off => "OFF",
        }
    }
}

impl FromStr for ControlMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&ControlMode::ALL, s, ControlMode::as_str).ok_or_else(|| {
            Error::InvalidControlMode {
                got: s.to_string(),
            }
        })
    }
}

/// Channel whose reading controls a sensor (`CSE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlChannel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
    Off,
}

impl ControlChannel {
    pub const ALL: [ControlChannel; 7] = [
        ControlChannel::A1,
        ControlChannel::A2,
        ControlChannel::B1,
        ControlChannel::B2,
        ControlChannel::C1,
        ControlChannel::C2,
        ControlChannel::Off,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlChannel::A1 => "A1",
            ControlChannel::A2 => "A2",
            ControlChannel::B1 => "B1",
            ControlChannel::B2 => "B2",
            ControlChannel::C1 => "C1",
            ControlChannel::C2 => "C2",
            ControlChannel::Off => "OFF",
        }
    }
}

impl FromStr for ControlChannel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&ControlChannel::ALL, s, ControlChannel::as_str).ok_or_else(|| Error::InvalidCSE {
            got: s.to_string(),
        })
    }
}

/// Active hot cathode filament (`AF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filament {
    One,
    Two,
}

impl Filament {
    pub const ALL: [Filament; 2] = [Filament::One, Filament::Two];

    pub fn as_str(&self) -> &'static str {
        match self {
            Filament::One => "1",
            Filament::Two => "2",
        }
    }
}

impl TryFrom<u32> for Filament {
    type Error = Error;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Filament::One),
            2 => Ok(Filament::Two),
            _ => Err(Error::InvalidFilament { got: n.to_string() }),
        }
    }
}

impl FromStr for Filament {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&Filament::ALL, s, Filament::as_str).ok_or_else(|| Error::InvalidFilament {
            got: s.to_string(),
        })
    }
}

/// Hot cathode emission current (`EC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmissionCurrent {
    Micro20,
    Micro100,
    Auto20,
    Auto100,
}

impl EmissionCurrent {
    pub const ALL: [EmissionCurrent; 4] = [
        EmissionCurrent::Micro20,
        EmissionCurrent::Micro100,
        EmissionCurrent::Auto20,
        EmissionCurrent::Auto100,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmissionCurrent::Micro20 => "20UA",
            EmissionCurrent::Micro100 => "100UA",
            EmissionCurrent::Auto20 => "AUTO20",
            EmissionCurrent::Auto100 => "AUTO100",
        }
    }
}

impl FromStr for EmissionCurrent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&EmissionCurrent::ALL, s, EmissionCurrent::as_str).ok_or_else(|| {
            Error::InvalidEmissionCurrent {
                got: s.to_string(),
            }
        })
    }
}

/// Gas type used for sensor calibration (`GT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GasType {
    Nitrogen,
    Argon,
    Helium,
}

impl GasType {
    pub const ALL: [GasType; 3] = [GasType::Nitrogen, GasType::Argon, GasType::Helium];

    pub fn as_str(&self) -> &'static str {
        match self {
            GasType::Nitrogen => "NITROGEN",
            GasType::Argon => "ARGON",
            GasType::Helium => "HELIUM",
        }
    }
}

impl FromStr for GasType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&GasType::ALL, s, GasType::as_str).ok_or_else(|| Error::InvalidGas {
            got: s.to_string(),
        })
    }
}

macro_rules! display_as_token {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_token!(
    BaudRate,
    Parity,
    PressureUnit,
    ControlMode,
    ControlChannel,
    Filament,
    EmissionCurrent,
    GasType,
);
