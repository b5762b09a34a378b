//! Sensor settings on channels 1, 3 and 5: hot cathode filament and
//! emission, gas calibration, power and degas.

use tracing::debug;

use mks937b_core::error::Result;
use mks937b_core::types::{EmissionCurrent, Filament, GasType};

use crate::commands::{self, channel_mnemonic};
use crate::gauge::Mks937b;
use crate::protocol;
use crate::validate;

impl Mks937b {
    /// Read the active hot cathode filament (`AF`).
    pub async fn get_active_filament(&self, channel: u8) -> Result<Filament> {
        validate::control_channel(channel)?;
        self.query(&channel_mnemonic("AF", channel)).await?.parse()
    }

    pub async fn set_active_filament(&self, channel: u8, filament: Filament) -> Result<()> {
        validate::control_channel(channel)?;
        debug!(channel, %filament, "setting active filament");
        self.set(&channel_mnemonic("AF", channel), filament.as_str())
            .await
    }

    /// Read the hot cathode emission current (`EC`).
    pub async fn get_emission_current(&self, channel: u8) -> Result<EmissionCurrent> {
        validate::control_channel(channel)?;
        self.query(&channel_mnemonic("EC", channel)).await?.parse()
    }

    pub async fn set_emission_current(
        &self,
        channel: u8,
        current: EmissionCurrent,
    ) -> Result<()> {
        validate::control_channel(channel)?;
        debug!(channel, %current, "setting emission current");
        self.set(&channel_mnemonic("EC", channel), current.as_str())
            .await
    }

    /// Read the gas correction factor (`GC`).
    pub async fn get_gas_correction(&self, channel: u8) -> Result<f64> {
        self.query_f64("GC", channel).await
    }

    /// Set the gas correction factor, 0.1 to 50.0, sent with one decimal.
    pub async fn set_gas_correction(&self, channel: u8, factor: f64) -> Result<()> {
        validate::control_channel(channel)?;
        validate::range(
            validate::GAS_CORRECTION_MIN,
            validate::GAS_CORRECTION_MAX,
            factor,
        )?;
        debug!(channel, factor, "setting gas correction");
        self.set(
            &channel_mnemonic("GC", channel),
            &protocol::format_fixed1(factor),
        )
        .await
    }

    /// Read the hot cathode gas sensitivity (`SEN`).
    pub async fn get_gas_sensitivity(&self, channel: u8) -> Result<f64> {
        self.query_f64("SEN", channel).await
    }

    /// Set the gas sensitivity, 1.0 to 50.0, sent with one decimal.
    pub async fn set_gas_sensitivity(&self, channel: u8, sensitivity: f64) -> Result<()> {
        validate::control_channel(channel)?;
        validate::range(
            validate::GAS_SENSITIVITY_MIN,
            validate::GAS_SENSITIVITY_MAX,
            sensitivity,
        )?;
        debug!(channel, sensitivity, "setting gas sensitivity");
        self.set(
            &channel_mnemonic("SEN", channel),
            &protocol::format_fixed1(sensitivity),
        )
        .await
    }

    /// Read the calibration gas (`GT`).
    pub async fn get_gas_type(&self, channel: u8) -> Result<GasType> {
        validate::control_channel(channel)?;
        self.query(&channel_mnemonic("GT", channel)).await?.parse()
    }

    pub async fn set_gas_type(&self, channel: u8, gas: GasType) -> Result<()> {
        validate::control_channel(channel)?;
        debug!(channel, %gas, "setting gas type");
        self.set(&channel_mnemonic("GT", channel), gas.as_str()).await
    }

    /// Whether the sensor is powered (`CP`); for a cold cathode this is the
    /// high voltage.
    pub async fn get_power_status(&self, channel: u8) -> Result<bool> {
        validate::control_channel(channel)?;
        let response = self.query(&channel_mnemonic("CP", channel)).await?;
        Ok(commands::parse_on_off(&response))
    }

    pub async fn set_power_status(&self, channel: u8, on: bool) -> Result<()> {
        validate::control_channel(channel)?;
        debug!(channel, on, "setting power status");
        self.set(&channel_mnemonic("CP", channel), commands::on_off(on))
            .await
    }

    /// Whether a hot cathode degas cycle is running (`DG`).
    pub async fn get_degas_status(&self, channel: u8) -> Result<bool> {
        validate::control_channel(channel)?;
        let response = self.query(&channel_mnemonic("DG", channel)).await?;
        Ok(commands::parse_on_off(&response))
    }

    pub async fn set_degas_status(&self, channel: u8, on: bool) -> Result<()> {
        validate::control_channel(channel)?;
        debug!(channel, on, "setting degas status");
        self.set(&channel_mnemonic("DG", channel), commands::on_off(on))
            .await
    }

    /// Read the degas duration in seconds (`DGT`).
    pub async fn get_degas_time(&self, channel: u8) -> Result<u32> {
        validate::control_channel(channel)?;
        let mnemonic = channel_mnemonic("DGT", channel);
        let response = self.query(&mnemonic).await?;
        commands::parse_u32(&mnemonic, &response)
    }

    /// Set the degas duration, 5 to 240 seconds.
    pub async fn set_degas_time(&self, channel: u8, seconds: u32) -> Result<()> {
        validate::control_channel(channel)?;
        validate::range(
            f64::from(validate::DEGAS_TIME_MIN),
            f64::from(validate::DEGAS_TIME_MAX),
            f64::from(seconds),
        )?;
        debug!(channel, seconds, "setting degas time");
        self.set(&channel_mnemonic("DGT", channel), &seconds.to_string())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mks937b_core::error::Error;
    use mks937b_test_harness::MockTransport;

    fn gauge(mock: &MockTransport) -> Mks937b {
        Mks937b::new(48, Box::new(mock.clone()))
    }

    #[tokio::test]
    async fn active_filament() {
        let mock = MockTransport::connected();
        mock.expect(b"@048AF1?;FF", b"@048ACK1;FF");
        mock.expect(b"@048AF1!2;FF", b"@048ACK2;FF");
        let gauge = gauge(&mock);

        assert_eq!(gauge.get_active_filament(1).await.unwrap(), Filament::One);
        gauge.set_active_filament(1, Filament::Two).await.unwrap();
    }

    #[tokio::test]
    async fn emission_current() {
        let mock = MockTransport::connected();
        mock.expect(b"@048EC3?;FF", b"@048ACK20UA;FF");
        mock.expect(b"@048EC3!AUTO100;FF", b"@048ACKAUTO100;FF");
        let gauge = gauge(&mock);

        assert_eq!(
            gauge.get_emission_current(3).await.unwrap(),
            EmissionCurrent::Micro20
        );
        gauge
            .set_emission_current(3, EmissionCurrent::Auto100)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn emission_current_unknown_reply() {
        let mock = MockTransport::connected();
        mock.expect(b"@048EC1?;FF", b"@048ACK50UA;FF");
        let gauge = gauge(&mock);
        assert!(matches!(
            gauge.get_emission_current(1).await,
            Err(Error::InvalidEmissionCurrent { got }) if got == "50UA"
        ));
    }

    #[tokio::test]
    async fn gas_correction() {
        let mock = MockTransport::connected();
        mock.expect(b"@048GC1?;FF", b"@048ACK1.0;FF");
        mock.expect(b"@048GC1!0.5;FF", b"@048ACK0.5;FF");
        let gauge = gauge(&mock);

        assert_eq!(gauge.get_gas_correction(1).await.unwrap(), 1.0);
        gauge.set_gas_correction(1, 0.5).await.unwrap();
        assert!(matches!(
            gauge.set_gas_correction(1, 0.05).await,
            Err(Error::InvalidRangeExp { .. })
        ));
        assert_eq!(mock.sent_data().len(), 2);
    }

    #[tokio::test]
    async fn gas_sensitivity_reports_its_own_bounds() {
        let mock = MockTransport::connected();
        mock.expect(b"@048SEN5!10.0;FF", b"@048ACK10.0;FF");
        let gauge = gauge(&mock);

        gauge.set_gas_sensitivity(5, 10.0).await.unwrap();
        match gauge.set_gas_sensitivity(5, 0.5).await.unwrap_err() {
            Error::InvalidRangeExp { min, max, got } => {
                assert_eq!(min, 1.0);
                assert_eq!(max, 50.0);
                assert_eq!(got, 0.5);
            }
            other => panic!("expected InvalidRangeExp, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn gas_type() {
        let mock = MockTransport::connected();
        mock.expect(b"@048GT1?;FF", b"@048ACKNITROGEN;FF");
        mock.expect(b"@048GT1!ARGON;FF", b"@048ACKARGON;FF");
        let gauge = gauge(&mock);

        assert_eq!(gauge.get_gas_type(1).await.unwrap(), GasType::Nitrogen);
        gauge.set_gas_type(1, GasType::Argon).await.unwrap();
    }

    #[tokio::test]
    async fn power_and_degas_status() {
        let mock = MockTransport::connected();
        mock.expect(b"@048CP1?;FF", b"@048ACKOFF;FF");
        mock.expect(b"@048CP1!ON;FF", b"@048ACKON;FF");
        mock.expect(b"@048DG3?;FF", b"@048ACKON;FF");
        mock.expect(b"@048DG3!OFF;FF", b"@048ACKOFF;FF");
        let gauge = gauge(&mock);

        assert!(!gauge.get_power_status(1).await.unwrap());
        gauge.set_power_status(1, true).await.unwrap();
        assert!(gauge.get_degas_status(3).await.unwrap());
        gauge.set_degas_status(3, false).await.unwrap();
    }

    #[tokio::test]
    async fn degas_time() {
        let mock = MockTransport::connected();
        mock.expect(b"@048DGT1?;FF", b"@048ACK120;FF");
        mock.expect(b"@048DGT1!240;FF", b"@048ACK240;FF");
        let gauge = gauge(&mock);

        assert_eq!(gauge.get_degas_time(1).await.unwrap(), 120);
        gauge.set_degas_time(1, 240).await.unwrap();
        assert!(matches!(
            gauge.set_degas_time(1, 4).await,
            Err(Error::InvalidRangeExp { .. })
        ));
        assert!(matches!(
            gauge.set_degas_time(1, 241).await,
            Err(Error::InvalidRangeExp { .. })
        ));
        assert_eq!(mock.sent_data().len(), 2);
    }

    #[tokio::test]
    async fn sensor_channel_must_be_odd() {
        let mock = MockTransport::connected();
        let gauge = gauge(&mock);
        assert!(matches!(
            gauge.set_degas_status(4, true).await,
            Err(Error::InvalidChannelControl { got: 4 })
        ));
        assert!(mock.sent_data().is_empty());
    }
}
