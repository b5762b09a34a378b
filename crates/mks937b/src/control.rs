//! Relay control set points for the sensor channels (1, 3 and 5).
//!
//! Pressures are sent in the controller's `%.2E` notation and must come back
//! byte for byte, so every setter formats through
//! [`protocol::format_sci`].

use tracing::debug;

use mks937b_core::error::Result;
use mks937b_core::types::{ControlChannel, ControlMode};

use crate::commands::{self, channel_mnemonic};
use crate::gauge::Mks937b;
use crate::protocol;
use crate::validate;

impl Mks937b {
    /// Read the protection set point (`PRO`) in the current unit.
    pub async fn get_protection_target(&self, channel: u8) -> Result<f64> {
        self.query_f64("PRO", channel).await
    }

    /// Set the protection set point; `0.0` disables protection.
    pub async fn set_protection_target(&self, channel: u8, target: f64) -> Result<()> {
        validate::control_channel(channel)?;
        validate::protection_target(target)?;
        debug!(channel, target, "setting protection target");
        self.set(
            &channel_mnemonic("PRO", channel),
            &protocol::format_sci(target),
        )
        .await
    }

    /// Read the control set point (`CSP`).
    pub async fn get_target(&self, channel: u8) -> Result<f64> {
        self.query_f64("CSP", channel).await
    }

    /// Set the control set point.
    ///
    /// Values above 1e-2 Torr only take effect with upper control enabled
    /// (see [`set_upper_control_status`](Self::set_upper_control_status)).
    pub async fn set_target(&self, channel: u8, target: f64) -> Result<()> {
        validate::control_channel(channel)?;
        validate::range(validate::CSP_MIN, validate::CSP_MAX, target)?;
        debug!(channel, target, "setting control target");
        self.set(
            &channel_mnemonic("CSP", channel),
            &protocol::format_sci(target),
        )
        .await
    }

    /// Whether the extended control set point range (`XCS`) is enabled.
    pub async fn get_upper_control_status(&self, channel: u8) -> Result<bool> {
        validate::control_channel(channel)?;
        let response = self.query(&channel_mnemonic("XCS", channel)).await?;
        Ok(commands::parse_on_off(&response))
    }

    pub async fn set_upper_control_status(&self, channel: u8, enabled: bool) -> Result<()> {
        validate::control_channel(channel)?;
        debug!(channel, enabled, "setting upper control status");
        self.set(&channel_mnemonic("XCS", channel), commands::on_off(enabled))
            .await
    }

    /// Read the control set point hysteresis (`CHP`).
    pub async fn get_hysteresis_target(&self, channel: u8) -> Result<f64> {
        self.query_f64("CHP", channel).await
    }

    /// Set the control set point hysteresis.
    ///
    /// The lower bound depends on the channel's current control set point,
    /// so this reads `CSP` first and then writes `CHP`. The two exchanges are
    /// separate; another caller may change `CSP` in between.
    pub async fn set_hysteresis_target(&self, channel: u8, target: f64) -> Result<()> {
        validate::control_channel(channel)?;
        let csp = self.get_target(channel).await?;
        validate::hysteresis(csp, target)?;
        debug!(channel, target, csp, "setting hysteresis target");
        self.set(
            &channel_mnemonic("CHP", channel),
            &protocol::format_sci(target),
        )
        .await
    }

    /// Read which relay the channel's sensor drives (`CSE`).
    pub async fn get_control_channel(&self, channel: u8) -> Result<ControlChannel> {
        validate::control_channel(channel)?;
        self.query(&channel_mnemonic("CSE", channel)).await?.parse()
    }

    pub async fn set_control_channel(&self, channel: u8, target: ControlChannel) -> Result<()> {
        validate::control_channel(channel)?;
        debug!(channel, %target, "setting control channel");
        self.set(&channel_mnemonic("CSE", channel), target.as_str())
            .await
    }

    /// Read the control mode (`CTL`).
    pub async fn get_control_mode(&self, channel: u8) -> Result<ControlMode> {
        validate::control_channel(channel)?;
        self.query(&channel_mnemonic("CTL", channel)).await?.parse()
    }

    pub async fn set_control_mode(&self, channel: u8, mode: ControlMode) -> Result<()> {
        validate::control_channel(channel)?;
        debug!(channel, %mode, "setting control mode");
        self.set(&channel_mnemonic("CTL", channel), mode.as_str())
            .await
    }

    /// Query a per-channel numeric parameter on a control channel.
    pub(crate) async fn query_f64(&self, base: &str, channel: u8) -> Result<f64> {
        validate::control_channel(channel)?;
        let mnemonic = channel_mnemonic(base, channel);
        let response = self.query(&mnemonic).await?;
        commands::parse_f64(&mnemonic, &response)
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
    async fn channel_must_be_odd() {
        let mock = MockTransport::connected();
        let gauge = gauge(&mock);
        assert!(matches!(
            gauge.get_target(2).await,
            Err(Error::InvalidChannelControl { got: 2 })
        ));
        assert!(matches!(
            gauge.set_control_mode(6, ControlMode::Auto).await,
            Err(Error::InvalidChannelControl { got: 6 })
        ));
        assert!(mock.sent_data().is_empty());
    }

    #[tokio::test]
    async fn protection_target() {
        let mock = MockTransport::connected();
        mock.expect(b"@048PRO1?;FF", b"@048ACK5.00E-03;FF");
        mock.expect(b"@048PRO1!5.00E-03;FF", b"@048ACK5.00E-03;FF");
        mock.expect(b"@048PRO3!0.00E+00;FF", b"@048ACK0.00E+00;FF");
        let gauge = gauge(&mock);

        assert_eq!(gauge.get_protection_target(1).await.unwrap(), 5e-3);
        gauge.set_protection_target(1, 5e-3).await.unwrap();
        gauge.set_protection_target(3, 0.0).await.unwrap();
    }

    #[tokio::test]
    async fn protection_target_out_of_range() {
        let mock = MockTransport::connected();
        let gauge = gauge(&mock);
        assert!(matches!(
            gauge.set_protection_target(1, 5e-2).await,
            Err(Error::InvalidPRO { .. })
        ));
        assert!(mock.sent_data().is_empty());
    }

    #[tokio::test]
    async fn control_target() {
        let mock = MockTransport::connected();
        mock.expect(b"@048CSP5!1.00E-03;FF", b"@048ACK1.00E-03;FF");
        let gauge = gauge(&mock);

        gauge.set_target(5, 1e-3).await.unwrap();
        assert!(matches!(
            gauge.set_target(5, 1e-4).await,
            Err(Error::InvalidRangeExp { .. })
        ));
        assert_eq!(mock.sent_data().len(), 1);
    }

    #[tokio::test]
    async fn control_target_unparseable_reply() {
        let mock = MockTransport::connected();
        mock.expect(b"@048CSP1?;FF", b"@048ACKabc;FF");
        let gauge = gauge(&mock);
        match gauge.get_target(1).await.unwrap_err() {
            Error::InvalidValue { command, got } => {
                assert_eq!(command, "CSP1");
                assert_eq!(got, "abc");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn upper_control_status() {
        let mock = MockTransport::connected();
        mock.expect(b"@048XCS1?;FF", b"@048ACKON;FF");
        mock.expect(b"@048XCS1!OFF;FF", b"@048ACKOFF;FF");
        let gauge = gauge(&mock);

        assert!(gauge.get_upper_control_status(1).await.unwrap());
        gauge.set_upper_control_status(1, false).await.unwrap();
    }

    #[tokio::test]
    async fn hysteresis_reads_csp_first() {
        let mock = MockTransport::connected();
        mock.expect(b"@048CSP1?;FF", b"@048ACK1.00E-03;FF");
        mock.expect(b"@048CSP1?;FF", b"@048ACK1.00E-03;FF");
        mock.expect(b"@048CHP1!1.40E-03;FF", b"@048ACK1.40E-03;FF");
        let gauge = gauge(&mock);

        // Below 1.2 x CSP.
        assert!(matches!(
            gauge.set_hysteresis_target(1, 1.0e-3).await,
            Err(Error::InvalidRangeExp { .. })
        ));
        gauge.set_hysteresis_target(1, 1.4e-3).await.unwrap();

        assert_eq!(
            mock.sent_data(),
            vec![
                b"@048CSP1?;FF".to_vec(),
                b"@048CSP1?;FF".to_vec(),
                b"@048CHP1!1.40E-03;FF".to_vec(),
            ]
        );
    }

    #[tokio::test]
    async fn hysteresis_get() {
        let mock = MockTransport::connected();
        mock.expect(b"@048CHP3?;FF", b"@048ACK1.50E-03;FF");
        let gauge = gauge(&mock);
        assert_eq!(gauge.get_hysteresis_target(3).await.unwrap(), 1.5e-3);
    }

    #[tokio::test]
    async fn control_channel_and_mode() {
        let mock = MockTransport::connected();
        mock.expect(b"@048CSE1?;FF", b"@048ACKA1;FF");
        mock.expect(b"@048CSE1!B2;FF", b"@048ACKB2;FF");
        mock.expect(b"@048CTL3?;FF", b"@048ACKSAFE;FF");
        mock.expect(b"@048CTL3!AUTO;FF", b"@048ACKAUTO;FF");
        let gauge = gauge(&mock);

        assert_eq!(
            gauge.get_control_channel(1).await.unwrap(),
            ControlChannel::A1
        );
        gauge.set_control_channel(1, ControlChannel::B2).await.unwrap();
        assert_eq!(gauge.get_control_mode(3).await.unwrap(), ControlMode::Safe);
        gauge.set_control_mode(3, ControlMode::Auto).await.unwrap();
    }

    #[tokio::test]
    async fn control_mode_unknown_reply() {
        let mock = MockTransport::connected();
        mock.expect(b"@048CTL1?;FF", b"@048ACKMANUAL;FF");
        let gauge = gauge(&mock);
        assert!(matches!(
            gauge.get_control_mode(1).await,
            Err(Error::InvalidControlMode { .. })
        ));
    }
}
