//! Controller-wide settings: address, serial link and pressure unit.

use tracing::debug;

use mks937b_core::error::Result;
use mks937b_core::types::{BaudRate, Parity, PressureUnit};

use crate::commands;
use crate::gauge::Mks937b;
use crate::protocol;
use crate::validate;

impl Mks937b {
    /// Read the address the controller answers to.
    pub async fn get_address(&self) -> Result<u32> {
        let response = self.query("AD").await?;
        commands::parse_u32("AD", &response)
    }

    /// Change the controller's address.
    ///
    /// The reply still comes from the current address. This instance keeps
    /// talking to the old address; build a new one to reach the controller
    /// afterwards.
    pub async fn set_address(&self, address: u32) -> Result<()> {
        validate::address(address)?;
        debug!(address, "setting controller address");
        self.set("AD", &protocol::format_address(address)).await
    }

    pub async fn get_baud_rate(&self) -> Result<BaudRate> {
        self.query("BR").await?.parse()
    }

    /// Change the controller's baud rate. The link must be reopened at the
    /// new rate before the next request.
    pub async fn set_baud_rate(&self, baud_rate: BaudRate) -> Result<()> {
        debug!(%baud_rate, "setting baud rate");
        self.set("BR", baud_rate.as_str()).await
    }

    pub async fn get_parity(&self) -> Result<Parity> {
        self.query("PAR").await?.parse()
    }

    pub async fn set_parity(&self, parity: Parity) -> Result<()> {
        debug!(%parity, "setting parity");
        self.set("PAR", parity.as_str()).await
    }

    /// Read the RS-485 turnaround delay in milliseconds.
    pub async fn get_delay_time(&self) -> Result<u32> {
        let response = self.query("DLY").await?;
        commands::parse_u32("DLY", &response)
    }

    /// Set the RS-485 turnaround delay in milliseconds (factory default 8).
    pub async fn set_delay_time(&self, delay_ms: u32) -> Result<()> {
        debug!(delay_ms, "setting delay time");
        self.set("DLY", &delay_ms.to_string()).await
    }

    pub async fn get_pressure_unit(&self) -> Result<PressureUnit> {
        self.query("U").await?.parse()
    }

    pub async fn set_pressure_unit(&self, unit: PressureUnit) -> Result<()> {
        debug!(%unit, "setting pressure unit");
        self.set("U", unit.as_str()).await
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
    async fn address_round_trip() {
        let mock = MockTransport::connected();
        mock.expect(b"@048AD?;FF", b"@048ACK048;FF");
        mock.expect(b"@048AD!005;FF", b"@048ACK005;FF");
        let gauge = gauge(&mock);

        assert_eq!(gauge.get_address().await.unwrap(), 48);
        gauge.set_address(5).await.unwrap();
    }

    #[tokio::test]
    async fn set_address_out_of_range() {
        let mock = MockTransport::connected();
        let gauge = gauge(&mock);
        assert!(matches!(
            gauge.set_address(255).await,
            Err(Error::InvalidAddress { got: 255 })
        ));
        assert!(mock.sent_data().is_empty());
    }

    #[tokio::test]
    async fn baud_rate() {
        let mock = MockTransport::connected();
        mock.expect(b"@048BR?;FF", b"@048ACK19200;FF");
        mock.expect(b"@048BR!9600;FF", b"@048ACK9600;FF");
        let gauge = gauge(&mock);

        assert_eq!(gauge.get_baud_rate().await.unwrap(), BaudRate::B19200);
        gauge.set_baud_rate(BaudRate::B9600).await.unwrap();
    }

    #[tokio::test]
    async fn baud_rate_reply_outside_set() {
        let mock = MockTransport::connected();
        mock.expect(b"@048BR?;FF", b"@048ACK4800;FF");
        let gauge = gauge(&mock);
        assert!(matches!(
            gauge.get_baud_rate().await,
            Err(Error::InvalidBaudRate { got }) if got == "4800"
        ));
    }

    #[tokio::test]
    async fn parity() {
        let mock = MockTransport::connected();
        mock.expect(b"@048PAR?;FF", b"@048ACKNONE;FF");
        mock.expect(b"@048PAR!EVEN;FF", b"@048ACKEVEN;FF");
        let gauge = gauge(&mock);

        assert_eq!(gauge.get_parity().await.unwrap(), Parity::None);
        gauge.set_parity(Parity::Even).await.unwrap();
    }

    #[tokio::test]
    async fn delay_time() {
        let mock = MockTransport::connected();
        mock.expect(b"@048DLY?;FF", b"@048ACK8;FF");
        mock.expect(b"@048DLY!20;FF", b"@048ACK20;FF");
        let gauge = gauge(&mock);

        assert_eq!(gauge.get_delay_time().await.unwrap(), 8);
        gauge.set_delay_time(20).await.unwrap();
    }

    #[tokio::test]
    async fn pressure_unit() {
        let mock = MockTransport::connected();
        mock.expect(b"@048U?;FF", b"@048ACKTorr;FF");
        mock.expect(b"@048U!MBAR;FF", b"@048ACKMBAR;FF");
        let gauge = gauge(&mock);

        assert_eq!(
            gauge.get_pressure_unit().await.unwrap(),
            PressureUnit::Torr
        );
        gauge.set_pressure_unit(PressureUnit::Mbar).await.unwrap();
    }
}
