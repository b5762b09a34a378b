//! mks937b-test-harness: mock transports for testing the MKS 937B client.
//!
//! This crate provides [`MockTransport`] for deterministic unit testing of
//! the protocol layer without a controller, and [`MockTcpServer`] for
//! exercising the TCP transport against a scripted device server.

pub mod mock_tcp;
pub mod mock_transport;

pub use mock_tcp::MockTcpServer;
pub use mock_transport::MockTransport;
