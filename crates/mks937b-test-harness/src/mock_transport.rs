//! Mock transport for deterministic testing of the protocol layer.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs. This lets you test frame encoding, reply
//! verification and reading decode without a controller attached.
//!
//! The mock is a cheap handle over shared state: clone it before boxing it
//! into a gateway and the clone can still inspect what was written.
//!
//! # Example
//!
//! ```
//! use mks937b_test_harness::MockTransport;
//!
//! let mock = MockTransport::new();
//! // When the protocol layer writes this frame, answer with that one.
//! mock.expect(b"@048BR?;FF", b"@048ACK9600;FF");
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use mks937b_core::error::{Error, Result};
use mks937b_core::transport::{Transport, find_delimiter};

/// A pre-loaded request/response pair.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be written.
    request: Vec<u8>,
    /// The bytes returned by subsequent `read_until()` calls, or `None` to
    /// simulate a controller that never answers.
    response: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
struct State {
    expectations: VecDeque<Expectation>,
    /// Bytes available to `read_until()`.
    pending: Vec<u8>,
    connected: bool,
    connect_calls: usize,
    sent_log: Vec<Vec<u8>>,
}

/// A mock [`Transport`] for testing without hardware.
///
/// Expectations are consumed in order. When `write()` is called, the data is
/// recorded and matched against the next expectation; its response becomes
/// readable through `read_until()`.
///
/// A write that does not match, or arrives with the queue exhausted, fails
/// with [`Error::Transport`]. A read with no response available fails with
/// [`Error::Timeout`], the way a real link would.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    /// Create a new mock transport in the disconnected state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new mock transport that is already connected.
    pub fn connected() -> Self {
        let mock = Self::new();
        mock.set_connected(true);
        mock
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A panicking test thread must not hide the mock from the others.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add an expected request/response pair.
    pub fn expect(&self, request: &[u8], response: &[u8]) {
        self.state().expectations.push_back(Expectation {
            request: request.to_vec(),
            response: Some(response.to_vec()),
        });
    }

    /// Add an expected request that the "controller" never answers.
    pub fn expect_no_reply(&self, request: &[u8]) {
        self.state().expectations.push_back(Expectation {
            request: request.to_vec(),
            response: None,
        });
    }

    /// Return a copy of every buffer written through this transport.
    pub fn sent_data(&self) -> Vec<Vec<u8>> {
        self.state().sent_log.clone()
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.state().expectations.len()
    }

    /// Return how many times `connect()` has been called.
    pub fn connect_calls(&self) -> usize {
        self.state().connect_calls
    }

    /// Set the connected state directly.
    pub fn set_connected(&self, connected: bool) {
        self.state().connected = connected;
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self) -> Result<()> {
        let mut state = self.state();
        state.connect_calls += 1;
        state.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        let mut state = self.state();
        state.connected = false;
        state.pending.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state().connected
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.state();
        if !state.connected {
            return Err(Error::NotConnected);
        }

        state.sent_log.push(data.to_vec());

        let expectation = state.expectations.pop_front().ok_or_else(|| {
            Error::Transport(format!(
                "no more expectations in mock transport (got {:?})",
                String::from_utf8_lossy(data)
            ))
        })?;

        if data != expectation.request.as_slice() {
            return Err(Error::Transport(format!(
                "unexpected write: expected {:?}, got {:?}",
                String::from_utf8_lossy(&expectation.request),
                String::from_utf8_lossy(data)
            )));
        }

        state.pending.clear();
        if let Some(response) = expectation.response {
            state.pending = response;
        }
        Ok(())
    }

    async fn read_until(&mut self, delimiter: &[u8]) -> Result<Vec<u8>> {
        let mut state = self.state();
        if !state.connected {
            return Err(Error::NotConnected);
        }
        if state.pending.is_empty() {
            return Err(Error::Timeout);
        }

        // Like a real link, return what arrived if the delimiter never does;
        // the protocol layer then rejects the truncated frame.
        let end = find_delimiter(&state.pending, delimiter).unwrap_or(state.pending.len());
        Ok(state.pending.drain(..end).collect())
    }
}
