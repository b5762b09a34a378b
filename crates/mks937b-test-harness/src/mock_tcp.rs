//! Scripted controller behind a TCP socket.
//!
//! [`MockTcpServer`] plays the role of the serial device server an MKS 937B
//! is usually reached through. It binds a random localhost port, accepts one
//! client and works through a script: read one `;FF`-terminated request,
//! compare it with the next scripted frame, send the scripted reply. This
//! drives a real `TcpTransport` end to end, including replies split across
//! several TCP segments.
//!
//! # Example
//!
//! ```
//! use mks937b_test_harness::MockTcpServer;
//!
//! # async fn example() -> mks937b_core::Result<()> {
//! let mut server = MockTcpServer::new().await?;
//! server.expect(b"@048PR1?;FF", b"@048ACK1.00E-03;FF");
//! server.start();
//!
//! let addr = server.addr().to_string();
//! // ... connect a TcpTransport to `addr` and talk to it ...
//! server.wait().await.expect("script completed");
//! # Ok(())
//! # }
//! ```

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use mks937b_core::error::{Error, Result};
use mks937b_core::transport::find_delimiter;

const FRAME_END: &[u8] = b";FF";

/// What the controller does with one request.
#[derive(Debug, Clone)]
struct Step {
    request: Vec<u8>,
    /// Reply segments written one after another; empty means stay silent.
    reply: Vec<Vec<u8>>,
}

/// A scripted controller listening on localhost.
///
/// [`start`](MockTcpServer::start) moves the script into a background task.
/// The first deviation from the script (wrong frame, early hang-up) ends the
/// session; [`wait`](MockTcpServer::wait) reports it.
pub struct MockTcpServer {
    addr: String,
    listener: Option<TcpListener>,
    script: Vec<Step>,
    task: Option<JoinHandle<std::result::Result<(), String>>>,
}

impl MockTcpServer {
    /// Bind a new server on a random localhost port.
    ///
    /// Clients may connect as soon as this returns; they are accepted once
    /// the server is started.
    pub async fn new() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| Error::Transport(format!("mock server bind failed: {e}")))?;
        let addr = listener.local_addr()?.to_string();
        Ok(Self {
            addr,
            listener: Some(listener),
            script: Vec::new(),
            task: None,
        })
    }

    /// Answer `request` with `reply` in a single write.
    pub fn expect(&mut self, request: &[u8], reply: &[u8]) {
        self.push(request, vec![reply.to_vec()]);
    }

    /// Answer `request` with `segments`, flushed separately so the client
    /// sees a fragmented reply.
    pub fn expect_fragmented(&mut self, request: &[u8], segments: &[&[u8]]) {
        self.push(request, segments.iter().map(|s| s.to_vec()).collect());
    }

    /// Accept `request` and never answer it.
    pub fn expect_no_reply(&mut self, request: &[u8]) {
        self.push(request, Vec::new());
    }

    fn push(&mut self, request: &[u8], reply: Vec<Vec<u8>>) {
        self.script.push(Step {
            request: request.to_vec(),
            reply,
        });
    }

    /// `host:port` the server listens on.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Run the script in a background task. A second call does nothing.
    pub fn start(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        let script = std::mem::take(&mut self.script);
        self.task = Some(tokio::spawn(serve(listener, script)));
    }

    /// Wait for the script to finish.
    pub async fn wait(self) -> std::result::Result<(), String> {
        match self.task {
            Some(task) => task
                .await
                .map_err(|e| format!("mock server task failed: {e}"))?,
            None => Ok(()),
        }
    }
}

async fn serve(listener: TcpListener, script: Vec<Step>) -> std::result::Result<(), String> {
    let (mut stream, _) = listener
        .accept()
        .await
        .map_err(|e| format!("accept failed: {e}"))?;
    let mut inbox = Vec::new();

    for (n, step) in script.iter().enumerate() {
        let frame = next_frame(&mut stream, &mut inbox)
            .await
            .map_err(|e| format!("step {n}: {e}"))?;
        if frame != step.request {
            return Err(format!(
                "step {n}: request mismatch: expected {:?}, got {:?}",
                String::from_utf8_lossy(&step.request),
                String::from_utf8_lossy(&frame)
            ));
        }
        for segment in &step.reply {
            stream
                .write_all(segment)
                .await
                .map_err(|e| format!("step {n}: write failed: {e}"))?;
            stream
                .flush()
                .await
                .map_err(|e| format!("step {n}: flush failed: {e}"))?;
        }
    }
    Ok(())
}

/// Read one request frame, keeping anything after its terminator in `inbox`.
async fn next_frame(stream: &mut TcpStream, inbox: &mut Vec<u8>) -> std::result::Result<Vec<u8>, String> {
    loop {
        if let Some(end) = find_delimiter(inbox, FRAME_END) {
            return Ok(inbox.drain(..end).collect());
        }
        let mut chunk = [0u8; 64];
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(|e| format!("read failed: {e}"))?;
        if n == 0 {
            return Err(format!(
                "client hung up with {:?} unterminated",
                String::from_utf8_lossy(inbox)
            ));
        }
        inbox.extend_from_slice(&chunk[..n]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_reply(client: &mut TcpStream) -> Vec<u8> {
        let mut inbox = Vec::new();
        next_frame(client, &mut inbox).await.unwrap()
    }

    #[tokio::test]
    async fn answers_in_script_order() {
        let mut server = MockTcpServer::new().await.unwrap();
        server.expect(b"@048U?;FF", b"@048ACKTorr;FF");
        server.expect(b"@048BR?;FF", b"@048ACK9600;FF");
        server.start();

        let mut client = TcpStream::connect(server.addr()).await.unwrap();
        client.write_all(b"@048U?;FF").await.unwrap();
        assert_eq!(read_reply(&mut client).await, b"@048ACKTorr;FF");
        client.write_all(b"@048BR?;FF").await.unwrap();
        assert_eq!(read_reply(&mut client).await, b"@048ACK9600;FF");

        server.wait().await.unwrap();
    }

    #[tokio::test]
    async fn fragmented_reply_arrives_whole() {
        let mut server = MockTcpServer::new().await.unwrap();
        server.expect_fragmented(b"@048PR1?;FF", &[b"@048ACK4.5", b"0E-03;", b"FF"]);
        server.start();

        let mut client = TcpStream::connect(server.addr()).await.unwrap();
        client.write_all(b"@048PR1?;FF").await.unwrap();
        assert_eq!(read_reply(&mut client).await, b"@048ACK4.50E-03;FF");

        server.wait().await.unwrap();
    }

    #[tokio::test]
    async fn reports_mismatch() {
        let mut server = MockTcpServer::new().await.unwrap();
        server.expect(b"@048U?;FF", b"@048ACKTorr;FF");
        server.start();

        let mut client = TcpStream::connect(server.addr()).await.unwrap();
        client.write_all(b"@048BR?;FF").await.unwrap();

        let err = server.wait().await.unwrap_err();
        assert!(err.contains("request mismatch"), "{err}");
    }

    #[tokio::test]
    async fn reports_early_hang_up() {
        let mut server = MockTcpServer::new().await.unwrap();
        server.expect(b"@048U?;FF", b"@048ACKTorr;FF");
        server.start();

        let mut client = TcpStream::connect(server.addr()).await.unwrap();
        client.write_all(b"@048U").await.unwrap();
        drop(client);

        let err = server.wait().await.unwrap_err();
        assert!(err.contains("hung up"), "{err}");
    }
}
