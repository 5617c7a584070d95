//! Session transports.
//!
//! A transport is the byte pipe behind a session: a TCP socket for network
//! sessions, a pseudo-terminal for local shell sessions. All transports share
//! one shape: blocking `&self` reads and writes plus a `close` that unblocks
//! any in-flight read, so the owning manager can cancel a receive loop from
//! another thread.
//!
//! Security negotiation and authentication are delegated to the underlying
//! transport layer and are not handled here.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::Mutex;
use std::time::Duration;

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to resolve {0}")]
    Resolve(String),

    #[error("failed to connect: {0}")]
    Connect(#[source] io::Error),

    #[error("failed to read from transport: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write to transport: {0}")]
    Write(#[source] io::Error),

    #[error("failed to spawn shell: {0}")]
    Spawn(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Credentials handed to the dial point for the delegated secure-transport
/// layer. The core never interprets the password.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl Credentials {
    pub fn anonymous() -> Self {
        Self {
            username: String::new(),
            password: None,
        }
    }
}

/// A live byte pipe for one session.
pub trait Transport: Send + Sync {
    /// Blocking read of up to `buf.len()` bytes. `Ok(0)` means the peer
    /// completed the stream.
    fn read(&self, buf: &mut [u8]) -> Result<usize>;

    /// Forward bytes to the peer.
    fn write(&self, data: &[u8]) -> Result<usize>;

    /// Tear the transport down, unblocking any in-flight read.
    fn close(&self);
}

/// TCP socket transport for network sessions.
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Resolve and dial `host:port` with a connect timeout.
    pub fn connect(
        host: &str,
        port: u16,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Self> {
        let addr = (host, port)
            .to_socket_addrs()
            .map_err(TransportError::Connect)?
            .next()
            .ok_or_else(|| TransportError::Resolve(format!("{host}:{port}")))?;

        let stream = TcpStream::connect_timeout(&addr, timeout).map_err(TransportError::Connect)?;
        debug!(host, port, user = %credentials.username, "transport connected");
        Ok(Self { stream })
    }
}

impl Transport for TcpTransport {
    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        (&self.stream).read(buf).map_err(TransportError::Read)
    }

    fn write(&self, data: &[u8]) -> Result<usize> {
        (&self.stream).write(data).map_err(TransportError::Write)
    }

    fn close(&self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

/// Pseudo-terminal transport for local shell sessions.
///
/// Reader and writer live behind mutexes because the pty crate hands out
/// `&mut` handles; the manager serializes access per session anyway, so the
/// locks are uncontended in practice.
pub struct PtyTransport {
    reader: Mutex<Box<dyn Read + Send>>,
    writer: Mutex<Box<dyn Write + Send>>,
    child: Mutex<Box<dyn Child + Send + Sync>>,
    // Held for the pty lifetime; dropping the master closes the pty.
    _master: Mutex<Box<dyn MasterPty + Send>>,
}

impl PtyTransport {
    /// Spawn an interactive shell on a fresh pty.
    ///
    /// With no explicit command, `$SHELL` is used, falling back to `/bin/sh`.
    pub fn spawn(command: Option<&str>, cols: u16, rows: u16) -> Result<Self> {
        let pty_system = native_pty_system();

        let size = PtySize {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        };

        let pair = pty_system
            .openpty(size)
            .map_err(|e| TransportError::Spawn(format!("failed to open pty: {e}")))?;

        let shell = match command {
            Some(command) => command.to_string(),
            None => std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string()),
        };
        let mut cmd = CommandBuilder::new(&shell);
        cmd.env("TERM", "xterm-256color");

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| TransportError::Spawn(format!("failed to spawn {shell}: {e}")))?;

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| TransportError::Spawn(format!("failed to clone pty reader: {e}")))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| TransportError::Spawn(format!("failed to take pty writer: {e}")))?;

        debug!(shell = %shell, cols, rows, "pty spawned");

        Ok(Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            child: Mutex::new(child),
            _master: Mutex::new(pair.master),
        })
    }
}

impl Transport for PtyTransport {
    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let mut reader = self
            .reader
            .lock()
            .map_err(|_| TransportError::Read(poisoned_lock()))?;
        reader.read(buf).map_err(TransportError::Read)
    }

    fn write(&self, data: &[u8]) -> Result<usize> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| TransportError::Write(poisoned_lock()))?;
        writer.write_all(data).map_err(TransportError::Write)?;
        writer.flush().map_err(TransportError::Write)?;
        Ok(data.len())
    }

    fn close(&self) {
        // Killing the child tears down the pty and unblocks the reader.
        if let Ok(mut child) = self.child.lock() {
            let _ = child.kill();
        }
    }
}

fn poisoned_lock() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "pty lock poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn tcp_transport_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4];
            stream.read_exact(&mut buf).unwrap();
            stream.write_all(&buf).unwrap();
        });

        let transport = TcpTransport::connect(
            "127.0.0.1",
            addr.port(),
            &Credentials::anonymous(),
            Duration::from_secs(5),
        )
        .unwrap();

        transport.write(b"ping").unwrap();
        let mut buf = [0u8; 16];
        let n = transport.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ping");

        server.join().unwrap();
    }

    #[test]
    fn tcp_connect_refused_is_an_error() {
        // Bind then drop to get a port with no listener.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let result = TcpTransport::connect(
            "127.0.0.1",
            port,
            &Credentials::anonymous(),
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(TransportError::Connect(_))));
    }

    #[test]
    fn close_unblocks_pending_read() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = std::thread::spawn(move || listener.accept());

        let transport = std::sync::Arc::new(
            TcpTransport::connect(
                "127.0.0.1",
                addr.port(),
                &Credentials::anonymous(),
                Duration::from_secs(5),
            )
            .unwrap(),
        );

        let reader = transport.clone();
        let handle = std::thread::spawn(move || {
            let mut buf = [0u8; 16];
            reader.read(&mut buf)
        });

        std::thread::sleep(Duration::from_millis(50));
        transport.close();

        // The read returns (either Ok(0) or an error) instead of hanging.
        let result = handle.join().unwrap();
        match result {
            Ok(n) => assert_eq!(n, 0),
            Err(TransportError::Read(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
