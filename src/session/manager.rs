//! Session lifecycle and connection management.
//!
//! The manager owns every session: its identity record, its terminal
//! emulator, and (while connected) its transport. Each live connection gets a
//! dedicated reader thread — the session's sequential execution context — so
//! bytes for one session are interpreted strictly in arrival order while
//! independent sessions proceed in parallel.
//!
//! All failures are local to a session: they surface as an `Error(..)` status
//! followed by an automatic disconnect, never as a panic or a cross-session
//! effect.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::session::transport::{Credentials, PtyTransport, TcpTransport, Transport};
use crate::term::TerminalEmulator;

/// Largest single read forwarded from a transport.
const READ_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("unknown session {0}")]
    UnknownSession(SessionId),
}

/// Opaque session identity, allocated by the manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionType {
    Ssh,
    Telnet,
    Local,
    Serial,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionType::Ssh => "ssh",
            SessionType::Telnet => "telnet",
            SessionType::Local => "local",
            SessionType::Serial => "serial",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error(String),
}

/// Identity + status record for one logical terminal endpoint.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: SessionId,
    pub title: String,
    pub kind: SessionType,
    pub status: SessionStatus,
}

/// Broadcast to subscribers on status transitions and data arrival.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    StatusChanged {
        id: SessionId,
        status: SessionStatus,
    },
    DataReceived {
        id: SessionId,
        data: Vec<u8>,
    },
}

/// A live transport bound to a session.
///
/// `transport` is `None` while the dial is still in flight. The cancel flag
/// and generation number together fence off stale callbacks: a reader thread
/// whose generation no longer matches (or whose flag is set) must not touch
/// session state.
struct Connection {
    transport: Option<Arc<dyn Transport>>,
    cancel: Arc<AtomicBool>,
    generation: u64,
    reader: Option<JoinHandle<()>>,
}

struct Entry {
    session: Session,
    emulator: Arc<Mutex<TerminalEmulator>>,
    conn: Option<Connection>,
    next_generation: u64,
}

struct Inner {
    sessions: HashMap<SessionId, Entry>,
    subscribers: Vec<Sender<SessionEvent>>,
    next_id: u64,
}

impl Inner {
    fn set_status(&mut self, id: SessionId, status: SessionStatus) {
        let changed = match self.sessions.get_mut(&id) {
            Some(entry) if entry.session.status != status => {
                entry.session.status = status.clone();
                true
            }
            _ => false,
        };
        if changed {
            self.broadcast(SessionEvent::StatusChanged { id, status });
        }
    }

    fn broadcast(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Owns the set of live sessions and their connections.
pub struct SessionManager {
    inner: Arc<Mutex<Inner>>,
    config: Config,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl SessionManager {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                sessions: HashMap::new(),
                subscribers: Vec::new(),
                next_id: 1,
            })),
            config,
        }
    }

    /// Allocate a new disconnected session and its emulator.
    pub fn create_session(&self, kind: SessionType, title: impl Into<String>) -> SessionId {
        let mut inner = lock(&self.inner);
        let id = SessionId(inner.next_id);
        inner.next_id += 1;

        let emulator = Arc::new(Mutex::new(TerminalEmulator::new(
            self.config.columns as usize,
            self.config.rows as usize,
            self.config.scrollback_limit,
        )));

        let session = Session {
            id,
            title: title.into(),
            kind,
            status: SessionStatus::Disconnected,
        };
        info!(%id, kind = %kind, title = %session.title, "session created");

        inner.sessions.insert(
            id,
            Entry {
                session,
                emulator,
                conn: None,
                next_generation: 0,
            },
        );
        id
    }

    /// Create an SSH session and start connecting.
    pub fn create_ssh_session(
        &self,
        host: &str,
        port: u16,
        credentials: Credentials,
    ) -> SessionId {
        let title = format!("{}@{}", credentials.username, host);
        let id = self.create_session(SessionType::Ssh, title);
        // The id was just allocated, so connect cannot fail.
        let _ = self.connect(id, host, port, credentials);
        id
    }

    /// Create a telnet session and start connecting.
    pub fn create_telnet_session(&self, host: &str, port: u16) -> SessionId {
        let id = self.create_session(SessionType::Telnet, format!("telnet://{host}:{port}"));
        let _ = self.connect(id, host, port, Credentials::anonymous());
        id
    }

    /// Create a local session backed by an interactive shell on a pty.
    ///
    /// `Connected` immediately on a successful spawn; `Error(..)` on spawn
    /// failure, with no retry.
    pub fn create_local_session(&self) -> SessionId {
        let id = self.create_session(SessionType::Local, "Local Terminal");

        match PtyTransport::spawn(
            self.config.shell.as_deref(),
            self.config.columns,
            self.config.rows,
        ) {
            Ok(transport) => {
                let transport: Arc<dyn Transport> = Arc::new(transport);
                let cancel = Arc::new(AtomicBool::new(false));
                let mut inner = lock(&self.inner);
                let Some(entry) = inner.sessions.get_mut(&id) else {
                    return id;
                };
                let generation = entry.next_generation;
                entry.next_generation += 1;
                entry.conn = Some(Connection {
                    transport: Some(transport.clone()),
                    cancel: cancel.clone(),
                    generation,
                    reader: None,
                });
                let emulator = entry.emulator.clone();
                inner.set_status(id, SessionStatus::Connected);
                drop(inner);

                self.spawn_reader(id, generation, transport, cancel, emulator);
            }
            Err(e) => {
                warn!(%id, error = %e, "local shell spawn failed");
                lock(&self.inner).set_status(id, SessionStatus::Error(e.to_string()));
            }
        }
        id
    }

    /// Begin connecting a known session to `host:port`.
    ///
    /// The status moves to `Connecting` immediately; the dial and the
    /// subsequent receive loop run on the session's dedicated thread.
    pub fn connect(
        &self,
        id: SessionId,
        host: &str,
        port: u16,
        credentials: Credentials,
    ) -> Result<(), SessionError> {
        let cancel = Arc::new(AtomicBool::new(false));
        let generation;
        let stale;
        {
            let mut inner = lock(&self.inner);
            let entry = inner
                .sessions
                .get_mut(&id)
                .ok_or(SessionError::UnknownSession(id))?;

            // Replace any previous connection outright.
            stale = entry.conn.take();
            if let Some(old) = &stale {
                old.cancel.store(true, Ordering::SeqCst);
                if let Some(t) = &old.transport {
                    t.close();
                }
            }

            generation = entry.next_generation;
            entry.next_generation += 1;
            entry.conn = Some(Connection {
                transport: None,
                cancel: cancel.clone(),
                generation,
                reader: None,
            });
            inner.set_status(id, SessionStatus::Connecting);
        }
        if let Some(old) = stale {
            join_reader(old);
        }

        let shared = self.inner.clone();
        let host = host.to_string();
        let timeout = Duration::from_secs(self.config.connect_timeout_secs);
        let spawned = thread::Builder::new()
            .name(format!("rxterm-{id}"))
            .spawn(move || {
                debug!(%id, host = %host, port, "dialing");
                match TcpTransport::connect(&host, port, &credentials, timeout) {
                    Ok(transport) => {
                        let transport: Arc<dyn Transport> = Arc::new(transport);
                        let emulator = {
                            let mut inner = lock(&shared);
                            if cancel.load(Ordering::SeqCst) {
                                transport.close();
                                return;
                            }
                            let Some(entry) = inner.sessions.get_mut(&id) else {
                                transport.close();
                                return;
                            };
                            match &mut entry.conn {
                                Some(conn) if conn.generation == generation => {
                                    conn.transport = Some(transport.clone());
                                }
                                _ => {
                                    // Superseded while dialing.
                                    transport.close();
                                    return;
                                }
                            }
                            let emulator = entry.emulator.clone();
                            inner.set_status(id, SessionStatus::Connected);
                            emulator
                        };
                        receive_loop(&shared, id, generation, transport, cancel, emulator);
                    }
                    Err(e) => {
                        finish_connection(&shared, id, generation, Some(e.to_string()));
                    }
                }
            });

        match spawned {
            Ok(handle) => self.store_reader(id, generation, handle),
            Err(e) => finish_connection(&self.inner, id, generation, Some(e.to_string())),
        }
        Ok(())
    }

    /// Tear down a session's connection. Idempotent: a no-op when the
    /// session is unknown or already disconnected.
    pub fn disconnect(&self, id: SessionId) {
        let conn = {
            let mut inner = lock(&self.inner);
            let Some(entry) = inner.sessions.get_mut(&id) else {
                return;
            };
            let conn = entry.conn.take();
            if let Some(conn) = &conn {
                conn.cancel.store(true, Ordering::SeqCst);
                if let Some(t) = &conn.transport {
                    t.close();
                }
            }
            inner.set_status(id, SessionStatus::Disconnected);
            conn
        };
        if let Some(conn) = conn {
            join_reader(conn);
            info!(%id, "session disconnected");
        }
    }

    /// Forward bytes to the session's transport.
    ///
    /// A no-op when no transport exists; a write failure routes through the
    /// same error path as a receive failure.
    pub fn send(&self, id: SessionId, data: &[u8]) {
        let target = {
            let inner = lock(&self.inner);
            inner.sessions.get(&id).and_then(|entry| {
                entry.conn.as_ref().and_then(|conn| {
                    conn.transport
                        .as_ref()
                        .map(|t| (t.clone(), conn.generation))
                })
            })
        };
        let Some((transport, generation)) = target else {
            return;
        };
        if let Err(e) = transport.write(data) {
            warn!(%id, error = %e, "send failed");
            finish_connection(&self.inner, id, generation, Some(e.to_string()));
        }
    }

    /// Disconnect and drop a session entirely.
    pub fn remove_session(&self, id: SessionId) {
        self.disconnect(id);
        let mut inner = lock(&self.inner);
        if inner.sessions.remove(&id).is_some() {
            info!(%id, "session removed");
        }
    }

    pub fn session(&self, id: SessionId) -> Option<Session> {
        lock(&self.inner)
            .sessions
            .get(&id)
            .map(|e| e.session.clone())
    }

    /// Snapshot of all session records, ordered by id.
    pub fn sessions(&self) -> Vec<Session> {
        let inner = lock(&self.inner);
        let mut sessions: Vec<Session> =
            inner.sessions.values().map(|e| e.session.clone()).collect();
        sessions.sort_by_key(|s| s.id);
        sessions
    }

    pub fn status(&self, id: SessionId) -> Option<SessionStatus> {
        lock(&self.inner)
            .sessions
            .get(&id)
            .map(|e| e.session.status.clone())
    }

    /// The session's emulator, shared with its reader thread. Renderers lock
    /// it briefly to snapshot the grid.
    pub fn emulator(&self, id: SessionId) -> Option<Arc<Mutex<TerminalEmulator>>> {
        lock(&self.inner)
            .sessions
            .get(&id)
            .map(|e| e.emulator.clone())
    }

    /// Register a listener for status transitions and data arrival.
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        lock(&self.inner).subscribers.push(tx);
        rx
    }

    fn spawn_reader(
        &self,
        id: SessionId,
        generation: u64,
        transport: Arc<dyn Transport>,
        cancel: Arc<AtomicBool>,
        emulator: Arc<Mutex<TerminalEmulator>>,
    ) {
        let shared = self.inner.clone();
        let spawned = thread::Builder::new()
            .name(format!("rxterm-{id}"))
            .spawn(move || receive_loop(&shared, id, generation, transport, cancel, emulator));
        match spawned {
            Ok(handle) => self.store_reader(id, generation, handle),
            Err(e) => finish_connection(&self.inner, id, generation, Some(e.to_string())),
        }
    }

    fn store_reader(&self, id: SessionId, generation: u64, handle: JoinHandle<()>) {
        let mut inner = lock(&self.inner);
        if let Some(entry) = inner.sessions.get_mut(&id) {
            if let Some(conn) = &mut entry.conn {
                if conn.generation == generation {
                    conn.reader = Some(handle);
                    return;
                }
            }
        }
        // The connection was already replaced or torn down; the thread will
        // observe its cancel flag and exit on its own.
        drop(handle);
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        let conns: Vec<Connection> = {
            let mut inner = lock(&self.inner);
            inner
                .sessions
                .values_mut()
                .filter_map(|entry| entry.conn.take())
                .collect()
        };
        for conn in &conns {
            conn.cancel.store(true, Ordering::SeqCst);
            if let Some(t) = &conn.transport {
                t.close();
            }
        }
        for conn in conns {
            join_reader(conn);
        }
    }
}

fn lock(shared: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

fn join_reader(conn: Connection) {
    // A thread still dialing cannot be unblocked from outside; the cancel
    // flag makes it discard its result, so only join threads that reached a
    // live transport (whose reads the close above does unblock).
    if conn.transport.is_none() {
        return;
    }
    if let Some(handle) = conn.reader {
        let _ = handle.join();
    }
}

/// Pull bytes from the transport until it completes, fails, or is cancelled.
///
/// This is the session's receive loop: an explicit loop with the cancel flag
/// checked each iteration, never re-armed by recursion. One outstanding read
/// at a time; every delivered chunk is interpreted before the next read.
fn receive_loop(
    shared: &Arc<Mutex<Inner>>,
    id: SessionId,
    generation: u64,
    transport: Arc<dyn Transport>,
    cancel: Arc<AtomicBool>,
    emulator: Arc<Mutex<TerminalEmulator>>,
) {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        if cancel.load(Ordering::SeqCst) {
            break;
        }
        match transport.read(&mut buf) {
            Ok(0) => {
                debug!(%id, "transport completed");
                finish_connection(shared, id, generation, None);
                break;
            }
            Ok(n) => {
                {
                    let mut emulator = emulator.lock().unwrap_or_else(PoisonError::into_inner);
                    emulator.write(&buf[..n]);
                }
                lock(shared).broadcast(SessionEvent::DataReceived {
                    id,
                    data: buf[..n].to_vec(),
                });
            }
            Err(e) => {
                if cancel.load(Ordering::SeqCst) {
                    break;
                }
                finish_connection(shared, id, generation, Some(e.to_string()));
                break;
            }
        }
    }
}

/// Terminal step of a connection: error status (if any) followed by the
/// automatic disconnect.
///
/// Fenced by generation and cancel flag so callbacks landing after an
/// explicit disconnect or a reconnect cannot touch the replacement
/// connection. Does not join the reader thread — it may be the caller.
fn finish_connection(
    shared: &Arc<Mutex<Inner>>,
    id: SessionId,
    generation: u64,
    error: Option<String>,
) {
    let mut inner = lock(shared);
    let Some(entry) = inner.sessions.get_mut(&id) else {
        return;
    };
    match &entry.conn {
        Some(conn) if conn.generation == generation && !conn.cancel.load(Ordering::SeqCst) => {}
        _ => return, // stale
    }
    if let Some(conn) = entry.conn.take() {
        conn.cancel.store(true, Ordering::SeqCst);
        if let Some(t) = conn.transport {
            t.close();
        }
    }
    if let Some(message) = error {
        warn!(%id, error = %message, "session failed");
        inner.set_status(id, SessionStatus::Error(message));
    }
    inner.set_status(id, SessionStatus::Disconnected);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::time::Instant;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "rxterm=debug".into()),
            )
            .with_test_writer()
            .try_init();
    }

    fn manager() -> SessionManager {
        init_tracing();
        SessionManager::new(Config::default())
    }

    fn wait_for_status<F>(manager: &SessionManager, id: SessionId, pred: F) -> SessionStatus
    where
        F: Fn(&SessionStatus) -> bool,
    {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let status = manager.status(id).expect("session exists");
            if pred(&status) {
                return status;
            }
            assert!(Instant::now() < deadline, "timed out in {status:?}");
            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Loopback server that writes a payload, then holds the stream open
    /// until the peer goes away.
    fn spawn_echo_server(payload: &'static [u8]) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                stream.write_all(payload).unwrap();
                let mut sink = [0u8; 256];
                while matches!(stream.read(&mut sink), Ok(n) if n > 0) {}
            }
        });
        port
    }

    fn free_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn created_session_starts_disconnected() {
        let manager = manager();
        let id = manager.create_session(SessionType::Telnet, "test");

        let session = manager.session(id).unwrap();
        assert_eq!(session.status, SessionStatus::Disconnected);
        assert_eq!(session.kind, SessionType::Telnet);
        assert_eq!(session.title, "test");

        let emulator = manager.emulator(id).unwrap();
        assert_eq!(emulator.lock().unwrap().lines().len(), 24);
    }

    #[test]
    fn connect_unknown_session_is_an_error() {
        let manager = manager();
        let id = manager.create_session(SessionType::Telnet, "test");
        manager.remove_session(id);

        let result = manager.connect(id, "127.0.0.1", 1, Credentials::anonymous());
        assert!(matches!(result, Err(SessionError::UnknownSession(_))));
    }

    #[test]
    fn successful_connect_reaches_connected_and_pumps_data() {
        let manager = manager();
        let port = spawn_echo_server(b"hello \x1b[31mworld");
        let events = manager.subscribe();

        let id = manager.create_session(SessionType::Telnet, "loopback");
        manager
            .connect(id, "127.0.0.1", port, Credentials::anonymous())
            .unwrap();

        wait_for_status(&manager, id, |s| *s == SessionStatus::Connected);

        // The interpreter sees the bytes in order.
        let deadline = Instant::now() + Duration::from_secs(5);
        let emulator = manager.emulator(id).unwrap();
        loop {
            {
                let emulator = emulator.lock().unwrap();
                if emulator.cursor().x >= 11 {
                    assert_eq!(emulator.lines()[0].text().trim_end(), "hello world");
                    break;
                }
            }
            assert!(Instant::now() < deadline, "data never arrived");
            thread::sleep(Duration::from_millis(10));
        }

        // Subscribers saw the transition and the payload.
        let mut saw_connecting = false;
        let mut saw_connected = false;
        let mut received = Vec::new();
        while received.len() < 16 {
            match events.recv_timeout(Duration::from_secs(5)).unwrap() {
                SessionEvent::StatusChanged { status, .. } => match status {
                    SessionStatus::Connecting => saw_connecting = true,
                    SessionStatus::Connected => saw_connected = true,
                    other => panic!("unexpected status {other:?}"),
                },
                SessionEvent::DataReceived { data, .. } => received.extend(data),
            }
        }
        assert!(saw_connecting && saw_connected);
        assert_eq!(received, b"hello \x1b[31mworld");

        manager.disconnect(id);
        assert_eq!(manager.status(id).unwrap(), SessionStatus::Disconnected);
    }

    #[test]
    fn connect_failure_routes_error_then_disconnected() {
        let manager = manager();
        let events = manager.subscribe();

        let id = manager.create_session(SessionType::Ssh, "nobody@nowhere");
        manager
            .connect(id, "127.0.0.1", free_port(), Credentials::anonymous())
            .unwrap();

        wait_for_status(&manager, id, |s| *s == SessionStatus::Disconnected);

        let mut statuses = Vec::new();
        while let Ok(event) = events.recv_timeout(Duration::from_millis(200)) {
            if let SessionEvent::StatusChanged { status, .. } = event {
                statuses.push(status);
            }
        }
        assert_eq!(statuses[0], SessionStatus::Connecting);
        assert!(matches!(statuses[1], SessionStatus::Error(_)));
        assert_eq!(statuses[2], SessionStatus::Disconnected);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let manager = manager();
        let id = manager.create_session(SessionType::Telnet, "idle");

        manager.disconnect(id);
        manager.disconnect(id);
        assert_eq!(manager.status(id).unwrap(), SessionStatus::Disconnected);
    }

    #[test]
    fn send_without_transport_is_a_no_op() {
        let manager = manager();
        let id = manager.create_session(SessionType::Telnet, "idle");

        manager.send(id, b"anything");
        assert_eq!(manager.status(id).unwrap(), SessionStatus::Disconnected);
    }

    #[test]
    fn send_reaches_the_peer() {
        let manager = manager();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4];
            stream.read_exact(&mut buf).unwrap();
            buf
        });

        let id = manager.create_session(SessionType::Telnet, "loopback");
        manager
            .connect(id, "127.0.0.1", port, Credentials::anonymous())
            .unwrap();
        wait_for_status(&manager, id, |s| *s == SessionStatus::Connected);

        manager.send(id, b"ping");
        assert_eq!(&server.join().unwrap(), b"ping");
    }

    #[test]
    fn sessions_are_listed_in_creation_order() {
        let manager = manager();
        let a = manager.create_session(SessionType::Local, "a");
        let b = manager.create_session(SessionType::Serial, "b");

        let sessions = manager.sessions();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, a);
        assert_eq!(sessions[1].id, b);
    }

    #[test]
    fn drop_terminates_reader_threads() {
        let manager = manager();
        let port = spawn_echo_server(b"held open");
        let id = manager.create_session(SessionType::Telnet, "loopback");
        manager
            .connect(id, "127.0.0.1", port, Credentials::anonymous())
            .unwrap();
        wait_for_status(&manager, id, |s| *s == SessionStatus::Connected);

        // Dropping must cancel the in-flight read and join promptly.
        let start = Instant::now();
        drop(manager);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn reconnect_after_disconnect() {
        let manager = manager();
        let port = spawn_echo_server(b"first");
        let id = manager.create_session(SessionType::Telnet, "loopback");

        manager
            .connect(id, "127.0.0.1", port, Credentials::anonymous())
            .unwrap();
        wait_for_status(&manager, id, |s| *s == SessionStatus::Connected);
        manager.disconnect(id);

        let port = spawn_echo_server(b"second");
        manager
            .connect(id, "127.0.0.1", port, Credentials::anonymous())
            .unwrap();
        wait_for_status(&manager, id, |s| *s == SessionStatus::Connected);
        manager.disconnect(id);
    }

    #[test]
    #[cfg(unix)]
    fn local_session_spawns_a_shell() {
        let manager = manager();
        let id = manager.create_local_session();

        let session = manager.session(id).unwrap();
        assert_eq!(session.kind, SessionType::Local);
        match session.status {
            SessionStatus::Connected => {
                manager.send(id, b"exit\n");
                wait_for_status(&manager, id, |s| *s == SessionStatus::Disconnected);
            }
            // Sandboxed environments may forbid pty allocation; that is the
            // spawn-failure contract, not a bug.
            SessionStatus::Error(_) => {}
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn ssh_session_title_is_user_at_host() {
        let manager = manager();
        let id = manager.create_ssh_session(
            "127.0.0.1",
            free_port(),
            Credentials {
                username: "alice".into(),
                password: None,
            },
        );
        assert_eq!(manager.session(id).unwrap().title, "alice@127.0.0.1");
        wait_for_status(&manager, id, |s| *s == SessionStatus::Disconnected);
    }
}
