//! Session and connection management.
//!
//! - **transport**: byte pipes behind sessions (TCP socket, local pty)
//! - **manager**: session records, status state machine, receive loops,
//!   event broadcast
//!
//! # Architecture
//!
//! ```text
//! SessionManager
//! ├── Session { id, title, kind, status }      (one per endpoint)
//! ├── TerminalEmulator                          (one per session, shared
//! │                                              with its reader thread)
//! └── Connection                                (zero-or-one per session)
//!     ├── Arc<dyn Transport>  (TcpTransport | PtyTransport)
//!     ├── cancel flag + generation              (stale-callback fence)
//!     └── reader thread                         (the receive loop)
//! ```

pub mod manager;
pub mod transport;

pub use manager::{
    Session, SessionError, SessionEvent, SessionId, SessionManager, SessionStatus, SessionType,
};
pub use transport::{Credentials, PtyTransport, TcpTransport, Transport, TransportError};
