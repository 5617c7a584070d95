//! rxterm - terminal emulator core with multi-session connection management
//!
//! rxterm turns raw transport bytes into an attributed character grid and
//! manages the connections that supply those bytes. It is the engine of an
//! interactive terminal client; rendering, layout, and settings UI are left
//! to the embedding application.
//!
//! # Architecture
//!
//! ```text
//! transport bytes
//!     │
//! SessionManager (receive loop, one thread per live session)
//!     │
//! TerminalEmulator::write(bytes)
//!     ├── Parser (escape-sequence state machine)
//!     └── Screen (cell grid, cursor, attributes, scrollback)
//!     │
//! renderer reads Screen snapshot after a DataReceived event
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use rxterm::{Config, Credentials, SessionManager};
//!
//! let manager = SessionManager::new(Config::default());
//! let events = manager.subscribe();
//!
//! let id = manager.create_ssh_session(
//!     "example.com",
//!     22,
//!     Credentials { username: "alice".into(), password: None },
//! );
//!
//! for event in events {
//!     if let rxterm::SessionEvent::DataReceived { id, .. } = event {
//!         if let Some(emulator) = manager.emulator(id) {
//!             let emulator = emulator.lock().unwrap();
//!             // re-render emulator.lines() ...
//!         }
//!     }
//! }
//! # let _ = id;
//! ```

pub mod config;
pub mod session;
pub mod term;

pub use config::Config;
pub use session::{
    Credentials, Session, SessionError, SessionEvent, SessionId, SessionManager, SessionStatus,
    SessionType, Transport, TransportError,
};
pub use term::{AttrFlags, Cell, CellAttrs, Color, Cursor, Row, Screen, TerminalEmulator};
