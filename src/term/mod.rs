//! Terminal emulation.
//!
//! - **screen**: attributed cell grid, cursor, current style, scrollback
//! - **parser**: ANSI escape-sequence state machine
//! - **emulator**: byte-stream front end combining the two
//!
//! # Architecture
//!
//! ```text
//! TerminalEmulator::write(bytes)
//! └── Parser (Normal / Escape / CSI)
//!     └── Screen
//!         ├── grid of Cell { ch, attrs }
//!         ├── Cursor
//!         ├── CellAttrs (current style, snapshotted per write)
//!         └── scrollback (flattened evicted rows)
//! ```

pub mod emulator;
pub mod parser;
pub mod screen;

pub use emulator::TerminalEmulator;
pub use parser::Parser;
pub use screen::{AttrFlags, Cell, CellAttrs, Color, Cursor, Row, Screen};
