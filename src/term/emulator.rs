//! Terminal emulator: byte stream in, attributed grid out.

use super::parser::Parser;
use super::screen::{Cursor, Row, Screen};

/// One terminal endpoint's interpreter + screen buffer.
///
/// Grid dimensions are fixed at construction. Feeding bytes never fails:
/// undecodable chunks are dropped, unsupported sequences ignored.
pub struct TerminalEmulator {
    screen: Screen,
    parser: Parser,
}

impl TerminalEmulator {
    pub fn new(cols: usize, rows: usize, scrollback_limit: usize) -> Self {
        Self {
            screen: Screen::new(cols, rows, scrollback_limit),
            parser: Parser::new(),
        }
    }

    /// Interpret a chunk of transport output.
    ///
    /// The chunk is decoded as UTF-8; chunks that do not decode are dropped
    /// silently, leaving all state untouched.
    pub fn write(&mut self, data: &[u8]) {
        let Ok(text) = std::str::from_utf8(data) else {
            tracing::debug!(len = data.len(), "dropping undecodable chunk");
            return;
        };

        for ch in text.chars() {
            self.parser.feed(ch, &mut self.screen);
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn cursor(&self) -> Cursor {
        self.screen.cursor
    }

    pub fn lines(&self) -> &[Row] {
        self.screen.lines()
    }

    pub fn scrollback(&self) -> &[String] {
        self.screen.scrollback()
    }
}
