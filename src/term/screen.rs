//! Screen buffer and attribute state.
//!
//! This module defines the attributed cell grid, cursor, current-style state,
//! and scrollback. It is a pure data mutator: no I/O, nothing here blocks.

use bitflags::bitflags;
use unicode_width::UnicodeWidthChar;

/// Tab stops every 8 columns.
const TAB_WIDTH: usize = 8;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct AttrFlags: u8 {
        const BOLD      = 0b0000_0001;
        const ITALIC    = 0b0000_0010;
        const UNDERLINE = 0b0000_0100;
        const BLINK     = 0b0000_1000;
        const REVERSE   = 0b0001_0000;
    }
}

/// One of the 8 standard ANSI colors, or the terminal default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    #[default]
    Default,
}

impl Color {
    /// Map an SGR base offset (0..=7, i.e. the parameter minus 30 or 40)
    /// to a color. Out-of-range values are not colors.
    pub fn from_sgr_offset(n: u16) -> Option<Self> {
        match n {
            0 => Some(Color::Black),
            1 => Some(Color::Red),
            2 => Some(Color::Green),
            3 => Some(Color::Yellow),
            4 => Some(Color::Blue),
            5 => Some(Color::Magenta),
            6 => Some(Color::Cyan),
            7 => Some(Color::White),
            _ => None,
        }
    }

    /// ANSI palette index, `None` for the default color.
    pub fn ansi_index(&self) -> Option<u8> {
        match self {
            Color::Black => Some(0),
            Color::Red => Some(1),
            Color::Green => Some(2),
            Color::Yellow => Some(3),
            Color::Blue => Some(4),
            Color::Magenta => Some(5),
            Color::Cyan => Some(6),
            Color::White => Some(7),
            Color::Default => None,
        }
    }

    /// Convert to crossterm color for rendering.
    pub fn to_crossterm(&self) -> crossterm::style::Color {
        match self.ansi_index() {
            Some(n) => crossterm::style::Color::AnsiValue(n),
            None => crossterm::style::Color::Reset,
        }
    }
}

/// Style applied to newly written cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellAttrs {
    pub fg: Color,
    pub bg: Color,
    pub flags: AttrFlags,
}

impl CellAttrs {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A single character position: glyph plus its style.
///
/// Cells are value types, replaced wholesale on write. The attributes are a
/// snapshot taken at write time, so later style changes never retroactively
/// affect cells already on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub attrs: CellAttrs,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            attrs: CellAttrs::default(),
        }
    }
}

/// A single row of cells. Always exactly `cols` wide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cols: usize) -> Self {
        Self {
            cells: vec![Cell::default(); cols],
        }
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::default();
        }
    }

    /// Flatten the row to plain text, attributes discarded.
    pub fn text(&self) -> String {
        self.cells.iter().map(|c| c.ch).collect()
    }
}

/// Cursor position. `x` may transiently equal `cols` before a wrap;
/// `y` is always within the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pub x: usize,
    pub y: usize,
}

/// The visible character grid with cursor, current attributes, and scrollback.
///
/// Invariant: the grid always holds exactly `rows` rows of exactly `cols`
/// cells; it never grows or shrinks except through [`Screen::scroll_up`].
pub struct Screen {
    cols: usize,
    rows: usize,
    lines: Vec<Row>,
    pub cursor: Cursor,
    pub current_attrs: CellAttrs,
    scrollback: Vec<String>,
    scrollback_limit: usize,
}

impl Screen {
    pub fn new(cols: usize, rows: usize, scrollback_limit: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            lines: (0..rows).map(|_| Row::new(cols)).collect(),
            cursor: Cursor::default(),
            current_attrs: CellAttrs::default(),
            scrollback: Vec::new(),
            scrollback_limit,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Read-only snapshot of the visible grid, for rendering.
    pub fn lines(&self) -> &[Row] {
        &self.lines
    }

    pub fn line(&self, y: usize) -> Option<&Row> {
        self.lines.get(y)
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.lines.get(y).and_then(|row| row.cells.get(x))
    }

    /// Rows evicted from the top of the grid, oldest first.
    pub fn scrollback(&self) -> &[String] {
        &self.scrollback
    }

    /// Write a literal character at the cursor and advance.
    ///
    /// Wraps (line feed) when the cursor sits past the right margin.
    /// Zero-width scalars are dropped rather than written.
    pub fn put_char(&mut self, ch: char) {
        if ch.width().unwrap_or(0) == 0 {
            return;
        }

        if self.cursor.x >= self.cols {
            self.linefeed();
        }

        self.lines[self.cursor.y].cells[self.cursor.x] = Cell {
            ch,
            attrs: self.current_attrs,
        };
        self.cursor.x += 1;
    }

    /// Carriage return: column 0, row unchanged.
    pub fn carriage_return(&mut self) {
        self.cursor.x = 0;
    }

    /// Line feed: column 0, next row, scrolling at the bottom.
    pub fn linefeed(&mut self) {
        self.cursor.x = 0;
        if self.cursor.y + 1 >= self.rows {
            self.scroll_up();
        } else {
            self.cursor.y += 1;
        }
    }

    /// Advance to the next tab stop; line feed instead of landing past
    /// the right margin.
    pub fn horizontal_tab(&mut self) {
        self.cursor.x = (self.cursor.x + TAB_WIDTH) & !(TAB_WIDTH - 1);
        if self.cursor.x >= self.cols {
            self.linefeed();
        }
    }

    /// Evict the top row to scrollback, shift up, append a blank row.
    /// Pins the cursor to the bottom row.
    pub fn scroll_up(&mut self) {
        self.scrollback.push(self.lines[0].text());
        if self.scrollback.len() > self.scrollback_limit {
            self.scrollback.remove(0);
        }
        self.lines.remove(0);
        self.lines.push(Row::new(self.cols));
        self.cursor.y = self.rows - 1;
    }

    /// Reset every cell to the default blank and home the cursor.
    /// Scrollback is untouched.
    pub fn clear_screen(&mut self) {
        for row in &mut self.lines {
            row.clear();
        }
        self.cursor = Cursor::default();
    }

    pub fn cursor_home(&mut self) {
        self.cursor = Cursor::default();
    }

    /// Set the cursor from 1-indexed row/col parameters, clamped to the grid.
    pub fn cursor_position(&mut self, row: usize, col: usize) {
        self.cursor.y = row.saturating_sub(1).min(self.rows - 1);
        self.cursor.x = col.saturating_sub(1).min(self.cols - 1);
    }

    pub fn reset_attrs(&mut self) {
        self.current_attrs.reset();
    }

    pub fn set_foreground(&mut self, color: Color) {
        self.current_attrs.fg = color;
    }

    pub fn set_background(&mut self, color: Color) {
        self.current_attrs.bg = color;
    }
}
