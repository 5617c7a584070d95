//! ANSI escape-sequence parser.
//!
//! A per-character state machine that classifies input as literal text or
//! control sequences and drives [`Screen`] mutations. The machine is total:
//! every character maps to a defined transition, and malformed or unsupported
//! sequences are dropped on the floor rather than surfaced as errors.

use super::screen::{AttrFlags, Color, Screen};

/// Parser state machine.
pub struct Parser {
    mode: Mode,
    params: Vec<u16>,
    current_param: Option<u16>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Normal,
    Escape,
    Csi,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            params: Vec::with_capacity(16),
            current_param: None,
        }
    }

    /// Feed a single character to the parser.
    pub fn feed(&mut self, ch: char, screen: &mut Screen) {
        match self.mode {
            Mode::Normal => self.normal(ch, screen),
            Mode::Escape => self.escape(ch),
            Mode::Csi => self.csi(ch, screen),
        }
    }

    fn normal(&mut self, ch: char, screen: &mut Screen) {
        match ch {
            '\x1b' => self.enter_escape(),
            '\r' => screen.carriage_return(),
            '\n' => screen.linefeed(),
            '\t' => screen.horizontal_tab(),
            _ => screen.put_char(ch),
        }
    }

    fn enter_escape(&mut self) {
        self.mode = Mode::Escape;
        self.params.clear();
        self.current_param = None;
    }

    fn escape(&mut self, ch: char) {
        if ch == '[' {
            self.mode = Mode::Csi;
        } else {
            // Unsupported escape; drop it rather than desynchronize.
            tracing::trace!(ch = %ch.escape_debug(), "ignoring escape sequence");
            self.mode = Mode::Normal;
        }
    }

    fn csi(&mut self, ch: char, screen: &mut Screen) {
        match ch {
            '0'..='9' => {
                let digit = (ch as u16) - ('0' as u16);
                self.current_param = Some(
                    self.current_param
                        .unwrap_or(0)
                        .saturating_mul(10)
                        .saturating_add(digit),
                );
            }
            ';' => {
                // Empty entries count as parameter value 0.
                self.params.push(self.current_param.take().unwrap_or(0));
            }
            _ => {
                // Final byte, recognized or not: dispatch and return to
                // Normal unconditionally. A trailing empty entry after a
                // separator counts as 0, but a bare sequence stays empty.
                match self.current_param.take() {
                    Some(p) => self.params.push(p),
                    None if !self.params.is_empty() => self.params.push(0),
                    None => {}
                }
                self.execute_csi(ch, screen);
                self.mode = Mode::Normal;
                self.params.clear();
            }
        }
    }

    fn execute_csi(&mut self, final_ch: char, screen: &mut Screen) {
        match final_ch {
            'H' | 'f' => {
                // CUP - bare ESC[H homes; row;col parameters are 1-indexed.
                let row = self.params.first().copied().unwrap_or(1).max(1);
                let col = self.params.get(1).copied().unwrap_or(1).max(1);
                screen.cursor_position(row as usize, col as usize);
            }
            'J' => {
                // ED - treated as a full clear regardless of parameter.
                screen.clear_screen();
            }
            'm' => {
                self.execute_sgr(screen);
            }
            _ => {
                tracing::debug!(
                    params = ?self.params,
                    final_byte = %final_ch.escape_debug(),
                    "unknown CSI sequence"
                );
            }
        }
    }

    fn execute_sgr(&self, screen: &mut Screen) {
        if self.params.is_empty() {
            screen.reset_attrs();
            return;
        }

        for &param in &self.params {
            match param {
                0 => screen.reset_attrs(),
                1 => screen.current_attrs.flags |= AttrFlags::BOLD,
                3 => screen.current_attrs.flags |= AttrFlags::ITALIC,
                4 => screen.current_attrs.flags |= AttrFlags::UNDERLINE,
                5 => screen.current_attrs.flags |= AttrFlags::BLINK,
                7 => screen.current_attrs.flags |= AttrFlags::REVERSE,

                22 => screen.current_attrs.flags &= !AttrFlags::BOLD,
                23 => screen.current_attrs.flags &= !AttrFlags::ITALIC,
                24 => screen.current_attrs.flags &= !AttrFlags::UNDERLINE,
                25 => screen.current_attrs.flags &= !AttrFlags::BLINK,
                27 => screen.current_attrs.flags &= !AttrFlags::REVERSE,

                30..=37 => {
                    if let Some(color) = Color::from_sgr_offset(param - 30) {
                        screen.set_foreground(color);
                    }
                }
                39 => screen.set_foreground(Color::Default),

                40..=47 => {
                    if let Some(color) = Color::from_sgr_offset(param - 40) {
                        screen.set_background(color);
                    }
                }
                49 => screen.set_background(Color::Default),

                _ => {}
            }
        }
    }
}
