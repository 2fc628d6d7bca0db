//! Bounded line accumulator for single-character input.

/// What happened after pushing one character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// Character stored (or discarded past the limit); no terminator yet.
    Pending,
    /// Terminator received for a line within the limit. The terminator is not included.
    Complete(String),
    /// Terminator received for a line that exceeded the limit.
    Overlong,
}

/// Accumulates characters until `'\n'`, holding at most `max_len` of them.
///
/// Characters beyond the limit are discarded and the line is remembered as overlong, so a
/// long garbage line can never be mistaken for a valid command. The buffer is empty again
/// after every terminator.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    line: String,
    max_len: usize,
    overlong: bool,
}

impl LineBuffer {
    /// Line terminator.
    pub const TERMINATOR: char = '\n';

    /// Buffer accepting lines of up to `max_len` characters.
    pub fn new(max_len: usize) -> Self {
        Self {
            line: String::with_capacity(max_len),
            max_len,
            overlong: false,
        }
    }

    /// Feed one character.
    pub fn push(&mut self, c: char) -> LineEvent {
        if c == Self::TERMINATOR {
            let event = if self.overlong {
                LineEvent::Overlong
            } else {
                LineEvent::Complete(std::mem::take(&mut self.line))
            };
            self.reset();
            return event;
        }

        if self.line.chars().count() < self.max_len && !self.overlong {
            self.line.push(c);
        } else {
            self.overlong = true;
        }
        LineEvent::Pending
    }

    /// Drop any partial line.
    pub fn reset(&mut self) {
        self.line.clear();
        self.overlong = false;
    }

    /// Characters held for the current partial line.
    pub fn len(&self) -> usize {
        self.line.chars().count()
    }

    /// True when no partial line is held.
    pub fn is_empty(&self) -> bool {
        self.line.is_empty() && !self.overlong
    }
}
