//! Console collaborator: formatted output and non-blocking character input.
//!
//! Output goes through the [`Console`] trait so the pipeline can print overflow diagnostics,
//! fetch reports and status tables without knowing where the text ends up. Input is pulled
//! one character at a time from a [`CharSource`], which answers [`Input::NoData`] instead of
//! blocking when nothing is pending.
//!
//! Implementations:
//! - [`StdoutConsole`] / [`StdinSource`] for the binary
//! - [`MemoryConsole`] / [`ScriptedInput`] for tests and demos

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::{self, error::TryRecvError};

/// Formatted-write sink shared by all tasks.
pub trait Console: Send + Sync {
    /// Write formatted text. Failures are the sink's problem; callers never retry.
    fn print(&self, args: fmt::Arguments<'_>);
}

/// One poll of a [`CharSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A character was pending.
    Char(char),
    /// Nothing pending right now.
    NoData,
    /// The source is exhausted and will never produce again.
    Closed,
}

/// Pull-based, non-blocking character input.
pub trait CharSource: Send {
    /// Return the next pending character without blocking.
    fn poll_char(&mut self) -> Input;
}

/// Writes to the process stdout, flushing after every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn print(&self, args: fmt::Arguments<'_>) {
        let mut out = io::stdout().lock();
        if let Err(e) = out.write_fmt(args).and_then(|()| out.flush()) {
            tracing::debug!(error = %e, "console write failed");
        }
    }
}

/// In-memory console that records everything printed.
#[derive(Debug, Default, Clone)]
pub struct MemoryConsole {
    buffer: Arc<Mutex<String>>,
}

impl MemoryConsole {
    /// Empty console.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything printed so far.
    pub fn contents(&self) -> String {
        self.lock().clone()
    }

    /// Return everything printed so far and start over.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, String> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Console for MemoryConsole {
    fn print(&self, args: fmt::Arguments<'_>) {
        use std::fmt::Write as _;
        let _ = self.lock().write_fmt(args);
    }
}

/// Fixed script of characters, followed by [`Input::NoData`] forever.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    pending: VecDeque<char>,
}

impl ScriptedInput {
    /// Script the characters of `text`.
    pub fn new(text: &str) -> Self {
        Self {
            pending: text.chars().collect(),
        }
    }

    /// Append more characters to the script.
    pub fn push_str(&mut self, text: &str) {
        self.pending.extend(text.chars());
    }
}

impl CharSource for ScriptedInput {
    fn poll_char(&mut self) -> Input {
        self.pending.pop_front().map_or(Input::NoData, Input::Char)
    }
}

/// Characters delivered through a channel, typically from a reader thread.
#[derive(Debug)]
pub struct ChannelInput {
    rx: mpsc::UnboundedReceiver<char>,
}

impl ChannelInput {
    /// Input backed by a fresh channel; characters sent on the returned sender become input.
    pub fn new() -> (mpsc::UnboundedSender<char>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

impl CharSource for ChannelInput {
    fn poll_char(&mut self) -> Input {
        match self.rx.try_recv() {
            Ok(c) => Input::Char(c),
            Err(TryRecvError::Empty) => Input::NoData,
            Err(TryRecvError::Disconnected) => Input::Closed,
        }
    }
}

/// Process stdin, read line by line on a dedicated thread.
pub struct StdinSource;

impl StdinSource {
    /// Start the reader thread and return the polling end.
    pub fn spawn() -> io::Result<ChannelInput> {
        spawn_line_reader("stdin-reader", io::BufReader::new(io::stdin()))
    }
}

/// Read `reader` line by line on a thread named `name`, delivering each line's characters
/// followed by `'\n'`.
///
/// Bytes that are not valid UTF-8 become U+FFFD, so a malformed line still reaches the
/// command interface as an ordinary (undefined) line. A trailing `"\r\n"` is treated like
/// `"\n"`. The channel closes only at end of input, on a read error, or when the polling
/// end is dropped.
pub fn spawn_line_reader<R>(name: &str, mut reader: R) -> io::Result<ChannelInput>
where
    R: BufRead + Send + 'static,
{
    let (tx, input) = ChannelInput::new();
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let mut raw = Vec::new();
            loop {
                raw.clear();
                match reader.read_until(b'\n', &mut raw) {
                    Ok(0) => break,
                    Ok(_) => {
                        let decoded = String::from_utf8_lossy(&raw);
                        let line: &str = &decoded;
                        let line = line.strip_suffix('\n').unwrap_or(line);
                        let line = line.strip_suffix('\r').unwrap_or(line);
                        let delivered = line
                            .chars()
                            .chain(std::iter::once('\n'))
                            .all(|c| tx.send(c).is_ok());
                        if !delivered {
                            break;
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        tracing::warn!(error = %e, "input read failed");
                        break;
                    }
                }
            }
            tracing::debug!("input closed");
        })?;
    Ok(input)
}
