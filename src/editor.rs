//! Blocking line reader.
//!
//! Reads one line from a [`Terminal`] into a fixed-capacity buffer with
//! minimal interactive editing. No state survives between calls.

use crate::config::LINE_CAPACITY;
use crate::{Error, Result};

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

/// Sequence that visually erases the character left of the remote cursor.
pub const ERASE_SEQUENCE: &[u8] = b"\x08 \x08";

/// Byte-stream abstraction the line reader runs on.
///
/// Implemented by [`Port`](crate::Port) for real peripherals; implement it
/// for anything else that can produce and consume bytes (test doubles,
/// other transports).
///
/// # Example
///
/// ```
/// use uartline::{Terminal, Result};
///
/// struct MockTerminal {
///     input: Vec<u8>,
///     output: Vec<u8>,
/// }
///
/// impl Terminal for MockTerminal {
///     fn read_byte(&mut self) -> Result<u8> {
///         Ok(self.input.remove(0))
///     }
///
///     fn write(&mut self, data: &[u8]) -> Result<()> {
///         self.output.extend_from_slice(data);
///         Ok(())
///     }
/// }
///
/// let mut term = MockTerminal { input: b"hi\n".to_vec(), output: Vec::new() };
/// let mut buf = [0u8; 8];
/// let line = uartline::read_line(&mut term, &mut buf)?;
/// assert_eq!(line.as_bytes(), b"hi");
/// assert_eq!(term.output, b"hi");
/// # Ok::<(), uartline::Error>(())
/// ```
pub trait Terminal {
    /// Reads a single byte, blocking until one is available.
    fn read_byte(&mut self) -> Result<u8>;

    /// Writes raw bytes to the output.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Flushes any buffered output.
    ///
    /// Called after each echo so the remote side sees keystrokes at once.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T: Terminal + ?Sized> Terminal for &mut T {
    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// A line produced by [`read_line`], borrowed from the caller's buffer.
#[derive(Debug, PartialEq, Eq)]
pub struct Line<'a> {
    text: &'a [u8],
    discarded: usize,
}

impl<'a> Line<'a> {
    /// The accepted bytes, without terminator.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.text
    }

    /// The accepted bytes as text.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the line contains invalid UTF-8.
    pub fn as_str(&self) -> Result<&'a str> {
        core::str::from_utf8(self.text).map_err(|_| Error::InvalidUtf8)
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Ordinary bytes dropped because the buffer was already full.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// True when at least one byte was lost to overflow.
    pub fn truncated(&self) -> bool {
        self.discarded > 0
    }
}

/// Reads one line from `terminal` into `buf`.
///
/// Blocks until a carriage return or line feed arrives. Editing rules:
///
/// - Backspace (0x08) and delete (0x7F) remove the last accepted byte and
///   echo [`ERASE_SEQUENCE`]. On an empty line they do nothing at all.
/// - Any other byte is stored and echoed while fewer than `buf.len() - 1`
///   bytes are held. Past that it is dropped with no echo and counted in
///   [`Line::discarded`].
///
/// A NUL terminator is written after the last accepted byte, so the buffer
/// also reads as a C string afterwards.
///
/// # Errors
///
/// Returns [`Error::EmptyBuffer`] without reading anything when `buf` has
/// no room for the terminator. Errors from the terminal are passed through.
pub fn read_line<'a, T: Terminal + ?Sized>(terminal: &mut T, buf: &'a mut [u8]) -> Result<Line<'a>> {
    if buf.is_empty() {
        return Err(Error::EmptyBuffer);
    }

    let limit = buf.len() - 1;
    let mut cursor = 0;
    let mut discarded = 0;

    loop {
        let byte = terminal.read_byte()?;

        match byte {
            b'\r' | b'\n' => break,
            BACKSPACE | DELETE => {
                if cursor > 0 {
                    cursor -= 1;
                    terminal.write(ERASE_SEQUENCE)?;
                    terminal.flush()?;
                }
            }
            _ if cursor < limit => {
                buf[cursor] = byte;
                cursor += 1;
                terminal.write(&[byte])?;
                terminal.flush()?;
            }
            _ => {
                if discarded == 0 {
                    trace!("line buffer full at {=usize} bytes", limit);
                }
                discarded += 1;
            }
        }
    }

    buf[cursor] = 0;
    if discarded > 0 {
        debug!("line read dropped {=usize} bytes", discarded);
    }

    Ok(Line {
        text: &buf[..cursor],
        discarded,
    })
}

/// Line reader owning a fixed-size buffer.
///
/// Convenience wrapper around [`read_line`] for callers that do not want to
/// manage the buffer themselves. The default capacity, terminator included,
/// is [`LINE_CAPACITY`].
///
/// # Examples
///
/// ```
/// use uartline::{LineEditor, terminals::ScriptedTerminal};
///
/// let mut editor: LineEditor = LineEditor::new();
/// let mut terminal = ScriptedTerminal::new(b"status\r");
///
/// let line = editor.read_line(&mut terminal)?;
/// assert_eq!(line.as_str()?, "status");
/// # Ok::<(), uartline::Error>(())
/// ```
pub struct LineEditor<const N: usize = LINE_CAPACITY> {
    buf: [u8; N],
}

impl<const N: usize> LineEditor<N> {
    pub const fn new() -> Self {
        Self { buf: [0; N] }
    }

    /// Reads a line into the internal buffer. See [`read_line`].
    pub fn read_line<T: Terminal + ?Sized>(&mut self, terminal: &mut T) -> Result<Line<'_>> {
        read_line(terminal, &mut self.buf)
    }

    /// Largest number of bytes a line can hold.
    pub const fn max_len(&self) -> usize {
        N.saturating_sub(1)
    }
}

impl<const N: usize> Default for LineEditor<N> {
    fn default() -> Self {
        Self::new()
    }
}
