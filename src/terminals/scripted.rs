//! Scripted terminal for host tests.

use std::collections::VecDeque;

use crate::{Error, Result, Terminal};

/// Terminal that replays queued input bytes and records everything written.
///
/// Once the script runs dry, [`read_byte`](Terminal::read_byte) fails with
/// [`Error::Timeout`], standing in for a peripheral that never delivers
/// another byte.
///
/// # Examples
///
/// ```
/// use uartline::{Terminal, terminals::ScriptedTerminal};
///
/// let mut term = ScriptedTerminal::new(b"x");
/// assert_eq!(term.read_byte()?, b'x');
/// assert!(term.read_byte().is_err());
///
/// term.write(b"ok")?;
/// assert_eq!(term.output(), b"ok");
/// # Ok::<(), uartline::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct ScriptedTerminal {
    input: VecDeque<u8>,
    output: Vec<u8>,
    flushes: usize,
}

impl ScriptedTerminal {
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            output: Vec::new(),
            flushes: 0,
        }
    }

    /// Appends more bytes to the input script.
    pub fn push_input(&mut self, data: &[u8]) {
        self.input.extend(data.iter().copied());
    }

    /// Everything written so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Returns the recorded output and clears it.
    pub fn take_output(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.output)
    }

    /// Input bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl Terminal for ScriptedTerminal {
    fn read_byte(&mut self) -> Result<u8> {
        self.input.pop_front().ok_or(Error::Timeout)
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.output.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
