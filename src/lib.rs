//! Index-addressed driver for a microcontroller's USART peripherals.
//!
//! This library drives every USART on the part through one set of functions
//! taking a peripheral index. Each index is resolved through a fixed
//! [descriptor table](descriptor::DESCRIPTORS) that records where that
//! peripheral's registers live and which bit means what, so the logic for
//! all four instances is the same code.
//!
//! On top of the byte-level driver sit a blocking [line reader](editor)
//! with backspace handling, a few [ANSI terminal helpers](ansi), and the
//! small [numeric text conversions](numfmt) those helpers use.
//!
//! # Features
//!
//! - **Checked indexing**: an out-of-range index is an [`Error::InvalidIndex`],
//!   never an access to an unrelated address
//! - **Busy-wait I/O**: transmit and receive poll the hardware ready flags,
//!   forever by default or bounded by a [`WaitPolicy`]
//! - **Line editing**: erase on backspace/delete, stop on CR/LF, explicit
//!   accounting of input dropped on overflow
//! - **Testable**: all hardware access goes through the [`Bus`] trait; the
//!   `std` feature ships a [simulated register file](sim::SimBus)
//!
//! # Quick Start
//!
//! ```
//! use uartline::{FrameConfig, Uarts, sim::SimBus};
//!
//! let uarts = Uarts::new(SimBus::new());
//! uarts.initialize(0, &FrameConfig::BAUD_9600_8N1)?;
//!
//! uarts.bus().feed(0, b"ab\x08c\r");
//!
//! let mut buf = [0u8; uartline::LINE_CAPACITY];
//! let line = uarts.read_line(0, &mut buf)?;
//! assert_eq!(line.as_str()?, "ac");
//! # Ok::<(), uartline::Error>(())
//! ```
//!
//! On the target itself, build with the `avr` feature and hand the driver
//! the memory-mapped register file:
//!
//! ```ignore
//! use uartline::{FrameConfig, Uarts, registers::Mmio};
//!
//! let uarts = Uarts::new(unsafe { Mmio::new() });
//! uarts.initialize(1, &FrameConfig::BAUD_115200_8N1)?;
//! uarts.transmit_str(1, "ready\r\n")?;
//! ```
//!
//! # Architecture
//!
//! - [`descriptor`]: the per-peripheral register map and bit layout
//! - [`Uarts`]: index-addressed initialize/transmit/receive
//! - [`Port`]: one validated peripheral, usable as a [`Terminal`]
//! - [`editor`]: the line reader, generic over any [`Terminal`]

#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod fmt;

pub mod ansi;
pub mod config;
pub mod descriptor;
pub mod driver;
pub mod editor;
pub mod numfmt;
pub mod registers;

#[cfg(feature = "std")]
pub mod sim;

#[cfg(feature = "std")]
pub mod terminals;

use core::fmt as core_fmt;

pub use config::{FrameConfig, Parity, WaitPolicy, CLOCK_HZ, LINE_CAPACITY, PERIPHERAL_COUNT};
pub use descriptor::{descriptor, Descriptor};
pub use driver::{Port, Uarts};
pub use editor::{read_line, Line, LineEditor, Terminal};
pub use numfmt::{format_unsigned, parse_decimal, Radix};
pub use registers::Bus;

/// Error type for driver operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Peripheral index outside `0..PERIPHERAL_COUNT`
    InvalidIndex(usize),
    /// Caller supplied a buffer with no room at all
    EmptyBuffer,
    /// Output buffer cannot hold the digits plus terminator
    BufferTooSmall,
    /// Conversion base other than 2, 8, 10 or 16
    InvalidBase(u8),
    /// Baud rate is zero or its divisor does not fit the baud registers
    InvalidBaudRate(u32),
    /// A bounded wait expired before the ready flag came up
    Timeout,
    /// Invalid UTF-8 data
    InvalidUtf8,
}

impl core_fmt::Display for Error {
    fn fmt(&self, f: &mut core_fmt::Formatter<'_>) -> core_fmt::Result {
        match self {
            Error::InvalidIndex(index) => write!(f, "no peripheral at index {}", index),
            Error::EmptyBuffer => f.write_str("Empty buffer"),
            Error::BufferTooSmall => f.write_str("Buffer too small"),
            Error::InvalidBase(base) => write!(f, "unsupported base {}", base),
            Error::InvalidBaudRate(baud) => write!(f, "unsupported baud rate {}", baud),
            Error::Timeout => f.write_str("Timed out waiting for peripheral"),
            Error::InvalidUtf8 => f.write_str("Invalid UTF-8"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl From<Error> for std::io::Error {
    fn from(e: Error) -> Self {
        use std::io::{Error as IoError, ErrorKind};
        let kind = match e {
            Error::Timeout => ErrorKind::TimedOut,
            Error::InvalidUtf8 => ErrorKind::InvalidData,
            _ => ErrorKind::InvalidInput,
        };
        IoError::new(kind, e)
    }
}

impl From<core::str::Utf8Error> for Error {
    fn from(_: core::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}

#[cfg(feature = "embedded-io")]
impl embedded_io::Error for Error {
    fn kind(&self) -> embedded_io::ErrorKind {
        use embedded_io::ErrorKind;
        match self {
            Error::Timeout => ErrorKind::TimedOut,
            Error::InvalidUtf8 => ErrorKind::InvalidData,
            _ => ErrorKind::InvalidInput,
        }
    }
}

/// Result type for driver operations
pub type Result<T> = core::result::Result<T, Error>;
