//! Serial frame configuration and the fixed system constants.

use crate::{Error, Result};

/// Peripheral clock feeding every USART baud generator, in Hz.
pub const CLOCK_HZ: u32 = 16_000_000;

/// Number of physical USART instances on the part.
pub const PERIPHERAL_COUNT: usize = 4;

/// Buffer capacity used by the reference line reader, terminator included.
pub const LINE_CAPACITY: usize = 20;

/// Parity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl Parity {
    /// Decodes the numeric parity code: 1 is odd, 2 is even, anything else none.
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Parity::Odd,
            2 => Parity::Even,
            _ => Parity::None,
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            Parity::None => 0,
            Parity::Odd => 1,
            Parity::Even => 2,
        }
    }
}

impl Default for Parity {
    fn default() -> Self {
        Parity::None
    }
}

/// Frame format and line rate for one peripheral.
///
/// `word_size` is taken as a plain bit count. Only 8 is encoded into the
/// character-size bits; every other value leaves them cleared, which the
/// hardware interprets as a 5-bit frame. `stop_bits` follows the same rule:
/// 2 selects two stop bits, anything else one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameConfig {
    /// Line rate in bits per second
    pub baud_rate: u32,
    /// Data bits per frame
    pub word_size: u8,
    pub parity: Parity,
    /// Stop bits per frame
    pub stop_bits: u8,
}

impl FrameConfig {
    /// 9600 baud, 8 data bits, no parity, 1 stop bit.
    pub const BAUD_9600_8N1: FrameConfig = FrameConfig::new(9600, 8, Parity::None, 1);

    /// 115200 baud, 8 data bits, no parity, 1 stop bit.
    pub const BAUD_115200_8N1: FrameConfig = FrameConfig::new(115_200, 8, Parity::None, 1);

    pub const fn new(baud_rate: u32, word_size: u8, parity: Parity, stop_bits: u8) -> Self {
        Self {
            baud_rate,
            word_size,
            parity,
            stop_bits,
        }
    }

    /// Builds a configuration from plain numeric codes: parity 0 none,
    /// 1 odd, 2 even.
    pub const fn from_codes(baud_rate: u32, word_size: u8, parity: u8, stop_bits: u8) -> Self {
        Self::new(baud_rate, word_size, Parity::from_code(parity), stop_bits)
    }

    /// Computes the baud-rate register value, `clock / (16 * baud) - 1`.
    ///
    /// Division truncates, so the achieved rate is only an approximation of
    /// the requested one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBaudRate`] for a zero rate, or for a rate whose
    /// divisor cannot be represented in the 16-bit register pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use uartline::FrameConfig;
    ///
    /// assert_eq!(FrameConfig::BAUD_9600_8N1.divisor().unwrap(), 103);
    /// ```
    pub fn divisor(&self) -> Result<u16> {
        let ticks = (self.baud_rate as u64) * 16;
        if ticks == 0 {
            return Err(Error::InvalidBaudRate(self.baud_rate));
        }

        let quotient = CLOCK_HZ as u64 / ticks;
        if quotient == 0 || quotient - 1 > u16::MAX as u64 {
            return Err(Error::InvalidBaudRate(self.baud_rate));
        }

        Ok((quotient - 1) as u16)
    }

    /// True when the word size is one the hardware encoding supports.
    pub fn is_word_size_encoded(&self) -> bool {
        self.word_size == 8
    }

    pub fn two_stop_bits(&self) -> bool {
        self.stop_bits == 2
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self::BAUD_9600_8N1
    }
}

/// How long the busy-wait primitives poll a ready flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitPolicy {
    /// Poll until the flag is set, however long that takes.
    Forever,
    /// Give up with [`Error::Timeout`] after this many polls.
    Spins(u32),
}

impl Default for WaitPolicy {
    fn default() -> Self {
        WaitPolicy::Forever
    }
}

impl WaitPolicy {
    /// Polls `ready` under this policy.
    pub(crate) fn wait<F: FnMut() -> bool>(self, mut ready: F) -> Result<()> {
        match self {
            WaitPolicy::Forever => {
                while !ready() {
                    core::hint::spin_loop();
                }
                Ok(())
            }
            WaitPolicy::Spins(limit) => {
                for _ in 0..limit {
                    if ready() {
                        return Ok(());
                    }
                    core::hint::spin_loop();
                }
                // One last look so a zero limit still succeeds on a ready flag
                if ready() {
                    Ok(())
                } else {
                    Err(Error::Timeout)
                }
            }
        }
    }
}
