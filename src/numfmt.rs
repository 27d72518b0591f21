//! Unsigned integer to text and back.
//!
//! Pure functions over caller buffers; nothing here touches hardware.

use crate::{Error, Result};

/// Digits of the widest output: a `u32` in binary.
pub const MAX_DIGITS: usize = 32;

/// Number base for [`format_unsigned`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Radix {
    Binary,
    Octal,
    Decimal,
    Hex,
}

impl Radix {
    pub const fn value(self) -> u32 {
        match self {
            Radix::Binary => 2,
            Radix::Octal => 8,
            Radix::Decimal => 10,
            Radix::Hex => 16,
        }
    }
}

impl TryFrom<u8> for Radix {
    type Error = Error;

    fn try_from(base: u8) -> Result<Self> {
        match base {
            2 => Ok(Radix::Binary),
            8 => Ok(Radix::Octal),
            10 => Ok(Radix::Decimal),
            16 => Ok(Radix::Hex),
            _ => Err(Error::InvalidBase(base)),
        }
    }
}

fn digit(value: u32) -> u8 {
    if value < 10 {
        b'0' + value as u8
    } else {
        b'A' + (value - 10) as u8
    }
}

/// Writes `number` in `radix` into `buf`, most significant digit first,
/// followed by a NUL terminator.
///
/// Hex digits are upper case. Zero is written as a single `0` in every base.
/// Returns the digits as a string slice of `buf`.
///
/// # Errors
///
/// Returns [`Error::EmptyBuffer`] for an empty `buf` and
/// [`Error::BufferTooSmall`] when the digits and terminator do not fit.
///
/// # Examples
///
/// ```
/// use uartline::{format_unsigned, Radix};
///
/// let mut buf = [0u8; 10];
/// assert_eq!(format_unsigned(255, &mut buf, Radix::Hex)?, "FF");
/// assert_eq!(&buf[..3], b"FF\0");
/// # Ok::<(), uartline::Error>(())
/// ```
pub fn format_unsigned(number: u32, buf: &mut [u8], radix: Radix) -> Result<&str> {
    if buf.is_empty() {
        return Err(Error::EmptyBuffer);
    }

    let base = radix.value();
    let mut rest = number;
    let mut len = 0;

    // Least significant digit first, reversed below
    loop {
        if len + 1 >= buf.len() {
            return Err(Error::BufferTooSmall);
        }
        buf[len] = digit(rest % base);
        len += 1;
        rest /= base;
        if rest == 0 {
            break;
        }
    }

    buf[..len].reverse();
    buf[len] = 0;

    core::str::from_utf8(&buf[..len]).map_err(Error::from)
}

/// [`format_unsigned`] with the base given as a plain number.
///
/// # Errors
///
/// Returns [`Error::InvalidBase`] for bases other than 2, 8, 10 and 16, in
/// addition to the errors of [`format_unsigned`].
pub fn format_in_base(number: u32, buf: &mut [u8], base: u8) -> Result<&str> {
    format_unsigned(number, buf, Radix::try_from(base)?)
}

/// Parses the leading decimal digits of `text`.
///
/// Stops at the first byte that is not `0`-`9`, including a NUL terminator,
/// and returns 0 when there are no leading digits. There is no sign or
/// whitespace handling. Values past `u32::MAX` wrap.
///
/// # Examples
///
/// ```
/// use uartline::parse_decimal;
///
/// assert_eq!(parse_decimal("42;7H"), 42);
/// assert_eq!(parse_decimal(b"x1"), 0);
/// ```
pub fn parse_decimal<T: AsRef<[u8]> + ?Sized>(text: &T) -> u32 {
    text.as_ref()
        .iter()
        .take_while(|byte| byte.is_ascii_digit())
        .fold(0u32, |acc, &byte| {
            acc.wrapping_mul(10).wrapping_add((byte - b'0') as u32)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zero_in_every_base() {
        for radix in [Radix::Binary, Radix::Octal, Radix::Decimal, Radix::Hex] {
            let mut buf = [0xAAu8; 4];
            assert_eq!(format_unsigned(0, &mut buf, radix).unwrap(), "0");
            assert_eq!(&buf[..2], b"0\0");
        }
    }

    #[test]
    fn test_format_each_base() {
        let mut buf = [0u8; MAX_DIGITS + 1];
        assert_eq!(format_unsigned(10, &mut buf, Radix::Binary).unwrap(), "1010");
        assert_eq!(format_unsigned(64, &mut buf, Radix::Octal).unwrap(), "100");
        assert_eq!(format_unsigned(1234, &mut buf, Radix::Decimal).unwrap(), "1234");
        assert_eq!(format_unsigned(0xBEEF, &mut buf, Radix::Hex).unwrap(), "BEEF");
        assert_eq!(format_unsigned(0x0A, &mut buf, Radix::Hex).unwrap(), "A");
    }

    #[test]
    fn test_format_extremes_fit_max_digits() {
        let mut buf = [0u8; MAX_DIGITS + 1];
        let text = format_unsigned(u32::MAX, &mut buf, Radix::Binary).unwrap();
        assert_eq!(text.len(), MAX_DIGITS);
        assert!(text.bytes().all(|b| b == b'1'));

        assert_eq!(
            format_unsigned(u32::MAX, &mut buf, Radix::Decimal).unwrap(),
            "4294967295"
        );
    }

    #[test]
    fn test_format_buffer_limits() {
        let mut exact = [0u8; 4];
        assert_eq!(format_unsigned(255, &mut exact, Radix::Decimal).unwrap(), "255");
        assert_eq!(exact[3], 0);

        let mut short = [0u8; 3];
        assert_eq!(
            format_unsigned(255, &mut short, Radix::Decimal),
            Err(Error::BufferTooSmall)
        );

        let mut single = [0u8; 1];
        assert_eq!(
            format_unsigned(0, &mut single, Radix::Decimal),
            Err(Error::BufferTooSmall)
        );

        let mut empty: [u8; 0] = [];
        assert_eq!(
            format_unsigned(1, &mut empty, Radix::Decimal),
            Err(Error::EmptyBuffer)
        );
    }

    #[test]
    fn test_format_in_base() {
        let mut buf = [0u8; 8];
        assert_eq!(format_in_base(8, &mut buf, 8).unwrap(), "10");
        assert_eq!(format_in_base(8, &mut buf, 7), Err(Error::InvalidBase(7)));
        assert_eq!(Radix::try_from(16u8), Ok(Radix::Hex));
        assert_eq!(Radix::try_from(0u8), Err(Error::InvalidBase(0)));
    }

    #[test]
    fn test_parse_stops_at_non_digit() {
        assert_eq!(parse_decimal("123"), 123);
        assert_eq!(parse_decimal("123abc"), 123);
        assert_eq!(parse_decimal(b"77\0 99"), 77);
        assert_eq!(parse_decimal(""), 0);
        assert_eq!(parse_decimal("-5"), 0);
        assert_eq!(parse_decimal(" 5"), 0);
        assert_eq!(parse_decimal("007"), 7);
    }

    #[test]
    fn test_parse_wraps_on_overflow() {
        assert_eq!(parse_decimal("4294967295"), u32::MAX);
        assert_eq!(parse_decimal("4294967296"), 0);
    }

    #[test]
    fn test_decimal_round_trip() {
        let mut buf = [0u8; 12];
        let samples = [0, 1, 9, 10, 99, 100, 255, 256, 65_535, 65_536, 1_000_000, u32::MAX - 1, u32::MAX];
        for &n in samples.iter() {
            let text = format_unsigned(n, &mut buf, Radix::Decimal).unwrap();
            assert_eq!(parse_decimal(text), n);
        }
        // The terminated buffer parses the same way
        format_unsigned(31_337, &mut buf, Radix::Decimal).unwrap();
        assert_eq!(parse_decimal(&buf), 31_337);
    }
}
