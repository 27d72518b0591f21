//! ANSI escape sequences for the remote terminal.

use crate::numfmt::{format_unsigned, Radix};
use crate::{Result, Terminal};

const CSI: &[u8] = b"\x1b[";

/// Clears the whole screen and moves the cursor to the top-left corner.
pub fn clear_screen<T: Terminal + ?Sized>(terminal: &mut T) -> Result<()> {
    terminal.write(b"\x1b[2J\x1b[H")
}

/// Resets colors and attributes to the terminal defaults (`ESC[0m`).
pub fn reset_attributes<T: Terminal + ?Sized>(terminal: &mut T) -> Result<()> {
    set_color(terminal, 0)
}

/// Emits the select-graphic-rendition sequence `ESC[<code>m`.
///
/// Codes 30-37 and 90-97 pick a foreground color; any other value is sent
/// as-is and interpreted by the terminal.
pub fn set_color<T: Terminal + ?Sized>(terminal: &mut T, code: u8) -> Result<()> {
    let mut digits = [0u8; 4];
    terminal.write(CSI)?;
    terminal.write(format_unsigned(code as u32, &mut digits, Radix::Decimal)?.as_bytes())?;
    terminal.write(b"m")
}

/// Moves the cursor to column `x`, row `y` (`ESC[<y>;<x>H`).
///
/// Terminals count both from 1; 0 is treated as 1 by most of them.
pub fn goto_xy<T: Terminal + ?Sized>(terminal: &mut T, x: u8, y: u8) -> Result<()> {
    let mut digits = [0u8; 4];
    terminal.write(CSI)?;
    terminal.write(format_unsigned(y as u32, &mut digits, Radix::Decimal)?.as_bytes())?;
    terminal.write(b";")?;
    terminal.write(format_unsigned(x as u32, &mut digits, Radix::Decimal)?.as_bytes())?;
    terminal.write(b"H")
}
