//! Index-addressed USART driver.
//!
//! [`Uarts`] owns the register bus and exposes every operation with a
//! peripheral index as its first argument. Each call resolves the index
//! through the descriptor table, so the logic below is written once for all
//! peripherals. [`Port`] is the same driver bound to one index that has
//! already been checked.

use crate::ansi;
use crate::config::{FrameConfig, Parity, WaitPolicy};
use crate::descriptor::{self, Descriptor};
use crate::editor::{self, Line, Terminal};
use crate::registers::Bus;
use crate::Result;

/// Driver for all USART peripherals behind one register bus.
///
/// # Examples
///
/// ```
/// use uartline::{FrameConfig, Uarts, sim::SimBus};
///
/// let uarts = Uarts::new(SimBus::new());
/// uarts.initialize(0, &FrameConfig::BAUD_9600_8N1)?;
/// uarts.transmit_str(0, "hello\r\n")?;
/// assert_eq!(uarts.bus().transmitted(0), b"hello\r\n");
///
/// assert!(uarts.transmit(4, b'x').is_err());
/// # Ok::<(), uartline::Error>(())
/// ```
pub struct Uarts<B: Bus> {
    bus: B,
    wait: WaitPolicy,
}

impl<B: Bus> Uarts<B> {
    /// Creates a driver that waits forever on ready flags.
    pub fn new(bus: B) -> Self {
        Self::with_wait_policy(bus, WaitPolicy::Forever)
    }

    pub fn with_wait_policy(bus: B, wait: WaitPolicy) -> Self {
        Self { bus, wait }
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        self.wait
    }

    pub fn set_wait_policy(&mut self, wait: WaitPolicy) {
        self.wait = wait;
    }

    /// The underlying register bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Gives the bus back.
    pub fn release(self) -> B {
        self.bus
    }

    /// Binds the driver to peripheral `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIndex`](crate::Error::InvalidIndex) for an
    /// index outside the descriptor table.
    pub fn port(&self, index: usize) -> Result<Port<'_, B>> {
        let desc = descriptor::descriptor(index).map_err(|e| {
            warn!("rejected peripheral index {=usize}", index);
            e
        })?;

        Ok(Port {
            bus: &self.bus,
            desc,
            index,
            wait: self.wait,
        })
    }

    /// Configures line rate and frame format and enables the receiver and
    /// transmitter. See [`Port::initialize`].
    pub fn initialize(&self, index: usize, config: &FrameConfig) -> Result<()> {
        self.port(index)?.initialize(config)
    }

    /// Sends one byte, waiting for the transmitter first.
    pub fn transmit(&self, index: usize, byte: u8) -> Result<()> {
        self.port(index)?.transmit(byte)
    }

    /// Waits for and returns one received byte.
    pub fn receive(&self, index: usize) -> Result<u8> {
        self.port(index)?.receive()
    }

    /// Non-blocking check for a received byte.
    pub fn is_receive_ready(&self, index: usize) -> Result<bool> {
        Ok(self.port(index)?.is_receive_ready())
    }

    /// Non-blocking check for room in the transmit data register.
    pub fn is_transmit_ready(&self, index: usize) -> Result<bool> {
        Ok(self.port(index)?.is_transmit_ready())
    }

    /// Sends `data` up to, not including, its first NUL byte.
    pub fn transmit_bytes(&self, index: usize, data: &[u8]) -> Result<()> {
        self.port(index)?.transmit_bytes(data)
    }

    /// Sends `text` up to, not including, its first NUL character.
    pub fn transmit_str(&self, index: usize, text: &str) -> Result<()> {
        self.port(index)?.transmit_bytes(text.as_bytes())
    }

    /// Reads one edited line from peripheral `index` into `buf`.
    ///
    /// The index is checked before anything is read. See
    /// [`editor::read_line`] for the editing rules.
    pub fn read_line<'a>(&self, index: usize, buf: &'a mut [u8]) -> Result<Line<'a>> {
        let mut port = self.port(index)?;
        editor::read_line(&mut port, buf)
    }

    /// Clears the remote screen and homes its cursor.
    pub fn clear_screen(&self, index: usize) -> Result<()> {
        ansi::clear_screen(&mut self.port(index)?)
    }

    /// Selects foreground color `code` on the remote terminal.
    pub fn set_color(&self, index: usize, code: u8) -> Result<()> {
        ansi::set_color(&mut self.port(index)?, code)
    }

    /// Moves the remote cursor to column `x`, row `y`.
    pub fn goto_xy(&self, index: usize, x: u8, y: u8) -> Result<()> {
        ansi::goto_xy(&mut self.port(index)?, x, y)
    }
}

/// One peripheral of a [`Uarts`] driver.
pub struct Port<'a, B: Bus> {
    bus: &'a B,
    desc: &'static Descriptor,
    index: usize,
    wait: WaitPolicy,
}

impl<'a, B: Bus> Port<'a, B> {
    /// Index of the peripheral this port drives.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Programs the baud divisor and frame format, then enables the
    /// receiver and transmitter (receive interrupt left off).
    ///
    /// Word sizes other than 8 leave the size bits clear and so produce a
    /// 5-bit frame on this hardware. Parity and stop bits follow
    /// [`FrameConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBaudRate`](crate::Error::InvalidBaudRate)
    /// before touching any register if the divisor cannot be programmed.
    pub fn initialize(&self, config: &FrameConfig) -> Result<()> {
        let divisor = config.divisor()?;
        let regs = &self.desc.regs;
        let bits = &self.desc.bits;

        self.bus.write(regs.baud_high, (divisor >> 8) as u8);
        self.bus.write(regs.baud_low, divisor as u8);

        self.bus
            .write(regs.control, bits.rx_enable.mask() | bits.tx_enable.mask());

        let mut format = 0;
        if config.is_word_size_encoded() {
            format |= bits.word_size_mask();
        }
        format |= match config.parity {
            Parity::Odd => bits.parity_mask(),
            Parity::Even => bits.parity[1].mask(),
            Parity::None => 0,
        };
        if config.two_stop_bits() {
            format |= bits.stop_bits.mask();
        }
        self.bus.write(regs.format, format);

        debug!(
            "usart{=usize} up: divisor {=u16}, format {=u8:#x}",
            self.index,
            divisor,
            format
        );
        Ok(())
    }

    pub fn is_receive_ready(&self) -> bool {
        self.bus
            .is_set(self.desc.regs.status, self.desc.bits.rx_ready.mask())
    }

    pub fn is_transmit_ready(&self) -> bool {
        self.bus
            .is_set(self.desc.regs.status, self.desc.bits.tx_ready.mask())
    }

    /// Sends one byte once the data register is empty.
    pub fn transmit(&self, byte: u8) -> Result<()> {
        self.wait_for(|port| port.is_transmit_ready())?;
        self.bus.write(self.desc.regs.data, byte);
        Ok(())
    }

    /// Waits for a byte and returns it.
    pub fn receive(&self) -> Result<u8> {
        self.wait_for(|port| port.is_receive_ready())?;
        Ok(self.bus.read(self.desc.regs.data))
    }

    /// Sends `data` up to, not including, its first NUL byte.
    pub fn transmit_bytes(&self, data: &[u8]) -> Result<()> {
        data.iter()
            .take_while(|&&byte| byte != 0)
            .try_for_each(|&byte| self.transmit(byte))
    }

    fn wait_for<F: Fn(&Self) -> bool>(&self, ready: F) -> Result<()> {
        self.wait.wait(|| ready(self)).map_err(|e| {
            warn!("usart{=usize} wait timed out", self.index);
            e
        })
    }
}

impl<B: Bus> Terminal for Port<'_, B> {
    fn read_byte(&mut self) -> Result<u8> {
        self.receive()
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        data.iter().try_for_each(|&byte| self.transmit(byte))
    }

    fn flush(&mut self) -> Result<()> {
        self.wait_for(|port| port.is_transmit_ready())
    }
}

#[cfg(feature = "embedded-io")]
mod io_impls {
    use super::Port;
    use crate::registers::Bus;
    use crate::{Error, Terminal};

    impl<B: Bus> embedded_io::ErrorType for Port<'_, B> {
        type Error = Error;
    }

    impl<B: Bus> embedded_io::Read for Port<'_, B> {
        /// Blocks for the first byte, then drains whatever else is ready.
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
            if buf.is_empty() {
                return Ok(0);
            }

            buf[0] = self.receive()?;
            let mut count = 1;
            while count < buf.len() && self.is_receive_ready() {
                buf[count] = self.receive()?;
                count += 1;
            }
            Ok(count)
        }
    }

    impl<B: Bus> embedded_io::ReadReady for Port<'_, B> {
        fn read_ready(&mut self) -> Result<bool, Error> {
            Ok(self.is_receive_ready())
        }
    }

    impl<B: Bus> embedded_io::Write for Port<'_, B> {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
            Terminal::write(self, buf)?;
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Error> {
            Terminal::flush(self)
        }
    }

    impl<B: Bus> embedded_io::WriteReady for Port<'_, B> {
        fn write_ready(&mut self) -> Result<bool, Error> {
            Ok(self.is_transmit_ready())
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::descriptor::DESCRIPTORS;
    use crate::sim::SimBus;
    use crate::{Error, PERIPHERAL_COUNT};

    #[test]
    fn test_initialize_8n1() {
        let uarts = Uarts::new(SimBus::new());
        uarts.initialize(0, &FrameConfig::BAUD_9600_8N1).unwrap();

        let regs = DESCRIPTORS[0].regs;
        assert_eq!(
            uarts.bus().writes(),
            [
                (regs.baud_high, 0),
                (regs.baud_low, 103),
                (regs.control, 0b0001_1000),
                (regs.format, 0b0000_0110),
            ]
        );
    }

    #[test]
    fn test_initialize_splits_divisor() {
        let uarts = Uarts::new(SimBus::new());
        // 16 MHz / (16 * 300) - 1 = 3332 = 0x0D04
        uarts
            .initialize(2, &FrameConfig::new(300, 8, Parity::None, 1))
            .unwrap();

        let regs = DESCRIPTORS[2].regs;
        assert_eq!(uarts.bus().peek(regs.baud_high), 0x0D);
        assert_eq!(uarts.bus().peek(regs.baud_low), 0x04);
    }

    #[test]
    fn test_initialize_parity_and_stop_bits() {
        let uarts = Uarts::new(SimBus::new());
        let format = DESCRIPTORS[1].regs.format;

        uarts.initialize(1, &FrameConfig::from_codes(9600, 8, 1, 1)).unwrap();
        assert_eq!(uarts.bus().peek(format), 0b0011_0110);

        uarts.initialize(1, &FrameConfig::from_codes(9600, 8, 2, 2)).unwrap();
        assert_eq!(uarts.bus().peek(format), 0b0010_1110);

        uarts.initialize(1, &FrameConfig::from_codes(9600, 8, 9, 3)).unwrap();
        assert_eq!(uarts.bus().peek(format), 0b0000_0110);
    }

    #[test]
    fn test_initialize_other_word_sizes_leave_size_bits_clear() {
        let uarts = Uarts::new(SimBus::new());
        let format = DESCRIPTORS[3].regs.format;

        for size in [5u8, 7, 9, 16] {
            uarts
                .initialize(3, &FrameConfig::new(9600, size, Parity::None, 1))
                .unwrap();
            assert_eq!(uarts.bus().peek(format), 0);
        }
    }

    #[test]
    fn test_initialize_overwrites_previous_format() {
        let uarts = Uarts::new(SimBus::new());
        let format = DESCRIPTORS[0].regs.format;

        uarts.initialize(0, &FrameConfig::from_codes(9600, 8, 1, 2)).unwrap();
        uarts.initialize(0, &FrameConfig::from_codes(9600, 7, 0, 1)).unwrap();
        assert_eq!(uarts.bus().peek(format), 0);
    }

    #[test]
    fn test_initialize_invalid_index_writes_nothing() {
        let uarts = Uarts::new(SimBus::new());
        for index in [4, 5, 255, usize::MAX] {
            assert_eq!(
                uarts.initialize(index, &FrameConfig::BAUD_9600_8N1),
                Err(Error::InvalidIndex(index))
            );
        }
        assert!(uarts.bus().writes().is_empty());
    }

    #[test]
    fn test_initialize_invalid_baud_writes_nothing() {
        let uarts = Uarts::new(SimBus::new());
        assert_eq!(
            uarts.initialize(0, &FrameConfig::new(0, 8, Parity::None, 1)),
            Err(Error::InvalidBaudRate(0))
        );
        assert!(uarts.bus().writes().is_empty());
    }

    #[test]
    fn test_loopback_every_byte_on_every_port() {
        let uarts = Uarts::new(SimBus::new());
        for index in 0..PERIPHERAL_COUNT {
            uarts.bus().set_loopback(index, true);
            for byte in 0..=u8::MAX {
                uarts.transmit(index, byte).unwrap();
                assert_eq!(uarts.receive(index).unwrap(), byte);
            }
        }
    }

    #[test]
    fn test_ports_are_independent() {
        let uarts = Uarts::new(SimBus::new());
        uarts.transmit(1, b'a').unwrap();
        uarts.transmit(3, b'b').unwrap();
        assert_eq!(uarts.bus().transmitted(1), b"a");
        assert_eq!(uarts.bus().transmitted(3), b"b");
        assert!(uarts.bus().transmitted(0).is_empty());

        uarts.bus().feed(2, b"q");
        assert!(!uarts.is_receive_ready(0).unwrap());
        assert!(uarts.is_receive_ready(2).unwrap());
        assert_eq!(uarts.receive(2).unwrap(), b'q');
        assert!(!uarts.is_receive_ready(2).unwrap());
    }

    #[test]
    fn test_invalid_index_everywhere() {
        let uarts = Uarts::new(SimBus::new());
        let mut buf = [0u8; 4];
        assert_eq!(uarts.transmit(4, 0), Err(Error::InvalidIndex(4)));
        assert_eq!(uarts.receive(4), Err(Error::InvalidIndex(4)));
        assert_eq!(uarts.is_receive_ready(4), Err(Error::InvalidIndex(4)));
        assert_eq!(uarts.transmit_str(4, "x"), Err(Error::InvalidIndex(4)));
        assert_eq!(uarts.read_line(4, &mut buf), Err(Error::InvalidIndex(4)));
        assert_eq!(uarts.clear_screen(4), Err(Error::InvalidIndex(4)));
        assert!(uarts.port(4).is_err());
        assert!(uarts.bus().writes().is_empty());
    }

    #[test]
    fn test_transmit_str_stops_at_nul() {
        let uarts = Uarts::new(SimBus::new());
        uarts.transmit_str(0, "ab\0cd").unwrap();
        assert_eq!(uarts.bus().transmitted(0), b"ab");

        uarts.transmit_bytes(1, b"xyz").unwrap();
        assert_eq!(uarts.bus().transmitted(1), b"xyz");
    }

    #[test]
    fn test_transmit_times_out_when_stalled() {
        let uarts = Uarts::with_wait_policy(SimBus::new(), WaitPolicy::Spins(50));
        uarts.bus().stall_transmitter(0, true);
        assert!(!uarts.is_transmit_ready(0).unwrap());
        assert_eq!(uarts.transmit(0, b'x'), Err(Error::Timeout));
        assert!(uarts.bus().transmitted(0).is_empty());

        uarts.bus().stall_transmitter(0, false);
        assert_eq!(uarts.transmit(0, b'x'), Ok(()));
    }

    #[test]
    fn test_receive_times_out_when_idle() {
        let mut uarts = Uarts::new(SimBus::new());
        uarts.set_wait_policy(WaitPolicy::Spins(10));
        assert_eq!(uarts.wait_policy(), WaitPolicy::Spins(10));
        assert_eq!(uarts.receive(1), Err(Error::Timeout));
    }

    #[test]
    fn test_read_line_over_port() {
        let uarts = Uarts::new(SimBus::new());
        uarts.bus().feed(1, b"ab\x08c\r");

        let mut buf = [0u8; crate::LINE_CAPACITY];
        let line = uarts.read_line(1, &mut buf).unwrap();
        assert_eq!(line.as_bytes(), b"ac");
        // Echo goes back out the same peripheral
        assert_eq!(uarts.bus().transmitted(1), b"ab\x08 \x08c");
        assert!(uarts.bus().transmitted(0).is_empty());
    }

    #[test]
    fn test_read_line_empty_buffer_consumes_nothing() {
        let uarts = Uarts::new(SimBus::new());
        uarts.bus().feed(0, b"abc\r");
        let mut buf: [u8; 0] = [];
        assert_eq!(uarts.read_line(0, &mut buf), Err(Error::EmptyBuffer));
        assert_eq!(uarts.bus().pending(0), 4);
    }

    #[test]
    fn test_port_terminal_write() {
        let uarts = Uarts::new(SimBus::new());
        let mut port = uarts.port(2).unwrap();
        assert_eq!(port.index(), 2);
        port.write(b"a\0b").unwrap();
        port.flush().unwrap();
        // Terminal::write is raw and does not stop at NUL
        assert_eq!(uarts.bus().transmitted(2), b"a\0b");
    }

    #[test]
    fn test_release_returns_bus() {
        let uarts = Uarts::new(SimBus::new());
        uarts.transmit(0, 1).unwrap();
        let bus = uarts.release();
        assert_eq!(bus.transmitted(0), [1]);
    }

    #[cfg(feature = "embedded-io")]
    #[test]
    fn test_embedded_io_read_write() {
        use embedded_io::{Read, ReadReady, Write};

        let uarts = Uarts::new(SimBus::new());
        uarts.bus().feed(0, b"hello");
        let mut port = uarts.port(0).unwrap();

        assert!(port.read_ready().unwrap());
        let mut buf = [0u8; 3];
        assert_eq!(Read::read(&mut port, &mut buf).unwrap(), 3);
        assert_eq!(&buf, b"hel");
        assert_eq!(Read::read(&mut port, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"lo");

        port.write_all(b"ok").unwrap();
        Write::flush(&mut port).unwrap();
        assert_eq!(uarts.bus().transmitted(0), b"ok");
    }
}
