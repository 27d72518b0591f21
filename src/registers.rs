//! Register-file access.
//!
//! [`Bus`] is the single seam through which the driver touches hardware.
//! Descriptors carry register *locations*; they are only ever dereferenced
//! by a bus implementation, so nothing outside this module and the bus
//! back-ends sees a raw pointer.

/// Data-memory address of an 8-bit register.
pub type Address = u16;

/// Byte-wide access to a register file.
///
/// Every call is one hardware access: implementations must not cache,
/// merge or reorder reads and writes, since status registers change under
/// the program's feet.
pub trait Bus {
    /// Reads the register at `addr`.
    fn read(&self, addr: Address) -> u8;

    /// Writes `value` to the register at `addr`.
    fn write(&self, addr: Address, value: u8);

    /// Read-modify-write setting the bits in `mask`.
    fn set_bits(&self, addr: Address, mask: u8) {
        self.write(addr, self.read(addr) | mask);
    }

    /// Tests whether every bit of `mask` is set.
    fn is_set(&self, addr: Address, mask: u8) -> bool {
        self.read(addr) & mask == mask
    }
}

impl<B: Bus + ?Sized> Bus for &B {
    fn read(&self, addr: Address) -> u8 {
        (**self).read(addr)
    }

    fn write(&self, addr: Address, value: u8) {
        (**self).write(addr, value)
    }
}

/// Position of a single flag inside an 8-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bit(u8);

impl Bit {
    /// Creates a bit position. Positions past 7 fail const evaluation.
    pub const fn new(position: u8) -> Self {
        assert!(position < 8, "bit position out of range");
        Bit(position)
    }

    pub const fn position(self) -> u8 {
        self.0
    }

    pub const fn mask(self) -> u8 {
        1 << self.0
    }
}

/// Volatile access to the AVR data-memory space.
///
/// Not `Sync`: the register file belongs to one execution context.
#[cfg(feature = "avr")]
pub struct Mmio {
    _not_sync: core::marker::PhantomData<*const ()>,
}

#[cfg(feature = "avr")]
impl Mmio {
    /// Takes the memory-mapped register file.
    ///
    /// # Safety
    ///
    /// The caller must be running on an ATmega2560 (or a part with the same
    /// USART memory map) and must not create a second `Mmio` while this one
    /// is alive.
    pub unsafe fn new() -> Self {
        Mmio {
            _not_sync: core::marker::PhantomData,
        }
    }
}

#[cfg(feature = "avr")]
impl Bus for Mmio {
    #[inline]
    fn read(&self, addr: Address) -> u8 {
        // SAFETY: `Mmio::new` contract; addresses come from the descriptor table.
        unsafe { core::ptr::read_volatile(addr as usize as *const u8) }
    }

    #[inline]
    fn write(&self, addr: Address, value: u8) {
        // SAFETY: as above.
        unsafe { core::ptr::write_volatile(addr as usize as *mut u8, value) }
    }
}
