//! Peripheral descriptor table.
//!
//! One [`Descriptor`] per physical USART, binding a peripheral index to the
//! locations of its registers and the meaning of each bit inside them. The
//! table is fixed at compile time and never mutated.

use crate::config::PERIPHERAL_COUNT;
use crate::registers::{Address, Bit};
use crate::{Error, Result};

/// Where one USART's registers live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
    /// Baud divisor, high byte (UBRRnH)
    pub baud_high: Address,
    /// Baud divisor, low byte (UBRRnL)
    pub baud_low: Address,
    /// Status flags (UCSRnA)
    pub status: Address,
    /// Enables (UCSRnB)
    pub control: Address,
    /// Frame format (UCSRnC)
    pub format: Address,
    /// Transmit/receive data (UDRn)
    pub data: Address,
}

impl RegisterMap {
    /// Layout shared by every USART on the part: status at `base`, the baud
    /// pair at `base + 4/5`, data at `base + 6`.
    pub const fn at(base: Address) -> Self {
        Self {
            status: base,
            control: base + 1,
            format: base + 2,
            baud_low: base + 4,
            baud_high: base + 5,
            data: base + 6,
        }
    }
}

/// Semantic bit assignments for one USART family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitLayout {
    /// Receiver enable, in `control`
    pub rx_enable: Bit,
    /// Transmitter enable, in `control`
    pub tx_enable: Bit,
    /// Receive-complete interrupt enable, in `control`. Never set here.
    pub rx_interrupt_enable: Bit,
    /// Data register empty, in `status`
    pub tx_ready: Bit,
    /// Receive complete, in `status`
    pub rx_ready: Bit,
    /// Character size select bits, in `format`
    pub word_size: [Bit; 2],
    /// Parity mode bits (UPMn0, UPMn1), in `format`
    pub parity: [Bit; 2],
    /// Stop bit select, in `format`
    pub stop_bits: Bit,
}

impl BitLayout {
    /// The megaAVR USART bit assignments.
    pub const MEGA_AVR: BitLayout = BitLayout {
        rx_enable: Bit::new(4),
        tx_enable: Bit::new(3),
        rx_interrupt_enable: Bit::new(7),
        tx_ready: Bit::new(5),
        rx_ready: Bit::new(7),
        word_size: [Bit::new(1), Bit::new(2)],
        parity: [Bit::new(4), Bit::new(5)],
        stop_bits: Bit::new(3),
    };

    pub const fn word_size_mask(&self) -> u8 {
        self.word_size[0].mask() | self.word_size[1].mask()
    }

    pub const fn parity_mask(&self) -> u8 {
        self.parity[0].mask() | self.parity[1].mask()
    }
}

/// Everything the driver needs to know about one peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub regs: RegisterMap,
    pub bits: BitLayout,
}

/// The ATmega2560's four USARTs, in index order.
pub static DESCRIPTORS: [Descriptor; PERIPHERAL_COUNT] = [
    Descriptor { regs: RegisterMap::at(0xC0), bits: BitLayout::MEGA_AVR },
    Descriptor { regs: RegisterMap::at(0xC8), bits: BitLayout::MEGA_AVR },
    Descriptor { regs: RegisterMap::at(0xD0), bits: BitLayout::MEGA_AVR },
    Descriptor { regs: RegisterMap::at(0x130), bits: BitLayout::MEGA_AVR },
];

/// Looks up the descriptor for `index`.
///
/// # Errors
///
/// Returns [`Error::InvalidIndex`] when `index` is not below
/// [`PERIPHERAL_COUNT`].
pub fn descriptor(index: usize) -> Result<&'static Descriptor> {
    DESCRIPTORS.get(index).ok_or(Error::InvalidIndex(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_in_range() {
        for index in 0..PERIPHERAL_COUNT {
            assert!(descriptor(index).is_ok());
        }
    }

    #[test]
    fn test_lookup_out_of_range() {
        assert_eq!(descriptor(4), Err(Error::InvalidIndex(4)));
        assert_eq!(descriptor(usize::MAX), Err(Error::InvalidIndex(usize::MAX)));
    }

    #[test]
    fn test_usart0_addresses() {
        let regs = descriptor(0).unwrap().regs;
        assert_eq!(regs.status, 0xC0);
        assert_eq!(regs.control, 0xC1);
        assert_eq!(regs.format, 0xC2);
        assert_eq!(regs.baud_low, 0xC4);
        assert_eq!(regs.baud_high, 0xC5);
        assert_eq!(regs.data, 0xC6);
    }

    #[test]
    fn test_usart3_lives_in_extended_io() {
        let regs = descriptor(3).unwrap().regs;
        assert_eq!(regs.status, 0x130);
        assert_eq!(regs.data, 0x136);
    }

    #[test]
    fn test_register_files_do_not_overlap() {
        for (i, a) in DESCRIPTORS.iter().enumerate() {
            for b in DESCRIPTORS.iter().skip(i + 1) {
                assert!(a.regs.data < b.regs.status || b.regs.data < a.regs.status);
            }
        }
    }

    #[test]
    fn test_bit_layout_masks() {
        let bits = BitLayout::MEGA_AVR;
        assert_eq!(bits.word_size_mask(), 0b0000_0110);
        assert_eq!(bits.parity_mask(), 0b0011_0000);
        assert_eq!(bits.stop_bits.mask(), 0b0000_1000);
        assert_eq!(bits.rx_enable.mask() | bits.tx_enable.mask(), 0b0001_1000);
    }
}
