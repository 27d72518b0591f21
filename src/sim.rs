//! Simulated USART register file.
//!
//! [`SimBus`] answers reads and writes at the addresses in
//! [`DESCRIPTORS`](crate::descriptor::DESCRIPTORS) the way the silicon does,
//! closely enough to run the driver on a host:
//!
//! - the receive-ready flag reads as set while bytes are queued for that
//!   peripheral, and reading the data register pops one
//! - the transmit-ready flag reads as set unless the transmitter is stalled
//! - writes to the data register are recorded, and looped back to the
//!   receive queue when loopback is on
//!
//! Every register write is also logged in order, so tests can check exactly
//! what the driver did to the hardware.

use core::cell::RefCell;
use std::collections::VecDeque;

use crate::config::PERIPHERAL_COUNT;
use crate::descriptor::DESCRIPTORS;
use crate::registers::{Address, Bus};

const MEMORY_SIZE: usize = 0x140;

#[derive(Debug, Default, Clone)]
struct Channel {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    loopback: bool,
    tx_stalled: bool,
}

#[derive(Debug)]
struct SimState {
    memory: [u8; MEMORY_SIZE],
    channels: [Channel; PERIPHERAL_COUNT],
    writes: Vec<(Address, u8)>,
}

#[derive(Clone, Copy)]
enum Slot {
    Status(usize),
    Data(usize),
    Plain,
}

fn classify(addr: Address) -> Slot {
    for (index, desc) in DESCRIPTORS.iter().enumerate() {
        if addr == desc.regs.status {
            return Slot::Status(index);
        }
        if addr == desc.regs.data {
            return Slot::Data(index);
        }
    }
    Slot::Plain
}

/// In-memory stand-in for the four USARTs.
///
/// # Examples
///
/// ```
/// use uartline::{Uarts, sim::SimBus};
///
/// let uarts = Uarts::new(SimBus::new());
/// uarts.bus().set_loopback(2, true);
///
/// uarts.transmit(2, 0x5A)?;
/// assert_eq!(uarts.receive(2)?, 0x5A);
/// assert_eq!(uarts.bus().transmitted(2), [0x5A]);
/// # Ok::<(), uartline::Error>(())
/// ```
#[derive(Debug)]
pub struct SimBus {
    state: RefCell<SimState>,
}

impl SimBus {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(SimState {
                memory: [0; MEMORY_SIZE],
                channels: Default::default(),
                writes: Vec::new(),
            }),
        }
    }

    /// Queues bytes on the receive side of peripheral `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid peripheral index.
    pub fn feed(&self, index: usize, data: &[u8]) {
        self.state.borrow_mut().channels[index].rx.extend(data.iter().copied());
    }

    /// Bytes still waiting to be received on `index`.
    pub fn pending(&self, index: usize) -> usize {
        self.state.borrow().channels[index].rx.len()
    }

    /// Everything written to the data register of `index` so far.
    pub fn transmitted(&self, index: usize) -> Vec<u8> {
        self.state.borrow().channels[index].tx.clone()
    }

    /// Returns the transmit log of `index` and clears it.
    pub fn take_transmitted(&self, index: usize) -> Vec<u8> {
        core::mem::take(&mut self.state.borrow_mut().channels[index].tx)
    }

    /// Routes transmitted bytes of `index` back into its receive queue.
    pub fn set_loopback(&self, index: usize, enabled: bool) {
        self.state.borrow_mut().channels[index].loopback = enabled;
    }

    /// Holds the transmit-ready flag of `index` low while `stalled`.
    pub fn stall_transmitter(&self, index: usize, stalled: bool) {
        self.state.borrow_mut().channels[index].tx_stalled = stalled;
    }

    /// Every register write since creation or the last [`clear_writes`](Self::clear_writes).
    pub fn writes(&self) -> Vec<(Address, u8)> {
        self.state.borrow().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.state.borrow_mut().writes.clear();
    }

    /// Last value written to a plain register, without read side effects.
    pub fn peek(&self, addr: Address) -> u8 {
        self.state
            .borrow()
            .memory
            .get(addr as usize)
            .copied()
            .unwrap_or(0)
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimBus {
    fn read(&self, addr: Address) -> u8 {
        let mut state = self.state.borrow_mut();

        match classify(addr) {
            Slot::Status(index) => {
                let bits = DESCRIPTORS[index].bits;
                let channel = &state.channels[index];
                let mut value = state.memory[addr as usize]
                    & !(bits.rx_ready.mask() | bits.tx_ready.mask());
                if !channel.rx.is_empty() {
                    value |= bits.rx_ready.mask();
                }
                if !channel.tx_stalled {
                    value |= bits.tx_ready.mask();
                }
                value
            }
            Slot::Data(index) => state.channels[index].rx.pop_front().unwrap_or(0),
            Slot::Plain => state.memory.get(addr as usize).copied().unwrap_or(0),
        }
    }

    fn write(&self, addr: Address, value: u8) {
        let mut state = self.state.borrow_mut();
        state.writes.push((addr, value));

        match classify(addr) {
            Slot::Data(index) => {
                let channel = &mut state.channels[index];
                channel.tx.push(value);
                if channel.loopback {
                    channel.rx.push_back(value);
                }
            }
            Slot::Status(_) | Slot::Plain => {
                if let Some(slot) = state.memory.get_mut(addr as usize) {
                    *slot = value;
                }
            }
        }
    }
}
