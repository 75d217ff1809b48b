//! Bridge between a physical channel driver and a [`DuplexChannel`]
//!
//! A [`Link`] owns two [`SharedBuffer`]s, one per direction. [`Link::split`] hands out
//!
//! * [`RxLine`]: pushes received bytes, typically from a receive interrupt,
//! * [`TxLine`]: pops bytes to put on the wire, typically from a transmit interrupt,
//! * [`LinkPort`]: main-loop side that pumps bytes between the link and a channel.
//!
//! ```text
//!  driver (IRQ)                 main loop
//!  RxLine ──▶ rx SharedBuffer ──▶ LinkPort::pump ──▶ channel rx ──▶ session
//!  TxLine ◀── tx SharedBuffer ◀── LinkPort::pump ◀── channel tx ◀── session
//! ```
//!
//! Received chunks that do not fit are dropped whole and counted as overruns.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::buffer::{BufferHooks, Consumer, Producer, SharedBuffer};
use crate::channel::DuplexChannel;
use crate::time::Clock;

pub struct Link<M: RawMutex, const RX: usize, const TX: usize> {
    rx: SharedBuffer<M, RX>,
    tx: SharedBuffer<M, TX>,
}

impl<M: RawMutex, const RX: usize, const TX: usize> Link<M, RX, TX> {
    pub const fn new() -> Self {
        Self {
            rx: SharedBuffer::new(),
            tx: SharedBuffer::new(),
        }
    }

    pub fn split(&mut self) -> (RxLine<'_, M, RX>, TxLine<'_, M, TX>, LinkPort<'_, M, RX, TX>) {
        let (rx_producer, rx_consumer) = self.rx.split();
        let (tx_producer, tx_consumer) = self.tx.split();
        (
            RxLine {
                producer: rx_producer,
                overruns: 0,
            },
            TxLine {
                consumer: tx_consumer,
            },
            LinkPort {
                rx: rx_consumer,
                tx: tx_producer,
            },
        )
    }
}

impl<M: RawMutex, const RX: usize, const TX: usize> Default for Link<M, RX, TX> {
    fn default() -> Self {
        Self::new()
    }
}

/// Driver side of the receive direction
pub struct RxLine<'a, M: RawMutex, const N: usize> {
    producer: Producer<'a, M, N>,
    overruns: u32,
}

impl<'a, M: RawMutex, const N: usize> RxLine<'a, M, N> {
    /// Queues a received chunk, all or nothing
    ///
    /// Returns false and counts an overrun if the chunk does not fit.
    pub fn push(&mut self, bytes: &[u8]) -> bool {
        if self.producer.write(bytes) == bytes.len() {
            return true;
        }
        self.overruns = self.overruns.wrapping_add(1);
        warn!("rx overrun, {} bytes dropped", bytes.len());
        false
    }

    pub fn push_byte(&mut self, byte: u8) -> bool {
        self.push(&[byte])
    }

    /// Lets a driver copy straight into the free region, see [`Producer::write_with`]
    pub fn receive_with(&mut self, fill: impl FnOnce(&mut [u8]) -> usize) -> usize {
        self.producer.write_with(fill)
    }

    pub fn free_space(&self) -> usize {
        self.producer.remaining_space()
    }

    /// Chunks dropped for lack of space
    pub fn overruns(&self) -> u32 {
        self.overruns
    }
}

/// Driver side of the transmit direction
pub struct TxLine<'a, M: RawMutex, const N: usize> {
    consumer: Consumer<'a, M, N>,
}

impl<'a, M: RawMutex, const N: usize> TxLine<'a, M, N> {
    pub fn pop(&mut self) -> Option<u8> {
        self.consumer.read()
    }

    pub fn pop_slice(&mut self, out: &mut [u8]) -> usize {
        self.consumer.read_slice(out)
    }

    /// Lets a driver copy straight out of the pending bytes, see [`Consumer::read_with`]
    pub fn transmit_with(&mut self, drain: impl FnOnce(&[u8]) -> usize) -> usize {
        self.consumer.read_with(drain)
    }

    pub fn pending(&self) -> usize {
        self.consumer.len()
    }

    /// Nothing left to transmit
    pub fn is_idle(&self) -> bool {
        self.consumer.is_empty()
    }
}

/// Main-loop side of a [`Link`]
pub struct LinkPort<'a, M: RawMutex, const RX: usize, const TX: usize> {
    rx: Consumer<'a, M, RX>,
    tx: Producer<'a, M, TX>,
}

impl<'a, M: RawMutex, const RX: usize, const TX: usize> LinkPort<'a, M, RX, TX> {
    /// Moves received bytes into the channel's receive buffer
    ///
    /// Bytes that do not fit stay queued in the link.
    pub fn pump_rx<C, const CRX: usize, const CTX: usize, HR, HT>(
        &mut self,
        channel: &mut DuplexChannel<C, CRX, CTX, HR, HT>,
    ) -> usize
    where
        C: Clock,
        HR: BufferHooks,
        HT: BufferHooks,
    {
        self.rx.read_into(channel.rx_mut())
    }

    /// Moves the channel's pending transmit bytes into the link
    pub fn pump_tx<C, const CRX: usize, const CTX: usize, HR, HT>(
        &mut self,
        channel: &mut DuplexChannel<C, CRX, CTX, HR, HT>,
    ) -> usize
    where
        C: Clock,
        HR: BufferHooks,
        HT: BufferHooks,
    {
        self.tx.write_with(|region| channel.transmit(region))
    }

    /// Runs both directions, returns the number of bytes moved
    pub fn pump<C, const CRX: usize, const CTX: usize, HR, HT>(
        &mut self,
        channel: &mut DuplexChannel<C, CRX, CTX, HR, HT>,
    ) -> usize
    where
        C: Clock,
        HR: BufferHooks,
        HT: BufferHooks,
    {
        self.pump_rx(channel) + self.pump_tx(channel)
    }

    pub fn rx_pending(&self) -> usize {
        self.rx.len()
    }

    pub fn tx_free_space(&self) -> usize {
        self.tx.remaining_space()
    }
}
