//! Bidirectional stream over a receive and a transmit buffer
//!
//! Reads come from the receive buffer, writes go to the transmit buffer. The driver side fills
//! the receive buffer through [`DuplexChannel::receive_region`] and drains the transmit buffer
//! through [`DuplexChannel::tx_mut`]. Neither direction blocks: a write that does not fit is
//! rejected as a whole.

use crate::buffer::{BufferHooks, FixedBuffer, NoHooks};
use crate::config::StreamConfig;
use crate::stream::Stream;
use crate::time::{Clock, Duration};

/// A [`Stream`] that also exposes its two buffers as a unit
pub trait Duplex: Stream {
    /// Drops all received bytes
    fn clear_rx(&mut self);

    /// Drops all bytes not yet transmitted
    fn clear_tx(&mut self);

    fn clear(&mut self) {
        self.clear_rx();
        self.clear_tx();
    }

    /// Bytes waiting for transmission
    fn tx_pending(&self) -> usize;

    /// Moves as many received bytes to the transmit buffer as fit
    ///
    /// Bytes that do not fit stay in the receive buffer.
    fn forward_rx_to_tx(&mut self) -> usize;
}

pub struct DuplexChannel<C, const RX: usize, const TX: usize, HR = NoHooks, HT = NoHooks> {
    rx: FixedBuffer<RX, HR>,
    tx: FixedBuffer<TX, HT>,
    clock: C,
    timeout: Duration,
}

impl<C: Clock, const RX: usize, const TX: usize> DuplexChannel<C, RX, TX> {
    pub const fn new(clock: C, config: StreamConfig) -> Self {
        Self::with_hooks(clock, config, NoHooks, NoHooks)
    }
}

impl<C: Clock, const RX: usize, const TX: usize, HR, HT> DuplexChannel<C, RX, TX, HR, HT> {
    pub const fn with_hooks(clock: C, config: StreamConfig, rx_hooks: HR, tx_hooks: HT) -> Self {
        Self {
            rx: FixedBuffer::with_hooks(rx_hooks),
            tx: FixedBuffer::with_hooks(tx_hooks),
            clock,
            timeout: config.timeout,
        }
    }

    pub fn rx(&self) -> &FixedBuffer<RX, HR> {
        &self.rx
    }

    pub fn rx_mut(&mut self) -> &mut FixedBuffer<RX, HR> {
        &mut self.rx
    }

    pub fn tx(&self) -> &FixedBuffer<TX, HT> {
        &self.tx
    }

    pub fn tx_mut(&mut self) -> &mut FixedBuffer<TX, HT> {
        &mut self.tx
    }

    /// Free space of the transmit buffer for direct writes
    pub fn write_region(&mut self) -> &mut [u8] {
        self.tx.write_region()
    }

    /// Free space of the receive buffer for a driver
    pub fn receive_region(&mut self) -> &mut [u8] {
        self.rx.write_region()
    }
}

impl<C: Clock, const RX: usize, const TX: usize, HR: BufferHooks, HT: BufferHooks>
    DuplexChannel<C, RX, TX, HR, HT>
{
    /// Publishes bytes placed in [`DuplexChannel::write_region`]
    ///
    /// Behaves like a write of the same bytes, including hooks. Saturates at the free space.
    pub fn commit_written(&mut self, count: usize) -> usize {
        self.tx.commit(count)
    }

    /// Publishes bytes placed in [`DuplexChannel::receive_region`]
    pub fn commit_received(&mut self, count: usize) -> usize {
        self.rx.commit(count)
    }

    /// Appends received bytes, all or nothing
    pub fn receive(&mut self, bytes: &[u8]) -> usize {
        self.rx.write(bytes)
    }

    /// Moves pending transmit bytes into `out`
    pub fn transmit(&mut self, out: &mut [u8]) -> usize {
        self.tx.read_slice(out)
    }
}

impl<C: Clock, const RX: usize, const TX: usize, HR: BufferHooks, HT: BufferHooks> Stream
    for DuplexChannel<C, RX, TX, HR, HT>
{
    type Clock = C;

    fn read(&mut self) -> Option<u8> {
        self.rx.read()
    }

    fn peek(&mut self) -> Option<u8> {
        self.rx.peek()
    }

    fn available(&self) -> usize {
        self.rx.len()
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        self.tx.write(bytes)
    }

    fn available_for_write(&self) -> usize {
        self.tx.remaining_space()
    }

    fn clock(&self) -> &C {
        &self.clock
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

impl<C: Clock, const RX: usize, const TX: usize, HR: BufferHooks, HT: BufferHooks> Duplex
    for DuplexChannel<C, RX, TX, HR, HT>
{
    fn clear_rx(&mut self) {
        self.rx.clear();
    }

    fn clear_tx(&mut self) {
        self.tx.clear();
    }

    fn tx_pending(&self) -> usize {
        self.tx.len()
    }

    fn forward_rx_to_tx(&mut self) -> usize {
        self.rx.read_into(&mut self.tx)
    }
}

impl<C: Clock, const RX: usize, const TX: usize, HR: BufferHooks, HT: BufferHooks>
    core::fmt::Write for DuplexChannel<C, RX, TX, HR, HT>
{
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        core::fmt::Write::write_str(&mut self.tx, s)
    }
}
