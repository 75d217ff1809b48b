//! Buffer shared between an interrupt handler and the main loop
//!
//! A drain resets both cursors, so the consumer side writes the producer cursor as well.
//! Every access therefore runs inside a blocking mutex. With `CriticalSectionRawMutex` the
//! handles may live in different interrupt priorities; critical sections last as long as the
//! copied bytes.
//!
//! [`SharedBuffer::split`] hands out one [`Producer`] and one [`Consumer`]. A producer can only
//! append, a consumer can only read, so neither context can move a cursor it does not own.
//!
//! ```
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use static_cell::StaticCell;
//! use streamux::buffer::SharedBuffer;
//!
//! static RX: StaticCell<SharedBuffer<CriticalSectionRawMutex, 64>> = StaticCell::new();
//! let (mut producer, mut consumer) = RX.init(SharedBuffer::new()).split();
//!
//! // Interrupt handler side
//! producer.write(b"ping");
//! // Main loop side
//! assert_eq!(consumer.read(), Some(b'p'));
//! ```

use core::cell::RefCell;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

use super::{BufferHooks, FixedBuffer, NoHooks};

pub struct SharedBuffer<M: RawMutex, const N: usize, H = NoHooks> {
    inner: Mutex<M, RefCell<FixedBuffer<N, H>>>,
}

impl<M: RawMutex, const N: usize> SharedBuffer<M, N, NoHooks> {
    pub const fn new() -> Self {
        Self::with_hooks(NoHooks)
    }
}

impl<M: RawMutex, const N: usize> Default for SharedBuffer<M, N, NoHooks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize, H: BufferHooks> SharedBuffer<M, N, H> {
    pub const fn with_hooks(hooks: H) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(FixedBuffer::with_hooks(hooks))),
        }
    }

    /// Splits the buffer into its only producer and consumer handles
    pub fn split(&mut self) -> (Producer<'_, M, N, H>, Consumer<'_, M, N, H>) {
        let shared = &*self;
        (Producer { shared }, Consumer { shared })
    }

    /// Exclusive access while no handle is alive
    pub fn get_mut(&mut self) -> &mut FixedBuffer<N, H> {
        self.inner.get_mut().get_mut()
    }

    pub fn len(&self) -> usize {
        self.lock(|buffer| buffer.len())
    }

    pub fn is_empty(&self) -> bool {
        self.lock(|buffer| buffer.is_empty())
    }

    pub fn remaining_space(&self) -> usize {
        self.lock(|buffer| buffer.remaining_space())
    }

    fn lock<R>(&self, f: impl FnOnce(&mut FixedBuffer<N, H>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Appending side of a [`SharedBuffer`]
pub struct Producer<'a, M: RawMutex, const N: usize, H = NoHooks> {
    shared: &'a SharedBuffer<M, N, H>,
}

impl<'a, M: RawMutex, const N: usize, H: BufferHooks> Producer<'a, M, N, H> {
    /// Appends all of `bytes` or nothing
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        self.shared.lock(|buffer| buffer.write(bytes))
    }

    pub fn write_byte(&mut self, byte: u8) -> usize {
        self.write(&[byte])
    }

    /// Lets `fill` write into the free region directly and commits what it reports
    ///
    /// `fill` runs inside the critical section and should only copy.
    pub fn write_with(&mut self, fill: impl FnOnce(&mut [u8]) -> usize) -> usize {
        self.shared.lock(|buffer| {
            let count = fill(buffer.write_region());
            buffer.commit(count)
        })
    }

    pub fn remaining_space(&self) -> usize {
        self.shared.remaining_space()
    }
}

/// Consuming side of a [`SharedBuffer`]
pub struct Consumer<'a, M: RawMutex, const N: usize, H = NoHooks> {
    shared: &'a SharedBuffer<M, N, H>,
}

impl<'a, M: RawMutex, const N: usize, H: BufferHooks> Consumer<'a, M, N, H> {
    pub fn read(&mut self) -> Option<u8> {
        self.shared.lock(|buffer| buffer.read())
    }

    pub fn read_slice(&mut self, out: &mut [u8]) -> usize {
        self.shared.lock(|buffer| buffer.read_slice(out))
    }

    /// Moves as many bytes as fit into a main-loop owned buffer
    pub fn read_into<const T: usize, TH: BufferHooks>(
        &mut self,
        target: &mut FixedBuffer<T, TH>,
    ) -> usize {
        self.shared.lock(|buffer| buffer.read_into(target))
    }

    /// Lets `drain` inspect the unread bytes directly and consumes what it reports
    ///
    /// `drain` runs inside the critical section and should only copy.
    pub fn read_with(&mut self, drain: impl FnOnce(&[u8]) -> usize) -> usize {
        self.shared.lock(|buffer| {
            let count = drain(buffer.as_slice());
            buffer.remove(count)
        })
    }

    pub fn peek(&self) -> Option<u8> {
        self.shared.lock(|buffer| buffer.peek())
    }

    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.shared.lock(|buffer| buffer.peek_at(offset))
    }

    pub fn find(&self, byte: u8) -> Option<usize> {
        self.shared.lock(|buffer| buffer.find(byte))
    }

    pub fn len(&self) -> usize {
        self.shared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.is_empty()
    }

    /// Discards everything unread
    pub fn clear(&mut self) {
        self.shared.lock(|buffer| {
            let count = buffer.len();
            buffer.remove(count);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex};

    #[test]
    fn test_split_handles() {
        let mut shared = SharedBuffer::<CriticalSectionRawMutex, 8>::new();
        let (mut producer, mut consumer) = shared.split();

        assert_eq!(producer.write(b"abc"), 3);
        assert_eq!(consumer.len(), 3);
        assert_eq!(consumer.peek_at(1), Some(b'b'));
        assert_eq!(consumer.read(), Some(b'a'));
        assert_eq!(producer.remaining_space(), 5);

        let mut out = [0u8; 4];
        assert_eq!(consumer.read_slice(&mut out), 2);
        assert_eq!(&out[..2], b"bc");
        assert_eq!(producer.remaining_space(), 8);
    }

    #[test]
    fn test_write_with_region() {
        let mut shared = SharedBuffer::<NoopRawMutex, 4>::new();
        let (mut producer, consumer) = shared.split();

        let written = producer.write_with(|region| {
            region[..2].copy_from_slice(b"hi");
            2
        });
        assert_eq!(written, 2);
        assert_eq!(consumer.find(b'i'), Some(1));

        // Over-reporting is clamped to the free space
        assert_eq!(producer.write_with(|_| 10), 2);
        assert_eq!(producer.remaining_space(), 0);
    }

    #[test]
    fn test_read_with_and_clear() {
        let mut shared = SharedBuffer::<NoopRawMutex, 8>::new();
        let (mut producer, mut consumer) = shared.split();
        producer.write(b"abcdef");

        let mut sent = [0u8; 3];
        let count = consumer.read_with(|bytes| {
            sent.copy_from_slice(&bytes[..3]);
            3
        });
        assert_eq!(count, 3);
        assert_eq!(&sent, b"abc");

        consumer.clear();
        assert!(consumer.is_empty());
        assert_eq!(producer.remaining_space(), 8);
    }

    #[test]
    fn test_read_into_fixed() {
        let mut shared = SharedBuffer::<NoopRawMutex, 8>::new();
        let mut local = FixedBuffer::<4>::new();
        {
            let (mut producer, mut consumer) = shared.split();
            producer.write(b"abcdef");
            assert_eq!(consumer.read_into(&mut local), 4);
        }
        assert_eq!(local.as_slice(), b"abcd");
        assert_eq!(shared.get_mut().as_slice(), b"ef");
    }
}
