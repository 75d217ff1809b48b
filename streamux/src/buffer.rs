//! Fixed-capacity byte buffer with drain-to-reclaim semantics
//!
//! The occupied region is the half-open interval `[tail, head)`. Writes append at `head`,
//! reads consume from `tail`. The buffer never wraps: space released by partial reads is
//! reclaimed only once the buffer drains completely, at which point both cursors reset to zero
//! and the storage is cleared. A write larger than `capacity - head` therefore fails even if
//! most of the written bytes have already been read.
//!
//! ```
//! use streamux::buffer::FixedBuffer;
//!
//! let mut buffer = FixedBuffer::<8>::new();
//! assert_eq!(buffer.write(b"abcdefgh"), 8);
//! assert_eq!(buffer.read(), Some(b'a'));
//! // Partially read space is not reused
//! assert_eq!(buffer.remaining_space(), 0);
//! let mut out = [0u8; 7];
//! assert_eq!(buffer.read_slice(&mut out), 7);
//! assert_eq!(buffer.remaining_space(), 8);
//! ```

mod hooks;
mod shared;

pub use hooks::{BufferEvent, BufferHooks, FnHooks, NoHooks};
pub use shared::{Consumer, Producer, SharedBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteError {
    InsufficientSpace { requested: usize, remaining: usize },
}

#[derive(Debug, Clone)]
pub struct FixedBuffer<const N: usize, H = NoHooks> {
    data: [u8; N],
    /// Index of the next free byte
    head: usize,
    /// Index of the next byte to read
    tail: usize,
    hooks: H,
}

impl<const N: usize> FixedBuffer<N, NoHooks> {
    pub const fn new() -> Self {
        Self::with_hooks(NoHooks)
    }
}

impl<const N: usize> Default for FixedBuffer<N, NoHooks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, H> FixedBuffer<N, H> {
    pub const fn with_hooks(hooks: H) -> Self {
        Self {
            data: [0; N],
            head: 0,
            tail: 0,
            hooks,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub const fn len(&self) -> usize {
        self.head - self.tail
    }

    pub const fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// True once the write cursor reached the end, regardless of how much has been read
    pub const fn is_full(&self) -> bool {
        self.head == N
    }

    /// Bytes that can still be appended before the buffer drains
    pub const fn remaining_space(&self) -> usize {
        N - self.head
    }

    /// Unread bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.tail..self.head]
    }

    /// Free region behind the write cursor
    ///
    /// Bytes written here become visible only after [`FixedBuffer::commit`].
    pub fn write_region(&mut self) -> &mut [u8] {
        &mut self.data[self.head..]
    }

    pub fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    /// Inspects the unread byte at `offset` without consuming it
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.as_slice().get(offset).copied()
    }

    /// Offset of the first unread occurrence of `byte`
    pub fn find(&self, byte: u8) -> Option<usize> {
        self.as_slice().iter().position(|&b| b == byte)
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Resets both cursors and zeroes the storage. Fires no hooks.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.data.fill(0);
    }
}

impl<const N: usize, H: BufferHooks> FixedBuffer<N, H> {
    /// Appends all of `bytes` or nothing
    ///
    /// Returns the number of bytes written: either `bytes.len()` or 0.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        self.try_write(bytes).unwrap_or(0)
    }

    pub fn write_byte(&mut self, byte: u8) -> usize {
        self.write(&[byte])
    }

    pub fn try_write(&mut self, bytes: &[u8]) -> Result<usize, WriteError> {
        let remaining = self.remaining_space();
        if remaining < bytes.len() {
            return Err(WriteError::InsufficientSpace {
                requested: bytes.len(),
                remaining,
            });
        }
        if bytes.is_empty() {
            return Ok(0);
        }
        self.write_region()[..bytes.len()].copy_from_slice(bytes);
        Ok(self.add(bytes.len()))
    }

    /// Publishes bytes placed in [`FixedBuffer::write_region`]
    pub fn commit(&mut self, count: usize) -> usize {
        self.add(count)
    }

    /// Advances the write cursor, saturating at the capacity
    pub fn add(&mut self, count: usize) -> usize {
        let count = core::cmp::min(self.remaining_space(), count);
        if count == 0 {
            return 0;
        }
        let was_empty = self.head == 0;
        self.head += count;
        if was_empty {
            self.hooks.on_event(BufferEvent::NonEmpty);
        }
        self.hooks.on_event(BufferEvent::Write);
        count
    }

    /// Advances the read cursor, saturating at the unread length
    ///
    /// Draining the last byte resets the buffer.
    pub fn remove(&mut self, count: usize) -> usize {
        let count = core::cmp::min(self.len(), count);
        if count == 0 {
            return 0;
        }
        self.tail += count;
        if self.head == self.tail {
            self.clear();
            self.hooks.on_event(BufferEvent::Empty);
        }
        self.hooks.on_event(BufferEvent::Read);
        count
    }

    pub fn read(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.remove(1);
        Some(byte)
    }

    /// Moves up to `out.len()` bytes into `out`
    ///
    /// The part of `out` that could not be filled is zeroed. Never blocks.
    pub fn read_slice(&mut self, out: &mut [u8]) -> usize {
        out.fill(0);
        let count = core::cmp::min(self.len(), out.len());
        out[..count].copy_from_slice(&self.as_slice()[..count]);
        self.remove(count)
    }

    /// Moves as many bytes as fit into `target`
    pub fn read_into<const M: usize, T: BufferHooks>(
        &mut self,
        target: &mut FixedBuffer<M, T>,
    ) -> usize {
        let count = core::cmp::min(self.len(), target.remaining_space());
        if count == 0 {
            return 0;
        }
        target.write_region()[..count].copy_from_slice(&self.as_slice()[..count]);
        target.commit(count);
        self.remove(count)
    }
}

impl<const N: usize, H: BufferHooks> core::fmt::Write for FixedBuffer<N, H> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.try_write(s.as_bytes())
            .map(|_| ())
            .map_err(|_| core::fmt::Error)
    }
}
