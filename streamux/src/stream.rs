//! Byte stream contract and the timeout-bounded parsing engine built on it
//!
//! An implementation supplies non-blocking `read`/`peek`/`available`/`write` and a clock.
//! Everything else (timed reads, numeric parsing, pattern search) is provided on top and
//! busy-polls the implementation until a byte arrives or the configured timeout elapses.
//! Timeouts are the only way such a call ends early.
//!
//! ```
//! use streamux::core::LookaheadMode;
//! use streamux::stream::{BufferStream, Stream};
//! use streamux::time::EmbassyClock;
//!
//! let mut stream = BufferStream::<_, 32>::new(EmbassyClock, Default::default());
//! stream.write(b"temp=-42;");
//! assert!(stream.find(b"temp="));
//! assert_eq!(stream.parse_int(LookaheadMode::SkipNone, None), -42);
//! assert_eq!(stream.read(), Some(b';'));
//! ```

use heapless::Vec;

use crate::buffer::{BufferHooks, FixedBuffer, NoHooks};
use crate::config::StreamConfig;
use crate::core::LookaheadMode;
use crate::time::{Clock, Duration, duration_to_ms};

mod parse;
mod search;

pub use search::MultiTarget;

pub trait Stream {
    type Clock: Clock;

    /// Takes the next received byte without waiting
    fn read(&mut self) -> Option<u8>;

    /// Returns the next received byte without consuming or waiting
    fn peek(&mut self) -> Option<u8>;

    /// Bytes ready to be read
    fn available(&self) -> usize;

    /// Queues all of `bytes` for transmission or nothing
    fn write(&mut self, bytes: &[u8]) -> usize;

    /// Largest write that would currently succeed
    fn available_for_write(&self) -> usize;

    fn clock(&self) -> &Self::Clock;

    fn timeout(&self) -> Duration;

    fn set_timeout(&mut self, timeout: Duration);

    fn flush(&mut self) {}

    fn write_byte(&mut self, byte: u8) -> usize {
        self.write(&[byte])
    }

    /// Waits up to the timeout for a byte and consumes it
    fn timed_read(&mut self) -> Option<u8> {
        poll_timed(self, |stream| stream.read())
    }

    /// Waits up to the timeout for a byte without consuming it
    fn timed_peek(&mut self) -> Option<u8> {
        poll_timed(self, |stream| stream.peek())
    }

    /// Fills `out` with timed reads, stopping at the first timeout
    fn read_bytes(&mut self, out: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in out.iter_mut() {
            match self.timed_read() {
                Some(byte) => *slot = byte,
                None => break,
            }
            count += 1;
        }
        count
    }

    /// Like [`Stream::read_bytes`], but also stops at `terminator`
    ///
    /// The terminator is consumed and not stored.
    fn read_bytes_until(&mut self, terminator: u8, out: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in out.iter_mut() {
            match self.timed_read() {
                Some(byte) if byte != terminator => *slot = byte,
                _ => break,
            }
            count += 1;
        }
        count
    }

    /// Collects bytes up to `terminator`, a timeout, or `L` bytes
    fn read_until<const L: usize>(&mut self, terminator: u8) -> Vec<u8, L> {
        let mut bytes = Vec::new();
        while !bytes.is_full() {
            match self.timed_read() {
                Some(byte) if byte != terminator => {
                    let _ = bytes.push(byte);
                }
                _ => break,
            }
        }
        bytes
    }

    /// Consumes the stream up to and including `target`
    ///
    /// Returns false on timeout.
    fn find(&mut self, target: &[u8]) -> bool {
        self.find_multi(&mut [MultiTarget::new(target)]) == Some(0)
    }

    fn find_byte(&mut self, byte: u8) -> bool {
        self.find(&[byte])
    }

    /// Consumes the stream up to `target` or `terminator`, whichever completes first
    ///
    /// Returns true only if `target` was found.
    fn find_until(&mut self, target: &[u8], terminator: &[u8]) -> bool {
        let mut targets = [MultiTarget::new(target), MultiTarget::new(terminator)];
        self.find_multi(&mut targets) == Some(0)
    }

    /// Searches for several patterns at once
    ///
    /// Returns the index of the first fully matched target or `None` on timeout.
    /// See [`MultiTarget`] for the matching rules.
    fn find_multi(&mut self, targets: &mut [MultiTarget<'_>]) -> Option<usize> {
        search::find_multi(self, targets)
    }

    /// Parses a decimal integer
    ///
    /// `lookahead` decides what may precede the number, `ignore` names a character allowed
    /// between digits (e.g. a thousands separator). Returns 0 if nothing numeric arrived
    /// in time.
    fn parse_int(&mut self, lookahead: LookaheadMode, ignore: Option<u8>) -> i32 {
        parse::parse_int(self, lookahead, ignore)
    }

    /// Parses a decimal number with an optional fractional part
    fn parse_float(&mut self, lookahead: LookaheadMode, ignore: Option<u8>) -> f32 {
        parse::parse_float(self, lookahead, ignore)
    }

    fn parse_int_default(&mut self) -> i32 {
        self.parse_int(LookaheadMode::default(), None)
    }

    fn parse_float_default(&mut self) -> f32 {
        self.parse_float(LookaheadMode::default(), None)
    }
}

fn poll_timed<S: Stream + ?Sized>(
    stream: &mut S,
    mut poll: impl FnMut(&mut S) -> Option<u8>,
) -> Option<u8> {
    let limit = duration_to_ms(stream.timeout());
    let start = stream.clock().now_ms();
    loop {
        if let Some(byte) = poll(stream) {
            return Some(byte);
        }
        if stream.clock().elapsed_ms(start) >= limit {
            return None;
        }
    }
}

/// Stream that reads back what was written into a single buffer
pub struct BufferStream<C, const N: usize, H = NoHooks> {
    buffer: FixedBuffer<N, H>,
    clock: C,
    timeout: Duration,
}

impl<C: Clock, const N: usize> BufferStream<C, N, NoHooks> {
    pub const fn new(clock: C, config: StreamConfig) -> Self {
        Self::with_hooks(clock, config, NoHooks)
    }
}

impl<C: Clock, const N: usize, H> BufferStream<C, N, H> {
    pub const fn with_hooks(clock: C, config: StreamConfig, hooks: H) -> Self {
        Self {
            buffer: FixedBuffer::with_hooks(hooks),
            clock,
            timeout: config.timeout,
        }
    }

    pub fn buffer(&self) -> &FixedBuffer<N, H> {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut FixedBuffer<N, H> {
        &mut self.buffer
    }
}

impl<C: Clock, const N: usize, H: BufferHooks> Stream for BufferStream<C, N, H> {
    type Clock = C;

    fn read(&mut self) -> Option<u8> {
        self.buffer.read()
    }

    fn peek(&mut self) -> Option<u8> {
        self.buffer.peek()
    }

    fn available(&self) -> usize {
        self.buffer.len()
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        self.buffer.write(bytes)
    }

    fn available_for_write(&self) -> usize {
        self.buffer.remaining_space()
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

impl<C: Clock, const N: usize, H: BufferHooks> core::fmt::Write for BufferStream<C, N, H> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        core::fmt::Write::write_str(&mut self.buffer, s)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::cell::Cell;

    /// Clock that moves forward by one millisecond whenever it is read
    #[derive(Default)]
    pub(crate) struct StepClock(Cell<u32>);

    impl Clock for StepClock {
        fn now_ms(&self) -> u32 {
            let now = self.0.get();
            self.0.set(now.wrapping_add(1));
            now
        }
    }

    pub(crate) fn make_stream(input: &[u8]) -> BufferStream<StepClock, 64> {
        let config = StreamConfig::new().with_timeout(Duration::from_millis(10));
        let mut stream = BufferStream::new(StepClock::default(), config);
        assert_eq!(stream.write(input), input.len());
        stream
    }

    #[test]
    fn test_timed_read_times_out() {
        let mut stream = make_stream(b"a");
        assert_eq!(stream.timed_read(), Some(b'a'));
        assert_eq!(stream.timed_read(), None);
        assert_eq!(stream.timed_peek(), None);
    }

    #[test]
    fn test_timed_read_survives_clock_wrap() {
        let mut stream = make_stream(b"");
        stream.clock.0.set(u32::MAX - 3);
        assert_eq!(stream.timed_read(), None);
        assert!(stream.clock.0.get() < 20);
    }

    #[test]
    fn test_read_bytes() {
        let mut stream = make_stream(b"abc");
        let mut out = [0u8; 5];
        assert_eq!(stream.read_bytes(&mut out), 3);
        assert_eq!(&out[..3], b"abc");
    }

    #[test]
    fn test_read_bytes_until() {
        let mut stream = make_stream(b"key\nvalue");
        let mut out = [0u8; 8];
        assert_eq!(stream.read_bytes_until(b'\n', &mut out), 3);
        assert_eq!(&out[..3], b"key");
        assert_eq!(stream.peek(), Some(b'v'));
    }

    #[test]
    fn test_read_until_capacity() {
        let mut stream = make_stream(b"abcdef\n");
        let line: Vec<u8, 4> = stream.read_until(b'\n');
        assert_eq!(line.as_slice(), b"abcd");
        let line: Vec<u8, 8> = stream.read_until(b'\n');
        assert_eq!(line.as_slice(), b"ef");
        assert_eq!(stream.available(), 0);
    }

    #[test]
    fn test_find_and_find_until() {
        let mut stream = make_stream(b"noise OK\r\nERROR\r\n");
        assert!(stream.find(b"OK"));
        assert_eq!(stream.peek(), Some(b'\r'));
        assert!(!stream.find_until(b"OK", b"ERROR"));
        assert_eq!(stream.read(), Some(b'\r'));
        assert!(!stream.find_byte(b'x'));
    }

    #[test]
    fn test_set_timeout() {
        let mut stream = make_stream(b"");
        stream.set_timeout(Duration::from_millis(0));
        assert_eq!(stream.timeout(), Duration::from_millis(0));
        assert_eq!(stream.timed_read(), None);
    }
}
