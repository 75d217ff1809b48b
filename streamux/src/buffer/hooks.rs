/// Structural transition of a [`FixedBuffer`](super::FixedBuffer)
///
/// Events are delivered synchronously from the call that caused them.
/// For a buffer shared with an interrupt handler, that may be the interrupt context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferEvent {
    /// The first bytes arrived in an empty buffer. Precedes the matching `Write`.
    NonEmpty,
    /// Bytes were appended
    Write,
    /// Bytes were consumed. Follows `Empty` if the read drained the buffer.
    Read,
    /// The last byte was consumed and the buffer was reset
    Empty,
}

pub trait BufferHooks {
    fn on_event(&mut self, event: BufferEvent);
}

/// Hook set that ignores every event
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoHooks;

impl BufferHooks for NoHooks {
    #[inline(always)]
    fn on_event(&mut self, _event: BufferEvent) {}
}

/// Adapts a closure into a hook set
///
/// ```
/// use streamux::buffer::{BufferEvent, FixedBuffer, FnHooks};
///
/// let mut writes = 0;
/// let mut buffer = FixedBuffer::<4, _>::with_hooks(FnHooks(|event: BufferEvent| {
///     if event == BufferEvent::Write {
///         writes += 1;
///     }
/// }));
/// buffer.write(b"ab");
/// drop(buffer);
/// assert_eq!(writes, 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnHooks<F>(pub F);

impl<F: FnMut(BufferEvent)> BufferHooks for FnHooks<F> {
    fn on_event(&mut self, event: BufferEvent) {
        (self.0)(event)
    }
}
