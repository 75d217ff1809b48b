//! Logical conversations multiplexed over a physical channel
//!
//! A [`Session`] pairs a [`DuplexChannel`] with a [`SessionHandler`]. Sessions live in the fixed
//! slots of a [`SessionManager`](crate::manager::SessionManager) and cycle through
//! `Free -> Allocated(id) -> Active -> Ended -> Free`:
//!
//! * The manager assigns an id and clears both buffers on allocation.
//! * The application calls `setup` once, then the manager drives `run` on every tick.
//! * On removal the handler's `end` runs first, then the manager releases the slot.
//!
//! After each `run` with bytes left to transmit, the session calls
//! [`SessionOwner::data_ready_tx`] so the owner of the physical channel can start transmission.

use crate::buffer::{BufferHooks, FixedBuffer, NoHooks};
use crate::channel::{Duplex, DuplexChannel};
use crate::config::StreamConfig;
use crate::core::SessionId;
use crate::stream::Stream;
use crate::time::{Clock, Duration};

mod handler;

pub use handler::{Echo, Passive, SessionHandler};

/// Receiver of transmit notifications, usually the driver of the physical channel
pub trait SessionOwner<S: ?Sized> {
    /// `session` has bytes waiting in its transmit buffer
    ///
    /// Called synchronously from the session's `run`.
    fn data_ready_tx(&mut self, session: &mut S);
}

impl<S: ?Sized, F: FnMut(&mut S)> SessionOwner<S> for F {
    fn data_ready_tx(&mut self, session: &mut S) {
        self(session)
    }
}

pub(crate) trait SealedSession {
    fn start(&mut self, id: SessionId);
    fn kill(&mut self);
}

/// Pool slot interface used by the session manager
#[allow(private_bounds)]
pub trait ManagedSession: SealedSession {
    /// Assigned id, `None` while the slot is free
    fn id(&self) -> Option<SessionId>;

    fn is_in_use(&self) -> bool {
        self.id().is_some()
    }

    fn setup(&mut self);

    fn run<O: SessionOwner<Self>>(&mut self, owner: &mut O)
    where
        Self: Sized;

    fn end(&mut self);
}

/// A handler bound to a duplex channel
///
/// `HR` and `HT` receive the events of the receive and transmit buffers, so a session can
/// react to transmit writes without polling.
pub struct Session<H, C, const RX: usize, const TX: usize, HR = NoHooks, HT = NoHooks> {
    id: Option<SessionId>,
    channel: DuplexChannel<C, RX, TX, HR, HT>,
    handler: H,
}

impl<H: SessionHandler, C: Clock, const RX: usize, const TX: usize> Session<H, C, RX, TX> {
    /// Creates a free session
    pub const fn new(handler: H, clock: C, config: StreamConfig) -> Self {
        Self::with_hooks(handler, clock, config, NoHooks, NoHooks)
    }
}

impl<H, C, const RX: usize, const TX: usize, HR, HT> Session<H, C, RX, TX, HR, HT>
where
    H: SessionHandler,
    C: Clock,
    HR: BufferHooks,
    HT: BufferHooks,
{
    /// Creates a free session whose buffers report to `rx_hooks` and `tx_hooks`
    pub const fn with_hooks(
        handler: H,
        clock: C,
        config: StreamConfig,
        rx_hooks: HR,
        tx_hooks: HT,
    ) -> Self {
        Self {
            id: None,
            channel: DuplexChannel::with_hooks(clock, config, rx_hooks, tx_hooks),
            handler,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn channel(&self) -> &DuplexChannel<C, RX, TX, HR, HT> {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut DuplexChannel<C, RX, TX, HR, HT> {
        &mut self.channel
    }

    /// Reports a fault of the physical channel to the handler
    pub fn error(&mut self) {
        debug!("session error");
        self.handler.error(&mut self.channel);
    }

    pub fn write_region(&mut self) -> &mut [u8] {
        self.channel.write_region()
    }

    pub fn commit_written(&mut self, count: usize) -> usize {
        self.channel.commit_written(count)
    }

    pub fn rx(&self) -> &FixedBuffer<RX, HR> {
        self.channel.rx()
    }

    pub fn tx(&self) -> &FixedBuffer<TX, HT> {
        self.channel.tx()
    }
}

impl<H, C, const RX: usize, const TX: usize, HR, HT> SealedSession
    for Session<H, C, RX, TX, HR, HT>
where
    H: SessionHandler,
    C: Clock,
    HR: BufferHooks,
    HT: BufferHooks,
{
    fn start(&mut self, id: SessionId) {
        self.channel.clear();
        self.id = Some(id);
    }

    fn kill(&mut self) {
        self.channel.clear();
        self.id = None;
    }
}

impl<H, C, const RX: usize, const TX: usize, HR, HT> ManagedSession
    for Session<H, C, RX, TX, HR, HT>
where
    H: SessionHandler,
    C: Clock,
    HR: BufferHooks,
    HT: BufferHooks,
{
    fn id(&self) -> Option<SessionId> {
        self.id
    }

    fn setup(&mut self) {
        self.handler.setup(&mut self.channel);
    }

    fn run<O: SessionOwner<Self>>(&mut self, owner: &mut O) {
        self.handler.run(&mut self.channel);
        if self.channel.tx_pending() > 0 {
            owner.data_ready_tx(self);
        }
    }

    fn end(&mut self) {
        self.handler.end(&mut self.channel);
    }
}

impl<H, C, const RX: usize, const TX: usize, HR, HT> Stream
    for Session<H, C, RX, TX, HR, HT>
where
    H: SessionHandler,
    C: Clock,
    HR: BufferHooks,
    HT: BufferHooks,
{
    type Clock = C;

    fn read(&mut self) -> Option<u8> {
        self.channel.read()
    }

    fn peek(&mut self) -> Option<u8> {
        self.channel.peek()
    }

    fn available(&self) -> usize {
        self.channel.available()
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        self.channel.write(bytes)
    }

    fn available_for_write(&self) -> usize {
        self.channel.available_for_write()
    }

    fn flush(&mut self) {
        self.channel.flush()
    }

    fn clock(&self) -> &C {
        self.channel.clock()
    }

    fn timeout(&self) -> Duration {
        self.channel.timeout()
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.channel.set_timeout(timeout)
    }
}

impl<H, C, const RX: usize, const TX: usize, HR, HT> core::fmt::Write
    for Session<H, C, RX, TX, HR, HT>
where
    H: SessionHandler,
    C: Clock,
    HR: BufferHooks,
    HT: BufferHooks,
{
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        core::fmt::Write::write_str(&mut self.channel, s)
    }
}
