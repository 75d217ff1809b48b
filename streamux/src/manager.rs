//! Fixed pool of sessions
//!
//! The pool is allocated once; sessions are never created or dropped afterwards, only bound to
//! and released from an id. A full pool is a normal operating condition: the caller decides
//! whether to retry later or reject the new conversation.
//!
//! The manager is meant to be owned by the main loop. Access from an interrupt context must be
//! serialized by the application.
//!
//! ```
//! use streamux::config::StreamConfig;
//! use streamux::core::SessionId;
//! use streamux::manager::SessionManager;
//! use streamux::session::{Echo, Session};
//! use streamux::time::EmbassyClock;
//!
//! type EchoSession = Session<Echo, EmbassyClock, 64, 64>;
//!
//! let mut manager: SessionManager<EchoSession, 2> =
//!     SessionManager::new(|_| Session::new(Echo, EmbassyClock, StreamConfig::new()));
//!
//! let id = SessionId::new(10).unwrap();
//! let session = manager.get_new_session(id).unwrap();
//! session.channel_mut().receive(b"ping");
//!
//! let mut echoed = 0;
//! manager.tick(&mut |session: &mut EchoSession| {
//!     echoed += session.channel_mut().transmit(&mut [0u8; 64]);
//! });
//! assert_eq!(echoed, 4);
//!
//! assert!(manager.remove_session(id));
//! assert_eq!(manager.free_sessions(), 2);
//! ```

use crate::core::SessionId;
use crate::session::{ManagedSession, SealedSession, SessionOwner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AllocError {
    /// An active session already holds the id
    DuplicateId,
    /// Every slot is in use
    PoolExhausted,
}

pub struct SessionManager<S, const N: usize> {
    slots: [S; N],
}

impl<S: ManagedSession, const N: usize> SessionManager<S, N> {
    /// Builds the pool, calling `make` once per slot index
    ///
    /// Slots returned by `make` should be free; in-use slots keep their id.
    pub fn new(make: impl FnMut(usize) -> S) -> Self {
        Self {
            slots: core::array::from_fn(make),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Binds a free slot to `id` and clears its buffers
    pub fn get_new_session(&mut self, id: SessionId) -> Result<&mut S, AllocError> {
        if self.slot_of(id).is_some() {
            warn!("session {} already active", id.into_u32());
            return Err(AllocError::DuplicateId);
        }
        let Some(slot) = self.slots.iter().position(|s| !s.is_in_use()) else {
            warn!("no free slot for session {}", id.into_u32());
            return Err(AllocError::PoolExhausted);
        };

        let session = &mut self.slots[slot];
        session.start(id);
        info!("session {} allocated in slot {}", id.into_u32(), slot);
        Ok(session)
    }

    /// Ends and releases the session bound to `id`
    ///
    /// Returns false if no active session has that id.
    pub fn remove_session(&mut self, id: SessionId) -> bool {
        match self.slot_of(id) {
            Some(slot) => self.remove_slot(slot),
            None => false,
        }
    }

    /// Ends and releases the session in `slot`; a free or missing slot is left alone
    pub fn remove_slot(&mut self, slot: usize) -> bool {
        let Some(session) = self.slots.get_mut(slot) else {
            return false;
        };
        let Some(id) = session.id() else {
            return false;
        };
        session.end();
        session.kill();
        debug!("session {} removed from slot {}", id.into_u32(), slot);
        true
    }

    pub fn remove_all(&mut self) {
        for slot in 0..N {
            self.remove_slot(slot);
        }
    }

    pub fn get_session_by_id(&mut self, id: SessionId) -> Option<&mut S> {
        let slot = self.slot_of(id)?;
        Some(&mut self.slots[slot])
    }

    /// Slot index of the first active session
    pub fn first_session(&self) -> Option<usize> {
        self.next_in_use(0)
    }

    /// Slot index of the next active session after `slot`
    ///
    /// Only stable while no session is removed between calls. A slot past the end yields `None`.
    pub fn next_session(&self, slot: usize) -> Option<usize> {
        self.next_in_use(slot.saturating_add(1))
    }

    /// Active session in `slot`
    pub fn session(&self, slot: usize) -> Option<&S> {
        self.slots.get(slot).filter(|s| s.is_in_use())
    }

    pub fn session_mut(&mut self, slot: usize) -> Option<&mut S> {
        self.slots.get_mut(slot).filter(|s| s.is_in_use())
    }

    /// Active sessions in slot order
    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.slots.iter().filter(|s| s.is_in_use())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut S> {
        self.slots.iter_mut().filter(|s| s.is_in_use())
    }

    pub fn free_sessions(&self) -> usize {
        N - self.sessions_in_use()
    }

    pub fn sessions_in_use(&self) -> usize {
        self.iter().count()
    }

    /// Runs `setup` of every active session
    pub fn setup(&mut self) {
        for session in self.iter_mut() {
            session.setup();
        }
    }

    /// Runs every active session once, in slot order
    pub fn tick<O: SessionOwner<S>>(&mut self, owner: &mut O) {
        for session in self.iter_mut() {
            session.run(owner);
        }
    }

    /// Ends every active session
    pub fn end(&mut self) {
        self.remove_all();
    }

    fn slot_of(&self, id: SessionId) -> Option<usize> {
        self.slots.iter().position(|s| s.id() == Some(id))
    }

    fn next_in_use(&self, from: usize) -> Option<usize> {
        (from..N).find(|&slot| self.slots[slot].is_in_use())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Duplex;
    use crate::config::StreamConfig;
    use crate::session::{Echo, Session, SessionHandler};
    use crate::stream::Stream;
    use crate::stream::tests::StepClock;
    use core::cell::Cell;

    type EchoSession = Session<Echo, StepClock, 8, 8>;

    fn make_manager<const N: usize>() -> SessionManager<EchoSession, N> {
        SessionManager::new(|_| Session::new(Echo, StepClock::default(), StreamConfig::new()))
    }

    fn id(value: u32) -> SessionId {
        SessionId::new(value).unwrap()
    }

    #[test]
    fn test_pool_exhaustion() {
        let mut manager = make_manager::<3>();
        for value in 0..3 {
            assert!(manager.get_new_session(id(value)).is_ok());
        }
        assert_eq!(
            manager.get_new_session(id(3)).err(),
            Some(AllocError::PoolExhausted)
        );
        assert_eq!(manager.sessions_in_use(), 3);
        assert_eq!(manager.free_sessions(), 0);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut manager = make_manager::<3>();
        assert!(manager.get_new_session(id(5)).is_ok());
        assert_eq!(
            manager.get_new_session(id(5)).err(),
            Some(AllocError::DuplicateId)
        );
        assert_eq!(manager.sessions_in_use(), 1);
    }

    #[test]
    fn test_realloc_after_remove() {
        let mut manager = make_manager::<1>();
        manager.get_new_session(id(9)).unwrap().write(b"stale");
        assert!(manager.remove_session(id(9)));
        assert!(!manager.remove_session(id(9)));
        assert!(!manager.remove_slot(0));

        let session = manager.get_new_session(id(9)).unwrap();
        assert_eq!(session.tx().len(), 0);
        assert_eq!(session.id(), Some(id(9)));
    }

    #[test]
    fn test_slot_iteration_skips_free() {
        let mut manager = make_manager::<4>();
        for value in 0..4 {
            manager.get_new_session(id(value)).unwrap();
        }
        manager.remove_session(id(0));
        manager.remove_session(id(2));

        assert_eq!(manager.first_session(), Some(1));
        assert_eq!(manager.next_session(1), Some(3));
        assert_eq!(manager.next_session(3), None);
        assert_eq!(manager.next_session(4), None);
        assert_eq!(manager.next_session(usize::MAX), None);
        assert!(manager.session(0).is_none());
        assert_eq!(manager.session(3).and_then(|s| s.id()), Some(id(3)));
        assert_eq!(manager.get_session_by_id(id(1)).and_then(|s| s.id()), Some(id(1)));
        assert!(manager.get_session_by_id(id(2)).is_none());

        // The lowest free slot is reused first
        manager.get_new_session(id(7)).unwrap();
        assert_eq!(manager.first_session(), Some(0));
    }

    #[test]
    fn test_tick_runs_active_sessions_once() {
        let mut manager = make_manager::<3>();
        for value in [10, 20] {
            let session = manager.get_new_session(id(value)).unwrap();
            session.channel_mut().receive(b"x");
        }
        manager.remove_session(id(10));
        manager.get_new_session(id(30)).unwrap().channel_mut().receive(b"y");

        let mut seen = heapless::Vec::<u32, 8>::new();
        let mut owner = |session: &mut EchoSession| {
            seen.push(session.id().unwrap().into_u32()).unwrap();
            session.channel_mut().tx_mut().clear();
        };
        manager.tick(&mut owner);
        assert_eq!(seen.as_slice(), &[30, 20]);
    }

    /// Counts callbacks and records the order of runs within the pool
    struct Counter<'a> {
        sequence: &'a Cell<u32>,
        setups: u32,
        runs: heapless::Vec<u32, 4>,
    }

    impl SessionHandler for Counter<'_> {
        fn setup<D: Duplex>(&mut self, _io: &mut D) {
            self.setups += 1;
        }

        fn run<D: Duplex>(&mut self, _io: &mut D) {
            let position = self.sequence.get();
            self.sequence.set(position + 1);
            self.runs.push(position).unwrap();
        }
    }

    type CounterSession<'a> = Session<Counter<'a>, StepClock, 8, 8>;

    #[test]
    fn test_tick_runs_each_active_session_exactly_once() {
        let sequence = Cell::new(0);
        let mut manager: SessionManager<CounterSession<'_>, 4> = SessionManager::new(|_| {
            let counter = Counter {
                sequence: &sequence,
                setups: 0,
                runs: heapless::Vec::new(),
            };
            Session::new(counter, StepClock::default(), StreamConfig::new())
        });
        for value in 0..3 {
            manager.get_new_session(id(value)).unwrap();
        }
        manager.remove_session(id(1));

        manager.setup();
        manager.tick(&mut |_: &mut CounterSession<'_>| {});
        manager.tick(&mut |_: &mut CounterSession<'_>| {});

        let counters = manager.slots.each_ref().map(|slot| slot.handler());
        assert_eq!(counters.map(|c| c.setups), [1, 0, 1, 0]);
        assert_eq!(counters[0].runs.as_slice(), &[0, 2]);
        assert!(counters[1].runs.is_empty());
        assert_eq!(counters[2].runs.as_slice(), &[1, 3]);
        assert!(counters[3].runs.is_empty());
        assert_eq!(sequence.get(), 4);
    }

    #[test]
    fn test_end_releases_everything() {
        let mut manager = make_manager::<2>();
        manager.get_new_session(id(1)).unwrap().channel_mut().receive(b"data");
        manager.get_new_session(id(2)).unwrap();
        manager.setup();
        manager.end();
        assert_eq!(manager.sessions_in_use(), 0);
        assert_eq!(manager.first_session(), None);
        assert_eq!(manager.capacity(), 2);
        assert_eq!(manager.iter_mut().count(), 0);
    }
}
