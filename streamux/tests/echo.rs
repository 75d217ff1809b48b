use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, MockDriver};
use static_cell::StaticCell;
use streamux::config::StreamConfig;
use streamux::core::SessionId;
use streamux::link::Link;
use streamux::manager::{AllocError, SessionManager};
use streamux::session::{Echo, ManagedSession, Session};
use streamux::time::{Clock, EmbassyClock};

const SESSION_ID: SessionId = SessionId::new(1).unwrap();
const MAX_SESSIONS: usize = 2;

/// Embassy clock that moves mock time forward on every reading
#[derive(Debug, Default, Clone, Copy)]
struct MockClock;

impl Clock for MockClock {
    fn now_ms(&self) -> u32 {
        let now = EmbassyClock.now_ms();
        MockDriver::get().advance(Duration::from_millis(1));
        now
    }
}

type EchoSession = Session<Echo, MockClock, 16, 8>;

fn make_manager() -> SessionManager<EchoSession, MAX_SESSIONS> {
    SessionManager::new(|_| Session::new(Echo, MockClock, StreamConfig::new()))
}

#[test]
fn test_echo_over_link() {
    static LINK: StaticCell<Link<CriticalSectionRawMutex, 32, 32>> = StaticCell::new();
    let (mut rx_line, mut tx_line, mut port) = LINK.init(Link::new()).split();

    let mut manager = make_manager();
    manager.get_new_session(SESSION_ID).unwrap();
    manager.setup();

    // Interrupt side
    assert!(rx_line.push(b"hello, "));
    assert!(rx_line.push(b"world"));

    let mut notifications = 0;
    let mut echoed = Vec::new();
    for _ in 0..4 {
        if let Some(session) = manager.get_session_by_id(SESSION_ID) {
            port.pump_rx(session.channel_mut());
        }
        manager.tick(&mut |session: &mut EchoSession| {
            notifications += 1;
            port.pump_tx(session.channel_mut());
        });
        while let Some(byte) = tx_line.pop() {
            echoed.push(byte);
        }
    }

    assert_eq!(echoed, b"hello, world");
    // 12 bytes through an 8 byte transmit buffer take two runs
    assert_eq!(notifications, 2);
    assert!(tx_line.is_idle());
    assert_eq!(rx_line.overruns(), 0);
}

#[test]
fn test_pool_lifecycle() {
    let mut manager = make_manager();
    let ids = [SessionId::new(10).unwrap(), SessionId::new(11).unwrap()];

    for id in ids {
        let session = manager.get_new_session(id).unwrap();
        assert_eq!(session.id(), Some(id));
    }
    assert_eq!(
        manager.get_new_session(SessionId::new(12).unwrap()).err(),
        Some(AllocError::PoolExhausted)
    );
    assert_eq!(
        manager.get_new_session(ids[0]).err(),
        Some(AllocError::DuplicateId)
    );

    assert!(manager.remove_session(ids[0]));
    assert!(!manager.remove_session(ids[0]));
    assert_eq!(manager.free_sessions(), 1);

    let session = manager.get_new_session(ids[0]).unwrap();
    assert_eq!(session.rx().len(), 0);
    assert_eq!(manager.sessions_in_use(), MAX_SESSIONS);

    let mut slot = manager.first_session();
    let mut visited = 0;
    while let Some(index) = slot {
        assert!(manager.session(index).is_some());
        visited += 1;
        slot = manager.next_session(index);
    }
    assert_eq!(visited, MAX_SESSIONS);

    manager.end();
    assert_eq!(manager.free_sessions(), MAX_SESSIONS);
}

#[test]
fn test_tick_skips_free_slots() {
    let mut manager = make_manager();
    let id = SessionId::new(3).unwrap();
    manager
        .get_new_session(id)
        .unwrap()
        .channel_mut()
        .receive(b"x");

    let mut runs = Vec::new();
    manager.tick(&mut |session: &mut EchoSession| {
        runs.push(session.id());
        session.channel_mut().tx_mut().clear();
    });
    assert_eq!(runs, [Some(id)]);
}
