use core::fmt::Write;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::{Duration, MockDriver};
use streamux::config::StreamConfig;
use streamux::core::{LookaheadMode, SessionId};
use streamux::link::Link;
use streamux::manager::SessionManager;
use streamux::session::{Passive, Session};
use streamux::stream::{MultiTarget, Stream};
use streamux::time::{Clock, EmbassyClock};

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

type ShellSession = Session<Passive, MockClock, 64, 64>;

const TIMEOUT: Duration = Duration::from_millis(20);

fn make_session() -> ShellSession {
    Session::new(Passive, MockClock, StreamConfig::new().with_timeout(TIMEOUT))
}

/// Answers `SET <int>`, `GAIN <float>` and `PING`
fn serve(session: &mut ShellSession) -> bool {
    let mut commands = [
        MultiTarget::new(b"SET "),
        MultiTarget::new(b"GAIN "),
        MultiTarget::new(b"PING\r\n"),
    ];
    match session.find_multi(&mut commands) {
        Some(0) => {
            let value = session.parse_int(LookaheadMode::SkipWhitespace, Some(b'_'));
            write!(session, "OK {}\r\n", value).is_ok()
        }
        Some(1) => {
            let gain = session.parse_float(LookaheadMode::SkipWhitespace, None);
            write!(session, "OK {:.2}\r\n", gain).is_ok()
        }
        Some(_) => session.write(b"PONG\r\n") == 6,
        None => false,
    }
}

#[test]
fn test_command_session() {
    let mut link = Link::<NoopRawMutex, 128, 128>::new();
    let (mut rx_line, mut tx_line, mut port) = link.split();

    let mut manager: SessionManager<ShellSession, 1> = SessionManager::new(|_| make_session());
    let id = SessionId::new(0).unwrap();
    manager.get_new_session(id).unwrap();

    assert!(rx_line.push(b"noise SET 1_000\r\nGAIN -0.25\r\nPING\r\n"));
    let session = manager.get_session_by_id(id).unwrap();
    port.pump(session.channel_mut());

    assert!(serve(session));
    assert!(serve(session));
    assert!(serve(session));
    assert!(!serve(session));
    port.pump(session.channel_mut());

    let mut reply = [0u8; 64];
    let count = tx_line.pop_slice(&mut reply);
    assert_eq!(&reply[..count], b"OK 1000\r\nOK -0.25\r\nPONG\r\n");
}

#[test]
fn test_timeouts_return_sentinels() {
    let mut session = make_session();
    assert_eq!(session.timed_read(), None);
    assert_eq!(session.parse_int_default(), 0);
    assert_eq!(session.parse_float_default(), 0.0);
    assert!(!session.find(b"anything"));

    session.channel_mut().receive(b"12");
    let line = session.read_until::<8>(b'\n');
    assert_eq!(line.as_slice(), b"12");
}

#[test]
fn test_skip_none_leaves_input() {
    let mut session = make_session();
    session.channel_mut().receive(b"  -42abc");
    assert_eq!(session.parse_int(LookaheadMode::SkipNone, None), 0);
    assert_eq!(session.available(), 8);
    assert_eq!(session.parse_int_default(), -42);

    let mut rest = [0u8; 3];
    assert_eq!(session.read_bytes(&mut rest), 3);
    assert_eq!(&rest, b"abc");
}
