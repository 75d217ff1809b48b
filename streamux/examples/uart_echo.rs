//! Echo server on a simulated UART
//!
//! The "interrupt handler" feeds received bytes into the link and drains the transmit side;
//! the main loop pumps the link into a session and drives the session manager.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use static_cell::StaticCell;
use streamux::config::StreamConfig;
use streamux::core::SessionId;
use streamux::link::{Link, RxLine, TxLine};
use streamux::manager::SessionManager;
use streamux::session::{Echo, Session};
use streamux::time::EmbassyClock;

type UartLink = Link<CriticalSectionRawMutex, 64, 64>;
type EchoSession = Session<Echo, EmbassyClock, 32, 32>;

const UART_SESSION: SessionId = SessionId::new(0).unwrap();

static LINK: StaticCell<UartLink> = StaticCell::new();

struct Uart {
    rx: RxLine<'static, CriticalSectionRawMutex, 64>,
    tx: TxLine<'static, CriticalSectionRawMutex, 64>,
    wire: Vec<u8>,
}

impl Uart {
    /// Receive interrupt: one chunk from the peripheral FIFO
    fn on_rx(&mut self, chunk: &[u8]) {
        if !self.rx.push(chunk) {
            println!("uart: dropped {} bytes", chunk.len());
        }
    }

    /// Transmit interrupt: move everything pending onto the wire
    fn on_tx(&mut self) {
        let wire = &mut self.wire;
        self.tx.transmit_with(|bytes| {
            wire.extend_from_slice(bytes);
            bytes.len()
        });
    }
}

fn main() {
    let (rx, tx, mut port) = LINK.init(Link::new()).split();
    let mut uart = Uart {
        rx,
        tx,
        wire: Vec::new(),
    };

    let mut manager: SessionManager<EchoSession, 1> =
        SessionManager::new(|_| Session::new(Echo, EmbassyClock, StreamConfig::new()));
    if let Err(err) = manager.get_new_session(UART_SESSION) {
        println!("no session: {:?}", err);
        return;
    }
    manager.setup();

    let chunks: [&[u8]; 3] = [b"Hello", b", ", b"streams!\r\n"];
    for chunk in chunks {
        uart.on_rx(chunk);

        if let Some(session) = manager.get_session_by_id(UART_SESSION) {
            port.pump_rx(session.channel_mut());
        }
        let mut kick_tx = false;
        manager.tick(&mut |session: &mut EchoSession| {
            port.pump_tx(session.channel_mut());
            kick_tx = true;
        });
        if kick_tx {
            uart.on_tx();
        }
    }

    println!("wire: {:?}", String::from_utf8_lossy(&uart.wire));
    println!("overruns: {}", uart.rx.overruns());
    manager.end();
}
