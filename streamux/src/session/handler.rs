use crate::channel::Duplex;

/// Application logic of a session
///
/// Every callback receives the session's channel. `run` is called once per
/// [`SessionManager::tick`](crate::manager::SessionManager::tick) and must not block beyond
/// the stream timeout. It moves bytes between the receive and transmit buffers; the session
/// notifies its owner afterwards if anything is left to transmit.
pub trait SessionHandler {
    /// Called once after allocation, before the first `run`
    fn setup<D: Duplex>(&mut self, _io: &mut D) {}

    fn run<D: Duplex>(&mut self, io: &mut D);

    /// Session-defined teardown, called before the slot is released
    fn end<D: Duplex>(&mut self, io: &mut D) {
        io.clear();
    }

    /// Called when the physical channel reports a fault
    fn error<D: Duplex>(&mut self, _io: &mut D) {}
}

/// Sends every received byte back
///
/// Bytes that do not fit into the transmit buffer wait in the receive buffer for the next run.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Echo;

impl SessionHandler for Echo {
    fn run<D: Duplex>(&mut self, io: &mut D) {
        io.forward_rx_to_tx();
    }
}

/// Does nothing on its own; the application reads and writes the session as a stream
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Passive;

impl SessionHandler for Passive {
    fn run<D: Duplex>(&mut self, _io: &mut D) {}
}
