//! # Streamux
//!
//! This library provides timeout-bounded byte streams and a static pool of logical sessions for
//! microcontroller serial links (UART, USB CDC, TCP sockets of an embedded stack). It uses
//! statically sized buffers only and never allocates.
//!
//! Stream operations never block an interrupt handler. The only operations that may spin are the
//! timed reads of the main loop, and they give up after a configurable timeout.
//!
//! ## Architecture
//!
//! ```text
//!  ┌────────┐   ┌────────┐   ┌──────────┐   ┌─────────────────────────────┐
//!  │        ├──►│ RxLine ├──►│          ├──►│ SessionManager              │
//!  │ Driver │   ├────────┤   │ LinkPort │   │  Session 1                  │
//!  │ (IRQ)  │◄──┤ TxLine │◄──┤   pump   │◄──┤   DuplexChannel + Handler   │
//!  └────────┘   └────────┘   └──────────┘   │  Session 2 ... Session N    │
//!                  Link                     └─────────────────────────────┘
//! ```
//! Components:
//! * _FixedBuffer_ is a non-wrapping byte buffer. Space is reclaimed only when it drains.
//! * _Stream_ is the byte-stream contract with timed reads, numeric parsing and pattern search
//!   layered on top of non-blocking `read`/`peek`/`write`.
//! * _DuplexChannel_ is a stream made of a receive and a transmit buffer.
//! * _Session_ binds a channel to an application handler and an id.
//! * _SessionManager_ owns a fixed pool of sessions, allocates them by id and drives them.
//! * _Link_ carries bytes between an interrupt-driven driver and the main loop.
//!
//! ## Concurrency model
//!
//! Application logic runs in a single cooperative main loop. Drivers run in interrupt handlers
//! and exchange bytes with the main loop through a [`link::Link`], whose buffers sit behind an
//! `embassy_sync` blocking mutex. There are two useful mutex options:
//! * _CriticalSectionRawMutex_ lets the driver run at any interrupt priority. Each access holds a
//!   critical section for as long as the copied bytes take.
//! * _NoopRawMutex_ fits drivers that are polled from the main loop itself.
//!
//! Channels, sessions and the manager are plain values owned by the main loop and need no
//! synchronization.
//!
//! ## Limitations
//!
//! * Reading does not free space until the buffer is fully drained. Size buffers for the longest
//!   burst between two drains.
//! * Timed reads busy-wait. They never yield to an executor.
#![no_std]

pub use streamux_core as core;

pub mod time {
    pub use streamux_core::time::*;
}

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod buffer;
pub mod channel;
pub mod config;
pub mod link;
pub mod manager;
pub mod session;
pub mod stream;
