//! Streamux core data types
//!
//! This crate provides the leaf definitions shared by the Streamux crates: session identifiers,
//! numeric lookahead policies and the monotonic clock abstraction.
//! Streamux users should not depend on this crate directly. Use `streamux::core` reexport instead.
#![no_std]

pub mod time;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidValue;

/// Application-chosen identifier of a logical session
///
/// The full `u32` range is available except `u32::MAX`, which marks an unassigned pool slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionId(u32);

impl SessionId {
    const UNASSIGNED_VALUE: u32 = u32::MAX;
    pub const MAX: SessionId = SessionId(Self::UNASSIGNED_VALUE - 1);

    pub const fn new(value: u32) -> Option<Self> {
        if value != Self::UNASSIGNED_VALUE {
            Some(Self(value))
        } else {
            None
        }
    }

    pub const fn into_u32(self) -> u32 {
        self.0
    }
}

impl From<SessionId> for u32 {
    fn from(value: SessionId) -> Self {
        value.into_u32()
    }
}

impl TryFrom<u32> for SessionId {
    type Error = InvalidValue;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidValue)
    }
}

/// Skipping policy applied before the first valid character of a number
///
/// The rule holds until either a valid character is found or the stream times out.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LookaheadMode {
    /// Every invalid character is discarded.
    #[default]
    SkipAll,
    /// Nothing is skipped. The stream is not touched unless the first waiting character is valid.
    SkipNone,
    /// Only spaces, tabs, line feeds and carriage returns are discarded.
    SkipWhitespace,
}

impl LookaheadMode {
    /// Decides whether a non-numeric byte may be discarded
    pub const fn skips(self, byte: u8) -> bool {
        match self {
            LookaheadMode::SkipAll => true,
            LookaheadMode::SkipNone => false,
            LookaheadMode::SkipWhitespace => matches!(byte, b' ' | b'\t' | b'\r' | b'\n'),
        }
    }
}
