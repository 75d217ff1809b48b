use super::Stream;
use crate::core::LookaheadMode;

/// Skips per `lookahead` and returns the first byte that may start a number, unconsumed
fn peek_numeric_start<S: Stream + ?Sized>(
    stream: &mut S,
    lookahead: LookaheadMode,
    accept_decimal: bool,
) -> Option<u8> {
    loop {
        let Some(byte) = stream.timed_peek() else {
            trace!("parse timed out");
            return None;
        };
        if byte == b'-' || byte.is_ascii_digit() || (accept_decimal && byte == b'.') {
            return Some(byte);
        }
        if !lookahead.skips(byte) {
            return None;
        }
        stream.read();
    }
}

pub(super) fn parse_int<S: Stream + ?Sized>(
    stream: &mut S,
    lookahead: LookaheadMode,
    ignore: Option<u8>,
) -> i32 {
    let Some(mut byte) = peek_numeric_start(stream, lookahead, false) else {
        return 0;
    };

    let mut negative = false;
    let mut value: i32 = 0;
    loop {
        if Some(byte) == ignore {
            // separator
        } else if byte == b'-' {
            negative = true;
        } else if byte.is_ascii_digit() {
            value = value.wrapping_mul(10).wrapping_add(i32::from(byte - b'0'));
        }
        stream.read();

        match stream.timed_peek() {
            Some(next) if next.is_ascii_digit() || Some(next) == ignore => byte = next,
            _ => break,
        }
    }

    if negative { value.wrapping_neg() } else { value }
}

pub(super) fn parse_float<S: Stream + ?Sized>(
    stream: &mut S,
    lookahead: LookaheadMode,
    ignore: Option<u8>,
) -> f32 {
    let Some(mut byte) = peek_numeric_start(stream, lookahead, true) else {
        return 0.0;
    };

    let mut negative = false;
    let mut fractional = false;
    let mut value: i32 = 0;
    let mut scale: f32 = 1.0;
    loop {
        if Some(byte) == ignore {
            // separator
        } else if byte == b'-' {
            negative = true;
        } else if byte == b'.' {
            fractional = true;
        } else if byte.is_ascii_digit() {
            value = value.wrapping_mul(10).wrapping_add(i32::from(byte - b'0'));
            if fractional {
                scale *= 0.1;
            }
        }
        stream.read();

        match stream.timed_peek() {
            Some(next)
                if next.is_ascii_digit()
                    || (next == b'.' && !fractional)
                    || Some(next) == ignore =>
            {
                byte = next
            }
            _ => break,
        }
    }

    let value = if negative { value.wrapping_neg() } else { value };
    value as f32 * scale
}
