use super::Stream;

/// A pattern and how much of it the stream has matched so far
///
/// The cursor survives across [`Stream::find_multi`] calls, so a search that timed out can be
/// resumed with the same targets. A target that completes starts over, so the next call looks
/// for the next occurrence after the one reported. On a mismatch the cursor falls back to the longest shorter
/// prefix that is still consistent with the bytes already seen, so overlapping occurrences are
/// not lost: `"1112"` is found in `"11112"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiTarget<'a> {
    target: &'a [u8],
    index: usize,
}

impl<'a> MultiTarget<'a> {
    pub const fn new(target: &'a [u8]) -> Self {
        Self { target, index: 0 }
    }

    pub const fn target(&self) -> &'a [u8] {
        self.target
    }

    /// Length of the prefix matched so far
    pub const fn matched(&self) -> usize {
        self.index
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Feeds one byte, returns true when the whole target has been matched
    ///
    /// Feeding a completed target keeps matching overlapping occurrences: `"aa"` completes on
    /// every `a` after the first.
    pub fn advance(&mut self, byte: u8) -> bool {
        let target = self.target;
        if target.get(self.index) == Some(&byte) {
            self.index += 1;
            return self.index == target.len();
        }

        let mismatched = self.index;
        while self.index > 0 {
            self.index -= 1;
            if byte != target[self.index] {
                continue;
            }
            if self.index == 0 {
                self.index = 1;
                break;
            }
            // The candidate prefix must equal the tail of what was matched before
            let shift = mismatched - self.index;
            if (0..self.index).all(|i| target[i] == target[i + shift]) {
                self.index += 1;
                break;
            }
        }
        self.index == target.len()
    }
}

pub(super) fn find_multi<S: Stream + ?Sized>(
    stream: &mut S,
    targets: &mut [MultiTarget<'_>],
) -> Option<usize> {
    if let Some(index) = targets.iter().position(|t| t.target.is_empty()) {
        return Some(index);
    }

    loop {
        let Some(byte) = stream.timed_read() else {
            trace!("find timed out");
            return None;
        };
        for (index, target) in targets.iter_mut().enumerate() {
            if target.advance(byte) {
                target.reset();
                return Some(index);
            }
        }
    }
}
