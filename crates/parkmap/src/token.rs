//! Monotonic tokens for matching asynchronous responses to the request that started them.

/// Identifies one in-flight request. Later tokens compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Default)]
pub struct TokenSequence {
    last: u64,
}

impl TokenSequence {
    pub fn issue(&mut self) -> RequestToken {
        self.last += 1;
        RequestToken(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_increase() {
        let mut sequence = TokenSequence::default();
        let first = sequence.issue();
        let second = sequence.issue();
        assert!(second > first);
        assert_ne!(first, second);
    }
}
