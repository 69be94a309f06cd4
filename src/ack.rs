// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! One-shot acknowledgment records.

use std::fmt;
use std::str::FromStr;

/// Outcome the receiver reports for one processed image. Written once as the
/// literal text `SUCCESS` or `FAILURE`, consumed exactly once by the agent,
/// then deleted — a mailbox entry, not a durable log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    Success,
    Failure,
}

impl AckOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AckOutcome::Success => "SUCCESS",
            AckOutcome::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for AckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AckOutcome {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SUCCESS" => Ok(AckOutcome::Success),
            "FAILURE" => Ok(AckOutcome::Failure),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_roundtrip() {
        assert_eq!("SUCCESS".parse(), Ok(AckOutcome::Success));
        assert_eq!("FAILURE\n".parse(), Ok(AckOutcome::Failure));
        assert_eq!(AckOutcome::Success.to_string(), "SUCCESS");
        assert!("ok".parse::<AckOutcome>().is_err());
    }
}
