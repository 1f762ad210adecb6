//! Connection phases of one request execution

use std::fmt;

/// Where a request is in its lifecycle.
///
/// Phases only move forward. `Succeeded` and `Failed` are alternative
/// outcomes of the status check; `Closed` is reachable from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Connecting,
    HeadersAttached,
    BodyWritten,
    StatusReceived,
    Succeeded,
    Failed,
    Closed,
}

impl Phase {
    fn rank(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Connecting => 1,
            Self::HeadersAttached => 2,
            Self::BodyWritten => 3,
            Self::StatusReceived => 4,
            Self::Succeeded | Self::Failed => 5,
            Self::Closed => 6,
        }
    }

    /// Move to `next`, rejecting backward or repeated transitions.
    pub fn advance(&mut self, next: Phase) -> Result<(), PhaseError> {
        if next.rank() <= self.rank() {
            return Err(PhaseError {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::HeadersAttached => "headers-attached",
            Self::BodyWritten => "body-written",
            Self::StatusReceived => "status-received",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid request phase transition from {from} to {to}")]
pub struct PhaseError {
    pub from: Phase,
    pub to: Phase,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_moves_are_allowed_and_body_is_optional() {
        let mut phase = Phase::Idle;
        phase.advance(Phase::Connecting).unwrap();
        phase.advance(Phase::HeadersAttached).unwrap();
        phase.advance(Phase::StatusReceived).unwrap();
        phase.advance(Phase::Failed).unwrap();
        phase.advance(Phase::Closed).unwrap();
        assert_eq!(phase, Phase::Closed);
    }

    #[test]
    fn repeats_and_backward_moves_are_rejected() {
        let mut phase = Phase::HeadersAttached;
        assert!(phase.advance(Phase::HeadersAttached).is_err());
        assert!(phase.advance(Phase::Connecting).is_err());

        let mut phase = Phase::Succeeded;
        let err = phase.advance(Phase::Failed).unwrap_err();
        assert_eq!(err.from, Phase::Succeeded);
        assert_eq!(phase, Phase::Succeeded);
    }

    #[test]
    fn closed_is_final() {
        let mut phase = Phase::Closed;
        assert!(phase.advance(Phase::Closed).is_err());
        assert!(phase.advance(Phase::Connecting).is_err());
    }
}
