//! Per-rate stream lifecycle state machine
//!
//! ```text
//! Idle → Opened → Started → Stopped → Closed → Idle (next rate)
//!                                            ↘ Done (after last rate)
//! any non-terminal state → Failed(code)
//! ```

use crate::error::{Error, ErrorCode, Result};

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Opened,
    Started,
    Stopped,
    Closed,
    Done,
    Failed(ErrorCode),
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Done | SessionState::Failed(_))
    }

    /// Whether `self → next` is a legal lifecycle step
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;

        match (self, next) {
            (Idle, Opened)
            | (Opened, Started)
            | (Started, Stopped)
            | (Stopped, Closed)
            | (Closed, Idle)
            | (Closed, Done) => true,
            (from, Failed(_)) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Move to `next`, rejecting illegal steps
    pub fn transition(&mut self, next: SessionState) -> Result<()> {
        if !self.can_transition_to(next) {
            return Err(Error::InvalidState(format!(
                "cannot move from {} to {}",
                self, next
            )));
        }
        *self = next;
        Ok(())
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Opened => write!(f, "opened"),
            SessionState::Started => write!(f, "started"),
            SessionState::Stopped => write!(f, "stopped"),
            SessionState::Closed => write!(f, "closed"),
            SessionState::Done => write!(f, "done"),
            SessionState::Failed(code) => write!(f, "failed({})", code.as_u8()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionState::*;

    #[test]
    fn test_full_iteration_path() {
        let mut state = Idle;
        for next in [Opened, Started, Stopped, Closed, Idle, Opened, Started, Stopped, Closed, Done] {
            state.transition(next).expect("legal step");
        }
        assert_eq!(state, Done);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_start_requires_open() {
        let mut state = Idle;
        assert!(matches!(state.transition(Started), Err(Error::InvalidState(_))));
        assert_eq!(state, Idle);
    }

    #[test]
    fn test_stop_requires_start() {
        let mut state = Opened;
        assert!(state.transition(Stopped).is_err());
    }

    #[test]
    fn test_close_requires_stop() {
        assert!(!Started.can_transition_to(Closed));
        assert!(!Opened.can_transition_to(Closed));
    }

    #[test]
    fn test_failure_from_any_live_state() {
        for from in [Idle, Opened, Started, Stopped, Closed] {
            assert!(from.can_transition_to(Failed(ErrorCode::StreamOpen)), "{from}");
        }
    }

    #[test]
    fn test_terminal_states_are_final() {
        for from in [Done, Failed(ErrorCode::StreamStop)] {
            assert!(!from.can_transition_to(Idle));
            assert!(!from.can_transition_to(Failed(ErrorCode::StreamClose)));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Failed(ErrorCode::StreamStart).to_string(), "failed(21)");
        assert_eq!(Opened.to_string(), "opened");
    }
}
