//! Connection session lifecycle.

use crate::domain::foundation::StateMachine;

/// Lifecycle of one client connection.
///
/// ```text
/// Connecting → Authenticated → Active → Closing → Closed
///      └──────────────┴───────────────────┘ (rejection / early failure)
/// ```
///
/// `Closed` is terminal and reachable only through `Closing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Connecting,
    Authenticated,
    Active,
    Closing,
    Closed,
}

impl StateMachine for SessionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionState::*;
        matches!(
            (self, target),
            (Connecting, Authenticated)
                | (Connecting, Closing)
                | (Authenticated, Active)
                | (Authenticated, Closing)
                | (Active, Closing)
                | (Closing, Closed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionState::*;
        match self {
            Connecting => vec![Authenticated, Closing],
            Authenticated => vec![Active, Closing],
            Active => vec![Closing],
            Closing => vec![Closed],
            Closed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SessionState; 5] = [
        SessionState::Connecting,
        SessionState::Authenticated,
        SessionState::Active,
        SessionState::Closing,
        SessionState::Closed,
    ];

    #[test]
    fn happy_path_is_valid() {
        let state = SessionState::Connecting
            .transition_to(SessionState::Authenticated)
            .and_then(|s| s.transition_to(SessionState::Active))
            .and_then(|s| s.transition_to(SessionState::Closing))
            .and_then(|s| s.transition_to(SessionState::Closed));
        assert_eq!(state, Ok(SessionState::Closed));
    }

    #[test]
    fn closed_is_only_reachable_from_closing() {
        for state in ALL {
            let allowed = state.can_transition_to(&SessionState::Closed);
            assert_eq!(allowed, state == SessionState::Closing, "{:?}", state);
        }
    }

    #[test]
    fn closed_is_terminal() {
        assert!(SessionState::Closed.is_terminal());
        for state in ALL.iter().filter(|s| **s != SessionState::Closed) {
            assert!(!state.is_terminal());
        }
    }

    #[test]
    fn active_cannot_go_back_to_connecting() {
        assert!(SessionState::Active
            .transition_to(SessionState::Connecting)
            .is_err());
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(&to),
                    from.valid_transitions().contains(&to),
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }
}
