use crate::error::{Error, Result};
use tracing::debug;

/// Lifecycle of one engine invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    AwaitingDecision,
    Installing,
    Resolved,
}

impl InteractionState {
    pub fn name(self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::AwaitingDecision => "awaiting_decision",
            InteractionState::Installing => "installing",
            InteractionState::Resolved => "resolved",
        }
    }

    fn can_move_to(self, next: InteractionState) -> bool {
        use InteractionState::*;
        matches!(
            (self, next),
            (Idle, AwaitingDecision)
                | (Idle, Resolved)
                | (AwaitingDecision, Installing)
                | (AwaitingDecision, Resolved)
                | (Installing, AwaitingDecision)
                | (Installing, Resolved)
        )
    }
}

/// State tracker for one prompt-response-action cycle.
///
/// `Idle -> Resolved` covers short-circuits (suppressed or headless). Dependency
/// prompts return from `Installing` to `AwaitingDecision` so several items can be
/// installed from one prompt.
#[derive(Debug)]
pub struct Interaction {
    kind: &'static str,
    state: InteractionState,
}

impl Interaction {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            state: InteractionState::Idle,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn advance(&mut self, next: InteractionState) -> Result<()> {
        if !self.state.can_move_to(next) {
            return Err(Error::InvalidTransition {
                from: self.state.name(),
                to: next.name(),
            });
        }
        debug!(
            "{} interaction: {} -> {}",
            self.kind,
            self.state.name(),
            next.name()
        );
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_install_path() {
        let mut i = Interaction::new("test");
        i.advance(InteractionState::AwaitingDecision).unwrap();
        i.advance(InteractionState::Installing).unwrap();
        i.advance(InteractionState::AwaitingDecision).unwrap();
        i.advance(InteractionState::Installing).unwrap();
        i.advance(InteractionState::Resolved).unwrap();
        assert_eq!(i.state(), InteractionState::Resolved);
    }

    #[test]
    fn test_short_circuit() {
        let mut i = Interaction::new("test");
        i.advance(InteractionState::Resolved).unwrap();
    }

    #[test]
    fn test_illegal_transitions() {
        let mut i = Interaction::new("test");
        assert!(matches!(
            i.advance(InteractionState::Installing),
            Err(Error::InvalidTransition { from: "idle", to: "installing" })
        ));
        i.advance(InteractionState::Resolved).unwrap();
        assert!(i.advance(InteractionState::AwaitingDecision).is_err());
        assert_eq!(i.state(), InteractionState::Resolved);
    }
}
