use serde::{Deserialize, Serialize};

/// Provisioning state machine.
///
/// `Start -> ForwardPathResolved -> ReversePathResolved -> SegmentsCompiled -> Published -> Persisted`,
/// with `Failed` reachable from every non-terminal state.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::AsRefStr, strum::EnumIter)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvisionState {
    Start,
    ForwardPathResolved,
    ReversePathResolved,
    SegmentsCompiled,
    Published,
    Persisted,
    Failed,
}

impl ProvisionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProvisionState::Persisted | ProvisionState::Failed)
    }

    /// The state that follows on success, `None` for terminal states.
    pub fn next(&self) -> Option<ProvisionState> {
        match self {
            ProvisionState::Start => Some(ProvisionState::ForwardPathResolved),
            ProvisionState::ForwardPathResolved => Some(ProvisionState::ReversePathResolved),
            ProvisionState::ReversePathResolved => Some(ProvisionState::SegmentsCompiled),
            ProvisionState::SegmentsCompiled => Some(ProvisionState::Published),
            ProvisionState::Published => Some(ProvisionState::Persisted),
            ProvisionState::Persisted | ProvisionState::Failed => None,
        }
    }

    pub fn can_transition_to(
        &self,
        to: ProvisionState,
    ) -> bool {
        !self.is_terminal() && (to == ProvisionState::Failed || self.next() == Some(to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_happy_path_reaches_persisted() {
        let mut state = ProvisionState::Start;
        let mut visited = vec![state];
        while let Some(next) = state.next() {
            assert!(state.can_transition_to(next));
            state = next;
            visited.push(state);
        }
        assert_eq!(state, ProvisionState::Persisted);
        assert_eq!(visited.len(), 6);
    }

    #[test]
    fn test_terminal_states() {
        for state in ProvisionState::iter() {
            assert_eq!(state.is_terminal(), state.next().is_none());
            assert_eq!(state.can_transition_to(ProvisionState::Failed), !state.is_terminal());
        }
        assert!(!ProvisionState::Start.can_transition_to(ProvisionState::Published));
        assert_eq!(ProvisionState::ForwardPathResolved.as_ref(), "FORWARD_PATH_RESOLVED");
    }
}
