//! Three-state firing cycle owned by every neuron

use core::fmt;

/// Lifecycle state of a neuron
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FsmState {
    /// Initial state, fires at the baseline threshold
    #[default]
    Resting,
    /// Just fired, cannot fire again
    Depolarized,
    /// Recovering, fires only against a raised threshold
    Refractory,
}

impl fmt::Display for FsmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FsmState::Resting => "RESTING",
            FsmState::Depolarized => "DEPOLARIZED",
            FsmState::Refractory => "REFRACTORY",
        };
        f.write_str(name)
    }
}

/// Cyclic state machine: RESTING -> DEPOLARIZED -> REFRACTORY -> RESTING.
///
/// `advance` is the only way to change state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeuronFsm {
    state: FsmState,
}

impl NeuronFsm {
    /// Create a state machine in the resting state
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the next state of the cycle
    pub fn advance(&mut self) {
        self.state = match self.state {
            FsmState::Resting => FsmState::Depolarized,
            FsmState::Depolarized => FsmState::Refractory,
            FsmState::Refractory => FsmState::Resting,
        };
    }

    /// Current state
    pub fn state(&self) -> FsmState {
        self.state
    }

    /// Whether the machine is resting
    pub fn is_resting(&self) -> bool {
        self.state == FsmState::Resting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_resting() {
        let fsm = NeuronFsm::new();
        assert_eq!(fsm.state(), FsmState::Resting);
        assert!(fsm.is_resting());
    }

    #[test]
    fn test_cycle() {
        let mut fsm = NeuronFsm::new();
        fsm.advance();
        assert_eq!(fsm.state(), FsmState::Depolarized);
        fsm.advance();
        assert_eq!(fsm.state(), FsmState::Refractory);
        fsm.advance();
        assert_eq!(fsm.state(), FsmState::Resting);
    }

    #[test]
    fn test_display() {
        assert_eq!(FsmState::Depolarized.to_string(), "DEPOLARIZED");
    }
}
