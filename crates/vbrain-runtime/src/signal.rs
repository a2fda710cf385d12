//! Signals exchanged between neurons

use crate::NeuronId;

/// Output of a firing neuron, consumed once by the receiver's next tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    source: NeuronId,
    strength: f64,
}

impl Signal {
    /// Create a new signal
    pub const fn new(source: NeuronId, strength: f64) -> Self {
        Self { source, strength }
    }

    /// Neuron that emitted the signal
    pub const fn source(&self) -> NeuronId {
        self.source
    }

    /// Signal strength
    pub const fn strength(&self) -> f64 {
        self.strength
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_accessors() {
        let signal = Signal::new(NeuronId::new(3), 0.5);
        assert_eq!(signal.source(), NeuronId::new(3));
        assert_eq!(signal.strength(), 0.5);
    }
}
