//! Virtual brain runtime
//!
//! A small neuron graph advanced in discrete ticks. Each neuron runs a
//! three-state cycle, adapts the weights of its input sources and is
//! transiently modulated by neurotransmitters. A breadth-first scheduler
//! walks the graph from its sensory inputs towards its motor outputs.
//!
//! ```
//! use vbrain_runtime::{BrainConfig, NeuronId, Topology, VirtualBrain};
//!
//! let topology = Topology::new(BrainConfig::default(), |network| {
//!     network.add_sensory(NeuronId::new(0))?;
//!     network.add_neuron(NeuronId::new(1))?;
//!     network.add_motor(NeuronId::new(2), || println!("moved"))?;
//!     network.connect(NeuronId::new(0), NeuronId::new(1))?;
//!     network.connect(NeuronId::new(1), NeuronId::new(2))?;
//!     Ok((vec![NeuronId::new(0)], vec![NeuronId::new(2)]))
//! })?;
//!
//! let mut brain = VirtualBrain::new(topology);
//! brain.inject(1.0);
//! let summary = brain.run_for(100);
//! assert_eq!(summary.triggered, 1);
//! # Ok::<(), vbrain_runtime::BrainError>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod brain;
pub mod config;
pub mod error;
pub mod fsm;
pub mod ids;
pub mod network;
pub mod neuron;
pub mod signal;
pub mod topology;
pub mod transmitter;

// Re-export essential types
pub use brain::{GlobalTransmitter, RunSummary, StimulusHandle, VirtualBrain};
pub use config::{Amplifiers, BrainConfig, SensoryConfig};
pub use error::{BrainError, Result};
pub use fsm::{FsmState, NeuronFsm};
pub use ids::{NeuronId, TransmitterId};
pub use network::{Network, NetworkBuilder};
pub use neuron::{Neuron, NeuronKind, TickOutcome, Trigger};
pub use signal::Signal;
pub use topology::Topology;
pub use transmitter::{
    Attachment, ModulationProfile, StandardFactory, Transmitter, TransmitterFactory,
    TransmitterKind, TransmitterSet,
};

/// Runtime crate version for compatibility checking
pub const RUNTIME_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_integration() {
        let config = BrainConfig::default();
        assert!(config.validate().is_ok());

        let network = NetworkBuilder::new()
            .with_config(config)
            .add_sensory(NeuronId::new(0))
            .add_motor(NeuronId::new(1), || {})
            .connect(NeuronId::new(0), NeuronId::new(1))
            .build()
            .unwrap();

        let topology =
            Topology::from_parts(network, vec![NeuronId::new(0)], vec![NeuronId::new(1)]).unwrap();
        let brain = VirtualBrain::new(topology);
        assert!(brain.active_transmitters().is_empty());
        assert_eq!(brain.topology().network().neuron_count(), 2);
    }
}
