//! Designated inputs and outputs of a network

use crate::{config::BrainConfig, error::*, network::Network, NeuronId};

/// A network together with its fixed sensory inputs and motor outputs
#[derive(Debug)]
pub struct Topology {
    network: Network,
    inputs: Vec<NeuronId>,
    outputs: Vec<NeuronId>,
}

impl Topology {
    /// Build a topology by running `generator` once on a fresh network.
    ///
    /// The generator creates neurons and links and returns the input and
    /// output sets.
    pub fn new<F>(config: BrainConfig, generator: F) -> Result<Self>
    where
        F: FnOnce(&mut Network) -> Result<(Vec<NeuronId>, Vec<NeuronId>)>,
    {
        let mut network = Network::new(config)?;
        let (inputs, outputs) = generator(&mut network)?;
        Self::from_parts(network, inputs, outputs)
    }

    /// Wrap an existing network.
    ///
    /// Inputs must be sensory neurons and outputs motor neurons. Connectivity
    /// between them is not checked.
    pub fn from_parts(
        network: Network,
        inputs: Vec<NeuronId>,
        outputs: Vec<NeuronId>,
    ) -> Result<Self> {
        for id in &inputs {
            if !network.neuron(*id)?.is_sensory() {
                return Err(BrainError::network_topology(format!(
                    "input {} is not a sensory neuron",
                    id
                )));
            }
        }
        for id in &outputs {
            if !network.neuron(*id)?.is_motor() {
                return Err(BrainError::network_topology(format!(
                    "output {} is not a motor neuron",
                    id
                )));
            }
        }

        Ok(Self {
            network,
            inputs,
            outputs,
        })
    }

    /// Fire every input with `strength`
    pub fn inject(&mut self, strength: f64) {
        for id in &self.inputs {
            match self.network.stimulate(*id, strength) {
                Ok(fired) => log::trace!("stimulated {} (fired: {})", id, fired),
                Err(e) => log::warn!("stimulus for {} dropped: {}", id, e),
            }
        }
    }

    /// Input neurons
    pub fn inputs(&self) -> &[NeuronId] {
        &self.inputs
    }

    /// Output neurons
    pub fn outputs(&self) -> &[NeuronId] {
        &self.outputs
    }

    /// Underlying network
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Mutable underlying network
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }
}
