//! Neuron arena with directed connections
//!
//! Neurons live in a `Vec` and are addressed through an id index. A neuron
//! only records the ids of its downstream neurons, so cycles and fan-in need
//! no shared ownership.

use crate::{
    config::{check_threshold, BrainConfig},
    error::*,
    neuron::{Neuron, NeuronKind, TickOutcome, Trigger},
    signal::Signal,
    transmitter::{Attachment, Transmitter, TransmitterFactory, TransmitterKind},
    NeuronId, TransmitterId,
};
use std::collections::HashMap;

/// Directed graph of neurons sharing one configuration
#[derive(Debug)]
pub struct Network {
    config: BrainConfig,
    neurons: Vec<Neuron>,
    index: HashMap<NeuronId, usize>,
}

impl Network {
    /// Create a new empty network
    pub fn new(config: BrainConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            neurons: Vec::new(),
            index: HashMap::new(),
        })
    }

    /// Shared configuration
    pub fn config(&self) -> &BrainConfig {
        &self.config
    }

    /// Add a prepared neuron. Its threshold must be finite and positive.
    pub fn insert(&mut self, neuron: Neuron) -> Result<NeuronId> {
        check_threshold(neuron.threshold())?;
        let id = neuron.id();
        if self.index.contains_key(&id) {
            return Err(BrainError::invalid_config(format!(
                "Neuron {} already exists",
                id.raw()
            )));
        }
        self.index.insert(id, self.neurons.len());
        self.neurons.push(neuron);
        Ok(id)
    }

    /// Add a plain neuron with the default threshold
    pub fn add_neuron(&mut self, id: NeuronId) -> Result<()> {
        self.add_neuron_with_threshold(id, self.config.default_threshold)
    }

    /// Add a plain neuron with a specific threshold
    pub fn add_neuron_with_threshold(&mut self, id: NeuronId, threshold: f64) -> Result<()> {
        self.insert(Neuron::new(id, threshold)).map(|_| ())
    }

    /// Add a neuron accepting only the `allowed` transmitter kinds
    pub fn add_gated(
        &mut self,
        id: NeuronId,
        allowed: impl IntoIterator<Item = TransmitterKind>,
    ) -> Result<()> {
        let neuron = Neuron::gated(id, self.config.default_threshold, allowed);
        self.insert(neuron).map(|_| ())
    }

    /// Add a transmitter-producing neuron
    pub fn add_producing(
        &mut self,
        id: NeuronId,
        producible: impl IntoIterator<Item = TransmitterId>,
    ) -> Result<()> {
        let neuron = Neuron::producing(id, self.config.default_threshold, producible);
        self.insert(neuron).map(|_| ())
    }

    /// Add a sensory neuron with the configured initial stamina
    pub fn add_sensory(&mut self, id: NeuronId) -> Result<()> {
        let neuron = Neuron::sensory(
            id,
            self.config.default_threshold,
            self.config.sensory.initial_stamina,
        );
        self.insert(neuron).map(|_| ())
    }

    /// Add a motor neuron running `trigger` on fire
    pub fn add_motor(&mut self, id: NeuronId, trigger: impl Trigger + 'static) -> Result<()> {
        let neuron = Neuron::motor(id, self.config.default_threshold, trigger);
        self.insert(neuron).map(|_| ())
    }

    /// Link `from` to `to`. Repeated links deliver repeated signals.
    pub fn connect(&mut self, from: NeuronId, to: NeuronId) -> Result<()> {
        self.require(to)?;
        let slot = self.require(from)?;
        self.neurons[slot].add_connection(to);
        Ok(())
    }

    fn require(&self, id: NeuronId) -> Result<usize> {
        self.index
            .get(&id)
            .copied()
            .ok_or(BrainError::NeuronNotFound {
                neuron_id: id.raw(),
            })
    }

    pub(crate) fn slot(&self, id: NeuronId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub(crate) fn neuron_at_mut(&mut self, slot: usize) -> &mut Neuron {
        &mut self.neurons[slot]
    }

    /// Neuron by id
    pub fn neuron(&self, id: NeuronId) -> Result<&Neuron> {
        let slot = self.require(id)?;
        Ok(&self.neurons[slot])
    }

    /// Mutable neuron by id
    pub fn neuron_mut(&mut self, id: NeuronId) -> Result<&mut Neuron> {
        let slot = self.require(id)?;
        Ok(&mut self.neurons[slot])
    }

    /// Whether `id` is part of the network
    pub fn contains(&self, id: NeuronId) -> bool {
        self.index.contains_key(&id)
    }

    /// Get neuron count
    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    /// Get connection count
    pub fn connection_count(&self) -> usize {
        self.neurons.iter().map(|n| n.connections().len()).sum()
    }

    /// All neuron ids in insertion order
    pub fn neuron_ids(&self) -> Vec<NeuronId> {
        self.neurons.iter().map(Neuron::id).collect()
    }

    /// Iterate neurons in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Neuron> {
        self.neurons.iter()
    }

    /// Buffer `signal` on `to`
    pub fn deliver(&mut self, to: NeuronId, signal: Signal) -> Result<()> {
        self.neuron_mut(to)?.receive(signal);
        Ok(())
    }

    fn propagate(&mut self, slot: usize, signal: Signal) {
        for k in 0..self.neurons[slot].connections().len() {
            let target = self.neurons[slot].connections()[k];
            if let Some(target_slot) = self.slot(target) {
                log::trace!("{} -> {}", signal.source(), target);
                self.neurons[target_slot].receive(signal);
            }
        }
    }

    pub(crate) fn tick_slot(&mut self, slot: usize) -> TickOutcome {
        let outcome = self.neurons[slot].tick(&self.config);
        if let Some(signal) = outcome.signal {
            self.propagate(slot, signal);
        }
        outcome
    }

    /// Tick one neuron and hand its signal to every connection
    pub fn tick(&mut self, id: NeuronId) -> Result<TickOutcome> {
        let slot = self.require(id)?;
        Ok(self.tick_slot(slot))
    }

    /// Tick every neuron once in insertion order, returning the ids that fired
    pub fn step(&mut self) -> Vec<NeuronId> {
        let mut fired = Vec::new();
        for slot in 0..self.neurons.len() {
            if self.tick_slot(slot).fired {
                fired.push(self.neurons[slot].id());
            }
        }
        fired
    }

    /// Fire a sensory neuron and propagate on success
    pub fn stimulate(&mut self, id: NeuronId, strength: f64) -> Result<bool> {
        let slot = self.require(id)?;
        match self.neurons[slot].fire(strength, &self.config)? {
            Some(signal) => {
                self.propagate(slot, signal);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Attach a transmitter to a neuron
    pub fn attach_transmitter(
        &mut self,
        id: NeuronId,
        transmitter: Transmitter,
    ) -> Result<Attachment> {
        Ok(self.neuron_mut(id)?.attach_transmitter(transmitter))
    }

    /// Let a producing neuron emit through `factory`
    pub fn emit<F>(&mut self, id: NeuronId, factory: &F) -> Result<usize>
    where
        F: TransmitterFactory + ?Sized,
    {
        self.neuron_mut(id)?.emit(factory)
    }

    /// Weight `post` holds for signals from `pre`
    pub fn weight(&self, pre: NeuronId, post: NeuronId) -> Result<f64> {
        self.neuron(post)?.weight(pre).ok_or_else(|| {
            BrainError::network_topology(format!(
                "Neuron {} has no weight for {}",
                post.raw(),
                pre.raw()
            ))
        })
    }
}

/// Neuron waiting in a [`NetworkBuilder`]
enum Blueprint {
    Standard(Option<f64>),
    Gated(Vec<TransmitterKind>),
    Producing(Vec<TransmitterId>),
    Sensory,
    Motor(Box<dyn Trigger>),
}

/// Builder for constructing networks
pub struct NetworkBuilder {
    config: BrainConfig,
    neurons: Vec<(NeuronId, Blueprint)>,
    connections: Vec<(NeuronId, NeuronId)>,
}

impl NetworkBuilder {
    /// Create a new network builder
    pub fn new() -> Self {
        Self {
            config: BrainConfig::default(),
            neurons: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Set network configuration
    pub fn with_config(mut self, config: BrainConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a plain neuron with the default threshold
    pub fn add_neuron(mut self, id: NeuronId) -> Self {
        self.neurons.push((id, Blueprint::Standard(None)));
        self
    }

    /// Add a plain neuron with a specific threshold
    pub fn add_neuron_with_threshold(mut self, id: NeuronId, threshold: f64) -> Self {
        self.neurons.push((id, Blueprint::Standard(Some(threshold))));
        self
    }

    /// Add a range of plain neurons, ids saturating below `u32::MAX`
    pub fn add_neurons(mut self, start: u32, count: u32) -> Self {
        for i in start..start.saturating_add(count) {
            self.neurons.push((NeuronId::new(i), Blueprint::Standard(None)));
        }
        self
    }

    /// Add a gated neuron
    pub fn add_gated(
        mut self,
        id: NeuronId,
        allowed: impl IntoIterator<Item = TransmitterKind>,
    ) -> Self {
        let allowed = allowed.into_iter().collect();
        self.neurons.push((id, Blueprint::Gated(allowed)));
        self
    }

    /// Add a transmitter-producing neuron
    pub fn add_producing(
        mut self,
        id: NeuronId,
        producible: impl IntoIterator<Item = TransmitterId>,
    ) -> Self {
        let producible = producible.into_iter().collect();
        self.neurons.push((id, Blueprint::Producing(producible)));
        self
    }

    /// Add a sensory neuron
    pub fn add_sensory(mut self, id: NeuronId) -> Self {
        self.neurons.push((id, Blueprint::Sensory));
        self
    }

    /// Add a motor neuron
    pub fn add_motor(mut self, id: NeuronId, trigger: impl Trigger + 'static) -> Self {
        self.neurons.push((id, Blueprint::Motor(Box::new(trigger))));
        self
    }

    /// Link `from` to `to`
    pub fn connect(mut self, from: NeuronId, to: NeuronId) -> Self {
        self.connections.push((from, to));
        self
    }

    /// Link consecutive neurons of `path`
    pub fn chain(mut self, path: &[NeuronId]) -> Self {
        for pair in path.windows(2) {
            self.connections.push((pair[0], pair[1]));
        }
        self
    }

    /// Build the network
    pub fn build(self) -> Result<Network> {
        let mut network = Network::new(self.config)?;
        let threshold = network.config.default_threshold;

        for (id, blueprint) in self.neurons {
            match blueprint {
                Blueprint::Standard(custom) => {
                    network.add_neuron_with_threshold(id, custom.unwrap_or(threshold))?
                }
                Blueprint::Gated(allowed) => network.add_gated(id, allowed)?,
                Blueprint::Producing(producible) => network.add_producing(id, producible)?,
                Blueprint::Sensory => network.add_sensory(id)?,
                Blueprint::Motor(trigger) => {
                    let kind = NeuronKind::Motor { trigger };
                    network.insert(Neuron::with_kind(id, threshold, kind))?;
                }
            }
        }

        for (from, to) in self.connections {
            network.connect(from, to)?;
        }

        Ok(network)
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
