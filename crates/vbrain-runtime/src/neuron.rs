//! Neuron variants and the per-tick update rule
//!
//! Every variant shares the same soma: incoming signal buffer, weight
//! table, threshold, state machine, active transmitters and outgoing
//! connections. A tick runs these steps in order:
//!
//! 1. aggregate buffered signals, installing the initial weight for unseen
//!    sources,
//! 2. seed a [`ModulationProfile`] from the config and the state amplifier,
//! 3. let every active transmitter rewrite the profile, then age and expire
//!    them,
//! 4. on fire: reinforce contributing weights, decay the rest, advance the
//!    state machine and emit one signal,
//! 5. otherwise decay every weight,
//! 6. advance a non-resting neuron that did not fire,
//! 7. clear the buffer.
//!
//! At most one state advance happens per tick.

use crate::{
    config::{check_threshold, BrainConfig},
    error::*,
    fsm::{FsmState, NeuronFsm},
    signal::Signal,
    transmitter::{
        Attachment, ModulationProfile, Transmitter, TransmitterFactory, TransmitterKind,
        TransmitterSet,
    },
    NeuronId, TransmitterId,
};
use core::fmt;
use std::collections::BTreeMap;

/// Kinds a sensory neuron lets through
pub const SENSORY_TRANSMITTERS: [TransmitterKind; 2] =
    [TransmitterKind::Glutamate, TransmitterKind::Dopamine];

/// Strength of every emitted signal
pub const OUTPUT_STRENGTH: f64 = 1.0;

/// External action a motor neuron invokes when it fires
pub trait Trigger: Send {
    /// Run the action. Failures are the implementor's concern.
    fn trigger(&mut self);
}

impl<F> Trigger for F
where
    F: FnMut() + Send,
{
    fn trigger(&mut self) {
        self()
    }
}

/// Variant-specific behaviour and state
pub enum NeuronKind {
    /// Plain inter-neuron
    Standard,
    /// Accepts only the listed transmitter kinds
    Gated {
        /// Kinds that may be attached
        allowed: Vec<TransmitterKind>,
    },
    /// Produces transmitters on demand
    Producing {
        /// Identifiers handed to the factory on `emit`
        producible: Vec<TransmitterId>,
        /// Transmitters produced so far and not yet collected
        output: Vec<Transmitter>,
    },
    /// Driven by external stimulation instead of buffered signals
    Sensory {
        /// Firing capacity in `[0, 1]`
        stamina: f64,
        /// Set by `fire`, consumed by the next tick
        fired_since_tick: bool,
    },
    /// Terminal sink invoking an external trigger
    Motor {
        /// Action run on fire
        trigger: Box<dyn Trigger>,
    },
}

impl fmt::Debug for NeuronKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeuronKind::Standard => f.write_str("Standard"),
            NeuronKind::Gated { allowed } => {
                f.debug_struct("Gated").field("allowed", allowed).finish()
            }
            NeuronKind::Producing { producible, output } => f
                .debug_struct("Producing")
                .field("producible", producible)
                .field("output", output)
                .finish(),
            NeuronKind::Sensory {
                stamina,
                fired_since_tick,
            } => f
                .debug_struct("Sensory")
                .field("stamina", stamina)
                .field("fired_since_tick", fired_since_tick)
                .finish(),
            NeuronKind::Motor { .. } => f.write_str("Motor"),
        }
    }
}

/// What a tick produced
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickOutcome {
    /// The neuron fired during this tick window
    pub fired: bool,
    /// Signal to append to every connection
    pub signal: Option<Signal>,
    /// A motor trigger ran
    pub triggered: bool,
}

/// Shared state and update steps of every neuron variant
#[derive(Debug)]
struct Soma {
    id: NeuronId,
    threshold: f64,
    incoming: Vec<Signal>,
    weights: BTreeMap<NeuronId, f64>,
    fsm: NeuronFsm,
    transmitters: TransmitterSet,
    connections: Vec<NeuronId>,
}

impl Soma {
    fn new(id: NeuronId, threshold: f64) -> Self {
        Self {
            id,
            threshold,
            incoming: Vec::new(),
            weights: BTreeMap::new(),
            fsm: NeuronFsm::new(),
            transmitters: TransmitterSet::new(),
            connections: Vec::new(),
        }
    }

    /// Weighted sum of buffered signals
    fn aggregate(&mut self, initial_weight: f64) -> f64 {
        let weights = &mut self.weights;
        self.incoming
            .iter()
            .map(|signal| {
                let weight = *weights.entry(signal.source()).or_insert(initial_weight);
                weight * signal.strength()
            })
            .sum()
    }

    fn amplified_threshold(&self, config: &BrainConfig) -> f64 {
        self.threshold * config.amplifiers.factor(self.fsm.state())
    }

    fn contributed(&self, source: NeuronId) -> bool {
        self.incoming.iter().any(|signal| signal.source() == source)
    }

    /// Grow contributing weights; decay the others when `decay` is given
    fn reinforce(&mut self, growth: f64, decay: Option<f64>) {
        let incoming = &self.incoming;
        for (source, weight) in self.weights.iter_mut() {
            if incoming.iter().any(|signal| signal.source() == *source) {
                *weight *= growth;
            } else if let Some(decay) = decay {
                *weight *= decay;
            }
        }
    }

    fn decay_all(&mut self, decay: f64) {
        for weight in self.weights.values_mut() {
            *weight *= decay;
        }
    }

    /// Forced advance: a non-resting neuron that did not fire moves on
    fn settle(&mut self, fired: bool) {
        if !fired && !self.fsm.is_resting() {
            log::debug!("advancing {} out of {}", self.id, self.fsm.state());
            self.fsm.advance();
        }
    }

    fn outgoing_signal(&self) -> Signal {
        Signal::new(self.id, OUTPUT_STRENGTH)
    }

    fn tick_standard(&mut self, config: &BrainConfig) -> TickOutcome {
        let input = self.aggregate(config.initial_weight);

        let mut profile = ModulationProfile {
            growth_rate: config.growth_rate,
            decay_rate: config.decay_rate,
            firing_threshold: self.threshold,
            effective_signal: self.amplified_threshold(config),
        };
        self.transmitters.modulate(&mut profile);

        let fired = input >= profile.effective_signal;
        let signal = if fired {
            self.reinforce(profile.growth_rate, Some(profile.decay_rate));
            self.fsm.advance();
            Some(self.outgoing_signal())
        } else {
            self.decay_all(profile.decay_rate);
            None
        };

        self.settle(fired);
        self.incoming.clear();

        TickOutcome {
            fired,
            signal,
            triggered: false,
        }
    }

    fn tick_motor(&mut self, trigger: &mut dyn Trigger, config: &BrainConfig) -> TickOutcome {
        let input = self.aggregate(config.initial_weight);

        let mut profile = ModulationProfile {
            growth_rate: config.growth_rate,
            decay_rate: config.decay_rate,
            firing_threshold: self.amplified_threshold(config),
            effective_signal: input,
        };
        self.transmitters.modulate(&mut profile);

        // Motor weights use the configured rates, never the modulated ones,
        // and only contributing sources change on fire.
        let fired = profile.effective_signal >= profile.firing_threshold;
        if fired {
            self.reinforce(config.growth_rate, None);
            self.fsm.advance();
            trigger.trigger();
        } else {
            self.decay_all(config.decay_rate);
        }

        self.settle(fired);
        self.incoming.clear();

        TickOutcome {
            fired,
            signal: None,
            triggered: fired,
        }
    }

    fn tick_sensory(
        &mut self,
        stamina: &mut f64,
        fired_since_tick: &mut bool,
        config: &BrainConfig,
    ) -> TickOutcome {
        let fired = std::mem::take(fired_since_tick);

        if *stamina > 0.0 {
            self.settle(fired);
        } else {
            log::debug!("{} exhausted, holding {}", self.id, self.fsm.state());
        }
        *stamina = (*stamina + config.sensory.recovery_rate).min(1.0);

        self.transmitters.age();

        TickOutcome {
            fired,
            signal: None,
            triggered: false,
        }
    }

    fn fire_sensory(
        &mut self,
        stamina: &mut f64,
        fired_since_tick: &mut bool,
        strength: f64,
        config: &BrainConfig,
    ) -> Option<Signal> {
        if *fired_since_tick {
            log::trace!("{} already fired this tick", self.id);
            return None;
        }
        if *stamina <= 0.0 {
            log::debug!("{} too fatigued to fire", self.id);
            return None;
        }

        let mut profile = ModulationProfile {
            growth_rate: config.growth_rate,
            decay_rate: config.decay_rate,
            firing_threshold: self.amplified_threshold(config),
            effective_signal: strength * stamina.clamp(0.0, 1.0),
        };
        self.transmitters.preview(&mut profile);

        if profile.effective_signal < profile.firing_threshold {
            return None;
        }

        self.fsm.advance();
        *stamina = (*stamina - config.sensory.depletion_rate).max(0.0);
        *fired_since_tick = true;
        Some(self.outgoing_signal())
    }
}

/// A neuron: shared soma plus variant behaviour
#[derive(Debug)]
pub struct Neuron {
    soma: Soma,
    kind: NeuronKind,
}

impl Neuron {
    /// Create a plain neuron
    pub fn new(id: NeuronId, threshold: f64) -> Self {
        Self::with_kind(id, threshold, NeuronKind::Standard)
    }

    /// Create a neuron accepting only the `allowed` transmitter kinds
    pub fn gated(
        id: NeuronId,
        threshold: f64,
        allowed: impl IntoIterator<Item = TransmitterKind>,
    ) -> Self {
        let allowed = allowed.into_iter().collect();
        Self::with_kind(id, threshold, NeuronKind::Gated { allowed })
    }

    /// Create a neuron producing the `producible` transmitters on `emit`
    pub fn producing(
        id: NeuronId,
        threshold: f64,
        producible: impl IntoIterator<Item = TransmitterId>,
    ) -> Self {
        let kind = NeuronKind::Producing {
            producible: producible.into_iter().collect(),
            output: Vec::new(),
        };
        Self::with_kind(id, threshold, kind)
    }

    /// Create a sensory neuron with the given stamina
    pub fn sensory(id: NeuronId, threshold: f64, stamina: f64) -> Self {
        let kind = NeuronKind::Sensory {
            stamina: stamina.clamp(0.0, 1.0),
            fired_since_tick: false,
        };
        Self::with_kind(id, threshold, kind)
    }

    /// Create a motor neuron running `trigger` on fire
    pub fn motor(id: NeuronId, threshold: f64, trigger: impl Trigger + 'static) -> Self {
        let kind = NeuronKind::Motor {
            trigger: Box::new(trigger),
        };
        Self::with_kind(id, threshold, kind)
    }

    pub(crate) fn with_kind(id: NeuronId, threshold: f64, kind: NeuronKind) -> Self {
        Self {
            soma: Soma::new(id, threshold),
            kind,
        }
    }

    /// Run one tick
    pub fn tick(&mut self, config: &BrainConfig) -> TickOutcome {
        match &mut self.kind {
            NeuronKind::Sensory {
                stamina,
                fired_since_tick,
            } => self.soma.tick_sensory(stamina, fired_since_tick, config),
            NeuronKind::Motor { trigger } => self.soma.tick_motor(trigger.as_mut(), config),
            NeuronKind::Standard | NeuronKind::Gated { .. } | NeuronKind::Producing { .. } => {
                self.soma.tick_standard(config)
            }
        }
    }

    /// Stimulate a sensory neuron directly.
    ///
    /// Returns the signal to propagate when the stimulus was strong enough.
    pub fn fire(&mut self, strength: f64, config: &BrainConfig) -> Result<Option<Signal>> {
        match &mut self.kind {
            NeuronKind::Sensory {
                stamina,
                fired_since_tick,
            } => Ok(self
                .soma
                .fire_sensory(stamina, fired_since_tick, strength, config)),
            _ => Err(BrainError::unsupported(self.soma.id.raw(), "fire")),
        }
    }

    /// Buffer a signal for the next tick. Sensory neurons drop it.
    pub fn receive(&mut self, signal: Signal) {
        if self.is_sensory() {
            log::trace!("{} ignores signal from {}", self.soma.id, signal.source());
            return;
        }
        self.soma.incoming.push(signal);
    }

    /// Attach a transmitter, honouring gating
    pub fn attach_transmitter(&mut self, transmitter: Transmitter) -> Attachment {
        let allowed = match &self.kind {
            NeuronKind::Gated { allowed } => allowed.contains(&transmitter.kind()),
            NeuronKind::Sensory { .. } => SENSORY_TRANSMITTERS.contains(&transmitter.kind()),
            _ => true,
        };
        if !allowed {
            log::debug!("{} rejects {:?}", self.soma.id, transmitter.kind());
            return Attachment::Rejected;
        }
        self.soma.transmitters.attach(transmitter)
    }

    /// Produce one transmitter per producible identifier into the output buffer
    pub fn emit<F>(&mut self, factory: &F) -> Result<usize>
    where
        F: TransmitterFactory + ?Sized,
    {
        match &mut self.kind {
            NeuronKind::Producing { producible, output } => {
                for id in producible.iter() {
                    let transmitter = factory.create(*id);
                    if !transmitter.is_alive() {
                        log::warn!("{} produced inert transmitter for {}", self.soma.id, id);
                    }
                    output.push(transmitter);
                }
                Ok(producible.len())
            }
            _ => Err(BrainError::unsupported(self.soma.id.raw(), "emit")),
        }
    }

    /// Drain the produced transmitters
    pub fn take_output(&mut self) -> Vec<Transmitter> {
        match &mut self.kind {
            NeuronKind::Producing { output, .. } => std::mem::take(output),
            _ => Vec::new(),
        }
    }

    /// Produced transmitters not yet collected
    pub fn output(&self) -> &[Transmitter] {
        match &self.kind {
            NeuronKind::Producing { output, .. } => output,
            _ => &[],
        }
    }

    pub(crate) fn add_connection(&mut self, target: NeuronId) {
        self.soma.connections.push(target);
    }

    /// Neuron ID
    pub fn id(&self) -> NeuronId {
        self.soma.id
    }

    /// Baseline threshold
    pub fn threshold(&self) -> f64 {
        self.soma.threshold
    }

    /// Replace the baseline threshold. It must be finite and positive.
    pub fn set_threshold(&mut self, threshold: f64) -> Result<()> {
        check_threshold(threshold)?;
        self.soma.threshold = threshold;
        Ok(())
    }

    /// Current FSM state
    pub fn state(&self) -> FsmState {
        self.soma.fsm.state()
    }

    /// Weight table keyed by source
    pub fn weights(&self) -> &BTreeMap<NeuronId, f64> {
        &self.soma.weights
    }

    /// Weight for `source`, if it has been seen
    pub fn weight(&self, source: NeuronId) -> Option<f64> {
        self.soma.weights.get(&source).copied()
    }

    /// Signals buffered for the next tick
    pub fn pending_signals(&self) -> &[Signal] {
        &self.soma.incoming
    }

    /// Whether `source` has a buffered signal
    pub fn has_signal_from(&self, source: NeuronId) -> bool {
        self.soma.contributed(source)
    }

    /// Downstream neurons in link order
    pub fn connections(&self) -> &[NeuronId] {
        &self.soma.connections
    }

    /// Active transmitters
    pub fn transmitters(&self) -> &TransmitterSet {
        &self.soma.transmitters
    }

    /// Variant
    pub fn kind(&self) -> &NeuronKind {
        &self.kind
    }

    /// Stamina of a sensory neuron
    pub fn stamina(&self) -> Option<f64> {
        match &self.kind {
            NeuronKind::Sensory { stamina, .. } => Some(*stamina),
            _ => None,
        }
    }

    /// Whether this is a sensory neuron
    pub fn is_sensory(&self) -> bool {
        matches!(self.kind, NeuronKind::Sensory { .. })
    }

    /// Whether this is a motor neuron
    pub fn is_motor(&self) -> bool {
        matches!(self.kind, NeuronKind::Motor { .. })
    }

    /// `(known sources, outgoing connections)`
    pub fn degree(&self) -> (usize, usize) {
        (self.soma.weights.len(), self.soma.connections.len())
    }
}
