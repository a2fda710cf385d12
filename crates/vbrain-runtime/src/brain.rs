//! Breadth-first scheduler driving a topology
//!
//! [`VirtualBrain`] starts from the topology inputs and visits nodes in
//! queue order. Every visit applies the globally active transmitters to the
//! node, enqueues all of its connections whether or not it fires, and ticks
//! it. Cyclic graphs therefore revisit nodes forever; the continuation
//! predicate is the only guard besides an empty queue.
//!
//! External stimuli can be pushed from other threads through a
//! [`StimulusHandle`]. They are drained into [`Topology::inject`] once per
//! loop iteration.

use crate::{error::*, topology::Topology, transmitter::Transmitter, NeuronId};
use crossbeam::channel::{self, Receiver, Sender};
use std::collections::VecDeque;

/// A transmitter in the scheduler table with its own countdown
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalTransmitter {
    transmitter: Transmitter,
    remaining: i32,
}

impl GlobalTransmitter {
    /// Transmitter handed to every visited node
    pub fn transmitter(&self) -> &Transmitter {
        &self.transmitter
    }

    /// Visits left before removal
    pub fn remaining(&self) -> i32 {
        self.remaining
    }
}

/// Counters of one [`VirtualBrain::run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Nodes visited
    pub ticks: u64,
    /// Visits that ended in a fire
    pub fired: u64,
    /// Motor triggers invoked
    pub triggered: u64,
    /// The loop ended because the queue ran dry
    pub queue_exhausted: bool,
}

/// Cloneable sender of external stimulation
#[derive(Debug, Clone)]
pub struct StimulusHandle {
    tx: Sender<f64>,
}

impl StimulusHandle {
    /// Queue a stimulus for every input. Returns `false` once the brain is gone.
    pub fn inject(&self, strength: f64) -> bool {
        self.tx.send(strength).is_ok()
    }
}

/// Scheduler owning one topology and the global transmitter table
#[derive(Debug)]
pub struct VirtualBrain {
    topology: Topology,
    active: Vec<GlobalTransmitter>,
    tx: Sender<f64>,
    rx: Receiver<f64>,
}

impl VirtualBrain {
    /// Create a scheduler for `topology`
    pub fn new(topology: Topology) -> Self {
        let (tx, rx) = channel::unbounded();
        Self {
            topology,
            active: Vec::new(),
            tx,
            rx,
        }
    }

    /// Scheduled topology
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Mutable scheduled topology
    pub fn topology_mut(&mut self) -> &mut Topology {
        &mut self.topology
    }

    /// Make `transmitter` globally active for as many visits as it has
    /// lifetime left
    pub fn inject_transmitter(&mut self, transmitter: Transmitter) -> bool {
        let lifetime = transmitter.remaining();
        self.inject_transmitter_for(transmitter, lifetime)
    }

    /// Make `transmitter` globally active for `lifetime` visits.
    ///
    /// An active entry of the same kind gets its countdown reset instead.
    /// Returns `false` when `lifetime` is not positive.
    pub fn inject_transmitter_for(&mut self, transmitter: Transmitter, lifetime: i32) -> bool {
        if lifetime <= 0 {
            log::debug!("ignoring inert global {:?}", transmitter.kind());
            return false;
        }

        let kind = transmitter.kind();
        match self.active.iter_mut().find(|g| g.transmitter.kind() == kind) {
            Some(existing) => existing.remaining = lifetime,
            None => self.active.push(GlobalTransmitter {
                transmitter,
                remaining: lifetime,
            }),
        }
        log::debug!("global {:?} active for {} visits", kind, lifetime);
        true
    }

    /// Globally active transmitters in injection order
    pub fn active_transmitters(&self) -> &[GlobalTransmitter] {
        &self.active
    }

    /// Move the produced transmitters of `id` into the global table.
    ///
    /// Returns how many were still alive and got injected.
    pub fn absorb_output(&mut self, id: NeuronId) -> Result<usize> {
        let produced = self.topology.network_mut().neuron_mut(id)?.take_output();
        let mut absorbed = 0;
        for transmitter in produced {
            if self.inject_transmitter(transmitter) {
                absorbed += 1;
            }
        }
        Ok(absorbed)
    }

    /// Handle for stimulating the inputs from elsewhere
    pub fn stimulus_handle(&self) -> StimulusHandle {
        StimulusHandle {
            tx: self.tx.clone(),
        }
    }

    /// Stimulate every input right away
    pub fn inject(&mut self, strength: f64) {
        self.topology.inject(strength);
    }

    fn drain_stimuli(&mut self) {
        while let Ok(strength) = self.rx.try_recv() {
            self.topology.inject(strength);
        }
    }

    /// Run until the queue is empty or `proceed(ticks_so_far)` returns false
    pub fn run<P>(&mut self, mut proceed: P) -> RunSummary
    where
        P: FnMut(u64) -> bool,
    {
        let mut queue: VecDeque<NeuronId> = self.topology.inputs().iter().copied().collect();
        let mut summary = RunSummary::default();

        log::info!(
            "Starting run: {} inputs, {} global transmitters",
            queue.len(),
            self.active.len()
        );

        loop {
            self.drain_stimuli();

            if queue.is_empty() {
                summary.queue_exhausted = true;
                break;
            }
            if !proceed(summary.ticks) {
                break;
            }
            let Some(id) = queue.pop_front() else {
                break;
            };

            let network = self.topology.network_mut();
            let Some(slot) = network.slot(id) else {
                log::warn!("skipping unknown neuron {}", id);
                continue;
            };

            let neuron = network.neuron_at_mut(slot);
            for global in self.active.iter_mut() {
                neuron.attach_transmitter(global.transmitter.clone());
                global.remaining -= 1;
            }
            queue.extend(neuron.connections().iter().copied());

            let outcome = network.tick_slot(slot);
            if outcome.fired {
                summary.fired += 1;
            }
            if outcome.triggered {
                summary.triggered += 1;
            }

            self.active.retain(|g| {
                let alive = g.remaining > 0;
                if !alive {
                    log::debug!("global {:?} expired", g.transmitter.kind());
                }
                alive
            });
            summary.ticks += 1;
        }

        log::info!(
            "Run finished: {} ticks, {} fired, {} triggered",
            summary.ticks,
            summary.fired,
            summary.triggered
        );
        summary
    }

    /// Run at most `max_ticks` visits
    pub fn run_for(&mut self, max_ticks: u64) -> RunSummary {
        self.run(|ticks| ticks < max_ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::BrainConfig, fsm::FsmState, transmitter::TransmitterKind, TransmitterId,
    };

    fn id(raw: u32) -> NeuronId {
        NeuronId::new(raw)
    }

    fn line() -> VirtualBrain {
        let topology = Topology::new(BrainConfig::default(), |network| {
            network.add_sensory(id(0))?;
            network.add_neuron(id(1))?;
            network.add_motor(id(2), || {})?;
            network.connect(id(0), id(1))?;
            network.connect(id(1), id(2))?;
            Ok((vec![id(0)], vec![id(2)]))
        })
        .unwrap();
        VirtualBrain::new(topology)
    }

    #[test]
    fn test_queue_exhaustion_on_acyclic_graph() {
        let mut brain = line();
        let summary = brain.run(|_| true);
        assert_eq!(summary.ticks, 3);
        assert!(summary.queue_exhausted);
    }

    #[test]
    fn test_predicate_bounds_cycle() {
        let topology = Topology::new(BrainConfig::default(), |network| {
            network.add_sensory(id(0))?;
            network.add_neuron(id(1))?;
            network.add_neuron(id(2))?;
            network.connect(id(0), id(1))?;
            network.connect(id(1), id(2))?;
            network.connect(id(2), id(1))?;
            Ok((vec![id(0)], vec![]))
        })
        .unwrap();
        let mut brain = VirtualBrain::new(topology);

        let summary = brain.run_for(25);
        assert_eq!(summary.ticks, 25);
        assert!(!summary.queue_exhausted);
    }

    #[test]
    fn test_predicate_sees_tick_count() {
        let mut brain = line();
        let mut seen = Vec::new();
        brain.run(|ticks| {
            seen.push(ticks);
            true
        });
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn test_global_countdown_and_purge() {
        let mut brain = line();
        assert!(brain.inject_transmitter_for(Transmitter::new(TransmitterKind::Serotonin), 2));
        brain.run(|_| true);

        assert!(brain.active_transmitters().is_empty());
        let network = brain.topology().network();
        // only the first two visits received it; the sensory node rejects it
        assert!(!network.neuron(id(0)).unwrap().transmitters().contains(TransmitterKind::Serotonin));
        assert!(network.neuron(id(1)).unwrap().transmitters().contains(TransmitterKind::Serotonin));
        assert!(!network.neuron(id(2)).unwrap().transmitters().contains(TransmitterKind::Serotonin));
    }

    #[test]
    fn test_reinjection_refreshes_countdown() {
        let mut brain = line();
        brain.inject_transmitter_for(Transmitter::new(TransmitterKind::Gaba), 2);
        brain.inject_transmitter_for(Transmitter::new(TransmitterKind::Gaba), 7);
        assert_eq!(brain.active_transmitters().len(), 1);
        assert_eq!(brain.active_transmitters()[0].remaining(), 7);

        assert!(!brain.inject_transmitter(Transmitter::dud()));
        assert_eq!(brain.active_transmitters().len(), 1);
    }

    #[test]
    fn test_absorb_output() {
        let topology = Topology::new(BrainConfig::default(), |network| {
            network.add_sensory(id(0))?;
            network.add_producing(id(1), [TransmitterId::DOPAMINE, TransmitterId::new(42)])?;
            network.connect(id(0), id(1))?;
            Ok((vec![id(0)], vec![]))
        })
        .unwrap();
        let mut brain = VirtualBrain::new(topology);

        brain
            .topology_mut()
            .network_mut()
            .emit(id(1), &crate::transmitter::StandardFactory)
            .unwrap();
        assert_eq!(brain.absorb_output(id(1)).unwrap(), 1);
        assert_eq!(brain.active_transmitters()[0].remaining(), 10);
        assert!(brain.absorb_output(id(7)).is_err());
    }

    #[test]
    fn test_stimulus_drained_before_visits() {
        let mut brain = line();
        let handle = brain.stimulus_handle();
        assert!(handle.inject(1.0));

        let summary = brain.run(|_| true);
        // sensory fire lands in node 1 before it is visited
        assert_eq!(summary.fired, 3);
        assert_eq!(summary.triggered, 1);
        let network = brain.topology().network();
        assert_eq!(network.neuron(id(1)).unwrap().state(), FsmState::Depolarized);
        assert_eq!(network.neuron(id(2)).unwrap().state(), FsmState::Depolarized);
    }

    #[test]
    fn test_brain_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<VirtualBrain>();
        assert_send::<StimulusHandle>();
    }
}
