//! Neurotransmitters and the modulation profile they rewrite
//!
//! A transmitter is a short-lived modifier. While attached to a neuron it
//! rewrites that neuron's [`ModulationProfile`] once per tick and loses one
//! unit of remaining lifetime each time. It is dropped as soon as the remaining
//! lifetime reaches zero.
//!
//! Active transmitters are kept per kind in a fixed order (the declaration
//! order of [`TransmitterKind`]), so the sequence in which effects hit the
//! profile is reproducible.

use crate::TransmitterId;
use std::collections::BTreeMap;

/// Per-tick record rewritten by active transmitters before the firing decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationProfile {
    /// Multiplier for reinforced weights
    pub growth_rate: f64,
    /// Multiplier for weights that decay
    pub decay_rate: f64,
    /// Baseline threshold
    pub firing_threshold: f64,
    /// Value the firing decision is compared against
    pub effective_signal: f64,
}

/// Concrete transmitter kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransmitterKind {
    /// Raises the effective signal
    Glutamate,
    /// Lowers the effective signal
    Gaba,
    /// Boosts growth, slows decay
    Dopamine,
    /// Dampens growth and decay
    Serotonin,
    /// Lowers the threshold, raises the effective signal
    Acetylcholine,
    /// Inert, born expired
    Dud,
}

impl TransmitterKind {
    /// Every kind, in application order
    pub const ALL: [TransmitterKind; 6] = [
        TransmitterKind::Glutamate,
        TransmitterKind::Gaba,
        TransmitterKind::Dopamine,
        TransmitterKind::Serotonin,
        TransmitterKind::Acetylcholine,
        TransmitterKind::Dud,
    ];

    /// Identifier of this kind
    pub const fn id(self) -> TransmitterId {
        match self {
            TransmitterKind::Glutamate => TransmitterId::GLUTAMATE,
            TransmitterKind::Gaba => TransmitterId::GABA,
            TransmitterKind::Dopamine => TransmitterId::DOPAMINE,
            TransmitterKind::Serotonin => TransmitterId::SEROTONIN,
            TransmitterKind::Acetylcholine => TransmitterId::ACETYLCHOLINE,
            TransmitterKind::Dud => TransmitterId::DUD,
        }
    }

    /// Kind for an identifier; unknown identifiers map to [`TransmitterKind::Dud`]
    pub const fn from_id(id: TransmitterId) -> Self {
        match id.raw() {
            0 => TransmitterKind::Glutamate,
            1 => TransmitterKind::Gaba,
            2 => TransmitterKind::Dopamine,
            3 => TransmitterKind::Serotonin,
            4 => TransmitterKind::Acetylcholine,
            _ => TransmitterKind::Dud,
        }
    }

    /// Number of applications a fresh transmitter of this kind survives
    pub const fn nominal_lifetime(self) -> i32 {
        match self {
            TransmitterKind::Glutamate => 2,
            TransmitterKind::Gaba => 3,
            TransmitterKind::Dopamine => 10,
            TransmitterKind::Serotonin => 15,
            TransmitterKind::Acetylcholine => 6,
            TransmitterKind::Dud => -1,
        }
    }

    /// Apply this kind's effect to `profile`
    pub fn apply(self, profile: &mut ModulationProfile) {
        match self {
            TransmitterKind::Glutamate => {
                profile.effective_signal *= 1.2;
            }
            TransmitterKind::Gaba => {
                profile.effective_signal *= 0.6;
            }
            TransmitterKind::Dopamine => {
                profile.growth_rate *= 2.0;
                profile.decay_rate *= 0.95;
            }
            TransmitterKind::Serotonin => {
                profile.growth_rate *= 0.9;
                profile.decay_rate *= 0.9;
            }
            TransmitterKind::Acetylcholine => {
                profile.firing_threshold *= 0.9;
                profile.effective_signal *= 1.3;
            }
            TransmitterKind::Dud => {}
        }
    }
}

/// A transmitter instance with its own remaining lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmitter {
    kind: TransmitterKind,
    remaining: i32,
}

impl Transmitter {
    /// Create a fresh transmitter with the kind's nominal lifetime
    pub const fn new(kind: TransmitterKind) -> Self {
        Self {
            kind,
            remaining: kind.nominal_lifetime(),
        }
    }

    /// The inert transmitter
    pub const fn dud() -> Self {
        Self::new(TransmitterKind::Dud)
    }

    /// Kind of this transmitter
    pub const fn kind(&self) -> TransmitterKind {
        self.kind
    }

    /// Applications left before expiry
    pub const fn remaining(&self) -> i32 {
        self.remaining
    }

    /// Whether the transmitter still has lifetime left
    pub const fn is_alive(&self) -> bool {
        self.remaining > 0
    }

    /// Apply the effect once and consume one unit of lifetime
    pub fn apply_effects(&mut self, profile: &mut ModulationProfile) {
        self.kind.apply(profile);
        self.remaining -= 1;
    }

    /// Consume one unit of lifetime without applying the effect
    pub fn age(&mut self) {
        self.remaining -= 1;
    }

    /// Reset the remaining lifetime to the nominal one
    pub fn revitalize(&mut self) {
        self.remaining = self.kind.nominal_lifetime();
    }
}

/// Maps kind identifiers to transmitter instances
pub trait TransmitterFactory {
    /// Build a transmitter for `id`. Unknown identifiers must produce an
    /// inert transmitter rather than fail.
    fn create(&self, id: TransmitterId) -> Transmitter;
}

/// Factory for the built-in kinds
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFactory;

impl TransmitterFactory for StandardFactory {
    fn create(&self, id: TransmitterId) -> Transmitter {
        Transmitter::new(TransmitterKind::from_id(id))
    }
}

impl<F> TransmitterFactory for F
where
    F: Fn(TransmitterId) -> Transmitter,
{
    fn create(&self, id: TransmitterId) -> Transmitter {
        self(id)
    }
}

/// Result of attaching a transmitter to a set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// Kind was not active and has been added
    Added,
    /// Kind was already active; its lifetime has been reset
    Refreshed,
    /// Attachment refused (gated neurons)
    Rejected,
}

impl Attachment {
    /// Whether the transmitter now acts on the neuron
    pub fn accepted(self) -> bool {
        !matches!(self, Attachment::Rejected)
    }
}

/// Transmitters active on one neuron, at most one per kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransmitterSet {
    active: BTreeMap<TransmitterKind, Transmitter>,
}

impl TransmitterSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a transmitter, refreshing the existing entry for its kind
    pub fn attach(&mut self, transmitter: Transmitter) -> Attachment {
        match self.active.get_mut(&transmitter.kind()) {
            Some(existing) => {
                existing.revitalize();
                Attachment::Refreshed
            }
            None => {
                self.active.insert(transmitter.kind(), transmitter);
                Attachment::Added
            }
        }
    }

    /// Apply every active effect to `profile`, age each transmitter once and
    /// drop the expired ones
    pub fn modulate(&mut self, profile: &mut ModulationProfile) {
        for transmitter in self.active.values_mut() {
            transmitter.apply_effects(profile);
        }
        self.expire();
    }

    /// Apply every active effect to `profile` without ageing
    pub fn preview(&self, profile: &mut ModulationProfile) {
        for transmitter in self.active.values() {
            transmitter.kind().apply(profile);
        }
    }

    /// Age every transmitter once and drop the expired ones
    pub fn age(&mut self) {
        for transmitter in self.active.values_mut() {
            transmitter.age();
        }
        self.expire();
    }

    fn expire(&mut self) {
        self.active.retain(|kind, transmitter| {
            let alive = transmitter.is_alive();
            if !alive {
                log::debug!("{:?} expired", kind);
            }
            alive
        });
    }

    /// Whether a transmitter of `kind` is active
    pub fn contains(&self, kind: TransmitterKind) -> bool {
        self.active.contains_key(&kind)
    }

    /// Active transmitter of `kind`
    pub fn get(&self, kind: TransmitterKind) -> Option<&Transmitter> {
        self.active.get(&kind)
    }

    /// Number of active transmitters
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no transmitter is active
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active transmitters in application order
    pub fn iter(&self) -> impl Iterator<Item = &Transmitter> {
        self.active.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ModulationProfile {
        ModulationProfile {
            growth_rate: 1.0,
            decay_rate: 1.0,
            firing_threshold: 1.0,
            effective_signal: 1.0,
        }
    }

    #[test]
    fn test_kind_effects() {
        let mut p = profile();
        TransmitterKind::Glutamate.apply(&mut p);
        assert_eq!(p.effective_signal, 1.2);

        let mut p = profile();
        TransmitterKind::Gaba.apply(&mut p);
        assert_eq!(p.effective_signal, 0.6);

        let mut p = profile();
        TransmitterKind::Dopamine.apply(&mut p);
        assert_eq!((p.growth_rate, p.decay_rate), (2.0, 0.95));

        let mut p = profile();
        TransmitterKind::Serotonin.apply(&mut p);
        assert_eq!((p.growth_rate, p.decay_rate), (0.9, 0.9));

        let mut p = profile();
        TransmitterKind::Acetylcholine.apply(&mut p);
        assert_eq!((p.firing_threshold, p.effective_signal), (0.9, 1.3));

        let mut p = profile();
        TransmitterKind::Dud.apply(&mut p);
        assert_eq!(p, profile());
    }

    #[test]
    fn test_id_mapping() {
        for kind in TransmitterKind::ALL {
            assert_eq!(TransmitterKind::from_id(kind.id()), kind);
        }
        assert_eq!(
            TransmitterKind::from_id(TransmitterId::new(99)),
            TransmitterKind::Dud
        );
    }

    #[test]
    fn test_expiry_uses_remaining_lifetime() {
        let mut glutamate = Transmitter::new(TransmitterKind::Glutamate);
        let mut p = profile();
        assert!(glutamate.is_alive());
        glutamate.apply_effects(&mut p);
        assert!(glutamate.is_alive());
        glutamate.apply_effects(&mut p);
        assert!(!glutamate.is_alive());

        glutamate.revitalize();
        assert_eq!(glutamate.remaining(), 2);
        assert!(!Transmitter::dud().is_alive());
    }

    #[test]
    fn test_set_refreshes_instead_of_duplicating() {
        let mut set = TransmitterSet::new();
        assert_eq!(
            set.attach(Transmitter::new(TransmitterKind::Gaba)),
            Attachment::Added
        );
        set.age();
        assert_eq!(set.get(TransmitterKind::Gaba).unwrap().remaining(), 2);

        assert_eq!(
            set.attach(Transmitter::new(TransmitterKind::Gaba)),
            Attachment::Refreshed
        );
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(TransmitterKind::Gaba).unwrap().remaining(), 3);
    }

    #[test]
    fn test_modulate_applies_and_expires() {
        let mut set = TransmitterSet::new();
        set.attach(Transmitter::new(TransmitterKind::Glutamate));
        set.attach(Transmitter::new(TransmitterKind::Dopamine));

        let mut p = profile();
        set.modulate(&mut p);
        assert_eq!(p.effective_signal, 1.2);
        assert_eq!(p.growth_rate, 2.0);
        assert_eq!(set.len(), 2);

        set.modulate(&mut profile());
        assert!(!set.contains(TransmitterKind::Glutamate));
        assert!(set.contains(TransmitterKind::Dopamine));
    }

    #[test]
    fn test_preview_does_not_age() {
        let mut set = TransmitterSet::new();
        set.attach(Transmitter::new(TransmitterKind::Acetylcholine));
        let mut p = profile();
        set.preview(&mut p);
        assert_eq!(p.effective_signal, 1.3);
        assert_eq!(
            set.get(TransmitterKind::Acetylcholine).unwrap().remaining(),
            6
        );
    }

    #[test]
    fn test_dud_is_dropped_after_one_pass() {
        let mut set = TransmitterSet::new();
        set.attach(Transmitter::dud());
        let mut p = profile();
        set.modulate(&mut p);
        assert!(set.is_empty());
        assert_eq!(p, profile());
    }

    #[test]
    fn test_factories() {
        let factory = StandardFactory;
        assert_eq!(
            factory.create(TransmitterId::SEROTONIN).kind(),
            TransmitterKind::Serotonin
        );
        assert_eq!(factory.create(TransmitterId::new(-7)), Transmitter::dud());

        let only_gaba = |_id: TransmitterId| Transmitter::new(TransmitterKind::Gaba);
        assert_eq!(
            only_gaba.create(TransmitterId::DOPAMINE).kind(),
            TransmitterKind::Gaba
        );
    }
}
