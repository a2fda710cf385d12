//! ID types for neurons and neurotransmitter kinds

use core::fmt;

/// Stable identity of a neuron, unique within a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NeuronId(pub u32);

impl NeuronId {
    /// Create a new neuron ID
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

impl From<u32> for NeuronId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for NeuronId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Identifier a transmitter factory maps to a concrete transmitter kind.
///
/// Any value is legal; identifiers without a known kind resolve to the inert
/// transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransmitterId(pub i32);

impl TransmitterId {
    /// Glutamate
    pub const GLUTAMATE: Self = Self(0);
    /// GABA
    pub const GABA: Self = Self(1);
    /// Dopamine
    pub const DOPAMINE: Self = Self(2);
    /// Serotonin
    pub const SEROTONIN: Self = Self(3);
    /// Acetylcholine
    pub const ACETYLCHOLINE: Self = Self(4);
    /// Identifier carried by the inert transmitter
    pub const DUD: Self = Self(-1);

    /// Create a new transmitter ID
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub const fn raw(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for TransmitterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}
