//! Qubit and classical bit types.
//!
//! Bits are identified by a flat circuit-wide id and may additionally
//! carry a [`RegisterSlot`]: their position inside a named register.
//! The slot feeds the structural signature and the decoding header;
//! bits created outside a register have none.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a qubit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Unique identifier for a classical bit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

/// Position of a bit inside a named register.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisterSlot {
    /// Register name.
    pub register: String,
    /// Index within the register.
    pub index: u32,
}

impl fmt::Display for RegisterSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.register, self.index)
    }
}

/// A quantum bit, optionally placed in a register.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qubit {
    /// The unique identifier.
    pub id: QubitId,
    /// Register placement, if any.
    pub slot: Option<RegisterSlot>,
}

impl Qubit {
    /// Create a bare qubit with just an id.
    pub fn new(id: QubitId) -> Self {
        Self { id, slot: None }
    }

    /// Create a qubit placed in a register.
    pub fn with_register(id: QubitId, register: impl Into<String>, index: u32) -> Self {
        Self {
            id,
            slot: Some(RegisterSlot {
                register: register.into(),
                index,
            }),
        }
    }

    /// Register placement as `(name, index)`, if any.
    pub fn slot(&self) -> Option<(&str, u32)> {
        self.slot.as_ref().map(|s| (s.register.as_str(), s.index))
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Some(slot) => slot.fmt(f),
            None => self.id.fmt(f),
        }
    }
}

/// A classical bit, optionally placed in a register.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clbit {
    /// The unique identifier.
    pub id: ClbitId,
    /// Register placement, if any.
    pub slot: Option<RegisterSlot>,
}

impl Clbit {
    /// Create a bare classical bit with just an id.
    pub fn new(id: ClbitId) -> Self {
        Self { id, slot: None }
    }

    /// Create a classical bit placed in a register.
    pub fn with_register(id: ClbitId, register: impl Into<String>, index: u32) -> Self {
        Self {
            id,
            slot: Some(RegisterSlot {
                register: register.into(),
                index,
            }),
        }
    }

    /// Register placement as `(name, index)`, if any.
    pub fn slot(&self) -> Option<(&str, u32)> {
        self.slot.as_ref().map(|s| (s.register.as_str(), s.index))
    }
}

impl fmt::Display for Clbit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Some(slot) => slot.fmt(f),
            None => self.id.fmt(f),
        }
    }
}
