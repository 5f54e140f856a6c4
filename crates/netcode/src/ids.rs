// ids.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Id of a spawned network object (the container of behaviours).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NetworkObjectId(pub u64);

/// Registration order of a behaviour inside its network object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct BehaviourId(pub u16);

impl BehaviourId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u64> for NetworkObjectId {
    fn from(v: u64) -> Self {
        NetworkObjectId(v)
    }
}

impl From<u16> for BehaviourId {
    fn from(v: u16) -> Self {
        BehaviourId(v)
    }
}

impl fmt::Display for NetworkObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for BehaviourId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
