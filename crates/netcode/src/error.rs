//! Errors raised while resolving handles or editing handle lists.

use crate::ids::{BehaviourId, NetworkObjectId};

/// Errors that can occur when working with network handles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    /// The object is not spawned, or it has no behaviour at that index
    NotFound {
        object_id: NetworkObjectId,
        behaviour_id: BehaviourId,
    },

    /// The behaviour exists but is not of the requested type
    TypeMismatch {
        object_id: NetworkObjectId,
        behaviour_id: BehaviourId,
        expected: &'static str,
        found: &'static str,
    },

    /// A behaviour was required to be spawned and is not
    InvalidArgument(&'static str),

    /// Positional access outside `0..=len` (insert) or `0..len` (others)
    IndexOutOfRange { index: usize, len: usize },

    /// Buffer is not exactly one encoded handle
    WrongLength { expected: usize, found: usize },

    /// The registry has handed out every object id
    IdsExhausted,

    /// Object carries more behaviours than a `BehaviourId` can address
    TooManyBehaviours { count: usize },
}

impl std::fmt::Display for HandleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleError::NotFound {
                object_id,
                behaviour_id,
            } => write!(
                f,
                "No live behaviour {} on network object {}",
                behaviour_id, object_id
            ),
            HandleError::TypeMismatch {
                object_id,
                behaviour_id,
                expected,
                found,
            } => write!(
                f,
                "Behaviour {} on network object {} is {}, expected {}",
                behaviour_id, object_id, found, expected
            ),
            HandleError::InvalidArgument(s) => write!(f, "Invalid argument: {}", s),
            HandleError::IndexOutOfRange { index, len } => {
                write!(f, "Index {} out of range for list of length {}", index, len)
            }
            HandleError::WrongLength { expected, found } => write!(
                f,
                "Handle needs exactly {} bytes, buffer has {}",
                expected, found
            ),
            HandleError::IdsExhausted => write!(f, "No network object ids left to assign"),
            HandleError::TooManyBehaviours { count } => write!(
                f,
                "Network object has {} behaviours, at most {} are addressable",
                count,
                u16::MAX as usize + 1
            ),
        }
    }
}

impl std::error::Error for HandleError {}

pub type Result<T, E = HandleError> = std::result::Result<T, E>;
