//! Typed weak references to networked behaviours, and helpers for the
//! replicated lists that hold them.
//!
//! A [`NetworkHandle<T>`] names a behaviour by `(object id, behaviour index)`
//! and resolves against a [`Registry`] of live objects on demand. A
//! [`NetworkList`] of handles gets search, filter and bulk-removal helpers
//! through [`HandleListExt`].

pub mod arena;
pub mod behaviour;
pub mod error;
pub mod handle;
pub mod helpers;
pub mod ids;
pub mod list;
pub mod registry;

// Re-export commonly used types
pub use behaviour::{NetworkBehaviour, NetworkIdentity, NetworkObject};
pub use error::HandleError;
pub use handle::{NetworkHandle, HANDLE_WIRE_SIZE};
pub use helpers::HandleListExt;
pub use ids::{BehaviourId, NetworkObjectId};
pub use list::{ListEvent, ListEventKind, NetworkList, SubscriptionId};
pub use registry::{Registry, RegistryConfig, SpawnRegistry};
