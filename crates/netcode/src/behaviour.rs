//! Networked behaviours and the objects that carry them.
//!
//! A [`NetworkObject`] is an ordered bag of behaviours. Once spawned, every
//! behaviour knows which object it lives on and its registration order there
//! through the [`NetworkIdentity`] it embeds.

use crate::ids::{BehaviourId, NetworkObjectId};
use std::any::Any;
use std::cell::Cell;
use std::fmt;

/// Object-safe access to `Any` for behaviour trait objects.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A component that can be attached to a network object and referenced by handle.
///
/// ```ignore
/// struct Turret { net: NetworkIdentity, ammo: u32 }
///
/// impl NetworkBehaviour for Turret {
///     fn identity(&self) -> &NetworkIdentity { &self.net }
/// }
/// ```
pub trait NetworkBehaviour: AsAny {
    fn identity(&self) -> &NetworkIdentity;

    #[inline]
    fn network_object_id(&self) -> Option<NetworkObjectId> {
        self.identity().object_id()
    }

    #[inline]
    fn behaviour_id(&self) -> Option<BehaviourId> {
        self.identity().behaviour_id()
    }
}

/// Identity slot filled in by the spawn registry.
///
/// Empty until spawn. Despawning keeps the last ids so stale handles still
/// compare equal to the instance.
#[derive(Default)]
pub struct NetworkIdentity {
    object_id: Cell<Option<NetworkObjectId>>,
    behaviour_id: Cell<Option<BehaviourId>>,
}

impl NetworkIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn object_id(&self) -> Option<NetworkObjectId> {
        self.object_id.get()
    }

    #[inline]
    pub fn behaviour_id(&self) -> Option<BehaviourId> {
        self.behaviour_id.get()
    }

    /// Both ids, or `None` if the owner was never spawned.
    #[inline]
    pub fn ids(&self) -> Option<(NetworkObjectId, BehaviourId)> {
        Some((self.object_id.get()?, self.behaviour_id.get()?))
    }

    pub(crate) fn bind(&self, object_id: NetworkObjectId, behaviour_id: BehaviourId) {
        self.object_id.set(Some(object_id));
        self.behaviour_id.set(Some(behaviour_id));
    }
}

impl fmt::Debug for NetworkIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkIdentity")
            .field("object_id", &self.object_id.get())
            .field("behaviour_id", &self.behaviour_id.get())
            .finish()
    }
}

/// Container of behaviours, addressed by registration order.
#[derive(Default)]
pub struct NetworkObject {
    id: Option<NetworkObjectId>,
    behaviours: Vec<Box<dyn NetworkBehaviour>>,
}

impl NetworkObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behaviour<B: NetworkBehaviour>(mut self, behaviour: B) -> Self {
        self.add_behaviour(behaviour);
        self
    }

    /// Appends a behaviour; its `BehaviourId` is its position.
    pub fn add_behaviour<B: NetworkBehaviour>(&mut self, behaviour: B) {
        self.behaviours.push(Box::new(behaviour));
    }

    /// Id assigned at spawn.
    pub fn id(&self) -> Option<NetworkObjectId> {
        self.id
    }

    pub fn behaviour_count(&self) -> usize {
        self.behaviours.len()
    }

    pub fn behaviour_at(&self, id: BehaviourId) -> Option<&dyn NetworkBehaviour> {
        self.behaviours.get(id.index()).map(|b| &**b)
    }

    /// First behaviour of type `B`, in registration order.
    pub fn behaviour<B: NetworkBehaviour>(&self) -> Option<&B> {
        self.behaviours()
            .find_map(|b| (*b).as_any().downcast_ref::<B>())
    }

    /// Behaviours in registration order, so the position is the `BehaviourId`.
    pub fn behaviours(&self) -> impl Iterator<Item = &dyn NetworkBehaviour> {
        self.behaviours.iter().map(|b| &**b)
    }

    pub(crate) fn bind(&mut self, id: NetworkObjectId) {
        self.id = Some(id);
        for (index, behaviour) in self.behaviours().enumerate() {
            behaviour.identity().bind(id, BehaviourId(index as u16));
        }
    }
}

impl fmt::Debug for NetworkObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<&'static str> = self.behaviours().map(|b| (*b).type_name()).collect();
        f.debug_struct("NetworkObject")
            .field("id", &self.id)
            .field("behaviours", &kinds)
            .finish()
    }
}
