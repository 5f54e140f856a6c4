//! Live-object registry.
//!
//! [`Registry`] is the seam handles resolve through. [`SpawnRegistry`] is the
//! in-process implementation: it hands out object ids on spawn, binds every
//! behaviour's identity, and forgets the object on despawn.

use crate::arena::Arena;
use crate::behaviour::NetworkObject;
use crate::error::{HandleError, Result};
use crate::ids::NetworkObjectId;
use serde::{Deserialize, Serialize};

/// Lookup of currently spawned network objects.
pub trait Registry {
    fn lookup(&self, id: NetworkObjectId) -> Option<&NetworkObject>;

    #[inline]
    fn is_spawned(&self, id: NetworkObjectId) -> bool {
        self.lookup(id).is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Slots reserved up front
    pub initial_capacity: usize,

    /// Id given to the first spawned object
    pub first_object_id: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
            first_object_id: 1,
        }
    }
}

/// Owns spawned objects and assigns their ids.
#[derive(Debug)]
pub struct SpawnRegistry {
    objects: Arena<NetworkObject, NetworkObjectId>,
    // None once u64::MAX has been handed out
    next_id: Option<u64>,
}

impl SpawnRegistry {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            objects: Arena::with_capacity(config.initial_capacity),
            next_id: Some(config.first_object_id),
        }
    }

    /// Registers `object` as live and binds the identity of each behaviour.
    ///
    /// Ids are never reused by the same registry, so once the id space is
    /// used up every further spawn fails with [`HandleError::IdsExhausted`].
    pub fn spawn(&mut self, mut object: NetworkObject) -> Result<NetworkObjectId> {
        let count = object.behaviour_count();
        if count > u16::MAX as usize + 1 {
            return Err(HandleError::TooManyBehaviours { count });
        }

        let Some(raw) = self.next_id else {
            tracing::warn!("Spawn refused: network object ids exhausted");
            return Err(HandleError::IdsExhausted);
        };
        let id = NetworkObjectId(raw);
        self.next_id = raw.checked_add(1);
        object.bind(id);
        tracing::debug!("Spawned network object {} with {} behaviours", id, count);
        self.objects.set(id, object);
        Ok(id)
    }

    /// Removes the object from the live set and hands it back.
    ///
    /// Behaviours keep their ids, so handles pointing at them go stale
    /// instead of being rewritten.
    pub fn despawn(&mut self, id: NetworkObjectId) -> Option<NetworkObject> {
        let object = self.objects.remove(id);
        if object.is_some() {
            tracing::debug!("Despawned network object {}", id);
        } else {
            tracing::warn!("Despawn of unknown network object {}", id);
        }
        object
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Ids of live objects, ascending.
    pub fn ids(&self) -> Vec<NetworkObjectId> {
        let mut ids: Vec<NetworkObjectId> = self.objects.iter().map(|(id, _)| id).collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for SpawnRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry for SpawnRegistry {
    #[inline]
    fn lookup(&self, id: NetworkObjectId) -> Option<&NetworkObject> {
        self.objects.get(id)
    }
}
