//! A host-side roster of drones, kept as a replicated list of handles.

use netcode::{
    HandleError, HandleListExt, ListEvent, ListEventKind, NetworkBehaviour, NetworkHandle,
    NetworkIdentity, NetworkList, NetworkObject, NetworkObjectId, Registry, RegistryConfig,
    SpawnRegistry,
};

pub struct Drone {
    net: NetworkIdentity,
    pub callsign: String,
    pub battery: u32,
}

impl Drone {
    pub fn new(callsign: impl Into<String>, battery: u32) -> Self {
        Self {
            net: NetworkIdentity::new(),
            callsign: callsign.into(),
            battery,
        }
    }
}

impl NetworkBehaviour for Drone {
    fn identity(&self) -> &NetworkIdentity {
        &self.net
    }
}

/// Transform carried alongside each drone so the drone sits at index 1.
pub struct Transform {
    net: NetworkIdentity,
}

impl NetworkBehaviour for Transform {
    fn identity(&self) -> &NetworkIdentity {
        &self.net
    }
}

pub struct Roster {
    registry: SpawnRegistry,
    drones: NetworkList<NetworkHandle<Drone>>,
    spawned: u32,
}

impl Roster {
    pub fn new(config: RegistryConfig) -> Self {
        let mut drones: NetworkList<NetworkHandle<Drone>> = NetworkList::new();
        drones.subscribe(log_event);
        Self {
            registry: SpawnRegistry::with_config(config),
            drones,
            spawned: 0,
        }
    }

    pub fn registry(&self) -> &SpawnRegistry {
        &self.registry
    }

    pub fn drones(&self) -> &NetworkList<NetworkHandle<Drone>> {
        &self.drones
    }

    /// Spawns a drone on a fresh object and returns the object id.
    pub fn spawn_drone(&mut self, battery: u32) -> Result<NetworkObjectId, HandleError> {
        self.spawned += 1;
        let object = NetworkObject::new()
            .with_behaviour(Transform {
                net: NetworkIdentity::new(),
            })
            .with_behaviour(Drone::new(format!("drone-{}", self.spawned), battery));
        self.registry.spawn(object)
    }

    fn drone_in(registry: &SpawnRegistry, id: NetworkObjectId) -> Result<&Drone, HandleError> {
        registry
            .lookup(id)
            .and_then(|object| object.behaviour::<Drone>())
            .ok_or(HandleError::InvalidArgument("no drone on that object"))
    }

    pub fn add(&mut self, battery: u32) -> Result<NetworkObjectId, HandleError> {
        let id = self.spawn_drone(battery)?;
        let drone = Self::drone_in(&self.registry, id)?;
        self.drones.push_behaviour(drone)?;
        Ok(id)
    }

    pub fn insert(&mut self, index: usize, battery: u32) -> Result<NetworkObjectId, HandleError> {
        let id = self.spawn_drone(battery)?;
        let drone = Self::drone_in(&self.registry, id)?;
        self.drones.insert_behaviour(index, drone)?;
        Ok(id)
    }

    pub fn remove(&mut self, id: NetworkObjectId) -> Result<bool, HandleError> {
        let drone = Self::drone_in(&self.registry, id)?;
        Ok(self.drones.remove_behaviour(drone))
    }

    pub fn remove_at(&mut self, index: usize) -> Result<NetworkHandle<Drone>, HandleError> {
        self.drones.remove_at(index)
    }

    /// Replaces the handle at `index` with one to a freshly spawned drone.
    pub fn replace(&mut self, index: usize, battery: u32) -> Result<NetworkObjectId, HandleError> {
        let id = self.spawn_drone(battery)?;
        let handle = NetworkHandle::from_behaviour(Self::drone_in(&self.registry, id)?)?;
        self.drones.set(index, handle)?;
        Ok(id)
    }

    /// Drone at `index`, or `None` when the index is out of range or its
    /// handle no longer resolves.
    pub fn drone_at(&self, index: usize) -> Option<&Drone> {
        self.drones
            .get(index)
            .and_then(|handle| handle.try_resolve(&self.registry))
    }

    /// Whether the live drone on `id` has a handle in the roster.
    pub fn is_listed(&self, id: NetworkObjectId) -> Result<bool, HandleError> {
        let handle = NetworkHandle::from_behaviour(Self::drone_in(&self.registry, id)?)?;
        Ok(self.drones.contains(&handle))
    }

    pub fn clear(&mut self) {
        self.drones.clear();
    }

    /// Despawns without touching the list; its handle goes stale.
    pub fn despawn(&mut self, id: NetworkObjectId) -> bool {
        self.registry.despawn(id).is_some()
    }

    /// Removes drones at or below `battery`, returning their callsigns.
    pub fn recall(&mut self, battery: u32) -> Result<Vec<String>, HandleError> {
        let recalled = self
            .drones
            .remove_all_collect(&self.registry, |d| d.battery <= battery)?;
        Ok(recalled.iter().map(|d| d.callsign.clone()).collect())
    }

    pub fn prune(&mut self) -> usize {
        self.drones.remove_stale(&self.registry)
    }

    pub fn callsigns(&self) -> Result<Vec<String>, HandleError> {
        Ok(self
            .drones
            .to_vec(&self.registry)?
            .iter()
            .map(|d| d.callsign.clone())
            .collect())
    }
}

fn log_event(event: &ListEvent<NetworkHandle<Drone>>) {
    match event.kind {
        ListEventKind::Add => tracing::info!("Drone added at {:?}", event.index),
        ListEventKind::Insert => tracing::info!("Drone inserted at {:?}", event.index),
        ListEventKind::Remove => tracing::info!("Drone removed from {:?}", event.index),
        ListEventKind::RemoveAt => tracing::info!("Drone removed at {:?}", event.index),
        ListEventKind::Value => tracing::info!(
            "Drone at {:?} changed {:?} -> {:?}",
            event.index,
            event.previous_value,
            event.value
        ),
        ListEventKind::Clear => tracing::info!("Roster cleared"),
        ListEventKind::Full => tracing::info!("Roster fully refreshed"),
    }
}
