//! Query and mutation helpers for lists of handles.
//!
//! Read helpers resolve handles left to right and stop at the first handle
//! that fails to resolve, returning that error. A stale handle means the list
//! is out of sync with the spawn registry; silently skipping it would hide
//! the bug. `remove_all` and `remove_all_collect` scan fully before removing
//! anything, so a failed scan leaves the list untouched.
//!
//! Removal by behaviour compares ids only and never resolves, which is also
//! what lets stale entries be removed. [`HandleListExt::remove_stale`] drops
//! every handle whose object is no longer live.

use crate::behaviour::NetworkBehaviour;
use crate::error::Result;
use crate::handle::NetworkHandle;
use crate::list::NetworkList;
use crate::registry::Registry;
use std::slice;

/// Lazily resolves each handle of a list, in index order.
pub struct Resolved<'a, 'r, T, R: ?Sized> {
    handles: slice::Iter<'a, NetworkHandle<T>>,
    registry: &'r R,
}

impl<'a, 'r, T, R> Iterator for Resolved<'a, 'r, T, R>
where
    T: NetworkBehaviour,
    R: Registry + ?Sized,
{
    type Item = Result<&'r T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.handles.next().map(|h| h.resolve(self.registry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.handles.size_hint()
    }
}

pub trait HandleListExt<T: NetworkBehaviour> {
    /// Resolution of every handle, without collecting.
    fn resolved<'a, 'r, R>(&'a self, registry: &'r R) -> Resolved<'a, 'r, T, R>
    where
        R: Registry + ?Sized;

    /// Leftmost behaviour satisfying `predicate`.
    fn find<'r, R, P>(&self, registry: &'r R, predicate: P) -> Result<Option<&'r T>>
    where
        R: Registry + ?Sized,
        P: FnMut(&T) -> bool;

    /// Every behaviour satisfying `predicate`, in list order.
    fn find_all<'r, R, P>(&self, registry: &'r R, predicate: P) -> Result<Vec<&'r T>>
    where
        R: Registry + ?Sized,
        P: FnMut(&T) -> bool;

    fn push_behaviour(&mut self, behaviour: &T) -> Result<()>;

    /// Inserts a handle to `behaviour` at `index` (`0..=len`).
    fn insert_behaviour(&mut self, index: usize, behaviour: &T) -> Result<()>;

    /// Removes the first handle pointing at `behaviour`. Returns false if there is none.
    fn remove_behaviour(&mut self, behaviour: &T) -> bool;

    /// Removes every handle whose behaviour satisfies `predicate`. Returns the count.
    fn remove_all<'r, R, P>(&mut self, registry: &'r R, predicate: P) -> Result<usize>
    where
        R: Registry + ?Sized,
        P: FnMut(&T) -> bool;

    /// Like [`HandleListExt::remove_all`], returning the removed behaviours in scan order.
    fn remove_all_collect<'r, R, P>(&mut self, registry: &'r R, predicate: P) -> Result<Vec<&'r T>>
    where
        R: Registry + ?Sized,
        P: FnMut(&T) -> bool;

    /// Drops handles whose object is no longer spawned. Returns the count.
    fn remove_stale<R>(&mut self, registry: &R) -> usize
    where
        R: Registry + ?Sized;

    /// Snapshot of the resolved behaviours; later list edits do not affect it.
    fn to_vec<'r, R>(&self, registry: &'r R) -> Result<Vec<&'r T>>
    where
        R: Registry + ?Sized;

    /// Resolved behaviours collected into any ordered container.
    fn collect_resolved<'r, R, C>(&self, registry: &'r R) -> Result<C>
    where
        R: Registry + ?Sized,
        C: FromIterator<&'r T>;

    fn for_each_resolved<R, F>(&self, registry: &R, action: F) -> Result<()>
    where
        R: Registry + ?Sized,
        F: FnMut(&T);

    /// True as soon as one behaviour satisfies `predicate`.
    fn any<R, P>(&self, registry: &R, predicate: P) -> Result<bool>
    where
        R: Registry + ?Sized,
        P: FnMut(&T) -> bool;
}

impl<T: NetworkBehaviour> HandleListExt<T> for NetworkList<NetworkHandle<T>> {
    fn resolved<'a, 'r, R>(&'a self, registry: &'r R) -> Resolved<'a, 'r, T, R>
    where
        R: Registry + ?Sized,
    {
        Resolved {
            handles: self.as_slice().iter(),
            registry,
        }
    }

    fn find<'r, R, P>(&self, registry: &'r R, mut predicate: P) -> Result<Option<&'r T>>
    where
        R: Registry + ?Sized,
        P: FnMut(&T) -> bool,
    {
        for behaviour in self.resolved(registry) {
            let behaviour = behaviour?;
            if predicate(behaviour) {
                return Ok(Some(behaviour));
            }
        }
        Ok(None)
    }

    fn find_all<'r, R, P>(&self, registry: &'r R, predicate: P) -> Result<Vec<&'r T>>
    where
        R: Registry + ?Sized,
        P: FnMut(&T) -> bool,
    {
        Ok(matching(self, registry, predicate)?
            .into_iter()
            .map(|(_, behaviour)| behaviour)
            .collect())
    }

    fn push_behaviour(&mut self, behaviour: &T) -> Result<()> {
        self.push(NetworkHandle::from_behaviour(behaviour)?);
        Ok(())
    }

    fn insert_behaviour(&mut self, index: usize, behaviour: &T) -> Result<()> {
        let handle = NetworkHandle::from_behaviour(behaviour)?;
        self.insert(index, handle)
    }

    fn remove_behaviour(&mut self, behaviour: &T) -> bool {
        let found = self
            .iter()
            .position(|h| h.matches(behaviour))
            .and_then(|index| self.get(index).copied());
        match found {
            Some(handle) => self.remove(&handle),
            None => false,
        }
    }

    fn remove_all<'r, R, P>(&mut self, registry: &'r R, predicate: P) -> Result<usize>
    where
        R: Registry + ?Sized,
        P: FnMut(&T) -> bool,
    {
        Ok(self.remove_all_collect(registry, predicate)?.len())
    }

    fn remove_all_collect<'r, R, P>(&mut self, registry: &'r R, predicate: P) -> Result<Vec<&'r T>>
    where
        R: Registry + ?Sized,
        P: FnMut(&T) -> bool,
    {
        let found = matching(self, registry, predicate)?;
        let mut removed = Vec::with_capacity(found.len());
        for (handle, behaviour) in found {
            if self.remove(&handle) {
                removed.push(behaviour);
            }
        }
        tracing::debug!("Removed {} matching handles, {} left", removed.len(), self.len());
        Ok(removed)
    }

    fn remove_stale<R>(&mut self, registry: &R) -> usize
    where
        R: Registry + ?Sized,
    {
        // Only a despawned object makes a handle stale. A live object whose
        // slot holds another type is a caller bug and stays visible to reads.
        let stale: Vec<NetworkHandle<T>> = self
            .iter()
            .filter(|h| !registry.is_spawned(h.object_id()))
            .copied()
            .collect();
        let mut count = 0;
        for handle in &stale {
            if self.remove(handle) {
                count += 1;
            }
        }
        if count > 0 {
            tracing::debug!("Dropped {} stale handles", count);
        }
        count
    }

    fn to_vec<'r, R>(&self, registry: &'r R) -> Result<Vec<&'r T>>
    where
        R: Registry + ?Sized,
    {
        self.collect_resolved(registry)
    }

    fn collect_resolved<'r, R, C>(&self, registry: &'r R) -> Result<C>
    where
        R: Registry + ?Sized,
        C: FromIterator<&'r T>,
    {
        self.resolved(registry).collect()
    }

    fn for_each_resolved<R, F>(&self, registry: &R, mut action: F) -> Result<()>
    where
        R: Registry + ?Sized,
        F: FnMut(&T),
    {
        for behaviour in self.resolved(registry) {
            action(behaviour?);
        }
        Ok(())
    }

    fn any<R, P>(&self, registry: &R, predicate: P) -> Result<bool>
    where
        R: Registry + ?Sized,
        P: FnMut(&T) -> bool,
    {
        Ok(self.find(registry, predicate)?.is_some())
    }
}

/// Handles and behaviours satisfying `predicate`, in list order.
fn matching<'r, T, R, P>(
    list: &NetworkList<NetworkHandle<T>>,
    registry: &'r R,
    mut predicate: P,
) -> Result<Vec<(NetworkHandle<T>, &'r T)>>
where
    T: NetworkBehaviour,
    R: Registry + ?Sized,
    P: FnMut(&T) -> bool,
{
    let mut out = Vec::new();
    for handle in list.iter() {
        let behaviour = handle.resolve(registry)?;
        if predicate(behaviour) {
            out.push((*handle, behaviour));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviour::{NetworkIdentity, NetworkObject};
    use crate::error::HandleError;
    use crate::ids::{BehaviourId, NetworkObjectId};
    use crate::registry::SpawnRegistry;

    struct Crate {
        net: NetworkIdentity,
        label: char,
    }

    impl NetworkBehaviour for Crate {
        fn identity(&self) -> &NetworkIdentity {
            &self.net
        }
    }

    /// Spawns one object per label and lists a handle to each, in order.
    fn setup(labels: &str) -> (SpawnRegistry, NetworkList<NetworkHandle<Crate>>, Vec<NetworkObjectId>) {
        let mut registry = SpawnRegistry::new();
        let mut ids = Vec::new();
        for label in labels.chars() {
            let object = NetworkObject::new().with_behaviour(Crate {
                net: NetworkIdentity::new(),
                label,
            });
            ids.push(registry.spawn(object).unwrap());
        }
        let mut list = NetworkList::new();
        for id in &ids {
            let behaviour = registry.lookup(*id).unwrap().behaviour::<Crate>().unwrap();
            list.push_behaviour(behaviour).unwrap();
        }
        (registry, list, ids)
    }

    fn labels(list: &NetworkList<NetworkHandle<Crate>>, registry: &SpawnRegistry) -> String {
        list.to_vec(registry).unwrap().iter().map(|c| c.label).collect()
    }

    #[test]
    fn test_find_is_leftmost() {
        let (registry, list, ids) = setup("ABCB");
        let found = list.find(&registry, |c| c.label == 'B').unwrap().unwrap();
        assert_eq!(found.network_object_id(), Some(ids[1]));
        assert!(list.find(&registry, |c| c.label == 'Z').unwrap().is_none());
    }

    #[test]
    fn test_find_all_keeps_order() {
        let (registry, list, ids) = setup("ABCB");
        let found: Vec<Option<NetworkObjectId>> = list
            .find_all(&registry, |c| c.label == 'B')
            .unwrap()
            .iter()
            .map(|c| c.network_object_id())
            .collect();
        assert_eq!(found, vec![Some(ids[1]), Some(ids[3])]);
        assert!(list.find_all(&registry, |_| false).unwrap().is_empty());
    }

    #[test]
    fn test_insert_behaviour_bounds() {
        let (registry, mut list, ids) = setup("AB");
        let b = registry.lookup(ids[1]).unwrap().behaviour::<Crate>().unwrap();
        list.insert_behaviour(0, b).unwrap();
        list.insert_behaviour(3, b).unwrap();
        assert_eq!(labels(&list, &registry), "BABB");
        assert_eq!(
            list.insert_behaviour(5, b),
            Err(HandleError::IndexOutOfRange { index: 5, len: 4 })
        );

        let loose = Crate {
            net: NetworkIdentity::new(),
            label: 'L',
        };
        assert!(matches!(
            list.push_behaviour(&loose),
            Err(HandleError::InvalidArgument(_))
        ));
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_remove_behaviour_absent_is_noop() {
        let (mut registry, mut list, ids) = setup("ABC");
        let other = registry
            .spawn(NetworkObject::new().with_behaviour(Crate {
                net: NetworkIdentity::new(),
                label: 'D',
            }))
            .unwrap();
        let d = registry.lookup(other).unwrap().behaviour::<Crate>().unwrap();
        assert!(!list.remove_behaviour(d));
        assert_eq!(labels(&list, &registry), "ABC");

        let b = registry.lookup(ids[1]).unwrap().behaviour::<Crate>().unwrap();
        assert!(list.remove_behaviour(b));
        assert_eq!(labels(&list, &registry), "AC");
    }

    #[test]
    fn test_remove_all_counts_and_preserves_rest() {
        let (registry, mut list, _) = setup("ABAC");
        assert_eq!(list.remove_all(&registry, |c| c.label == 'A').unwrap(), 2);
        assert_eq!(labels(&list, &registry), "BC");
    }

    #[test]
    fn test_remove_all_collect_scan_order() {
        let (registry, mut list, ids) = setup("XYXZX");
        let removed: Vec<Option<NetworkObjectId>> = list
            .remove_all_collect(&registry, |c| c.label == 'X')
            .unwrap()
            .iter()
            .map(|c| c.network_object_id())
            .collect();
        assert_eq!(removed, vec![Some(ids[0]), Some(ids[2]), Some(ids[4])]);
        assert_eq!(labels(&list, &registry), "YZ");
    }

    #[test]
    fn test_stale_handle_propagates() {
        let (mut registry, mut list, ids) = setup("ABC");
        registry.despawn(ids[1]);

        let expected = HandleError::NotFound {
            object_id: ids[1],
            behaviour_id: BehaviourId(0),
        };
        assert_eq!(list.to_vec(&registry).err(), Some(expected.clone()));
        assert_eq!(list.any(&registry, |c| c.label == 'C').err(), Some(expected.clone()));
        // Match found before the stale entry short-circuits
        assert_eq!(list.any(&registry, |c| c.label == 'A'), Ok(true));
        assert_eq!(list.remove_all(&registry, |_| true).err(), Some(expected));
        assert_eq!(list.len(), 3);

        let mut seen = Vec::new();
        assert!(list.for_each_resolved(&registry, |c| seen.push(c.label)).is_err());
        assert_eq!(seen, vec!['A']);

        assert_eq!(list.remove_stale(&registry), 1);
        assert_eq!(labels(&list, &registry), "AC");
    }

    struct Pallet {
        net: NetworkIdentity,
    }

    impl NetworkBehaviour for Pallet {
        fn identity(&self) -> &NetworkIdentity {
            &self.net
        }
    }

    #[test]
    fn test_remove_stale_keeps_live_objects() {
        let (mut registry, mut list, ids) = setup("AB");
        let mixed = registry
            .spawn(
                NetworkObject::new()
                    .with_behaviour(Pallet {
                        net: NetworkIdentity::new(),
                    })
                    .with_behaviour(Crate {
                        net: NetworkIdentity::new(),
                        label: 'M',
                    }),
            )
            .unwrap();
        let wrong_kind = NetworkHandle::<Crate>::new(mixed, BehaviourId(0));
        let past_end = NetworkHandle::<Crate>::new(mixed, BehaviourId(7));
        list.push(NetworkHandle::new(mixed, BehaviourId(1)));
        list.push(wrong_kind);
        list.push(past_end);
        registry.despawn(ids[0]);

        // Only the despawned object's handle goes
        assert_eq!(list.remove_stale(&registry), 1);
        assert_eq!(list.len(), 4);
        assert!(list.contains(&wrong_kind));
        assert!(list.contains(&past_end));
        assert!(matches!(
            list.to_vec(&registry),
            Err(HandleError::TypeMismatch { .. })
        ));
        assert_eq!(list.remove_stale(&registry), 0);
    }

    #[test]
    fn test_snapshot_is_decoupled() {
        let (registry, mut list, _) = setup("AB");
        let snapshot: Vec<&Crate> = list.collect_resolved(&registry).unwrap();
        list.clear();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].label, 'B');
        assert!(list.to_vec(&registry).unwrap().is_empty());
    }
}
