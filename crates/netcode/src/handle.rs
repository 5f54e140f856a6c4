//! Typed weak reference to a networked behaviour.
//!
//! A [`NetworkHandle<T>`] stores only the object id and the behaviour's
//! registration index. It never keeps the behaviour alive and stays valid to
//! copy, compare and serialize after the object is gone; [`resolve`] is what
//! tells whether it still points at something live.
//!
//! Wire layout (10 bytes, little-endian, no tag or length prefix):
//!
//! ```text
//! [ object id (8 bytes) ][ behaviour id (2 bytes) ]
//! ```
//!
//! The serde form serializes the same two fields in the same order, so
//! bincode's default options produce exactly these bytes.
//!
//! [`resolve`]: NetworkHandle::resolve

use crate::behaviour::NetworkBehaviour;
use crate::error::{HandleError, Result};
use crate::ids::{BehaviourId, NetworkObjectId};
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Encoded size of a handle.
pub const HANDLE_WIRE_SIZE: usize = 10;

const OBJECT_ID_SIZE: usize = 8;

#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct NetworkHandle<T> {
    object_id: NetworkObjectId,
    behaviour_id: BehaviourId,
    #[serde(skip)]
    kind: PhantomData<fn() -> T>,
}

impl<T> NetworkHandle<T> {
    /// Handle from raw ids. Validity is only checked by [`NetworkHandle::resolve`].
    pub const fn new(object_id: NetworkObjectId, behaviour_id: BehaviourId) -> Self {
        Self {
            object_id,
            behaviour_id,
            kind: PhantomData,
        }
    }

    #[inline]
    pub fn object_id(&self) -> NetworkObjectId {
        self.object_id
    }

    #[inline]
    pub fn behaviour_id(&self) -> BehaviourId {
        self.behaviour_id
    }

    #[inline]
    pub fn matches_ids(&self, object_id: NetworkObjectId, behaviour_id: BehaviourId) -> bool {
        self.object_id == object_id && self.behaviour_id == behaviour_id
    }

    pub fn to_bytes(&self) -> [u8; HANDLE_WIRE_SIZE] {
        let mut out = [0u8; HANDLE_WIRE_SIZE];
        out[..OBJECT_ID_SIZE].copy_from_slice(&self.object_id.0.to_le_bytes());
        out[OBJECT_ID_SIZE..].copy_from_slice(&self.behaviour_id.0.to_le_bytes());
        out
    }

    /// Decodes one handle; `bytes` must be exactly [`HANDLE_WIRE_SIZE`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != HANDLE_WIRE_SIZE {
            return Err(HandleError::WrongLength {
                expected: HANDLE_WIRE_SIZE,
                found: bytes.len(),
            });
        }
        let mut object = [0u8; OBJECT_ID_SIZE];
        object.copy_from_slice(&bytes[..OBJECT_ID_SIZE]);
        let behaviour = [bytes[OBJECT_ID_SIZE], bytes[OBJECT_ID_SIZE + 1]];
        Ok(Self::new(
            NetworkObjectId(u64::from_le_bytes(object)),
            BehaviourId(u16::from_le_bytes(behaviour)),
        ))
    }

    /// Same ids, different behaviour type.
    pub fn cast<U>(self) -> NetworkHandle<U> {
        NetworkHandle::new(self.object_id, self.behaviour_id)
    }
}

impl<T: NetworkBehaviour> NetworkHandle<T> {
    /// Handle pointing at a spawned behaviour.
    ///
    /// Fails with `InvalidArgument` if the behaviour was never spawned.
    pub fn from_behaviour(behaviour: &T) -> Result<Self> {
        match behaviour.identity().ids() {
            Some((object_id, behaviour_id)) => Ok(Self::new(object_id, behaviour_id)),
            None => Err(HandleError::InvalidArgument(
                "behaviour has not been spawned",
            )),
        }
    }

    /// True if `behaviour` carries this handle's ids. Never-spawned behaviours match nothing.
    #[inline]
    pub fn matches(&self, behaviour: &T) -> bool {
        behaviour
            .identity()
            .ids()
            .is_some_and(|(object_id, behaviour_id)| self.matches_ids(object_id, behaviour_id))
    }

    /// Looks the behaviour up in `registry`.
    ///
    /// The reference borrows the registry, so it cannot outlive a despawn.
    pub fn resolve<'r, R>(&self, registry: &'r R) -> Result<&'r T>
    where
        R: Registry + ?Sized,
    {
        let not_found = HandleError::NotFound {
            object_id: self.object_id,
            behaviour_id: self.behaviour_id,
        };
        let object = registry.lookup(self.object_id).ok_or(not_found.clone())?;
        let behaviour = object.behaviour_at(self.behaviour_id).ok_or(not_found)?;

        match behaviour.as_any().downcast_ref::<T>() {
            Some(resolved) => {
                tracing::trace!("Resolved {:?}", self);
                Ok(resolved)
            }
            None => Err(HandleError::TypeMismatch {
                object_id: self.object_id,
                behaviour_id: self.behaviour_id,
                expected: std::any::type_name::<T>(),
                found: behaviour.type_name(),
            }),
        }
    }

    /// `resolve` with failures mapped to `None`.
    #[inline]
    pub fn try_resolve<'r, R>(&self, registry: &'r R) -> Option<&'r T>
    where
        R: Registry + ?Sized,
    {
        self.resolve(registry).ok()
    }
}

impl<T> Clone for NetworkHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NetworkHandle<T> {}

impl<T> PartialEq for NetworkHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.matches_ids(other.object_id, other.behaviour_id)
    }
}

impl<T> Eq for NetworkHandle<T> {}

impl<T> Hash for NetworkHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.object_id.hash(state);
        self.behaviour_id.hash(state);
    }
}

impl<T> fmt::Debug for NetworkHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkHandle")
            .field("object_id", &self.object_id.0)
            .field("behaviour_id", &self.behaviour_id.0)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviour::{NetworkIdentity, NetworkObject};
    use crate::registry::SpawnRegistry;

    struct Door {
        net: NetworkIdentity,
        open: bool,
    }

    impl NetworkBehaviour for Door {
        fn identity(&self) -> &NetworkIdentity {
            &self.net
        }
    }

    struct Lamp {
        net: NetworkIdentity,
    }

    impl NetworkBehaviour for Lamp {
        fn identity(&self) -> &NetworkIdentity {
            &self.net
        }
    }

    fn door(open: bool) -> Door {
        Door {
            net: NetworkIdentity::new(),
            open,
        }
    }

    fn lamp() -> Lamp {
        Lamp {
            net: NetworkIdentity::new(),
        }
    }

    #[test]
    fn test_resolve_returns_same_instance() {
        let mut registry = SpawnRegistry::new();
        let id = registry
            .spawn(NetworkObject::new().with_behaviour(lamp()).with_behaviour(door(true)))
            .unwrap();
        let spawned = registry.lookup(id).unwrap().behaviour::<Door>().unwrap();
        let handle = NetworkHandle::from_behaviour(spawned).unwrap();
        assert_eq!(handle.behaviour_id(), BehaviourId(1));

        let resolved = handle.resolve(&registry).unwrap();
        assert!(std::ptr::eq(resolved, spawned));
        assert!(resolved.open);
        assert!(handle.matches(resolved));
    }

    #[test]
    fn test_unspawned_behaviour_is_invalid_argument() {
        let loose = door(false);
        assert!(matches!(
            NetworkHandle::from_behaviour(&loose),
            Err(HandleError::InvalidArgument(_))
        ));
        let handle: NetworkHandle<Door> = NetworkHandle::new(NetworkObjectId(1), BehaviourId(0));
        assert!(!handle.matches(&loose));
    }

    #[test]
    fn test_resolve_errors() {
        let mut registry = SpawnRegistry::new();
        let id = registry.spawn(NetworkObject::new().with_behaviour(lamp())).unwrap();

        let missing: NetworkHandle<Lamp> = NetworkHandle::new(NetworkObjectId(99), BehaviourId(0));
        assert_eq!(
            missing.resolve(&registry).err(),
            Some(HandleError::NotFound {
                object_id: NetworkObjectId(99),
                behaviour_id: BehaviourId(0),
            })
        );

        let past_end: NetworkHandle<Lamp> = NetworkHandle::new(id, BehaviourId(3));
        assert!(matches!(past_end.resolve(&registry), Err(HandleError::NotFound { .. })));

        let wrong_kind: NetworkHandle<Door> = NetworkHandle::new(id, BehaviourId(0));
        match wrong_kind.resolve(&registry) {
            Err(HandleError::TypeMismatch { expected, found, .. }) => {
                assert!(expected.ends_with("Door"));
                assert!(found.ends_with("Lamp"));
            }
            other => panic!("expected type mismatch, got {:?}", other.map(|d| d.open)),
        }
        assert!(wrong_kind.try_resolve(&registry).is_none());
    }

    #[test]
    fn test_stale_after_despawn() {
        let mut registry = SpawnRegistry::new();
        let id = registry.spawn(NetworkObject::new().with_behaviour(door(false))).unwrap();
        let handle = NetworkHandle::<Door>::new(id, BehaviourId(0));
        assert!(handle.resolve(&registry).is_ok());

        let object = registry.despawn(id).unwrap();
        assert!(matches!(handle.resolve(&registry), Err(HandleError::NotFound { .. })));
        // The despawned instance still compares equal by ids
        assert!(handle.matches(object.behaviour::<Door>().unwrap()));
    }

    #[test]
    fn test_equality_is_by_ids() {
        let a: NetworkHandle<Door> = NetworkHandle::new(NetworkObjectId(5), BehaviourId(2));
        let b: NetworkHandle<Door> = NetworkHandle::new(NetworkObjectId(5), BehaviourId(2));
        let c: NetworkHandle<Door> = NetworkHandle::new(NetworkObjectId(5), BehaviourId(2));
        let other: NetworkHandle<Door> = NetworkHandle::new(NetworkObjectId(5), BehaviourId(3));

        assert_eq!(a, a);
        assert_eq!(a, b);
        assert_eq!(b, a);
        assert_eq!(b, c);
        assert_eq!(a, c);
        assert_ne!(a, other);
        assert!(a.matches_ids(NetworkObjectId(5), BehaviourId(2)));
        assert!(!a.matches_ids(NetworkObjectId(6), BehaviourId(2)));
    }

    #[test]
    fn test_wire_layout() {
        let handle: NetworkHandle<Door> =
            NetworkHandle::new(NetworkObjectId(0x0102_0304_0506_0708), BehaviourId(0x0A0B));
        let bytes = handle.to_bytes();
        assert_eq!(bytes, [0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 0x0B, 0x0A]);

        let encoded = bincode::serialize(&handle).unwrap();
        assert_eq!(encoded.len(), HANDLE_WIRE_SIZE);
        assert_eq!(encoded.as_slice(), &bytes[..]);

        let decoded: NetworkHandle<Door> = bincode::deserialize(&encoded).unwrap();
        assert_eq!(decoded, handle);
        assert_eq!(NetworkHandle::<Door>::from_bytes(&bytes).unwrap(), handle);
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        assert_eq!(
            NetworkHandle::<Door>::from_bytes(&[0u8; 9]),
            Err(HandleError::WrongLength {
                expected: HANDLE_WIRE_SIZE,
                found: 9,
            })
        );

        // A valid record followed by one stray byte
        let handle: NetworkHandle<Door> = NetworkHandle::new(NetworkObjectId(7), BehaviourId(1));
        let mut padded = handle.to_bytes().to_vec();
        padded.push(0xFF);
        assert_eq!(
            NetworkHandle::<Door>::from_bytes(&padded),
            Err(HandleError::WrongLength {
                expected: HANDLE_WIRE_SIZE,
                found: 11,
            })
        );
        assert_eq!(NetworkHandle::<Door>::from_bytes(&padded[..HANDLE_WIRE_SIZE]), Ok(handle));
    }

    #[test]
    fn test_json_form_has_two_fields() {
        let handle: NetworkHandle<Door> = NetworkHandle::new(NetworkObjectId(3), BehaviourId(1));
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, r#"{"object_id":3,"behaviour_id":1}"#);
    }
}
