//! Object metadata, one JSON map keyed by object key.

use std::collections::BTreeMap;

use renter_core::{Object, ObjectStore, ServiceError};

use crate::{LocalNetwork, OBJECTS_FILE};

type Objects = BTreeMap<String, Object>;

impl ObjectStore for LocalNetwork {
    fn add_object(&self, key: &str, object: &Object) -> Result<(), ServiceError> {
        let replaced = self.update_json(OBJECTS_FILE, |objects: &mut Objects| {
            objects.insert(key.to_string(), object.clone()).is_some()
        })?;
        tracing::debug!(key, replaced, slices = object.slabs.len(), "stored object");
        Ok(())
    }

    fn object(&self, key: &str) -> Result<Object, ServiceError> {
        let mut objects: Objects = self.read_json(OBJECTS_FILE)?;
        objects
            .remove(key)
            .ok_or_else(|| ServiceError::NotFound(format!("object {key:?}")))
    }

    fn object_keys(&self, prefix: &str) -> Result<Vec<String>, ServiceError> {
        let objects: Objects = self.read_json(OBJECTS_FILE)?;
        Ok(objects
            .into_keys()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renter_core::EncryptionKey;

    fn object(key: &str) -> Object {
        Object {
            key: key.into(),
            encryption_key: EncryptionKey([9; 32]),
            slabs: vec![],
        }
    }

    #[test]
    fn keys_are_sorted_and_prefix_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let net = LocalNetwork::open(dir.path()).unwrap();
        for key in ["photos/b.jpg", "notes.txt", "photos/a.jpg"] {
            net.add_object(key, &object(key)).unwrap();
        }
        assert_eq!(
            net.object_keys("photos/").unwrap(),
            vec!["photos/a.jpg", "photos/b.jpg"]
        );
        assert_eq!(net.object_keys("").unwrap().len(), 3);
    }

    #[test]
    fn re_adding_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let net = LocalNetwork::open(dir.path()).unwrap();
        net.add_object("k", &object("k")).unwrap();
        let mut newer = object("k");
        newer.encryption_key = EncryptionKey([1; 32]);
        net.add_object("k", &newer).unwrap();
        assert_eq!(net.object("k").unwrap(), newer);
    }

    #[test]
    fn missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let net = LocalNetwork::open(dir.path()).unwrap();
        assert!(matches!(net.object("nope"), Err(ServiceError::NotFound(_))));
    }
}
