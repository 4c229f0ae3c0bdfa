use std::collections::{BTreeMap, HashSet};

use parking_lot::RwLock;

use super::{Endpoint, RouteKey, Selector, SelectorError};

const NAME: &str = "consistent-hash";

/// Virtual nodes per endpoint unless configured otherwise.
pub const DEFAULT_REPLICAS: usize = 100;

/// Colliding points keep every owner; the earliest added serves the point.
#[derive(Debug, Default)]
struct Ring {
    points: BTreeMap<u32, Vec<Endpoint>>,
    keys: HashSet<String>,
}

/// A crc32 hash ring. Every endpoint owns `replicas` virtual points hashed
/// from `"{i}#{host}:{port}"`; a key goes to the first point at or after its
/// hash, wrapping around.
#[derive(Debug)]
pub struct ConsistentHash {
    replicas: usize,
    ring: RwLock<Ring>,
}

impl Default for ConsistentHash {
    fn default() -> Self {
        Self::new(DEFAULT_REPLICAS)
    }
}

impl ConsistentHash {
    pub fn new(replicas: usize) -> Self {
        Self {
            replicas: replicas.max(1),
            ring: RwLock::new(Ring::default()),
        }
    }

    fn virtual_points(&self, key: &str) -> impl Iterator<Item = u32> + '_ {
        let key = key.to_string();
        (0..self.replicas).map(move |i| crc32fast::hash(format!("{i}#{key}").as_bytes()))
    }

    /// Endpoint owning the point for a string key.
    pub fn find(&self, key: &str) -> Option<Endpoint> {
        self.find_hash(crc32fast::hash(key.as_bytes()))
    }

    pub fn find_hash(&self, hash: u32) -> Option<Endpoint> {
        let ring = self.ring.read();
        ring.points
            .range(hash..)
            .next()
            .or_else(|| ring.points.iter().next())
            .and_then(|(_, owners)| owners.first().cloned())
    }
}

impl Selector for ConsistentHash {
    fn select(&self, key: RouteKey) -> Result<Endpoint, SelectorError> {
        if self.is_empty() {
            return Err(SelectorError::Empty(NAME));
        }
        self.find_hash(key.hash_code())
            .ok_or(SelectorError::NotFound(NAME))
    }

    fn add(&self, endpoint: Endpoint) -> Result<(), SelectorError> {
        let key = endpoint.hash_key();
        let mut ring = self.ring.write();
        if !ring.keys.insert(key.clone()) {
            return Err(SelectorError::AlreadyExists {
                selector: NAME,
                endpoint: key,
            });
        }
        for point in self.virtual_points(&key) {
            ring.points.entry(point).or_default().push(endpoint.clone());
        }
        Ok(())
    }

    fn remove(&self, endpoint: &Endpoint) -> Result<(), SelectorError> {
        let key = endpoint.hash_key();
        let mut ring = self.ring.write();
        if !ring.keys.remove(&key) {
            return Err(SelectorError::AlreadyRemoved {
                selector: NAME,
                endpoint: key,
            });
        }
        for point in self.virtual_points(&key) {
            if let Some(owners) = ring.points.get_mut(&point) {
                owners.retain(|e| e.hash_key() != key);
                if owners.is_empty() {
                    ring.points.remove(&point);
                }
            }
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.ring.read().keys.len()
    }
}
