//! Endpoint selection for client calls.
//!
//! Selectors keep a live endpoint set behind a `parking_lot::RwLock`.
//! Membership changes take the write lock; [`Selector::select`] only takes
//! the read lock, so routing never waits on other routing.
//!
//! - [`RoundRobin`] - cycles through endpoints with an atomic cursor
//! - [`Random`] - uniform random choice
//! - [`ModHash`] - route key modulo the endpoint count
//! - [`ConsistentHash`] - crc32 ring with virtual nodes
//!
//! The first three honour static endpoint weights when any are set.

mod consistent_hash;
mod endpoint;
mod mod_hash;
mod random;
mod round_robin;
pub mod weight;

use std::collections::HashSet;

use thiserror::Error;

pub use consistent_hash::ConsistentHash;
pub use endpoint::Endpoint;
pub use mod_hash::ModHash;
pub use random::Random;
pub use round_robin::RoundRobin;

/// Errors returned by selectors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("{0}: no endpoints available")]
    Empty(&'static str),

    #[error("{0}: no endpoint found for key")]
    NotFound(&'static str),

    #[error("{selector}: endpoint {endpoint} already exists")]
    AlreadyExists {
        selector: &'static str,
        endpoint: String,
    },

    #[error("{selector}: endpoint {endpoint} already removed")]
    AlreadyRemoved {
        selector: &'static str,
        endpoint: String,
    },
}

/// A request's routing token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RouteKey(pub u32);

impl RouteKey {
    /// Hash a string key with crc32.
    pub fn from_key(key: &str) -> Self {
        Self(crc32fast::hash(key.as_bytes()))
    }

    pub fn hash_code(self) -> u32 {
        self.0
    }
}

impl From<u32> for RouteKey {
    fn from(hash: u32) -> Self {
        Self(hash)
    }
}

/// Picks one endpoint per request from a live set.
pub trait Selector: Send + Sync {
    fn select(&self, key: RouteKey) -> Result<Endpoint, SelectorError>;
    fn add(&self, endpoint: Endpoint) -> Result<(), SelectorError>;
    fn remove(&self, endpoint: &Endpoint) -> Result<(), SelectorError>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Endpoint list shared by the list-based selectors.
#[derive(Debug, Default)]
struct Members {
    endpoints: Vec<Endpoint>,
    keys: HashSet<String>,
    /// Static weight schedule; empty when no endpoint is weighted.
    weighted: Vec<usize>,
}

impl Members {
    fn add(&mut self, selector: &'static str, endpoint: Endpoint) -> Result<(), SelectorError> {
        let key = endpoint.hash_key();
        if !self.keys.insert(key.clone()) {
            return Err(SelectorError::AlreadyExists {
                selector,
                endpoint: key,
            });
        }
        self.endpoints.push(endpoint);
        self.rebuild();
        Ok(())
    }

    fn remove(&mut self, selector: &'static str, endpoint: &Endpoint) -> Result<(), SelectorError> {
        let key = endpoint.hash_key();
        if !self.keys.remove(&key) {
            return Err(SelectorError::AlreadyRemoved {
                selector,
                endpoint: key,
            });
        }
        self.endpoints.retain(|e| e.hash_key() != key);
        self.rebuild();
        Ok(())
    }

    fn rebuild(&mut self) {
        self.weighted = weight::build_static_weight_list(&self.endpoints);
    }

    /// The endpoint for position `n`, through the weight schedule if any.
    fn pick(&self, selector: &'static str, n: usize) -> Result<Endpoint, SelectorError> {
        if self.endpoints.is_empty() {
            return Err(SelectorError::Empty(selector));
        }
        let index = if self.weighted.is_empty() {
            Some(n % self.endpoints.len())
        } else {
            self.weighted.get(n % self.weighted.len()).copied()
        };
        index
            .and_then(|i| self.endpoints.get(i))
            .cloned()
            .ok_or(SelectorError::NotFound(selector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_errors() {
        let mut members = Members::default();
        members.add("t", Endpoint::new("a", 1)).unwrap();
        assert_eq!(
            members.add("t", Endpoint::new("a", 1).with_weight(3)),
            Err(SelectorError::AlreadyExists {
                selector: "t",
                endpoint: "a:1".into()
            })
        );
        members.remove("t", &Endpoint::new("a", 1)).unwrap();
        assert!(matches!(
            members.remove("t", &Endpoint::new("a", 1)),
            Err(SelectorError::AlreadyRemoved { .. })
        ));
        assert_eq!(members.pick("t", 0), Err(SelectorError::Empty("t")));
    }

    #[test]
    fn test_route_key_hash() {
        assert_eq!(RouteKey::from_key("abc"), RouteKey(0x3524_41c2));
    }
}
