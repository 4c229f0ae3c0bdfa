use parking_lot::RwLock;

use super::{Endpoint, Members, RouteKey, Selector, SelectorError};

const NAME: &str = "mod-hash";

/// Route key modulo the endpoint count (or the weight schedule length).
///
/// Stable only while membership is unchanged; see [`ConsistentHash`] for
/// routing that survives membership changes.
///
/// [`ConsistentHash`]: super::ConsistentHash
#[derive(Debug, Default)]
pub struct ModHash {
    members: RwLock<Members>,
}

impl ModHash {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Selector for ModHash {
    fn select(&self, key: RouteKey) -> Result<Endpoint, SelectorError> {
        let n = usize::try_from(key.hash_code()).unwrap_or(usize::MAX);
        self.members.read().pick(NAME, n)
    }

    fn add(&self, endpoint: Endpoint) -> Result<(), SelectorError> {
        self.members.write().add(NAME, endpoint)
    }

    fn remove(&self, endpoint: &Endpoint) -> Result<(), SelectorError> {
        self.members.write().remove(NAME, endpoint)
    }

    fn len(&self) -> usize {
        self.members.read().endpoints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_key_same_endpoint() {
        let selector = ModHash::new();
        for port in 1..=4 {
            selector.add(Endpoint::new("h", port)).unwrap();
        }
        assert_eq!(selector.select(RouteKey(6)).unwrap().port, 3);
        assert_eq!(selector.select(RouteKey(6)).unwrap().port, 3);
        assert_eq!(selector.select(RouteKey(8)).unwrap().port, 1);
    }
}
