use parking_lot::RwLock;
use rand::Rng;

use super::{Endpoint, Members, RouteKey, Selector, SelectorError};

const NAME: &str = "random";

/// Uniform random choice, weighted through the schedule when static weights
/// are set. The route key is ignored.
#[derive(Debug, Default)]
pub struct Random {
    members: RwLock<Members>,
}

impl Random {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Selector for Random {
    fn select(&self, _key: RouteKey) -> Result<Endpoint, SelectorError> {
        let members = self.members.read();
        let span = if members.weighted.is_empty() {
            members.endpoints.len()
        } else {
            members.weighted.len()
        };
        if span == 0 {
            return Err(SelectorError::Empty(NAME));
        }
        let n = rand::thread_rng().gen_range(0..span);
        members.pick(NAME, n)
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
    fn test_picks_members_only() {
        let random = Random::new();
        assert_eq!(random.select(RouteKey(1)), Err(SelectorError::Empty(NAME)));
        random.add(Endpoint::new("a", 1)).unwrap();
        random.add(Endpoint::new("b", 2)).unwrap();
        for _ in 0..50 {
            let picked = random.select(RouteKey(0)).unwrap();
            assert!(picked.port == 1 || picked.port == 2);
        }
        random.remove(&Endpoint::new("a", 1)).unwrap();
        for _ in 0..10 {
            assert_eq!(random.select(RouteKey(0)).unwrap().port, 2);
        }
    }
}
