use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::{Endpoint, Members, RouteKey, Selector, SelectorError};

const NAME: &str = "round-robin";

/// Cycles through the endpoints, or through the weight schedule when static
/// weights are set. The route key is ignored.
#[derive(Debug, Default)]
pub struct RoundRobin {
    members: RwLock<Members>,
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Selector for RoundRobin {
    fn select(&self, _key: RouteKey) -> Result<Endpoint, SelectorError> {
        let members = self.members.read();
        let n = self.cursor.fetch_add(1, Ordering::Relaxed);
        members.pick(NAME, n)
    }

    fn add(&self, endpoint: Endpoint) -> Result<(), SelectorError> {
        let mut members = self.members.write();
        members.add(NAME, endpoint)?;
        self.cursor.store(0, Ordering::Relaxed);
        Ok(())
    }

    fn remove(&self, endpoint: &Endpoint) -> Result<(), SelectorError> {
        let mut members = self.members.write();
        members.remove(NAME, endpoint)?;
        self.cursor.store(0, Ordering::Relaxed);
        Ok(())
    }

    fn len(&self) -> usize {
        self.members.read().endpoints.len()
    }
}
