use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::NodeName;

/// Neighbour map from the most recent `topology` message.
///
/// Each message replaces the previous map wholesale.
#[derive(Debug, Default)]
pub struct Topology {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    neighbours: HashMap<NodeName, Vec<NodeName>>,
    // bumped on every replace
    version: u64,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new map and return its version, starting at 1
    pub fn replace(&self, neighbours: HashMap<NodeName, Vec<NodeName>>) -> u64 {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.neighbours = neighbours;
        inner.version += 1;
        inner.version
    }

    /// Neighbours declared for `node`, or None if no topology names it
    pub fn neighbours_of(&self, node: &NodeName) -> Option<Vec<NodeName>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .neighbours
            .get(node)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ids: &[&str]) -> Vec<NodeName> {
        ids.iter().map(|id| NodeName::from(*id)).collect()
    }

    #[test]
    fn test_replace_and_lookup() {
        let topology = Topology::new();
        assert!(topology.neighbours_of(&"n1".into()).is_none());

        let mut map = HashMap::new();
        map.insert(NodeName::from("n1"), names(&["n2", "n3"]));
        map.insert(NodeName::from("n2"), names(&["n1"]));
        assert_eq!(topology.replace(map), 1);
        assert_eq!(topology.neighbours_of(&"n1".into()), Some(names(&["n2", "n3"])));

        let mut map = HashMap::new();
        map.insert(NodeName::from("n2"), names(&["n3"]));
        assert_eq!(topology.replace(map), 2);
        assert!(topology.neighbours_of(&"n1".into()).is_none());
    }
}
