use std::sync::atomic::{AtomicU64, Ordering};

use super::NodeName;

/// Counter value before the first id is handed out; the first id is one more.
pub const INITIAL_COUNTER: u64 = 1;

/// Cluster-unique id source.
///
/// Ids are `<node><separator><counter>`. Node names are unique within the
/// cluster and the counter never repeats within a process, so no two calls
/// anywhere produce the same id. Counter overflow wraps and is not guarded.
#[derive(Debug)]
pub struct IdGenerator {
    counter: AtomicU64,
    separator: String,
}

impl IdGenerator {
    pub fn new(separator: impl Into<String>) -> Self {
        Self::starting_at(INITIAL_COUNTER, separator)
    }

    pub fn starting_at(start: u64, separator: impl Into<String>) -> Self {
        Self {
            counter: AtomicU64::new(start),
            separator: separator.into(),
        }
    }

    /// Increment the counter and return the new value as a decimal string
    pub fn next_local_id(&self) -> String {
        let id = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        id.to_string()
    }

    pub fn next_global_id(&self, node: &NodeName) -> String {
        let local = self.next_local_id();
        let mut id = String::with_capacity(node.as_str().len() + self.separator.len() + local.len());
        id.push_str(node.as_str());
        id.push_str(&self.separator);
        id.push_str(&local);
        id
    }

    /// Last value handed out (or the start value if none yet)
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_local_ids_increase() {
        let ids = IdGenerator::new("-");
        assert_eq!(ids.next_local_id(), "2");
        assert_eq!(ids.next_local_id(), "3");
        assert_eq!(ids.current(), 3);
    }

    #[test]
    fn test_global_id_format() {
        let ids = IdGenerator::starting_at(0, "-");
        assert_eq!(ids.next_global_id(&NodeName::from("n1")), "n1-1");
        assert_eq!(ids.next_global_id(&NodeName::from("n1")), "n1-2");

        let bare = IdGenerator::starting_at(0, "");
        assert_eq!(bare.next_global_id(&NodeName::from("n2")), "n21");
    }

    #[test]
    fn test_separator_prevents_cross_node_collision() {
        // Without a separator "n1" at 11 and "n11" at 1 would both be "n111".
        let a = IdGenerator::starting_at(10, "-");
        let b = IdGenerator::starting_at(0, "-");
        let id_a = a.next_global_id(&NodeName::from("n1"));
        let id_b = b.next_global_id(&NodeName::from("n11"));
        assert_eq!(id_a, "n1-11");
        assert_eq!(id_b, "n11-1");
        assert_ne!(id_a, id_b);
    }

    #[test]
    fn test_concurrent_ids_are_distinct() {
        let ids = Arc::new(IdGenerator::new("-"));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..500).map(|_| ids.next_local_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id generated");
            }
        }
        assert_eq!(seen.len(), 4000);
        assert_eq!(ids.current(), INITIAL_COUNTER + 4000);
    }
}
